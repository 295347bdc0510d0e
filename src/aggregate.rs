// 📊 Aggregation / Filter Engine
// Pure functions over the entry list: facets, filtering, totals and the
// media type × month-year breakdown. Nothing here is cached; recompute on
// every filter change.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::entry::{month_index, Entry, MediaType};

/// Filter value meaning "don't filter on this dimension"
pub const ALL: &str = "all";

// ============================================================================
// FILTERS
// ============================================================================

/// Selected value per filter dimension; `"all"` disables a dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSet {
    pub vendor: String,
    pub location: String,
    pub media_type: String,
    pub year: String,
    pub month: String,
}

impl Default for FilterSet {
    fn default() -> Self {
        FilterSet {
            vendor: ALL.to_string(),
            location: ALL.to_string(),
            media_type: ALL.to_string(),
            year: ALL.to_string(),
            month: ALL.to_string(),
        }
    }
}

impl FilterSet {
    /// All five predicates ANDed
    pub fn matches(&self, entry: &Entry) -> bool {
        selected(&self.vendor, &entry.vendor)
            && selected(&self.location, &entry.location)
            && selected(&self.media_type, entry.media_type.as_str())
            && selected(&self.year, &entry.year)
            && selected(&self.month, &entry.month)
    }

    pub fn is_unfiltered(&self) -> bool {
        [
            &self.vendor,
            &self.location,
            &self.media_type,
            &self.year,
            &self.month,
        ]
        .iter()
        .all(|v| v.as_str() == ALL)
    }
}

fn selected(filter: &str, value: &str) -> bool {
    filter == ALL || filter == value
}

/// Entries passing every active filter, in collection order
pub fn filter_entries<'a>(entries: &'a [Entry], filters: &FilterSet) -> Vec<&'a Entry> {
    entries.iter().filter(|e| filters.matches(e)).collect()
}

// ============================================================================
// FACETS
// ============================================================================

/// Distinct values for the filter selectors, taken from the unfiltered
/// collection in order of first occurrence
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Facets {
    pub vendors: Vec<String>,
    pub locations: Vec<String>,
    pub years: Vec<String>,
}

pub fn facets(entries: &[Entry]) -> Facets {
    Facets {
        vendors: distinct(entries.iter().map(|e| e.vendor.as_str())),
        locations: distinct(entries.iter().map(|e| e.location.as_str())),
        years: distinct(entries.iter().map(|e| e.year.as_str())),
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

// ============================================================================
// TOTALS
// ============================================================================

/// Sum of parsed amounts. A malformed amount makes the result NaN.
pub fn total_spending<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> f64 {
    entries.into_iter().map(Entry::amount_value).sum()
}

// ============================================================================
// MONTHLY BREAKDOWN
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownRow {
    pub media_type: MediaType,
    /// One cell per breakdown column; 0.0 where the media type has no entries
    pub cells: Vec<f64>,
    pub total: f64,
}

/// Media type rows × "<month> <year>" columns, with row and column totals
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBreakdown {
    pub columns: Vec<String>,
    pub rows: Vec<BreakdownRow>,
    pub column_totals: Vec<f64>,
    pub grand_total: f64,
}

impl MonthlyBreakdown {
    /// Cell value for a media type and column key (0.0 when absent)
    pub fn cell(&self, media_type: MediaType, column: &str) -> f64 {
        let Some(col) = self.columns.iter().position(|c| c == column) else {
            return 0.0;
        };
        self.row(media_type).map(|r| r.cells[col]).unwrap_or(0.0)
    }

    pub fn row(&self, media_type: MediaType) -> Option<&BreakdownRow> {
        self.rows.iter().find(|r| r.media_type == media_type)
    }

    pub fn column_total(&self, column: &str) -> f64 {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.column_totals[i])
            .unwrap_or(0.0)
    }
}

/// Build the breakdown table from already-filtered entries
pub fn monthly_breakdown<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> MonthlyBreakdown {
    let mut buckets: HashMap<(MediaType, String), f64> = HashMap::new();
    let mut periods: Vec<(String, &str, &str)> = Vec::new();
    let mut seen = HashSet::new();

    for entry in entries {
        let key = entry.period_key();
        *buckets.entry((entry.media_type, key.clone())).or_insert(0.0) += entry.amount_value();
        if seen.insert(key.clone()) {
            periods.push((key, entry.month.as_str(), entry.year.as_str()));
        }
    }

    // Chronological: numeric year, then calendar month. Stable, so ties keep
    // first-occurrence order.
    periods.sort_by(|(_, month_a, year_a), (_, month_b, year_b)| {
        let (year_a, month_a) = period_sort_key(month_a, year_a);
        let (year_b, month_b) = period_sort_key(month_b, year_b);
        year_a
            .partial_cmp(&year_b)
            .unwrap_or(Ordering::Equal)
            .then(month_a.cmp(&month_b))
    });
    let columns: Vec<String> = periods.into_iter().map(|(key, _, _)| key).collect();

    let rows: Vec<BreakdownRow> = MediaType::ALL
        .iter()
        .map(|media_type| {
            let cells: Vec<f64> = columns
                .iter()
                .map(|col| {
                    buckets
                        .get(&(*media_type, col.clone()))
                        .copied()
                        .unwrap_or(0.0)
                })
                .collect();
            let total: f64 = cells.iter().sum();
            BreakdownRow {
                media_type: *media_type,
                cells,
                total,
            }
        })
        .collect();

    let column_totals: Vec<f64> = (0..columns.len())
        .map(|i| rows.iter().map(|r| r.cells[i]).sum::<f64>())
        .collect();
    let grand_total: f64 = rows.iter().map(|r| r.total).sum();

    MonthlyBreakdown {
        columns,
        rows,
        column_totals,
        grand_total,
    }
}

/// Unparseable years sort before every numeric year; unknown month names
/// sort before January
fn period_sort_key(month: &str, year: &str) -> (Option<f64>, i64) {
    let month = month_index(month).map(|i| i as i64).unwrap_or(-1);
    (leading_int(year), month)
}

/// Value of the leading digits (after optional whitespace and sign).
/// Kept as f64 so years too long for an integer type still order by size.
fn leading_int(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let (sign, rest) = match text.as_bytes().first() {
        Some(b'-') => (-1.0, &text[1..]),
        Some(b'+') => (1.0, &text[1..]),
        _ => (1.0, text),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok().map(|n| sign * n)
}

// ============================================================================
// SUMMARY
// ============================================================================

/// Everything the dashboard derives for one filter configuration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub filters: FilterSet,
    pub facets: Facets,
    pub total: f64,
    pub breakdown: MonthlyBreakdown,
    pub entries: Vec<Entry>,
}

pub fn summarize(entries: &[Entry], filters: &FilterSet) -> Summary {
    let filtered = filter_entries(entries, filters);
    Summary {
        filters: filters.clone(),
        facets: facets(entries),
        total: total_spending(filtered.iter().copied()),
        breakdown: monthly_breakdown(filtered.iter().copied()),
        entries: filtered.into_iter().cloned().collect(),
    }
}
