use comfy_table::{Cell, Table};

use crate::aggregate::MonthlyBreakdown;
use crate::entry::Entry;

/// Format a float as a dollar amount with thousands separators: $1,234.56
/// NaN renders as "$NaN" so a malformed amount stays visible.
pub fn money(val: f64) -> String {
    if val.is_nan() {
        return "$NaN".to_string();
    }
    if val.is_infinite() {
        return if val < 0.0 { "-$∞" } else { "$∞" }.to_string();
    }

    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    // -0.001 rounds to 0.00; don't print "-$0.00"
    if negative && cents != "0.00" {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Breakdown table: one row per media type plus a Total row
pub fn breakdown_table(breakdown: &MonthlyBreakdown) -> String {
    let mut header = vec!["Media Type".to_string()];
    header.extend(breakdown.columns.iter().cloned());
    header.push("Total".to_string());

    let mut table = Table::new();
    table.set_header(header);

    for row in &breakdown.rows {
        let mut cells = vec![Cell::new(row.media_type)];
        cells.extend(row.cells.iter().map(|v| Cell::new(money(*v))));
        cells.push(Cell::new(money(row.total)));
        table.add_row(cells);
    }

    let mut totals = vec![Cell::new("Total")];
    totals.extend(breakdown.column_totals.iter().map(|v| Cell::new(money(*v))));
    totals.push(Cell::new(money(breakdown.grand_total)));
    table.add_row(totals);

    table.to_string()
}

/// Entry listing
pub fn entries_table(entries: &[Entry]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Vendor", "Location", "Month", "Media Type", "Amount"]);
    for e in entries {
        table.add_row(vec![
            Cell::new(&e.id),
            Cell::new(&e.vendor),
            Cell::new(&e.location),
            Cell::new(e.period_key()),
            Cell::new(e.media_type),
            Cell::new(money(e.amount_value())),
        ]);
    }
    table.to_string()
}
