// 📝 Entry Form - input checks done before an entry reaches the service
// The service stores whatever it is given; these rules live at the input edge.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entry::{month_index, parse_amount, Entry, MediaType, MIN_YEAR};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please fill in all fields")]
    MissingFields(Vec<&'static str>),

    #[error("Unknown month: {0}")]
    InvalidMonth(String),

    #[error("Year must be 2026 or later: {0}")]
    InvalidYear(String),

    #[error("Amount is not a number: {0}")]
    InvalidAmount(String),
}

/// Add/edit form state. Defaults match a fresh form: year 2026, Radio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryForm {
    pub vendor: String,
    pub location: String,
    pub month: String,
    pub year: String,
    pub media_type: MediaType,
    pub amount: String,
}

impl Default for EntryForm {
    fn default() -> Self {
        EntryForm {
            vendor: String::new(),
            location: String::new(),
            month: String::new(),
            year: MIN_YEAR.to_string(),
            media_type: MediaType::Radio,
            amount: String::new(),
        }
    }
}

impl From<&Entry> for EntryForm {
    fn from(entry: &Entry) -> Self {
        EntryForm {
            vendor: entry.vendor.clone(),
            location: entry.location.clone(),
            month: entry.month.clone(),
            year: entry.year.clone(),
            media_type: entry.media_type,
            amount: entry.amount.clone(),
        }
    }
}

impl EntryForm {
    pub fn validate(&self) -> Result<(), FormError> {
        let missing: Vec<&'static str> = [
            ("vendor", &self.vendor),
            ("location", &self.location),
            ("month", &self.month),
            ("year", &self.year),
            ("amount", &self.amount),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(FormError::MissingFields(missing));
        }

        if month_index(&self.month).is_none() {
            return Err(FormError::InvalidMonth(self.month.clone()));
        }

        match self.year.trim().parse::<i32>() {
            Ok(year) if year >= MIN_YEAR => {}
            _ => return Err(FormError::InvalidYear(self.year.clone())),
        }

        if !parse_amount(&self.amount).is_finite() {
            return Err(FormError::InvalidAmount(self.amount.clone()));
        }

        Ok(())
    }

    /// Validated entry. `existing_id` keeps the id of the entry being
    /// edited; otherwise a fresh timestamp id is assigned.
    pub fn into_entry(self, existing_id: Option<String>) -> Result<Entry, FormError> {
        self.validate()?;
        Ok(Entry {
            id: existing_id.unwrap_or_else(Entry::next_id),
            vendor: self.vendor,
            location: self.location,
            month: self.month,
            year: self.year,
            media_type: self.media_type,
            amount: self.amount,
        })
    }
}
