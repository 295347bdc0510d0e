// Ad Spend Dashboard - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod entry;
pub mod error;
pub mod store;      // Key-value persistence of the whole collection
pub mod service;    // Save / delete with compare-and-swap
pub mod aggregate;  // Filters, facets, totals, monthly breakdown
pub mod auth;
pub mod form;
pub mod export;
pub mod fmt;
pub mod config;
pub mod telemetry;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use entry::{month_index, parse_amount, Entry, MediaType, MIN_YEAR, MONTHS};
pub use error::{ServiceError, StoreError};
pub use store::{EntryStore, MemoryStore, Snapshot, SqliteStore, ENTRIES_KEY};
pub use service::{EntryService, MAX_WRITE_ATTEMPTS};
pub use aggregate::{
    facets, filter_entries, monthly_breakdown, summarize, total_spending,
    BreakdownRow, Facets, FilterSet, MonthlyBreakdown, Summary, ALL,
};
pub use auth::{AccessContext, AccessPolicy};
pub use form::{EntryForm, FormError};
pub use export::{ExportFormat, EXPORT_FILE_NAME};
pub use config::Config;

#[cfg(feature = "server")]
pub use api::{api_routes, AppState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
