//! Data module - CSV loading, cleaning and filtering

mod categories;
mod cleaner;
mod filter;
mod loader;

pub use categories::{AgeGroup, BpCategory, CholCategory, FastingBloodSugar, HrCategory, RestEcg};
pub use cleaner::{enrich, CleanError, REQUIRED_COLUMNS};
pub use filter::FilterParams;
pub use loader::{DataStore, LoadOutcome, LoaderError};
