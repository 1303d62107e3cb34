//! Storage layer for the employee dataset.
//!
//! - In-memory columnar table ([`Dataset`], [`ColumnStorage`])
//! - Load-time derived columns ([`derive_columns`])
//! - CSV import ([`csv`])

mod column;
mod dataset;
mod derive;

pub mod csv;

pub use column::ColumnStorage;
pub use dataset::Dataset;
pub use derive::{
    derive_columns, remote_work_category, years_between, HYBRID, WORK_FROM_HOME,
    WORK_FROM_OFFICE,
};

pub use csv::{CsvImportConfig, DatasetLoader, ImportError, ImportResult};
