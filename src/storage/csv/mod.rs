//! CSV import of employee datasets.
//!
//! Headers are mapped onto catalog columns by canonical name, spoken name or
//! alias. Cells are typed by the column's semantic type, then the derived
//! columns (tenure, work mode, levels) are computed.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{columns, ColumnCatalog, SemanticType};
use crate::error::{HrqlError, Result};
use crate::storage::{derive_columns, Dataset};
use crate::types::{parse_date, parse_number, Value};

/// Configuration for CSV import operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvImportConfig {
    /// Field separator (default: ',').
    pub delimiter: char,
    /// Quote character (default: '"').
    pub quote: char,
    /// Whether the first row is a header (default: true).
    pub has_header: bool,
    /// Skip malformed rows instead of aborting (default: false).
    pub ignore_errors: bool,
    /// Convert rows on the rayon pool (default: true).
    pub parallel: bool,
    /// Date tenure is measured against. None = today.
    pub reference_date: Option<NaiveDate>,
}

impl Default for CsvImportConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
            has_header: true,
            ignore_errors: false,
            parallel: true,
            reference_date: None,
        }
    }
}

impl CsvImportConfig {
    /// Creates a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the quote character.
    #[must_use]
    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    /// Sets whether the file has a header row.
    #[must_use]
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Sets whether to skip malformed rows.
    #[must_use]
    pub fn with_ignore_errors(mut self, ignore_errors: bool) -> Self {
        self.ignore_errors = ignore_errors;
        self
    }

    /// Sets whether to convert rows in parallel.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Fixes the date tenure is measured against.
    #[must_use]
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Creates a config that converts rows on the calling thread.
    #[must_use]
    pub fn sequential() -> Self {
        Self::default().with_parallel(false)
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the delimiter or quote is not a single-byte ASCII character
    /// - the delimiter and quote are the same character
    /// - the file has no header row (columns are mapped by header name)
    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() || !self.quote.is_ascii() {
            return Err(HrqlError::ValidationError(
                "delimiter and quote must be ASCII characters".to_string(),
            ));
        }
        if self.delimiter == self.quote {
            return Err(HrqlError::ValidationError(
                "delimiter and quote must differ".to_string(),
            ));
        }
        if !self.has_header {
            return Err(HrqlError::ValidationError(
                "a header row is required to map columns".to_string(),
            ));
        }
        Ok(())
    }

    fn reference(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Error information for a single row during import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportError {
    /// Data row number where the error occurred (1-indexed, header excluded).
    pub row_number: u64,
    /// Column name where the error occurred (if applicable).
    pub column: Option<String>,
    /// Error message.
    pub message: String,
}

impl ImportError {
    /// Creates an error for a specific column.
    #[must_use]
    pub fn column_error(row_number: u64, column: &str, message: impl Into<String>) -> Self {
        Self {
            row_number,
            column: Some(column.to_string()),
            message: message.into(),
        }
    }

    /// Creates a general row error.
    #[must_use]
    pub fn row_error(row_number: u64, message: impl Into<String>) -> Self {
        Self {
            row_number,
            column: None,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.column {
            Some(col) => write!(f, "Row {}, column '{}': {}", self.row_number, col, self.message),
            None => write!(f, "Row {}: {}", self.row_number, self.message),
        }
    }
}

/// Result of an import operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// Number of rows successfully imported.
    pub rows_imported: u64,
    /// Number of rows skipped.
    pub rows_failed: u64,
    /// Errors of the skipped rows.
    pub errors: Vec<ImportError>,
}

impl ImportResult {
    /// Returns whether the import completed without errors.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Target of one CSV header.
#[derive(Debug, Clone)]
struct HeaderBinding {
    /// Column name in the dataset.
    name: String,
    /// Semantic type, None for columns outside the catalog.
    semantic_type: Option<SemanticType>,
    is_identifier: bool,
}

/// Lowercases a header and unifies `_`, `-` and whitespace runs to one space.
fn header_key(header: &str) -> String {
    header
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Bulk loader building a [`Dataset`] from employee CSV files.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    catalog: Arc<ColumnCatalog>,
    config: CsvImportConfig,
}

impl DatasetLoader {
    /// Creates a loader for the given catalog.
    #[must_use]
    pub fn new(catalog: Arc<ColumnCatalog>, config: CsvImportConfig) -> Self {
        Self { catalog, config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &CsvImportConfig {
        &self.config
    }

    /// Maps a CSV header onto a catalog column name.
    #[must_use]
    pub fn canonical_header(&self, header: &str) -> Option<&str> {
        let key = header_key(header);
        if key.is_empty() {
            return None;
        }
        self.catalog
            .columns()
            .iter()
            .find(|c| header_key(&c.name) == key || c.aliases.iter().any(|a| *a == key))
            .map(|c| c.name.as_str())
    }

    fn bind_headers(&self, headers: &csv::StringRecord) -> Result<Vec<Option<HeaderBinding>>> {
        let mut seen: Vec<String> = Vec::new();
        let mut bindings = Vec::with_capacity(headers.len());
        for header in headers {
            let name = self
                .canonical_header(header)
                .map_or_else(|| header.trim().to_string(), str::to_string);
            if name.is_empty() || seen.contains(&name) {
                warn!(header, "duplicate or empty header; column skipped");
                bindings.push(None);
                continue;
            }
            let def = self.catalog.get(&name);
            if def.is_none() {
                debug!(header, "header not in catalog; loaded as text");
            }
            bindings.push(Some(HeaderBinding {
                is_identifier: name == self.catalog.identifier(),
                semantic_type: def.map(|c| c.semantic_type),
                name: name.clone(),
            }));
            seen.push(name);
        }

        if !seen.iter().any(|n| n == self.catalog.identifier()) {
            return Err(HrqlError::ImportError(format!(
                "CSV missing required column '{}'",
                self.catalog.identifier()
            )));
        }
        for column in self.catalog.columns() {
            let derived = column.derived.is_some()
                || column.name == columns::REMOTE_WORK_CATEGORY
                || column.name == columns::YEARS_AT_COMPANY;
            if !derived && !seen.contains(&column.name) {
                warn!(column = %column.name, "optional column missing from CSV");
            }
        }
        Ok(bindings)
    }

    /// Types one cell by the semantic type of its column.
    fn convert_field(field: &str, binding: &HeaderBinding) -> Value {
        let field = field.trim();
        if field.is_empty() {
            return Value::Null;
        }
        match binding.semantic_type {
            Some(SemanticType::Numeric) => number_or_text(field),
            Some(SemanticType::Temporal) => {
                parse_date(field).map_or_else(|| Value::text(field), Value::date)
            }
            _ if binding.is_identifier => field
                .parse::<i64>()
                .map_or_else(|_| Value::text(field), Value::Int64),
            _ => Value::text(field),
        }
    }

    fn convert_record(
        bindings: &[Option<HeaderBinding>],
        record: &csv::StringRecord,
        row_number: u64,
    ) -> std::result::Result<Vec<Value>, ImportError> {
        if record.len() != bindings.len() {
            return Err(ImportError::row_error(
                row_number,
                format!("expected {} fields, found {}", bindings.len(), record.len()),
            ));
        }
        let mut values = Vec::with_capacity(bindings.len());
        for (field, binding) in record.iter().zip(bindings) {
            if let Some(binding) = binding {
                let value = Self::convert_field(field, binding);
                if binding.is_identifier && value.is_null() {
                    return Err(ImportError::column_error(row_number, &binding.name, "missing identifier"));
                }
                values.push(value);
            }
        }
        Ok(values)
    }

    /// Loads a dataset from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the import fails.
    pub fn load_path(&self, path: &Path) -> Result<(Dataset, ImportResult)> {
        let file = File::open(path)
            .map_err(|e| HrqlError::ImportError(format!("Failed to open CSV file: {e}")))?;
        self.load_reader(file)
    }

    /// Loads a dataset from any CSV source.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the identifier column
    /// is missing, or a row is malformed and errors are not ignored.
    pub fn load_reader<R: Read>(&self, source: R) -> Result<(Dataset, ImportResult)> {
        self.config.validate()?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter as u8)
            .quote(self.config.quote as u8)
            .has_headers(self.config.has_header)
            .flexible(true)
            .from_reader(source);

        let headers = reader
            .headers()
            .map_err(|e| HrqlError::ImportError(format!("Failed to read CSV header: {e}")))?
            .clone();
        let bindings = self.bind_headers(&headers)?;
        let names: Vec<String> = bindings.iter().flatten().map(|b| b.name.clone()).collect();

        let mut result = ImportResult::default();
        let mut records = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let row_number = idx as u64 + 1;
            match record {
                Ok(record) => records.push((row_number, record)),
                Err(e) => self.reject(&mut result, ImportError::row_error(row_number, e.to_string()))?,
            }
        }

        let converted: Vec<_> = if self.config.parallel {
            records
                .par_iter()
                .map(|(n, r)| Self::convert_record(&bindings, r, *n))
                .collect()
        } else {
            records
                .iter()
                .map(|(n, r)| Self::convert_record(&bindings, r, *n))
                .collect()
        };

        let mut rows = Vec::with_capacity(converted.len());
        for row in converted {
            match row {
                Ok(values) => rows.push(values),
                Err(error) => self.reject(&mut result, error)?,
            }
        }
        result.rows_imported = rows.len() as u64;

        let dataset = Dataset::from_rows(names, rows)?;
        let dataset = derive_columns(dataset, &self.catalog, self.config.reference())?;
        info!(
            rows = dataset.row_count(),
            columns = dataset.column_names().len(),
            skipped = result.rows_failed,
            "loaded employee dataset"
        );
        Ok((dataset, result))
    }

    fn reject(&self, result: &mut ImportResult, error: ImportError) -> Result<()> {
        if !self.config.ignore_errors {
            return Err(HrqlError::ImportError(error.to_string()));
        }
        warn!(%error, "skipping malformed row");
        result.rows_failed += 1;
        result.errors.push(error);
        Ok(())
    }
}

/// Parses a numeric cell, keeping integers integral and unparseable text as is.
#[allow(clippy::cast_possible_truncation)]
fn number_or_text(field: &str) -> Value {
    match parse_number(field) {
        Some(n) if n.fract() == 0.0 && n.abs() < 1e15 => Value::Int64(n as i64),
        Some(n) => Value::Float64(n),
        None => Value::text(field),
    }
}
