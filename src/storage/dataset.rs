//! In-memory employee dataset with columnar layout.

use std::collections::HashMap;

use crate::error::{HrqlError, Result};
use crate::storage::ColumnStorage;
use crate::types::{Row, Value};

/// Read-only table the engine answers questions against.
#[derive(Clone, PartialEq)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<ColumnStorage>,
    index: HashMap<String, usize>,
    row_count: usize,
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("columns", &self.names)
            .field("row_count", &self.row_count)
            .finish_non_exhaustive()
    }
}

impl Dataset {
    /// Creates an empty dataset with the given column names.
    ///
    /// # Errors
    ///
    /// Returns an error if a column name is empty or duplicated.
    pub fn new(names: Vec<String>) -> Result<Self> {
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(HrqlError::SchemaError("Column name cannot be empty".into()));
            }
            if index.insert(name.clone(), i).is_some() {
                return Err(HrqlError::SchemaError(format!(
                    "Duplicate column name '{name}'"
                )));
            }
        }
        let columns = names.iter().map(|_| ColumnStorage::new()).collect();
        Ok(Dataset {
            names,
            columns,
            index,
            row_count: 0,
        })
    }

    /// Creates a dataset from row-major values.
    ///
    /// # Errors
    ///
    /// Returns an error if the names are invalid or a row has the wrong width.
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut dataset = Dataset::new(names)?;
        for column in &mut dataset.columns {
            column.reserve(rows.len());
        }
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    /// Appends a row given in column order.
    ///
    /// # Errors
    ///
    /// Returns an error if the row width does not match the column count.
    pub fn push_row(&mut self, values: Vec<Value>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(HrqlError::SchemaError(format!(
                "Row has {} values but dataset has {} columns",
                values.len(),
                self.columns.len()
            )));
        }
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.push(value);
        }
        self.row_count += 1;
        Ok(())
    }

    /// Adds a whole column, returning the extended dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the column exists or its length is wrong.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(HrqlError::SchemaError(format!(
                "Column '{name}' already exists"
            )));
        }
        if values.len() != self.row_count {
            return Err(HrqlError::SchemaError(format!(
                "Column '{name}' has {} values but dataset has {} rows",
                values.len(),
                self.row_count
            )));
        }
        self.index.insert(name.clone(), self.names.len());
        self.names.push(name);
        self.columns.push(ColumnStorage::from_values(values));
        Ok(self)
    }

    /// Replaces a column's values, appending the column if it is new.
    ///
    /// # Errors
    ///
    /// Returns an error if the column length is wrong.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.row_count {
            return Err(HrqlError::SchemaError(format!(
                "Column '{name}' has {} values but dataset has {} rows",
                values.len(),
                self.row_count
            )));
        }
        match self.index.get(name) {
            Some(&i) => self.columns[i] = ColumnStorage::from_values(values),
            None => {
                self.index.insert(name.to_string(), self.names.len());
                self.names.push(name.to_string());
                self.columns.push(ColumnStorage::from_values(values));
            }
        }
        Ok(())
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns true if the dataset has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Returns the column names in dataset order.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Returns true if the dataset has the given column.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Gets a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnStorage> {
        self.index.get(name).and_then(|&i| self.columns.get(i))
    }

    /// Gets a single cell.
    #[must_use]
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        self.column(column).and_then(|c| c.get(row))
    }

    /// Materializes a row restricted to the given columns.
    ///
    /// Columns unknown to the dataset are skipped.
    #[must_use]
    pub fn project_row(&self, row: usize, columns: &[String]) -> Row {
        let mut out = Row::new();
        for name in columns {
            if let Some(value) = self.value(row, name) {
                out.set(name.clone(), value.clone());
            }
        }
        out
    }
}
