//! Result tables produced by query execution.

use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::error::{HrqlError, Result};
use crate::types::{DataType, Row, Value};

/// Result of query execution containing ordered columns and rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    /// Ordered list of column names.
    pub columns: Vec<String>,
    /// Result rows.
    pub rows: Vec<Row>,
}

impl ResultTable {
    /// Creates a new empty result with the given column names.
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        ResultTable {
            columns,
            rows: Vec::new(),
        }
    }

    /// Creates a one-row, one-column result.
    #[must_use]
    pub fn scalar(column: impl Into<String>, value: Value) -> Self {
        let column = column.into();
        let mut result = ResultTable::new(vec![column.clone()]);
        let mut row = Row::new();
        row.set(column, value);
        result.add_row(row);
        result
    }

    /// Appends a row to the result.
    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Returns the number of rows in the result.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the result has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Gets a row by index.
    #[must_use]
    pub fn get_row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Returns true if the result has the given column.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Returns the values of one column, with missing cells as Null.
    #[must_use]
    pub fn column_values(&self, column: &str) -> Vec<&Value> {
        self.rows
            .iter()
            .map(|row| row.get(column).unwrap_or(&Value::Null))
            .collect()
    }

    /// Returns the single value of a one-row result.
    #[must_use]
    pub fn scalar_value(&self) -> Option<&Value> {
        match (self.rows.as_slice(), self.columns.as_slice()) {
            ([row], [column]) => row.get(column),
            _ => None,
        }
    }

    /// Converts the result into an Arrow record batch.
    ///
    /// Column types are inferred from the non-null cells: all-integer columns
    /// become `Int64`, numeric columns `Float64`, date columns `Date32`, and
    /// anything else is rendered as `Utf8`.
    ///
    /// # Errors
    ///
    /// Returns an error if Arrow rejects the assembled columns.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        if self.columns.is_empty() {
            return Ok(RecordBatch::new_empty(Arc::new(Schema::empty())));
        }

        let mut fields = Vec::with_capacity(self.columns.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.columns.len());

        for name in &self.columns {
            let values = self.column_values(name);
            let data_type = infer_column_type(&values);
            let array: ArrayRef = match data_type {
                DataType::Int64 => Arc::new(Int64Array::from(
                    values.iter().map(|v| v.as_int64()).collect::<Vec<_>>(),
                )),
                DataType::Float64 => Arc::new(Float64Array::from(
                    values.iter().map(|v| v.to_f64()).collect::<Vec<_>>(),
                )),
                DataType::Date => Arc::new(Date32Array::from(
                    values.iter().map(|v| v.as_date_days()).collect::<Vec<_>>(),
                )),
                DataType::String => Arc::new(StringArray::from(
                    values
                        .iter()
                        .map(|v| (!v.is_null()).then(|| v.to_string()))
                        .collect::<Vec<_>>(),
                )),
            };
            fields.push(Field::new(name.as_str(), data_type.to_arrow(), true));
            arrays.push(array);
        }

        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
            .map_err(|e| HrqlError::ExecutionError(format!("Arrow export failed: {e}")))
    }
}

fn infer_column_type(values: &[&Value]) -> DataType {
    let mut inferred: Option<DataType> = None;
    for value in values {
        let Some(dt) = value.data_type() else {
            continue;
        };
        inferred = match (inferred, dt) {
            (None, dt) => Some(dt),
            (Some(a), b) if a == b => Some(a),
            (Some(a), b) if a.is_numeric() && b.is_numeric() => Some(DataType::Float64),
            _ => return DataType::String,
        };
    }
    inferred.unwrap_or(DataType::String)
}
