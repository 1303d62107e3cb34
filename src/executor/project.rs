//! Column projection of selected rows.

use crate::error::{HrqlError, Result};
use crate::storage::Dataset;
use crate::types::ResultTable;

/// Resolves the projection list: the given columns, or every dataset column
/// when none are given.
///
/// # Errors
///
/// Returns `UnknownColumn` for a column the dataset lacks.
pub fn projection(dataset: &Dataset, columns: &[String]) -> Result<Vec<String>> {
    if columns.is_empty() {
        return Ok(dataset.column_names().to_vec());
    }
    if let Some(missing) = columns.iter().find(|c| !dataset.has_column(c)) {
        return Err(HrqlError::unknown_column(
            missing,
            dataset.column_names().iter().map(String::as_str),
        ));
    }
    Ok(columns.to_vec())
}

/// Materializes the given rows restricted to `columns`, in the given order.
///
/// # Errors
///
/// Returns `UnknownColumn` for a column the dataset lacks.
pub fn project(dataset: &Dataset, rows: &[usize], columns: &[String]) -> Result<ResultTable> {
    let columns = projection(dataset, columns)?;
    let mut table = ResultTable::new(columns);
    for &row in rows {
        table.add_row(dataset.project_row(row, &table.columns));
    }
    Ok(table)
}
