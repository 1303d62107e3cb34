//! Counting, aggregation, grouping and distinct listing.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::error::{HrqlError, Result};
use crate::parser::{AggregateFunction, COUNT_COLUMN};
use crate::storage::{ColumnStorage, Dataset};
use crate::types::{ResultTable, Row, Value};

pub(crate) fn column<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a ColumnStorage> {
    dataset.column(name).ok_or_else(|| {
        HrqlError::unknown_column(name, dataset.column_names().iter().map(String::as_str))
    })
}

pub(crate) fn count_cell(n: usize) -> Value {
    Value::Int64(i64::try_from(n).unwrap_or(i64::MAX))
}

/// Number of selected rows whose cell equals `value`.
///
/// Text compares exactly; integers and floats compare by value.
#[must_use]
pub fn count_matching(column: &ColumnStorage, rows: &[usize], value: &Value) -> usize {
    rows.iter()
        .filter(|&&row| {
            column
                .get(row)
                .is_some_and(|cell| cell.compare(value) == Some(Ordering::Equal))
        })
        .count()
}

/// Reduces the numeric cells of the selected rows.
///
/// Cells that cannot be read as numbers are skipped. An empty selection gives
/// `Null`.
///
/// # Errors
///
/// Returns `NonNumericAggregation` if rows are selected but none is numeric.
#[allow(clippy::cast_precision_loss)]
pub fn reduce(
    function: AggregateFunction,
    column_name: &str,
    column: &ColumnStorage,
    rows: &[usize],
) -> Result<Value> {
    if function == AggregateFunction::Count {
        return Ok(count_cell(rows.len()));
    }
    if rows.is_empty() {
        return Ok(Value::Null);
    }

    let values: Vec<f64> = rows
        .iter()
        .filter_map(|&row| column.get(row).and_then(Value::to_f64))
        .collect();
    if values.is_empty() {
        return Err(HrqlError::NonNumericAggregation {
            function: function.name().to_string(),
            column: column_name.to_string(),
        });
    }

    let result = match function {
        AggregateFunction::Mean => values.iter().sum::<f64>() / values.len() as f64,
        AggregateFunction::Sum => values.iter().sum(),
        AggregateFunction::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        AggregateFunction::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        AggregateFunction::Count => values.len() as f64,
    };
    Ok(Value::Float64(result))
}

/// Groups the selected rows by the non-missing values of a column.
///
/// Groups are returned in order of first appearance.
#[must_use]
pub fn group_rows(column: &ColumnStorage, rows: &[usize]) -> Vec<(Value, Vec<usize>)> {
    let mut index: HashMap<&Value, usize> = HashMap::new();
    let mut groups: Vec<(Value, Vec<usize>)> = Vec::new();
    for &row in rows {
        let Some(key) = column.get(row).filter(|v| !v.is_null()) else {
            continue;
        };
        match index.get(key) {
            Some(&g) => groups[g].1.push(row),
            None => {
                index.insert(key, groups.len());
                groups.push((key.clone(), vec![row]));
            }
        }
    }
    groups
}

/// Per-group aggregate, largest first, ties in order of first appearance.
///
/// Counts are labelled `Count`; other functions `fn(column)`.
///
/// # Errors
///
/// Returns `UnknownColumn` for missing columns and propagates reduction errors.
pub fn group_aggregate(
    dataset: &Dataset,
    rows: &[usize],
    group_by: &str,
    function: AggregateFunction,
    aggregate_column: Option<&str>,
) -> Result<ResultTable> {
    let groups = group_rows(column(dataset, group_by)?, rows);
    let (label, measure) = match (function, aggregate_column) {
        (AggregateFunction::Count, _) | (_, None) => (COUNT_COLUMN.to_string(), None),
        (func, Some(name)) => (format!("{func}({name})"), Some((name, column(dataset, name)?))),
    };

    let mut reduced = Vec::with_capacity(groups.len());
    for (key, members) in groups {
        let value = match measure {
            Some((name, col)) => reduce(function, name, col, &members)?,
            None => count_cell(members.len()),
        };
        reduced.push((key, value));
    }
    // stable: equal aggregates keep first-appearance order
    reduced.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut table = ResultTable::new(vec![group_by.to_string(), label.clone()]);
    for (key, value) in reduced {
        let mut row = Row::new();
        row.set(group_by, key);
        row.set(label.clone(), value);
        table.add_row(row);
    }
    Ok(table)
}

/// Sorted distinct non-missing values of a column over the selected rows.
#[must_use]
pub fn distinct_sorted(column: &ColumnStorage, rows: &[usize]) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut values: Vec<Value> = rows
        .iter()
        .filter_map(|&row| column.get(row))
        .filter(|v| !v.is_null() && seen.insert(*v))
        .cloned()
        .collect();
    values.sort_by(Value::total_cmp);
    values
}
