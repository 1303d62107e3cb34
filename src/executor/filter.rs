//! Condition evaluation.

use std::cmp::Ordering;

use crate::error::{HrqlError, Result};
use crate::parser::{Condition, ConditionOperator, ConditionValue};
use crate::storage::Dataset;
use crate::types::Value;

/// Compares a cell with an operand, coercing the cell to the operand's kind.
///
/// Numbers and dates are compared by value; strings compare case-insensitively.
/// Returns None when the cell cannot be coerced.
fn coerce_cmp(cell: &Value, operand: &Value) -> Option<Ordering> {
    match operand {
        Value::Int64(_) | Value::Float64(_) => cell.to_f64()?.partial_cmp(&operand.to_f64()?),
        Value::Date(_) => Some(cell.to_date()?.cmp(&operand.to_date()?)),
        Value::String(s) => {
            if cell.is_null() {
                return None;
            }
            Some(cell.to_string().to_lowercase().cmp(&s.to_lowercase()))
        }
        Value::Null => None,
    }
}

/// Returns true if a cell satisfies the condition.
///
/// Text equality ignores case, so "sales" matches a "Sales" cell.
#[must_use]
pub fn matches(cell: &Value, condition: &Condition) -> bool {
    match (&condition.operator, &condition.value) {
        (ConditionOperator::Equals, ConditionValue::Single(v)) => {
            coerce_cmp(cell, v) == Some(Ordering::Equal)
        }
        (ConditionOperator::GreaterThan, ConditionValue::Single(v)) if !v.is_text() => {
            coerce_cmp(cell, v) == Some(Ordering::Greater)
        }
        (ConditionOperator::LessThan, ConditionValue::Single(v)) if !v.is_text() => {
            coerce_cmp(cell, v) == Some(Ordering::Less)
        }
        (ConditionOperator::Between, ConditionValue::Range(lo, hi)) => {
            matches!(coerce_cmp(cell, lo), Some(Ordering::Greater | Ordering::Equal))
                && matches!(coerce_cmp(cell, hi), Some(Ordering::Less | Ordering::Equal))
        }
        (ConditionOperator::Contains, ConditionValue::Single(v)) => {
            !cell.is_null()
                && cell
                    .to_string()
                    .to_lowercase()
                    .contains(&v.to_string().to_lowercase())
        }
        _ => false,
    }
}

/// Returns the indices of rows satisfying every condition, in dataset order.
///
/// # Errors
///
/// Returns `UnknownColumn` if a condition names a column the dataset lacks.
pub fn select_rows(dataset: &Dataset, conditions: &[Condition]) -> Result<Vec<usize>> {
    let mut columns = Vec::with_capacity(conditions.len());
    for condition in conditions {
        let column = dataset.column(&condition.column).ok_or_else(|| {
            HrqlError::unknown_column(
                &condition.column,
                dataset.column_names().iter().map(String::as_str),
            )
        })?;
        columns.push((column, condition));
    }

    Ok((0..dataset.row_count())
        .filter(|&row| {
            columns
                .iter()
                .all(|(column, condition)| column.get(row).is_some_and(|v| matches(v, condition)))
        })
        .collect())
}
