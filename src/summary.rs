//! Natural-language replies for answered questions.

use std::fmt::Write;

use crate::parser::{AggregateFunction, Operation, QueryDescriptor, COUNT_COLUMN, COUNT_EMPLOYEES};
use crate::resolver::ColumnResolver;
use crate::session::context::ENTITY_FIELDS;
use crate::types::{ResultTable, Row, Value};

/// Reply for a data question whose result has no rows.
pub const EMPTY_RESULT_REPLY: &str = "No employees found matching the criteria.";

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn spoken(column: &str) -> String {
    column.replace('_', " ")
}

fn format_number(value: &Value) -> String {
    match value {
        Value::Float64(v) => format!("{v:.2}"),
        Value::Null => "no data".to_string(),
        other => other.to_string(),
    }
}

fn joined<'a>(values: impl IntoIterator<Item = &'a Value>) -> String {
    values
        .into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// One-line reply describing a non-empty result.
#[must_use]
pub fn summarize(descriptor: &QueryDescriptor, result: &ResultTable) -> String {
    let scalar = || result.scalar_value().map_or_else(|| "no data".to_string(), format_number);
    match descriptor.operation {
        Operation::ListUnique => {
            let column = descriptor.list_column.as_deref().unwrap_or_default();
            format!("Unique {column}: {}", joined(result.column_values(column)))
        }
        Operation::CountValue => {
            let value = descriptor.count_value.as_ref().map(ToString::to_string).unwrap_or_default();
            format!("Count of {value}: {}", scalar())
        }
        Operation::Aggregate if descriptor.is_total_count() => {
            format!("Count of employees: {}", scalar())
        }
        Operation::Aggregate => {
            let function = descriptor.aggregate_function.map_or("", |f| f.name());
            let column = descriptor.aggregate_column.as_deref().unwrap_or_default();
            format!("{} of {column}: {}", capitalize(function), scalar())
        }
        Operation::GroupAggregate => {
            let group = descriptor.group_by_column.as_deref().unwrap_or_default();
            let label = result.columns.get(1).map_or(COUNT_COLUMN, String::as_str);
            let pairs: Vec<String> = result
                .rows
                .iter()
                .map(|row| {
                    let key = row.get(group).map(ToString::to_string).unwrap_or_default();
                    let value = row.get(label).map(format_number).unwrap_or_default();
                    format!("{key}: {value}")
                })
                .collect();
            let heading = match descriptor.aggregate_function {
                Some(AggregateFunction::Count) | None => "Count".to_string(),
                Some(func) => format!(
                    "{} of {}",
                    capitalize(func.name()),
                    descriptor.aggregate_column.as_deref().unwrap_or(COUNT_EMPLOYEES)
                ),
            };
            format!("{heading} by {group}: {}", pairs.join(", "))
        }
        Operation::GroupTop => format!(
            "Top employees by {} per {}: {} rows.",
            descriptor.sort_column.as_deref().unwrap_or_default(),
            descriptor.group_by_column.as_deref().unwrap_or_default(),
            result.row_count()
        ),
        Operation::Sort | Operation::Filter => {
            format!("Found {} employees matching the criteria.", result.row_count())
        }
    }
}

/// Multi-line profile of one employee.
#[must_use]
pub fn entity_details(id: i64, row: &Row) -> String {
    let mut lines = vec![format!("Employee ID: {id}")];
    for (column, label) in ENTITY_FIELDS {
        if let Some(value) = row.get(column) {
            lines.push(format!("{label}: {value}"));
        }
    }
    lines.join("\n")
}

/// Additional metrics of one employee, one per line.
#[must_use]
pub fn expanded_details(id: i64, row: &Row, columns: &[String]) -> String {
    let mut reply = format!("Following up on Employee {id}, here are more details:");
    for (column, value) in columns.iter().skip(1).filter_map(|c| row.get(c).map(|v| (c, v))) {
        let _ = write!(reply, "\n{}: {value}", spoken(column));
    }
    reply
}

/// Reply for a follow-up that re-ran the previous query with more columns.
#[must_use]
pub fn follow_up_summary(result: &ResultTable) -> String {
    format!(
        "Following up on your previous query, here are more details: Found {} employees.",
        result.row_count()
    )
}

/// Notes for question words that were matched to a column only loosely.
#[must_use]
pub fn interpretation_notes(resolver: &ColumnResolver, question: &str, threshold: u8) -> Vec<String> {
    resolver
        .extract_keywords(question, threshold)
        .iter()
        .filter_map(|m| m.interpretation_note())
        .collect()
}
