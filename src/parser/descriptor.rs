//! Structured query produced by the parser and consumed by the executor.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HrqlError, Result};
use crate::types::Value;

/// Output column of a total employee count.
pub const COUNT_EMPLOYEES: &str = "count(employees)";

/// Count column of a grouped aggregation.
pub const COUNT_COLUMN: &str = "Count";

/// Kind of query a question was classified as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Row selection with projection.
    #[default]
    Filter,
    /// Single aggregate over the filtered rows.
    Aggregate,
    /// Count of rows holding one specific value.
    CountValue,
    /// Row count per distinct group value.
    GroupAggregate,
    /// Sorted distinct values of one column.
    ListUnique,
    /// Top rows within each group.
    GroupTop,
    /// Global top/bottom rows.
    Sort,
}

impl Operation {
    /// Returns the operation name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Filter => "filter",
            Operation::Aggregate => "aggregate",
            Operation::CountValue => "count_value",
            Operation::GroupAggregate => "group_aggregate",
            Operation::ListUnique => "list_unique",
            Operation::GroupTop => "group_top",
            Operation::Sort => "sort",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Comparison applied by a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    GreaterThan,
    LessThan,
    /// Inclusive on both ends.
    Between,
    /// Case-insensitive substring.
    Contains,
}

impl ConditionOperator {
    /// Returns the operator symbol.
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "==",
            ConditionOperator::GreaterThan => ">",
            ConditionOperator::LessThan => "<",
            ConditionOperator::Between => "between",
            ConditionOperator::Contains => "contains",
        }
    }
}

/// Operand of a condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionValue {
    Single(Value),
    Range(Value, Value),
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::Single(v) => write!(f, "{v}"),
            ConditionValue::Range(lo, hi) => write!(f, "{lo} and {hi}"),
        }
    }
}

/// A single conjunctive filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    pub column: String,
    pub operator: ConditionOperator,
    pub value: ConditionValue,
}

impl Condition {
    /// Creates a condition with a single operand.
    #[must_use]
    pub fn new(column: impl Into<String>, operator: ConditionOperator, value: Value) -> Self {
        Condition {
            column: column.into(),
            operator,
            value: ConditionValue::Single(value),
        }
    }

    #[must_use]
    pub fn equals(column: impl Into<String>, value: Value) -> Self {
        Self::new(column, ConditionOperator::Equals, value)
    }

    #[must_use]
    pub fn greater_than(column: impl Into<String>, value: Value) -> Self {
        Self::new(column, ConditionOperator::GreaterThan, value)
    }

    #[must_use]
    pub fn less_than(column: impl Into<String>, value: Value) -> Self {
        Self::new(column, ConditionOperator::LessThan, value)
    }

    #[must_use]
    pub fn contains(column: impl Into<String>, value: Value) -> Self {
        Self::new(column, ConditionOperator::Contains, value)
    }

    /// Creates an inclusive range condition.
    #[must_use]
    pub fn between(column: impl Into<String>, low: Value, high: Value) -> Self {
        Condition {
            column: column.into(),
            operator: ConditionOperator::Between,
            value: ConditionValue::Range(low, high),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.operator.symbol(), self.value)
    }
}

/// Aggregate function applied by `aggregate` and `group_aggregate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateFunction {
    Mean,
    Sum,
    Count,
    Max,
    Min,
}

impl AggregateFunction {
    /// Returns the function name used in output column labels.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Mean => "mean",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Count => "count",
            AggregateFunction::Max => "max",
            AggregateFunction::Min => "min",
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Structured form of a data question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub operation: Operation,
    /// Conjunctive filters, in extraction order.
    pub conditions: Vec<Condition>,
    /// Projected columns, insertion-ordered and unique.
    pub output_columns: Vec<String>,
    pub aggregate_function: Option<AggregateFunction>,
    pub aggregate_column: Option<String>,
    pub group_by_column: Option<String>,
    pub list_column: Option<String>,
    /// Value counted by `count_value`, paired with `aggregate_column`.
    pub count_value: Option<Value>,
    pub sort_column: Option<String>,
    pub sort_direction: Option<SortDirection>,
    pub limit: Option<usize>,
}

impl QueryDescriptor {
    /// Creates an empty filter descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a total-count descriptor.
    #[must_use]
    pub fn count() -> Self {
        QueryDescriptor {
            operation: Operation::Aggregate,
            aggregate_function: Some(AggregateFunction::Count),
            output_columns: vec![COUNT_EMPLOYEES.to_string()],
            ..Self::default()
        }
    }

    /// Appends an output column unless already present.
    pub fn push_output(&mut self, column: impl Into<String>) {
        let column = column.into();
        if !self.output_columns.contains(&column) {
            self.output_columns.push(column);
        }
    }

    /// Moves or inserts an output column at the front.
    pub fn push_output_front(&mut self, column: &str) {
        if self.output_columns.first().map(String::as_str) == Some(column) {
            return;
        }
        self.output_columns.retain(|c| c != column);
        self.output_columns.insert(0, column.to_string());
    }

    /// Appends a condition unless an identical one exists.
    pub fn add_condition(&mut self, condition: Condition) {
        if !self.conditions.contains(&condition) {
            self.conditions.push(condition);
        }
    }

    /// Returns true for the total-count shape.
    #[must_use]
    pub fn is_total_count(&self) -> bool {
        self.operation == Operation::Aggregate
            && self.aggregate_function == Some(AggregateFunction::Count)
    }

    /// Name of the single output column of `aggregate` and `count_value`.
    #[must_use]
    pub fn aggregate_label(&self) -> Option<String> {
        match self.operation {
            Operation::CountValue => self.count_value.as_ref().map(|v| format!("count({v})")),
            Operation::Aggregate => match (self.aggregate_function, &self.aggregate_column) {
                (Some(AggregateFunction::Count), _) => Some(COUNT_EMPLOYEES.to_string()),
                (Some(func), Some(column)) => Some(format!("{func}({column})")),
                _ => None,
            },
            _ => None,
        }
    }

    /// Every dataset column the descriptor names, first mention first.
    ///
    /// Synthetic output labels such as `count(employees)` are included; callers
    /// filter them against the catalog.
    #[must_use]
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        let singles = [
            &self.aggregate_column,
            &self.group_by_column,
            &self.list_column,
            &self.sort_column,
        ];
        let names = self
            .output_columns
            .iter()
            .map(String::as_str)
            .chain(singles.into_iter().filter_map(|c| c.as_deref()));
        for name in names {
            if !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }

    /// Checks that the fields required by `operation` are populated.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDescriptor` naming the first missing field.
    pub fn validate(&self) -> Result<()> {
        let missing = |field: &str| -> Result<()> {
            Err(HrqlError::InvalidDescriptor(format!(
                "{} requires {field}",
                self.operation
            )))
        };
        match self.operation {
            Operation::Filter => {}
            Operation::Aggregate => {
                let Some(func) = self.aggregate_function else {
                    return missing("aggregate_function");
                };
                if func != AggregateFunction::Count && self.aggregate_column.is_none() {
                    return missing("aggregate_column");
                }
            }
            Operation::CountValue => {
                if self.aggregate_column.is_none() {
                    return missing("aggregate_column");
                }
                if self.count_value.is_none() {
                    return missing("count_value");
                }
            }
            Operation::GroupAggregate => {
                if self.group_by_column.is_none() {
                    return missing("group_by_column");
                }
                if self.aggregate_function.is_none() {
                    return missing("aggregate_function");
                }
            }
            Operation::ListUnique => {
                if self.list_column.is_none() {
                    return missing("list_column");
                }
            }
            Operation::GroupTop => {
                if self.group_by_column.is_none() {
                    return missing("group_by_column");
                }
                if self.sort_column.is_none() {
                    return missing("sort_column");
                }
                if self.limit.is_none() {
                    return missing("limit");
                }
            }
            Operation::Sort => {
                if self.sort_column.is_none() {
                    return missing("sort_column");
                }
                if self.sort_direction.is_none() {
                    return missing("sort_direction");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_columns_are_unique_and_ordered() {
        let mut d = QueryDescriptor::new();
        d.push_output("Department");
        d.push_output("Annual_Salary");
        d.push_output("Department");
        d.push_output_front("Employee_ID");
        d.push_output_front("Annual_Salary");
        assert_eq!(d.output_columns, vec!["Annual_Salary", "Employee_ID", "Department"]);
    }

    #[test]
    fn test_conditions_deduplicated() {
        let mut d = QueryDescriptor::new();
        d.add_condition(Condition::equals("Gender", Value::text("Male")));
        d.add_condition(Condition::equals("Gender", Value::text("Male")));
        assert_eq!(d.conditions.len(), 1);
    }

    #[test]
    fn test_validate_shapes() {
        assert!(QueryDescriptor::new().validate().is_ok());
        assert!(QueryDescriptor::count().validate().is_ok());

        let mut mean = QueryDescriptor::count();
        mean.aggregate_function = Some(AggregateFunction::Mean);
        assert!(mean.validate().is_err());
        mean.aggregate_column = Some("Age".into());
        assert!(mean.validate().is_ok());

        let group_top = QueryDescriptor {
            operation: Operation::GroupTop,
            group_by_column: Some("Department".into()),
            sort_column: Some("Performance_Score".into()),
            ..QueryDescriptor::default()
        };
        let err = group_top.validate().unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    #[test]
    fn test_aggregate_labels() {
        assert_eq!(
            QueryDescriptor::count().aggregate_label().as_deref(),
            Some(COUNT_EMPLOYEES)
        );
        let d = QueryDescriptor {
            operation: Operation::CountValue,
            aggregate_column: Some("Gender".into()),
            count_value: Some(Value::text("Male")),
            ..QueryDescriptor::default()
        };
        assert_eq!(d.aggregate_label().as_deref(), Some("count(Male)"));
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(Operation::GroupTop.name(), "group_top");
        assert_eq!(ConditionOperator::Contains.symbol(), "contains");
    }
}
