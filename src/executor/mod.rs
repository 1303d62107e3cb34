//! Query execution against the in-memory dataset.
//!
//! Execution is a pure function of (dataset, descriptor): conditions select
//! rows, then the operation shapes the result table.

mod aggregate;
mod filter;
mod project;
mod rank;

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{HrqlError, Result};
use crate::parser::{AggregateFunction, Operation, QueryDescriptor, SortDirection};
use crate::storage::Dataset;
use crate::types::{ResultTable, Row};

pub use aggregate::{count_matching, distinct_sorted, group_aggregate, group_rows, reduce};
pub use filter::{matches, select_rows};
pub use project::{project, projection};
pub use rank::{group_top_rows, sort_rows};

/// Executes query descriptors.
#[derive(Debug, Clone, Default)]
pub struct QueryExecutor {
    config: EngineConfig,
}

impl QueryExecutor {
    /// Creates an executor with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Returns the executor configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Executes a descriptor and returns its result table.
    ///
    /// An empty table is a valid outcome.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDescriptor` for malformed descriptors, `UnknownColumn`
    /// when a referenced column is missing from the dataset, and
    /// `NonNumericAggregation` when no row in scope has a numeric value.
    pub fn execute(&self, dataset: &Dataset, descriptor: &QueryDescriptor) -> Result<ResultTable> {
        descriptor.validate()?;
        let rows = select_rows(dataset, &descriptor.conditions)?;
        debug!(
            operation = %descriptor.operation,
            conditions = descriptor.conditions.len(),
            rows_in_scope = rows.len(),
            "executing query"
        );

        match descriptor.operation {
            Operation::Filter => project(dataset, &rows, &descriptor.output_columns),
            Operation::CountValue => self.count_value(dataset, &rows, descriptor),
            Operation::Aggregate => self.aggregate(dataset, &rows, descriptor),
            Operation::GroupAggregate => group_aggregate(
                dataset,
                &rows,
                required(descriptor.group_by_column.as_deref(), "group_by_column")?,
                descriptor.aggregate_function.unwrap_or(AggregateFunction::Count),
                descriptor.aggregate_column.as_deref(),
            ),
            Operation::ListUnique => {
                let name = required(descriptor.list_column.as_deref(), "list_column")?;
                let values = distinct_sorted(aggregate::column(dataset, name)?, &rows);
                let mut table = ResultTable::new(vec![name.to_string()]);
                for value in values {
                    let mut row = Row::new();
                    row.set(name, value);
                    table.add_row(row);
                }
                Ok(table)
            }
            Operation::GroupTop => {
                let selected = group_top_rows(
                    dataset,
                    &rows,
                    required(descriptor.group_by_column.as_deref(), "group_by_column")?,
                    required(descriptor.sort_column.as_deref(), "sort_column")?,
                    descriptor.sort_direction.unwrap_or(SortDirection::Desc),
                    descriptor.limit.unwrap_or(self.config.default_limit),
                    self.config.keep_group_top_ties,
                )?;
                project(dataset, &selected, &descriptor.output_columns)
            }
            Operation::Sort => {
                let selected = sort_rows(
                    dataset,
                    &rows,
                    required(descriptor.sort_column.as_deref(), "sort_column")?,
                    descriptor.sort_direction.unwrap_or(SortDirection::Desc),
                    descriptor.limit,
                )?;
                project(dataset, &selected, &descriptor.output_columns)
            }
        }
    }

    #[allow(clippy::unused_self)]
    fn count_value(
        &self,
        dataset: &Dataset,
        rows: &[usize],
        descriptor: &QueryDescriptor,
    ) -> Result<ResultTable> {
        let name = required(descriptor.aggregate_column.as_deref(), "aggregate_column")?;
        let value = descriptor
            .count_value
            .as_ref()
            .ok_or_else(|| invalid("count_value"))?;
        let count = count_matching(aggregate::column(dataset, name)?, rows, value);
        Ok(ResultTable::scalar(format!("count({value})"), aggregate::count_cell(count)))
    }

    #[allow(clippy::unused_self)]
    fn aggregate(
        &self,
        dataset: &Dataset,
        rows: &[usize],
        descriptor: &QueryDescriptor,
    ) -> Result<ResultTable> {
        let function = descriptor
            .aggregate_function
            .ok_or_else(|| invalid("aggregate_function"))?;
        let label = descriptor
            .aggregate_label()
            .ok_or_else(|| invalid("aggregate_column"))?;
        let value = match (function, descriptor.aggregate_column.as_deref()) {
            (AggregateFunction::Count, _) => aggregate::count_cell(rows.len()),
            (_, Some(name)) => reduce(function, name, aggregate::column(dataset, name)?, rows)?,
            (_, None) => return Err(invalid("aggregate_column")),
        };
        Ok(ResultTable::scalar(label, value))
    }
}

fn invalid(field: &str) -> HrqlError {
    HrqlError::InvalidDescriptor(format!("missing {field}"))
}

fn required<'a>(field: Option<&'a str>, name: &str) -> Result<&'a str> {
    field.ok_or_else(|| invalid(name))
}

/// Executes a descriptor with the default configuration.
///
/// # Errors
///
/// See [`QueryExecutor::execute`].
pub fn execute(dataset: &Dataset, descriptor: &QueryDescriptor) -> Result<ResultTable> {
    QueryExecutor::default().execute(dataset, descriptor)
}
