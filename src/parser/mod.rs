//! Question parser: turns a free-text data question into a [`QueryDescriptor`].
//!
//! The parser is a priority-ordered cascade of pure stages (see `stages`).
//! Matching is keyword and pattern based; questions outside the covered
//! phrasings are reported as unresolved.

pub mod descriptor;
pub(crate) mod patterns;
mod stages;

use std::sync::Arc;

use tracing::debug;

use crate::catalog::ColumnCatalog;
use crate::config::EngineConfig;
use crate::error::{HrqlError, Result};
use crate::resolver::ColumnResolver;
use crate::text::normalize;

pub use descriptor::{
    AggregateFunction, Condition, ConditionOperator, ConditionValue, Operation, QueryDescriptor,
    SortDirection, COUNT_COLUMN, COUNT_EMPLOYEES,
};

/// Phrasings suggested when a question cannot be interpreted.
pub const EXAMPLE_QUESTIONS: &[&str] = &[
    "Employee 123",
    "Employee ID with salary > 90000",
    "List departments",
    "Count of males",
    "Average salary for analyst",
    "Employees with high performance level",
];

/// Rule-cascade parser bound to a column catalog.
#[derive(Debug, Clone)]
pub struct QueryParser {
    catalog: Arc<ColumnCatalog>,
    resolver: ColumnResolver,
    config: EngineConfig,
}

impl QueryParser {
    /// Creates a parser over the given catalog.
    #[must_use]
    pub fn new(catalog: Arc<ColumnCatalog>, config: EngineConfig) -> Self {
        let resolver = ColumnResolver::new(Arc::clone(&catalog));
        QueryParser {
            catalog,
            resolver,
            config,
        }
    }

    /// Returns the resolver used for column inference.
    #[must_use]
    pub fn resolver(&self) -> &ColumnResolver {
        &self.resolver
    }

    /// Parses a question into a query descriptor.
    ///
    /// # Errors
    ///
    /// Returns `UnknownColumn` when an aggregate names no resolvable column, and
    /// `UnresolvedQuery` when no stage recognized an operation, condition or topic.
    pub fn parse(&self, question: &str) -> Result<QueryDescriptor> {
        let normalized = normalize(question);
        let mut state =
            stages::ParseState::new(&normalized, &self.catalog, &self.resolver, &self.config);

        for (name, stage) in stages::STAGES {
            state = stage(state)?;
            debug!(
                stage = name,
                operation = %state.descriptor.operation,
                conditions = state.descriptor.conditions.len(),
                "parser stage"
            );
        }

        let unresolved = state.descriptor.operation == Operation::Filter
            && state.descriptor.conditions.is_empty()
            && !state.topic_matched;
        if unresolved {
            return Err(self.unresolved());
        }

        state.descriptor.validate()?;
        Ok(state.descriptor)
    }

    /// Builds the unresolved-query error for this catalog.
    #[must_use]
    pub fn unresolved(&self) -> HrqlError {
        HrqlError::UnresolvedQuery {
            known_columns: self.catalog.names().into_iter().map(str::to_string).collect(),
            examples: EXAMPLE_QUESTIONS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}
