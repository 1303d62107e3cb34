//! hrql - questions over employee data
//!
//! Free-text questions are classified as small talk, follow-ups, employee
//! lookups or data questions. Data questions go through a rule cascade that
//! produces a [`QueryDescriptor`], which is executed against an in-memory
//! [`Dataset`] and paired with a chart recommendation and a one-line reply.

pub mod catalog;
pub mod chart;
pub mod config;
pub mod error;
pub mod executor;
pub mod intent;
pub mod parser;
pub mod resolver;
pub mod session;
pub mod storage;
pub mod summary;
pub mod text;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

pub use catalog::{ColumnCatalog, ColumnDef, SemanticType};
pub use chart::ChartKind;
pub use config::EngineConfig;
pub use error::{ErrorKind, HrqlError, Result};
pub use executor::QueryExecutor;
pub use parser::{QueryDescriptor, QueryParser};
pub use session::{Session, SessionStore};
pub use storage::{CsvImportConfig, Dataset, DatasetLoader, ImportResult};
pub use types::{ResultTable, Row, Value};

use session::context::{self, ContextCues};

/// How a turn was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    /// Small talk; no query ran.
    Conversational,
    /// A query ran and returned rows.
    Answered,
    /// A query ran and matched nothing.
    EmptyResult,
    /// The question could not be answered.
    Failed(ErrorKind),
}

/// Everything produced for one user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub reply: String,
    pub descriptor: Option<QueryDescriptor>,
    pub result: Option<ResultTable>,
    pub chart: Option<ChartKind>,
    pub status: AnswerStatus,
    /// Loose column interpretations worth showing the user.
    pub notes: Vec<String>,
}

impl Answer {
    fn conversational(reply: String) -> Self {
        Answer {
            reply,
            descriptor: None,
            result: None,
            chart: None,
            status: AnswerStatus::Conversational,
            notes: Vec::new(),
        }
    }

    fn failed(error: &HrqlError) -> Self {
        Answer {
            reply: error.to_string(),
            descriptor: None,
            result: None,
            chart: None,
            status: AnswerStatus::Failed(error.kind()),
            notes: Vec::new(),
        }
    }

    fn empty(reply: String, descriptor: QueryDescriptor, result: ResultTable) -> Self {
        Answer {
            reply,
            descriptor: Some(descriptor),
            result: Some(result),
            chart: None,
            status: AnswerStatus::EmptyResult,
            notes: Vec::new(),
        }
    }

    /// Returns true when a query ran and returned rows.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.status == AnswerStatus::Answered
    }
}

/// Question answering over one read-only dataset.
///
/// The engine holds no conversation state; callers pass a [`Session`] into
/// every turn. One engine can serve any number of sessions.
#[derive(Debug, Clone)]
pub struct Engine {
    catalog: Arc<ColumnCatalog>,
    dataset: Arc<Dataset>,
    parser: QueryParser,
    executor: QueryExecutor,
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine over an already derived dataset.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an invalid configuration and
    /// `SchemaError` if the dataset lacks the identifier column.
    pub fn new(catalog: Arc<ColumnCatalog>, dataset: Arc<Dataset>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        if !dataset.has_column(catalog.identifier()) {
            return Err(HrqlError::SchemaError(format!(
                "dataset has no '{}' column",
                catalog.identifier()
            )));
        }
        Ok(Engine {
            parser: QueryParser::new(Arc::clone(&catalog), config.clone()),
            executor: QueryExecutor::new(config.clone()),
            catalog,
            dataset,
            config,
        })
    }

    /// Creates an engine over the employee catalog with default settings.
    ///
    /// # Errors
    ///
    /// See [`Engine::new`].
    pub fn employees(dataset: Dataset) -> Result<Self> {
        Self::new(
            Arc::new(ColumnCatalog::employees()),
            Arc::new(dataset),
            EngineConfig::default(),
        )
    }

    /// Loads an employee CSV and builds an engine over it.
    ///
    /// # Errors
    ///
    /// Returns import errors from the loader and the errors of [`Engine::new`].
    pub fn from_csv(
        path: &Path,
        csv_config: CsvImportConfig,
        config: EngineConfig,
    ) -> Result<(Self, ImportResult)> {
        let catalog = Arc::new(ColumnCatalog::employees());
        let (dataset, import) = DatasetLoader::new(Arc::clone(&catalog), csv_config).load_path(path)?;
        let engine = Self::new(catalog, Arc::new(dataset), config)?;
        Ok((engine, import))
    }

    #[must_use]
    pub fn catalog(&self) -> &ColumnCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn parser(&self) -> &QueryParser {
        &self.parser
    }

    /// Answers one user turn, updating the session.
    ///
    /// Failures are reported through [`AnswerStatus::Failed`] and recorded as
    /// the turn's reply; they never abort the conversation.
    pub fn ask(&self, session: &mut Session, question: &str) -> Answer {
        self.ask_at(session, question, &Local::now())
    }

    /// Like [`Engine::ask`] with a fixed clock for date and time replies.
    pub fn ask_at<Tz: TimeZone>(&self, session: &mut Session, question: &str, now: &DateTime<Tz>) -> Answer
    where
        Tz::Offset: std::fmt::Display,
    {
        let recent = session.recent_user_turns(self.config.history_window);
        let cues = ContextCues::from_history(&recent, question);
        session.push_user(question);

        let answer = match self.respond(session, question, &cues, now) {
            Ok(answer) => answer,
            Err(error) => {
                warn!(%error, kind = ?error.kind(), "question failed");
                Answer::failed(&error)
            }
        };
        debug!(status = ?answer.status, chart = ?answer.chart, "turn answered");
        session.push_assistant(answer.reply.clone());
        answer
    }

    /// Answers a turn in a stored session.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` for an unknown id.
    pub fn ask_session(&self, store: &SessionStore, id: Uuid, question: &str) -> Result<Answer> {
        let handle = store.get(id)?;
        let mut session = handle.lock();
        Ok(self.ask(&mut session, question))
    }

    fn respond<Tz: TimeZone>(
        &self,
        session: &mut Session,
        question: &str,
        cues: &ContextCues,
        now: &DateTime<Tz>,
    ) -> Result<Answer>
    where
        Tz::Offset: std::fmt::Display,
    {
        if let Some(intent) = intent::classify_at(question, now) {
            debug!(intent = %intent.name, "small talk");
            return Ok(Answer::conversational(cues.frame_intent(&intent.reply)));
        }

        let entity = context::entity_id(question);
        if context::is_follow_up(question) {
            match entity {
                Some(id) if session.last_entity_id() == Some(id) => return self.expand_entity(id),
                // "details for employee N" opening a conversation is a plain lookup.
                Some(_) if session.last_descriptor().is_none() => {}
                _ => {
                    if let Some(answer) = self.expand_previous(session, question)? {
                        return Ok(answer);
                    }
                }
            }
        }

        if let Some(id) = entity {
            return self.lookup_entity(session, question, id, cues);
        }
        self.answer_query(session, question, cues)
    }

    fn lookup_entity(&self, session: &mut Session, question: &str, id: i64, cues: &ContextCues) -> Result<Answer> {
        let descriptor = context::entity_descriptor(id, &self.dataset, self.catalog.identifier());
        let result = self.executor.execute(&self.dataset, &descriptor)?;
        let Some(row) = result.get_row(0) else {
            let reply = format!("No employee found with ID {id}. Please check the ID or try another query.");
            return Ok(Answer::empty(reply, descriptor, result));
        };

        let reply = cues.frame_entity(id, &summary::entity_details(id, row));
        let involved = chart::columns_involved(&descriptor, &self.catalog);
        let chart = chart::recommend(question, &involved, &self.catalog);
        session.record_entity(id);
        session.record_query(descriptor.clone(), result.clone());
        Ok(Answer {
            reply,
            descriptor: Some(descriptor),
            result: Some(result),
            chart: Some(chart),
            status: AnswerStatus::Answered,
            notes: Vec::new(),
        })
    }

    fn expand_entity(&self, id: i64) -> Result<Answer> {
        let descriptor = context::expanded_entity_descriptor(id, &self.dataset, self.catalog.identifier());
        let result = self.executor.execute(&self.dataset, &descriptor)?;
        let Some(row) = result.get_row(0) else {
            return Ok(Answer::empty(
                format!("No additional details found for Employee {id}."),
                descriptor,
                result,
            ));
        };

        let reply = summary::expanded_details(id, row, &result.columns);
        let metrics = result.has_column(catalog::columns::ANNUAL_SALARY)
            && result.has_column(catalog::columns::NUMBER_OF_PROJECTS);
        Ok(Answer {
            reply,
            descriptor: Some(descriptor),
            result: Some(result),
            chart: metrics.then_some(ChartKind::Bar),
            status: AnswerStatus::Answered,
            notes: Vec::new(),
        })
    }

    /// Re-runs the previous query with more columns. `None` means the
    /// previous result has no employee rows to expand and the question should
    /// be handled as a new one.
    fn expand_previous(&self, session: &mut Session, question: &str) -> Result<Option<Answer>> {
        let Some(previous) = session.last_descriptor() else {
            return Err(HrqlError::UnresolvedFollowUp(
                "please specify what you're looking for".to_string(),
            ));
        };
        let has_rows = session
            .last_result()
            .is_some_and(|r| r.has_column(self.catalog.identifier()));
        if !has_rows {
            return Ok(None);
        }

        let derived = context::derive_follow_up(previous, &self.dataset, self.config.follow_up_extra_columns);
        let result = self.executor.execute(&self.dataset, &derived)?;
        if result.is_empty() {
            return Err(HrqlError::UnresolvedFollowUp(
                "the previous query returned no employees".to_string(),
            ));
        }

        let involved = chart::columns_involved(&derived, &self.catalog);
        let answer = Answer {
            reply: summary::follow_up_summary(&result),
            descriptor: Some(derived.clone()),
            result: Some(result.clone()),
            chart: Some(chart::recommend(question, &involved, &self.catalog)),
            status: AnswerStatus::Answered,
            notes: Vec::new(),
        };
        session.record_query(derived, result);
        Ok(Some(answer))
    }

    fn answer_query(&self, session: &mut Session, question: &str, cues: &ContextCues) -> Result<Answer> {
        let descriptor = self.parser.parse(question)?;
        let result = self.executor.execute(&self.dataset, &descriptor)?;
        let notes = summary::interpretation_notes(
            self.parser.resolver(),
            question,
            self.config.word_match_threshold,
        );
        if result.is_empty() || is_empty_aggregate(&descriptor, &result) {
            let mut answer = Answer::empty(summary::EMPTY_RESULT_REPLY.to_string(), descriptor, result);
            answer.notes = notes;
            return Ok(answer);
        }

        let involved = chart::columns_involved(&descriptor, &self.catalog);
        let chart = chart::recommend(question, &involved, &self.catalog);
        let reply = cues.frame_answer(&summary::summarize(&descriptor, &result));
        session.record_query(descriptor.clone(), result.clone());
        Ok(Answer {
            reply,
            descriptor: Some(descriptor),
            result: Some(result),
            chart: Some(chart),
            status: AnswerStatus::Answered,
            notes,
        })
    }
}

/// A non-count aggregate over zero selected rows yields a single null cell.
fn is_empty_aggregate(descriptor: &QueryDescriptor, result: &ResultTable) -> bool {
    descriptor.operation == parser::Operation::Aggregate
        && !descriptor.is_total_count()
        && result.scalar_value().map_or(true, Value::is_null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::columns;
    use chrono::Utc;

    fn engine() -> Engine {
        let names = [
            columns::EMPLOYEE_ID,
            columns::DEPARTMENT,
            columns::GENDER,
            columns::JOB_TITLE,
            columns::ANNUAL_SALARY,
            columns::NUMBER_OF_PROJECTS,
        ];
        let rows = vec![
            vec![Value::Int64(1), Value::text("Sales"), Value::text("Male"), Value::text("Data Analyst"), Value::Int64(60_000), Value::Int64(2)],
            vec![Value::Int64(2), Value::text("IT"), Value::text("Female"), Value::text("Engineer"), Value::Int64(95_000), Value::Int64(5)],
        ];
        let dataset = Dataset::from_rows(names.iter().map(|s| (*s).to_string()).collect(), rows).unwrap();
        Engine::employees(dataset).unwrap()
    }

    #[test]
    fn test_small_talk_short_circuits() {
        let engine = engine();
        let mut session = Session::new();
        let now = Utc::now();
        let answer = engine.ask_at(&mut session, "hello", &now);
        assert_eq!(answer.status, AnswerStatus::Conversational);
        let answer = engine.ask_at(&mut session, "thanks", &now);
        assert!(answer.reply.starts_with("Following our chat, "));
        assert_eq!(session.turns().len(), 4);
    }

    #[test]
    fn test_failures_become_replies() {
        let engine = engine();
        let mut session = Session::new();
        let answer = engine.ask(&mut session, "blorp zzz");
        assert_eq!(answer.status, AnswerStatus::Failed(ErrorKind::UnresolvedQuery));
        assert_eq!(session.turns().last().map(|t| t.text.as_str()), Some(answer.reply.as_str()));
    }

    #[test]
    fn test_follow_up_without_context() {
        let engine = engine();
        let mut session = Session::new();
        let answer = engine.ask(&mut session, "tell me more");
        assert_eq!(answer.status, AnswerStatus::Failed(ErrorKind::UnresolvedFollowUp));
    }

    #[test]
    fn test_missing_identifier_is_rejected() {
        let dataset = Dataset::new(vec![columns::DEPARTMENT.to_string()]).unwrap();
        assert!(matches!(Engine::employees(dataset), Err(HrqlError::SchemaError(_))));
    }
}
