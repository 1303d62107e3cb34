//! Follow-up detection, entity references and context phrasing.

use lazy_static::lazy_static;
use regex::Regex;

use crate::catalog::columns;
use crate::parser::patterns::compile;
use crate::parser::{Condition, QueryDescriptor};
use crate::storage::Dataset;
use crate::text::{is_stop_word, lower_first, words};
use crate::types::Value;

lazy_static! {
    static ref ENTITY: Regex = compile(r"(?i)(?:employee\s*id|emp\s*id|employee)\s*(\d+)");
}

/// Fields shown by an employee lookup, with their reply labels.
pub const ENTITY_FIELDS: &[(&str, &str)] = &[
    (columns::DEPARTMENT, "Department"),
    (columns::JOB_TITLE, "Job Title"),
    (columns::PERFORMANCE_LEVEL, "Performance Level"),
    (columns::SATISFACTION_LEVEL, "Satisfaction Level"),
    (columns::RETENTION_RISK_LEVEL, "Retention Risk Level"),
    (columns::REMOTE_WORK_CATEGORY, "Remote Work"),
];

/// Fields added when the user asks for more about the same employee.
pub const EXPANDED_ENTITY_FIELDS: &[&str] = &[
    columns::ANNUAL_SALARY,
    columns::NUMBER_OF_PROJECTS,
    columns::OVERTIME_HOURS,
    columns::YEARS_AT_COMPANY,
];

/// Candidates appended to a previous projection by a follow-up.
pub const FOLLOW_UP_COLUMNS: &[&str] = &[
    columns::EMPLOYEE_ID,
    columns::DEPARTMENT,
    columns::JOB_TITLE,
    columns::ANNUAL_SALARY,
    columns::NUMBER_OF_PROJECTS,
    columns::OVERTIME_HOURS,
];

/// Words that never count as carried-over topics.
const CONTEXT_EXCLUDED: &[&str] = &["employee", "emp", "id", "more", "details", "further"];

const MIN_CONTEXT_WORD: usize = 3;

/// Returns true when the question asks to expand on the previous answer.
///
/// "more" followed by "than" is a comparison, not a follow-up.
#[must_use]
pub fn is_follow_up(question: &str) -> bool {
    let lower = question.to_lowercase();
    let tokens: Vec<&str> = words(&lower).collect();
    tokens.iter().enumerate().any(|(i, w)| match *w {
        "details" | "detail" | "further" => true,
        "more" => tokens.get(i + 1) != Some(&"than"),
        _ => false,
    })
}

/// Employee id named in the question, e.g. "emp id 42".
#[must_use]
pub fn entity_id(question: &str) -> Option<i64> {
    ENTITY
        .captures(question)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// What the recent conversation says about the current question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextCues {
    /// The user has spoken before.
    pub prior_turns: bool,
    /// A topic word of the recent turns reappears in the question.
    pub related: bool,
    /// Last employee id mentioned in the recent turns.
    pub recent_entity: Option<i64>,
}

impl ContextCues {
    /// Compares the question with the given earlier user turns.
    #[must_use]
    pub fn from_history(recent: &[&str], question: &str) -> Self {
        let lower = question.to_lowercase();
        let asked: Vec<&str> = words(&lower).collect();
        let mut related = false;
        let mut recent_entity = None;
        for turn in recent {
            let turn_lower = turn.to_lowercase();
            related |= words(&turn_lower).any(|w| {
                w.len() >= MIN_CONTEXT_WORD
                    && !is_stop_word(w)
                    && !CONTEXT_EXCLUDED.contains(&w)
                    && asked.contains(&w)
            });
            if let Some(id) = entity_id(turn) {
                recent_entity = Some(id);
            }
        }
        ContextCues {
            prior_turns: !recent.is_empty(),
            related,
            recent_entity,
        }
    }

    /// Prefixes a data answer with how it relates to earlier turns.
    #[must_use]
    pub fn frame_answer(&self, summary: &str) -> String {
        if self.related {
            format!("Following up on your previous interest in similar topics, {}", lower_first(summary))
        } else if self.prior_turns {
            format!("Moving on from our previous chat, {}", lower_first(summary))
        } else {
            summary.to_string()
        }
    }

    /// Prefixes a small-talk reply once the conversation is under way.
    #[must_use]
    pub fn frame_intent(&self, reply: &str) -> String {
        if self.prior_turns {
            format!("Following our chat, {}", lower_first(reply))
        } else {
            reply.to_string()
        }
    }

    /// Prefixes an employee lookup reply.
    #[must_use]
    pub fn frame_entity(&self, id: i64, details: &str) -> String {
        if self.recent_entity == Some(id) {
            format!("Continuing our discussion about Employee {id}, here are the details:\n{details}")
        } else if self.related {
            format!("Moving on from our previous chat, here are details for Employee {id}:\n{details}")
        } else {
            details.to_string()
        }
    }
}

fn lookup(id: i64, dataset: &Dataset, identifier: &str, fields: &[&str]) -> QueryDescriptor {
    let mut descriptor = QueryDescriptor::new();
    descriptor.add_condition(Condition::equals(identifier, Value::Int64(id)));
    descriptor.push_output(identifier);
    for field in fields.iter().filter(|f| dataset.has_column(f)) {
        descriptor.push_output(*field);
    }
    descriptor
}

/// Filter descriptor for a single employee's profile.
#[must_use]
pub fn entity_descriptor(id: i64, dataset: &Dataset, identifier: &str) -> QueryDescriptor {
    let fields: Vec<&str> = ENTITY_FIELDS.iter().map(|(c, _)| *c).collect();
    lookup(id, dataset, identifier, &fields)
}

/// Filter descriptor for the additional metrics of one employee.
#[must_use]
pub fn expanded_entity_descriptor(id: i64, dataset: &Dataset, identifier: &str) -> QueryDescriptor {
    lookup(id, dataset, identifier, EXPANDED_ENTITY_FIELDS)
}

/// Copy of `previous` with up to `extra` more columns projected.
///
/// Only columns present in the dataset and not yet projected are added. A
/// projection that is already every column is left alone.
#[must_use]
pub fn derive_follow_up(previous: &QueryDescriptor, dataset: &Dataset, extra: usize) -> QueryDescriptor {
    let mut derived = previous.clone();
    if derived.output_columns.is_empty() {
        return derived;
    }
    let additions: Vec<&str> = FOLLOW_UP_COLUMNS
        .iter()
        .copied()
        .filter(|c| dataset.has_column(c) && !previous.output_columns.iter().any(|o| o == c))
        .take(extra)
        .collect();
    for column in additions {
        derived.push_output(column);
    }
    derived
}
