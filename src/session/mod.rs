//! Conversation state carried between turns.
//!
//! A [`Session`] holds the turn history and the context needed to answer
//! follow-up questions: the last descriptor and result, and the last employee
//! looked up by id.

pub mod context;
mod store;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::parser::QueryDescriptor;
use crate::types::ResultTable;

pub use context::{entity_id, is_follow_up, ContextCues};
pub use store::{SessionHandle, SessionStore};

/// Reply appended when the user declines a visualization.
pub const NO_VISUALIZATION_REPLY: &str = "Thank you for saving our efforts";

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One message of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// State of one conversation.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    turns: Vec<Turn>,
    last_descriptor: Option<QueryDescriptor>,
    last_result: Option<ResultTable>,
    last_entity_id: Option<i64>,
    visualization_preference: Option<bool>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Starts an empty conversation with a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub(crate) fn with_id(id: Uuid) -> Self {
        Session {
            id,
            turns: Vec::new(),
            last_descriptor: None,
            last_result: None,
            last_entity_id: None,
            visualization_preference: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// All turns, oldest first.
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn last_descriptor(&self) -> Option<&QueryDescriptor> {
        self.last_descriptor.as_ref()
    }

    #[must_use]
    pub fn last_result(&self) -> Option<&ResultTable> {
        self.last_result.as_ref()
    }

    #[must_use]
    pub fn last_entity_id(&self) -> Option<i64> {
        self.last_entity_id
    }

    #[must_use]
    pub fn visualization_preference(&self) -> Option<bool> {
        self.visualization_preference
    }

    /// Returns true once the user has said anything.
    #[must_use]
    pub fn has_user_turns(&self) -> bool {
        self.turns.iter().any(|t| t.role == Role::User)
    }

    /// Text of the last `window` user turns, oldest first.
    #[must_use]
    pub fn recent_user_turns(&self, window: usize) -> Vec<&str> {
        let mut recent: Vec<&str> = self
            .turns
            .iter()
            .rev()
            .filter(|t| t.role == Role::User)
            .take(window)
            .map(|t| t.text.as_str())
            .collect();
        recent.reverse();
        recent
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::User,
            text: text.into(),
        });
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::Assistant,
            text: text.into(),
        });
    }

    /// Remembers the descriptor and result of an answered data question.
    pub fn record_query(&mut self, descriptor: QueryDescriptor, result: ResultTable) {
        self.last_descriptor = Some(descriptor);
        self.last_result = Some(result);
    }

    /// Remembers the employee most recently looked up by id.
    pub fn record_entity(&mut self, id: i64) {
        self.last_entity_id = Some(id);
    }

    /// Records whether the user wants a chart for the last result.
    ///
    /// Declining appends an acknowledgement turn.
    pub fn set_visualization_preference(&mut self, wanted: bool) {
        self.visualization_preference = Some(wanted);
        if !wanted {
            self.push_assistant(NO_VISUALIZATION_REPLY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_user_turns_window() {
        let mut s = Session::new();
        for text in ["one", "two", "three", "four"] {
            s.push_user(text);
            s.push_assistant("ok");
        }
        assert_eq!(s.recent_user_turns(3), vec!["two", "three", "four"]);
        assert_eq!(s.recent_user_turns(0), Vec::<&str>::new());
    }

    #[test]
    fn test_declined_visualization_is_acknowledged() {
        let mut s = Session::new();
        s.set_visualization_preference(true);
        assert!(s.turns().is_empty());
        s.set_visualization_preference(false);
        assert_eq!(s.visualization_preference(), Some(false));
        assert_eq!(s.turns().last().map(|t| t.text.as_str()), Some(NO_VISUALIZATION_REPLY));
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(Session::new().id(), Session::new().id());
    }
}
