//! # Conversation History
//!
//! The ordered list of turns exchanged with the backend. Append-only until
//! `/clear`; a failed request rolls back the user turn that triggered it so
//! the next submission does not carry a dangling, unanswered message.
//!
//! Mutated only from `update()` — background tasks never touch it.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn push_user(&mut self, content: String) {
        self.turns.push(Turn {
            role: Role::User,
            content,
        });
    }

    pub fn push_assistant(&mut self, content: String) {
        self.turns.push(Turn {
            role: Role::Assistant,
            content,
        });
    }

    /// Removes the trailing turn iff it is a user turn. Called when the
    /// request that speculatively appended it has failed. At most one turn
    /// is ever removed, regardless of what else the conversation holds.
    pub fn rollback_user(&mut self) -> bool {
        if matches!(self.turns.last(), Some(t) if t.role == Role::User) {
            self.turns.pop();
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
