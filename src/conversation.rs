//! Conversation Data Model
//!
//! Information Hiding:
//! - Persisted wire names (the storage slot layout) hidden behind serde attributes
//! - Title derivation rule internalized
//! - Turn ordering maintained by append-only construction

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder title for a conversation without a user turn.
pub const UNTITLED: &str = "untitled";

/// Role of a single turn.
///
/// The persisted form uses "bot" for assistant turns; the enum keeps the
/// domain name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "bot")]
    Assistant,
}

/// One role-tagged message within a conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a user turn stamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant turn stamped now.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A titled, ordered sequence of turns; the unit of persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    #[serde(rename = "messages")]
    pub turns: Vec<Turn>,
    #[serde(rename = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Title rule: content of the first user turn, untruncated, or the
    /// fixed placeholder. Truncation is a display concern only.
    pub fn derive_title(turns: &[Turn]) -> String {
        turns
            .iter()
            .find(|t| t.role == Role::User)
            .map(|t| t.content.clone())
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    /// First user turn content, used by history previews.
    pub fn preview(&self) -> Option<&str> {
        self.turns
            .iter()
            .find(|t| t.role == Role::User)
            .map(|t| t.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_title_from_first_user_turn() {
        let turns = vec![
            Turn::assistant("Welcome"),
            Turn::user("what is 5G"),
            Turn::user("tell me more"),
        ];
        assert_eq!(Conversation::derive_title(&turns), "what is 5G");
    }

    #[test]
    fn test_derive_title_placeholder_without_user_turn() {
        let turns = vec![Turn::assistant("Welcome")];
        assert_eq!(Conversation::derive_title(&turns), UNTITLED);
        assert_eq!(Conversation::derive_title(&[]), UNTITLED);
    }

    #[test]
    fn test_wire_role_names() {
        let user = serde_json::to_string(&Role::User).unwrap();
        let bot = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(user, "\"user\"");
        assert_eq!(bot, "\"bot\"");
    }

    #[test]
    fn test_wire_field_names() {
        let conversation = Conversation {
            id: "conv-1".to_string(),
            title: "what is 5G".to_string(),
            turns: vec![Turn::user("what is 5G")],
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&conversation).unwrap();
        assert!(value.get("messages").is_some());
        assert!(value.get("timestamp").is_some());
        assert!(value.get("turns").is_none());
        assert!(value["timestamp"].as_str().unwrap().contains('T'));
        assert_eq!(value["messages"][0]["role"], "user");
    }
}
