//! Chat turn types for HealthMate.
//!
//! A conversation is an ordered list of [`Turn`]s. Turns are created on
//! every user submission and every completed generation, and never change
//! afterwards.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Display format for turn timestamps: localized `hh:mm AM`.
pub const TURN_TIME_FORMAT: &str = "%I:%M %p";

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("invalid role: '{other}'")),
        }
    }
}

/// A single message in the conversation.
///
/// `content` is stored exactly as shown to the user; assistant turns may
/// begin with the pre-rendered emergency banner markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    /// Wall-clock time of creation, formatted with [`TURN_TIME_FORMAT`].
    pub time: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Create a turn stamped with the current time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            role,
            content: content.into(),
            time: format_turn_time(now),
            created_at: now,
        }
    }

    /// Shorthand for a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Shorthand for an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Format an instant as local `hh:mm AM`.
pub fn format_turn_time(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format(TURN_TIME_FORMAT)
        .to_string()
}

/// View model returned after a submission: the full redrawn history plus
/// the reply that was just produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatView {
    pub turns: Vec<Turn>,
    pub reply: Turn,
}
