//! Canned quick questions and inert quick actions.

use std::fmt;
use std::str::FromStr;

/// Quick questions; picking one submits its label as if typed.
pub const QUICK_QUESTIONS: [&str; 4] = ["Fever Symptoms", "Cold vs Flu", "Healthy Diet", "Sleep Tips"];

/// Look up a quick question by zero-based index.
pub fn quick_question(index: usize) -> Option<&'static str> {
    QUICK_QUESTIONS.get(index).copied()
}

/// Sidebar-style actions that only show a static notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    Hospitals,
    Emergency,
}

impl QuickAction {
    pub const ALL: [QuickAction; 2] = [QuickAction::Hospitals, QuickAction::Emergency];

    pub fn notice(&self) -> &'static str {
        match self {
            QuickAction::Hospitals => "Finding hospitals...",
            QuickAction::Emergency => "Call: 1122",
        }
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuickAction::Hospitals => write!(f, "hospitals"),
            QuickAction::Emergency => write!(f, "emergency"),
        }
    }
}

impl FromStr for QuickAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hospitals" | "hospital" => Ok(QuickAction::Hospitals),
            "emergency" => Ok(QuickAction::Emergency),
            other => Err(format!("unknown quick action: '{other}'")),
        }
    }
}
