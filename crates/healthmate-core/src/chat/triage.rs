//! Emergency keyword detection.
//!
//! A plain case-insensitive substring test against a fixed keyword list.
//! No stemming or fuzzy matching: "my heart hurts" is not flagged, and
//! "no stroke history" is.

/// Phrases that flag an utterance as a possible emergency.
pub const EMERGENCY_KEYWORDS: [&str; 5] = [
    "chest pain",
    "heart attack",
    "stroke",
    "not breathing",
    "severe bleeding",
];

/// Local emergency phone number shown in the banner and quick action.
pub const EMERGENCY_NUMBER: &str = "1122";

/// Text of the emergency alert, without markup.
pub const EMERGENCY_ALERT: &str = "🚨 EMERGENCY: CALL 1122 NOW!";

/// Markup prepended to replies for flagged utterances.
pub const EMERGENCY_BANNER: &str = "<div style=\"background:red; color:white; padding:10px; border-radius:10px; font-weight:bold;\">🚨 EMERGENCY: CALL 1122 NOW!</div><br>";

/// Whether the utterance mentions any emergency keyword.
pub fn is_emergency(utterance: &str) -> bool {
    let lowered = utterance.to_lowercase();
    EMERGENCY_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

/// Prepend the emergency banner to a reply.
pub fn with_banner(reply: &str) -> String {
    format!("{EMERGENCY_BANNER}{reply}")
}

/// Split stored turn content into its banner flag and the remaining text.
pub fn split_banner(content: &str) -> (bool, &str) {
    match content.strip_prefix(EMERGENCY_BANNER) {
        Some(rest) => (true, rest),
        None => (false, content),
    }
}
