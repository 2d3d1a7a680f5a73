//! Filters that drop non-conversational noise from extraction results:
//! platform disclaimers, regenerate/stop affordances, timestamp-only
//! strings, and near-empty UI-label false positives.

use std::sync::OnceLock;

use regex::Regex;

/// Messages shorter than this (in chars) are treated as UI labels.
/// Exactly this length is retained; one below is discarded.
pub const MIN_MESSAGE_CHARS: usize = 10;

/// Known platform disclaimer / system-message fragments, matched
/// case-insensitively anywhere in the cleaned text.
const SYSTEM_MESSAGE_PATTERNS: &[&str] = &[
    "this conversation was started",
    "chatgpt can make mistakes",
    "gemini can make mistakes",
    "consider checking important information",
    "free research preview",
    "chatgpt may produce inaccurate information",
    "regenerate response",
    "stop generating",
    "continue generating",
    "model upgraded",
    "conversation archived",
    "new chat",
    "clear conversation",
];

fn timestamp_patterns() -> &'static [Regex; 2] {
    static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"^\d{1,2}:\d{2}").expect("valid regex"),
            Regex::new(r"(?i)^(today|yesterday|\d+\s+(second|minute|hour|day)s?\s+ago)")
                .expect("valid regex"),
        ]
    })
}

/// Whether a cleaned message is real conversation content.
pub fn is_conversational(content: &str) -> bool {
    let lowered = content.to_lowercase();

    if SYSTEM_MESSAGE_PATTERNS
        .iter()
        .any(|pattern| lowered.contains(pattern))
    {
        return false;
    }

    if content.chars().count() < MIN_MESSAGE_CHARS {
        return false;
    }

    !timestamp_patterns()
        .iter()
        .any(|pattern| pattern.is_match(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_known_disclaimers() {
        assert!(!is_conversational(
            "ChatGPT can make mistakes. Consider checking important information."
        ));
        assert!(!is_conversational("Gemini can make mistakes, so double-check it"));
        assert!(!is_conversational("Regenerate response"));
    }

    #[test]
    fn drops_timestamp_only_strings() {
        assert!(!is_conversational("14:02 conversation updated today"));
        assert!(!is_conversational("Yesterday we talked about compilers"));
        assert!(!is_conversational("3 minutes ago something happened here"));
    }

    #[test]
    fn length_threshold_is_exact() {
        // Exactly at the minimum is retained, one below is discarded.
        let at_threshold = "0123456789";
        let below_threshold = "012345678";
        assert_eq!(at_threshold.chars().count(), MIN_MESSAGE_CHARS);
        assert!(is_conversational(at_threshold));
        assert!(!is_conversational(below_threshold));
    }

    #[test]
    fn keeps_ordinary_conversation_text() {
        assert!(is_conversational(
            "Could you explain how ownership works in Rust?"
        ));
    }
}
