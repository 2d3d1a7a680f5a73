//! Canned prompt text composed around saved contexts before injection.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryKind {
    Quick,
    Detailed,
    Business,
    Comprehensive,
}

pub fn summarize_prompt(kind: SummaryKind) -> &'static str {
    match kind {
        SummaryKind::Quick => {
            "Without addressing me directly, summarize our conversation above focusing only on \
             the main topics discussed. Keep it concise and organized."
        }
        SummaryKind::Detailed => {
            "Without addressing me directly, provide a detailed summary of our conversation above \
             including: 1) Main topics discussed, 2) Action items mentioned, 3) Important things \
             to remember. Present this in a well-organized format."
        }
        SummaryKind::Business => {
            "Without addressing me directly, create a comprehensive business summary of our \
             conversation above with the following sections: 1) Executive Summary, 2) Key \
             Insights, 3) Action Items, 4) To-Do List, 5) Important Notes. Format this \
             professionally for future reference."
        }
        SummaryKind::Comprehensive => {
            "Without addressing me directly, summarize our entire conversation above. Provide a \
             comprehensive summary covering the main topics discussed, key points and insights, \
             any action items mentioned, and important context for future reference. Present \
             this as a clear, organized summary without addressing me directly."
        }
    }
}

/// Payload for re-planting a saved context into a fresh conversation.
pub fn context_insertion_payload(title: &str, body: &str) -> String {
    format!(
        "Please update your memory with the following information and do not address me \
         directly:\n\n[Saved Context: {title}]\n\n{body}"
    )
}

/// Payload asking the assistant to summarize one saved context.
pub fn context_summary_payload(title: &str, body: &str) -> String {
    format!(
        "Please provide a summary of this saved context:\n\n[Context: {title}]\n\n{body}\n\n\
         Summarize the key points, main topics, and important information from this context in \
         a clear and organized way."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_payload_names_the_context() {
        let payload = context_insertion_payload("Rust notes", "ownership rules");
        assert!(payload.starts_with("Please update your memory"));
        assert!(payload.contains("[Saved Context: Rust notes]"));
        assert!(payload.ends_with("ownership rules"));
    }

    #[test]
    fn summary_payload_wraps_the_body() {
        let payload = context_summary_payload("Rust notes", "ownership rules");
        assert!(payload.contains("[Context: Rust notes]"));
        assert!(payload.contains("ownership rules"));
    }

    #[test]
    fn each_summary_kind_has_distinct_wording() {
        let kinds = [
            SummaryKind::Quick,
            SummaryKind::Detailed,
            SummaryKind::Business,
            SummaryKind::Comprehensive,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(summarize_prompt(*a), summarize_prompt(*b));
            }
        }
    }
}
