//! Supported chat platforms and their DOM selector tables.
//!
//! Each platform is identified by a URL substring and carries the CSS
//! selectors the extractor and injector need. Selectors are re-derived by
//! observation; the host pages publish no contract for them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Chatgpt,
    Gemini,
}

impl PlatformKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Chatgpt => "chatgpt",
            PlatformKind::Gemini => "gemini",
        }
    }

    pub fn display_name(&self) -> &'static str {
        descriptor(*self).display_name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputKind {
    Textarea,
    Contenteditable,
}

/// Selector table for one platform's chat page.
#[derive(Debug, Clone, Copy)]
pub struct PlatformSelectors {
    pub input: &'static str,
    pub input_alt: Option<&'static str>,
    pub send: &'static str,
    pub user_message: &'static str,
    pub ai_message: &'static str,
    pub chat_container: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct PlatformDescriptor {
    pub key: PlatformKind,
    pub display_name: &'static str,
    pub url_pattern: &'static str,
    pub selectors: PlatformSelectors,
    pub input_kind: InputKind,
    /// Some editors (Gemini's Quill-based one) only notice programmatic
    /// writes after a compositionend/paste pair.
    pub needs_composition_events: bool,
}

const PLATFORMS: &[PlatformDescriptor] = &[
    PlatformDescriptor {
        key: PlatformKind::Chatgpt,
        display_name: "ChatGPT",
        url_pattern: "chatgpt.com",
        selectors: PlatformSelectors {
            input: "#prompt-textarea",
            input_alt: None,
            send: "[data-testid=\"send-button\"]",
            user_message: ".text-base",
            ai_message: ".markdown",
            chat_container: ".flex.flex-col",
        },
        input_kind: InputKind::Textarea,
        needs_composition_events: false,
    },
    PlatformDescriptor {
        key: PlatformKind::Gemini,
        display_name: "Gemini",
        url_pattern: "gemini.google.com/app",
        selectors: PlatformSelectors {
            input: ".ql-editor.textarea[contenteditable=\"true\"]",
            input_alt: Some("[aria-label=\"Enter a prompt here\"]"),
            send: ".send-button.submit",
            user_message: "p.query-text-line",
            ai_message: "message-content",
            chat_container: ".conversation-container",
        },
        input_kind: InputKind::Contenteditable,
        needs_composition_events: true,
    },
];

/// Match a page URL (host + path, scheme optional) against the registry.
/// Returns `None` for unrecognized pages; callers treat that as
/// "unsupported page" and no-op.
pub fn detect_platform(url: &str) -> Option<&'static PlatformDescriptor> {
    let trimmed = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);

    PLATFORMS
        .iter()
        .find(|descriptor| trimmed.contains(descriptor.url_pattern))
}

pub fn descriptor(kind: PlatformKind) -> &'static PlatformDescriptor {
    PLATFORMS
        .iter()
        .find(|descriptor| descriptor.key == kind)
        .expect("every PlatformKind has a registered descriptor")
}
