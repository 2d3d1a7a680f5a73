//! Builds injection plans: the new input value plus the synthetic event
//! sequence the page shim must dispatch so the host page's framework
//! (React/Angular controlled inputs) notices a programmatic write. Raw
//! property assignment alone is invisible to those frameworks.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::platform::{InputKind, PlatformDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyntheticEvent {
    Input,
    Change,
    Keyup,
    CompositionEnd,
    Paste,
}

/// Everything the shim needs to apply one insertion. Planning is
/// stateless and idempotent per call; planning twice appends twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionPlan {
    pub target_selector: String,
    pub input_kind: InputKind,
    pub new_value: String,
    pub caret_to_end: bool,
    pub events: Vec<SyntheticEvent>,
}

/// Plan inserting `text` into the platform's input element as found in
/// the snapshot. `None` means no input element matched the primary or
/// alternate selector; nothing else is touched in that case.
pub fn plan_insertion(
    html: &str,
    descriptor: &PlatformDescriptor,
    text: &str,
) -> Option<InjectionPlan> {
    let doc = Html::parse_document(html);
    let (element, target_selector) = locate_input(&doc, descriptor)?;

    let new_value = match descriptor.input_kind {
        InputKind::Textarea => {
            let existing = element.text().collect::<String>().trim().to_string();
            if existing.is_empty() {
                text.to_string()
            } else {
                format!("{existing}\n\n{text}")
            }
        }
        InputKind::Contenteditable => {
            let existing = element.inner_html().trim().to_string();
            let formatted = text_to_html(text);
            if existing.is_empty() {
                formatted
            } else {
                format!("{existing}<br><br>{formatted}")
            }
        }
    };

    Some(InjectionPlan {
        target_selector,
        input_kind: descriptor.input_kind,
        new_value,
        caret_to_end: true,
        events: event_sequence(descriptor),
    })
}

fn event_sequence(descriptor: &PlatformDescriptor) -> Vec<SyntheticEvent> {
    let mut events = vec![
        SyntheticEvent::Input,
        SyntheticEvent::Change,
        SyntheticEvent::Keyup,
    ];
    if descriptor.needs_composition_events {
        events.push(SyntheticEvent::CompositionEnd);
        events.push(SyntheticEvent::Paste);
    }
    events
}

fn locate_input<'a>(
    doc: &'a Html,
    descriptor: &PlatformDescriptor,
) -> Option<(ElementRef<'a>, String)> {
    let primary = descriptor.selectors.input;
    let mut chain = vec![primary];
    if let Some(alt) = descriptor.selectors.input_alt {
        chain.push(alt);
    }

    for raw in chain {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(element) = doc.select(&selector).next() {
            return Some((element, raw.to_string()));
        }
    }
    None
}

/// HTML-escape plain text, then re-apply the markdown-lite markers the
/// extractor produces so contenteditable targets keep their formatting.
pub fn text_to_html(text: &str) -> String {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    static CODE: OnceLock<Regex> = OnceLock::new();
    static BOLD: OnceLock<Regex> = OnceLock::new();
    static EM: OnceLock<Regex> = OnceLock::new();

    let fence = FENCE.get_or_init(|| Regex::new(r"(?s)```(.*?)```").expect("valid regex"));
    let code = CODE.get_or_init(|| Regex::new(r"`([^`\n]+)`").expect("valid regex"));
    let bold = BOLD.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid regex"));
    let em = EM.get_or_init(|| Regex::new(r"\*([^*\n]+)\*").expect("valid regex"));

    let escaped = escape_html(text);
    let with_fences = fence.replace_all(&escaped, "<pre><code>$1</code></pre>");
    let with_code = code.replace_all(&with_fences, "<code>$1</code>");
    let with_bold = bold.replace_all(&with_code, "<strong>$1</strong>");
    let with_em = em.replace_all(&with_bold, "<em>$1</em>");
    with_em.replace('\n', "<br>")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::detect_platform;

    fn chatgpt() -> &'static PlatformDescriptor {
        detect_platform("https://chatgpt.com/c/1").unwrap()
    }

    fn gemini() -> &'static PlatformDescriptor {
        detect_platform("https://gemini.google.com/app/1").unwrap()
    }

    #[test]
    fn textarea_with_existing_content_gets_blank_line_separator() {
        let html = r#"<html><body><textarea id="prompt-textarea">foo</textarea></body></html>"#;
        let plan = plan_insertion(html, chatgpt(), "bar").unwrap();
        assert_eq!(plan.new_value, "foo\n\nbar");
        assert_eq!(plan.input_kind, InputKind::Textarea);
        assert!(plan.caret_to_end);
    }

    #[test]
    fn empty_textarea_gets_exactly_the_new_text() {
        let html = r#"<html><body><textarea id="prompt-textarea"></textarea></body></html>"#;
        let plan = plan_insertion(html, chatgpt(), "bar").unwrap();
        assert_eq!(plan.new_value, "bar");
    }

    #[test]
    fn textarea_events_cover_framework_listeners() {
        let html = r#"<html><body><textarea id="prompt-textarea"></textarea></body></html>"#;
        let plan = plan_insertion(html, chatgpt(), "hi").unwrap();
        assert_eq!(
            plan.events,
            [
                SyntheticEvent::Input,
                SyntheticEvent::Change,
                SyntheticEvent::Keyup
            ]
        );
    }

    #[test]
    fn missing_input_element_yields_no_plan() {
        let html = "<html><body><main>no inputs here</main></body></html>";
        assert!(plan_insertion(html, chatgpt(), "bar").is_none());
    }

    #[test]
    fn contenteditable_appends_with_br_separator_and_composition_events() {
        let html = r#"<html><body>
            <div class="ql-editor textarea" contenteditable="true">draft</div>
        </body></html>"#;
        let plan = plan_insertion(html, gemini(), "new *idea*").unwrap();
        assert_eq!(plan.input_kind, InputKind::Contenteditable);
        assert_eq!(plan.new_value, "draft<br><br>new <em>idea</em>");
        assert_eq!(
            plan.events,
            [
                SyntheticEvent::Input,
                SyntheticEvent::Change,
                SyntheticEvent::Keyup,
                SyntheticEvent::CompositionEnd,
                SyntheticEvent::Paste
            ]
        );
    }

    #[test]
    fn alternate_selector_is_tried_when_primary_misses() {
        let html = r#"<html><body>
            <div aria-label="Enter a prompt here" contenteditable="true"></div>
        </body></html>"#;
        let plan = plan_insertion(html, gemini(), "hello world").unwrap();
        assert_eq!(plan.target_selector, "[aria-label=\"Enter a prompt here\"]");
        assert_eq!(plan.new_value, "hello world");
    }

    #[test]
    fn injected_html_is_escaped_before_formatting() {
        let converted = text_to_html("a < b & `c`\n**bold**");
        assert_eq!(
            converted,
            "a &lt; b &amp; <code>c</code><br><strong>bold</strong>"
        );
    }
}
