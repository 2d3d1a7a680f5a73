//! HTML-to-formatted-text conversion for message elements.
//!
//! Works on the parsed snapshot only; the live page is never touched.
//! Interactive chrome (buttons, copy affordances, hidden spans) is skipped
//! during the walk, then the remaining tree is rendered to a markdown-like
//! plain text string.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

/// UI sub-elements that must not leak into saved content.
const STRIP_SELECTOR: &str = "button, .sr-only, [aria-hidden=\"true\"], .copy-button, \
     .message-actions, .text-xs, .opacity-50, [data-testid*=\"action\"], .cursor-pointer";

/// Preferred content roots inside a message element, most specific first.
const CONTENT_SELECTORS: &[&str] = &[
    ".message-content",
    "[data-message-content]",
    ".prose",
    ".markdown",
];

fn strip_selector() -> &'static Selector {
    static STRIP: OnceLock<Selector> = OnceLock::new();
    STRIP.get_or_init(|| Selector::parse(STRIP_SELECTOR).expect("strip selector is valid CSS"))
}

/// Render a message element to cleaned, markdown-like text.
/// Returns an empty string for elements with no real content; the caller
/// discards those.
pub fn clean_message_content(element: ElementRef) -> String {
    let root = content_root(element);
    let mut out = String::new();
    render_children(root, &mut out);
    normalize(&out)
}

fn content_root(element: ElementRef) -> ElementRef {
    for raw in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(found) = element.select(&selector).next() {
            if !found.text().collect::<String>().trim().is_empty() {
                return found;
            }
        }
    }
    element
}

fn render_children(element: ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(&text.text);
            continue;
        }
        let Some(child_element) = ElementRef::wrap(child) else {
            continue;
        };
        if strip_selector().matches(&child_element) {
            continue;
        }
        render_element(child_element, out);
    }
}

fn render_element(element: ElementRef, out: &mut String) {
    match element.value().name() {
        "br" => out.push('\n'),
        "p" => {
            break_line(out);
            render_children(element, out);
            out.push('\n');
        }
        "div" => {
            break_line(out);
            render_children(element, out);
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            break_line(out);
            out.push_str("# ");
            render_children(element, out);
            out.push_str("\n\n");
        }
        "ul" | "ol" => {
            break_line(out);
            render_children(element, out);
            out.push('\n');
        }
        "li" => {
            out.push_str("\u{2022} ");
            render_children(element, out);
            out.push('\n');
        }
        "pre" => {
            out.push_str("\n```\n");
            render_children(element, out);
            out.push_str("\n```\n");
        }
        "code" => {
            if is_inside_pre(&element) {
                render_children(element, out);
            } else {
                out.push('`');
                render_children(element, out);
                out.push('`');
            }
        }
        "strong" | "b" => {
            out.push_str("**");
            render_children(element, out);
            out.push_str("**");
        }
        "em" | "i" => {
            out.push('*');
            render_children(element, out);
            out.push('*');
        }
        // Inline script/style text is never content.
        "script" | "style" => {}
        _ => render_children(element, out),
    }
}

fn is_inside_pre(element: &ElementRef) -> bool {
    element
        .parent()
        .and_then(ElementRef::wrap)
        .map(|parent| parent.value().name() == "pre")
        .unwrap_or(false)
}

fn break_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Collapse 3+ newlines to 2, trim the ends, normalize space/tab runs.
fn normalize(raw: &str) -> String {
    static EXTRA_NEWLINES: OnceLock<Regex> = OnceLock::new();
    static SPACE_RUNS: OnceLock<Regex> = OnceLock::new();

    let newlines = EXTRA_NEWLINES
        .get_or_init(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*){2,}").expect("valid regex"));
    let spaces = SPACE_RUNS.get_or_init(|| Regex::new(r"[ \t]+").expect("valid regex"));

    let collapsed = newlines.replace_all(raw, "\n\n");
    let trimmed = collapsed.trim();
    spaces.replace_all(trimmed, " ").into_owned()
}
