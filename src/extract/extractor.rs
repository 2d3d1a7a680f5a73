//! Locates chat messages inside a page snapshot and turns them into
//! ordered, role-classified `ChatMessage` records.
//!
//! The target DOMs are unversioned and change without notice, so discovery
//! is an ordered list of selector strategies rather than a single strict
//! query: platform-specific selectors first, then generic fallbacks.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::platform::PlatformDescriptor;

use super::content::clean_message_content;
use super::noise;

const ENABLE_LOGS: bool = true;
use crate::{log_info, log_warn};

/// Fallback selectors for when the platform table matches nothing.
const GENERIC_MESSAGE_SELECTORS: &[&str] = &[
    "[data-message-id]",
    ".group.w-full",
    "[data-testid^=\"conversation-turn\"]",
];

const USER_PROBES: &[&str] = &[
    "[data-testid*=\"user\"]",
    ".user-message",
    "[aria-label*=\"user\"]",
];

const ASSISTANT_PROBES: &[&str] = &[
    "[data-testid*=\"assistant\"]",
    ".assistant-message",
    "svg[class*=\"icon\"]",
    "[aria-label*=\"assistant\"]",
    "img[alt*=\"ChatGPT\"]",
    "[data-testid*=\"bot\"]",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One extracted message. `captured_at` is the extraction time, not a
/// message timestamp - the source DOM rarely exposes real ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub captured_at: DateTime<Utc>,
}

struct Candidate<'a> {
    element: ElementRef<'a>,
    role_hint: Option<Role>,
}

/// Extract every conversation message from a page snapshot, in document
/// order. An unsupported page (no descriptor) yields an empty list, as
/// does a page with no recognizable messages; neither is an error.
pub fn extract_messages(html: &str, platform: Option<&PlatformDescriptor>) -> Vec<ChatMessage> {
    let Some(descriptor) = platform else {
        log_info!("no platform descriptor for this page, skipping extraction");
        return Vec::new();
    };

    let doc = Html::parse_document(html);
    let candidates = discover_candidates(&doc, descriptor);

    let mut messages = Vec::new();
    for (index, candidate) in candidates.iter().enumerate() {
        let Some(message) = parse_candidate(candidate, index) else {
            continue;
        };
        if !noise::is_conversational(&message.content) {
            log_info!("filtering out system message: {:.50}", message.content);
            continue;
        }
        messages.push(message);
    }

    messages
}

/// Filter extracted messages down to a user-selected id subset, keeping
/// extraction order.
pub fn select_messages(messages: &[ChatMessage], ids: &[String]) -> Vec<ChatMessage> {
    messages
        .iter()
        .filter(|message| ids.contains(&message.id))
        .cloned()
        .collect()
}

/// Join selected messages into the single text blob persisted on a
/// context block.
pub fn format_messages_for_saving(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|message| format!("{}:\n{}", message.role.label(), message.content))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

/// First-match-wins selector chain: returns the matches of the first
/// selector that finds anything, in document order.
pub(crate) fn try_selectors<'a>(doc: &'a Html, selectors: &[&str]) -> Vec<ElementRef<'a>> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            log_warn!("skipping unparsable selector: {raw}");
            continue;
        };
        let found: Vec<ElementRef<'a>> = doc.select(&selector).collect();
        if !found.is_empty() {
            log_info!("found {} message elements using selector: {raw}", found.len());
            return found;
        }
    }
    Vec::new()
}

fn discover_candidates<'a>(doc: &'a Html, descriptor: &PlatformDescriptor) -> Vec<Candidate<'a>> {
    let platform_found = platform_candidates(doc, descriptor);
    if !platform_found.is_empty() {
        return platform_found;
    }

    try_selectors(doc, GENERIC_MESSAGE_SELECTORS)
        .into_iter()
        .map(|element| Candidate {
            element,
            role_hint: None,
        })
        .collect()
}

/// Query the platform's user and assistant selectors separately, then
/// re-sort the union by document position. Mixing two separately queried
/// node lists any other way loses chronological order.
fn platform_candidates<'a>(
    doc: &'a Html,
    descriptor: &PlatformDescriptor,
) -> Vec<Candidate<'a>> {
    let queries = [
        (descriptor.selectors.user_message, Role::User),
        (descriptor.selectors.ai_message, Role::Assistant),
    ];

    let mut found: Vec<Candidate<'a>> = Vec::new();
    let mut seen = HashSet::new();
    for (raw, hint) in queries {
        let Ok(selector) = Selector::parse(raw) else {
            log_warn!("skipping unparsable platform selector: {raw}");
            continue;
        };
        for element in doc.select(&selector) {
            if seen.insert(element.id()) {
                found.push(Candidate {
                    element,
                    role_hint: Some(hint),
                });
            }
        }
    }

    sort_document_order(doc, &mut found);
    found
}

fn sort_document_order<'a>(doc: &'a Html, candidates: &mut [Candidate<'a>]) {
    let mut positions = HashMap::new();
    for (position, node) in doc.root_element().descendants().enumerate() {
        positions.insert(node.id(), position);
    }
    candidates.sort_by_key(|candidate| {
        positions
            .get(&candidate.element.id())
            .copied()
            .unwrap_or(usize::MAX)
    });
}

fn parse_candidate(candidate: &Candidate<'_>, index: usize) -> Option<ChatMessage> {
    let element = candidate.element;

    let id = element
        .value()
        .attr("data-message-id")
        .or_else(|| element.value().attr("data-testid"))
        .map(str::to_string)
        .unwrap_or_else(|| format!("message-{index}"));

    let role = candidate
        .role_hint
        .unwrap_or_else(|| classify_role(&element, index));

    let content = clean_message_content(element);
    if content.is_empty() {
        log_info!("skipping empty message element at index {index}");
        return None;
    }

    Some(ChatMessage {
        id,
        role,
        content,
        captured_at: Utc::now(),
    })
}

fn classify_role(element: &ElementRef<'_>, index: usize) -> Role {
    let class_attr = element.value().attr("class").unwrap_or("").to_lowercase();

    if class_attr.contains("user") || probe(element, USER_PROBES) {
        return Role::User;
    }
    if class_attr.contains("assistant") || probe(element, ASSISTANT_PROBES) {
        return Role::Assistant;
    }

    // No conclusive marker: alternate by position. Degraded, not an error.
    if index % 2 == 0 {
        Role::User
    } else {
        Role::Assistant
    }
}

fn probe(element: &ElementRef<'_>, selectors: &[&str]) -> bool {
    selectors.iter().any(|raw| {
        Selector::parse(raw)
            .map(|selector| element.select(&selector).next().is_some())
            .unwrap_or(false)
    })
}
