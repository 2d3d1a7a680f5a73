//! Export of saved contexts to text and JSON files. Content generation
//! is pure; only the commands layer touches the filesystem.

pub mod commands;

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::db::ContextBlock;

const RULE: &str = "==================================================";
const QUICK_RECENT_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMethod {
    Date,
    Platform,
    Tags,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickExportKind {
    Favorites,
    Recent,
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Text,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonEnvelope<'a> {
    export_date: String,
    version: &'static str,
    contexts: &'a [ContextBlock],
}

/// Split blocks into named export groups. Date grouping is by calendar
/// month; tag grouping may place one block in several groups, with
/// untagged blocks landing in "untagged".
pub fn group_contexts(
    method: ExportMethod,
    blocks: &[ContextBlock],
) -> Vec<(String, Vec<ContextBlock>)> {
    let mut groups: BTreeMap<String, Vec<ContextBlock>> = BTreeMap::new();

    for block in blocks {
        match method {
            ExportMethod::All => {
                groups
                    .entry("All".to_string())
                    .or_default()
                    .push(block.clone());
            }
            ExportMethod::Date => {
                let month = block.date_saved.format("%Y-%m").to_string();
                groups.entry(month).or_default().push(block.clone());
            }
            ExportMethod::Platform => {
                groups
                    .entry(block.platform.display_name().to_string())
                    .or_default()
                    .push(block.clone());
            }
            ExportMethod::Tags => {
                if block.tags.is_empty() {
                    groups
                        .entry("untagged".to_string())
                        .or_default()
                        .push(block.clone());
                } else {
                    for tag in &block.tags {
                        groups.entry(tag.clone()).or_default().push(block.clone());
                    }
                }
            }
        }
    }

    groups.into_iter().collect()
}

/// Render one group as a plain-text document, newest context first.
pub fn generate_export_content(title: &str, blocks: &[ContextBlock]) -> String {
    let mut ordered: Vec<&ContextBlock> = blocks.iter().collect();
    ordered.sort_by(|a, b| b.date_saved.cmp(&a.date_saved));

    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    out.push_str(&format!(
        "Exported on {}\n",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    ));
    out.push_str(&format!("Total contexts: {}\n", ordered.len()));
    out.push_str(RULE);
    out.push('\n');

    for block in ordered {
        out.push('\n');
        out.push_str(&format!("Title: {}\n", block.title));
        out.push_str(&format!(
            "Date: {}\n",
            block.date_saved.format("%Y-%m-%d %H:%M UTC")
        ));
        out.push_str(&format!("Platform: {}\n", block.platform.display_name()));
        if !block.tags.is_empty() {
            out.push_str(&format!("Tags: {}\n", block.tags.join(", ")));
        }
        if block.is_favorite {
            out.push_str("Favorite: yes\n");
        }
        out.push('\n');
        out.push_str(&block.body);
        out.push('\n');
        out.push('\n');
        out.push_str(RULE);
        out.push('\n');
    }

    out
}

pub fn generate_json_export(blocks: &[ContextBlock]) -> Result<String> {
    let envelope = JsonEnvelope {
        export_date: Utc::now().to_rfc3339(),
        version: "1.0",
        contexts: blocks,
    };
    serde_json::to_string_pretty(&envelope).context("failed to serialize export")
}

/// Pick the blocks a quick export covers. `Single` needs an id.
pub fn select_quick_export(
    kind: QuickExportKind,
    blocks: &[ContextBlock],
    id: Option<&str>,
) -> Vec<ContextBlock> {
    match kind {
        QuickExportKind::Favorites => blocks
            .iter()
            .filter(|block| block.is_favorite)
            .cloned()
            .collect(),
        QuickExportKind::Recent => {
            let cutoff = Utc::now() - Duration::days(QUICK_RECENT_DAYS);
            blocks
                .iter()
                .filter(|block| block.date_saved >= cutoff)
                .cloned()
                .collect()
        }
        QuickExportKind::Single => blocks
            .iter()
            .filter(|block| Some(block.id.as_str()) == id)
            .cloned()
            .collect(),
    }
}

/// Filenames keep only ASCII alphanumerics and dashes so they survive
/// every filesystem the file might land on.
pub fn sanitize_label(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let collapsed = cleaned.trim_matches('-').to_string();
    if collapsed.is_empty() {
        "export".to_string()
    } else {
        collapsed
    }
}

pub fn export_filename(label: &str, format: ExportFormat) -> String {
    format!(
        "ChatSeed-{}-{}.{}",
        sanitize_label(label),
        Utc::now().format("%Y-%m-%d"),
        format.extension()
    )
}
