//! Browsing logic over saved contexts: section tabs, search, filters,
//! and the stats strip. All pure over an already-loaded list so the UI
//! can re-filter without another database round trip.

pub mod commands;

use std::collections::BTreeSet;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::db::ContextBlock;

const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    All,
    Recent,
    Favorites,
    Tags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePreset {
    Today,
    Week,
    Month,
}

/// Everything the browse view can narrow the list by. Empty/None fields
/// are no-ops, so the default filter passes every block through.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextFilter {
    #[serde(default)]
    pub section: Section,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub date: Option<DatePreset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextStats {
    pub total: usize,
    pub recent: usize,
    pub favorites: usize,
    pub tags: usize,
}

pub fn apply_filters(blocks: &[ContextBlock], filter: &ContextFilter) -> Vec<ContextBlock> {
    let now = Utc::now();
    let recent_cutoff = now - Duration::days(RECENT_WINDOW_DAYS);

    blocks
        .iter()
        .filter(|block| match filter.section {
            Section::All => true,
            Section::Recent => block.date_saved >= recent_cutoff,
            Section::Favorites => block.is_favorite,
            Section::Tags => !block.tags.is_empty(),
        })
        .filter(|block| match &filter.search {
            Some(query) if !query.trim().is_empty() => matches_text(block, query),
            _ => true,
        })
        .filter(|block| match &filter.keyword {
            Some(word) if !word.trim().is_empty() => matches_text(block, word),
            _ => true,
        })
        .filter(|block| match &filter.tag {
            Some(tag) if !tag.trim().is_empty() => {
                let wanted = tag.trim().to_lowercase();
                block.tags.iter().any(|t| t.to_lowercase() == wanted)
            }
            _ => true,
        })
        .filter(|block| match filter.date {
            Some(DatePreset::Today) => block.date_saved >= now - Duration::days(1),
            Some(DatePreset::Week) => block.date_saved >= now - Duration::days(7),
            Some(DatePreset::Month) => block.date_saved >= now - Duration::days(30),
            None => true,
        })
        .cloned()
        .collect()
}

fn matches_text(block: &ContextBlock, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    block.title.to_lowercase().contains(&needle)
        || block.body.to_lowercase().contains(&needle)
        || block.tags.iter().any(|t| t.to_lowercase().contains(&needle))
}

pub fn compute_stats(blocks: &[ContextBlock]) -> ContextStats {
    let recent_cutoff = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);
    let distinct_tags: BTreeSet<String> = blocks
        .iter()
        .flat_map(|block| block.tags.iter())
        .map(|tag| tag.to_lowercase())
        .collect();

    ContextStats {
        total: blocks.len(),
        recent: blocks
            .iter()
            .filter(|block| block.date_saved >= recent_cutoff)
            .count(),
        favorites: blocks.iter().filter(|block| block.is_favorite).count(),
        tags: distinct_tags.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformKind;

    fn block(title: &str, tags: &[&str], days_ago: i64, favorite: bool) -> ContextBlock {
        let mut block = ContextBlock::new(
            title.to_string(),
            format!("{title} body"),
            tags.iter().map(|t| t.to_string()).collect(),
            PlatformKind::Chatgpt,
        );
        block.date_saved = Utc::now() - Duration::days(days_ago);
        block.is_favorite = favorite;
        block
    }

    fn fixture() -> Vec<ContextBlock> {
        vec![
            block("Rust ownership", &["rust"], 0, true),
            block("Gemini ideas", &["brainstorm", "Rust"], 3, false),
            block("Old planning", &[], 20, false),
        ]
    }

    #[test]
    fn default_filter_passes_everything() {
        let blocks = fixture();
        assert_eq!(apply_filters(&blocks, &ContextFilter::default()).len(), 3);
    }

    #[test]
    fn sections_narrow_the_list() {
        let blocks = fixture();

        let recent = apply_filters(
            &blocks,
            &ContextFilter {
                section: Section::Recent,
                ..Default::default()
            },
        );
        assert_eq!(recent.len(), 2);

        let favorites = apply_filters(
            &blocks,
            &ContextFilter {
                section: Section::Favorites,
                ..Default::default()
            },
        );
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].title, "Rust ownership");

        let tagged = apply_filters(
            &blocks,
            &ContextFilter {
                section: Section::Tags,
                ..Default::default()
            },
        );
        assert_eq!(tagged.len(), 2);
    }

    #[test]
    fn search_is_case_insensitive_across_title_body_and_tags() {
        let blocks = fixture();
        let filter = ContextFilter {
            search: Some("BRAINSTORM".to_string()),
            ..Default::default()
        };
        let found = apply_filters(&blocks, &filter);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Gemini ideas");
    }

    #[test]
    fn tag_filter_matches_exact_tag_only() {
        let blocks = fixture();
        let filter = ContextFilter {
            tag: Some("rust".to_string()),
            ..Default::default()
        };
        // "rust" and "Rust" both match, "brainstorm" does not.
        assert_eq!(apply_filters(&blocks, &filter).len(), 2);

        let filter = ContextFilter {
            tag: Some("rus".to_string()),
            ..Default::default()
        };
        assert!(apply_filters(&blocks, &filter).is_empty());
    }

    #[test]
    fn date_presets_bound_the_window() {
        let blocks = fixture();
        let today = ContextFilter {
            date: Some(DatePreset::Today),
            ..Default::default()
        };
        assert_eq!(apply_filters(&blocks, &today).len(), 1);

        let week = ContextFilter {
            date: Some(DatePreset::Week),
            ..Default::default()
        };
        assert_eq!(apply_filters(&blocks, &week).len(), 2);

        let month = ContextFilter {
            date: Some(DatePreset::Month),
            ..Default::default()
        };
        assert_eq!(apply_filters(&blocks, &month).len(), 3);
    }

    #[test]
    fn stats_count_distinct_tags_case_insensitively() {
        let stats = compute_stats(&fixture());
        assert_eq!(stats.total, 3);
        assert_eq!(stats.recent, 2);
        assert_eq!(stats.favorites, 1);
        assert_eq!(stats.tags, 2);
    }
}
