use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use crate::platform::PlatformKind;

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("invalid {field} timestamp: {value}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    value
        .map(|raw| parse_datetime(&raw, field))
        .transpose()
}

pub fn parse_platform(value: &str) -> Result<PlatformKind> {
    match value {
        "chatgpt" => Ok(PlatformKind::Chatgpt),
        "gemini" => Ok(PlatformKind::Gemini),
        other => Err(anyhow!("unknown platform in database: {other}")),
    }
}

pub fn tags_to_json(tags: &[String]) -> Result<String> {
    serde_json::to_string(tags).context("failed to serialize tags")
}

pub fn tags_from_json(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).with_context(|| format!("invalid tags payload: {raw}"))
}
