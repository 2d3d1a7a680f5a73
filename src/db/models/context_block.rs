use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::platform::PlatformKind;

/// One saved snippet of a conversation, the unit everything else in the
/// app operates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextBlock {
    pub id: String,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub platform: PlatformKind,
    pub date_saved: DateTime<Utc>,
    pub is_favorite: bool,
    pub last_used: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContextBlock {
    pub fn new(title: String, body: String, tags: Vec<String>, platform: PlatformKind) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            body,
            tags,
            platform,
            date_saved: now,
            is_favorite: false,
            last_used: None,
            created_at: now,
            updated_at: now,
        }
    }
}
