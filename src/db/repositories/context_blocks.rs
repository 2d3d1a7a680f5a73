use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{
    helpers::{parse_datetime, parse_optional_datetime, parse_platform, tags_from_json, tags_to_json},
    models::ContextBlock,
    Database,
};

const SELECT_COLUMNS: &str = "id, title, body, tags, platform, date_saved, is_favorite, \
                              last_used, created_at, updated_at";

fn row_to_context_block(row: &Row) -> Result<ContextBlock> {
    let tags_json: String = row.get("tags")?;
    let platform_raw: String = row.get("platform")?;
    let date_saved: String = row.get("date_saved")?;
    let last_used: Option<String> = row.get("last_used")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(ContextBlock {
        id: row.get("id")?,
        title: row.get("title")?,
        body: row.get("body")?,
        tags: tags_from_json(&tags_json)?,
        platform: parse_platform(&platform_raw)?,
        date_saved: parse_datetime(&date_saved, "date_saved")?,
        is_favorite: row.get::<_, i64>("is_favorite")? != 0,
        last_used: parse_optional_datetime(last_used, "last_used")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

fn insert_block(conn: &Connection, block: &ContextBlock) -> Result<()> {
    conn.execute(
        "INSERT INTO context_blocks \
         (id, title, body, tags, platform, date_saved, is_favorite, last_used, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            block.id,
            block.title,
            block.body,
            tags_to_json(&block.tags)?,
            block.platform.as_str(),
            block.date_saved.to_rfc3339(),
            block.is_favorite as i64,
            block.last_used.map(|dt| dt.to_rfc3339()),
            block.created_at.to_rfc3339(),
            block.updated_at.to_rfc3339(),
        ],
    )
    .context("failed to insert context block")?;
    Ok(())
}

impl Database {
    pub async fn insert_context_block(&self, block: ContextBlock) -> Result<ContextBlock> {
        self.execute(move |conn| {
            insert_block(conn, &block)?;
            Ok(block)
        })
        .await
    }

    pub async fn get_context_block(&self, id: String) -> Result<Option<ContextBlock>> {
        self.execute(move |conn| {
            let query = format!("SELECT {SELECT_COLUMNS} FROM context_blocks WHERE id = ?1");
            conn.query_row(&query, params![id], |row| {
                Ok(row_to_context_block(row))
            })
            .optional()
            .context("failed to load context block")?
            .transpose()
        })
        .await
    }

    /// All saved contexts, newest first.
    pub async fn list_context_blocks(&self) -> Result<Vec<ContextBlock>> {
        self.execute(|conn| {
            let query = format!(
                "SELECT {SELECT_COLUMNS} FROM context_blocks ORDER BY date_saved DESC"
            );
            let mut stmt = conn.prepare(&query)?;
            let rows = stmt.query_map([], |row| Ok(row_to_context_block(row)))?;

            let mut blocks = Vec::new();
            for row in rows {
                blocks.push(row.context("failed to read context block row")??);
            }
            Ok(blocks)
        })
        .await
    }

    pub async fn list_context_blocks_paginated(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ContextBlock>> {
        self.execute(move |conn| {
            let query = format!(
                "SELECT {SELECT_COLUMNS} FROM context_blocks \
                 ORDER BY date_saved DESC LIMIT ?1 OFFSET ?2"
            );
            let mut stmt = conn.prepare(&query)?;
            let rows = stmt.query_map(params![limit, offset], |row| {
                Ok(row_to_context_block(row))
            })?;

            let mut blocks = Vec::new();
            for row in rows {
                blocks.push(row.context("failed to read context block row")??);
            }
            Ok(blocks)
        })
        .await
    }

    pub async fn update_context_block(
        &self,
        id: String,
        title: String,
        body: String,
        tags: Vec<String>,
    ) -> Result<ContextBlock> {
        self.execute(move |conn| {
            let changed = conn
                .execute(
                    "UPDATE context_blocks \
                     SET title = ?1, body = ?2, tags = ?3, updated_at = ?4 WHERE id = ?5",
                    params![title, body, tags_to_json(&tags)?, Utc::now().to_rfc3339(), id],
                )
                .context("failed to update context block")?;

            if changed == 0 {
                return Err(anyhow!("context block not found: {id}"));
            }

            let query = format!("SELECT {SELECT_COLUMNS} FROM context_blocks WHERE id = ?1");
            conn.query_row(&query, params![id], |row| Ok(row_to_context_block(row)))
                .context("failed to reload updated context block")?
        })
        .await
    }

    /// Flip the favorite flag and return the new state.
    pub async fn toggle_favorite(&self, id: String) -> Result<bool> {
        self.execute(move |conn| {
            let changed = conn
                .execute(
                    "UPDATE context_blocks \
                     SET is_favorite = 1 - is_favorite, updated_at = ?1 WHERE id = ?2",
                    params![Utc::now().to_rfc3339(), id],
                )
                .context("failed to toggle favorite")?;

            if changed == 0 {
                return Err(anyhow!("context block not found: {id}"));
            }

            let favorite: i64 = conn.query_row(
                "SELECT is_favorite FROM context_blocks WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            Ok(favorite != 0)
        })
        .await
    }

    /// Stamp `last_used` when a context gets re-inserted into a chat.
    pub async fn touch_last_used(&self, id: String) -> Result<()> {
        self.execute(move |conn| {
            conn.execute(
                "UPDATE context_blocks SET last_used = ?1 WHERE id = ?2",
                params![Utc::now().to_rfc3339(), id],
            )
            .context("failed to record context usage")?;
            Ok(())
        })
        .await
    }

    /// Deleting an id that no longer exists is not an error.
    pub async fn delete_context_block(&self, id: String) -> Result<()> {
        self.execute(move |conn| {
            conn.execute("DELETE FROM context_blocks WHERE id = ?1", params![id])
                .context("failed to delete context block")?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{migrations::CURRENT_SCHEMA_VERSION, models::ContextBlock, Database};
    use crate::platform::PlatformKind;
    use rusqlite::Connection;
    use tempfile::TempDir;

    fn open_test_db(dir: &TempDir) -> Database {
        Database::new(dir.path().join("chatseed.sqlite3")).unwrap()
    }

    fn sample_block(title: &str) -> ContextBlock {
        ContextBlock::new(
            title.to_string(),
            "User:\nhello\n\n---\n\nAssistant:\nhi".to_string(),
            vec!["greeting".to_string()],
            PlatformKind::Chatgpt,
        )
    }

    #[tokio::test]
    async fn insert_then_get_round_trips_every_field() {
        let dir = TempDir::new().unwrap();
        let db = open_test_db(&dir);

        let block = sample_block("First chat");
        let saved = db.insert_context_block(block.clone()).await.unwrap();
        assert_eq!(saved, block);

        let loaded = db.get_context_block(block.id.clone()).await.unwrap().unwrap();
        assert_eq!(loaded, block);
        assert!(db
            .get_context_block("missing".to_string())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn listing_returns_newest_first() {
        let dir = TempDir::new().unwrap();
        let db = open_test_db(&dir);

        let mut older = sample_block("older");
        older.date_saved = older.date_saved - chrono::Duration::hours(2);
        let newer = sample_block("newer");

        db.insert_context_block(older).await.unwrap();
        db.insert_context_block(newer).await.unwrap();

        let blocks = db.list_context_blocks().await.unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].title, "newer");
        assert_eq!(blocks[1].title, "older");

        let page = db.list_context_blocks_paginated(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "older");
    }

    #[tokio::test]
    async fn update_rewrites_editable_fields_only() {
        let dir = TempDir::new().unwrap();
        let db = open_test_db(&dir);

        let block = sample_block("draft");
        let created_at = block.created_at;
        db.insert_context_block(block.clone()).await.unwrap();

        let updated = db
            .update_context_block(
                block.id.clone(),
                "final".to_string(),
                "new body".to_string(),
                vec!["rust".to_string(), "notes".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "final");
        assert_eq!(updated.body, "new body");
        assert_eq!(updated.tags, ["rust", "notes"]);
        assert_eq!(updated.created_at, created_at);
        assert!(updated.updated_at >= created_at);

        let err = db
            .update_context_block(
                "missing".to_string(),
                "x".to_string(),
                "y".to_string(),
                vec![],
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn toggle_favorite_flips_and_reports_state() {
        let dir = TempDir::new().unwrap();
        let db = open_test_db(&dir);

        let block = sample_block("fav");
        db.insert_context_block(block.clone()).await.unwrap();

        assert!(db.toggle_favorite(block.id.clone()).await.unwrap());
        assert!(!db.toggle_favorite(block.id.clone()).await.unwrap());
    }

    #[tokio::test]
    async fn touch_last_used_sets_the_timestamp() {
        let dir = TempDir::new().unwrap();
        let db = open_test_db(&dir);

        let block = sample_block("used");
        db.insert_context_block(block.clone()).await.unwrap();
        assert!(block.last_used.is_none());

        db.touch_last_used(block.id.clone()).await.unwrap();
        let loaded = db.get_context_block(block.id).await.unwrap().unwrap();
        assert!(loaded.last_used.is_some());
    }

    #[tokio::test]
    async fn delete_is_silent_for_missing_rows() {
        let dir = TempDir::new().unwrap();
        let db = open_test_db(&dir);

        let block = sample_block("gone");
        db.insert_context_block(block.clone()).await.unwrap();
        db.delete_context_block(block.id.clone()).await.unwrap();
        assert!(db.get_context_block(block.id.clone()).await.unwrap().is_none());

        db.delete_context_block(block.id).await.unwrap();
    }

    #[tokio::test]
    async fn v1_rows_are_backfilled_with_chatgpt_platform() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chatseed.sqlite3");

        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(include_str!("../schemas/schema_v1.sql"))
                .unwrap();
            conn.pragma_update(None, "user_version", 1).unwrap();
            conn.execute(
                "INSERT INTO context_blocks \
                 (id, title, body, tags, date_saved, is_favorite, created_at, updated_at) \
                 VALUES ('old-1', 'legacy', 'body', '[]', '2024-01-01T00:00:00+00:00', 0, \
                 '2024-01-01T00:00:00+00:00', '2024-01-01T00:00:00+00:00')",
                [],
            )
            .unwrap();
        }

        let db = Database::new(path.clone()).unwrap();
        let loaded = db
            .get_context_block("old-1".to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.platform, PlatformKind::Chatgpt);

        let version: i32 = Connection::open(&path)
            .unwrap()
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, CURRENT_SCHEMA_VERSION);
    }
}
