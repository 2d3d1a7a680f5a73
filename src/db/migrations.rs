use anyhow::{Context, Result};
use log::info;
use rusqlite::Connection;

pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Bring the database up to `CURRENT_SCHEMA_VERSION`. Each step runs in
/// its own transaction and bumps the `user_version` pragma on commit, so
/// a failed step leaves the previous version intact.
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let mut version = schema_version(conn)?;

    while version < CURRENT_SCHEMA_VERSION {
        let next = version + 1;
        info!("Migrating database schema v{version} -> v{next}");

        let tx = conn
            .transaction()
            .context("failed to open migration transaction")?;

        let sql = match next {
            1 => include_str!("schemas/schema_v1.sql"),
            2 => include_str!("schemas/schema_v2.sql"),
            other => anyhow::bail!("no migration defined for schema version {other}"),
        };

        tx.execute_batch(sql)
            .with_context(|| format!("failed to apply schema v{next}"))?;
        tx.pragma_update(None, "user_version", next)
            .with_context(|| format!("failed to record schema version {next}"))?;
        tx.commit()
            .with_context(|| format!("failed to commit schema v{next}"))?;

        version = next;
    }

    Ok(())
}

fn schema_version(conn: &Connection) -> Result<i32> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .context("failed to read schema version")
}
