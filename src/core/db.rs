//! SQLite storage for the three document collections. Each
//! collection keeps its payload as a JSON document so field names and
//! nesting match what the web UI and the mail extension read.

use anyhow::{Error, Result};
use rusqlite::Connection as SyncConnection;
use tokio_rusqlite::Connection;

pub const EVENTS: &str = "events";
pub const SUBSCRIBERS: &str = "subscribers";
pub const MAIL_OUTBOX: &str = "system";

/// SQL expression for a server-assigned UTC timestamp (RFC 3339 with
/// millisecond precision).
pub const SERVER_NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

pub async fn async_db(db_path: &str) -> Result<Connection, Error> {
    let db = Connection::open(db_path).await?;
    tracing::debug!("Opened db at {}", db_path);
    Ok(db)
}

fn schema() -> String {
    format!(
        r"
        CREATE TABLE IF NOT EXISTS {EVENTS} (
            id TEXT PRIMARY KEY,
            data TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS {SUBSCRIBERS} (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            subscribed_at TEXT NOT NULL DEFAULT ({SERVER_NOW})
        );

        CREATE TABLE IF NOT EXISTS {MAIL_OUTBOX} (
            id TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT ({SERVER_NOW})
        );

        CREATE INDEX IF NOT EXISTS {MAIL_OUTBOX}_event_id
            ON {MAIL_OUTBOX}(json_extract(data, '$.eventId'));

        -- At most one join confirmation per (event, attendee)
        CREATE UNIQUE INDEX IF NOT EXISTS {MAIL_OUTBOX}_join_once
            ON {MAIL_OUTBOX}(
                json_extract(data, '$.eventId'),
                json_extract(data, '$.attendeeEmail')
            )
            WHERE json_extract(data, '$.attendeeEmail') IS NOT NULL;
        "
    )
}

/// Create every table and index. Safe to run against a database that
/// already has them.
pub fn initialize_db(conn: &mut SyncConnection) -> Result<(), rusqlite::Error> {
    let tx = conn.transaction()?;
    tx.execute_batch(&schema())?;
    tx.commit()
}

/// Bring an existing database up to the current schema.
pub fn migrate_db(conn: &mut SyncConnection) -> Result<(), rusqlite::Error> {
    // Older databases predate the join guard and may hold duplicate
    // confirmations which would make the unique index fail to build.
    let has_outbox: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [MAIL_OUTBOX],
        |row| row.get(0),
    )?;
    if has_outbox {
        conn.execute(
            &format!(
                r"
                DELETE FROM {MAIL_OUTBOX}
                WHERE json_extract(data, '$.attendeeEmail') IS NOT NULL
                  AND rowid NOT IN (
                    SELECT MIN(rowid) FROM {MAIL_OUTBOX}
                    WHERE json_extract(data, '$.attendeeEmail') IS NOT NULL
                    GROUP BY json_extract(data, '$.eventId'),
                             json_extract(data, '$.attendeeEmail')
                  )
                "
            ),
            [],
        )?;
    }
    initialize_db(conn)
}

#[cfg(test)]
pub async fn test_db() -> Connection {
    let db = Connection::open_in_memory()
        .await
        .expect("Failed to open in-memory db");
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await
    .expect("Failed to initialize db");
    db
}
