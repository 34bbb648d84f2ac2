use anyhow::{Error, Result};
use tokio_rusqlite::{Connection, params};
use uuid::Uuid;

use super::models::MailDocument;
use crate::core::db::{MAIL_OUTBOX, SERVER_NOW};

/// Append a document to the outbox, stamping `createdAt` with the
/// database clock.
pub async fn enqueue_mail(db: &Connection, mail: &MailDocument) -> Result<String, Error> {
    let id = Uuid::new_v4().to_string();
    let data = serde_json::to_string(mail)?;

    let mail_id = id.clone();
    db.call(move |conn| {
        conn.execute(
            &format!(
                "INSERT INTO {MAIL_OUTBOX} (id, data)
                 VALUES (?1, json_set(?2, '$.createdAt', {SERVER_NOW}))"
            ),
            params![mail_id, data],
        )?;
        Ok(())
    })
    .await?;

    tracing::debug!("Queued mail {} to {}", id, mail.to);
    Ok(id)
}

pub async fn has_join_mail(
    db: &Connection,
    event_id: &str,
    attendee_email: &str,
) -> Result<bool, Error> {
    let (event_id, attendee_email) = (event_id.to_owned(), attendee_email.to_owned());
    let exists = db
        .call(move |conn| {
            let exists: bool = conn.query_row(
                &format!(
                    "SELECT EXISTS(
                        SELECT 1 FROM {MAIL_OUTBOX}
                        WHERE json_extract(data, '$.eventId') = ?1
                          AND json_extract(data, '$.attendeeEmail') = ?2
                    )"
                ),
                params![event_id, attendee_email],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await?;
    Ok(exists)
}

/// Append a join confirmation unless one already exists for the same
/// event and attendee. The outbox has a unique index on that pair so
/// two concurrent calls still only produce one document. Returns
/// whether the document was added.
pub async fn enqueue_join_mail(db: &Connection, mail: &MailDocument) -> Result<bool, Error> {
    let id = Uuid::new_v4().to_string();
    let data = serde_json::to_string(mail)?;

    let inserted = db
        .call(move |conn| {
            let inserted = conn.execute(
                &format!(
                    "INSERT OR IGNORE INTO {MAIL_OUTBOX} (id, data)
                     VALUES (?1, json_set(?2, '$.createdAt', {SERVER_NOW}))"
                ),
                params![id, data],
            )?;
            Ok(inserted)
        })
        .await?;
    Ok(inserted > 0)
}

/// Outbox documents in insertion order, optionally for a single event.
pub async fn list_mail(
    db: &Connection,
    event_id: Option<&str>,
) -> Result<Vec<MailDocument>, Error> {
    let event_id = event_id.map(str::to_owned);
    let rows = db
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT data FROM {MAIL_OUTBOX}
                 WHERE ?1 IS NULL OR json_extract(data, '$.eventId') = ?1
                 ORDER BY rowid"
            ))?;
            let rows = stmt
                .query_map([event_id], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await?;

    rows.iter()
        .map(|data| serde_json::from_str(data).map_err(Error::from))
        .collect()
}
