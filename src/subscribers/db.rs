use anyhow::{Error, Result};
use tokio_rusqlite::{Connection, params};
use uuid::Uuid;

use super::models::Subscriber;
use crate::core::db::SUBSCRIBERS;

pub async fn is_email_subscribed(db: &Connection, email: &str) -> Result<bool, Error> {
    let email = email.to_owned();
    let exists = db
        .call(move |conn| {
            let exists: bool = conn.query_row(
                &format!("SELECT EXISTS(SELECT 1 FROM {SUBSCRIBERS} WHERE email = ?1)"),
                [email],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await?;
    Ok(exists)
}

/// Subscribe `email` to event notifications. Subscribing an address
/// that is already on the list leaves the existing entry as it is.
///
/// The unique index on `email` makes this a single atomic upsert so
/// concurrent calls can't create duplicate rows. Returns whether a new
/// subscriber was added.
pub async fn subscribe_to_notifications(
    db: &Connection,
    email: &str,
    name: &str,
) -> Result<bool, Error> {
    let id = Uuid::new_v4().to_string();
    let (email_owned, name) = (email.to_owned(), name.to_owned());
    let inserted = db
        .call(move |conn| {
            let inserted = conn.execute(
                &format!(
                    "INSERT INTO {SUBSCRIBERS} (id, email, name) VALUES (?1, ?2, ?3)
                     ON CONFLICT(email) DO NOTHING"
                ),
                params![id, email_owned, name],
            )?;
            Ok(inserted)
        })
        .await?;

    if inserted > 0 {
        tracing::info!("Subscribed {} to notifications", email);
    } else {
        tracing::debug!("{} is already subscribed", email);
    }
    Ok(inserted > 0)
}

/// Remove every subscription for `email`. All matching rows are gone
/// by the time this returns.
pub async fn unsubscribe_from_notifications(db: &Connection, email: &str) -> Result<usize, Error> {
    let email_owned = email.to_owned();
    let removed = db
        .call(move |conn| {
            let removed = conn.execute(
                &format!("DELETE FROM {SUBSCRIBERS} WHERE email = ?1"),
                [email_owned],
            )?;
            Ok(removed)
        })
        .await?;

    tracing::info!("Unsubscribed {} ({} removed)", email, removed);
    Ok(removed)
}

/// Every subscriber, unordered and unpaginated.
pub async fn get_all_subscribers(db: &Connection) -> Result<Vec<Subscriber>, Error> {
    let subscribers = db
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT id, email, name, subscribed_at FROM {SUBSCRIBERS}"
            ))?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(Subscriber {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        name: row.get(2)?,
                        subscribed_at: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await?;
    Ok(subscribers)
}
