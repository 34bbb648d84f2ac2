use anyhow::{Error, Result, anyhow};
use rusqlite::OptionalExtension;
use serde_json::{Map, Value, json};
use tokio_rusqlite::{Connection, params};
use uuid::Uuid;

use super::models::{Attendee, CalendarEvent, EventDocument, NewEvent};
use crate::core::db::EVENTS;
use crate::core::error::NotFound;

/// Read every event. Order is whatever the database returns.
pub async fn fetch_events(db: &Connection) -> Result<Vec<CalendarEvent>, Error> {
    let rows = db
        .call(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT id, data FROM {EVENTS}"))?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await?;

    rows.into_iter()
        .map(|(id, data)| EventDocument::parse(&data)?.into_event(id))
        .collect()
}

pub async fn get_event(db: &Connection, event_id: &str) -> Result<CalendarEvent, Error> {
    let id = event_id.to_owned();
    let data: Option<String> = db
        .call(move |conn| {
            let data = conn
                .query_row(
                    &format!("SELECT data FROM {EVENTS} WHERE id = ?1"),
                    [&id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(data)
        })
        .await?;

    let data = data.ok_or_else(|| NotFound::new(EVENTS, event_id))?;
    EventDocument::parse(&data)?.into_event(event_id.to_string())
}

/// Insert a new event and return it with its generated id.
pub async fn create_event(db: &Connection, event: NewEvent) -> Result<CalendarEvent, Error> {
    let doc = EventDocument::try_from(&event)?;
    let data = serde_json::to_string(&doc)?;
    let id = Uuid::new_v4().to_string();

    let event_id = id.clone();
    db.call(move |conn| {
        conn.execute(
            &format!("INSERT INTO {EVENTS} (id, data) VALUES (?1, ?2)"),
            params![event_id, data],
        )?;
        Ok(())
    })
    .await?;

    tracing::info!("Created event {} \"{}\"", id, event.title);
    Ok(event.with_id(id))
}

/// Overwrite the fields present on `event`. Fields the event does not
/// carry keep their stored values; a provided `extendedProps` replaces
/// the stored one as a whole. Returns the event as it was stored.
pub async fn update_event(db: &Connection, event: &CalendarEvent) -> Result<CalendarEvent, Error> {
    let doc = EventDocument::try_from(&NewEvent::from(event))?;
    let fields: Map<String, Value> = match serde_json::to_value(&doc)? {
        Value::Object(fields) => fields,
        other => return Err(anyhow!("Event document is not an object: {}", other)),
    };

    let id = event.id.clone();
    let merged: Option<String> = db
        .call(move |conn| {
            // Read and write in one transaction so a concurrent
            // attendee update can't be lost in between
            let tx = conn.transaction()?;
            let stored: Option<String> = tx
                .query_row(
                    &format!("SELECT data FROM {EVENTS} WHERE id = ?1"),
                    [&id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(stored) = stored else {
                return Ok(None);
            };

            let mut merged: Map<String, Value> = serde_json::from_str(&stored)
                .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
            merged.extend(fields);
            let merged = Value::Object(merged).to_string();

            tx.execute(
                &format!("UPDATE {EVENTS} SET data = ?2 WHERE id = ?1"),
                params![id, merged],
            )?;
            tx.commit()?;
            Ok(Some(merged))
        })
        .await?;

    let merged = merged.ok_or_else(|| NotFound::new(EVENTS, &event.id))?;

    tracing::info!("Updated event {}", event.id);
    EventDocument::parse(&merged)?.into_event(event.id.clone())
}

/// Replace `extendedProps.attendees` and nothing else.
///
/// Concurrent registrations that each read the attendee list, append
/// and write it back will race: the last write wins.
pub async fn update_event_attendees(
    db: &Connection,
    event_id: &str,
    attendees: Vec<Attendee>,
) -> Result<(), Error> {
    let id = event_id.to_owned();
    let attendees_json = json!(attendees).to_string();

    let changed = db
        .call(move |conn| {
            let changed = conn.execute(
                &format!(
                    r"
                    UPDATE {EVENTS}
                    SET data = json_set(
                        CASE
                            WHEN json_type(data, '$.extendedProps') IS NULL
                            THEN json_set(data, '$.extendedProps', json('{{}}'))
                            ELSE data
                        END,
                        '$.extendedProps.attendees',
                        json(?2)
                    )
                    WHERE id = ?1
                    "
                ),
                params![id, attendees_json],
            )?;
            Ok(changed)
        })
        .await?;

    if changed == 0 {
        return Err(NotFound::new(EVENTS, event_id).into());
    }

    Ok(())
}

/// Add an attendee to an event unless someone with the same email is
/// already registered. Returns the event as it looks afterwards.
pub async fn add_attendee(
    db: &Connection,
    event_id: &str,
    attendee: Attendee,
) -> Result<CalendarEvent, Error> {
    let mut event = get_event(db, event_id).await?;

    if event.attendees().iter().any(|a| a.email == attendee.email) {
        tracing::debug!("{} is already attending {}", attendee.email, event_id);
        return Ok(event);
    }

    let mut attendees = event.attendees().to_vec();
    attendees.push(attendee);
    update_event_attendees(db, event_id, attendees.clone()).await?;

    event
        .extended_props
        .get_or_insert_with(Default::default)
        .attendees = Some(attendees);
    Ok(event)
}

/// Delete an event. Deleting an id that doesn't exist is not an error.
pub async fn delete_event(db: &Connection, event_id: &str) -> Result<(), Error> {
    let id = event_id.to_owned();
    db.call(move |conn| {
        conn.execute(&format!("DELETE FROM {EVENTS} WHERE id = ?1"), [id])?;
        Ok(())
    })
    .await?;

    tracing::info!("Deleted event {}", event_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::core::db::test_db;
    use crate::core::error::InvalidInput;
    use crate::events::models::{EventDocumentLink, ExtendedProps};

    fn cleanup_day() -> NewEvent {
        NewEvent {
            title: "Cleanup Day".to_string(),
            start: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            background_color: None,
            all_day: None,
            extended_props: None,
        }
    }

    async fn raw_document(db: &Connection, id: &str) -> Value {
        let id = id.to_owned();
        let data: String = db
            .call(move |conn| {
                let data = conn.query_row(
                    "SELECT data FROM events WHERE id = ?1",
                    [id],
                    |row| row.get(0),
                )?;
                Ok(data)
            })
            .await
            .unwrap();
        serde_json::from_str(&data).unwrap()
    }

    #[tokio::test]
    async fn it_creates_and_fetches_an_event() {
        let db = test_db().await;
        let created = create_event(&db, cleanup_day()).await.unwrap();
        assert!(!created.id.is_empty());

        let events = fetch_events(&db).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], created);
        assert_eq!(events[0].title, "Cleanup Day");
        assert_eq!(
            events[0].start,
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
        );
        assert_eq!(
            events[0].end,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn it_round_trips_all_optional_fields() {
        let db = test_db().await;
        let mut event = cleanup_day();
        event.background_color = Some("#3c8d2f".to_string());
        event.all_day = Some(false);
        event.extended_props = Some(ExtendedProps {
            description: Some("Bring gloves".to_string()),
            location: Some("Park".to_string()),
            attendees: Some(vec![Attendee {
                email: "an@example.com".to_string(),
                name: "An".to_string(),
            }]),
            min_attendees: Some(5),
            documents: Some(vec![EventDocumentLink {
                title: "Route".to_string(),
                url: "https://example.com/route.pdf".to_string(),
            }]),
        });

        let created = create_event(&db, event).await.unwrap();
        let fetched = get_event(&db, &created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn it_never_writes_absent_fields() {
        let db = test_db().await;
        let created = create_event(&db, cleanup_day()).await.unwrap();

        let doc = raw_document(&db, &created.id).await;
        let mut keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["end", "start", "title"]);
        assert!(!doc.to_string().contains("null"));
    }

    #[tokio::test]
    async fn it_rejects_an_event_ending_before_it_starts() {
        let db = test_db().await;
        let mut event = cleanup_day();
        std::mem::swap(&mut event.start, &mut event.end);

        let err = create_event(&db, event).await.unwrap_err();
        assert!(err.downcast_ref::<InvalidInput>().is_some());
        assert!(fetch_events(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn it_updates_present_fields_and_keeps_absent_ones() {
        let db = test_db().await;
        let mut event = cleanup_day();
        event.background_color = Some("#ff0000".to_string());
        let created = create_event(&db, event).await.unwrap();

        let mut edited = created.clone();
        edited.title = "Cleanup Day (moved)".to_string();
        edited.background_color = None;
        let updated = update_event(&db, &edited).await.unwrap();

        let fetched = get_event(&db, &created.id).await.unwrap();
        assert_eq!(fetched.title, "Cleanup Day (moved)");
        assert_eq!(fetched.background_color, Some("#ff0000".to_string()));
        assert_eq!(updated, fetched);
    }

    #[tokio::test]
    async fn it_returns_stored_details_the_update_left_out() {
        let db = test_db().await;
        let mut event = cleanup_day();
        event.extended_props = Some(ExtendedProps {
            description: Some("Bring gloves".to_string()),
            location: Some("Stadspark".to_string()),
            ..Default::default()
        });
        let created = create_event(&db, event).await.unwrap();

        let edited = NewEvent {
            title: "Cleanup Day (moved)".to_string(),
            ..cleanup_day()
        }
        .with_id(created.id.clone());
        let updated = update_event(&db, &edited).await.unwrap();

        let props = updated.extended_props.clone().unwrap();
        assert_eq!(props.location.as_deref(), Some("Stadspark"));
        assert_eq!(props.description.as_deref(), Some("Bring gloves"));
        assert_eq!(updated, get_event(&db, &created.id).await.unwrap());
    }

    #[tokio::test]
    async fn it_never_writes_absent_fields_on_update() {
        let db = test_db().await;
        let created = create_event(&db, cleanup_day()).await.unwrap();

        let mut edited = created.clone();
        edited.all_day = None;
        edited.background_color = None;
        edited.extended_props = Some(ExtendedProps {
            description: Some(String::new()),
            location: Some(String::new()),
            ..Default::default()
        });
        update_event(&db, &edited).await.unwrap();

        let doc = raw_document(&db, &created.id).await;
        let mut keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["end", "extendedProps", "start", "title"]);
        assert_eq!(doc["extendedProps"], serde_json::json!({}));
        assert!(!doc.to_string().contains("null"));
        assert!(!doc.to_string().contains("\"\""));
    }

    #[tokio::test]
    async fn it_fails_to_update_a_missing_event() {
        let db = test_db().await;
        let event = cleanup_day().with_id("does-not-exist".to_string());
        let err = update_event(&db, &event).await.unwrap_err();
        assert!(err.downcast_ref::<NotFound>().is_some());
    }

    #[tokio::test]
    async fn it_updates_only_the_attendee_path() {
        let db = test_db().await;
        let mut event = cleanup_day();
        event.background_color = Some("#00ff00".to_string());
        event.extended_props = Some(ExtendedProps {
            description: Some("Bring gloves".to_string()),
            location: Some("Park".to_string()),
            min_attendees: Some(3),
            ..Default::default()
        });
        let created = create_event(&db, event).await.unwrap();
        let before = raw_document(&db, &created.id).await;

        let attendees = vec![Attendee {
            email: "jo@example.com".to_string(),
            name: "Jo".to_string(),
        }];
        update_event_attendees(&db, &created.id, attendees)
            .await
            .unwrap();
        let after = raw_document(&db, &created.id).await;

        for key in ["title", "start", "end", "backgroundColor"] {
            assert_eq!(before[key], after[key], "{} changed", key);
        }
        for key in ["description", "location", "minAttendees"] {
            assert_eq!(
                before["extendedProps"][key], after["extendedProps"][key],
                "extendedProps.{} changed",
                key
            );
        }
        assert_eq!(
            after["extendedProps"]["attendees"],
            json!([{"email": "jo@example.com", "name": "Jo"}])
        );
    }

    #[tokio::test]
    async fn it_creates_extended_props_when_setting_attendees() {
        let db = test_db().await;
        let created = create_event(&db, cleanup_day()).await.unwrap();

        update_event_attendees(
            &db,
            &created.id,
            vec![Attendee {
                email: "jo@example.com".to_string(),
                name: "Jo".to_string(),
            }],
        )
        .await
        .unwrap();

        let fetched = get_event(&db, &created.id).await.unwrap();
        assert_eq!(fetched.attendees().len(), 1);
    }

    #[tokio::test]
    async fn it_adds_an_attendee_once() {
        let db = test_db().await;
        let created = create_event(&db, cleanup_day()).await.unwrap();
        let jo = Attendee {
            email: "jo@example.com".to_string(),
            name: "Jo".to_string(),
        };

        add_attendee(&db, &created.id, jo.clone()).await.unwrap();
        let event = add_attendee(&db, &created.id, jo).await.unwrap();
        assert_eq!(event.attendees().len(), 1);

        let fetched = get_event(&db, &created.id).await.unwrap();
        assert_eq!(fetched.attendees().len(), 1);
    }

    #[tokio::test]
    async fn it_deletes_events_unconditionally() {
        let db = test_db().await;
        let created = create_event(&db, cleanup_day()).await.unwrap();

        delete_event(&db, &created.id).await.unwrap();
        delete_event(&db, &created.id).await.unwrap();
        assert!(fetch_events(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn it_fails_on_malformed_documents() {
        let db = test_db().await;
        db.call(|conn| {
            conn.execute(
                r#"INSERT INTO events (id, data) VALUES ('broken', '{"title":"No start"}')"#,
                [],
            )?;
            Ok(())
        })
        .await
        .unwrap();

        assert!(fetch_events(&db).await.is_err());
    }
}
