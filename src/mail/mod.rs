//! Compose event emails and queue them in the mail outbox. Delivery
//! is done by the mail extension draining the outbox so nothing here
//! retries or tracks sends.

pub mod db;
pub mod models;
pub mod templates;
pub use db::*;
pub use models::*;

use anyhow::{Error, Result, anyhow};
use chrono::{DateTime, Locale, Utc};
use chrono_tz::Tz;
use handlebars::Handlebars;
use serde::Serialize;
use tokio::task::JoinSet;
use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::events::{CalendarEvent, EventDocumentLink};
use crate::subscribers::get_all_subscribers;
use templates::{Template, templates};

/// Settings the composer needs from the app config.
#[derive(Clone, Debug)]
pub struct MailSettings {
    pub reply_to: String,
    pub app_url: String,
    pub timezone: Tz,
}

impl MailSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|e| anyhow!("Unknown time zone {}: {}", config.timezone, e))?;
        Ok(Self {
            reply_to: config.mail_reply_to.clone(),
            app_url: config.app_url.clone(),
            timezone,
        })
    }
}

/// Format an instant the way a Dutch reader expects it, e.g.
/// "woensdag 1 mei 2024 om 09:00".
pub fn format_when(dt: &DateTime<Utc>, tz: &Tz) -> String {
    dt.with_timezone(tz)
        .format_localized("%A %-d %B %Y om %H:%M", Locale::nl_NL)
        .to_string()
}

#[derive(Serialize)]
struct JoinContext<'a> {
    attendee_name: &'a str,
    title: &'a str,
    when: String,
    location: Option<&'a str>,
    description: Option<&'a str>,
    documents: &'a [EventDocumentLink],
}

#[derive(Serialize)]
struct BroadcastContext<'a> {
    heading: &'a str,
    intro: &'a str,
    subscriber_name: &'a str,
    title: &'a str,
    when: String,
    until: String,
    location: Option<&'a str>,
    description: Option<&'a str>,
    min_attendees: Option<u32>,
    documents: &'a [EventDocumentLink],
    app_url: &'a str,
}

fn location(event: &CalendarEvent) -> Option<&str> {
    event
        .extended_props
        .as_ref()
        .and_then(|p| p.location.as_deref())
        .filter(|s| !s.is_empty())
}

fn description(event: &CalendarEvent) -> Option<&str> {
    event
        .extended_props
        .as_ref()
        .and_then(|p| p.description.as_deref())
        .filter(|s| !s.is_empty())
}

fn render_join_confirmation(
    registry: &Handlebars,
    settings: &MailSettings,
    event: &CalendarEvent,
    attendee_name: &str,
) -> Result<MailMessage, Error> {
    let ctx = JoinContext {
        attendee_name,
        title: &event.title,
        when: format_when(&event.start, &settings.timezone),
        location: location(event),
        description: description(event),
        documents: event.documents(),
    };

    Ok(MailMessage {
        subject: format!("Aanmelding bevestigd: {}", event.title),
        html: registry.render(&Template::JoinConfirmationHtml.to_string(), &ctx)?,
        text: registry.render(&Template::JoinConfirmationText.to_string(), &ctx)?,
    })
}

fn render_broadcast(
    registry: &Handlebars,
    settings: &MailSettings,
    event: &CalendarEvent,
    subscriber_name: &str,
    is_update: bool,
) -> Result<MailMessage, Error> {
    let (subject, heading, intro) = if is_update {
        (
            format!("Evenement bijgewerkt: {}", event.title),
            "Een evenement is gewijzigd",
            "Het volgende evenement in de kalender is bijgewerkt:",
        )
    } else {
        (
            format!("Nieuw evenement: {}", event.title),
            "Er staat een nieuw evenement in de kalender!",
            "Het volgende evenement is zonet toegevoegd:",
        )
    };

    let ctx = BroadcastContext {
        heading,
        intro,
        subscriber_name,
        title: &event.title,
        when: format_when(&event.start, &settings.timezone),
        until: format_when(&event.end, &settings.timezone),
        location: location(event),
        description: description(event),
        min_attendees: event.extended_props.as_ref().and_then(|p| p.min_attendees),
        documents: event.documents(),
        app_url: &settings.app_url,
    };

    Ok(MailMessage {
        subject,
        html: registry.render(&Template::SubscriberBroadcastHtml.to_string(), &ctx)?,
        text: registry.render(&Template::SubscriberBroadcastText.to_string(), &ctx)?,
    })
}

/// Queue a confirmation for someone who joined `event`. Does nothing
/// when a confirmation for this event and address is already queued.
/// Returns whether a new mail was queued.
pub async fn send_event_join_email(
    db: &Connection,
    settings: &MailSettings,
    event: &CalendarEvent,
    attendee_email: &str,
    attendee_name: &str,
) -> Result<bool, Error> {
    if has_join_mail(db, &event.id, attendee_email).await? {
        tracing::debug!(
            "Join confirmation for {} on {} already queued",
            attendee_email,
            event.id
        );
        return Ok(false);
    }

    let message = render_join_confirmation(&templates(), settings, event, attendee_name)?;
    let mail = MailDocument {
        to: attendee_email.to_string(),
        event_id: event.id.clone(),
        attendee_email: Some(attendee_email.to_string()),
        notification_type: None,
        created_at: None,
        message,
        reply_to: settings.reply_to.clone(),
    };

    let queued = enqueue_join_mail(db, &mail).await?;
    if queued {
        tracing::info!("Queued join confirmation for {} on {}", attendee_email, event.id);
    }
    Ok(queued)
}

/// Queue one announcement per subscriber for a created or updated
/// event. All inserts run concurrently and every one of them is
/// awaited; if any fails the first error is returned, even though the
/// others may already be in the outbox. Returns the number queued.
pub async fn send_event_notification_to_subscribers(
    db: &Connection,
    settings: &MailSettings,
    event: &CalendarEvent,
    is_update: bool,
) -> Result<usize, Error> {
    let subscribers = get_all_subscribers(db).await?;
    if subscribers.is_empty() {
        tracing::debug!("No subscribers to notify about {}", event.id);
        return Ok(0);
    }

    let registry = templates();
    let mut tasks = JoinSet::new();
    for subscriber in subscribers {
        let message = render_broadcast(&registry, settings, event, &subscriber.name, is_update)?;
        let mail = MailDocument {
            to: subscriber.email,
            event_id: event.id.clone(),
            attendee_email: None,
            notification_type: Some(NotificationType::for_update(is_update)),
            created_at: None,
            message,
            reply_to: settings.reply_to.clone(),
        };
        let db = db.clone();
        tasks.spawn(async move { enqueue_mail(&db, &mail).await });
    }

    let mut queued = 0;
    let mut first_error: Option<Error> = None;
    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(Ok(_)) => queued += 1,
            Ok(Err(e)) => {
                tracing::error!("Failed to queue subscriber mail: {}", e);
                first_error.get_or_insert(e);
            }
            Err(e) => {
                tracing::error!("Subscriber mail task failed: {}", e);
                first_error.get_or_insert(e.into());
            }
        }
    }

    if let Some(e) = first_error {
        tracing::error!(
            "Error sending notifications for event {} ({} queued)",
            event.id,
            queued
        );
        return Err(e);
    }

    tracing::info!("Queued {} subscriber notifications for {}", queued, event.id);
    Ok(queued)
}
