use anyhow::{Error, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::InvalidInput;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
    pub name: String,
}

/// A link to a document attached to an event (agenda, flyer, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDocumentLink {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Attendee>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_attendees: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<EventDocumentLink>>,
}

impl ExtendedProps {
    /// Copy of the props with blank text fields dropped so they are
    /// never written to storage.
    fn sparse(&self) -> Self {
        let non_empty = |s: &Option<String>| s.clone().filter(|s| !s.is_empty());
        Self {
            description: non_empty(&self.description),
            location: non_empty(&self.location),
            attendees: self.attendees.clone(),
            min_attendees: self.min_attendees,
            documents: self.documents.clone(),
        }
    }
}

/// An event as the calendar UI sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_props: Option<ExtendedProps>,
}

impl CalendarEvent {
    pub fn attendees(&self) -> &[Attendee] {
        self.extended_props
            .as_ref()
            .and_then(|p| p.attendees.as_deref())
            .unwrap_or_default()
    }

    pub fn documents(&self) -> &[EventDocumentLink] {
        self.extended_props
            .as_ref()
            .and_then(|p| p.documents.as_deref())
            .unwrap_or_default()
    }
}

/// An event that has not been stored yet and so has no id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub all_day: Option<bool>,
    #[serde(default)]
    pub extended_props: Option<ExtendedProps>,
}

impl NewEvent {
    pub fn with_id(self, id: String) -> CalendarEvent {
        CalendarEvent {
            id,
            title: self.title,
            start: self.start,
            end: self.end,
            background_color: self.background_color,
            all_day: self.all_day,
            extended_props: self.extended_props,
        }
    }
}

impl From<&CalendarEvent> for NewEvent {
    fn from(event: &CalendarEvent) -> Self {
        Self {
            title: event.title.clone(),
            start: event.start,
            end: event.end,
            background_color: event.background_color.clone(),
            all_day: event.all_day,
            extended_props: event.extended_props.clone(),
        }
    }
}

/// Storage representation of an instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoredTimestamp {
    pub seconds: i64,
    pub nanoseconds: u32,
}

impl From<DateTime<Utc>> for StoredTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanoseconds: dt.timestamp_subsec_nanos(),
        }
    }
}

impl TryFrom<StoredTimestamp> for DateTime<Utc> {
    type Error = Error;

    fn try_from(ts: StoredTimestamp) -> Result<Self, Self::Error> {
        DateTime::from_timestamp(ts.seconds, ts.nanoseconds)
            .ok_or_else(|| anyhow!("Timestamp out of range: {:?}", ts))
    }
}

/// The document written to the events collection. Optional fields
/// that are `None` are left out entirely rather than stored as null.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDocument {
    pub title: String,
    pub start: StoredTimestamp,
    pub end: StoredTimestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_props: Option<ExtendedProps>,
}

impl EventDocument {
    pub fn parse(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn into_event(self, id: String) -> Result<CalendarEvent> {
        Ok(CalendarEvent {
            id,
            title: self.title,
            start: self.start.try_into()?,
            end: self.end.try_into()?,
            background_color: self.background_color,
            all_day: self.all_day,
            extended_props: self.extended_props,
        })
    }
}

impl TryFrom<&NewEvent> for EventDocument {
    type Error = Error;

    fn try_from(event: &NewEvent) -> Result<Self, Self::Error> {
        if event.start > event.end {
            return Err(InvalidInput(format!(
                "event \"{}\" ends before it starts",
                event.title
            ))
            .into());
        }

        Ok(Self {
            title: event.title.clone(),
            start: event.start.into(),
            end: event.end.into(),
            background_color: event.background_color.clone(),
            all_day: event.all_day,
            extended_props: event.extended_props.as_ref().map(ExtendedProps::sparse),
        })
    }
}
