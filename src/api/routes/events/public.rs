//! Public types for the events API
use serde::{Deserialize, Serialize};

use crate::events::CalendarEvent;

#[derive(Deserialize)]
pub struct NotifyQuery {
    /// Whether subscribers get an email about the change (default: true)
    pub notify: Option<bool>,
}

#[derive(Deserialize)]
pub struct JoinRequest {
    pub email: String,
    pub name: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub event: CalendarEvent,
    pub confirmation_queued: bool,
}
