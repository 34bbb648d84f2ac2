//! Public types for the mail outbox API
use serde::Deserialize;

#[derive(Deserialize)]
pub struct MailQuery {
    pub event_id: Option<String>,
}
