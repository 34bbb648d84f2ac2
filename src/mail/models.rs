use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    EventCreated,
    EventUpdated,
}

impl NotificationType {
    pub fn for_update(is_update: bool) -> Self {
        if is_update {
            Self::EventUpdated
        } else {
            Self::EventCreated
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailMessage {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// A document in the mail outbox. The mail extension picks up anything
/// shaped `{to, message: {subject, html, text}, replyTo}` and sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailDocument {
    pub to: String,
    pub event_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendee_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_type: Option<NotificationType>,
    // Set by the database on insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub message: MailMessage,
    pub reply_to: String,
}
