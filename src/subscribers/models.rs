use serde::{Deserialize, Serialize};

/// A recipient of event notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: String,
    pub email: String,
    pub name: String,
    // Assigned by the database when the row is inserted
    pub subscribed_at: String,
}
