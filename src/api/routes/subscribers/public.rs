//! Public types for the subscribers API
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
    pub name: String,
}

#[derive(Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Serialize, Deserialize)]
pub struct SubscriptionStatus {
    pub subscribed: bool,
}

#[derive(Serialize, Deserialize)]
pub struct SubscribeResponse {
    pub subscribed: bool,
    // False when the address was already on the list
    pub added: bool,
}

#[derive(Serialize, Deserialize)]
pub struct UnsubscribeResponse {
    pub removed: usize,
}
