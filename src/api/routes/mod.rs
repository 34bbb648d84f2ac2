//! API routes module

pub mod auth;
pub mod events;
pub mod mail;
mod profile;
pub mod subscribers;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Calendar events and attendee registration
        .nest("/events", events::router())
        // Notification mailing list
        .nest("/subscribers", subscribers::router())
        // Mail outbox
        .nest("/mail", mail::router())
        // Admin sign in
        .nest("/auth", auth::router())
        // Visitor profile cookie
        .nest("/profile", profile::router())
}
