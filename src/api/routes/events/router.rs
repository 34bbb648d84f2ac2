//! Router for the events API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::Query;
use tokio_rusqlite::Connection;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::events::{self, Attendee, CalendarEvent, NewEvent};
use crate::mail::{self, MailSettings};

type SharedState = Arc<RwLock<AppState>>;

fn db_and_mail(state: &SharedState) -> (Connection, MailSettings) {
    let shared_state = state.read().expect("Unable to read shared state");
    (shared_state.db.clone(), shared_state.mail.clone())
}

async fn list_events(
    State(state): State<SharedState>,
) -> Result<Json<Vec<CalendarEvent>>, ApiError> {
    let db = state.read().expect("Unable to read shared state").db.clone();
    let events = events::fetch_events(&db).await?;
    Ok(Json(events))
}

async fn get_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<CalendarEvent>, ApiError> {
    let db = state.read().expect("Unable to read shared state").db.clone();
    let event = events::get_event(&db, &id).await?;
    Ok(Json(event))
}

// Create an event and announce it to subscribers
async fn create_event(
    State(state): State<SharedState>,
    Query(params): Query<public::NotifyQuery>,
    Json(event): Json<NewEvent>,
) -> Result<(StatusCode, Json<CalendarEvent>), ApiError> {
    let (db, mail_settings) = db_and_mail(&state);

    let event = events::create_event(&db, event).await?;
    if params.notify.unwrap_or(true) {
        mail::send_event_notification_to_subscribers(&db, &mail_settings, &event, false).await?;
    }

    Ok((StatusCode::CREATED, Json(event)))
}

// Overwrite an event and tell subscribers it changed
async fn update_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(params): Query<public::NotifyQuery>,
    Json(event): Json<NewEvent>,
) -> Result<Json<CalendarEvent>, ApiError> {
    let (db, mail_settings) = db_and_mail(&state);

    let event = events::update_event(&db, &event.with_id(id)).await?;
    if params.notify.unwrap_or(true) {
        mail::send_event_notification_to_subscribers(&db, &mail_settings, &event, true).await?;
    }

    Ok(Json(event))
}

async fn delete_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let db = state.read().expect("Unable to read shared state").db.clone();
    events::delete_event(&db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_attendees(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(attendees): Json<Vec<Attendee>>,
) -> Result<StatusCode, ApiError> {
    let db = state.read().expect("Unable to read shared state").db.clone();
    events::update_event_attendees(&db, &id, attendees).await?;
    Ok(StatusCode::NO_CONTENT)
}

// A visitor registers for an event and gets a confirmation email
async fn join_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<public::JoinRequest>,
) -> Result<Json<public::JoinResponse>, ApiError> {
    let (db, mail_settings) = db_and_mail(&state);

    let attendee = Attendee {
        email: payload.email.trim().to_string(),
        name: payload.name.trim().to_string(),
    };
    let event = events::add_attendee(&db, &id, attendee.clone()).await?;
    let confirmation_queued = mail::send_event_join_email(
        &db,
        &mail_settings,
        &event,
        &attendee.email,
        &attendee.name,
    )
    .await?;

    Ok(Json(public::JoinResponse {
        event,
        confirmation_queued,
    }))
}

/// Create the events router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", axum::routing::get(list_events).post(create_event))
        .route(
            "/{id}",
            axum::routing::get(get_event)
                .put(update_event)
                .delete(delete_event),
        )
        .route("/{id}/attendees", axum::routing::put(update_attendees))
        .route("/{id}/join", axum::routing::post(join_event))
}
