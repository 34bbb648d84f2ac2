//! Router for the mail outbox API

use std::sync::{Arc, RwLock};

use axum::{Router, extract::State, response::Json};
use axum_extra::extract::Query;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::mail::{self, MailDocument};

type SharedState = Arc<RwLock<AppState>>;

// List queued mail, optionally for a single event
async fn list_mail(
    State(state): State<SharedState>,
    Query(params): Query<public::MailQuery>,
) -> Result<Json<Vec<MailDocument>>, ApiError> {
    let db = state.read().expect("Unable to read shared state").db.clone();
    let mail = mail::list_mail(&db, params.event_id.as_deref()).await?;
    Ok(Json(mail))
}

/// Create the mail router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", axum::routing::get(list_mail))
}
