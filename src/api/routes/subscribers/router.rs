//! Router for the subscribers API

use std::sync::{Arc, RwLock};

use axum::{Router, extract::State, response::Json};
use axum_extra::extract::Query;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::subscribers::{self, Subscriber};

type SharedState = Arc<RwLock<AppState>>;

async fn list_subscribers(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Subscriber>>, ApiError> {
    let db = state.read().expect("Unable to read shared state").db.clone();
    let subscribers = subscribers::get_all_subscribers(&db).await?;
    Ok(Json(subscribers))
}

async fn subscribe(
    State(state): State<SharedState>,
    Json(payload): Json<public::SubscribeRequest>,
) -> Result<Json<public::SubscribeResponse>, ApiError> {
    let db = state.read().expect("Unable to read shared state").db.clone();
    let added =
        subscribers::subscribe_to_notifications(&db, payload.email.trim(), payload.name.trim())
            .await?;
    Ok(Json(public::SubscribeResponse {
        subscribed: true,
        added,
    }))
}

async fn subscription_status(
    State(state): State<SharedState>,
    Query(params): Query<public::EmailQuery>,
) -> Result<Json<public::SubscriptionStatus>, ApiError> {
    let db = state.read().expect("Unable to read shared state").db.clone();
    let subscribed = subscribers::is_email_subscribed(&db, params.email.trim()).await?;
    Ok(Json(public::SubscriptionStatus { subscribed }))
}

async fn unsubscribe(
    State(state): State<SharedState>,
    Query(params): Query<public::EmailQuery>,
) -> Result<Json<public::UnsubscribeResponse>, ApiError> {
    let db = state.read().expect("Unable to read shared state").db.clone();
    let removed = subscribers::unsubscribe_from_notifications(&db, params.email.trim()).await?;
    Ok(Json(public::UnsubscribeResponse { removed }))
}

/// Create the subscribers router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/",
            axum::routing::get(list_subscribers)
                .post(subscribe)
                .delete(unsubscribe),
        )
        .route("/status", axum::routing::get(subscription_status))
}
