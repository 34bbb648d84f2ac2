//! Router for the auth API

use std::sync::{Arc, RwLock};

use axum::{Json, Router, extract::State};
use chrono::Utc;
use serde_json::Value;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::session::{self, IdentityProvider, User};

type SharedState = Arc<RwLock<AppState>>;

fn identity_provider(state: &SharedState) -> Arc<dyn IdentityProvider> {
    Arc::clone(&state.read().expect("Unable to read shared state").identity)
}

async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<public::LoginRequest>,
) -> Result<Json<User>, ApiError> {
    let provider = identity_provider(&state);
    let signed_in = session::login(provider.as_ref(), &payload.credential).await?;
    let user = signed_in.user.clone();

    state
        .write()
        .expect("Unable to write shared state")
        .session
        .sign_in(signed_in);

    Ok(Json(user))
}

async fn logout(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let provider = identity_provider(&state);
    session::logout(provider.as_ref()).await?;

    state
        .write()
        .expect("Unable to write shared state")
        .session
        .sign_out();

    Ok(Json(serde_json::json!({"success": true})))
}

// Reading the user is where an expired sign-in gets noticed
async fn current_user(State(state): State<SharedState>) -> Json<Option<User>> {
    let mut shared_state = state.write().expect("Unable to write shared state");
    shared_state.session.expire(Utc::now());
    Json(shared_state.session.current_user())
}

/// Create the auth router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/login", axum::routing::post(login))
        .route("/logout", axum::routing::post(logout))
        .route("/user", axum::routing::get(current_user))
}
