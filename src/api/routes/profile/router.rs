//! Router for the visitor profile. The profile only lives in the
//! visitor's cookie, nothing is stored server side.

use std::sync::{Arc, RwLock};

use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;

use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::session::Profile;

type SharedState = Arc<RwLock<AppState>>;

async fn get_profile(jar: CookieJar) -> Json<Profile> {
    Json(Profile::from_cookies(&jar))
}

async fn set_profile(
    jar: CookieJar,
    Json(profile): Json<Profile>,
) -> Result<(CookieJar, Json<Profile>), ApiError> {
    let cookie = profile.to_cookie()?;
    Ok((jar.add(cookie), Json(profile)))
}

/// Create the profile router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", axum::routing::get(get_profile).put(set_profile))
}
