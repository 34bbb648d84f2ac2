//! The visitor profile, kept in a cookie on the visitor's browser so a
//! returning visitor doesn't have to type their name and email again.

use anyhow::{Error, Result};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

pub const PROFILE_COOKIE: &str = "userProfile";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl Profile {
    /// Read the profile from the request cookies. A missing or
    /// unreadable cookie is the empty profile.
    pub fn from_cookies(jar: &CookieJar) -> Self {
        jar.get(PROFILE_COOKIE)
            .and_then(|cookie| Self::decode(cookie.value()))
            .unwrap_or_default()
    }

    // The jar hands back the value percent-decoded, but cookies written
    // by the web UI may still carry a second layer of encoding
    fn decode(value: &str) -> Option<Self> {
        serde_json::from_str(value).ok().or_else(|| {
            let json = urlencoding::decode(value).ok()?;
            serde_json::from_str(&json).ok()
        })
    }

    /// The cookie that stores this profile for a year. The jar
    /// percent-encodes the JSON value when it writes `Set-Cookie`.
    pub fn to_cookie(&self) -> Result<Cookie<'static>, Error> {
        let json = serde_json::to_string(self)?;
        Ok(Cookie::build((PROFILE_COOKIE, json))
            .path("/")
            .max_age(time::Duration::days(365))
            .same_site(SameSite::Strict)
            .build())
    }
}
