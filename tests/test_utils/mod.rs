//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use axum::{
    Router,
    body::Body,
    http::{Request, header},
};
use tokio_rusqlite::Connection;

use ekoli::api::AppState;
use ekoli::api::app;
use ekoli::core::AppConfig;
use ekoli::core::db::initialize_db;
use ekoli::session::{IdentityProvider, SignedIn, User};

/// Accepts `valid-token`, good for an hour, and `expiring-token`,
/// which runs out the moment it is issued.
pub struct StaticIdentityProvider;

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn sign_in(&self, credential: &str) -> Result<SignedIn, Error> {
        let expires_at = match credential {
            "valid-token" => Utc::now() + chrono::Duration::hours(1),
            "expiring-token" => Utc::now(),
            _ => return Err(anyhow!("Invalid credential")),
        };
        Ok(SignedIn {
            user: User {
                id: "admin-uid".to_string(),
                name: "Admin".to_string(),
                email: "admin@ekoli.be".to_string(),
                photo_url: None,
            },
            expires_at: Some(expires_at),
        })
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        storage_path: String::from("./"),
        db_path: String::from(":memory:"),
        web_ui_path: String::from("./web-ui"),
        app_url: String::from("https://calendar.example.com"),
        mail_reply_to: String::from("info@ekoli.be"),
        timezone: String::from("Europe/Brussels"),
        google_client_id: None,
        google_tokeninfo_url: String::from("http://localhost/tokeninfo"),
    }
}

/// Creates a test application router backed by a fresh in-memory
/// database. The database handle is returned too so tests can look at
/// or tamper with what the API stored.
pub async fn test_app_with_db() -> (Router, Connection) {
    let db = Connection::open_in_memory()
        .await
        .expect("Failed to open in-memory db");
    db.call(|conn| {
        initialize_db(conn).expect("Failed to initialize db");
        Ok(())
    })
    .await
    .unwrap();

    let app_state = AppState::new(
        db.clone(),
        test_config(),
        Arc::new(StaticIdentityProvider),
    )
    .expect("Failed to build app state");
    (app(Arc::new(RwLock::new(app_state))), db)
}

pub async fn test_app() -> Router {
    test_app_with_db().await.0
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf-8")
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).expect("Body is not json")
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .body(Body::empty())
        .unwrap()
}

/// Make every outbox insert addressed to `email` fail.
pub async fn reject_mail_to(db: &Connection, email: &'static str) {
    db.call(move |conn| {
        conn.execute_batch(&format!(
            "CREATE TRIGGER reject_mail BEFORE INSERT ON system
             WHEN json_extract(NEW.data, '$.to') = '{email}'
             BEGIN SELECT RAISE(ABORT, 'mailbox rejected'); END;"
        ))?;
        Ok(())
    })
    .await
    .unwrap();
}
