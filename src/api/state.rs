use std::sync::Arc;

use anyhow::{Error, Result};
use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::mail::MailSettings;
use crate::session::{IdentityProvider, Session};

pub struct AppState {
    pub db: Connection,
    pub config: AppConfig,
    pub mail: MailSettings,
    pub identity: Arc<dyn IdentityProvider>,
    // The signed-in admin, shared by every request
    pub session: Session,
}

impl AppState {
    pub fn new(
        db: Connection,
        config: AppConfig,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, Error> {
        let mail = MailSettings::from_config(&config)?;
        let mut session = Session::new();
        session.subscribe(|user| match user {
            Some(user) => tracing::info!("Admin signed in: {}", user.email),
            None => tracing::info!("Admin signed out"),
        });

        Ok(Self {
            db,
            config,
            mail,
            identity,
            session,
        })
    }
}
