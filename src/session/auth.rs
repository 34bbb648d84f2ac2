//! Admin sign-in. Verifying who someone is belongs to the identity
//! provider; this module only keeps track of the result.

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::store::Store;

/// The signed-in admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(
        rename = "photoURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub photo_url: Option<String>,
}

/// What the provider hands back for a valid credential.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedIn {
    pub user: User,
    /// When the provider stops vouching for this sign-in.
    pub expires_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange a credential obtained by the browser's sign-in popup
    /// for the user it belongs to.
    async fn sign_in(&self, credential: &str) -> Result<SignedIn, Error>;

    async fn sign_out(&self) -> Result<(), Error> {
        Ok(())
    }
}

#[derive(Deserialize)]
struct TokenInfo {
    sub: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
    aud: Option<String>,
    // Seconds since the epoch, sent as a string
    exp: Option<String>,
}

/// Validates Google ID tokens with the tokeninfo endpoint.
pub struct GoogleIdentityProvider {
    tokeninfo_url: String,
    client_id: Option<String>,
    client: reqwest::Client,
}

impl GoogleIdentityProvider {
    pub fn new(tokeninfo_url: &str, client_id: Option<String>) -> Self {
        Self {
            tokeninfo_url: tokeninfo_url.to_string(),
            client_id,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    async fn sign_in(&self, credential: &str) -> Result<SignedIn, Error> {
        let info: TokenInfo = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", credential)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(client_id) = &self.client_id {
            if info.aud.as_deref() != Some(client_id.as_str()) {
                return Err(anyhow!("Token was issued for a different client"));
            }
        }

        let expires_at = match info.exp.as_deref() {
            Some(exp) => {
                let secs: i64 = exp.parse()?;
                Some(
                    DateTime::from_timestamp(secs, 0)
                        .ok_or_else(|| anyhow!("Token expiry out of range: {}", exp))?,
                )
            }
            None => None,
        };

        Ok(SignedIn {
            user: User {
                id: info.sub,
                name: info.name.unwrap_or_else(|| info.email.clone()),
                email: info.email,
                photo_url: info.picture,
            },
            expires_at,
        })
    }
}

/// Ask the provider to sign someone in. Failures are logged and handed
/// back to the caller.
pub async fn login(provider: &dyn IdentityProvider, credential: &str) -> Result<SignedIn, Error> {
    provider.sign_in(credential).await.map_err(|e| {
        tracing::error!("Error signing in: {}", e);
        e
    })
}

pub async fn logout(provider: &dyn IdentityProvider) -> Result<(), Error> {
    provider.sign_out().await.map_err(|e| {
        tracing::error!("Error signing out: {}", e);
        e
    })
}

/// The admin session: signed out (`None`) or signed in as a user.
#[derive(Debug, Default)]
pub struct Session {
    user: Store<Option<User>>,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_user(&self) -> Option<User> {
        self.user.get()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current_user().is_some()
    }

    pub fn sign_in(&mut self, signed_in: SignedIn) {
        self.expires_at = signed_in.expires_at;
        self.user.set(Some(signed_in.user));
    }

    pub fn sign_out(&mut self) {
        self.observe_provider_session(None);
    }

    /// The provider reported a session change (expiry, sign-out on
    /// another device, ...). Its view always wins.
    pub fn observe_provider_session(&mut self, user: Option<User>) {
        if user.is_none() {
            self.expires_at = None;
        }
        self.user.set(user);
    }

    /// Sign out once the provider's sign-in has run out.
    pub fn expire(&mut self, now: DateTime<Utc>) {
        let expired = self.expires_at.is_some_and(|expires_at| expires_at <= now);
        if self.is_signed_in() && expired {
            tracing::info!("Admin session expired");
            self.observe_provider_session(None);
        }
    }

    pub fn subscribe(&mut self, listener: impl Fn(&Option<User>) + Send + Sync + 'static) {
        self.user.subscribe(listener);
    }
}
