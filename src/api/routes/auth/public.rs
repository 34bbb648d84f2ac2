//! Public types for the auth API
use serde::Deserialize;

#[derive(Deserialize)]
pub struct LoginRequest {
    /// ID token returned by the provider's sign-in popup
    pub credential: String,
}
