//! Signed-in admin and visitor profile state.

mod auth;
mod profile;
mod store;
pub use auth::*;
pub use profile::*;
pub use store::*;
