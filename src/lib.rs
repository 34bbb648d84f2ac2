pub mod api;
pub mod cli;
pub mod core;
pub mod events;
pub mod mail;
pub mod session;
pub mod subscribers;
