//! Error conditions callers need to tell apart from generic failures.
//! They travel inside `anyhow::Error` and are recovered with
//! `downcast_ref` where it matters (e.g. choosing an HTTP status).

use thiserror::Error;

/// A document with the given id does not exist in the collection.
#[derive(Error, Debug)]
#[error("No document {id} in {collection}")]
pub struct NotFound {
    pub collection: &'static str,
    pub id: String,
}

impl NotFound {
    pub fn new(collection: &'static str, id: &str) -> Self {
        Self {
            collection,
            id: id.to_string(),
        }
    }
}

/// The caller supplied data that can never be stored.
#[derive(Error, Debug)]
#[error("Invalid input: {0}")]
pub struct InvalidInput(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_formats_error_messages() {
        assert_eq!(
            NotFound::new("events", "abc").to_string(),
            "No document abc in events"
        );
        assert_eq!(
            InvalidInput("ends before it starts".to_string()).to_string(),
            "Invalid input: ends before it starts"
        );
    }

    #[test]
    fn it_survives_a_trip_through_anyhow() {
        let err: anyhow::Error = NotFound::new("events", "abc").into();
        assert_eq!(err.downcast_ref::<NotFound>().map(|e| e.id.as_str()), Some("abc"));
    }
}
