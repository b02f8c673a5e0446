use scholar_core::ValidationError;
use scholar_storage::{Collection, StorageError};

use crate::messages::{Locale, Message};

/// Errors surfaced to callers of the services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{collection} document not found: {id}")]
    NotFound { collection: Collection, id: String },

    /// The duplicate key of a new result is already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other store failure. Never shown to API clients verbatim.
    #[error(transparent)]
    Store(StorageError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { collection, id } => ServiceError::NotFound { collection, id },
            err @ StorageError::DuplicateResult { .. } => ServiceError::Conflict(err.to_string()),
            other => ServiceError::Store(other),
        }
    }
}

impl ServiceError {
    /// Text for the response envelope in the given locale.
    pub fn localized(&self, locale: Locale) -> String {
        match self {
            ServiceError::Validation(ValidationError::MissingFields(fields)) => {
                locale.missing_fields(fields)
            }
            ServiceError::Validation(other) => other.to_string(),
            ServiceError::NotFound {
                collection: Collection::Results,
                ..
            } => Message::ResultNotFound.text(locale).to_string(),
            ServiceError::NotFound {
                collection: Collection::Students,
                ..
            } => Message::StudentNotFound.text(locale).to_string(),
            ServiceError::Conflict(_) => Message::DuplicateResult.text(locale).to_string(),
            ServiceError::Store(_) => Message::ServerError.text(locale).to_string(),
        }
    }
}
