use std::fmt;

/// Document collection an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Results,
    Students,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Collection::Results => "results",
            Collection::Students => "students",
        })
    }
}

/// All errors that can be returned by a RecordStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No document with the given id.
    #[error("{collection} document not found: {id}")]
    NotFound { collection: Collection, id: String },

    /// A result with the same duplicate key already exists. Returned by the
    /// conditional insert; the existing document is left untouched.
    #[error(
        "duplicate result for student {student_id}, exam '{exam}'{}",
        .subject.as_deref().map(|s| format!(", subject '{s}'")).unwrap_or_default()
    )]
    DuplicateResult {
        student_id: String,
        exam: String,
        subject: Option<String>,
    },

    /// A document with this id is already stored.
    #[error("{collection} document already exists: {id}")]
    IdExists { collection: Collection, id: String },

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A backend-specific failure (connection, driver, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn not_found(collection: Collection, id: &str) -> Self {
        StorageError::NotFound {
            collection,
            id: id.to_string(),
        }
    }
}
