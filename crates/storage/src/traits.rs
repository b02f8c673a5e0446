use std::collections::HashMap;

use async_trait::async_trait;
use scholar_core::{FindQuery, ResultFilter, ResultRecord, Student, StudentFilter};

use crate::error::StorageError;

/// The storage trait for student and result documents.
///
/// ## Uniqueness
///
/// `insert_result` is a single conditional insert: it fails with
/// `StorageError::DuplicateResult` when any stored result matches
/// `DuplicateKey::of(&record)`, and the check and the write must not be
/// separable by a concurrent writer. `replace_result` does not re-check the
/// key.
///
/// ## References
///
/// `ResultRecord::student_id` is a weak reference. Stores never validate it
/// and never cascade student deletion to results.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` to be shared through
/// axum application state and across tasks.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    // ── Results ──────────────────────────────────────────────────────────────

    /// Insert a new result unless its duplicate key is already taken.
    async fn insert_result(&self, record: ResultRecord) -> Result<ResultRecord, StorageError>;

    /// Returns `Err(StorageError::NotFound)` if absent.
    async fn get_result(&self, id: &str) -> Result<ResultRecord, StorageError>;

    /// Overwrite an existing result, matched by id.
    async fn replace_result(&self, record: ResultRecord) -> Result<ResultRecord, StorageError>;

    async fn delete_result(&self, id: &str) -> Result<(), StorageError>;

    /// Filter, order (stable, insertion order on ties), then skip/limit.
    async fn find_results(&self, query: &FindQuery) -> Result<Vec<ResultRecord>, StorageError>;

    async fn count_results(&self, filter: &ResultFilter) -> Result<u64, StorageError>;

    // ── Students ─────────────────────────────────────────────────────────────

    async fn insert_student(&self, student: Student) -> Result<Student, StorageError>;

    async fn get_student(&self, id: &str) -> Result<Student, StorageError>;

    /// Batch lookup keyed by id. Unknown ids are absent from the map.
    async fn get_students(&self, ids: &[String]) -> Result<HashMap<String, Student>, StorageError>;

    /// Matching students ordered by `full_name` ascending.
    async fn find_students(&self, filter: &StudentFilter) -> Result<Vec<Student>, StorageError>;

    async fn replace_student(&self, student: Student) -> Result<Student, StorageError>;

    /// Removes the student only; results referencing it are kept.
    async fn delete_student(&self, id: &str) -> Result<(), StorageError>;
}
