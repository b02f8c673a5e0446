//! Conformance test suite for `RecordStore` implementations.
//!
//! This module provides a backend-agnostic test suite that any `RecordStore`
//! implementation can run to verify correctness. The suite covers:
//!
//! - **Results**: insert, read, replace and delete by id
//! - **Uniqueness**: the conditional insert on (student, exam, subject)
//! - **Queries**: filtering, ordering, windowing and counting
//! - **Students**: student CRUD, batch lookup, name ordering, weak references
//! - **Error handling**: correct error variants for missing documents
//! - **Concurrency**: racing inserts of the same duplicate key
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory function that
//! creates a fresh, empty store for each test:
//!
//! ```ignore
//! use scholar_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn mongo_conformance() {
//!     let report = run_conformance_suite(|| async {
//!         create_test_mongo_store().await
//!     }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod concurrent;
mod error;
mod query;
mod results;
mod students;
mod unique;

use std::fmt;
use std::future::Future;

use scholar_core::{ClassName, Grade, ResultRecord, Student};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use crate::RecordStore;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "results", "unique", "query").
    pub category: String,
    /// Test name (e.g. "insert_then_get_returns_same_document").
    pub name: String,
    /// Whether the test passed.
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn pass(category: &str, name: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: true,
            message: None,
        }
    }

    fn fail(category: &str, name: &str, msg: String) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed: false,
            message: Some(msg),
        }
    }

    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self::pass(category, name),
            Err(msg) => Self::fail(category, name, msg),
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// store, ensuring test isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(results::run_result_tests(&factory).await);
    results.extend(unique::run_unique_tests(&factory).await);
    results.extend(query::run_query_tests(&factory).await);
    results.extend(students::run_student_tests(&factory).await);
    results.extend(error::run_error_tests(&factory).await);
    results.extend(concurrent::run_concurrent_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers: document constructors with sensible defaults ────────────────────

fn base_time() -> OffsetDateTime {
    datetime!(2025-01-01 8:00 UTC)
}

fn make_result(id: &str, student_id: &str, exam: &str) -> ResultRecord {
    ResultRecord {
        id: id.to_string(),
        student_id: student_id.to_string(),
        student_name: format!("Student {student_id}"),
        class_name: ClassName::Nazera,
        exam: exam.to_string(),
        grade: Grade::A,
        marks: Some(80.0),
        subject: None,
        remarks: None,
        exam_date: Some(base_time()),
        created_by: scholar_core::DEFAULT_CREATED_BY.to_string(),
        created_at: base_time(),
        updated_at: base_time(),
    }
}

fn make_subject_result(id: &str, student_id: &str, exam: &str, subject: &str) -> ResultRecord {
    ResultRecord {
        subject: Some(subject.to_string()),
        ..make_result(id, student_id, exam)
    }
}

/// A result created `minutes` after the base time.
fn make_result_at(id: &str, student_id: &str, exam: &str, minutes: i64) -> ResultRecord {
    let at = base_time() + Duration::minutes(minutes);
    ResultRecord {
        created_at: at,
        updated_at: at,
        ..make_result(id, student_id, exam)
    }
}

fn make_student(id: &str, full_name: &str, class_name: ClassName) -> Student {
    Student {
        id: id.to_string(),
        full_name: full_name.to_string(),
        class_name,
        phone: None,
        father_name: None,
        mother_name: None,
        date_of_birth: None,
        created_at: base_time(),
        updated_at: base_time(),
    }
}

fn ids(records: &[ResultRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}
