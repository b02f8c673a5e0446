use std::future::Future;

use scholar_core::ClassName;

use super::{make_result, make_student, TestResult};
use crate::{Collection, RecordStore, StorageError};

pub(super) async fn run_error_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "error",
        "get_result_not_found_has_correct_fields",
        get_result_not_found_has_correct_fields(factory).await,
    ));
    results.push(TestResult::from_result(
        "error",
        "replace_missing_result",
        replace_missing_result(factory).await,
    ));
    results.push(TestResult::from_result(
        "error",
        "delete_missing_result",
        delete_missing_result(factory).await,
    ));
    results.push(TestResult::from_result(
        "error",
        "get_student_not_found_has_correct_fields",
        get_student_not_found_has_correct_fields(factory).await,
    ));
    results.push(TestResult::from_result(
        "error",
        "delete_missing_student",
        delete_missing_student(factory).await,
    ));
    results.push(TestResult::from_result(
        "error",
        "insert_existing_id_rejected",
        insert_existing_id_rejected(factory).await,
    ));

    results
}

fn expect_not_found<T: std::fmt::Debug>(
    result: Result<T, StorageError>,
    want_collection: Collection,
    want_id: &str,
) -> Result<(), String> {
    match result {
        Err(StorageError::NotFound { collection, id }) => {
            if collection != want_collection {
                return Err(format!(
                    "expected collection {want_collection}, got {collection}"
                ));
            }
            if id != want_id {
                return Err(format!("expected id \"{want_id}\", got \"{id}\""));
            }
            Ok(())
        }
        other => Err(format!("expected NotFound, got {other:?}")),
    }
}

// ── 1. Missing result ────────────────────────────────────────────────────────

async fn get_result_not_found_has_correct_fields<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    expect_not_found(s.get_result("r-404").await, Collection::Results, "r-404")
}

// ── 2. Replace of a missing result ───────────────────────────────────────────

async fn replace_missing_result<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let result = s.replace_result(make_result("ghost", "s1", "Final")).await;
    expect_not_found(result, Collection::Results, "ghost")?;
    if s.get_result("ghost").await.is_ok() {
        return Err("replace of a missing id created it".to_string());
    }
    Ok(())
}

// ── 3. Delete of a missing result ────────────────────────────────────────────

async fn delete_missing_result<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    expect_not_found(s.delete_result("r-404").await, Collection::Results, "r-404")
}

// ── 4. Missing student ───────────────────────────────────────────────────────

async fn get_student_not_found_has_correct_fields<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    expect_not_found(s.get_student("s-404").await, Collection::Students, "s-404")
}

// ── 5. Delete of a missing student ───────────────────────────────────────────

async fn delete_missing_student<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    expect_not_found(
        s.delete_student("s-404").await,
        Collection::Students,
        "s-404",
    )
}

// ── 6. Id reuse ──────────────────────────────────────────────────────────────

async fn insert_existing_id_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_result(make_result("r1", "s1", "Final"))
        .await
        .map_err(|e| e.to_string())?;
    match s.insert_result(make_result("r1", "s2", "Midterm")).await {
        Err(StorageError::IdExists { collection, .. }) if collection == Collection::Results => {}
        other => return Err(format!("expected IdExists for result, got {other:?}")),
    }

    s.insert_student(make_student("s1", "Abdullah", ClassName::Qaida))
        .await
        .map_err(|e| e.to_string())?;
    match s
        .insert_student(make_student("s1", "Bilal", ClassName::Qaida))
        .await
    {
        Err(StorageError::IdExists { collection, .. }) if collection == Collection::Students => {
            Ok(())
        }
        other => Err(format!("expected IdExists for student, got {other:?}")),
    }
}
