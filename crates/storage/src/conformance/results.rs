use std::future::Future;

use scholar_core::{FindQuery, Grade, ResultFilter};

use super::{make_result, TestResult};
use crate::RecordStore;

pub(super) async fn run_result_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "results",
        "insert_then_get_returns_same_document",
        insert_then_get_returns_same_document(factory).await,
    ));
    results.push(TestResult::from_result(
        "results",
        "replace_overwrites_fields",
        replace_overwrites_fields(factory).await,
    ));
    results.push(TestResult::from_result(
        "results",
        "delete_removes_document",
        delete_removes_document(factory).await,
    ));
    results.push(TestResult::from_result(
        "results",
        "delete_leaves_other_documents",
        delete_leaves_other_documents(factory).await,
    ));

    results
}

// ── 1. Insert then get round-trips the document ─────────────────────────────

async fn insert_then_get_returns_same_document<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let record = make_result("r1", "s1", "Midterm");
    let stored = s
        .insert_result(record.clone())
        .await
        .map_err(|e| format!("insert: {e}"))?;
    if stored != record {
        return Err(format!("insert returned {stored:?}, expected {record:?}"));
    }
    let fetched = s.get_result("r1").await.map_err(|e| format!("get: {e}"))?;
    if fetched != record {
        return Err(format!("get returned {fetched:?}, expected {record:?}"));
    }
    Ok(())
}

// ── 2. Replace overwrites the stored document ────────────────────────────────

async fn replace_overwrites_fields<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut record = make_result("r1", "s1", "Midterm");
    s.insert_result(record.clone())
        .await
        .map_err(|e| format!("insert: {e}"))?;

    record.grade = Grade::F;
    record.marks = None;
    record.remarks = Some("absent".to_string());
    s.replace_result(record.clone())
        .await
        .map_err(|e| format!("replace: {e}"))?;

    let fetched = s.get_result("r1").await.map_err(|e| format!("get: {e}"))?;
    if fetched.grade != Grade::F || fetched.marks.is_some() {
        return Err(format!("replace not applied: {fetched:?}"));
    }
    if fetched.remarks.as_deref() != Some("absent") {
        return Err(format!("expected remarks \"absent\", got {:?}", fetched.remarks));
    }
    Ok(())
}

// ── 3. Delete removes the document ───────────────────────────────────────────

async fn delete_removes_document<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_result(make_result("r1", "s1", "Midterm"))
        .await
        .map_err(|e| format!("insert: {e}"))?;
    s.delete_result("r1")
        .await
        .map_err(|e| format!("delete: {e}"))?;
    if s.get_result("r1").await.is_ok() {
        return Err("result still readable after delete".to_string());
    }
    let count = s
        .count_results(&ResultFilter::new())
        .await
        .map_err(|e| e.to_string())?;
    if count != 0 {
        return Err(format!("expected 0 results after delete, got {count}"));
    }
    Ok(())
}

// ── 4. Delete touches only the named document ────────────────────────────────

async fn delete_leaves_other_documents<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for (id, student) in [("r1", "s1"), ("r2", "s2"), ("r3", "s3")] {
        s.insert_result(make_result(id, student, "Final"))
            .await
            .map_err(|e| format!("insert {id}: {e}"))?;
    }
    s.delete_result("r2")
        .await
        .map_err(|e| format!("delete: {e}"))?;
    let remaining = s
        .find_results(&FindQuery::default())
        .await
        .map_err(|e| e.to_string())?;
    let mut got: Vec<&str> = remaining.iter().map(|r| r.id.as_str()).collect();
    got.sort_unstable();
    if got != ["r1", "r3"] {
        return Err(format!("expected [r1, r3] to remain, got {got:?}"));
    }
    Ok(())
}
