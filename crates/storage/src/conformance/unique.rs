use std::future::Future;

use scholar_core::ResultFilter;

use super::{make_result, make_subject_result, TestResult};
use crate::{RecordStore, StorageError};

pub(super) async fn run_unique_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "unique",
        "same_student_and_exam_rejected",
        same_student_and_exam_rejected(factory).await,
    ));
    results.push(TestResult::from_result(
        "unique",
        "duplicate_error_carries_key",
        duplicate_error_carries_key(factory).await,
    ));
    results.push(TestResult::from_result(
        "unique",
        "different_subjects_coexist",
        different_subjects_coexist(factory).await,
    ));
    results.push(TestResult::from_result(
        "unique",
        "same_subject_rejected",
        same_subject_rejected(factory).await,
    ));
    results.push(TestResult::from_result(
        "unique",
        "subjectless_insert_blocked_by_subject_result",
        subjectless_insert_blocked_by_subject_result(factory).await,
    ));
    results.push(TestResult::from_result(
        "unique",
        "other_student_or_exam_not_blocked",
        other_student_or_exam_not_blocked(factory).await,
    ));
    results.push(TestResult::from_result(
        "unique",
        "replace_skips_duplicate_check",
        replace_skips_duplicate_check(factory).await,
    ));

    results
}

async fn expect_duplicate<S: RecordStore>(
    s: &S,
    record: scholar_core::ResultRecord,
) -> Result<(), String> {
    match s.insert_result(record).await {
        Err(StorageError::DuplicateResult { .. }) => Ok(()),
        other => Err(format!("expected DuplicateResult, got {other:?}")),
    }
}

// ── 1. Same student and exam without subject collides ────────────────────────

async fn same_student_and_exam_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_result(make_result("r1", "s1", "Midterm"))
        .await
        .map_err(|e| format!("first insert: {e}"))?;
    expect_duplicate(&s, make_result("r2", "s1", "Midterm")).await?;

    let count = s
        .count_results(&ResultFilter::new())
        .await
        .map_err(|e| e.to_string())?;
    if count != 1 {
        return Err(format!("rejected insert was stored: count {count}"));
    }
    Ok(())
}

// ── 2. DuplicateResult names the colliding key ───────────────────────────────

async fn duplicate_error_carries_key<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_result(make_subject_result("r1", "s7", "Final", "Tajweed"))
        .await
        .map_err(|e| format!("first insert: {e}"))?;
    match s
        .insert_result(make_subject_result("r2", "s7", "Final", "Tajweed"))
        .await
    {
        Err(StorageError::DuplicateResult {
            student_id,
            exam,
            subject,
        }) => {
            if student_id != "s7" || exam != "Final" || subject.as_deref() != Some("Tajweed") {
                return Err(format!(
                    "wrong key in error: ({student_id}, {exam}, {subject:?})"
                ));
            }
            Ok(())
        }
        other => Err(format!("expected DuplicateResult, got {other:?}")),
    }
}

// ── 3. Distinct subjects for the same exam are allowed ───────────────────────

async fn different_subjects_coexist<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_result(make_subject_result("r1", "s1", "Final", "Hifz"))
        .await
        .map_err(|e| format!("insert Hifz: {e}"))?;
    s.insert_result(make_subject_result("r2", "s1", "Final", "Tajweed"))
        .await
        .map_err(|e| format!("insert Tajweed: {e}"))?;
    Ok(())
}

// ── 4. Same subject collides ─────────────────────────────────────────────────

async fn same_subject_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_result(make_subject_result("r1", "s1", "Final", "Hifz"))
        .await
        .map_err(|e| format!("first insert: {e}"))?;
    expect_duplicate(&s, make_subject_result("r2", "s1", "Final", "Hifz")).await
}

// ── 5. A subjectless insert collides with any result for that exam ───────────

async fn subjectless_insert_blocked_by_subject_result<S, F, Fut>(
    factory: &F,
) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_result(make_subject_result("r1", "s1", "Final", "Hifz"))
        .await
        .map_err(|e| format!("first insert: {e}"))?;
    expect_duplicate(&s, make_result("r2", "s1", "Final")).await
}

// ── 6. Other students and exams are independent ──────────────────────────────

async fn other_student_or_exam_not_blocked<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_result(make_result("r1", "s1", "Final"))
        .await
        .map_err(|e| format!("insert r1: {e}"))?;
    s.insert_result(make_result("r2", "s2", "Final"))
        .await
        .map_err(|e| format!("other student: {e}"))?;
    s.insert_result(make_result("r3", "s1", "Midterm"))
        .await
        .map_err(|e| format!("other exam: {e}"))?;
    Ok(())
}

// ── 7. Replace may move a result onto a taken key ────────────────────────────

async fn replace_skips_duplicate_check<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_result(make_result("r1", "s1", "Final"))
        .await
        .map_err(|e| format!("insert r1: {e}"))?;
    let mut second = make_result("r2", "s1", "Midterm");
    s.insert_result(second.clone())
        .await
        .map_err(|e| format!("insert r2: {e}"))?;

    second.exam = "Final".to_string();
    s.replace_result(second)
        .await
        .map_err(|e| format!("replace onto taken key: {e}"))?;
    Ok(())
}
