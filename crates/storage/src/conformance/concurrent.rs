use std::future::Future;
use std::sync::Arc;

use scholar_core::{ClassName, ResultFilter};

use super::{make_result, make_student, make_subject_result, TestResult};
use crate::{RecordStore, StorageError};

/// Number of concurrent tasks to spawn in each test.
const N: usize = 10;

pub(super) async fn run_concurrent_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "concurrent",
        "concurrent_duplicate_inserts_exactly_one_wins",
        concurrent_duplicate_inserts_exactly_one_wins(factory).await,
    ));
    results.push(TestResult::from_result(
        "concurrent",
        "concurrent_distinct_subjects_all_succeed",
        concurrent_distinct_subjects_all_succeed(factory).await,
    ));
    results.push(TestResult::from_result(
        "concurrent",
        "concurrent_student_inserts_all_visible",
        concurrent_student_inserts_all_visible(factory).await,
    ));

    results
}

// ── Concurrent duplicate inserts: exactly one wins ──────────────────────────

/// N tasks insert a result for the same student and exam under different
/// ids. Exactly one insert succeeds; the rest must get DuplicateResult.
async fn concurrent_duplicate_inserts_exactly_one_wins<S, F, Fut>(
    factory: &F,
) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);

    let mut handles = Vec::new();
    for i in 0..N {
        let s = store.clone();
        handles.push(tokio::spawn(async move {
            match s
                .insert_result(make_result(&format!("r{i}"), "s1", "Final"))
                .await
            {
                Ok(_) => Ok(true),
                Err(StorageError::DuplicateResult { .. }) => Ok(false),
                Err(e) => Err(e),
            }
        }));
    }

    let mut winners = 0usize;
    let mut losers = 0usize;
    for handle in handles {
        let won = handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e: StorageError| format!("storage error: {e}"))?;
        if won {
            winners += 1;
        } else {
            losers += 1;
        }
    }

    if winners != 1 {
        return Err(format!("expected exactly 1 winner, got {winners}"));
    }
    if losers != N - 1 {
        return Err(format!("expected {} losers, got {losers}", N - 1));
    }

    let stored = store
        .count_results(&ResultFilter::new())
        .await
        .map_err(|e| e.to_string())?;
    if stored != 1 {
        return Err(format!("expected 1 stored result, got {stored}"));
    }

    Ok(())
}

// ── Concurrent inserts without contention: all succeed ──────────────────────

/// N tasks insert results for the same student and exam but distinct
/// subjects. None of them collide.
async fn concurrent_distinct_subjects_all_succeed<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);

    let mut handles = Vec::new();
    for i in 0..N {
        let s = store.clone();
        handles.push(tokio::spawn(async move {
            s.insert_result(make_subject_result(
                &format!("r{i}"),
                "s1",
                "Final",
                &format!("subject-{i}"),
            ))
            .await
        }));
    }

    for handle in handles {
        handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e| format!("unexpected failure: {e}"))?;
    }

    let stored = store
        .count_results(&ResultFilter::new())
        .await
        .map_err(|e| e.to_string())?;
    if stored != N as u64 {
        return Err(format!("expected {N} stored results, got {stored}"));
    }

    Ok(())
}

// ── Concurrent student inserts: final state consistent ──────────────────────

async fn concurrent_student_inserts_all_visible<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let store = Arc::new(factory().await);

    let mut handles = Vec::new();
    for i in 0..N {
        let s = store.clone();
        handles.push(tokio::spawn(async move {
            s.insert_student(make_student(
                &format!("s{i}"),
                &format!("Student {i:02}"),
                ClassName::Qaida,
            ))
            .await
        }));
    }

    for handle in handles {
        handle
            .await
            .map_err(|e| format!("task panic: {e}"))?
            .map_err(|e| format!("insert failed: {e}"))?;
    }

    let ids: Vec<String> = (0..N).map(|i| format!("s{i}")).collect();
    let found = store.get_students(&ids).await.map_err(|e| e.to_string())?;
    if found.len() != N {
        return Err(format!("expected {N} students, got {}", found.len()));
    }

    Ok(())
}
