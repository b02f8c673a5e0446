use std::future::Future;

use scholar_core::{ClassName, ResultFilter, StudentFilter};

use super::{make_result, make_student, TestResult};
use crate::RecordStore;

pub(super) async fn run_student_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "students",
        "insert_then_get_student",
        insert_then_get_student(factory).await,
    ));
    results.push(TestResult::from_result(
        "students",
        "find_orders_by_full_name",
        find_orders_by_full_name(factory).await,
    ));
    results.push(TestResult::from_result(
        "students",
        "find_filters_by_class",
        find_filters_by_class(factory).await,
    ));
    results.push(TestResult::from_result(
        "students",
        "batch_lookup_skips_unknown_ids",
        batch_lookup_skips_unknown_ids(factory).await,
    ));
    results.push(TestResult::from_result(
        "students",
        "replace_student_overwrites",
        replace_student_overwrites(factory).await,
    ));
    results.push(TestResult::from_result(
        "students",
        "delete_student_keeps_results",
        delete_student_keeps_results(factory).await,
    ));

    results
}

// ── 1. Round-trip ────────────────────────────────────────────────────────────

async fn insert_then_get_student<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let student = make_student("s1", "Hasan Mahmud", ClassName::MadaniFirst);
    s.insert_student(student.clone())
        .await
        .map_err(|e| format!("insert: {e}"))?;
    let fetched = s.get_student("s1").await.map_err(|e| format!("get: {e}"))?;
    if fetched != student {
        return Err(format!("get returned {fetched:?}, expected {student:?}"));
    }
    Ok(())
}

// ── 2. Listing order ─────────────────────────────────────────────────────────

async fn find_orders_by_full_name<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for (id, name) in [("s1", "Zubair"), ("s2", "Abdullah"), ("s3", "Maryam")] {
        s.insert_student(make_student(id, name, ClassName::Qaida))
            .await
            .map_err(|e| format!("insert {id}: {e}"))?;
    }
    let found = s
        .find_students(&StudentFilter::default())
        .await
        .map_err(|e| e.to_string())?;
    let names: Vec<&str> = found.iter().map(|st| st.full_name.as_str()).collect();
    if names != ["Abdullah", "Maryam", "Zubair"] {
        return Err(format!("expected name order, got {names:?}"));
    }
    Ok(())
}

// ── 3. Class filter ──────────────────────────────────────────────────────────

async fn find_filters_by_class<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_student(make_student("s1", "Abdullah", ClassName::Qaida))
        .await
        .map_err(|e| e.to_string())?;
    s.insert_student(make_student("s2", "Bilal", ClassName::HifzAdvanced))
        .await
        .map_err(|e| e.to_string())?;
    let filter = StudentFilter {
        class_name: Some("hifz-advanced".to_string()),
    };
    let found = s.find_students(&filter).await.map_err(|e| e.to_string())?;
    if found.len() != 1 || found[0].id != "s2" {
        return Err(format!("expected only s2, got {found:?}"));
    }
    Ok(())
}

// ── 4. Batch lookup ──────────────────────────────────────────────────────────

async fn batch_lookup_skips_unknown_ids<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_student(make_student("s1", "Abdullah", ClassName::Qaida))
        .await
        .map_err(|e| e.to_string())?;
    s.insert_student(make_student("s2", "Bilal", ClassName::Qaida))
        .await
        .map_err(|e| e.to_string())?;
    let wanted = vec!["s2".to_string(), "missing".to_string()];
    let found = s.get_students(&wanted).await.map_err(|e| e.to_string())?;
    if found.len() != 1 || !found.contains_key("s2") {
        return Err(format!("expected only s2, got keys {:?}", found.keys()));
    }
    Ok(())
}

// ── 5. Replace ───────────────────────────────────────────────────────────────

async fn replace_student_overwrites<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut student = make_student("s1", "Abdullah", ClassName::Qaida);
    s.insert_student(student.clone())
        .await
        .map_err(|e| e.to_string())?;
    student.class_name = ClassName::Nazera;
    student.phone = Some("01800000000".to_string());
    s.replace_student(student)
        .await
        .map_err(|e| format!("replace: {e}"))?;
    let fetched = s.get_student("s1").await.map_err(|e| e.to_string())?;
    if fetched.class_name != ClassName::Nazera || fetched.phone.is_none() {
        return Err(format!("replace not applied: {fetched:?}"));
    }
    Ok(())
}

// ── 6. Deleting a student does not cascade ───────────────────────────────────

async fn delete_student_keeps_results<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert_student(make_student("s1", "Abdullah", ClassName::Nazera))
        .await
        .map_err(|e| e.to_string())?;
    s.insert_result(make_result("r1", "s1", "Final"))
        .await
        .map_err(|e| e.to_string())?;
    s.delete_student("s1")
        .await
        .map_err(|e| format!("delete: {e}"))?;
    if s.get_student("s1").await.is_ok() {
        return Err("student still readable after delete".to_string());
    }
    let count = s
        .count_results(&ResultFilter::new().student_id(Some("s1".to_string())))
        .await
        .map_err(|e| e.to_string())?;
    if count != 1 {
        return Err(format!("expected result to survive, count {count}"));
    }
    Ok(())
}
