use std::future::Future;

use scholar_core::{
    ClassName, FindQuery, Grade, ResultFilter, ResultRecord, Sort, SortField, SortOrder,
};

use super::{ids, make_result, make_result_at, TestResult};
use crate::RecordStore;

pub(super) async fn run_query_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "query",
        "default_order_is_newest_first",
        default_order_is_newest_first(factory).await,
    ));
    results.push(TestResult::from_result(
        "query",
        "filters_combine_conjunctively",
        filters_combine_conjunctively(factory).await,
    ));
    results.push(TestResult::from_result(
        "query",
        "unknown_filter_value_matches_nothing",
        unknown_filter_value_matches_nothing(factory).await,
    ));
    results.push(TestResult::from_result(
        "query",
        "skip_and_limit_window_the_ordered_set",
        skip_and_limit_window_the_ordered_set(factory).await,
    ));
    results.push(TestResult::from_result(
        "query",
        "skip_past_end_is_empty",
        skip_past_end_is_empty(factory).await,
    ));
    results.push(TestResult::from_result(
        "query",
        "secondary_key_breaks_ties",
        secondary_key_breaks_ties(factory).await,
    ));
    results.push(TestResult::from_result(
        "query",
        "count_ignores_window",
        count_ignores_window(factory).await,
    ));

    results
}

async fn seed<S: RecordStore>(s: &S, records: Vec<ResultRecord>) -> Result<(), String> {
    for r in records {
        let id = r.id.clone();
        s.insert_result(r)
            .await
            .map_err(|e| format!("seed {id}: {e}"))?;
    }
    Ok(())
}

// ── 1. Default ordering ──────────────────────────────────────────────────────

async fn default_order_is_newest_first<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(
        &s,
        vec![
            make_result_at("r1", "s1", "Final", 0),
            make_result_at("r2", "s2", "Final", 20),
            make_result_at("r3", "s3", "Final", 10),
        ],
    )
    .await?;
    let found = s
        .find_results(&FindQuery::default())
        .await
        .map_err(|e| e.to_string())?;
    if ids(&found) != ["r2", "r3", "r1"] {
        return Err(format!("expected [r2, r3, r1], got {:?}", ids(&found)));
    }
    Ok(())
}

// ── 2. Every filter field must match ─────────────────────────────────────────

async fn filters_combine_conjunctively<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let mut hifz = make_result("r2", "s2", "Final");
    hifz.class_name = ClassName::HifzBeginner;
    let mut failed = make_result("r3", "s3", "Final");
    failed.grade = Grade::F;
    seed(
        &s,
        vec![
            make_result("r1", "s1", "Final"),
            hifz,
            failed,
            make_result("r4", "s1", "Midterm"),
        ],
    )
    .await?;

    let filter = ResultFilter::new()
        .class_name(Some("nazera".to_string()))
        .exam(Some("Final".to_string()))
        .grade(Some("A".to_string()));
    let found = s
        .find_results(&FindQuery::new(filter))
        .await
        .map_err(|e| e.to_string())?;
    if ids(&found) != ["r1"] {
        return Err(format!("expected [r1], got {:?}", ids(&found)));
    }

    let by_student = ResultFilter::new().student_id(Some("s1".to_string()));
    let count = s
        .count_results(&by_student)
        .await
        .map_err(|e| e.to_string())?;
    if count != 2 {
        return Err(format!("expected 2 results for s1, got {count}"));
    }
    Ok(())
}

// ── 3. Values outside the enumerations select nothing ────────────────────────

async fn unknown_filter_value_matches_nothing<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s, vec![make_result("r1", "s1", "Final")]).await?;
    let filter = ResultFilter::new().grade(Some("Z".to_string()));
    let count = s.count_results(&filter).await.map_err(|e| e.to_string())?;
    if count != 0 {
        return Err(format!("expected no match for grade Z, got {count}"));
    }
    Ok(())
}

// ── 4. Windowing applies after ordering ──────────────────────────────────────

async fn skip_and_limit_window_the_ordered_set<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let records = (0..5)
        .map(|i| make_result_at(&format!("r{i}"), &format!("s{i}"), "Final", i))
        .collect();
    seed(&s, records).await?;

    let query = FindQuery::default()
        .sort(Sort::by(SortField::CreatedAt, SortOrder::Asc))
        .window(2, Some(2));
    let found = s.find_results(&query).await.map_err(|e| e.to_string())?;
    if ids(&found) != ["r2", "r3"] {
        return Err(format!("expected [r2, r3], got {:?}", ids(&found)));
    }
    Ok(())
}

// ── 5. A window beyond the last match is empty ───────────────────────────────

async fn skip_past_end_is_empty<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s, vec![make_result("r1", "s1", "Final")]).await?;
    let found = s
        .find_results(&FindQuery::default().window(10, Some(10)))
        .await
        .map_err(|e| e.to_string())?;
    if !found.is_empty() {
        return Err(format!("expected empty page, got {:?}", ids(&found)));
    }
    Ok(())
}

// ── 6. Multi-key ordering ────────────────────────────────────────────────────

async fn secondary_key_breaks_ties<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    // Same exam date, different creation times.
    seed(
        &s,
        vec![
            make_result_at("r1", "s1", "Midterm", 0),
            make_result_at("r2", "s1", "Final", 30),
            make_result_at("r3", "s1", "Monthly", 15),
        ],
    )
    .await?;
    let query = FindQuery::new(ResultFilter::new().student_id(Some("s1".to_string()))).sort(
        Sort::by(SortField::ExamDate, SortOrder::Desc).then(SortField::CreatedAt, SortOrder::Desc),
    );
    let found = s.find_results(&query).await.map_err(|e| e.to_string())?;
    if ids(&found) != ["r2", "r3", "r1"] {
        return Err(format!("expected [r2, r3, r1], got {:?}", ids(&found)));
    }
    Ok(())
}

// ── 7. Count reflects the filter, not the window ─────────────────────────────

async fn count_ignores_window<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: RecordStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let records = (0..4)
        .map(|i| make_result(&format!("r{i}"), &format!("s{i}"), "Final"))
        .collect();
    seed(&s, records).await?;
    let page = s
        .find_results(&FindQuery::default().window(0, Some(3)))
        .await
        .map_err(|e| e.to_string())?;
    let total = s
        .count_results(&ResultFilter::new())
        .await
        .map_err(|e| e.to_string())?;
    if page.len() != 3 || total != 4 {
        return Err(format!("expected page 3 of 4, got {} of {total}", page.len()));
    }
    Ok(())
}
