use std::sync::Arc;

use scholar_core::{
    Grade, MarksInput, NewResult, NewStudent, ResultPatch, Student, StudentPatch,
};
use scholar_service::{ListParams, Locale, MutationService, QueryService, ServiceError};
use scholar_storage::{Collection, MemoryStore, RecordStore};

fn services() -> (QueryService, MutationService) {
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    (QueryService::new(store.clone()), MutationService::new(store))
}

async fn student(m: &MutationService, name: &str, class: &str) -> Student {
    m.create_student(NewStudent {
        full_name: Some(name.into()),
        class_name: Some(class.into()),
        phone: Some("01711111111".into()),
        ..Default::default()
    })
    .await
    .unwrap()
}

fn result(student_id: &str, exam: &str, grade: &str) -> NewResult {
    NewResult {
        student_id: Some(student_id.into()),
        exam: Some(exam.into()),
        grade: Some(grade.into()),
        ..Default::default()
    }
}

// ──────────────────────────────────────────────
// Create
// ──────────────────────────────────────────────

#[tokio::test]
async fn create_snapshots_student_and_survives_student_edit() {
    let (q, m) = services();
    let s = student(&m, "Abdullah Rahman", "nazera").await;
    let created = m
        .create_result(NewResult {
            marks: Some(MarksInput::Number(88.0)),
            ..result(&s.id, "Final", "A+")
        })
        .await
        .unwrap();
    assert_eq!(created.record.student_name, "Abdullah Rahman");
    assert_eq!(created.record.class_name.label(), "nazera");
    assert!(created.is_passed);
    assert!(created.record.exam_date.is_some());

    m.update_student(
        &s.id,
        StudentPatch {
            full_name: Some("Abdullah Al Rahman".into()),
            class_name: Some("hifz-beginner".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let fetched = q.get_result(&created.record.id).await.unwrap();
    assert_eq!(fetched.record.student_name, "Abdullah Rahman");
    assert_eq!(fetched.record.class_name.label(), "nazera");
    let expanded = fetched.record.student_id.unwrap();
    assert_eq!(expanded.full_name.as_deref(), Some("Abdullah Al Rahman"));
}

#[tokio::test]
async fn create_requires_student_exam_and_grade() {
    let (_, m) = services();
    let err = m
        .create_result(NewResult {
            exam: Some("Final".into()),
            grade: Some("A".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(err.localized(Locale::Bn), "শিক্ষার্থী, পরীক্ষা এবং গ্রেড প্রয়োজন");
}

#[tokio::test]
async fn create_for_unknown_student_is_not_found() {
    let (_, m) = services();
    let err = m.create_result(result("nobody", "Final", "A")).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            collection: Collection::Students,
            ..
        }
    ));
    assert_eq!(err.localized(Locale::Bn), "শিক্ষার্থী পাওয়া যায়নি");
}

#[tokio::test]
async fn create_rejects_bad_grade_and_marks() {
    let (_, m) = services();
    let s = student(&m, "Bilal", "qaida").await;
    let bad_grade = m.create_result(result(&s.id, "Final", "E")).await;
    assert!(matches!(bad_grade, Err(ServiceError::Validation(_))));
    let bad_marks = m
        .create_result(NewResult {
            marks: Some(MarksInput::Number(101.0)),
            ..result(&s.id, "Final", "A")
        })
        .await;
    assert!(matches!(bad_marks, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn duplicate_exam_without_subject_conflicts() {
    let (_, m) = services();
    let s = student(&m, "Bilal", "qaida").await;
    m.create_result(result(&s.id, "Midterm", "B")).await.unwrap();
    let err = m
        .create_result(result(&s.id, "Midterm", "A"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn distinct_subjects_for_same_exam_both_succeed() {
    let (q, m) = services();
    let s = student(&m, "Bilal", "qaida").await;
    for subject in ["Hifz", "Tajweed"] {
        m.create_result(NewResult {
            subject: Some(subject.into()),
            ..result(&s.id, "Final", "A")
        })
        .await
        .unwrap();
    }
    assert_eq!(q.results_for_student(&s.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn concurrent_duplicate_creates_yield_one_success() {
    let (_, m) = services();
    let s = student(&m, "Bilal", "qaida").await;
    let mut handles = Vec::new();
    for _ in 0..8 {
        let m = m.clone();
        let id = s.id.clone();
        handles.push(tokio::spawn(async move {
            m.create_result(result(&id, "Final", "A")).await
        }));
    }
    let mut ok = 0;
    for h in handles {
        match h.await.unwrap() {
            Ok(_) => ok += 1,
            Err(ServiceError::Conflict(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(ok, 1);
}

// ──────────────────────────────────────────────
// Update / delete
// ──────────────────────────────────────────────

#[tokio::test]
async fn update_merges_fields_and_bumps_updated_at() {
    let (_, m) = services();
    let s = student(&m, "Bilal", "qaida").await;
    let created = m.create_result(result(&s.id, "Final", "A")).await.unwrap();
    let updated = m
        .update_result(
            &created.record.id,
            ResultPatch {
                grade: Some("F".into()),
                remarks: Some("retake".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.record.grade, Grade::F);
    assert!(!updated.is_passed);
    assert_eq!(updated.record.remarks.as_deref(), Some("retake"));
    assert_eq!(updated.record.exam, "Final");
    assert!(updated.record.updated_at >= created.record.updated_at);
}

#[tokio::test]
async fn update_with_null_clears_marks_and_exam_date() {
    let (q, m) = services();
    let s = student(&m, "Bilal", "qaida").await;
    let created = m
        .create_result(NewResult {
            marks: Some(MarksInput::Number(50.0)),
            exam_date: Some("2024-05-01".into()),
            ..result(&s.id, "Final", "A")
        })
        .await
        .unwrap();

    let patch: ResultPatch = serde_json::from_value(serde_json::json!({
        "marks": null,
        "examDate": null,
    }))
    .unwrap();
    m.update_result(&created.record.id, patch).await.unwrap();

    let fetched = q.get_result(&created.record.id).await.unwrap();
    assert_eq!(fetched.record.marks, None);
    assert_eq!(fetched.record.exam_date, None);
    assert_eq!(fetched.record.grade, Grade::A);
}

#[tokio::test]
async fn update_rejects_invalid_grade_without_writing() {
    let (q, m) = services();
    let s = student(&m, "Bilal", "qaida").await;
    let created = m.create_result(result(&s.id, "Final", "A")).await.unwrap();
    let err = m
        .update_result(
            &created.record.id,
            ResultPatch {
                grade: Some("Z".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    let fetched = q.get_result(&created.record.id).await.unwrap();
    assert_eq!(fetched.record.grade, Grade::A);
}

#[tokio::test]
async fn update_missing_result_is_not_found() {
    let (_, m) = services();
    let err = m
        .update_result("missing", ResultPatch::default())
        .await
        .unwrap_err();
    assert_eq!(err.localized(Locale::Bn), "ফলাফল পাওয়া যায়নি");
}

#[tokio::test]
async fn delete_twice_is_success_then_not_found() {
    let (_, m) = services();
    let s = student(&m, "Bilal", "qaida").await;
    let created = m.create_result(result(&s.id, "Final", "A")).await.unwrap();
    m.delete_result(&created.record.id).await.unwrap();
    let err = m.delete_result(&created.record.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

// ──────────────────────────────────────────────
// Queries
// ──────────────────────────────────────────────

#[tokio::test]
async fn twenty_five_results_paginate_into_three_pages() {
    let (q, m) = services();
    let s = student(&m, "Bilal", "qaida").await;
    for i in 0..25 {
        m.create_result(result(&s.id, &format!("Weekly {i:02}"), "B"))
            .await
            .unwrap();
    }
    let page = q
        .list_results(ListParams {
            page: Some("3".into()),
            limit: Some("10".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.pagination.total_results, 25);
    assert_eq!(page.pagination.current_page, 3);
    assert_eq!(page.results.len(), 5);

    let past_end = q
        .list_results(ListParams {
            page: Some("9".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(past_end.results.is_empty());
}

#[tokio::test]
async fn list_expands_contact_projection() {
    let (q, m) = services();
    let s = student(&m, "Bilal", "qaida").await;
    m.create_result(result(&s.id, "Final", "A")).await.unwrap();
    let page = q.list_results(ListParams::default()).await.unwrap();
    let expanded = page.results[0].record.student_id.clone().unwrap();
    assert_eq!(expanded.phone.as_deref(), Some("01711111111"));
    assert!(expanded.father_name.is_none());
}

#[tokio::test]
async fn list_validates_paging_and_sort() {
    let (q, _) = services();
    for params in [
        ListParams {
            page: Some("0".into()),
            ..Default::default()
        },
        ListParams {
            limit: Some("abc".into()),
            ..Default::default()
        },
        ListParams {
            sort_by: Some("password".into()),
            ..Default::default()
        },
        ListParams {
            sort_order: Some("up".into()),
            ..Default::default()
        },
    ] {
        let err = q.list_results(params).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)), "got {err:?}");
    }
}

#[tokio::test]
async fn max_page_limit_clamps_results_per_page() {
    let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
    let q = QueryService::new(store.clone()).with_max_page_limit(Some(3));
    let m = MutationService::new(store);
    let s = student(&m, "Bilal", "qaida").await;
    for i in 0..5 {
        m.create_result(result(&s.id, &format!("Quiz {i}"), "A"))
            .await
            .unwrap();
    }
    let page = q
        .list_results(ListParams {
            limit: Some("100".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.results.len(), 3);
    assert_eq!(page.pagination.results_per_page, 3);
    assert_eq!(page.pagination.total_pages, 2);
}

#[tokio::test]
async fn class_listing_filters_exam_and_orders_by_name() {
    let (q, m) = services();
    let zaid = student(&m, "Zaid", "nazera").await;
    let amina = student(&m, "Amina", "nazera").await;
    let other = student(&m, "Karim", "qaida").await;
    m.create_result(result(&zaid.id, "Final", "B")).await.unwrap();
    m.create_result(result(&amina.id, "Final", "A")).await.unwrap();
    m.create_result(result(&amina.id, "Midterm", "A")).await.unwrap();
    m.create_result(result(&other.id, "Final", "A")).await.unwrap();

    let rows = q
        .results_for_class("nazera", Some("Final".into()))
        .await
        .unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.record.student_name.as_str()).collect();
    assert_eq!(names, ["Amina", "Zaid"]);
    assert!(rows.iter().all(|r| r.record.exam == "Final"));
    let expanded = rows[0].record.student_id.clone().unwrap();
    assert!(expanded.class_name.is_none());
}

#[tokio::test]
async fn student_history_orders_latest_exam_first() {
    let (q, m) = services();
    let s = student(&m, "Bilal", "qaida").await;
    for (exam, date) in [("First", "2024-01-10"), ("Third", "2024-06-10"), ("Second", "2024-03-10")] {
        m.create_result(NewResult {
            exam_date: Some(date.into()),
            ..result(&s.id, exam, "A")
        })
        .await
        .unwrap();
    }
    let rows = q.results_for_student(&s.id).await.unwrap();
    let exams: Vec<&str> = rows.iter().map(|r| r.record.exam.as_str()).collect();
    assert_eq!(exams, ["Third", "Second", "First"]);
}

#[tokio::test]
async fn recent_falls_back_to_ten() {
    let (q, m) = services();
    let s = student(&m, "Bilal", "qaida").await;
    for i in 0..12 {
        m.create_result(result(&s.id, &format!("Quiz {i}"), "A"))
            .await
            .unwrap();
    }
    for raw in [None, Some("abc"), Some("0"), Some("-4")] {
        assert_eq!(q.recent_results(raw).await.unwrap().len(), 10, "raw {raw:?}");
    }
    assert_eq!(q.recent_results(Some("3")).await.unwrap().len(), 3);
    assert_eq!(q.recent_results(Some("5abc")).await.unwrap().len(), 5);
    assert_eq!(q.recent_results(Some("3.7")).await.unwrap().len(), 3);
    assert_eq!(q.recent_results(Some(" 4")).await.unwrap().len(), 4);
}

#[tokio::test]
async fn deleted_student_renders_as_null_reference() {
    let (q, m) = services();
    let s = student(&m, "Bilal", "qaida").await;
    let created = m.create_result(result(&s.id, "Final", "A")).await.unwrap();
    m.delete_student(&s.id).await.unwrap();

    let fetched = q.get_result(&created.record.id).await.unwrap();
    assert!(fetched.record.student_id.is_none());
    assert_eq!(fetched.record.student_name, "Bilal");
    let json = serde_json::to_value(&fetched).unwrap();
    assert!(json["studentId"].is_null());
}

// ──────────────────────────────────────────────
// Statistics
// ──────────────────────────────────────────────

#[tokio::test]
async fn statistics_of_empty_store() {
    let (q, _) = services();
    let stats = q.statistics(None, None).await.unwrap();
    assert_eq!(stats.total_results, 0);
    assert_eq!(stats.pass_percentage, 0.0);
}

#[tokio::test]
async fn statistics_two_of_three_pass() {
    let (q, m) = services();
    let s = student(&m, "Bilal", "qaida").await;
    let t = student(&m, "Zaid", "nazera").await;
    m.create_result(result(&s.id, "Final", "A")).await.unwrap();
    m.create_result(result(&s.id, "Midterm", "D")).await.unwrap();
    m.create_result(result(&t.id, "Final", "C+")).await.unwrap();

    let stats = q.statistics(None, None).await.unwrap();
    assert_eq!(stats.total_results, 3);
    assert_eq!(stats.passed, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.pass_percentage, 66.67);
    let sum: u64 = stats.grade_distribution.iter().map(|g| g.count).sum();
    assert_eq!(sum, 3);
    assert_eq!(stats.classwise_stats.len(), 2);

    let finals = q.statistics(None, Some("Final".into())).await.unwrap();
    assert_eq!(finals.total_results, 2);
    let qaida = q.statistics(Some("qaida".into()), None).await.unwrap();
    assert_eq!(qaida.total_results, 2);
}

// ──────────────────────────────────────────────
// Students
// ──────────────────────────────────────────────

#[tokio::test]
async fn students_list_by_class_in_name_order() {
    let (q, m) = services();
    student(&m, "Zaid", "nazera").await;
    student(&m, "Amina", "nazera").await;
    student(&m, "Karim", "qaida").await;
    let all = q.list_students(None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].full_name, "Amina");
    let nazera = q.list_students(Some("nazera".into())).await.unwrap();
    let names: Vec<&str> = nazera.iter().map(|s| s.full_name.as_str()).collect();
    assert_eq!(names, ["Amina", "Zaid"]);
}

#[tokio::test]
async fn import_reports_invalid_rows() {
    let (q, m) = services();
    let rows = vec![
        NewStudent {
            full_name: Some("Amina".into()),
            class_name: Some("qaida".into()),
            ..Default::default()
        },
        NewStudent {
            full_name: Some("Nobody".into()),
            class_name: Some("grade-nine".into()),
            ..Default::default()
        },
        NewStudent {
            class_name: Some("qaida".into()),
            ..Default::default()
        },
    ];
    let report = m.import_students(rows).await.unwrap();
    assert_eq!(report.created.len(), 1);
    let failed_rows: Vec<usize> = report.failures.iter().map(|f| f.row).collect();
    assert_eq!(failed_rows, [2, 3]);
    assert_eq!(q.list_students(None).await.unwrap().len(), 1);
}
