//! Read-side operations: listing, lookups and statistics.

use std::sync::Arc;

use scholar_core::{
    FindQuery, PageRequest, Pagination, ResultFilter, ResultRecord, ResultView, Sort, SortField,
    SortOrder, Statistics, Student, StudentFilter, StudentProjection, StudentRef,
};
use scholar_storage::{RecordStore, StorageError};
use serde::Deserialize;

use crate::error::ServiceError;

const DEFAULT_RECENT: usize = 10;

/// The optionally signed integer at the start of `raw`, after leading
/// whitespace.
fn leading_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (negative, rest) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let n = rest[..end].parse::<i64>().ok()?;
    Some(if negative { -n } else { n })
}

/// A result whose `studentId` is expanded. `None` is a dangling reference.
pub type ExpandedResult = ResultView<Option<StudentRef>>;

/// Raw list parameters as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub class_name: Option<String>,
    pub exam: Option<String>,
    pub student_id: Option<String>,
    pub grade: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResultPage {
    pub results: Vec<ExpandedResult>,
    pub pagination: Pagination,
}

#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn RecordStore>,
    max_page_limit: Option<u64>,
}

impl QueryService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        QueryService {
            store,
            max_page_limit: None,
        }
    }

    /// Cap the page size of `list_results`.
    pub fn with_max_page_limit(mut self, max: Option<u64>) -> Self {
        self.max_page_limit = max;
        self
    }

    pub async fn list_results(&self, params: ListParams) -> Result<ResultPage, ServiceError> {
        let page = PageRequest::parse(params.page.as_deref(), params.limit.as_deref())?
            .clamp(self.max_page_limit);
        let sort = Sort::parse(params.sort_by.as_deref(), params.sort_order.as_deref())?;
        let filter = ResultFilter::new()
            .class_name(params.class_name)
            .exam(params.exam)
            .student_id(params.student_id)
            .grade(params.grade);

        let total = self.store.count_results(&filter).await?;
        let query = FindQuery::new(filter)
            .sort(sort)
            .window(page.skip(), Some(page.limit()));
        let records = self.store.find_results(&query).await?;
        tracing::debug!(
            page = page.page,
            limit = page.limit,
            total,
            returned = records.len(),
            "listed results"
        );

        Ok(ResultPage {
            results: self.expand(records, StudentProjection::Contact).await?,
            pagination: Pagination::new(&page, total),
        })
    }

    pub async fn get_result(&self, id: &str) -> Result<ExpandedResult, ServiceError> {
        let record = self.store.get_result(id).await?;
        let student = match self.store.get_student(&record.student_id).await {
            Ok(student) => Some(StudentProjection::Full.project(&student)),
            Err(StorageError::NotFound { .. }) => None,
            Err(e) => return Err(e.into()),
        };
        Ok(record.with_student(student).into())
    }

    /// Every result for one student, latest exam first.
    pub async fn results_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<ResultView>, ServiceError> {
        let query = FindQuery::new(ResultFilter::new().student_id(Some(student_id.to_string())))
            .sort(
                Sort::by(SortField::ExamDate, SortOrder::Desc)
                    .then(SortField::CreatedAt, SortOrder::Desc),
            );
        let records = self.store.find_results(&query).await?;
        Ok(records.into_iter().map(ResultView::from).collect())
    }

    /// Every result for one class, optionally narrowed to one exam, in
    /// student-name order.
    pub async fn results_for_class(
        &self,
        class_name: &str,
        exam: Option<String>,
    ) -> Result<Vec<ExpandedResult>, ServiceError> {
        let filter = ResultFilter::new()
            .class_name(Some(class_name.to_string()))
            .exam(exam);
        let query = FindQuery::new(filter).sort(Sort::by(SortField::StudentName, SortOrder::Asc));
        let records = self.store.find_results(&query).await?;
        self.expand(records, StudentProjection::Name).await
    }

    /// The most recently created results. `raw_limit` is read up to its
    /// first non-digit (`"5abc"` is 5); absent, non-numeric or non-positive
    /// means 10.
    pub async fn recent_results(
        &self,
        raw_limit: Option<&str>,
    ) -> Result<Vec<ExpandedResult>, ServiceError> {
        let limit = raw_limit
            .and_then(leading_integer)
            .filter(|n| *n > 0)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(DEFAULT_RECENT);
        let query = FindQuery::default()
            .sort(Sort::by(SortField::CreatedAt, SortOrder::Desc))
            .window(0, Some(limit));
        let records = self.store.find_results(&query).await?;
        self.expand(records, StudentProjection::NameAndClass).await
    }

    pub async fn statistics(
        &self,
        class_name: Option<String>,
        exam: Option<String>,
    ) -> Result<Statistics, ServiceError> {
        let filter = ResultFilter::new().class_name(class_name).exam(exam);
        let records = self.store.find_results(&FindQuery::new(filter)).await?;
        Ok(Statistics::compute(&records))
    }

    pub async fn get_student(&self, id: &str) -> Result<Student, ServiceError> {
        Ok(self.store.get_student(id).await?)
    }

    /// Students in name order, optionally from one class.
    pub async fn list_students(
        &self,
        class_name: Option<String>,
    ) -> Result<Vec<Student>, ServiceError> {
        let filter = StudentFilter {
            class_name: class_name.filter(|c| !c.is_empty()),
        };
        Ok(self.store.find_students(&filter).await?)
    }

    async fn expand(
        &self,
        records: Vec<ResultRecord>,
        projection: StudentProjection,
    ) -> Result<Vec<ExpandedResult>, ServiceError> {
        let mut ids: Vec<String> = records.iter().map(|r| r.student_id.clone()).collect();
        ids.sort_unstable();
        ids.dedup();
        let students = self.store.get_students(&ids).await?;

        Ok(records
            .into_iter()
            .map(|r| {
                let student = students.get(&r.student_id).map(|s| projection.project(s));
                ResultView::from(r.with_student(student))
            })
            .collect())
    }
}
