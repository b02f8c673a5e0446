//! Filtering, ordering and pagination of result documents.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::record::{ResultRecord, Student};

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_LIMIT: u64 = 10;

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Equality predicate over result fields. `None` imposes no constraint.
///
/// Values compare against the stored labels, so an unknown grade or class
/// simply matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultFilter {
    pub class_name: Option<String>,
    pub exam: Option<String>,
    pub student_id: Option<String>,
    pub grade: Option<String>,
}

impl ResultFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_name(mut self, value: Option<String>) -> Self {
        self.class_name = present(value);
        self
    }

    pub fn exam(mut self, value: Option<String>) -> Self {
        self.exam = present(value);
        self
    }

    pub fn student_id(mut self, value: Option<String>) -> Self {
        self.student_id = present(value);
        self
    }

    pub fn grade(mut self, value: Option<String>) -> Self {
        self.grade = present(value);
        self
    }

    pub fn matches<S>(&self, record: &ResultRecord<S>) -> bool
    where
        S: AsRef<str>,
    {
        fn eq(want: &Option<String>, have: &str) -> bool {
            want.as_deref().map_or(true, |w| w == have)
        }
        eq(&self.class_name, record.class_name.label())
            && eq(&self.exam, &record.exam)
            && eq(&self.student_id, record.student_id.as_ref())
            && eq(&self.grade, record.grade.label())
    }
}

/// Equality predicate over students.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub class_name: Option<String>,
}

impl StudentFilter {
    pub fn matches(&self, student: &Student) -> bool {
        self.class_name
            .as_deref()
            .map_or(true, |c| c == student.class_name.label())
    }
}

/// Sortable result fields, named as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    ExamDate,
    StudentName,
    ClassName,
    Exam,
    Grade,
    Marks,
    Subject,
}

impl FromStr for SortField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "createdAt" => SortField::CreatedAt,
            "updatedAt" => SortField::UpdatedAt,
            "examDate" => SortField::ExamDate,
            "studentName" => SortField::StudentName,
            "className" => SortField::ClassName,
            "exam" => SortField::Exam,
            "grade" => SortField::Grade,
            "marks" => SortField::Marks,
            "subject" => SortField::Subject,
            other => return Err(ValidationError::UnknownSortField(other.to_string())),
        })
    }
}

impl SortField {
    fn compare<S>(self, a: &ResultRecord<S>, b: &ResultRecord<S>) -> Ordering {
        match self {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::ExamDate => a.exam_date.cmp(&b.exam_date),
            SortField::StudentName => a.student_name.cmp(&b.student_name),
            SortField::ClassName => a.class_name.label().cmp(b.class_name.label()),
            SortField::Exam => a.exam.cmp(&b.exam),
            SortField::Grade => a.grade.label().cmp(b.grade.label()),
            // Missing marks sort before any present value.
            SortField::Marks => match (a.marks, b.marks) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                (x, y) => x.is_some().cmp(&y.is_some()),
            },
            SortField::Subject => a.subject.cmp(&b.subject),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(ValidationError::InvalidSortOrder(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub order: SortOrder,
}

/// Multi-key ordering: later keys break ties of earlier ones.
/// Remaining ties keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort(Vec<SortKey>);

impl Sort {
    pub fn by(field: SortField, order: SortOrder) -> Self {
        Sort(vec![SortKey { field, order }])
    }

    pub fn then(mut self, field: SortField, order: SortOrder) -> Self {
        self.0.push(SortKey { field, order });
        self
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    pub fn compare<S>(&self, a: &ResultRecord<S>, b: &ResultRecord<S>) -> Ordering {
        for key in &self.0 {
            let ord = key.field.compare(a, b);
            let ord = match key.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Parse the `sortBy` / `sortOrder` query pair, defaulting to
    /// `createdAt desc`.
    pub fn parse(sort_by: Option<&str>, sort_order: Option<&str>) -> Result<Self, ValidationError> {
        let field = match sort_by.filter(|s| !s.is_empty()) {
            Some(s) => s.parse()?,
            None => SortField::CreatedAt,
        };
        let order = match sort_order.filter(|s| !s.is_empty()) {
            Some(s) => s.parse()?,
            None => SortOrder::Desc,
        };
        Ok(Sort::by(field, order))
    }
}

impl Default for Sort {
    fn default() -> Self {
        Sort::by(SortField::CreatedAt, SortOrder::Desc)
    }
}

/// Stable in-place sort.
pub fn sort_results<S>(records: &mut [ResultRecord<S>], sort: &Sort) {
    records.sort_by(|a, b| sort.compare(a, b));
}

/// A store-level find: filter, order, then window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindQuery {
    pub filter: ResultFilter,
    pub sort: Sort,
    pub skip: usize,
    /// `None` returns every match after `skip`.
    pub limit: Option<usize>,
}

impl FindQuery {
    pub fn new(filter: ResultFilter) -> Self {
        FindQuery {
            filter,
            ..Default::default()
        }
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn window(mut self, skip: usize, limit: Option<usize>) -> Self {
        self.skip = skip;
        self.limit = limit;
        self
    }
}

/// Validated `page` / `limit` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn positive(field: &'static str, raw: Option<&str>, default: u64) -> Result<u64, ValidationError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };
    match raw.parse::<u64>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(ValidationError::InvalidPagination {
            field,
            value: raw.to_string(),
        }),
    }
}

impl PageRequest {
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self, ValidationError> {
        Ok(PageRequest {
            page: positive("page", page, DEFAULT_PAGE)?,
            limit: positive("limit", limit, DEFAULT_LIMIT)?,
        })
    }

    /// Cap `limit` at `max` when a cap is configured.
    pub fn clamp(self, max: Option<u64>) -> Self {
        match max {
            Some(max) if self.limit > max => PageRequest {
                limit: max.max(1),
                ..self
            },
            _ => self,
        }
    }

    pub fn skip(&self) -> usize {
        usize::try_from((self.page - 1).saturating_mul(self.limit)).unwrap_or(usize::MAX)
    }

    pub fn limit(&self) -> usize {
        usize::try_from(self.limit).unwrap_or(usize::MAX)
    }
}

/// Pagination summary returned alongside a list page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_results: u64,
    pub results_per_page: u64,
}

impl Pagination {
    pub fn new(page: &PageRequest, total: u64) -> Self {
        Pagination {
            current_page: page.page,
            total_pages: total.div_ceil(page.limit),
            total_results: total,
            results_per_page: page.limit,
        }
    }
}

/// Identity of a result for duplicate prevention.
///
/// With a subject, only a result carrying the same subject collides.
/// Without one, any result for the same student and exam collides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey {
    pub student_id: String,
    pub exam: String,
    pub subject: Option<String>,
}

impl DuplicateKey {
    pub fn of<S>(record: &ResultRecord<S>) -> Self
    where
        S: AsRef<str>,
    {
        DuplicateKey {
            student_id: record.student_id.as_ref().to_string(),
            exam: record.exam.clone(),
            subject: record.subject.clone(),
        }
    }

    pub fn matches<S>(&self, record: &ResultRecord<S>) -> bool
    where
        S: AsRef<str>,
    {
        record.student_id.as_ref() == self.student_id
            && record.exam == self.exam
            && match &self.subject {
                Some(subject) => record.subject.as_ref() == Some(subject),
                None => true,
            }
    }
}
