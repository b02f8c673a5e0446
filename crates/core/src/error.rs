/// Input that failed validation before reaching the store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// One or more required fields were absent or blank.
    #[error("missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("invalid grade '{0}'")]
    InvalidGrade(String),

    #[error("invalid class name '{0}'")]
    InvalidClassName(String),

    #[error("invalid marks '{0}': expected a number")]
    InvalidMarks(String),

    #[error("marks must be between 0 and 100, got {0}")]
    MarksOutOfRange(f64),

    #[error("invalid {field} '{value}': expected {expected}")]
    InvalidDate {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("invalid {field} '{value}': must be a positive integer")]
    InvalidPagination { field: &'static str, value: String },

    #[error("unknown sort field '{0}'")]
    UnknownSortField(String),

    #[error("invalid sort order '{0}': expected 'asc' or 'desc'")]
    InvalidSortOrder(String),
}

impl ValidationError {
    /// True when the error is the required-fields check.
    pub fn is_missing_fields(&self) -> bool {
        matches!(self, ValidationError::MissingFields(_))
    }
}
