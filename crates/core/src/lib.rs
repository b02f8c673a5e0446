//! scholar-core: domain model for student exam results.
//!
//! Everything in this crate is synchronous and storage-agnostic:
//!
//! - [`Grade`] and [`ClassName`] -- the closed enumerations shared by
//!   results and students
//! - [`ResultRecord`] and [`Student`] -- stored documents, plus the
//!   [`ResultView`] and [`StudentRef`] shapes used on reads
//! - [`NewResult`], [`ResultPatch`], [`NewStudent`], [`StudentPatch`] --
//!   caller input and its validation
//! - [`ResultFilter`], [`Sort`], [`PageRequest`], [`Pagination`] -- the
//!   query model used by stores and the query service
//! - [`Statistics`] -- grade distribution and pass/fail aggregation

pub mod class_name;
pub mod error;
pub mod grade;
pub mod input;
pub mod query;
pub mod record;
pub mod stats;

pub use class_name::ClassName;
pub use error::ValidationError;
pub use grade::Grade;
pub use input::{
    parse_exam_date, MarksInput, NewResult, NewStudent, ResultPatch, StudentPatch,
    ValidNewResult, ValidNewStudent,
};
pub use query::{
    sort_results, DuplicateKey, FindQuery, PageRequest, Pagination, ResultFilter, Sort,
    SortField, SortKey, SortOrder, StudentFilter,
};
pub use record::{ResultRecord, ResultView, Student, StudentProjection, StudentRef};
pub use stats::{pass_percentage, ClassStats, GradeCount, Statistics};

/// Default value of `createdBy` on new results.
pub const DEFAULT_CREATED_BY: &str = "principal";
