//! Stored documents and their read-side shapes.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::class_name::ClassName;
use crate::grade::Grade;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

fn default_created_by() -> String {
    crate::DEFAULT_CREATED_BY.to_string()
}

/// A single exam-grade record for one student.
///
/// `S` is the shape of the student reference: the plain student id as
/// stored, or an expanded [`StudentRef`] projection on reads.
/// `student_name` and `class_name` are a snapshot of the student taken at
/// creation time and are never re-resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord<S = String> {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub student_id: S,
    pub student_name: String,
    pub class_name: ClassName,
    pub exam: String,
    pub grade: Grade,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub exam_date: Option<OffsetDateTime>,
    #[serde(default = "default_created_by")]
    pub created_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl<S> ResultRecord<S> {
    pub fn is_passed(&self) -> bool {
        self.grade.is_passing()
    }

    /// Replace the student reference, keeping every other field.
    pub fn with_student<T>(self, student: T) -> ResultRecord<T> {
        ResultRecord {
            id: self.id,
            student_id: student,
            student_name: self.student_name,
            class_name: self.class_name,
            exam: self.exam,
            grade: self.grade,
            marks: self.marks,
            subject: self.subject,
            remarks: self.remarks,
            exam_date: self.exam_date,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A result as returned to callers: the record plus the derived
/// `isPassed` flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView<S = String> {
    #[serde(flatten)]
    pub record: ResultRecord<S>,
    pub is_passed: bool,
}

impl<S> From<ResultRecord<S>> for ResultView<S> {
    fn from(record: ResultRecord<S>) -> Self {
        let is_passed = record.is_passed();
        ResultView { record, is_passed }
    }
}

/// A student as held by the student collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub full_name: String,
    pub class_name: ClassName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "iso_date::option"
    )]
    pub date_of_birth: Option<Date>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Projection of a [`Student`] embedded in a result's `studentId` field.
///
/// Fields outside the chosen [`StudentProjection`] are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRef {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "iso_date::option"
    )]
    pub date_of_birth: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,
}

/// Which student fields an expanded read includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentProjection {
    /// `fullName`
    Name,
    /// `fullName, className`
    NameAndClass,
    /// `fullName, className, phone`
    Contact,
    /// `fullName, className, dateOfBirth, phone, fatherName, motherName`
    Full,
}

impl StudentProjection {
    pub fn project(self, student: &Student) -> StudentRef {
        let mut out = StudentRef {
            id: student.id.clone(),
            full_name: Some(student.full_name.clone()),
            class_name: None,
            date_of_birth: None,
            phone: None,
            father_name: None,
            mother_name: None,
        };
        if self == StudentProjection::Name {
            return out;
        }
        out.class_name = Some(student.class_name);
        match self {
            StudentProjection::Name | StudentProjection::NameAndClass => {}
            StudentProjection::Contact => {
                out.phone = student.phone.clone();
            }
            StudentProjection::Full => {
                out.phone = student.phone.clone();
                out.date_of_birth = student.date_of_birth;
                out.father_name = student.father_name.clone();
                out.mother_name = student.mother_name.clone();
            }
        }
        out
    }
}
