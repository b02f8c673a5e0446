//! Caller-supplied payloads and their validation.
//!
//! Wire payloads keep loosely-typed strings so that a bad grade or date
//! surfaces as a [`ValidationError`] rather than a body-parsing failure.
//! String fields are trimmed; a blank optional field counts as absent.
//! In patches an explicit `null` on `marks` or `examDate` clears the field.

use serde::{Deserialize, Deserializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::class_name::ClassName;
use crate::error::ValidationError;
use crate::grade::Grade;
use crate::record::{ResultRecord, Student};

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Keep an explicit `null` distinct from an absent field.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// `marks` as sent by a client: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MarksInput {
    Number(f64),
    Text(String),
}

impl From<f64> for MarksInput {
    fn from(value: f64) -> Self {
        MarksInput::Number(value)
    }
}

/// A blank string counts as absent.
fn check_marks(marks: Option<MarksInput>) -> Result<Option<f64>, ValidationError> {
    let marks = match marks {
        None => return Ok(None),
        Some(MarksInput::Number(m)) => m,
        Some(MarksInput::Text(raw)) => {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse::<f64>()
                .ok()
                .filter(|m| m.is_finite())
                .ok_or_else(|| ValidationError::InvalidMarks(raw.to_string()))?
        }
    };
    if !(0.0..=100.0).contains(&marks) {
        return Err(ValidationError::MarksOutOfRange(marks));
    }
    Ok(Some(marks))
}

/// Parse an exam date given either as RFC 3339 or as a bare `YYYY-MM-DD`
/// (taken as midnight UTC).
pub fn parse_exam_date(raw: &str) -> Result<OffsetDateTime, ValidationError> {
    let raw = raw.trim();
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(ts);
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map(|d| d.midnight().assume_utc())
        .map_err(|_| ValidationError::InvalidDate {
            field: "examDate",
            value: raw.to_string(),
            expected: "RFC 3339 timestamp or YYYY-MM-DD",
        })
}

fn parse_birth_date(raw: &str) -> Result<Date, ValidationError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        ValidationError::InvalidDate {
            field: "dateOfBirth",
            value: raw.to_string(),
            expected: "YYYY-MM-DD",
        }
    })
}

// ── Results ──────────────────────────────────────────────────────────────────

/// Body of a create-result request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResult {
    pub student_id: Option<String>,
    pub exam: Option<String>,
    pub grade: Option<String>,
    pub marks: Option<MarksInput>,
    pub subject: Option<String>,
    pub remarks: Option<String>,
    pub exam_date: Option<String>,
}

/// A [`NewResult`] that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidNewResult {
    pub student_id: String,
    pub exam: String,
    pub grade: Grade,
    pub marks: Option<f64>,
    pub subject: Option<String>,
    pub remarks: Option<String>,
    pub exam_date: Option<OffsetDateTime>,
}

impl NewResult {
    pub fn validate(self) -> Result<ValidNewResult, ValidationError> {
        let student_id = clean(self.student_id);
        let exam = clean(self.exam);
        let grade = clean(self.grade);

        let (Some(student_id), Some(exam), Some(grade)) = (student_id, exam, grade) else {
            return Err(ValidationError::MissingFields(vec![
                "studentId",
                "exam",
                "grade",
            ]));
        };

        let exam_date = clean(self.exam_date)
            .map(|raw| parse_exam_date(&raw))
            .transpose()?;

        Ok(ValidNewResult {
            student_id,
            exam,
            grade: grade.parse()?,
            marks: check_marks(self.marks)?,
            subject: clean(self.subject),
            remarks: clean(self.remarks),
            exam_date,
        })
    }
}

impl ValidNewResult {
    /// Build the stored record, snapshotting the student's name and class.
    /// A missing exam date defaults to `now`.
    pub fn into_record(self, id: String, student: &Student, now: OffsetDateTime) -> ResultRecord {
        ResultRecord {
            id,
            student_id: self.student_id,
            student_name: student.full_name.clone(),
            class_name: student.class_name,
            exam: self.exam,
            grade: self.grade,
            marks: self.marks,
            subject: self.subject,
            remarks: self.remarks,
            exam_date: Some(self.exam_date.unwrap_or(now)),
            created_by: crate::DEFAULT_CREATED_BY.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a result. Absent fields are left untouched.
///
/// A blank `subject` or `remarks` clears the field, as does `null` on
/// `marks` or `examDate`; a blank required field is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPatch {
    pub student_id: Option<String>,
    pub student_name: Option<String>,
    pub class_name: Option<String>,
    pub exam: Option<String>,
    pub grade: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub marks: Option<Option<MarksInput>>,
    pub subject: Option<String>,
    pub remarks: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub exam_date: Option<Option<String>>,
}

impl ResultPatch {
    /// Validate every supplied field, then merge into `record`.
    /// On error `record` is left unchanged.
    pub fn apply(self, record: &mut ResultRecord, now: OffsetDateTime) -> Result<(), ValidationError> {
        let mut blank = Vec::new();
        let mut required = |name: &'static str, value: Option<String>| match value {
            None => None,
            Some(v) => {
                let v = v.trim().to_string();
                if v.is_empty() {
                    blank.push(name);
                }
                Some(v)
            }
        };
        let student_id = required("studentId", self.student_id);
        let student_name = required("studentName", self.student_name);
        let exam = required("exam", self.exam);
        if !blank.is_empty() {
            return Err(ValidationError::MissingFields(blank));
        }

        let class_name = self
            .class_name
            .map(|c| c.parse::<ClassName>())
            .transpose()?;
        let grade = self.grade.map(|g| g.parse::<Grade>()).transpose()?;
        let marks = self.marks.map(check_marks).transpose()?;
        let exam_date = match self.exam_date {
            None => None,
            Some(raw) => Some(clean(raw).map(|r| parse_exam_date(&r)).transpose()?),
        };

        if let Some(v) = student_id {
            record.student_id = v;
        }
        if let Some(v) = student_name {
            record.student_name = v;
        }
        if let Some(v) = exam {
            record.exam = v;
        }
        if let Some(v) = class_name {
            record.class_name = v;
        }
        if let Some(v) = grade {
            record.grade = v;
        }
        if let Some(v) = marks {
            record.marks = v;
        }
        if let Some(v) = self.subject {
            record.subject = clean(Some(v));
        }
        if let Some(v) = self.remarks {
            record.remarks = clean(Some(v));
        }
        if let Some(v) = exam_date {
            record.exam_date = v;
        }
        record.updated_at = now;
        Ok(())
    }
}

// ── Students ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub full_name: Option<String>,
    pub class_name: Option<String>,
    pub phone: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub date_of_birth: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidNewStudent {
    pub full_name: String,
    pub class_name: ClassName,
    pub phone: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub date_of_birth: Option<Date>,
}

impl NewStudent {
    pub fn validate(self) -> Result<ValidNewStudent, ValidationError> {
        let (Some(full_name), Some(class_name)) = (clean(self.full_name), clean(self.class_name))
        else {
            return Err(ValidationError::MissingFields(vec!["fullName", "className"]));
        };
        Ok(ValidNewStudent {
            full_name,
            class_name: class_name.parse()?,
            phone: clean(self.phone),
            father_name: clean(self.father_name),
            mother_name: clean(self.mother_name),
            date_of_birth: clean(self.date_of_birth)
                .map(|raw| parse_birth_date(&raw))
                .transpose()?,
        })
    }
}

impl ValidNewStudent {
    pub fn into_student(self, id: String, now: OffsetDateTime) -> Student {
        Student {
            id,
            full_name: self.full_name,
            class_name: self.class_name,
            phone: self.phone,
            father_name: self.father_name,
            mother_name: self.mother_name,
            date_of_birth: self.date_of_birth,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a student. Blank optional fields clear the value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    pub full_name: Option<String>,
    pub class_name: Option<String>,
    pub phone: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub date_of_birth: Option<String>,
}

impl StudentPatch {
    pub fn apply(self, student: &mut Student, now: OffsetDateTime) -> Result<(), ValidationError> {
        let full_name = match self.full_name.map(|n| n.trim().to_string()) {
            Some(n) if n.is_empty() => {
                return Err(ValidationError::MissingFields(vec!["fullName"]));
            }
            other => other,
        };
        let class_name = self
            .class_name
            .map(|c| c.parse::<ClassName>())
            .transpose()?;
        let date_of_birth = match self.date_of_birth {
            None => None,
            Some(raw) => Some(clean(Some(raw)).map(|r| parse_birth_date(&r)).transpose()?),
        };

        if let Some(v) = full_name {
            student.full_name = v;
        }
        if let Some(v) = class_name {
            student.class_name = v;
        }
        if let Some(v) = self.phone {
            student.phone = clean(Some(v));
        }
        if let Some(v) = self.father_name {
            student.father_name = clean(Some(v));
        }
        if let Some(v) = self.mother_name {
            student.mother_name = clean(Some(v));
        }
        if let Some(v) = date_of_birth {
            student.date_of_birth = v;
        }
        student.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn student() -> Student {
        NewStudent {
            full_name: Some("Yusuf Ali".into()),
            class_name: Some("qaida".into()),
            ..Default::default()
        }
        .validate()
        .unwrap()
        .into_student("s1".into(), datetime!(2024-01-01 0:00 UTC))
    }

    fn new_result() -> NewResult {
        NewResult {
            student_id: Some("s1".into()),
            exam: Some("  Final  ".into()),
            grade: Some("A-".into()),
            ..Default::default()
        }
    }

    #[test]
    fn missing_required_fields_reported_together() {
        let err = NewResult {
            exam: Some("Final".into()),
            grade: Some("   ".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(err.is_missing_fields());
    }

    #[test]
    fn trims_and_drops_blank_optionals() {
        let v = NewResult {
            subject: Some("".into()),
            remarks: Some(" good ".into()),
            ..new_result()
        }
        .validate()
        .unwrap();
        assert_eq!(v.exam, "Final");
        assert_eq!(v.subject, None);
        assert_eq!(v.remarks.as_deref(), Some("good"));
    }

    #[test]
    fn rejects_bad_grade_and_marks() {
        let bad_grade = NewResult {
            grade: Some("E".into()),
            ..new_result()
        };
        assert_eq!(
            bad_grade.validate(),
            Err(ValidationError::InvalidGrade("E".into()))
        );

        let bad_marks = NewResult {
            marks: Some(MarksInput::Number(100.5)),
            ..new_result()
        };
        assert_eq!(
            bad_marks.validate(),
            Err(ValidationError::MarksOutOfRange(100.5))
        );

        let edge = NewResult {
            marks: Some(MarksInput::Number(0.0)),
            ..new_result()
        };
        assert_eq!(edge.validate().unwrap().marks, Some(0.0));
    }

    #[test]
    fn exam_date_accepts_rfc3339_and_plain_date() {
        assert_eq!(
            parse_exam_date("2024-05-01T09:30:00+06:00").unwrap(),
            datetime!(2024-05-01 9:30 +06:00)
        );
        assert_eq!(
            parse_exam_date("2024-05-01").unwrap(),
            datetime!(2024-05-01 0:00 UTC)
        );
        assert!(matches!(
            parse_exam_date("May 1st"),
            Err(ValidationError::InvalidDate { field: "examDate", .. })
        ));
    }

    #[test]
    fn into_record_snapshots_student_and_defaults_exam_date() {
        let now = datetime!(2024-06-01 12:00 UTC);
        let record = new_result()
            .validate()
            .unwrap()
            .into_record("r1".into(), &student(), now);
        assert_eq!(record.student_name, "Yusuf Ali");
        assert_eq!(record.class_name, ClassName::Qaida);
        assert_eq!(record.exam_date, Some(now));
        assert_eq!(record.created_at, now);
        assert_eq!(record.created_by, "principal");
    }

    #[test]
    fn patch_merges_only_supplied_fields() {
        let created = datetime!(2024-06-01 12:00 UTC);
        let mut record = new_result()
            .validate()
            .unwrap()
            .into_record("r1".into(), &student(), created);
        let later = datetime!(2024-06-02 12:00 UTC);

        ResultPatch {
            grade: Some("F".into()),
            marks: Some(Some(MarksInput::Number(30.0))),
            subject: Some("Tajweed".into()),
            ..Default::default()
        }
        .apply(&mut record, later)
        .unwrap();

        assert_eq!(record.grade, Grade::F);
        assert_eq!(record.marks, Some(30.0));
        assert_eq!(record.subject.as_deref(), Some("Tajweed"));
        assert_eq!(record.exam, "Final");
        assert_eq!(record.created_at, created);
        assert_eq!(record.updated_at, later);
    }

    #[test]
    fn marks_accept_numeric_strings() {
        let body: NewResult = serde_json::from_str(
            r#"{"studentId": "s1", "exam": "Final", "grade": "B", "marks": " 85 "}"#,
        )
        .unwrap();
        assert_eq!(body.validate().unwrap().marks, Some(85.0));

        let blank = NewResult {
            marks: Some(MarksInput::Text(String::new())),
            ..new_result()
        };
        assert_eq!(blank.validate().unwrap().marks, None);

        let junk = NewResult {
            marks: Some(MarksInput::Text("eighty".into())),
            ..new_result()
        };
        assert_eq!(
            junk.validate(),
            Err(ValidationError::InvalidMarks("eighty".into()))
        );
    }

    #[test]
    fn patch_null_clears_marks_and_exam_date() {
        let now = datetime!(2024-06-01 12:00 UTC);
        let mut record = NewResult {
            marks: Some(MarksInput::Number(50.0)),
            ..new_result()
        }
        .validate()
        .unwrap()
        .into_record("r1".into(), &student(), now);
        assert!(record.exam_date.is_some());

        let absent: ResultPatch = serde_json::from_str(r#"{"grade": "B"}"#).unwrap();
        absent.apply(&mut record, now).unwrap();
        assert_eq!(record.marks, Some(50.0));
        assert!(record.exam_date.is_some());

        let nulls: ResultPatch =
            serde_json::from_str(r#"{"marks": null, "examDate": null}"#).unwrap();
        assert_eq!(nulls.marks, Some(None));
        nulls.apply(&mut record, now).unwrap();
        assert_eq!(record.marks, None);
        assert_eq!(record.exam_date, None);
    }

    #[test]
    fn invalid_patch_leaves_record_untouched() {
        let now = datetime!(2024-06-01 12:00 UTC);
        let mut record = new_result()
            .validate()
            .unwrap()
            .into_record("r1".into(), &student(), now);
        let before = record.clone();

        let err = ResultPatch {
            exam: Some("Retake".into()),
            class_name: Some("grade-9".into()),
            ..Default::default()
        }
        .apply(&mut record, datetime!(2024-06-03 0:00 UTC))
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidClassName(_)));
        assert_eq!(record, before);

        let err = ResultPatch {
            exam: Some(" ".into()),
            ..Default::default()
        }
        .apply(&mut record, now)
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["exam"]));
    }

    #[test]
    fn student_validation_and_patch() {
        let err = NewStudent {
            full_name: Some("Hasan".into()),
            class_name: Some("nazera".into()),
            date_of_birth: Some("09/03/2012".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDate { field: "dateOfBirth", .. }));

        let mut s = student();
        StudentPatch {
            date_of_birth: Some("2012-03-09".into()),
            phone: Some("017".into()),
            ..Default::default()
        }
        .apply(&mut s, datetime!(2024-02-01 0:00 UTC))
        .unwrap();
        assert_eq!(s.date_of_birth, Some(date!(2012 - 03 - 09)));
        assert_eq!(s.phone.as_deref(), Some("017"));

        StudentPatch {
            date_of_birth: Some(String::new()),
            ..Default::default()
        }
        .apply(&mut s, datetime!(2024-02-02 0:00 UTC))
        .unwrap();
        assert_eq!(s.date_of_birth, None);
    }
}
