//! Write-side operations on results and students.

use std::sync::Arc;

use scholar_core::{NewResult, NewStudent, ResultPatch, ResultView, Student, StudentPatch};
use scholar_storage::RecordStore;
use time::OffsetDateTime;

use crate::error::ServiceError;
use crate::new_id;

#[derive(Clone)]
pub struct MutationService {
    store: Arc<dyn RecordStore>,
}

/// Outcome of a bulk student import. Rows are numbered from 1.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub created: Vec<Student>,
    pub failures: Vec<ImportFailure>,
}

#[derive(Debug)]
pub struct ImportFailure {
    pub row: usize,
    pub error: ServiceError,
}

impl MutationService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        MutationService { store }
    }

    /// Validate, resolve the student, snapshot its name and class, then
    /// insert under the duplicate-key check.
    pub async fn create_result(&self, input: NewResult) -> Result<ResultView, ServiceError> {
        let valid = input.validate()?;
        let student = self.store.get_student(&valid.student_id).await?;
        let record = valid.into_record(new_id(), &student, OffsetDateTime::now_utc());

        let stored = self.store.insert_result(record).await.map_err(|e| {
            let err = ServiceError::from(e);
            if matches!(err, ServiceError::Conflict(_)) {
                tracing::warn!(student_id = %student.id, "duplicate result rejected");
            }
            err
        })?;
        tracing::info!(
            result_id = %stored.id,
            student_id = %stored.student_id,
            exam = %stored.exam,
            grade = %stored.grade,
            "result created"
        );
        Ok(stored.into())
    }

    /// Merge `patch` into the stored result. The duplicate key is not
    /// re-checked and the student snapshot is not re-derived.
    pub async fn update_result(
        &self,
        id: &str,
        patch: ResultPatch,
    ) -> Result<ResultView, ServiceError> {
        let mut record = self.store.get_result(id).await?;
        patch.apply(&mut record, OffsetDateTime::now_utc())?;
        let stored = self.store.replace_result(record).await?;
        tracing::info!(result_id = %stored.id, "result updated");
        Ok(stored.into())
    }

    pub async fn delete_result(&self, id: &str) -> Result<(), ServiceError> {
        self.store.delete_result(id).await?;
        tracing::info!(result_id = %id, "result deleted");
        Ok(())
    }

    pub async fn create_student(&self, input: NewStudent) -> Result<Student, ServiceError> {
        let student = input
            .validate()?
            .into_student(new_id(), OffsetDateTime::now_utc());
        let stored = self.store.insert_student(student).await?;
        tracing::info!(student_id = %stored.id, class = %stored.class_name, "student created");
        Ok(stored)
    }

    /// Existing result snapshots are left as they are.
    pub async fn update_student(
        &self,
        id: &str,
        patch: StudentPatch,
    ) -> Result<Student, ServiceError> {
        let mut student = self.store.get_student(id).await?;
        patch.apply(&mut student, OffsetDateTime::now_utc())?;
        let stored = self.store.replace_student(student).await?;
        tracing::info!(student_id = %stored.id, "student updated");
        Ok(stored)
    }

    /// Results referencing the student are kept.
    pub async fn delete_student(&self, id: &str) -> Result<(), ServiceError> {
        self.store.delete_student(id).await?;
        tracing::info!(student_id = %id, "student deleted");
        Ok(())
    }

    /// Create each row independently. Invalid rows are reported and skipped;
    /// a store failure aborts the import.
    pub async fn import_students(
        &self,
        rows: Vec<NewStudent>,
    ) -> Result<ImportReport, ServiceError> {
        let mut report = ImportReport::default();
        for (i, row) in rows.into_iter().enumerate() {
            match self.create_student(row).await {
                Ok(student) => report.created.push(student),
                Err(ServiceError::Store(e)) => return Err(ServiceError::Store(e)),
                Err(error) => report.failures.push(ImportFailure { row: i + 1, error }),
            }
        }
        tracing::info!(
            created = report.created.len(),
            failed = report.failures.len(),
            "student import finished"
        );
        Ok(report)
    }
}
