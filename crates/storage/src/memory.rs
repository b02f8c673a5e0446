//! In-memory [`RecordStore`] with optional JSON file persistence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use scholar_core::{DuplicateKey, FindQuery, ResultFilter, ResultRecord, Student, StudentFilter};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{Collection, StorageError};
use crate::traits::RecordStore;

/// Both collections, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Documents {
    #[serde(default)]
    students: Vec<Student>,
    #[serde(default)]
    results: Vec<ResultRecord>,
}

/// Document store held behind a single `RwLock`.
///
/// Every mutation runs under the write lock, which makes the duplicate
/// check in `insert_result` atomic with its insert. When opened with a
/// path, each mutation is flushed to disk before the lock is released; a
/// failed flush rolls the in-memory change back.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<Documents>,
    path: Option<PathBuf>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store backed by `path`. A missing file starts empty and is
    /// created on the first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let docs = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Documents::default(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Documents::default(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(
            path = %path.display(),
            students = docs.students.len(),
            results = docs.results.len(),
            "opened data file"
        );
        Ok(MemoryStore {
            docs: RwLock::new(docs),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn persist(&self, docs: &Documents) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(docs)?;
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Apply `change` under the write lock, then flush. On flush failure the
    /// documents are restored to their prior state.
    async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Documents) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let mut docs = self.docs.write().await;
        let before = self.path.as_ref().map(|_| docs.clone());
        let out = change(&mut docs)?;
        if let Err(e) = self.persist(&docs).await {
            tracing::error!(error = %e, "failed to persist data file, rolling back");
            if let Some(before) = before {
                *docs = before;
            }
            return Err(e);
        }
        Ok(out)
    }
}

fn position_of<T>(items: &[T], id: &str, key: impl Fn(&T) -> &str) -> Option<usize> {
    items.iter().position(|item| key(item) == id)
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_result(&self, record: ResultRecord) -> Result<ResultRecord, StorageError> {
        self.mutate(|docs| {
            if position_of(&docs.results, &record.id, |r| &r.id).is_some() {
                return Err(StorageError::IdExists {
                    collection: Collection::Results,
                    id: record.id.clone(),
                });
            }
            let key = DuplicateKey::of(&record);
            if docs.results.iter().any(|r| key.matches(r)) {
                return Err(StorageError::DuplicateResult {
                    student_id: key.student_id,
                    exam: key.exam,
                    subject: key.subject,
                });
            }
            docs.results.push(record.clone());
            Ok(record)
        })
        .await
    }

    async fn get_result(&self, id: &str) -> Result<ResultRecord, StorageError> {
        let docs = self.docs.read().await;
        docs.results
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(Collection::Results, id))
    }

    async fn replace_result(&self, record: ResultRecord) -> Result<ResultRecord, StorageError> {
        self.mutate(|docs| {
            let idx = position_of(&docs.results, &record.id, |r| &r.id)
                .ok_or_else(|| StorageError::not_found(Collection::Results, &record.id))?;
            docs.results[idx] = record.clone();
            Ok(record)
        })
        .await
    }

    async fn delete_result(&self, id: &str) -> Result<(), StorageError> {
        self.mutate(|docs| {
            let idx = position_of(&docs.results, id, |r| &r.id)
                .ok_or_else(|| StorageError::not_found(Collection::Results, id))?;
            docs.results.remove(idx);
            Ok(())
        })
        .await
    }

    async fn find_results(&self, query: &FindQuery) -> Result<Vec<ResultRecord>, StorageError> {
        let docs = self.docs.read().await;
        let mut matched: Vec<ResultRecord> = docs
            .results
            .iter()
            .filter(|r| query.filter.matches(r))
            .cloned()
            .collect();
        drop(docs);

        scholar_core::sort_results(&mut matched, &query.sort);
        let window = matched.into_iter().skip(query.skip);
        Ok(match query.limit {
            Some(limit) => window.take(limit).collect(),
            None => window.collect(),
        })
    }

    async fn count_results(&self, filter: &ResultFilter) -> Result<u64, StorageError> {
        let docs = self.docs.read().await;
        Ok(docs.results.iter().filter(|r| filter.matches(r)).count() as u64)
    }

    async fn insert_student(&self, student: Student) -> Result<Student, StorageError> {
        self.mutate(|docs| {
            if position_of(&docs.students, &student.id, |s| &s.id).is_some() {
                return Err(StorageError::IdExists {
                    collection: Collection::Students,
                    id: student.id.clone(),
                });
            }
            docs.students.push(student.clone());
            Ok(student)
        })
        .await
    }

    async fn get_student(&self, id: &str) -> Result<Student, StorageError> {
        let docs = self.docs.read().await;
        docs.students
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(Collection::Students, id))
    }

    async fn get_students(&self, ids: &[String]) -> Result<HashMap<String, Student>, StorageError> {
        let docs = self.docs.read().await;
        Ok(docs
            .students
            .iter()
            .filter(|s| ids.contains(&s.id))
            .map(|s| (s.id.clone(), s.clone()))
            .collect())
    }

    async fn find_students(&self, filter: &StudentFilter) -> Result<Vec<Student>, StorageError> {
        let docs = self.docs.read().await;
        let mut matched: Vec<Student> = docs
            .students
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(matched)
    }

    async fn replace_student(&self, student: Student) -> Result<Student, StorageError> {
        self.mutate(|docs| {
            let idx = position_of(&docs.students, &student.id, |s| &s.id)
                .ok_or_else(|| StorageError::not_found(Collection::Students, &student.id))?;
            docs.students[idx] = student.clone();
            Ok(student)
        })
        .await
    }

    async fn delete_student(&self, id: &str) -> Result<(), StorageError> {
        self.mutate(|docs| {
            let idx = position_of(&docs.students, id, |s| &s.id)
                .ok_or_else(|| StorageError::not_found(Collection::Students, id))?;
            docs.students.remove(idx);
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholar_core::{ClassName, Grade};
    use time::macros::datetime;

    fn record(id: &str, student_id: &str, exam: &str) -> ResultRecord {
        let at = datetime!(2024-05-01 9:00 UTC);
        ResultRecord {
            id: id.into(),
            student_id: student_id.into(),
            student_name: "Yusuf Ali".into(),
            class_name: ClassName::Qaida,
            exam: exam.into(),
            grade: Grade::B,
            marks: Some(65.0),
            subject: None,
            remarks: None,
            exam_date: None,
            created_by: "principal".into(),
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path().join("data.json")).await.unwrap();
        let all = store.find_results(&FindQuery::default()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        {
            let store = MemoryStore::open(&path).await.unwrap();
            store.insert_result(record("r1", "s1", "Final")).await.unwrap();
            store.insert_result(record("r2", "s2", "Final")).await.unwrap();
            store.delete_result("r1").await.unwrap();
        }
        let reopened = MemoryStore::open(&path).await.unwrap();
        let all = reopened.find_results(&FindQuery::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "r2");
    }

    #[tokio::test]
    async fn failed_flush_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the target path makes the rename fail.
        let path = dir.path().join("data.json");
        std::fs::create_dir(&path).unwrap();
        let store = MemoryStore {
            docs: RwLock::new(Documents::default()),
            path: Some(path),
        };
        let err = store.insert_result(record("r1", "s1", "Final")).await.unwrap_err();
        assert!(matches!(err, StorageError::Io(_)), "got {err:?}");
        assert!(matches!(
            store.get_result("r1").await,
            Err(StorageError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, b"{not json").unwrap();
        let err = MemoryStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
