//! In-memory student storage.
//!
//! Nothing survives a restart. Used as a test double for handlers and as the
//! `memory` storage backend.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::store::error::{StorageError, StorageResult};
use crate::store::student::StudentStore;
use crate::student::{ENTITY_TYPE, Student};

#[derive(Debug, Default)]
struct Inner {
    rows: BTreeMap<i64, Student>,
    last_id: i64,
}

/// In-memory implementation of `StudentStore`.
///
/// Ids are assigned from a counter that never goes backwards, matching the
/// AUTOINCREMENT behavior of the SQLite store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStudentStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn create_student(&self, name: &str, email: &str, age: i64) -> StorageResult<i64> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let id = inner.last_id;
        inner.rows.insert(
            id,
            Student {
                id,
                name: name.to_string(),
                email: email.to_string(),
                age,
            },
        );
        Ok(id)
    }

    async fn get_student_by_id(&self, id: i64) -> StorageResult<Student> {
        self.inner
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(ENTITY_TYPE, id))
    }

    async fn get_students(&self) -> StorageResult<Vec<Student>> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn update_student(&self, student: &Student) -> StorageResult<()> {
        let mut inner = self.inner.write().await;
        let Some(stored) = inner.rows.get_mut(&student.id) else {
            return Err(StorageError::not_found(ENTITY_TYPE, student.id));
        };
        *stored = student.clone();
        Ok(())
    }

    async fn remove_student(&self, id: i64) -> StorageResult<()> {
        match self.inner.write().await.rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StorageError::not_found(ENTITY_TYPE, id)),
        }
    }
}
