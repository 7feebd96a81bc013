//! Student storage trait.
//!
//! Defines the interface handlers use to persist and retrieve student
//! records, independent of the storage engine behind it.

use async_trait::async_trait;

use crate::student::Student;

use super::error::StorageResult;

/// Storage interface for student records.
///
/// Implementations only ever see complete records; merging a partial update
/// over the stored value happens in the caller.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Insert a new record and return its server-assigned id.
    async fn create_student(&self, name: &str, email: &str, age: i64) -> StorageResult<i64>;

    /// Load one record.
    ///
    /// Returns `StorageError::NotFound` when no record has this id.
    async fn get_student_by_id(&self, id: i64) -> StorageResult<Student>;

    /// Load every record, in the backend's natural order.
    ///
    /// An empty store yields an empty `Vec`, not an error.
    async fn get_students(&self) -> StorageResult<Vec<Student>>;

    /// Overwrite the stored record with the same id.
    ///
    /// Returns `StorageError::NotFound` when no record has this id.
    async fn update_student(&self, student: &Student) -> StorageResult<()>;

    /// Delete one record.
    ///
    /// Returns `StorageError::NotFound` when no record has this id.
    async fn remove_student(&self, id: i64) -> StorageResult<()>;
}
