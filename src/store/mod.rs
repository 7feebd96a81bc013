//! Persistence for student records.
//!
//! Handlers depend on the `StudentStore` trait only; `SqliteStudentStore` is
//! the production backend and `MemoryStudentStore` a volatile alternative.

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod student;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStudentStore;
pub use sqlite::SqliteStudentStore;
pub use student::StudentStore;
