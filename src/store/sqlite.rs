//! SQLite-backed student storage.
//!
//! A single `students` table in one database file:
//! ```text
//! students(id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, email TEXT, age INTEGER)
//! ```
//!
//! The connection is shared behind a mutex and every statement runs on the
//! blocking thread pool so async workers never wait on disk I/O.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use crate::store::error::{StorageError, StorageResult};
use crate::store::student::StudentStore;
use crate::student::{ENTITY_TYPE, Student};

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS students (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT,
        email TEXT,
        age INTEGER
    );
";

/// SQLite implementation of `StudentStore`.
#[derive(Debug, Clone)]
pub struct SqliteStudentStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStudentStore {
    /// Open (or create) the database file and ensure the table exists.
    ///
    /// Missing parent directories are created.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let conn = Connection::open(path).map_err(sql_err("open database"))?;
        debug!(path = %path.display(), "Opened SQLite database");
        Self::from_connection(conn)
    }

    /// Open a private in-memory database (for tests).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory().map_err(sql_err("open in-memory database"))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(CREATE_TABLE)
            .map_err(sql_err("create students table"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the shared connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| StorageError::LockPoisoned)?;
            f(&conn)
        })
        .await?
    }
}

fn sql_err(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> StorageError {
    move |e| StorageError::sqlite(operation, e)
}

fn row_to_student(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        age: row.get(3)?,
    })
}

#[async_trait]
impl StudentStore for SqliteStudentStore {
    async fn create_student(&self, name: &str, email: &str, age: i64) -> StorageResult<i64> {
        let name = name.to_string();
        let email = email.to_string();

        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare("INSERT INTO students (name, email, age) VALUES (?1, ?2, ?3)")
                .map_err(sql_err("prepare create student"))?;
            stmt.execute(params![name, email, age])
                .map_err(sql_err("create student"))?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn get_student_by_id(&self, id: i64) -> StorageResult<Student> {
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare("SELECT id, name, email, age FROM students WHERE id = ?1 LIMIT 1")
                .map_err(sql_err("prepare get student"))?;
            stmt.query_row(params![id], row_to_student)
                .optional()
                .map_err(sql_err("get student"))?
                .ok_or_else(|| StorageError::not_found(ENTITY_TYPE, id))
        })
        .await
    }

    async fn get_students(&self) -> StorageResult<Vec<Student>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, name, email, age FROM students")
                .map_err(sql_err("prepare list students"))?;
            let rows = stmt
                .query_map([], row_to_student)
                .map_err(sql_err("list students"))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(sql_err("read student row"))
        })
        .await
    }

    async fn update_student(&self, student: &Student) -> StorageResult<()> {
        let student = student.clone();

        self.with_conn(move |conn| {
            let exists: bool = conn
                .query_row(
                    "SELECT EXISTS(SELECT 1 FROM students WHERE id = ?1)",
                    params![student.id],
                    |row| row.get(0),
                )
                .map_err(sql_err("check student exists"))?;
            if !exists {
                return Err(StorageError::not_found(ENTITY_TYPE, student.id));
            }

            let mut stmt = conn
                .prepare("UPDATE students SET name = ?1, email = ?2, age = ?3 WHERE id = ?4")
                .map_err(sql_err("prepare update student"))?;
            let affected = stmt
                .execute(params![student.name, student.email, student.age, student.id])
                .map_err(sql_err("update student"))?;
            if affected == 0 {
                return Err(StorageError::not_found(ENTITY_TYPE, student.id));
            }
            Ok(())
        })
        .await
    }

    async fn remove_student(&self, id: i64) -> StorageResult<()> {
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare("DELETE FROM students WHERE id = ?1")
                .map_err(sql_err("prepare delete student"))?;
            let affected = stmt
                .execute(params![id])
                .map_err(sql_err("delete student"))?;
            if affected == 0 {
                return Err(StorageError::not_found(ENTITY_TYPE, id));
            }
            Ok(())
        })
        .await
    }
}
