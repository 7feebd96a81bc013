//! students-api - a small CRUD HTTP service for student records backed by SQLite.

pub mod build_info;
pub mod config;
pub mod handlers;
pub mod server;
pub mod store;
pub mod student;
pub mod sync;
