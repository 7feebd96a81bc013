//! HTTP request handlers.

mod health;
pub mod response;
mod students;
mod version;

pub use health::{livez, readyz};
pub use students::{
    CreateStudentResponse, create_student, get_student, list_students, remove_student,
    update_student,
};
pub use version::version;
