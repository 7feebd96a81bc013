//! Student CRUD HTTP handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::handlers::response::{ApiError, MessageResponse};
use crate::server::AppState;
use crate::student::{NewStudent, Student, StudentPatch};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudentResponse {
    pub id: i64,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/students
pub async fn create_student(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<CreateStudentResponse>), ApiError> {
    let student: NewStudent = decode_body(&body?)?;
    student.validate()?;

    let id = state
        .students
        .create_student(&student.name, &student.email, student.age)
        .await?;
    info!(student_id = id, "Student created");

    Ok((StatusCode::CREATED, Json(CreateStudentResponse { id })))
}

/// GET /api/students/{id}
pub async fn get_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Student>, ApiError> {
    let id = parse_id(&raw_id)?;
    debug!(student_id = id, "Getting student");

    let student = state.students.get_student_by_id(id).await?;
    Ok(Json(student))
}

/// GET /api/students
pub async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>, ApiError> {
    let students = state.students.get_students().await?;
    Ok(Json(students))
}

/// PATCH /api/students/{id}
///
/// Merge-patch: only non-empty strings and positive integers in the body
/// overwrite stored values.
pub async fn update_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&raw_id)?;
    let patch: StudentPatch = decode_body(&body?)?;

    // Hold the per-id lock across fetch, merge and write.
    let lock = state.student_locks.get(&id);
    let _guard = lock.lock().await;

    let existing = state.students.get_student_by_id(id).await?;
    let merged = patch.apply_to(existing);
    state.students.update_student(&merged).await?;
    info!(student_id = id, "Student updated");

    Ok(Json(MessageResponse::new(format!(
        "student {id} updated successfully"
    ))))
}

/// DELETE /api/students/{id}
pub async fn remove_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&raw_id)?;

    state.students.remove_student(id).await?;
    info!(student_id = id, "Student removed");

    Ok(Json(MessageResponse::new(format!(
        "student {id} deleted successfully"
    ))))
}

// ============================================================================
// Request Parsing
// ============================================================================

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::bad_request(format!("invalid student id '{raw}'")))
}

/// Decode a JSON body, telling an empty body apart from a malformed one.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::bad_request("empty body"));
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("-1").unwrap(), -1);
    }

    #[test]
    fn parse_id_rejects_non_integers() {
        for raw in ["abc", "1.5", "", "9999999999999999999999"] {
            let err = parse_id(raw).unwrap_err();
            assert!(matches!(err, ApiError::BadRequest(_)), "raw: {raw}");
        }
    }

    #[test]
    fn decode_empty_body_is_distinct_from_malformed() {
        let empty = decode_body::<NewStudent>(b"").unwrap_err();
        assert_eq!(empty.to_string(), "empty body");

        let blank = decode_body::<NewStudent>(b"  \n").unwrap_err();
        assert_eq!(blank.to_string(), "empty body");

        let malformed = decode_body::<NewStudent>(b"{\"name\":").unwrap_err();
        assert!(malformed.to_string().starts_with("invalid request body"));
    }

    #[test]
    fn decode_wrong_field_type_is_malformed() {
        let err = decode_body::<NewStudent>(br#"{"name":"Ann","age":"thirty"}"#).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn decode_patch() {
        let patch: StudentPatch = decode_body(br#"{"age":31}"#).unwrap();
        assert_eq!(patch.age, Some(31));
        assert!(patch.name.is_none());
    }
}
