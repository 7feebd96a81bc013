//! Student record model and the validation applied to inbound payloads.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Entity type name used in storage errors and log fields.
pub const ENTITY_TYPE: &str = "student";

// ============================================================================
// Student
// ============================================================================

/// A persisted student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i64,
}

// ============================================================================
// NewStudent
// ============================================================================

/// Payload for creating a student.
///
/// Missing fields decode to their empty value so that validation, not the
/// JSON decoder, reports them. Any `id` in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewStudent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub age: i64,
}

impl NewStudent {
    /// Check the required-field and format constraints.
    ///
    /// Collects every failing field instead of stopping at the first one.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::required("name"));
        }

        if self.email.trim().is_empty() {
            errors.push(FieldError::required("email"));
        } else if !is_valid_email(&self.email) {
            errors.push(FieldError::invalid("email"));
        }

        if self.age == 0 {
            errors.push(FieldError::required("age"));
        } else if self.age < 0 {
            errors.push(FieldError::invalid("age"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

/// Loose structural email check: `local@domain.tld`, no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

// ============================================================================
// StudentPatch
// ============================================================================

/// Partial update payload.
///
/// A field only overwrites the stored value when it is present: a non-empty
/// string or a positive integer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
}

impl StudentPatch {
    /// Merge this patch over an existing record. The id is never touched.
    pub fn apply_to(&self, existing: Student) -> Student {
        let mut merged = existing;

        if let Some(name) = self.name.as_deref().filter(|s| !s.is_empty()) {
            merged.name = name.to_string();
        }
        if let Some(email) = self.email.as_deref().filter(|s| !s.is_empty()) {
            merged.email = email.to_string();
        }
        if let Some(age) = self.age.filter(|age| *age > 0) {
            merged.age = age;
        }

        merged
    }
}

// ============================================================================
// Validation Errors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    Required,
    Invalid,
}

/// A single failed field constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn required(field: &'static str) -> Self {
        Self {
            field,
            kind: FieldErrorKind::Required,
        }
    }

    pub fn invalid(field: &'static str) -> Self {
        Self {
            field,
            kind: FieldErrorKind::Invalid,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FieldErrorKind::Required => write!(f, "field {} is required", self.field),
            FieldErrorKind::Invalid => write!(f, "field {} is invalid", self.field),
        }
    }
}

/// Ordered list of field errors from one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_messages(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn join_messages(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Tests
// ============================================================================
