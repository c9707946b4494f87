//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty (or only whitespace).
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// A validated task label for a flow.
///
/// Task names are trimmed on construction and must not be empty afterwards.
/// Deserialization goes through the same validation, so a stored snapshot
/// holding an empty name fails to parse instead of producing a nameless flow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskName(String);

impl TaskName {
    /// Creates a new task name after validation.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "task name" });
        }
        if trimmed.len() == name.len() {
            Ok(Self(name))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskName> for String {
    fn from(name: TaskName) -> Self {
        name.0
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TaskName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_name_rejects_empty() {
        assert_eq!(
            TaskName::new(""),
            Err(ValidationError::Empty { field: "task name" })
        );
        assert!(TaskName::new("   \t").is_err());
        assert!(TaskName::new("write report").is_ok());
    }

    #[test]
    fn task_name_is_trimmed() {
        let name = TaskName::new("  review PR  ").unwrap();
        assert_eq!(name.as_str(), "review PR");
    }

    #[test]
    fn task_name_serde_roundtrip() {
        let name = TaskName::new("deep work").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"deep work\"");
        let parsed: TaskName = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, name);
    }

    #[test]
    fn task_name_serde_rejects_empty() {
        let result: Result<TaskName, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn validation_error_message() {
        let err = TaskName::new("").unwrap_err();
        assert_eq!(err.to_string(), "task name cannot be empty");
    }
}
