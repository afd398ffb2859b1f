//! Structured error types for the causal engine's JSON boundary.
//!
//! The edge computations themselves are infallible; only snapshot
//! validation and stream I/O produce errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  /// A record in the inbound snapshot failed validation. `field` is a path
  /// such as `event_instances[3].timestamp`.
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),
}

impl EngineError {
  pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
    Self::Validation {
      field: field.into(),
      reason: reason.into(),
    }
  }

  /// Field path for validation failures, if any.
  pub fn field(&self) -> Option<&str> {
    match self {
      Self::Validation { field, .. } => Some(field),
      _ => None,
    }
  }
}
