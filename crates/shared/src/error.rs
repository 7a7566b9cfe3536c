use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::FormField;

/// Failure categories the presentation layer picks its messaging from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Server,
    Shape,
    Input,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorReport {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Rejected form input. Raised locally before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{0} is required")]
    Missing(FormField),
    #[error("{field} must be a number, got {value:?}")]
    NotANumber { field: FormField, value: String },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: FormField, value: String },
}

impl InputError {
    pub fn field(&self) -> FormField {
        match self {
            InputError::Missing(field) => *field,
            InputError::NotANumber { field, .. } | InputError::Negative { field, .. } => *field,
        }
    }
}
