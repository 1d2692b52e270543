// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for descriptor compilation

use thiserror::Error;

use crate::domain::ValidationError;

/// Errors that end a single compile call
///
/// None of these are retried internally; the caller corrects the input and
/// resubmits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Manifest text is not parseable as YAML
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    /// Parsed document has the wrong shape
    #[error("Schema error: {0}")]
    Schema(String),

    /// Document is well-formed but violates a deployment rule
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Rendering a document or descriptor failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CompileError {
    /// The validation failure, if this is one
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for compiler operations
pub type CompileResult<T> = Result<T, CompileError>;

impl From<serde_yaml::Error> for CompileError {
    fn from(err: serde_yaml::Error) -> Self {
        match err.location() {
            Some(location) => CompileError::Syntax {
                message: err.to_string(),
                line: location.line(),
                column: location.column(),
            },
            None => CompileError::Syntax {
                message: err.to_string(),
                line: 0,
                column: 0,
            },
        }
    }
}

impl From<serde_json::Error> for CompileError {
    fn from(err: serde_json::Error) -> Self {
        CompileError::Serialization(err.to_string())
    }
}
