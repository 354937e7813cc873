//! Error taxonomy of the generation service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generators::GeneratorError;
use crate::publisher::PublishError;
use crate::repository::RepositoryError;
use crate::schema::{format_violations, SchemaError, Violation};

/// Every failure the generation service can report. Each variant carries the
/// operation and identifier it happened on.
#[derive(Debug, Error)]
pub enum DocgenError {
    #[error("{operation}: {entity} '{key}' not found")]
    NotFound {
        operation: String,
        entity: &'static str,
        key: String,
    },
    #[error("{operation}: template '{template_code}' (id {template_id}) does not own template version {version_id} (template id {version_template_id})")]
    TemplateMismatch {
        operation: String,
        template_code: String,
        template_id: i64,
        version_id: i64,
        version_template_id: i64,
    },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("{operation}: {source}")]
    SchemaCompile {
        operation: String,
        #[source]
        source: SchemaError,
    },
    #[error("{operation}: payload does not match schema: {}", format_violations(.violations))]
    SchemaValidation {
        operation: String,
        violations: Vec<Violation>,
    },
    #[error("{operation}: no generator for output_format='{output_format}' engine='{engine}'")]
    UnsupportedGenerator {
        operation: String,
        output_format: String,
        engine: String,
    },
    #[error("{operation}: {source}")]
    Render {
        operation: String,
        #[source]
        source: GeneratorError,
    },
    #[error("{operation}: {source}")]
    Conversion {
        operation: String,
        #[source]
        source: GeneratorError,
    },
    #[error("{operation}: {source}")]
    Storage {
        operation: String,
        #[source]
        source: RepositoryError,
    },
    #[error("{operation}: document {document_id} was stored but not published: {source}")]
    Publish {
        operation: String,
        document_id: i64,
        #[source]
        source: PublishError,
    },
    #[error("request cancelled")]
    Cancelled,
    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

/// Stable names for [`DocgenError`] variants, for outer layers to map onto
/// their own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    TemplateMismatch,
    InvalidRequest,
    SchemaCompileError,
    SchemaValidationError,
    UnsupportedGenerator,
    RenderError,
    ConversionError,
    StorageError,
    PublishError,
    Cancelled,
    DeadlineExceeded,
}

impl DocgenError {
    pub fn from_repository(operation: impl Into<String>, err: RepositoryError) -> Self {
        let operation = operation.into();
        match err {
            RepositoryError::NotFound { entity, key } => Self::NotFound {
                operation,
                entity,
                key,
            },
            other => Self::Storage {
                operation,
                source: other,
            },
        }
    }

    pub fn from_schema(operation: impl Into<String>, err: SchemaError) -> Self {
        let operation = operation.into();
        match err {
            SchemaError::Validation(violations) => Self::SchemaValidation {
                operation,
                violations,
            },
            compile => Self::SchemaCompile {
                operation,
                source: compile,
            },
        }
    }

    pub fn from_generator(operation: impl Into<String>, err: GeneratorError) -> Self {
        let operation = operation.into();
        if err.is_conversion() {
            Self::Conversion {
                operation,
                source: err,
            }
        } else {
            Self::Render {
                operation,
                source: err,
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::TemplateMismatch { .. } => ErrorKind::TemplateMismatch,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::SchemaCompile { .. } => ErrorKind::SchemaCompileError,
            Self::SchemaValidation { .. } => ErrorKind::SchemaValidationError,
            Self::UnsupportedGenerator { .. } => ErrorKind::UnsupportedGenerator,
            Self::Render { .. } => ErrorKind::RenderError,
            Self::Conversion { .. } => ErrorKind::ConversionError,
            Self::Storage { .. } => ErrorKind::StorageError,
            Self::Publish { .. } => ErrorKind::PublishError,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::DeadlineExceeded => ErrorKind::DeadlineExceeded,
        }
    }

    /// Violations carried by a schema validation failure.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::SchemaValidation { violations, .. } => violations,
            _ => &[],
        }
    }

    /// True when the request was rejected before any write was attempted.
    /// Cancellation is excluded because it may interrupt a write in flight.
    pub fn is_side_effect_free(&self) -> bool {
        !matches!(
            self,
            Self::Storage { .. } | Self::Publish { .. } | Self::Cancelled | Self::DeadlineExceeded
        )
    }

    /// True when the failure left a persisted document behind: storage
    /// succeeded but publishing did not.
    pub fn is_partially_applied(&self) -> bool {
        matches!(self, Self::Publish { .. })
    }
}

/// Serializable error body for transport layers.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
    pub partially_applied: bool,
    pub timestamp: String,
}

impl From<&DocgenError> for ErrorResponse {
    fn from(err: &DocgenError) -> Self {
        Self {
            error: err.kind(),
            message: err.to_string(),
            violations: err.violations().iter().map(ToString::to_string).collect(),
            partially_applied: err.is_partially_applied(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
