//! Payload conformance checking against template version schemas.
//!
//! Compiled schemas are shared through a bounded [`SchemaCache`] keyed by a
//! content fingerprint, so identical schema documents compile once no matter
//! how many template versions reference them.

pub mod cache;
pub mod compiler;
pub mod fingerprint;
pub mod validator;

pub use cache::SchemaCache;
pub use compiler::{CompiledSchema, JsonSchemaCompiler, SchemaCompiler};
pub use fingerprint::{canonical_json, fingerprint};
pub use validator::SchemaValidator;

use std::fmt;
use thiserror::Error;

/// A single payload location that does not satisfy the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer into the payload; `/` for the document root.
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            path: if path.is_empty() { "/".to_string() } else { path },
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.path, self.message)
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to compile schema {fingerprint}: {message}")]
    Compile { fingerprint: String, message: String },
    #[error("payload does not match schema: {}", format_violations(.0))]
    Validation(Vec<Violation>),
}

impl SchemaError {
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Validation(violations) => violations,
            Self::Compile { .. } => &[],
        }
    }
}

pub(crate) fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
