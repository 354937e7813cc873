use serde_json::Value;
use std::sync::Arc;

use super::{fingerprint, JsonSchemaCompiler, SchemaCache, SchemaCompiler, SchemaError};

/// Validates payloads against schema documents through a shared [`SchemaCache`].
#[derive(Clone)]
pub struct SchemaValidator {
    cache: Arc<SchemaCache>,
    compiler: Arc<dyn SchemaCompiler>,
}

impl SchemaValidator {
    pub fn new(cache: Arc<SchemaCache>) -> Self {
        Self::with_compiler(cache, Arc::new(JsonSchemaCompiler))
    }

    pub fn with_compiler(cache: Arc<SchemaCache>, compiler: Arc<dyn SchemaCompiler>) -> Self {
        Self { cache, compiler }
    }

    pub fn cache(&self) -> &Arc<SchemaCache> {
        &self.cache
    }

    /// Fails with [`SchemaError::Compile`] for a malformed schema and with
    /// [`SchemaError::Validation`] listing every violation otherwise.
    pub fn validate(&self, schema: &Value, payload: &Value) -> Result<(), SchemaError> {
        let key = fingerprint(schema);
        let compiled = self
            .cache
            .get_or_compile(&key, || self.compiler.compile(schema))?;

        let violations = compiled.violations(payload);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Validation(violations))
        }
    }
}
