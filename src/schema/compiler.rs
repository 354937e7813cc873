use serde_json::Value;
use std::sync::Arc;

use super::{SchemaError, Violation};

/// A schema ready to check payloads.
pub trait CompiledSchema: Send + Sync {
    /// Every violation found in `payload`; empty when it conforms.
    fn violations(&self, payload: &Value) -> Vec<Violation>;
}

/// Turns a raw schema document into a [`CompiledSchema`].
///
/// Implementations must be side-effect free: the cache may compile the same
/// schema more than once when concurrent misses race.
pub trait SchemaCompiler: Send + Sync {
    fn compile(&self, schema: &Value) -> Result<Arc<dyn CompiledSchema>, SchemaError>;
}

/// JSON Schema compiler backed by the `jsonschema` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSchemaCompiler;

impl SchemaCompiler for JsonSchemaCompiler {
    fn compile(&self, schema: &Value) -> Result<Arc<dyn CompiledSchema>, SchemaError> {
        let validator = jsonschema::validator_for(schema).map_err(|err| SchemaError::Compile {
            fingerprint: super::fingerprint(schema),
            message: err.to_string(),
        })?;
        Ok(Arc::new(validator))
    }
}

impl CompiledSchema for jsonschema::Validator {
    fn violations(&self, payload: &Value) -> Vec<Violation> {
        self.iter_errors(payload)
            .map(|err| Violation::new(err.instance_path.to_string(), err.to_string()))
            .collect()
    }
}
