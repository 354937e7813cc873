//! Traits for generator system standardization.

use serde_json::Value;

use super::{GeneratedOutput, GeneratorError, GeneratorKind};

/// A rendering strategy.
///
/// Implementations hold configuration only and must be safe to call from any
/// number of threads at once.
pub trait Generator: Send + Sync {
    fn kind(&self) -> GeneratorKind;

    /// Render `template_source` with `data` into output bytes and a content type.
    fn generate(&self, template_source: &str, data: &Value)
        -> Result<GeneratedOutput, GeneratorError>;
}
