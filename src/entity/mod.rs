//! Domain models for templates, template versions and generated documents.

pub mod document;
pub mod template;
pub mod template_version;

pub use document::{Document, DocumentStatus};
pub use template::DocumentTemplate;
pub use template_version::TemplateVersion;
