//! Collaborator contracts for template, version and document persistence.
//!
//! The generation core only depends on these traits; `memory` provides
//! process-local implementations used by the binary and the tests.

mod memory;

pub use memory::{InMemoryDocumentStore, InMemoryTemplateRepository, InMemoryVersionRepository};

use async_trait::async_trait;
use thiserror::Error;

use crate::entity::{Document, DocumentTemplate, TemplateVersion};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },
    #[error("published template version {0} cannot change content or schema")]
    ImmutableVersion(i64),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<DocumentTemplate, RepositoryError>;
    async fn get_by_code(&self, code: &str) -> Result<DocumentTemplate, RepositoryError>;
}

#[async_trait]
pub trait VersionRepository: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<TemplateVersion, RepositoryError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a new document and return it with its assigned id.
    async fn save(&self, document: Document) -> Result<Document, RepositoryError>;
    async fn get_by_id(&self, id: i64) -> Result<Document, RepositoryError>;
    /// Replace a persisted document, used to record the terminal outcome.
    async fn update(&self, document: Document) -> Result<Document, RepositoryError>;
}
