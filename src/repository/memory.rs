use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use super::{DocumentStore, RepositoryError, TemplateRepository, VersionRepository};
use crate::entity::{Document, DocumentTemplate, TemplateVersion};

#[derive(Default)]
pub struct InMemoryTemplateRepository {
    templates: RwLock<HashMap<i64, DocumentTemplate>>,
}

impl InMemoryTemplateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, template: DocumentTemplate) {
        self.templates.write().insert(template.id, template);
    }

    pub fn len(&self) -> usize {
        self.templates.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TemplateRepository for InMemoryTemplateRepository {
    async fn get_by_id(&self, id: i64) -> Result<DocumentTemplate, RepositoryError> {
        self.templates
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("template", id))
    }

    async fn get_by_code(&self, code: &str) -> Result<DocumentTemplate, RepositoryError> {
        self.templates
            .read()
            .values()
            .find(|t| t.code == code)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("template", code))
    }
}

#[derive(Default)]
pub struct InMemoryVersionRepository {
    versions: RwLock<HashMap<i64, TemplateVersion>>,
}

impl InMemoryVersionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a version. A published version stays published with
    /// its content and schema unchanged.
    pub fn insert(&self, version: TemplateVersion) -> Result<(), RepositoryError> {
        let mut versions = self.versions.write();
        if let Some(current) = versions.get(&version.id) {
            if current.conflicts_with(&version) {
                return Err(RepositoryError::ImmutableVersion(version.id));
            }
        }
        versions.insert(version.id, version);
        Ok(())
    }
}

#[async_trait]
impl VersionRepository for InMemoryVersionRepository {
    async fn get_by_id(&self, id: i64) -> Result<TemplateVersion, RepositoryError> {
        self.versions
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("template version", id))
    }
}

pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<i64, Document>>,
    next_id: AtomicI64,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn save(&self, mut document: Document) -> Result<Document, RepositoryError> {
        let now = Utc::now();
        document.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        document.created_at = now;
        document.updated_at = now;
        self.documents.write().insert(document.id, document.clone());
        Ok(document)
    }

    async fn get_by_id(&self, id: i64) -> Result<Document, RepositoryError> {
        self.documents
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("document", id))
    }

    async fn update(&self, mut document: Document) -> Result<Document, RepositoryError> {
        let mut documents = self.documents.write();
        if !documents.contains_key(&document.id) {
            return Err(RepositoryError::not_found("document", document.id));
        }
        document.updated_at = Utc::now();
        documents.insert(document.id, document.clone());
        Ok(document)
    }
}
