//! Document service - orchestrates template resolution, validation, rendering,
//! persistence and publishing.

use serde_json::Value;
use std::sync::Arc;

use super::context::RequestContext;
use crate::entity::{Document, DocumentTemplate};
use crate::error::DocgenError;
use crate::generators::{GeneratorError, GeneratorRegistry};
use crate::publisher::Publisher;
use crate::repository::{DocumentStore, TemplateRepository, VersionRepository};
use crate::schema::SchemaValidator;

/// Output of a pure render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub template: DocumentTemplate,
}

#[derive(Clone)]
pub struct DocumentService {
    documents: Arc<dyn DocumentStore>,
    templates: Arc<dyn TemplateRepository>,
    versions: Arc<dyn VersionRepository>,
    validator: SchemaValidator,
    generators: Arc<GeneratorRegistry>,
    publisher: Arc<dyn Publisher>,
}

impl DocumentService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        templates: Arc<dyn TemplateRepository>,
        versions: Arc<dyn VersionRepository>,
        validator: SchemaValidator,
        generators: Arc<GeneratorRegistry>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            documents,
            templates,
            versions,
            validator,
            generators,
            publisher,
        }
    }

    /// Render `payload` with the given template version. Nothing is stored or published.
    pub async fn generate_by_version_id(
        &self,
        ctx: &RequestContext,
        version_id: i64,
        payload: Value,
    ) -> Result<RenderedDocument, DocgenError> {
        let version = ctx
            .run(self.versions.get_by_id(version_id))
            .await?
            .map_err(|e| {
                DocgenError::from_repository(format!("resolve template version {version_id}"), e)
            })?;

        let template_id = version.template_id;
        let template = ctx
            .run(self.templates.get_by_id(template_id))
            .await?
            .map_err(|e| DocgenError::from_repository(format!("resolve template {template_id}"), e))?;

        let generator = self
            .generators
            .select(&template.output_format, &template.engine)
            .ok_or_else(|| DocgenError::UnsupportedGenerator {
                operation: format!("render template version {version_id}"),
                output_format: template.output_format.clone(),
                engine: template.engine.clone(),
            })?;

        // may block on the PDF converter process
        let content = version.content;
        let render = tokio::task::spawn_blocking(move || generator.generate(&content, &payload));
        let output = ctx
            .run(render)
            .await?
            .map_err(|e| DocgenError::Render {
                operation: format!("render template version {version_id}"),
                source: GeneratorError::Render(format!("generator task failed: {e}")),
            })?
            .map_err(|e| {
                DocgenError::from_generator(format!("render template version {version_id}"), e)
            })?;

        log::info!(
            "rendered template '{}' version {} ({} bytes, {})",
            template.code,
            version_id,
            output.bytes.len(),
            output.content_type
        );

        Ok(RenderedDocument {
            bytes: output.bytes,
            content_type: output.content_type,
            template,
        })
    }

    /// Validate, persist and publish a generation request, in that order.
    ///
    /// A failure stops the sequence without undoing earlier steps: when
    /// publishing fails the document stays stored and the error is
    /// [`DocgenError::Publish`].
    pub async fn create(
        &self,
        ctx: &RequestContext,
        document: Document,
    ) -> Result<Document, DocgenError> {
        let request_id = document.request_id.clone();
        let version_id = document.template_version.ok_or_else(|| {
            DocgenError::InvalidRequest(format!(
                "document '{request_id}' has no pinned template version"
            ))
        })?;

        let version = ctx
            .run(self.versions.get_by_id(version_id))
            .await?
            .map_err(|e| {
                DocgenError::from_repository(format!("resolve template version {version_id}"), e)
            })?;

        let template = ctx
            .run(self.templates.get_by_code(&document.template_code))
            .await?
            .map_err(|e| {
                DocgenError::from_repository(
                    format!("resolve template '{}'", document.template_code),
                    e,
                )
            })?;

        if template.id != version.template_id {
            log::warn!(
                "rejecting request '{}': template '{}' does not own version {}",
                request_id,
                template.code,
                version_id
            );
            return Err(DocgenError::TemplateMismatch {
                operation: format!("create document '{request_id}'"),
                template_code: template.code,
                template_id: template.id,
                version_id,
                version_template_id: version.template_id,
            });
        }

        ctx.check()?;
        if let Err(e) = self.validator.validate(&version.schema, &document.payload) {
            let err = DocgenError::from_schema(
                format!("validate payload of '{request_id}' against version {version_id}"),
                e,
            );
            log::warn!("rejecting request '{}': {}", request_id, err);
            return Err(err);
        }

        let saved = ctx
            .run(self.documents.save(document))
            .await?
            .map_err(|e| {
                let err =
                    DocgenError::from_repository(format!("save document '{request_id}'"), e);
                log::error!("{}", err);
                err
            })?;

        ctx.run(self.publisher.publish(&saved))
            .await?
            .map_err(|e| {
                let err = DocgenError::Publish {
                    operation: format!("publish document '{request_id}'"),
                    document_id: saved.id,
                    source: e,
                };
                log::error!("{}", err);
                err
            })?;

        log::info!(
            "created document {} for request '{}' (template '{}' version {})",
            saved.id,
            request_id,
            saved.template_code,
            version_id
        );
        Ok(saved)
    }

    pub async fn get(&self, ctx: &RequestContext, id: i64) -> Result<Document, DocgenError> {
        ctx.run(self.documents.get_by_id(id))
            .await?
            .map_err(|e| DocgenError::from_repository(format!("fetch document {id}"), e))
    }

    /// Record a document's terminal outcome.
    pub async fn record_outcome(
        &self,
        ctx: &RequestContext,
        document: Document,
    ) -> Result<Document, DocgenError> {
        let id = document.id;
        ctx.run(self.documents.update(document))
            .await?
            .map_err(|e| DocgenError::from_repository(format!("update document {id}"), e))
    }
}
