//! Application state - wires repositories, caches, generators and the event worker.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::entity::{Document, DocumentTemplate, TemplateVersion};
use crate::generators::{GeneratorRegistry, HtmlToPdf, WkHtmlToPdf};
use crate::publisher::{start_event_worker, ChannelPublisher};
use crate::repository::{
    InMemoryDocumentStore, InMemoryTemplateRepository, InMemoryVersionRepository, RepositoryError,
};
use crate::schema::{SchemaCache, SchemaValidator};
use crate::service::{DocumentService, GenerationEventHandler};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub templates: Arc<InMemoryTemplateRepository>,
    pub versions: Arc<InMemoryVersionRepository>,
    pub documents: Arc<InMemoryDocumentStore>,
    pub schema_cache: Arc<SchemaCache>,
    pub publisher: ChannelPublisher,
    pub service: DocumentService,
}

impl AppState {
    /// Build the state and spawn the event worker. The worker runs until
    /// [`AppState::shutdown`]; its handle yields the number of events it handled.
    pub fn new(config: AppConfig) -> (Self, JoinHandle<usize>) {
        let converter = Arc::new(
            WkHtmlToPdf::new(config.wkhtmltopdf_bin.clone()).with_timeout(config.request_timeout),
        );
        Self::with_converter(config, converter)
    }

    pub fn with_converter(
        config: AppConfig,
        converter: Arc<dyn HtmlToPdf>,
    ) -> (Self, JoinHandle<usize>) {
        let templates = Arc::new(InMemoryTemplateRepository::new());
        let versions = Arc::new(InMemoryVersionRepository::new());
        let documents = Arc::new(InMemoryDocumentStore::new());
        let schema_cache = Arc::new(SchemaCache::new(config.schema_cache_capacity));
        let generators = Arc::new(GeneratorRegistry::with_defaults(converter));

        // Create channel for document events
        let (publisher, receiver) =
            ChannelPublisher::new(config.event_topic.clone(), config.event_buffer);

        let service = DocumentService::new(
            documents.clone(),
            templates.clone(),
            versions.clone(),
            SchemaValidator::new(schema_cache.clone()),
            generators,
            Arc::new(publisher.clone()),
        );

        let mut handler = GenerationEventHandler::new(service.clone(), config.request_timeout);
        if let Some(dir) = &config.output_dir {
            handler = handler.with_output_dir(dir.clone());
        }

        // Spawn background generation worker
        let worker = tokio::spawn(async move { start_event_worker(receiver, Arc::new(handler)).await });

        let state = AppState {
            config,
            templates,
            versions,
            documents,
            schema_cache,
            publisher,
            service,
        };
        (state, worker)
    }

    /// Stop accepting events. Queued events are still handled.
    pub fn shutdown(&self) {
        self.publisher.close();
    }

    pub fn register_template(&self, template: DocumentTemplate) {
        log::debug!("registering template '{}' (id {})", template.code, template.id);
        self.templates.insert(template);
    }

    pub fn register_version(&self, version: TemplateVersion) -> Result<(), RepositoryError> {
        log::debug!(
            "registering version {} of template {} (id {})",
            version.version,
            version.template_id,
            version.id
        );
        self.versions.insert(version)
    }
}

/// Templates, versions and requests loaded at startup.
#[derive(Debug, Default, serde::Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub templates: Vec<DocumentTemplate>,
    #[serde(default)]
    pub versions: Vec<TemplateVersion>,
    #[serde(default)]
    pub requests: Vec<Document>,
}
