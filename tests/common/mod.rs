//! Shared fixtures and mocks for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use document_generator::entity::{Document, DocumentTemplate, TemplateVersion};
use document_generator::generators::{
    GeneratedOutput, Generator, GeneratorError, GeneratorKind, GeneratorRegistry, HtmlToPdf,
    PdfOptions,
};
use document_generator::publisher::{PublishError, Publisher};
use document_generator::repository::{
    DocumentStore, InMemoryDocumentStore, InMemoryTemplateRepository, InMemoryVersionRepository,
    RepositoryError,
};
use document_generator::schema::{
    CompiledSchema, JsonSchemaCompiler, SchemaCache, SchemaCompiler, SchemaError, SchemaValidator,
};
use document_generator::DocumentService;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const TEMPLATE_ID: i64 = 10;
pub const VERSION_ID: i64 = 7;
pub const TEMPLATE_CODE: &str = "CUSTOMER_EXPORT";
pub const CSV_CONTENT: &str = "id,name\n{{ id }},{{ name }}";

pub fn customer_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "id": { "type": "number" },
            "name": { "type": "string" }
        },
        "required": ["id", "name"]
    })
}

pub fn csv_template() -> DocumentTemplate {
    DocumentTemplate::new(TEMPLATE_ID, TEMPLATE_CODE, "Customer export", "csv", "default")
}

pub fn csv_version() -> TemplateVersion {
    TemplateVersion::new(VERSION_ID, TEMPLATE_ID, 1, CSV_CONTENT, customer_schema()).publish()
}

pub fn request(request_id: &str, payload: Value) -> Document {
    Document::new(request_id, TEMPLATE_CODE, Some(VERSION_ID), payload)
}

/// Document store that counts calls and can be told to fail saves.
pub struct MockDocumentStore {
    inner: InMemoryDocumentStore,
    save_count: AtomicUsize,
    update_count: AtomicUsize,
    should_fail: bool,
}

impl MockDocumentStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryDocumentStore::new(),
            save_count: AtomicUsize::new(0),
            update_count: AtomicUsize::new(0),
            should_fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    pub fn get_save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    pub fn get_update_count(&self) -> usize {
        self.update_count.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl DocumentStore for MockDocumentStore {
    async fn save(&self, document: Document) -> Result<Document, RepositoryError> {
        self.save_count.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(RepositoryError::Storage("Mock save failure".to_string()));
        }
        self.inner.save(document).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Document, RepositoryError> {
        self.inner.get_by_id(id).await
    }

    async fn update(&self, document: Document) -> Result<Document, RepositoryError> {
        self.update_count.fetch_add(1, Ordering::SeqCst);
        self.inner.update(document).await
    }
}

/// Publisher that records every published document.
pub struct MockPublisher {
    published: Mutex<Vec<Document>>,
    should_fail: bool,
    should_hang: bool,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            should_fail: false,
            should_hang: false,
        }
    }

    /// A publisher whose `publish` never completes.
    pub fn new_hanging() -> Self {
        Self {
            should_hang: true,
            ..Self::new()
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    pub fn get_publish_count(&self) -> usize {
        self.published.lock().len()
    }

    pub fn published(&self) -> Vec<Document> {
        self.published.lock().clone()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, document: &Document) -> Result<(), PublishError> {
        self.published.lock().push(document.clone());
        if self.should_hang {
            std::future::pending::<()>().await;
        }
        if self.should_fail {
            return Err(PublishError::Rejected("Mock broker failure".to_string()));
        }
        Ok(())
    }
}

/// Compiler that counts how often it is asked to compile.
#[derive(Default)]
pub struct CountingCompiler {
    compile_count: AtomicUsize,
}

impl CountingCompiler {
    pub fn get_compile_count(&self) -> usize {
        self.compile_count.load(Ordering::SeqCst)
    }
}

impl SchemaCompiler for CountingCompiler {
    fn compile(&self, schema: &Value) -> Result<Arc<dyn CompiledSchema>, SchemaError> {
        self.compile_count.fetch_add(1, Ordering::SeqCst);
        // widen the race window between concurrent misses
        std::thread::sleep(std::time::Duration::from_millis(5));
        JsonSchemaCompiler.compile(schema)
    }
}

/// Generator that counts invocations and echoes the payload.
pub struct CountingGenerator {
    kind: GeneratorKind,
    call_count: AtomicUsize,
}

impl CountingGenerator {
    pub fn new(kind: GeneratorKind) -> Self {
        Self {
            kind,
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn get_call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl Generator for CountingGenerator {
    fn kind(&self) -> GeneratorKind {
        self.kind
    }

    fn generate(&self, _template: &str, data: &Value) -> Result<GeneratedOutput, GeneratorError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(GeneratedOutput {
            bytes: data.to_string().into_bytes(),
            content_type: self.kind.content_type().to_string(),
        })
    }
}

/// Converter that returns the HTML it was given, wrapped as fake PDF bytes.
#[derive(Default)]
pub struct FakeConverter;

impl HtmlToPdf for FakeConverter {
    fn convert(&self, html: &str, _options: &PdfOptions) -> Result<Vec<u8>, GeneratorError> {
        Ok(format!("%PDF-fake\n{html}").into_bytes())
    }
}

/// A service over in-memory repositories seeded with the customer CSV template.
pub struct TestHarness {
    pub templates: Arc<InMemoryTemplateRepository>,
    pub versions: Arc<InMemoryVersionRepository>,
    pub documents: Arc<MockDocumentStore>,
    pub publisher: Arc<MockPublisher>,
    pub compiler: Arc<CountingCompiler>,
    pub cache: Arc<SchemaCache>,
    pub service: DocumentService,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::build(
            MockDocumentStore::new(),
            MockPublisher::new(),
            GeneratorRegistry::with_defaults(Arc::new(FakeConverter)),
        )
    }

    pub fn build(
        documents: MockDocumentStore,
        publisher: MockPublisher,
        generators: GeneratorRegistry,
    ) -> Self {
        let templates = Arc::new(InMemoryTemplateRepository::new());
        let versions = Arc::new(InMemoryVersionRepository::new());
        templates.insert(csv_template());
        versions.insert(csv_version()).unwrap();

        let documents = Arc::new(documents);
        let publisher = Arc::new(publisher);
        let compiler = Arc::new(CountingCompiler::default());
        let cache = Arc::new(SchemaCache::new(16));
        let validator = SchemaValidator::with_compiler(cache.clone(), compiler.clone());

        let service = DocumentService::new(
            documents.clone(),
            templates.clone(),
            versions.clone(),
            validator,
            Arc::new(generators),
            publisher.clone(),
        );

        Self {
            templates,
            versions,
            documents,
            publisher,
            compiler,
            cache,
            service,
        }
    }
}
