//! Document generation service: template resolution, payload validation,
//! rendering and the validate, persist, publish write path.

pub mod consumer;
pub mod context;
pub mod document_service;

pub use consumer::GenerationEventHandler;
pub use context::RequestContext;
pub use document_service::{DocumentService, RenderedDocument};
