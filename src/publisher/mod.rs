//! Completion events for persisted documents.
//!
//! [`Publisher`] is the outbound contract used by the generation service.
//! [`ChannelPublisher`] hands events to an in-process consumer started with
//! [`start_event_worker`].

pub mod channel;
pub mod worker;

pub use channel::ChannelPublisher;
pub use worker::{start_event_worker, EventHandler};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::{Document, DocumentStatus};

pub const DEFAULT_EVENT_TOPIC: &str = "document.generated";

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("event channel is closed")]
    Closed,
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("broker rejected event: {0}")]
    Rejected(String),
}

/// Emits one completion event per call. Retries, if any, are the implementation's concern.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, document: &Document) -> Result<(), PublishError>;
}

/// Body of a completion event.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DocumentEventBody {
    pub document_id: i64,
    pub request_id: String,
    pub template_code: String,
    pub template_version: Option<i64>,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Document> for DocumentEventBody {
    fn from(doc: &Document) -> Self {
        Self {
            document_id: doc.id,
            request_id: doc.request_id.clone(),
            template_code: doc.template_code.clone(),
            template_version: doc.template_version,
            status: doc.status,
            created_at: doc.created_at,
        }
    }
}

/// A keyed message ready for a broker: key is the request id, value the JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentEvent {
    pub topic: String,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl DocumentEvent {
    pub fn from_document(topic: &str, document: &Document) -> Result<Self, PublishError> {
        let body = DocumentEventBody::from(document);
        Ok(Self {
            topic: topic.to_string(),
            key: document.request_id.as_bytes().to_vec(),
            value: serde_json::to_vec(&body)?,
        })
    }

    pub fn body(&self) -> Result<DocumentEventBody, PublishError> {
        Ok(serde_json::from_slice(&self.value)?)
    }

    pub fn key_str(&self) -> String {
        String::from_utf8_lossy(&self.key).into_owned()
    }
}
