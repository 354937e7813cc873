use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::{DocumentEvent, PublishError, Publisher};
use crate::entity::Document;

/// Publisher backed by a bounded tokio channel.
///
/// `publish` waits for buffer space and fails with [`PublishError::Closed`]
/// once the receiving worker has stopped or [`ChannelPublisher::close`] was called.
/// Clones share the same sender.
#[derive(Clone)]
pub struct ChannelPublisher {
    topic: String,
    sender: Arc<Mutex<Option<mpsc::Sender<DocumentEvent>>>>,
}

impl ChannelPublisher {
    pub fn new(topic: impl Into<String>, buffer: usize) -> (Self, mpsc::Receiver<DocumentEvent>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (
            Self {
                topic: topic.into(),
                sender: Arc::new(Mutex::new(Some(sender))),
            },
            receiver,
        )
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Drop the sender so the consumer drains what is queued and stops.
    pub fn close(&self) {
        if self.sender.lock().take().is_some() {
            log::info!("closing event channel for {}", self.topic);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.lock().as_ref().map_or(true, |s| s.is_closed())
    }
}

#[async_trait]
impl Publisher for ChannelPublisher {
    async fn publish(&self, document: &Document) -> Result<(), PublishError> {
        let event = DocumentEvent::from_document(&self.topic, document)?;
        let sender = self.sender.lock().clone().ok_or(PublishError::Closed)?;
        sender
            .send(event)
            .await
            .map_err(|_| PublishError::Closed)?;
        log::debug!(
            "published document {} (request '{}') to {}",
            document.id,
            document.request_id,
            self.topic
        );
        Ok(())
    }
}
