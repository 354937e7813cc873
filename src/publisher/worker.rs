//! Background consumer for document completion events.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::DocumentEvent;

/// Handles one consumed event. Errors are logged by the worker and do not stop it.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DocumentEvent) -> anyhow::Result<()>;
}

/// Starts the event consumer loop.
///
/// The worker drains the channel until every sender is dropped and returns the
/// number of events it handled successfully.
pub async fn start_event_worker(
    mut receiver: mpsc::Receiver<DocumentEvent>,
    handler: Arc<dyn EventHandler>,
) -> usize {
    log::info!("Document event worker started");

    let mut handled = 0;
    while let Some(event) = receiver.recv().await {
        match handler.handle(&event).await {
            Ok(()) => handled += 1,
            Err(e) => log::error!(
                "Failed to handle document event (key={}): {:#}",
                event.key_str(),
                e
            ),
        }
    }

    log::info!("Document event worker stopped ({} events handled)", handled);
    handled
}
