//! Consumer side of completion events: render the stored request and record
//! its terminal outcome.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

use super::{DocumentService, RequestContext};
use crate::generators::common::sanitize_filename;
use crate::generators::GeneratorKind;
use crate::publisher::{DocumentEvent, EventHandler};

pub struct GenerationEventHandler {
    service: DocumentService,
    output_dir: Option<PathBuf>,
    timeout: Duration,
}

impl GenerationEventHandler {
    pub fn new(service: DocumentService, timeout: Duration) -> Self {
        Self {
            service,
            output_dir: None,
            timeout,
        }
    }

    /// Also write rendered files into `dir`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Write `bytes` into the output directory, if one is configured.
    async fn write_output(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> std::io::Result<Option<PathBuf>> {
        let Some(dir) = &self.output_dir else {
            return Ok(None);
        };
        let path = dir.join(file_name);
        tokio::fs::write(&path, bytes).await?;
        Ok(Some(path))
    }
}

#[async_trait]
impl EventHandler for GenerationEventHandler {
    async fn handle(&self, event: &DocumentEvent) -> anyhow::Result<()> {
        let body = event.body()?;
        let ctx = RequestContext::with_timeout(self.timeout);
        let mut document = self.service.get(&ctx, body.document_id).await?;

        if document.status.is_terminal() {
            log::debug!("document {} already {}, skipping", document.id, document.status);
            return Ok(());
        }

        let version_id = document
            .template_version
            .ok_or_else(|| anyhow::anyhow!("document {} has no template version", document.id))?;

        match self
            .service
            .generate_by_version_id(&ctx, version_id, document.payload.clone())
            .await
        {
            Ok(rendered) => {
                let extension =
                    GeneratorKind::from_output_format(&rendered.template.output_format)
                        .file_extension();
                let file_name = format!(
                    "{}-{}.{}",
                    sanitize_filename(&rendered.template.code, "document"),
                    sanitize_filename(&document.request_id, "request"),
                    extension
                );

                match self.write_output(&file_name, &rendered.bytes).await {
                    Ok(path) => {
                        document.file_path = path.map(|p| p.display().to_string());
                        document.mark_generated(
                            &rendered.bytes,
                            &rendered.content_type,
                            &file_name,
                        );
                    }
                    Err(e) => {
                        log::warn!("could not store output of document {}: {}", document.id, e);
                        document.mark_failed(format!("failed to write {file_name}: {e}"));
                    }
                }
            }
            Err(e) => {
                log::warn!("generation failed for document {}: {}", document.id, e);
                document.mark_failed(e.to_string());
            }
        }

        // the render deadline may already have passed
        let ctx = RequestContext::with_timeout(self.timeout);
        let recorded = self.service.record_outcome(&ctx, document).await?;
        log::info!(
            "document {} (request '{}') is {}",
            recorded.id,
            recorded.request_id,
            recorded.status
        );
        Ok(())
    }
}
