pub mod config;
pub mod entity;
pub mod error;
pub mod generators;
pub mod hashing;
pub mod publisher;
pub mod repository;
pub mod schema;
pub mod service;
pub mod state;

pub use crate::config::{AppConfig, ConfigError};
pub use crate::error::{DocgenError, ErrorKind, ErrorResponse};
pub use crate::service::{DocumentService, RenderedDocument, RequestContext};
pub use crate::state::{AppState, SeedFile};

use anyhow::Context;

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    log::info!(
        "Starting document generator (schema cache capacity {}, topic '{}')",
        config.schema_cache_capacity,
        config.event_topic
    );

    let seed_file = config.seed_file.clone();
    let (state, worker) = AppState::new(config);

    match seed_file {
        Some(path) => {
            let raw = tokio::fs::read(&path)
                .await
                .with_context(|| format!("reading seed file {}", path.display()))?;
            let seed: SeedFile = serde_json::from_slice(&raw)
                .with_context(|| format!("parsing seed file {}", path.display()))?;
            submit_seed(&state, seed).await?;
        }
        None => log::warn!("DOCGEN_SEED_FILE not set, nothing to generate"),
    }

    state.shutdown();
    let handled = worker.await.context("event worker panicked")?;
    log::info!(
        "Processed {} document events ({} documents stored)",
        handled,
        state.documents.len()
    );
    Ok(())
}

async fn submit_seed(state: &AppState, seed: SeedFile) -> anyhow::Result<()> {
    for template in seed.templates {
        state.register_template(template);
    }
    for version in seed.versions {
        state.register_version(version)?;
    }

    for mut request in seed.requests {
        if request.request_id.trim().is_empty() {
            request.request_id = uuid::Uuid::new_v4().to_string();
        }
        let ctx = RequestContext::with_timeout(state.config.request_timeout);
        match state.service.create(&ctx, request).await {
            Ok(document) => log::info!(
                "Accepted request '{}' as document {}",
                document.request_id,
                document.id
            ),
            Err(e) => {
                let response = ErrorResponse::from(&e);
                log::error!("Request rejected: {}", serde_json::to_string(&response)?);
            }
        }
    }
    Ok(())
}
