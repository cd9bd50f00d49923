use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use hm_predictor::config::AppConfig;
use hm_predictor::server::{self, AppState};
use hm_predictor::store::BlobStore;
use hm_predictor::{ModelStore, OpenAiExtractor, Pipeline, SpacesStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = AppConfig::from_env()?;

    let store: Arc<dyn BlobStore> = Arc::new(SpacesStore::new(&cfg.spaces));
    let extractor = Arc::new(OpenAiExtractor::new(&cfg.llm));
    let pipeline = Arc::new(Pipeline::new(
        extractor,
        ModelStore::new(store, cfg.model_key.clone()),
    ));

    // Warm the model cache; if the artifact is unreachable now, keep serving
    // and let the first request retry the load.
    match pipeline.warm_up().await {
        Ok(()) => tracing::info!(key = %cfg.model_key, "model warmup ok"),
        Err(e) => tracing::warn!("model warmup failed: {e}"),
    }

    let app = server::router(AppState { pipeline });

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
