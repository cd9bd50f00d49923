//! Pushes the raw result CSVs to the bucket under the same keys the training
//! job reads them from.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use hm_predictor::config::SpacesConfig;
use hm_predictor::store::BlobStore;
use hm_predictor::SpacesStore;

const DATA_FILES: [&str; 2] = [
    "data/raw/halfmarathon_2023.csv",
    "data/raw/halfmarathon_2024.csv",
];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = SpacesConfig::from_env()?;
    let store = SpacesStore::new(&cfg);

    for key in DATA_FILES {
        let bytes = tokio::fs::read(key)
            .await
            .with_context(|| format!("failed to read {key}"))?;
        tracing::info!(key, size = bytes.len(), "uploading");
        store.put(key, bytes).await?;
    }

    tracing::info!("upload completed");
    Ok(())
}
