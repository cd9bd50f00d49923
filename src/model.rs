use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::store::BlobStore;
use crate::types::{Sex, ValidatedRecord};

#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("failed to fetch model artifact: {0}")]
    Fetch(String),
    #[error("failed to decode model artifact: {0}")]
    Decode(String),
}

/// Trained half-marathon regression, decoded from the pickled artifact the
/// training job publishes: an intercept plus one coefficient per feature.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegressionModel {
    pub intercept: f64,
    pub coef_sex_male: f64,
    pub coef_age: f64,
    pub coef_time_5km_s: f64,
}

impl RegressionModel {
    pub fn from_pickle(bytes: &[u8]) -> Result<Self, ArtifactLoadError> {
        let model: Self = serde_pickle::from_slice(bytes, serde_pickle::DeOptions::new())
            .map_err(|e| ArtifactLoadError::Decode(e.to_string()))?;
        let coefs = [
            model.intercept,
            model.coef_sex_male,
            model.coef_age,
            model.coef_time_5km_s,
        ];
        if coefs.iter().any(|c| !c.is_finite()) {
            return Err(ArtifactLoadError::Decode(
                "artifact contains a non-finite coefficient".to_string(),
            ));
        }
        Ok(model)
    }

    /// Predicted half-marathon time in seconds. Total over validated records:
    /// sex one-hot, age and time as-is.
    pub fn predict(&self, rec: &ValidatedRecord) -> f64 {
        let sex_male = if rec.sex == Sex::Male { 1.0 } else { 0.0 };
        self.intercept
            + self.coef_sex_male * sex_male
            + self.coef_age * rec.age
            + self.coef_time_5km_s * rec.time_5km_s
    }
}

/// Once-initialized holder for the shared model instance.
///
/// The artifact is fetched and decoded at most once per process, even when
/// the first calls race; afterwards every caller gets the same `Arc`. A
/// failed load is not cached, so the next request retries.
pub struct ModelStore {
    store: Arc<dyn BlobStore>,
    key: String,
    cell: OnceCell<Arc<RegressionModel>>,
}

impl ModelStore {
    pub fn new(store: Arc<dyn BlobStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            cell: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Result<Arc<RegressionModel>, ArtifactLoadError> {
        let model = self
            .cell
            .get_or_try_init(|| async {
                let bytes = self
                    .store
                    .get(&self.key)
                    .await
                    .map_err(|e| ArtifactLoadError::Fetch(format!("{e:#}")))?;
                let model = RegressionModel::from_pickle(&bytes)?;
                tracing::info!(key = %self.key, "model artifact loaded");
                Ok(Arc::new(model))
            })
            .await?;
        Ok(model.clone())
    }
}
