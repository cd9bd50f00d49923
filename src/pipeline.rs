use std::sync::Arc;

use thiserror::Error;

use crate::extract::{ExtractionError, FieldExtractor};
use crate::model::{ArtifactLoadError, ModelStore};
use crate::timefmt::seconds_to_time;
use crate::types::Outcome;
use crate::validate::validate;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    ArtifactLoad(#[from] ArtifactLoadError),
}

impl PipelineError {
    /// Stable tag the presentation layer matches on.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Extraction(_) => "extraction",
            PipelineError::ArtifactLoad(_) => "artifact",
        }
    }
}

/// Single-pass PARSE -> VALIDATE -> PREDICT pipeline. Collaborators are
/// injected at construction; the model is shared read-only across requests.
pub struct Pipeline {
    extractor: Arc<dyn FieldExtractor>,
    models: ModelStore,
}

impl Pipeline {
    pub fn new(extractor: Arc<dyn FieldExtractor>, models: ModelStore) -> Self {
        Self { extractor, models }
    }

    /// Run one request through the pipeline.
    ///
    /// Validation failures are an expected outcome, not an error: they stop
    /// the pipeline before prediction and carry the itemized messages.
    /// Extraction and artifact faults propagate as [`PipelineError`].
    pub async fn predict_half_marathon(&self, text: &str) -> Result<Outcome, PipelineError> {
        let parsed = self.extractor.extract(text).await?;

        let valid = match validate(&parsed) {
            Ok(valid) => valid,
            Err(errors) => {
                tracing::info!(?errors, "input rejected by validation");
                return Ok(Outcome::Rejected { parsed, errors });
            }
        };

        let model = self.models.get().await?;
        let seconds = model.predict(&valid);
        let formatted = seconds_to_time(seconds);
        tracing::info!(seconds, %formatted, "prediction produced");

        Ok(Outcome::Predicted {
            parsed,
            seconds,
            formatted,
        })
    }

    /// Trigger the memoized model load ahead of the first request.
    pub async fn warm_up(&self) -> Result<(), ArtifactLoadError> {
        self.models.get().await.map(|_| ())
    }
}
