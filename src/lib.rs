//! Half-marathon time prediction backend.
//!
//! Free text goes in, a structured record comes out of a completion-service
//! call, fixed domain rules validate it, and a pickled regression artifact
//! fetched from object storage turns it into a predicted finishing time.

pub mod config;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod server;
pub mod store;
pub mod timefmt;
pub mod types;
pub mod validate;

pub use extract::{ExtractionError, FieldExtractor, OpenAiExtractor};
pub use model::{ArtifactLoadError, ModelStore, RegressionModel};
pub use pipeline::{Pipeline, PipelineError};
pub use store::{BlobStore, SpacesStore};
pub use types::{ExtractedRecord, Outcome, Sex, ValidatedRecord};
