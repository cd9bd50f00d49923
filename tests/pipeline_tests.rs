/// Integration tests for the prediction pipeline, with the completion
/// service and the blob store replaced by in-process stubs.
///
/// Run with: cargo test --test pipeline_tests
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use hm_predictor::extract::{ExtractionError, FieldExtractor};
use hm_predictor::pipeline::{Pipeline, PipelineError};
use hm_predictor::store::BlobStore;
use hm_predictor::types::{ExtractedRecord, Outcome};
use hm_predictor::ModelStore;

const MODEL_KEY: &str = "models/latest.pkl";

// ---------- Stub collaborators ----------

struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fetches: AtomicUsize,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    fn with_object(key: &str, bytes: Vec<u8>) -> Self {
        let store = Self::new();
        store.objects.lock().insert(key.to_string(), bytes);
        store
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow!("no such key: {key}"))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.objects.lock().insert(key.to_string(), bytes);
        Ok(())
    }
}

struct FixedExtractor(ExtractedRecord);

#[async_trait]
impl FieldExtractor for FixedExtractor {
    async fn extract(&self, _text: &str) -> Result<ExtractedRecord, ExtractionError> {
        Ok(self.0.clone())
    }
}

struct FailingExtractor;

#[async_trait]
impl FieldExtractor for FailingExtractor {
    async fn extract(&self, _text: &str) -> Result<ExtractedRecord, ExtractionError> {
        Err(ExtractionError::Service("connection refused".to_string()))
    }
}

// ---------- Fixtures ----------

fn artifact_bytes(intercept: f64) -> Vec<u8> {
    let coefs: HashMap<&str, f64> = HashMap::from([
        ("intercept", intercept),
        ("coef_sex_male", 0.0),
        ("coef_age", 0.0),
        ("coef_time_5km_s", 0.0),
    ]);
    serde_pickle::to_vec(&coefs, serde_pickle::SerOptions::new()).unwrap()
}

fn record(sex: &str, age: f64, time: f64) -> ExtractedRecord {
    ExtractedRecord {
        sex: Some(sex.to_string()),
        age: Some(age),
        time_5km_s: Some(time),
    }
}

fn pipeline_with(extractor: impl FieldExtractor + 'static, store: Arc<MemoryStore>) -> Pipeline {
    Pipeline::new(
        Arc::new(extractor),
        ModelStore::new(store, MODEL_KEY),
    )
}

// ---------- Tests ----------

#[tokio::test]
async fn valid_input_runs_the_full_pipeline() {
    let store = Arc::new(MemoryStore::with_object(MODEL_KEY, artifact_bytes(5400.0)));
    let pipeline = pipeline_with(FixedExtractor(record("K", 29.0, 1350.0)), store.clone());

    let outcome = pipeline.predict_half_marathon("whatever").await.unwrap();
    match outcome {
        Outcome::Predicted {
            parsed,
            seconds,
            formatted,
        } => {
            assert_eq!(parsed, record("K", 29.0, 1350.0));
            assert_eq!(seconds, 5400.0);
            assert_eq!(formatted, "01:30:00");
        }
        other => panic!("expected Predicted, got {other:?}"),
    }
    assert_eq!(store.fetch_count(), 1);
}

#[tokio::test]
async fn invalid_sex_short_circuits_before_prediction() {
    let store = Arc::new(MemoryStore::with_object(MODEL_KEY, artifact_bytes(5400.0)));
    let pipeline = pipeline_with(FixedExtractor(record("X", 29.0, 1350.0)), store.clone());

    let outcome = pipeline.predict_half_marathon("whatever").await.unwrap();
    match outcome {
        Outcome::Rejected { parsed, errors } => {
            assert_eq!(parsed.sex.as_deref(), Some("X"));
            assert_eq!(errors, vec!["Missing or invalid sex (expected M or K)"]);
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    // the prediction stage never touched the store
    assert_eq!(store.fetch_count(), 0);
}

#[tokio::test]
async fn empty_record_reports_all_three_errors_in_order() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = pipeline_with(FixedExtractor(ExtractedRecord::default()), store.clone());

    let outcome = pipeline.predict_half_marathon("whatever").await.unwrap();
    let Outcome::Rejected { errors, .. } = outcome else {
        panic!("expected Rejected");
    };
    assert_eq!(
        errors,
        vec![
            "Missing or invalid sex (expected M or K)",
            "Missing or invalid age (expected 18-80)",
            "Missing or invalid 5 km time",
        ]
    );
    assert_eq!(store.fetch_count(), 0);
}

#[tokio::test]
async fn model_load_is_memoized_across_requests() {
    let store = Arc::new(MemoryStore::with_object(MODEL_KEY, artifact_bytes(5400.0)));
    let pipeline = pipeline_with(FixedExtractor(record("M", 35.0, 1500.0)), store.clone());

    for _ in 0..3 {
        let outcome = pipeline.predict_half_marathon("whatever").await.unwrap();
        assert!(matches!(outcome, Outcome::Predicted { .. }));
    }
    assert_eq!(store.fetch_count(), 1);
}

#[tokio::test]
async fn missing_artifact_surfaces_as_artifact_error() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = pipeline_with(FixedExtractor(record("M", 35.0, 1500.0)), store.clone());

    let err = pipeline.predict_half_marathon("whatever").await.unwrap_err();
    assert!(matches!(err, PipelineError::ArtifactLoad(_)));
    assert_eq!(err.kind(), "artifact");
}

#[tokio::test]
async fn failed_load_is_retried_on_the_next_request() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = pipeline_with(FixedExtractor(record("M", 35.0, 1500.0)), store.clone());

    assert!(pipeline.predict_half_marathon("whatever").await.is_err());

    store
        .put(MODEL_KEY, artifact_bytes(6000.0))
        .await
        .unwrap();
    let outcome = pipeline.predict_half_marathon("whatever").await.unwrap();
    let Outcome::Predicted { formatted, .. } = outcome else {
        panic!("expected Predicted after artifact became available");
    };
    assert_eq!(formatted, "01:40:00");
}

#[tokio::test]
async fn extractor_failure_propagates_with_extraction_kind() {
    let store = Arc::new(MemoryStore::with_object(MODEL_KEY, artifact_bytes(5400.0)));
    let pipeline = pipeline_with(FailingExtractor, store.clone());

    let err = pipeline.predict_half_marathon("whatever").await.unwrap_err();
    assert!(matches!(err, PipelineError::Extraction(_)));
    assert_eq!(err.kind(), "extraction");
    assert_eq!(store.fetch_count(), 0);
}

#[tokio::test]
async fn warm_up_populates_the_cache() {
    let store = Arc::new(MemoryStore::with_object(MODEL_KEY, artifact_bytes(5400.0)));
    let pipeline = pipeline_with(FixedExtractor(record("M", 35.0, 1500.0)), store.clone());

    pipeline.warm_up().await.unwrap();
    assert_eq!(store.fetch_count(), 1);

    pipeline.predict_half_marathon("whatever").await.unwrap();
    assert_eq!(store.fetch_count(), 1);
}
