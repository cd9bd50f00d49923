use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::pipeline::Pipeline;
use crate::types::{ExtractedRecord, Outcome};

// ---------- Request/Response types ----------

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    success: bool,
    parsed_data: ExtractedRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prediction_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prediction_formatted: Option<String>,
}

impl From<Outcome> for PredictResponse {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Rejected { parsed, errors } => Self {
                success: false,
                parsed_data: parsed,
                errors: Some(errors),
                prediction_seconds: None,
                prediction_formatted: None,
            },
            Outcome::Predicted {
                parsed,
                seconds,
                formatted,
            } => Self {
                success: true,
                parsed_data: parsed,
                errors: None,
                prediction_seconds: Some(seconds),
                prediction_formatted: Some(formatted),
            },
        }
    }
}

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        .with_state(state)
}

// ---------- Handlers ----------

async fn health() -> &'static str {
    "ok"
}

async fn predict(
    State(state): State<AppState>,
    Json(payload): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<serde_json::Value>)> {
    if payload.text.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "text must not be empty" })),
        ));
    }

    let outcome = state
        .pipeline
        .predict_half_marathon(&payload.text)
        .await
        .map_err(|e| {
            tracing::error!(kind = e.kind(), "pipeline failure: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string(), "kind": e.kind() })),
            )
        })?;

    Ok(Json(outcome.into()))
}
