use async_trait::async_trait;
use rig::completion::Prompt;
use rig::providers::openai;
use serde_json::Value;
use thiserror::Error;

use crate::config::LlmConfig;
use crate::types::ExtractedRecord;

// ---------- Errors ----------

#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The completion service call itself failed (network, auth, rate limit).
    #[error("completion service call failed: {0}")]
    Service(String),
    /// The service answered, but the payload is not a JSON object.
    #[error("completion response is not a JSON object: {0:?}")]
    MalformedResponse(String),
}

// ---------- Extractor seam ----------

/// Turns free text into a candidate record. The production implementation
/// delegates to a completion service; tests substitute fixed records.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<ExtractedRecord, ExtractionError>;
}

// ---------- Prompting ----------

const SYSTEM_PROMPT: &str = "You are a data extraction assistant. Reply with only a JSON object \
of the form {\"sex\": \"M\" or \"K\", \"age\": number, \"time_5km_s\": number}.";

fn build_prompt(text: &str) -> String {
    format!(
        "Extract the following fields from the user's text:\n\
         - sex: M for male, K for female\n\
         - age: age in whole years\n\
         - time_5km_s: the 5 km running time, ALWAYS in seconds (integer)\n\
         \n\
         TIME CONVERSION TO SECONDS:\n\
         - \"25 minutes\" / \"25 min\" -> 1500\n\
         - \"22:30\" (MM:SS format) -> 1350 (22*60 + 30)\n\
         - \"0:22:30\" (H:MM:SS format) -> 1350\n\
         - \"22 minutes 30 seconds\" -> 1350\n\
         - \"22.5 minutes\" -> 1350\n\
         \n\
         RULES:\n\
         1. Always convert the time to seconds\n\
         2. Use null for any field you cannot extract\n\
         3. Reply with ONLY valid JSON, no extra text\n\
         \n\
         User text: {text}"
    )
}

// ---------- OpenAI-compatible implementation ----------

pub struct OpenAiExtractor {
    agent: rig::agent::Agent<openai::CompletionModel>,
}

impl OpenAiExtractor {
    pub fn new(cfg: &LlmConfig) -> Self {
        let client = match cfg.base_url.as_deref() {
            Some(url) => openai::Client::from_url(&cfg.api_key, url),
            None => openai::Client::new(&cfg.api_key),
        };
        // temperature 0: we want the most deterministic answer the model offers
        let agent = client
            .agent(&cfg.model)
            .preamble(SYSTEM_PROMPT)
            .temperature(0.0)
            .build();
        Self { agent }
    }
}

#[async_trait]
impl FieldExtractor for OpenAiExtractor {
    async fn extract(&self, text: &str) -> Result<ExtractedRecord, ExtractionError> {
        let reply = self
            .agent
            .prompt(&build_prompt(text))
            .await
            .map_err(|e| ExtractionError::Service(e.to_string()))?;
        let payload = parse_object(&reply)?;
        Ok(ExtractedRecord::from_json(&payload))
    }
}

// ---------- Payload cleanup ----------

/// Parse the completion reply as a JSON object. Models occasionally wrap the
/// object in a markdown fence or a sentence of prose despite the instruction,
/// so after a direct parse fails we retry on a fence-stripped and then a
/// brace-delimited slice of the reply.
fn parse_object(raw: &str) -> Result<Value, ExtractionError> {
    let trimmed = raw.trim();

    for candidate in [
        Some(trimmed),
        strip_code_fence(trimmed),
        braced_fragment(trimmed),
    ]
    .into_iter()
    .flatten()
    {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(candidate) {
            return Ok(value);
        }
    }

    Err(ExtractionError::MalformedResponse(snippet(trimmed)))
}

fn strip_code_fence(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("```")?;
    // drop the info string ("json") on the opening fence line
    let body = rest.split_once('\n')?.1;
    let end = body.rfind("```")?;
    Some(body[..end].trim())
}

fn braced_fragment(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    for (i, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn snippet(text: &str) -> String {
    const MAX: usize = 120;
    if text.len() <= MAX {
        text.to_string()
    } else {
        let cut = text
            .char_indices()
            .take_while(|(i, _)| *i < MAX)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &text[..cut])
    }
}
