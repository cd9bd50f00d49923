use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    /// Alternate OpenAI-compatible endpoint; the provider default when unset.
    pub base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SpacesConfig {
    pub region: String,
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub spaces: SpacesConfig,
    pub model_key: String,
    pub port: u16,
}

fn require(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} not set"))
}

impl LlmConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_key: require("OPENAI_API_KEY")?,
            model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4".to_string()),
            base_url: env::var("LLM_BASE_URL").ok(),
        })
    }
}

impl SpacesConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            region: require("DO_SPACES_REGION")?,
            endpoint: require("DO_SPACES_ENDPOINT")?,
            access_key: require("DO_SPACES_KEY")?,
            secret_key: require("DO_SPACES_SECRET")?,
            bucket: require("DO_SPACES_BUCKET")?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            llm: LlmConfig::from_env()?,
            spaces: SpacesConfig::from_env()?,
            model_key: env::var("MODEL_KEY").unwrap_or_else(|_| "models/latest.pkl".to_string()),
            port: env::var("PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(8080),
        })
    }
}
