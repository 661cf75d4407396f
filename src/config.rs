//! Settings read from the process environment (after `.env` is loaded).
//!
//! Both settings types are built from a lookup function so that the
//! parsing rules can be exercised without touching the real environment.

use crate::all_minilm_l6_v2::{LOCAL_MODEL_DIR, MODEL_ID};
use crate::error::{AppError, AppResult};
use crate::index::Placement;
use std::path::PathBuf;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";
pub const DEFAULT_HF_INFERENCE_URL: &str = "https://router.huggingface.co/hf-inference/models";

/// Settings for the chat server.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// Optional at startup; a missing key fails each request instead.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
}

impl ChatSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            openai_api_key: non_blank(lookup("OPENAI_API_KEY")),
            openai_base_url: non_blank(lookup("OPENAI_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_model: non_blank(lookup("OPENAI_MODEL"))
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        }
    }
}

/// Settings for the offline ingestion run.
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub qdrant_url: String,
    pub qdrant_api_key: String,
    pub hf_token: Option<String>,
    pub hf_inference_url: String,
    pub local_model_dir: PathBuf,
    pub placement: Placement,
}

impl IngestSettings {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let qdrant_api_key = non_blank(lookup("QDRANT_API_KEY")).ok_or_else(|| {
            AppError::Configuration("QDRANT_API_KEY is not set".to_string())
        })?;

        let placement = Placement {
            shard_number: parse_u32(&lookup, "QDRANT_SHARDS", 1)?,
            replication_factor: parse_u32(&lookup, "QDRANT_REPLICATION", 1)?,
        };

        Ok(Self {
            qdrant_url: non_blank(lookup("QDRANT_URL"))
                .unwrap_or_else(|| DEFAULT_QDRANT_URL.to_string()),
            qdrant_api_key,
            hf_token: lookup("HUGGINGFACEHUB_API_TOKEN"),
            hf_inference_url: non_blank(lookup("HF_INFERENCE_URL"))
                .unwrap_or_else(|| DEFAULT_HF_INFERENCE_URL.to_string()),
            local_model_dir: non_blank(lookup("LOCAL_MODEL_DIR"))
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(LOCAL_MODEL_DIR)),
            placement,
        })
    }

    /// Full feature-extraction URL for the configured embedding model.
    pub fn feature_extraction_url(&self) -> String {
        format!(
            "{}/{}/pipeline/feature-extraction",
            self.hf_inference_url.trim_end_matches('/'),
            MODEL_ID
        )
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_u32<F>(lookup: &F, key: &str, default: u32) -> AppResult<u32>
where
    F: Fn(&str) -> Option<String>,
{
    match non_blank(lookup(key)) {
        None => Ok(default),
        Some(raw) => match raw.parse::<u32>() {
            Ok(0) | Err(_) => Err(AppError::Configuration(format!(
                "{} must be a positive integer, got '{}'",
                key, raw
            ))),
            Ok(n) => Ok(n),
        },
    }
}
