//! Embedding provider capability and the choice between its two backends.

use crate::embedding_model_factory::LocalEmbedder;
use crate::error::AppResult;
use crate::inference_api::InferenceApiEmbedder;
use std::path::PathBuf;
use std::sync::Arc;

/// Anything that can turn a batch of texts into vectors.
///
/// Callers never need to know which backend they hold.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    fn provider_name(&self) -> &str;

    fn model_id(&self) -> &str;

    fn dimensions(&self) -> usize;

    /// One vector per input text, in input order.
    async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;
}

/// Which backend to build. Decided once, before any text is embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddingBackend {
    InferenceApi { token: String, endpoint: String },
    Local { model_dir: PathBuf },
}

impl EmbeddingBackend {
    /// Remote inference iff `token` has non-whitespace content.
    pub fn select(token: Option<&str>, endpoint: &str, model_dir: PathBuf) -> Self {
        match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => EmbeddingBackend::InferenceApi {
                token: token.to_string(),
                endpoint: endpoint.to_string(),
            },
            None => EmbeddingBackend::Local { model_dir },
        }
    }
}

pub fn create_provider(backend: &EmbeddingBackend) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match backend {
        EmbeddingBackend::InferenceApi { token, endpoint } => {
            let provider = InferenceApiEmbedder::new(token, endpoint)?;
            Ok(Arc::new(provider))
        }
        EmbeddingBackend::Local { model_dir } => {
            let provider = LocalEmbedder::load(model_dir)?;
            Ok(Arc::new(provider))
        }
    }
}
