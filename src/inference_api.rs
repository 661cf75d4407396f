//! Hugging Face Inference API embedding backend.
//!
//! Posts batches to the hosted `feature-extraction` pipeline. Most
//! sentence-transformers deployments return one pooled vector per input;
//! some return per-token vectors instead, which are mean-pooled here.

use crate::all_minilm_l6_v2::{MODEL_ID, VECTOR_SIZE};
use crate::embedding::EmbeddingProvider;
use crate::error::{AppError, AppResult};
use crate::vector_mean;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const BATCH_SIZE: usize = 32;

#[derive(Debug, Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
    options: RequestOptions,
}

#[derive(Debug, Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeatureExtractionResponse {
    Pooled(Vec<Vec<f32>>),
    TokenLevel(Vec<Vec<Vec<f32>>>),
}

impl FeatureExtractionResponse {
    fn into_sentence_vectors(self) -> AppResult<Vec<Vec<f32>>> {
        match self {
            FeatureExtractionResponse::Pooled(vectors) => Ok(vectors),
            FeatureExtractionResponse::TokenLevel(per_input) => per_input
                .into_iter()
                .map(vector_mean::mean_pool)
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct InferenceApiEmbedder {
    client: Client,
    endpoint: String,
    token: String,
}

impl std::fmt::Debug for InferenceApiEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceApiEmbedder")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl InferenceApiEmbedder {
    pub fn new(token: impl Into<String>, endpoint: impl Into<String>) -> AppResult<Self> {
        let client = Client::builder().build().map_err(|e| {
            AppError::Configuration(format!("failed to build inference HTTP client: {}", e))
        })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    #[instrument(skip(self, batch), fields(batch_size = batch.len()))]
    async fn embed_batch(&self, batch: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let request = FeatureExtractionRequest {
            inputs: batch,
            options: RequestOptions {
                wait_for_model: true,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("inference request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Embedding(format!(
                "inference API error ({}): {}",
                status, error_text
            )));
        }

        let body: FeatureExtractionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("unexpected inference response: {}", e)))?;
        let vectors = body.into_sentence_vectors()?;

        if vectors.len() != batch.len() {
            return Err(AppError::Embedding(format!(
                "inference API returned {} vectors for {} inputs",
                vectors.len(),
                batch.len()
            )));
        }
        Ok(vectors)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for InferenceApiEmbedder {
    fn provider_name(&self) -> &str {
        "hf-inference"
    }

    fn model_id(&self) -> &str {
        MODEL_ID
    }

    fn dimensions(&self) -> usize {
        VECTOR_SIZE as usize
    }

    async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(BATCH_SIZE) {
            embeddings.extend(self.embed_batch(batch).await?);
        }
        debug!("embedded {} texts via inference API", embeddings.len());
        Ok(embeddings)
    }
}
