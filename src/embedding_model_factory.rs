use crate::all_minilm_l6_v2::{MODEL_ID, VECTOR_SIZE};
use crate::embedding::EmbeddingProvider;
use crate::error::{AppError, AppResult};
use fastembed::{
    read_file_to_bytes, EmbeddingModel, InitOptions, InitOptionsUserDefined, Pooling,
    TextEmbedding, TokenizerFiles, UserDefinedEmbeddingModel,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// all-MiniLM-L6-v2 running in-process through ONNX Runtime.
pub struct LocalEmbedder {
    model: Arc<TextEmbedding>,
}

impl std::fmt::Debug for LocalEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEmbedder")
            .field("model_id", &MODEL_ID)
            .finish()
    }
}

impl LocalEmbedder {
    /// Load from `model_dir` when it exists, otherwise from fastembed's
    /// model registry (downloaded into its cache on first use).
    pub fn load(model_dir: &Path) -> AppResult<Self> {
        let model = if model_dir.is_dir() {
            tracing::info!("loading local embedding model from {}", model_dir.display());
            get_model(model_dir)?
        } else {
            tracing::info!(
                "{} not found; loading {} from the fastembed cache",
                model_dir.display(),
                MODEL_ID
            );
            TextEmbedding::try_new(InitOptions::new(EmbeddingModel::AllMiniLML6V2))
                .map_err(|e| config_error(model_dir, e))?
        };
        Ok(Self {
            model: Arc::new(model),
        })
    }
}

pub fn get_model(base_path: &Path) -> AppResult<TextEmbedding> {
    let onnx_path = base_path.join("onnx").join("model.onnx");
    let tokenizer_path = base_path.join("tokenizer.json");
    let config_path = base_path.join("config.json");
    let special_tokens_map_path = base_path.join("special_tokens_map.json");
    let tokenizer_config_path = base_path.join("tokenizer_config.json");

    let read = |path: &PathBuf| read_file_to_bytes(path).map_err(|e| config_error(path, e));

    let onnx_bytes = read(&onnx_path)?;
    let tokenizer_files = TokenizerFiles {
        tokenizer_file: read(&tokenizer_path)?,
        config_file: read(&config_path)?,
        special_tokens_map_file: read(&special_tokens_map_path)?,
        tokenizer_config_file: read(&tokenizer_config_path)?,
    };

    let user_model =
        UserDefinedEmbeddingModel::new(onnx_bytes, tokenizer_files).with_pooling(Pooling::Mean);

    TextEmbedding::try_new_from_user_defined(user_model, InitOptionsUserDefined::default())
        .map_err(|e| config_error(base_path, e))
}

fn config_error(path: &Path, err: impl std::fmt::Display) -> AppError {
    AppError::Configuration(format!(
        "cannot load embedding model from {}: {}",
        path.display(),
        err
    ))
}

#[async_trait::async_trait]
impl EmbeddingProvider for LocalEmbedder {
    fn provider_name(&self) -> &str {
        "local"
    }

    fn model_id(&self) -> &str {
        MODEL_ID
    }

    fn dimensions(&self) -> usize {
        VECTOR_SIZE as usize
    }

    async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();
        tokio::task::spawn_blocking(move || model.embed(texts, None))
            .await
            .map_err(|e| AppError::Embedding(format!("embedding task failed: {}", e)))?
            .map_err(|e| AppError::Embedding(e.to_string()))
    }
}
