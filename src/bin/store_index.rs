use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use medicalbot::all_minilm_l6_v2::{INDEX_NAME, VECTOR_SIZE};
use medicalbot::config::IngestSettings;
use medicalbot::document_loader;
use medicalbot::embedding::{self, EmbeddingBackend};
use medicalbot::index::{self, IndexDescriptor, Metric, PollPolicy};
use medicalbot::logging;
use medicalbot::qdrant_util::QdrantIndex;
use medicalbot::splitter::{self, ChunkConfig};
use medicalbot::upsert;

/// Build the MedicalBot vector index from a directory of PDFs.
#[derive(Parser, Debug)]
#[command(name = "store_index", version)]
struct Args {
    /// Directory containing the source PDFs
    #[arg(long, env = "DATA_DIR", default_value = "Data/")]
    data_dir: PathBuf,

    #[arg(long, env = "INDEX_NAME", default_value = INDEX_NAME)]
    index_name: String,

    /// Log filter (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logging::init_logging(args.log_level.as_deref())?;

    let settings = IngestSettings::from_env()?;
    let store = QdrantIndex::connect(&settings.qdrant_url, &settings.qdrant_api_key)?;
    let descriptor = IndexDescriptor::new(args.index_name, VECTOR_SIZE, Metric::Cosine);

    index::provision_index(
        &store,
        &descriptor,
        &settings.placement,
        PollPolicy::default(),
    )
    .await?;

    let documents = document_loader::load_pdf_directory(&args.data_dir)?;
    tracing::info!("loaded {} document(s)", documents.len());

    let chunk_config = ChunkConfig::default();
    let chunks = splitter::split_documents(&documents, &chunk_config);
    tracing::info!(
        "split into {} chunks (size {}, overlap {})",
        chunks.len(),
        chunk_config.size(),
        chunk_config.overlap()
    );

    let backend = EmbeddingBackend::select(
        settings.hf_token.as_deref(),
        &settings.feature_extraction_url(),
        settings.local_model_dir.clone(),
    );
    let embedder = embedding::create_provider(&backend)?;
    tracing::info!(
        "embeddings ready: {} ({})",
        embedder.provider_name(),
        embedder.model_id()
    );

    upsert::upsert_chunks(&chunks, embedder.as_ref(), &store, &descriptor).await?;
    tracing::info!("upsert complete");
    Ok(())
}
