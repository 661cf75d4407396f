pub mod all_minilm_l6_v2;
pub mod chat;
pub mod config;
pub mod document_loader;
pub mod embedding;
pub mod embedding_model_factory;
pub mod error;
pub mod index;
pub mod inference_api;
pub mod llm;
pub mod logging;
pub mod qdrant_util;
pub mod splitter;
pub mod upsert;
pub mod vector_mean;

pub use error::{AppError, AppResult};
