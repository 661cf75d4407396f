use crate::document_loader::DocumentMetadata;
use crate::embedding::EmbeddingProvider;
use crate::error::{AppError, AppResult};
use crate::index::IndexDescriptor;
use crate::splitter::Chunk;
use uuid::Uuid;

/// One (vector, text, metadata) tuple as written to the index.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    /// Character offset of the chunk within its page.
    pub start_index: usize,
    pub metadata: DocumentMetadata,
}

/// Write side of a vector database. Batching and retries, if any, belong
/// to the implementation.
#[async_trait::async_trait]
pub trait VectorWriter: Send + Sync {
    async fn upsert(&self, index_name: &str, records: Vec<VectorRecord>) -> AppResult<()>;
}

/// Stable id so a re-run overwrites the same points.
pub fn point_id(chunk: &Chunk) -> String {
    let key = format!(
        "{}#{}#{}",
        chunk.metadata.source, chunk.metadata.page, chunk.chunk_index
    );
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).to_string()
}

/// Embed every chunk and write them all with a single upsert call.
///
/// Nothing is written unless every vector has the index's dimensionality.
/// A provider whose declared dimensionality is already wrong is rejected
/// before any text is embedded.
pub async fn upsert_chunks(
    chunks: &[Chunk],
    embedder: &dyn EmbeddingProvider,
    writer: &dyn VectorWriter,
    descriptor: &IndexDescriptor,
) -> AppResult<usize> {
    if chunks.is_empty() {
        tracing::info!("no chunks to upsert");
        return Ok(0);
    }

    let expected = descriptor.dimension as usize;
    if embedder.dimensions() != expected {
        return Err(AppError::DimensionMismatch {
            expected,
            actual: embedder.dimensions(),
        });
    }

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = embedder.embed(&texts).await?;
    if vectors.len() != chunks.len() {
        return Err(AppError::Embedding(format!(
            "{} returned {} vectors for {} chunks",
            embedder.provider_name(),
            vectors.len(),
            chunks.len()
        )));
    }

    if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
        return Err(AppError::DimensionMismatch {
            expected,
            actual: bad.len(),
        });
    }

    let records: Vec<VectorRecord> = chunks
        .iter()
        .zip(vectors)
        .map(|(chunk, vector)| VectorRecord {
            id: point_id(chunk),
            vector,
            text: chunk.text.clone(),
            start_index: chunk.start_index,
            metadata: chunk.metadata.clone(),
        })
        .collect();

    let count = records.len();
    writer.upsert(&descriptor.name, records).await?;
    tracing::info!("upserted {} vectors into '{}'", count, descriptor.name);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Metric;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct FixedEmbedder {
        dimensions: usize,
    }

    /// Declares 384 dimensions but returns vectors of another width.
    #[derive(Debug)]
    struct MislabelledEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for MislabelledEmbedder {
        fn provider_name(&self) -> &str {
            "mislabelled"
        }

        fn model_id(&self) -> &str {
            "mislabelled"
        }

        fn dimensions(&self) -> usize {
            384
        }

        async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|_| vec![0.0; 383]).collect())
        }
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        fn provider_name(&self) -> &str {
            "fixed"
        }

        fn model_id(&self) -> &str {
            "fixed"
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| vec![t.len() as f32; self.dimensions])
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingWriter {
        calls: Mutex<Vec<(String, Vec<VectorRecord>)>>,
    }

    #[async_trait::async_trait]
    impl VectorWriter for RecordingWriter {
        async fn upsert(&self, index_name: &str, records: Vec<VectorRecord>) -> AppResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push((index_name.to_string(), records));
            Ok(())
        }
    }

    fn chunk(text: &str, page: u32, chunk_index: usize) -> Chunk {
        Chunk {
            text: text.to_string(),
            metadata: DocumentMetadata {
                source: "Data/guide.pdf".to_string(),
                page,
            },
            chunk_index,
            start_index: chunk_index * 480,
        }
    }

    #[tokio::test]
    async fn test_single_write_with_all_records() {
        let chunks = vec![chunk("a", 0, 0), chunk("bb", 0, 1), chunk("ccc", 1, 0)];
        let writer = RecordingWriter::default();

        let count = upsert_chunks(
            &chunks,
            &FixedEmbedder { dimensions: 384 },
            &writer,
            &IndexDescriptor::default(),
        )
        .await
        .unwrap();

        assert_eq!(count, 3);
        let calls = writer.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (index_name, records) = &calls[0];
        assert_eq!(index_name, "medicalbot");
        assert_eq!(records[1].text, "bb");
        assert_eq!(records[1].vector, vec![2.0; 384]);
        assert_eq!(records[2].metadata.page, 1);
        assert_eq!(records[1].start_index, 480);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_writes_nothing() {
        let chunks = vec![chunk("a", 0, 0)];
        let writer = RecordingWriter::default();

        let result = upsert_chunks(
            &chunks,
            &FixedEmbedder { dimensions: 768 },
            &writer,
            &IndexDescriptor::default(),
        )
        .await;

        assert!(matches!(
            result,
            Err(AppError::DimensionMismatch {
                expected: 384,
                actual: 768
            })
        ));
        assert!(writer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_declared_dimension_checked_before_embedding() {
        #[derive(Debug)]
        struct Counting768(AtomicUsize);

        #[async_trait::async_trait]
        impl EmbeddingProvider for Counting768 {
            fn provider_name(&self) -> &str {
                "counting"
            }

            fn model_id(&self) -> &str {
                "counting"
            }

            fn dimensions(&self) -> usize {
                768
            }

            async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(texts.iter().map(|_| vec![0.0; 768]).collect())
            }
        }

        let embedder = Counting768(AtomicUsize::new(0));
        let writer = RecordingWriter::default();
        let result = upsert_chunks(
            &[chunk("a", 0, 0)],
            &embedder,
            &writer,
            &IndexDescriptor::default(),
        )
        .await;

        assert!(matches!(
            result,
            Err(AppError::DimensionMismatch {
                expected: 384,
                actual: 768
            })
        ));
        assert_eq!(embedder.0.load(Ordering::SeqCst), 0);
        assert!(writer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_returned_vector_width_still_checked() {
        let embedder = MislabelledEmbedder {
            calls: AtomicUsize::new(0),
        };
        let writer = RecordingWriter::default();
        let result = upsert_chunks(
            &[chunk("a", 0, 0)],
            &embedder,
            &writer,
            &IndexDescriptor::default(),
        )
        .await;

        assert!(matches!(
            result,
            Err(AppError::DimensionMismatch {
                expected: 384,
                actual: 383
            })
        ));
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
        assert!(writer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_chunk_set_is_a_no_op() {
        let writer = RecordingWriter::default();
        let count = upsert_chunks(
            &[],
            &FixedEmbedder { dimensions: 384 },
            &writer,
            &IndexDescriptor::new("medicalbot", 384, Metric::Cosine),
        )
        .await
        .unwrap();

        assert_eq!(count, 0);
        assert!(writer.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_point_ids_are_stable_and_distinct() {
        let first = point_id(&chunk("x", 0, 0));
        assert_eq!(first, point_id(&chunk("different text", 0, 0)));
        assert_ne!(first, point_id(&chunk("x", 0, 1)));
        assert_ne!(first, point_id(&chunk("x", 1, 0)));
        assert!(Uuid::parse_str(&first).is_ok());
    }
}
