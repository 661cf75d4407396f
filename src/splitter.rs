use crate::all_minilm_l6_v2::{CHUNK_OVERLAP, CHUNK_SIZE};
use crate::document_loader::{Document, DocumentMetadata};
use crate::error::{AppError, AppResult};

/// Window size and overlap, both counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    size: usize,
    overlap: usize,
}

impl ChunkConfig {
    pub fn new(size: usize, overlap: usize) -> AppResult<Self> {
        if size == 0 || overlap >= size {
            return Err(AppError::Configuration(format!(
                "chunk overlap ({}) must be smaller than a non-zero chunk size ({})",
                overlap, size
            )));
        }
        Ok(Self { size, overlap })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    fn stride(&self) -> usize {
        self.size - self.overlap
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            size: CHUNK_SIZE,
            overlap: CHUNK_OVERLAP,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub metadata: DocumentMetadata,
    /// Position of this chunk within its document.
    pub chunk_index: usize,
    /// Character offset of the first character in the parent text.
    pub start_index: usize,
}

pub fn split_documents(documents: &[Document], config: &ChunkConfig) -> Vec<Chunk> {
    documents
        .iter()
        .flat_map(|document| split(document, config))
        .collect()
}

/// Cut one document into fixed windows; consecutive windows share exactly
/// `overlap` characters and only the last one may be shorter.
///
/// Windows holding nothing but whitespace are dropped; `chunk_index` counts
/// the chunks actually kept.
pub fn split(document: &Document, config: &ChunkConfig) -> Vec<Chunk> {
    if document.text.trim().is_empty() {
        return Vec::new();
    }

    // byte offset of every char, plus the end of the string
    let boundaries: Vec<usize> = document
        .text
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(document.text.len()))
        .collect();
    let char_count = boundaries.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + config.size).min(char_count);
        let text = &document.text[boundaries[start]..boundaries[end]];
        if !text.trim().is_empty() {
            chunks.push(Chunk {
                text: text.to_string(),
                metadata: document.metadata.clone(),
                chunk_index: chunks.len(),
                start_index: start,
            });
        }
        if end == char_count {
            break;
        }
        start += config.stride();
    }
    chunks
}
