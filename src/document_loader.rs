use crate::error::{AppError, AppResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Where a piece of text came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    pub source: String,
    /// Zero-based page index within `source`.
    pub page: u32,
}

/// Raw text of one PDF page.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub text: String,
    pub metadata: DocumentMetadata,
}

/// Load every `*.pdf` directly inside `dir`, one `Document` per page.
///
/// Files are visited in file-name order so repeated runs produce the same
/// document sequence.
pub fn load_pdf_directory(dir: impl AsRef<Path>) -> AppResult<Vec<Document>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(AppError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("data directory '{}' not found", dir.display()),
        )));
    }

    let mut documents = Vec::new();
    for path in pdf_files(dir)? {
        let pages = extract_pages(&path)?;
        tracing::debug!("{}: {} page(s)", path.display(), pages.len());
        documents.extend(documents_from_pages(&path, pages));
    }
    Ok(documents)
}

fn pdf_files(dir: &Path) -> AppResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| AppError::Io(std::io::Error::other(e.to_string())))?;
        if entry.file_type().is_file() && is_pdf(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Text of each page, in page order.
fn extract_pages(path: &Path) -> AppResult<Vec<String>> {
    let pdf = lopdf::Document::load(path)
        .map_err(|e| AppError::Document(format!("failed to open {}: {}", path.display(), e)))?;

    pdf.get_pages()
        .keys()
        .map(|&page_number| {
            pdf.extract_text(&[page_number]).map_err(|e| {
                AppError::Document(format!(
                    "failed to extract page {} of {}: {}",
                    page_number,
                    path.display(),
                    e
                ))
            })
        })
        .collect()
}

fn documents_from_pages(path: &Path, pages: Vec<String>) -> Vec<Document> {
    let source = path.display().to_string();
    pages
        .into_iter()
        .enumerate()
        .map(|(index, text)| Document {
            text,
            metadata: DocumentMetadata {
                source: source.clone(),
                page: index as u32,
            },
        })
        .collect()
}
