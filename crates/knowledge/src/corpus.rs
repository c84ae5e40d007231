//! Corpus loading: turn support documents on disk into chunked Documents.

use crate::chunker::chunk_text;
use crate::types::Document;
use helpdesk_core::{AppError, AppResult};
use std::path::Path;
use walkdir::WalkDir;

/// File extensions treated as corpus text.
const CORPUS_EXTENSIONS: [&str; 3] = ["txt", "md", "markdown"];

fn is_corpus_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| CORPUS_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Load a corpus from a single file or a directory tree.
///
/// Directories are walked in file-name order so the resulting document
/// order is deterministic. Unreadable files are skipped with a warning.
pub fn load_corpus(path: &Path, chunk_size: usize, overlap: usize) -> AppResult<Vec<Document>> {
    if !path.exists() {
        return Err(AppError::Knowledge(format!(
            "Corpus path does not exist: {}",
            path.display()
        )));
    }

    let mut documents = Vec::new();
    let mut files = 0usize;

    if path.is_file() {
        documents.extend(load_file(path, chunk_size, overlap)?);
        files += 1;
    } else {
        for entry in WalkDir::new(path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let entry_path = entry.path();
            if !entry_path.is_file() || !is_corpus_file(entry_path) {
                continue;
            }

            match load_file(entry_path, chunk_size, overlap) {
                Ok(chunks) => {
                    documents.extend(chunks);
                    files += 1;
                }
                Err(e) => tracing::warn!("Skipping {}: {}", entry_path.display(), e),
            }
        }
    }

    tracing::info!(
        "Loaded corpus from {}: {} files, {} passages",
        path.display(),
        files,
        documents.len()
    );

    Ok(documents)
}

fn load_file(path: &Path, chunk_size: usize, overlap: usize) -> AppResult<Vec<Document>> {
    let text = std::fs::read_to_string(path)?;
    let source = path.to_string_lossy().to_string();

    Ok(chunk_text(&text, chunk_size, overlap)
        .into_iter()
        .map(|c| Document::new(source.clone(), c.position, c.text))
        .collect())
}
