//! Text chunking with configurable size and overlap.

use crate::types::ChunkCandidate;

/// Chunk text into overlapping segments.
///
/// Windows are measured in bytes and snapped to UTF-8 boundaries. A short
/// first window is kept (small FAQ files are one chunk); a short trailing
/// window (< 10% of `chunk_size`) is dropped since the previous window
/// already overlaps it.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<ChunkCandidate> {
    if text.trim().is_empty() || chunk_size == 0 {
        return vec![];
    }

    let mut chunks = Vec::new();
    let mut position = 0u32;
    let mut start = 0;

    let step = if chunk_size > overlap {
        chunk_size - overlap
    } else {
        chunk_size
    };

    while start < text.len() {
        let mut end = (start + chunk_size).min(text.len());
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            // chunk_size smaller than one character
            end = text[start..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| start + i)
                .unwrap_or(text.len());
        }

        let window = &text[start..end];

        if position > 0 && window.len() < chunk_size / 10 {
            break;
        }

        let trimmed = window.trim();
        if !trimmed.is_empty() {
            chunks.push(ChunkCandidate {
                position,
                text: trimmed.to_string(),
            });
            position += 1;
        }

        if end == text.len() {
            break;
        }

        let mut next_start = start + step;
        while next_start < text.len() && !text.is_char_boundary(next_start) {
            next_start += 1;
        }
        start = next_start;
    }

    tracing::debug!(
        "Chunked text into {} chunks (size: {}, overlap: {})",
        chunks.len(),
        chunk_size,
        overlap
    );

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_text_basic() {
        let text = "a".repeat(1000);
        let chunks = chunk_text(&text, 200, 50);

        assert!(!chunks.is_empty());
        assert_eq!(chunks[0].position, 0);
        assert_eq!(chunks[1].position, 1);
        assert_eq!(chunks[0].text.len(), 200);
    }

    #[test]
    fn test_chunk_text_no_overlap() {
        let text = "a".repeat(300);
        let chunks = chunk_text(&text, 100, 0);

        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_chunk_text_empty() {
        assert!(chunk_text("", 100, 10).is_empty());
        assert!(chunk_text("   \n", 100, 10).is_empty());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunks = chunk_text("Wi-Fi support hours are 9am-9pm", 1000, 200);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Wi-Fi support hours are 9am-9pm");
    }

    #[test]
    fn test_no_redundant_tail_chunk() {
        let text = "b".repeat(1000);
        let chunks = chunk_text(&text, 1000, 200);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_chunk_text_with_overlap() {
        let text = "abcdefghijklmnopqrstuvwxyz".repeat(10);
        let chunks = chunk_text(&text, 50, 10);

        assert!(chunks.len() >= 2);
        let first_tail: String = chunks[0].text.chars().skip(40).collect();
        assert!(chunks[1].text.starts_with(&first_tail));
    }

    #[test]
    fn test_chunk_text_utf8_boundaries() {
        let text = "é".repeat(300);
        let chunks = chunk_text(&text, 101, 11);

        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.text.chars().all(|ch| ch == 'é')));
    }
}
