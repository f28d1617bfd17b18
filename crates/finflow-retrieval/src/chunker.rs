//! Text chunking for ingestion
//!
//! Splits long documents into overlapping chunks before embedding so each
//! stored vector covers a focused span of text. Splits prefer word
//! boundaries; a chunk never ends mid-word unless a single word exceeds the
//! chunk size.

/// Word-boundary-aware chunker with overlap
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

impl Chunker {
    /// Create a chunker; `overlap` is clamped below `chunk_size`
    #[must_use]
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
        }
    }

    /// Split `text` into chunks of at most `chunk_size` characters
    ///
    /// Consecutive chunks share roughly `overlap` characters. Whitespace-only
    /// input yields no chunks.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let mut end = start;
            let mut len = 0;
            while end < words.len() {
                let add = words[end].len() + usize::from(end > start);
                if len + add > self.chunk_size && end > start {
                    break;
                }
                len += add;
                end += 1;
            }

            chunks.push(words[start..end].join(" "));
            if end == words.len() {
                break;
            }

            // Step back far enough to carry ~overlap characters forward.
            let mut carried = 0;
            let mut next_start = end;
            while next_start > start + 1 && carried < self.overlap {
                next_start -= 1;
                carried += words[next_start].len() + 1;
            }
            start = next_start;
        }
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let chunker = Chunker::default();
        let chunks = chunker.split("a short document");
        assert_eq!(chunks, vec!["a short document".to_string()]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(Chunker::default().split("   \n ").is_empty());
    }

    #[test]
    fn chunks_respect_size_bound() {
        let chunker = Chunker::new(50, 10);
        let text = "word ".repeat(100);
        for chunk in chunker.split(&text) {
            assert!(chunk.len() <= 50, "chunk too long: {}", chunk.len());
        }
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let chunker = Chunker::new(40, 15);
        let text: String = (0..40).map(|i| format!("w{i} ")).collect();
        let chunks = chunker.split(&text);
        assert!(chunks.len() > 1);

        for pair in chunks.windows(2) {
            let tail_word = pair[0].split_whitespace().last().unwrap();
            assert!(
                pair[1].contains(tail_word),
                "expected '{}' carried into next chunk",
                tail_word
            );
        }
    }

    #[test]
    fn oversized_word_still_emitted() {
        let chunker = Chunker::new(5, 2);
        let chunks = chunker.split("supercalifragilistic");
        assert_eq!(chunks.len(), 1);
    }
}
