//! Word-window text splitter

use regex::Regex;
use std::sync::LazyLock;

use docqa_core::{Error, IndexingConfig, Result};

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+").expect("valid word pattern"));

/// Splits text into overlapping windows of whole words.
///
/// Chunks are slices of the original text, so line breaks and spacing inside
/// a chunk are preserved.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Configuration("CHUNK_SIZE must be at least 1".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::Configuration(format!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn from_config(config: &IndexingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Split `text` into chunks; whitespace-only text yields none
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let words: Vec<_> = WORD.find_iter(text).collect();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < words.len() {
            let end = (start + self.chunk_size).min(words.len());
            chunks.push(&text[words[start].start()..words[end - 1].end()]);

            if end >= words.len() {
                break;
            }

            start = end - self.chunk_overlap;
        }

        chunks
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        let config = IndexingConfig::default();
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = TextSplitter::default();
        assert_eq!(splitter.split("hello world"), vec!["hello world"]);
    }

    #[test]
    fn test_blank_text_has_no_chunks() {
        let splitter = TextSplitter::default();
        assert!(splitter.split("").is_empty());
        assert!(splitter.split(" \n\t ").is_empty());
    }

    #[test]
    fn test_windows_overlap() {
        let splitter = TextSplitter::new(4, 1).unwrap();
        let chunks = splitter.split("one two three four five six seven eight nine");
        assert_eq!(
            chunks,
            vec![
                "one two three four",
                "four five six seven",
                "seven eight nine",
            ]
        );
    }

    #[test]
    fn test_chunks_keep_original_spacing() {
        let splitter = TextSplitter::new(3, 0).unwrap();
        let chunks = splitter.split("line one\nline  two\n\nline three");
        assert_eq!(chunks, vec!["line one\nline", "two\n\nline three"]);
    }

    #[test]
    fn test_invalid_settings() {
        assert!(TextSplitter::new(0, 0).is_err());
        assert!(TextSplitter::new(10, 10).is_err());
        assert!(TextSplitter::new(10, 9).is_ok());
    }
}
