//! Deterministic embedding test double
//!
//! Feature-hashed bag of words: each lowercase alphanumeric token is hashed
//! into one of `dimensions` buckets with a hash-derived sign, then the vector
//! is L2-normalized. The same text always yields the same vector, and texts
//! sharing words score higher under cosine similarity.

use async_trait::async_trait;

use docqa_core::{EmbeddingModel, Result};

pub const FAKE_EMBEDDING_DIMENSIONS: usize = 4096;

#[derive(Debug, Clone)]
pub struct FakeEmbedding {
    dimensions: usize,
}

impl FakeEmbedding {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();
        let mut tokens = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .peekable();

        if tokens.peek().is_none() {
            self.add_token(&mut vector, &lowered);
        }
        for token in tokens {
            self.add_token(&mut vector, token);
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }

    fn add_token(&self, vector: &mut [f32], token: &str) {
        let digest = md5::compute(token.as_bytes());
        let bucket = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize
            % self.dimensions;
        let sign = if digest[4] & 1 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign;
    }
}

impl Default for FakeEmbedding {
    fn default() -> Self {
        Self::new(FAKE_EMBEDDING_DIMENSIONS)
    }
}

#[async_trait]
impl EmbeddingModel for FakeEmbedding {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_deterministic() {
        let model = FakeEmbedding::default();
        assert_eq!(model.embed_text("hello world"), model.embed_text("hello world"));
        assert_eq!(model.embed_text("hello world").len(), FAKE_EMBEDDING_DIMENSIONS);
    }

    #[test]
    fn test_unit_length() {
        let model = FakeEmbedding::new(64);
        let norm: f32 = model.embed_text("Some text, with punctuation!").iter().map(|x| x * x).sum();
        assert!((norm - 1.0).abs() < 1e-5);

        let norm: f32 = model.embed_text("").iter().map(|x| x * x).sum();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_shared_words_score_higher() {
        let model = FakeEmbedding::default();
        let query = model.embed_text("what does the document say about hello world?");
        let related = model.embed_text("hello world");
        let unrelated = model.embed_text("quarterly revenue projections");

        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_batch_matches_single() {
        let model = FakeEmbedding::default();
        let texts = vec!["alpha".to_string(), "beta gamma".to_string()];
        let batch = model.embed_batch(&texts).await.unwrap();
        assert_eq!(batch[1], model.embed_query("beta gamma").await.unwrap());
    }
}
