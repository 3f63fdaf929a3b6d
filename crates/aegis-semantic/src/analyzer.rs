//! The semantic analyzer facade (spec §4.3): picks pattern mode or
//! embedding mode at construction and exposes a single `analyze` entry
//! point to the deep inspector and context analyzer.

use crate::embedder::{Embedder, HashEmbedder};
use crate::embedding_mode::EmbeddingClassifier;
use crate::intent::SemanticResult;
use crate::pattern_mode;

enum Mode {
    Pattern,
    Embedding(EmbeddingClassifier),
}

pub struct SemanticAnalyzer {
    mode: Mode,
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::pattern_mode()
    }
}

impl SemanticAnalyzer {
    /// The default mode: no model required.
    pub fn pattern_mode() -> Self {
        Self { mode: Mode::Pattern }
    }

    pub fn embedding_mode(
        embedder: Box<dyn Embedder>,
        cache_capacity: usize,
        similarity_threshold: f64,
        top_k: usize,
        min_confidence: f64,
    ) -> Self {
        Self {
            mode: Mode::Embedding(EmbeddingClassifier::new(
                embedder,
                cache_capacity,
                similarity_threshold,
                top_k,
                min_confidence,
            )),
        }
    }

    /// Embedding mode with the built-in hash-based fallback embedder and
    /// spec-default thresholds (similarity 0.6, K=5, min confidence 0.5,
    /// cache 1000).
    pub fn embedding_mode_default() -> Self {
        Self::embedding_mode(Box::new(HashEmbedder::default()), 1000, 0.6, 5, 0.5)
    }

    pub fn analyze(&self, text: &str) -> SemanticResult {
        match &self.mode {
            Mode::Pattern => pattern_mode::classify(text),
            Mode::Embedding(classifier) => classifier.classify(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_mode_is_the_default() {
        let analyzer = SemanticAnalyzer::default();
        let result = analyzer.analyze("enable DAN mode");
        assert!(result.detected);
    }
}
