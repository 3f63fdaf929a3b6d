//! The inference-session abstraction (spec §4.2): `run(feeds) -> named
//! tensors`. Either model may be absent; callers degrade gracefully.

use crate::error::Result;
use crate::tokenizer::TokenizedInput;
use std::collections::HashMap;

/// A named output tensor with its shape, e.g. `[1, L]` for the
/// classifier or `[1, seqLen, L]` for the NER model.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

pub type NamedTensors = HashMap<String, Tensor>;

/// An ML backend capable of running one named model. One session per
/// model; sessions are assumed thread-safe by construction (spec §5).
pub trait InferenceSession: Send + Sync {
    fn model_name(&self) -> &str;
    fn run(&self, feeds: &TokenizedInput) -> Result<NamedTensors>;
}

/// A deterministic stand-in session, used when no real model is loaded
/// and in tests. Returns whatever tensor was configured at construction
/// regardless of input, so callers can exercise the decode logic without
/// a real ONNX model on disk.
pub struct MockSession {
    name: String,
    fixed_output: NamedTensors,
}

impl MockSession {
    pub fn new(name: impl Into<String>, fixed_output: NamedTensors) -> Self {
        Self {
            name: name.into(),
            fixed_output,
        }
    }

    /// A mock injection classifier that always reports "normal".
    pub fn normal_injection_classifier() -> Self {
        let mut tensors = HashMap::new();
        tensors.insert(
            "logits".to_string(),
            Tensor {
                shape: vec![1, 5],
                data: vec![5.0, 0.0, 0.0, 0.0, 0.0],
            },
        );
        Self::new("injection_classifier", tensors)
    }

    /// A mock PII detector that always reports all-`O` (no entities).
    pub fn empty_pii_detector(seq_len: usize) -> Self {
        let mut tensors = HashMap::new();
        let labels = 7; // O, B-PER, I-PER, B-LOC, I-LOC, B-ORG, I-ORG
        let mut data = vec![0.0f32; seq_len * labels];
        for pos in 0..seq_len {
            data[pos * labels] = 5.0; // O dominates
        }
        tensors.insert(
            "logits".to_string(),
            Tensor {
                shape: vec![1, seq_len, labels],
                data,
            },
        );
        Self::new("pii_detector", tensors)
    }
}

impl InferenceSession for MockSession {
    fn model_name(&self) -> &str {
        &self.name
    }

    fn run(&self, _feeds: &TokenizedInput) -> Result<NamedTensors> {
        Ok(self.fixed_output.clone())
    }
}

/// A registry of loaded sessions, keyed by model name. Empty by default;
/// the deep inspector and output analyzer treat a missing session as
/// "model unavailable" and degrade gracefully rather than erroring.
#[derive(Default)]
pub struct MlRegistry {
    sessions: HashMap<String, Box<dyn InferenceSession>>,
}

impl MlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, session: Box<dyn InferenceSession>) {
        self.sessions.insert(session.model_name().to_string(), session);
    }

    pub fn get(&self, model_name: &str) -> Option<&dyn InferenceSession> {
        self.sessions.get(model_name).map(|s| s.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_returns_none_for_unregistered_model() {
        let registry = MlRegistry::new();
        assert!(registry.get("injection_classifier").is_none());
    }

    #[test]
    fn registry_returns_registered_session() {
        let mut registry = MlRegistry::new();
        registry.register(Box::new(MockSession::normal_injection_classifier()));
        assert!(registry.get("injection_classifier").is_some());
    }
}
