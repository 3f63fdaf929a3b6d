//! # Aegis ML
//!
//! WordPiece tokenizer and the ML inference-session abstraction (spec
//! component 2). Two models are recognized by name: `injection_classifier`
//! and `pii_detector`. Either may be absent; every decode function here
//! is pure and only ever consulted when a session is actually registered
//! — callers treat a missing session as "unavailable" and degrade
//! gracefully rather than erroring (spec §7).

pub mod classifier;
pub mod error;
pub mod ner;
pub mod session;
pub mod tokenizer;
pub mod vocab;

#[cfg(feature = "onnx")]
pub mod ort_session;

pub use classifier::{decode_injection_classification, softmax, INJECTION_LABELS};
pub use error::{MlError, Result};
pub use ner::{decode_bio, NerSpan, BIO_LABELS};
pub use session::{InferenceSession, MlRegistry, MockSession, NamedTensors, Tensor};
pub use tokenizer::{TokenizedInput, WordpieceTokenizer};
pub use vocab::Vocab;
