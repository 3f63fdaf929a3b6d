//! # Aegis RAG
//!
//! The RAG document scanner (spec component 7): hidden-directive,
//! invisible-character, and encoding-attack scanning (§4.7); embedding
//! integrity checks (§4.7a); semantic drift detection (§4.7b); and
//! document provenance / trust scoring (§4.7c).

pub mod drift;
pub mod embedding;
pub mod error;
pub mod provenance;
pub mod scanner;

pub use drift::{
    build_signature, compare_chunk_to_aggregate, compare_signatures, detect_drift, ContentSignature,
    DriftResult, DriftTypeHint,
};
pub use embedding::{
    compute_checksum, verify_embedding, EmbeddingIntegrityResult, EmbeddingIssue, EmbeddingIssueType,
    EmbeddingStats,
};
pub use error::{RagError, Result};
pub use provenance::{
    add_entry, base_trust_weight, check_access, compute_trust_score, create_provenance,
    mark_verified, needs_reverification,
};
pub use scanner::{scan_document, severity_weight, RagFinding, RagFindingType, ScanRequest, ScanResult};
