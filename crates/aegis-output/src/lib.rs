//! # Aegis Output
//!
//! The output analyzer (spec component 6): PII regex detection, the
//! sensitive-data detector (credentials + internal-info), optional NER,
//! policy-violation derivation, and the `sanitizedOutput` masking pass
//! (spec §4.6/§4.6a).

pub mod analyzer;
pub mod error;
pub mod pii;
pub mod sensitive;

pub use analyzer::{NerEntityResult, OutputAnalysisResult, OutputAnalyzer};
pub use error::{OutputError, Result};
pub use pii::{mask_value, scan_pii, PiiFinding, PiiType};
pub use sensitive::{SensitiveCategory, SensitiveDataDetector, SensitiveFinding};
