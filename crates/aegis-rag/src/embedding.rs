//! Embedding integrity checking (spec §4.7a): dimension, NaN/Inf, zero-
//! vector, outlier, and checksum issues, plus always-present stats.

use aegis_core::{EmbeddingVector, RiskLevel};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingIssueType {
    DimensionMismatch,
    NanValues,
    InfValues,
    ZeroVector,
    Outlier,
    ChecksumMismatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingIssue {
    #[serde(rename = "type")]
    pub issue_type: EmbeddingIssueType,
    pub severity: RiskLevel,
    pub description: String,
    pub indices: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingStats {
    pub dimension: usize,
    pub magnitude: f64,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub sparsity: f64,
}

impl EmbeddingStats {
    fn zero(dimension: usize) -> Self {
        Self {
            dimension,
            magnitude: 0.0,
            mean: 0.0,
            std: 0.0,
            min: 0.0,
            max: 0.0,
            sparsity: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingIntegrityResult {
    pub is_valid: bool,
    pub issues: Vec<EmbeddingIssue>,
    pub stats: EmbeddingStats,
}

/// `sha256(little-endian f64 bytes)`, first 16 hex chars (spec §4.7a).
pub fn compute_checksum(values: &[f32]) -> String {
    let mut hasher = Sha256::new();
    for v in values {
        hasher.update((*v as f64).to_le_bytes());
    }
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..16].to_string()
}

fn compute_stats(values: &[f32]) -> EmbeddingStats {
    if values.is_empty() {
        return EmbeddingStats::zero(0);
    }
    let n = values.len() as f64;
    let magnitude = (values.iter().map(|v| (*v as f64).powi(2)).sum::<f64>()).sqrt();
    let mean = values.iter().map(|v| *v as f64).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|v| (*v as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let std = variance.sqrt();
    let min = values.iter().cloned().fold(f32::INFINITY, f32::min) as f64;
    let max = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max) as f64;
    let zeros = values.iter().filter(|v| **v == 0.0).count();
    let sparsity = zeros as f64 / n;
    EmbeddingStats {
        dimension: values.len(),
        magnitude,
        mean,
        std,
        min,
        max,
        sparsity,
    }
}

/// Checks an embedding's integrity (spec §4.7a). `expected_dimension`,
/// when given, is compared separately from the vector's own declared
/// `dimension` field.
pub fn verify_embedding(
    embedding: &EmbeddingVector,
    expected_dimension: Option<usize>,
) -> EmbeddingIntegrityResult {
    let values = &embedding.values;
    let mut issues = Vec::new();

    if values.len() != embedding.dimension {
        issues.push(EmbeddingIssue {
            issue_type: EmbeddingIssueType::DimensionMismatch,
            severity: RiskLevel::Critical,
            description: format!(
                "declared dimension {} but vector has {} values",
                embedding.dimension,
                values.len()
            ),
            indices: Vec::new(),
        });
    }
    if let Some(expected) = expected_dimension {
        if values.len() != expected {
            issues.push(EmbeddingIssue {
                issue_type: EmbeddingIssueType::DimensionMismatch,
                severity: RiskLevel::High,
                description: format!(
                    "expected dimension {} but vector has {} values",
                    expected,
                    values.len()
                ),
                indices: Vec::new(),
            });
        }
    }

    let nan_indices: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_nan())
        .map(|(i, _)| i)
        .take(10)
        .collect();
    if !nan_indices.is_empty() {
        issues.push(EmbeddingIssue {
            issue_type: EmbeddingIssueType::NanValues,
            severity: RiskLevel::Critical,
            description: format!("{} NaN value(s) found", nan_indices.len()),
            indices: nan_indices,
        });
    }

    let inf_indices: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_infinite())
        .map(|(i, _)| i)
        .take(10)
        .collect();
    if !inf_indices.is_empty() {
        issues.push(EmbeddingIssue {
            issue_type: EmbeddingIssueType::InfValues,
            severity: RiskLevel::Critical,
            description: format!("{} Inf value(s) found", inf_indices.len()),
            indices: inf_indices,
        });
    }

    let finite_values: Vec<f32> = values.iter().cloned().filter(|v| v.is_finite()).collect();
    let stats = compute_stats(&finite_values);

    if !finite_values.is_empty() {
        if stats.magnitude < 0.1 {
            issues.push(EmbeddingIssue {
                issue_type: EmbeddingIssueType::ZeroVector,
                severity: RiskLevel::High,
                description: format!("vector magnitude {:.4} is near zero", stats.magnitude),
                indices: Vec::new(),
            });
        } else if stats.sparsity > 0.95 {
            issues.push(EmbeddingIssue {
                issue_type: EmbeddingIssueType::ZeroVector,
                severity: RiskLevel::Medium,
                description: format!("{:.1}% of values are zero", stats.sparsity * 100.0),
                indices: Vec::new(),
            });
        }

        let lower = stats.mean - 4.0 * stats.std;
        let upper = stats.mean + 4.0 * stats.std;
        let outlier_count = finite_values
            .iter()
            .filter(|v| (**v as f64) < lower || (**v as f64) > upper)
            .count();
        if outlier_count as f64 / finite_values.len() as f64 > 0.05 {
            issues.push(EmbeddingIssue {
                issue_type: EmbeddingIssueType::Outlier,
                severity: RiskLevel::Medium,
                description: format!("{outlier_count} value(s) exceed mean +/- 4*std"),
                indices: Vec::new(),
            });
        }
    }

    if let Some(expected_checksum) = &embedding.checksum {
        let computed = compute_checksum(values);
        if &computed != expected_checksum {
            issues.push(EmbeddingIssue {
                issue_type: EmbeddingIssueType::ChecksumMismatch,
                severity: RiskLevel::Critical,
                description: format!(
                    "checksum mismatch: expected {expected_checksum}, computed {computed}"
                ),
                indices: Vec::new(),
            });
        }
    }

    let is_valid = !issues
        .iter()
        .any(|i| matches!(i.severity, RiskLevel::Critical | RiskLevel::High));

    EmbeddingIntegrityResult {
        is_valid,
        issues,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedding(values: Vec<f32>) -> EmbeddingVector {
        let dimension = values.len();
        EmbeddingVector {
            id: "e1".to_string(),
            values,
            dimension,
            source: None,
            checksum: None,
        }
    }

    #[test]
    fn nan_values_are_critical() {
        let e = embedding(vec![f32::NAN, 1.0, 2.0]);
        let result = verify_embedding(&e, None);
        assert!(!result.is_valid);
        assert!(result
            .issues
            .iter()
            .any(|i| i.issue_type == EmbeddingIssueType::NanValues
                && i.severity == RiskLevel::Critical));
    }

    #[test]
    fn dimension_mismatch_against_declared_field() {
        let mut e = embedding(vec![1.0, 2.0, 3.0]);
        e.dimension = 5;
        let result = verify_embedding(&e, None);
        assert!(result
            .issues
            .iter()
            .any(|i| i.issue_type == EmbeddingIssueType::DimensionMismatch
                && i.severity == RiskLevel::Critical));
    }

    #[test]
    fn near_zero_vector_is_flagged() {
        let e = embedding(vec![0.001, 0.001, 0.001]);
        let result = verify_embedding(&e, None);
        assert!(result
            .issues
            .iter()
            .any(|i| i.issue_type == EmbeddingIssueType::ZeroVector));
    }

    #[test]
    fn checksum_mismatch_is_critical() {
        let mut e = embedding(vec![1.0, 2.0, 3.0]);
        e.checksum = Some("deadbeefdeadbeef".to_string());
        let result = verify_embedding(&e, None);
        assert!(!result.is_valid);
        assert!(result
            .issues
            .iter()
            .any(|i| i.issue_type == EmbeddingIssueType::ChecksumMismatch));
    }

    #[test]
    fn matching_checksum_passes() {
        let values = vec![1.0, 2.0, 3.0];
        let checksum = compute_checksum(&values);
        let mut e = embedding(values);
        e.checksum = Some(checksum);
        let result = verify_embedding(&e, None);
        assert!(result
            .issues
            .iter()
            .all(|i| i.issue_type != EmbeddingIssueType::ChecksumMismatch));
    }

    #[test]
    fn empty_embedding_returns_zeroed_stats() {
        let e = embedding(vec![]);
        let result = verify_embedding(&e, None);
        assert_eq!(result.stats.dimension, 0);
        assert_eq!(result.stats.magnitude, 0.0);
    }
}
