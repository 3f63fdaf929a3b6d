//! Injection classifier decoding: softmax with max-subtraction, and the
//! fixed 5-label output shape (spec §4.2).

use crate::error::{MlError, Result};
use crate::session::Tensor;
use aegis_core::MlClassification;

pub const INJECTION_LABELS: [&str; 5] = [
    "normal",
    "direct_injection",
    "indirect_injection",
    "jailbreak",
    "data_exfiltration",
];

/// Numerically stable softmax: subtract the max logit before
/// exponentiating. Sums to 1 within 1e-5 for any finite input and is
/// permutation-equivariant (spec §8 invariant 5).
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    if logits.is_empty() {
        return Vec::new();
    }
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum == 0.0 {
        return vec![1.0 / logits.len() as f32; logits.len()];
    }
    exps.into_iter().map(|e| e / sum).collect()
}

/// Decodes the `injection_classifier` output tensor (shape `[1, L]`)
/// into a labeled classification with the full probability distribution.
pub fn decode_injection_classification(tensor: &Tensor) -> Result<MlClassification> {
    let logits = &tensor.data;
    if logits.len() != INJECTION_LABELS.len() {
        return Err(MlError::MalformedOutput(format!(
            "expected {} logits, got {}",
            INJECTION_LABELS.len(),
            logits.len()
        )));
    }
    let probs = softmax(logits);
    let (best_idx, &best_prob) = probs
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .ok_or_else(|| MlError::MalformedOutput("empty distribution".into()))?;

    let distribution = INJECTION_LABELS
        .iter()
        .zip(probs.iter())
        .map(|(label, p)| (label.to_string(), *p as f64))
        .collect();

    Ok(MlClassification {
        label: INJECTION_LABELS[best_idx].to_string(),
        confidence: best_prob as f64,
        distribution,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0, -1.0, 0.5]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn softmax_is_permutation_equivariant() {
        let a = softmax(&[1.0, 2.0, 3.0]);
        let b = softmax(&[3.0, 1.0, 2.0]);
        assert!((a[0] - b[2]).abs() < 1e-6);
        assert!((a[1] - b[0]).abs() < 1e-6);
        assert!((a[2] - b[1]).abs() < 1e-6);
    }

    #[test]
    fn decodes_dominant_label() {
        let tensor = Tensor {
            shape: vec![1, 5],
            data: vec![0.0, 5.0, 0.0, 0.0, 0.0],
        };
        let decoded = decode_injection_classification(&tensor).unwrap();
        assert_eq!(decoded.label, "direct_injection");
        assert!(decoded.confidence > 0.9);
    }
}
