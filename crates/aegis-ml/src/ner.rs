//! BIO-tag decoding for the `pii_detector` NER model (spec §4.2, §8
//! invariant 4: spans are disjoint, ordered by start, and an `I-X` never
//! appears unless preceded by a `B-X` of matching type).

use crate::classifier::softmax;
use crate::session::Tensor;

pub const BIO_LABELS: [&str; 7] = ["O", "B-PER", "I-PER", "B-LOC", "I-LOC", "B-ORG", "I-ORG"];

#[derive(Debug, Clone, PartialEq)]
pub struct NerSpan {
    pub entity_type: String,
    pub start_token: usize,
    pub end_token: usize,
    pub confidence: f64,
}

fn entity_type_of(label: &str) -> Option<&str> {
    label.split_once('-').map(|(_, ty)| ty)
}

/// Decodes a `[1, seqLen, L]` tensor into entity spans, walking positions
/// `1..seqLen` while `attention_mask[pos] == 1` (position 0 is `[CLS]`).
pub fn decode_bio(tensor: &Tensor, attention_mask: &[i64]) -> Vec<NerSpan> {
    let num_labels = BIO_LABELS.len();
    let seq_len = tensor.shape.get(1).copied().unwrap_or(0);
    if tensor.shape.len() != 3 || tensor.shape[2] != num_labels {
        return Vec::new();
    }

    let mut spans = Vec::new();
    let mut current: Option<(String, usize, usize, Vec<f64>)> = None;

    let flush = |current: &mut Option<(String, usize, usize, Vec<f64>)>, spans: &mut Vec<NerSpan>| {
        if let Some((entity_type, start, end, confidences)) = current.take() {
            let mean = confidences.iter().sum::<f64>() / confidences.len().max(1) as f64;
            spans.push(NerSpan {
                entity_type,
                start_token: start,
                end_token: end,
                confidence: mean,
            });
        }
    };

    for pos in 1..seq_len {
        if attention_mask.get(pos).copied().unwrap_or(0) != 1 {
            break;
        }
        let offset = pos * num_labels;
        if offset + num_labels > tensor.data.len() {
            break;
        }
        let logits = &tensor.data[offset..offset + num_labels];
        let probs = softmax(logits);
        let (best_idx, &best_prob) = probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .expect("non-empty label set");
        let label = BIO_LABELS[best_idx];

        if let Some(stripped) = label.strip_prefix("B-") {
            flush(&mut current, &mut spans);
            current = Some((stripped.to_string(), pos, pos + 1, vec![best_prob as f64]));
        } else if label.starts_with("I-") {
            let ty = entity_type_of(label).unwrap_or_default();
            match &mut current {
                Some((entity_type, _, end, confidences)) if entity_type == ty => {
                    *end = pos + 1;
                    confidences.push(best_prob as f64);
                }
                // I-tag without a matching open B-span is dropped, per spec.
                _ => flush(&mut current, &mut spans),
            }
        } else {
            flush(&mut current, &mut spans);
        }
    }
    flush(&mut current, &mut spans);
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logits_for(label_idx: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; BIO_LABELS.len()];
        v[label_idx] = 5.0;
        v
    }

    #[test]
    fn merges_b_then_i_into_one_span() {
        // positions: [CLS]=0, B-PER=1, I-PER=2, O=3
        let mut data = Vec::new();
        data.extend(logits_for(0)); // CLS position, ignored
        data.extend(logits_for(1)); // B-PER
        data.extend(logits_for(2)); // I-PER
        data.extend(logits_for(0)); // O
        let tensor = Tensor {
            shape: vec![1, 4, BIO_LABELS.len()],
            data,
        };
        let mask = vec![1, 1, 1, 1];
        let spans = decode_bio(&tensor, &mask);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].entity_type, "PER");
        assert_eq!(spans[0].start_token, 1);
        assert_eq!(spans[0].end_token, 3);
    }

    #[test]
    fn i_tag_without_matching_b_is_dropped() {
        let mut data = Vec::new();
        data.extend(logits_for(0)); // CLS
        data.extend(logits_for(2)); // I-PER with no preceding B-PER
        let tensor = Tensor {
            shape: vec![1, 2, BIO_LABELS.len()],
            data,
        };
        let spans = decode_bio(&tensor, &[1, 1]);
        assert!(spans.is_empty());
    }

    #[test]
    fn i_tag_of_different_type_flushes_and_drops() {
        let mut data = Vec::new();
        data.extend(logits_for(0)); // CLS
        data.extend(logits_for(1)); // B-PER
        data.extend(logits_for(4)); // I-LOC (mismatched type)
        let tensor = Tensor {
            shape: vec![1, 3, BIO_LABELS.len()],
            data,
        };
        let spans = decode_bio(&tensor, &[1, 1, 1]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].entity_type, "PER");
        assert_eq!(spans[0].end_token, 2);
    }

    #[test]
    fn stops_at_attention_mask_boundary() {
        let mut data = Vec::new();
        data.extend(logits_for(0));
        data.extend(logits_for(1)); // B-PER, masked out below
        let tensor = Tensor {
            shape: vec![1, 2, BIO_LABELS.len()],
            data,
        };
        let spans = decode_bio(&tensor, &[1, 0]);
        assert!(spans.is_empty());
    }
}
