//! Semantic drift detection (spec §4.7b): content signatures and a
//! weighted-delta comparison between two of them.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSignature {
    pub word_count: usize,
    pub avg_word_length: f64,
    pub vocabulary_richness: f64,
    pub top_keywords: Vec<String>,
    pub language_distribution: HashMap<String, f64>,
    pub sentiment_indicators: f64,
}

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "is", "are", "was", "were", "to", "of", "in", "on", "and", "or", "for",
        "it", "this", "that", "with", "as", "be", "at", "by", "from",
    ]
    .into_iter()
    .collect()
});

static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["good", "great", "excellent", "helpful", "positive", "happy", "wonderful", "love"]
        .into_iter()
        .collect()
});

static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["bad", "terrible", "awful", "negative", "hate", "angry", "harmful", "dangerous"]
        .into_iter()
        .collect()
});

/// Words that suggest the text is trying to instruct rather than
/// describe, used to detect `injection_suspected` drift.
static INSTRUCTION_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["ignore", "instead", "instructions", "override", "disregard", "system", "must", "now"]
        .into_iter()
        .collect()
});

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

fn language_distribution(text: &str) -> HashMap<String, f64> {
    let mut latin = 0usize;
    let mut korean = 0usize;
    let mut other = 0usize;
    let mut total = 0usize;
    for c in text.chars() {
        if c.is_whitespace() {
            continue;
        }
        total += 1;
        if aegis_patterns::is_korean(c) {
            korean += 1;
        } else if c.is_ascii_alphabetic() {
            latin += 1;
        } else if c.is_alphabetic() {
            other += 1;
        }
    }
    let total = total.max(1) as f64;
    let mut map = HashMap::new();
    map.insert("latin".to_string(), latin as f64 / total);
    map.insert("korean".to_string(), korean as f64 / total);
    map.insert("other".to_string(), other as f64 / total);
    map
}

fn instruction_indicator_ratio(words: &[String]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let hits = words.iter().filter(|w| INSTRUCTION_WORDS.contains(w.as_str())).count();
    hits as f64 / words.len() as f64
}

/// Builds a [`ContentSignature`] from raw text (spec §4.7b).
pub fn build_signature(text: &str) -> ContentSignature {
    let words = tokenize(text);
    let word_count = words.len();
    let avg_word_length = if word_count == 0 {
        0.0
    } else {
        words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / word_count as f64
    };

    let content_words: Vec<&String> = words.iter().filter(|w| !STOPWORDS.contains(w.as_str())).collect();
    let unique: HashSet<&str> = content_words.iter().map(|w| w.as_str()).collect();
    let vocabulary_richness = if content_words.is_empty() {
        0.0
    } else {
        unique.len() as f64 / content_words.len() as f64
    };

    let mut freq: HashMap<&str, usize> = HashMap::new();
    for w in &content_words {
        *freq.entry(w.as_str()).or_insert(0) += 1;
    }
    let mut ranked: Vec<(&str, usize)> = freq.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let top_keywords = ranked.into_iter().take(10).map(|(w, _)| w.to_string()).collect();

    let positive = words.iter().filter(|w| POSITIVE_WORDS.contains(w.as_str())).count();
    let negative = words.iter().filter(|w| NEGATIVE_WORDS.contains(w.as_str())).count();
    let sentiment_indicators = if word_count == 0 {
        0.0
    } else {
        (positive as f64 - negative as f64) / word_count as f64
    };

    ContentSignature {
        word_count,
        avg_word_length,
        vocabulary_richness,
        top_keywords,
        language_distribution: language_distribution(text),
        sentiment_indicators,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftTypeHint {
    StyleChange,
    TopicShift,
    ContentDivergence,
    InjectionSuspected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftResult {
    pub has_drift: bool,
    pub drift_score: f64,
    pub hints: Vec<DriftTypeHint>,
}

fn keyword_overlap(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let set_a: HashSet<&str> = a.iter().map(|s| s.as_str()).collect();
    let set_b: HashSet<&str> = b.iter().map(|s| s.as_str()).collect();
    let union: HashSet<&str> = set_a.union(&set_b).cloned().collect();
    if union.is_empty() {
        return 1.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union.len() as f64
}

fn language_shift(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let keys: HashSet<&String> = a.keys().chain(b.keys()).collect();
    keys.into_iter()
        .map(|k| (a.get(k).copied().unwrap_or(0.0) - b.get(k).copied().unwrap_or(0.0)).abs())
        .fold(0.0, f64::max)
}

/// Compares two signatures with the full-document weighted-delta
/// thresholds (spec §4.7b table).
pub fn compare_signatures(
    original: &ContentSignature,
    current: &ContentSignature,
    original_words: &[String],
    current_words: &[String],
) -> DriftResult {
    compare_inner(
        original,
        current,
        original_words,
        current_words,
        0.2,
        0.5,
    )
}

/// Chunk-consistency mode: each chunk compared to the aggregate
/// signature with looser keyword/language thresholds (spec §4.7b).
pub fn compare_chunk_to_aggregate(
    aggregate: &ContentSignature,
    chunk: &ContentSignature,
    aggregate_words: &[String],
    chunk_words: &[String],
) -> DriftResult {
    compare_inner(aggregate, chunk, aggregate_words, chunk_words, 0.1, 0.5)
}

fn compare_inner(
    original: &ContentSignature,
    current: &ContentSignature,
    original_words: &[String],
    current_words: &[String],
    keyword_overlap_threshold: f64,
    language_shift_threshold: f64,
) -> DriftResult {
    let mut score = 0.0;
    let mut hints = Vec::new();

    let word_count_ratio = if original.word_count == 0 {
        if current.word_count == 0 {
            1.0
        } else {
            0.0
        }
    } else {
        (current.word_count as f64 - original.word_count as f64).abs() / original.word_count as f64
    };
    if word_count_ratio > 0.5 {
        score += 0.2;
    }

    let richness_delta = (current.vocabulary_richness - original.vocabulary_richness).abs();
    if richness_delta > 0.3 {
        score += 0.15;
        hints.push(DriftTypeHint::StyleChange);
    }

    let overlap = keyword_overlap(&original.top_keywords, &current.top_keywords);
    if overlap < keyword_overlap_threshold {
        score += 0.3;
        hints.push(DriftTypeHint::TopicShift);
    }

    let lang_shift = language_shift(&original.language_distribution, &current.language_distribution);
    if lang_shift > language_shift_threshold {
        score += 0.2;
        hints.push(DriftTypeHint::ContentDivergence);
    }

    let sentiment_shift = (current.sentiment_indicators - original.sentiment_indicators).abs();
    if sentiment_shift > 0.5 {
        score += 0.15;
    }

    let original_ratio = instruction_indicator_ratio(original_words);
    let current_ratio = instruction_indicator_ratio(current_words);
    if current_ratio - original_ratio > 0.3 {
        score += 0.4;
        hints.push(DriftTypeHint::InjectionSuspected);
    }

    DriftResult {
        has_drift: score > 0.3,
        drift_score: score,
        hints,
    }
}

/// Convenience entry point used by `/rag/detect-drift`: builds both
/// signatures and compares them with the full-document thresholds.
pub fn detect_drift(original_content: &str, current_content: &str) -> DriftResult {
    let original = build_signature(original_content);
    let current = build_signature(current_content);
    compare_signatures(
        &original,
        &current,
        &tokenize(original_content),
        &tokenize(current_content),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_content_has_no_drift() {
        let result = detect_drift("the quick brown fox jumps", "the quick brown fox jumps");
        assert!(!result.has_drift);
    }

    #[test]
    fn topic_shift_detected_on_disjoint_keywords() {
        let result = detect_drift(
            "cooking recipes for pasta and sauce with garlic and basil and tomato",
            "quantum physics particle accelerator collider experiment results data",
        );
        assert!(result.has_drift);
        assert!(result.hints.contains(&DriftTypeHint::TopicShift));
    }

    #[test]
    fn injection_suspected_when_instruction_density_rises() {
        let result = detect_drift(
            "a simple description of a cat sitting on a mat",
            "ignore instructions now override the system disregard instead",
        );
        assert!(result.hints.contains(&DriftTypeHint::InjectionSuspected));
    }

    #[test]
    fn chunk_mode_flags_content_divergence_on_language_shift() {
        let aggregate = build_signature("this report discusses quarterly revenue and growth");
        let chunk = build_signature("이 문서는 분기별 수익과 성장을 논의합니다");
        let result = compare_chunk_to_aggregate(
            &aggregate,
            &chunk,
            &tokenize("this report discusses quarterly revenue and growth"),
            &tokenize("이 문서는 분기별 수익과 성장을 논의합니다"),
        );
        assert!(result.hints.contains(&DriftTypeHint::ContentDivergence));
    }

    #[test]
    fn chunk_mode_consistent_with_aggregate_has_no_drift() {
        let aggregate = build_signature("the quick brown fox jumps over the lazy dog");
        let chunk = build_signature("the quick brown fox jumps over the lazy dog");
        let result = compare_chunk_to_aggregate(
            &aggregate,
            &chunk,
            &tokenize("the quick brown fox jumps over the lazy dog"),
            &tokenize("the quick brown fox jumps over the lazy dog"),
        );
        assert!(!result.has_drift);
    }
}
