//! PII regex detectors (spec §4.6 step 1): a fixed ordered list of
//! {RRN, PHONE, EMAIL, CARD, ACCOUNT} detectors, Korean-shaped where the
//! spec calls for it.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiType {
    Rrn,
    Phone,
    Email,
    Card,
    Account,
}

impl PiiType {
    pub fn as_str(self) -> &'static str {
        match self {
            PiiType::Rrn => "rrn",
            PiiType::Phone => "phone",
            PiiType::Email => "email",
            PiiType::Card => "card",
            PiiType::Account => "account",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiiFinding {
    #[serde(rename = "type")]
    pub pii_type: PiiType,
    pub value: String,
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
    pub masked_value: String,
}

struct PiiDetector {
    pii_type: PiiType,
    regex: Regex,
}

// Korean resident registration number: 6 digits, dash, a leading
// 1-4 digit, 6 more digits.
static RRN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{6}-[1-4]\d{6}\b").unwrap());

// Korean mobile/landline, with or without dashes: 01X-XXXX-XXXX.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b01[016789]-?\d{3,4}-?\d{4}\b").unwrap());

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());

static CARD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}-\d{4}-\d{4}-\d{4}\b").unwrap());

// Korean bank account shape: groups of 2-6 digits separated by dashes,
// 3 or 4 segments, distinct enough from card/phone to come last.
static ACCOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{2,6}-\d{2,6}-\d{2,6}(?:-\d{2,6})?\b").unwrap());

fn detectors() -> [PiiDetector; 5] {
    [
        PiiDetector {
            pii_type: PiiType::Rrn,
            regex: RRN_RE.clone(),
        },
        PiiDetector {
            pii_type: PiiType::Phone,
            regex: PHONE_RE.clone(),
        },
        PiiDetector {
            pii_type: PiiType::Email,
            regex: EMAIL_RE.clone(),
        },
        PiiDetector {
            pii_type: PiiType::Card,
            regex: CARD_RE.clone(),
        },
        PiiDetector {
            pii_type: PiiType::Account,
            regex: ACCOUNT_RE.clone(),
        },
    ]
}

/// Masks a PII value: values of 8 chars or fewer become `****`; longer
/// values keep a 4-char prefix followed by `****` (spec §4.6 step 5).
pub fn mask_value(value: &str) -> String {
    if value.chars().count() <= 8 {
        "****".to_string()
    } else {
        let prefix: String = value.chars().take(4).collect();
        format!("{prefix}****")
    }
}

/// Scans `text` with the fixed ordered detector list. `ACCOUNT_RE`'s
/// 2-6-digit-group shape can coincide exactly with `CARD_RE`'s stricter
/// 4-4-4-4 shape (e.g. `1234-5678-9012-3456`), so any account match that
/// fully overlaps a span already reported as a card is dropped rather
/// than reported twice under two `PiiType`s.
pub fn scan_pii(text: &str) -> Vec<PiiFinding> {
    let mut findings = Vec::new();
    let mut card_spans: Vec<(usize, usize)> = Vec::new();
    for detector in detectors() {
        for m in detector.regex.find_iter(text) {
            let span = (m.start(), m.end());
            if detector.pii_type == PiiType::Account && card_spans.contains(&span) {
                continue;
            }
            if detector.pii_type == PiiType::Card {
                card_spans.push(span);
            }
            findings.push(PiiFinding {
                pii_type: detector.pii_type,
                value: m.as_str().to_string(),
                start: span.0,
                end: span.1,
                confidence: 1.0,
                masked_value: mask_value(m.as_str()),
            });
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_korean_rrn() {
        let findings = scan_pii("주민등록번호는 900101-1234567 입니다");
        assert!(findings.iter().any(|f| f.pii_type == PiiType::Rrn));
    }

    #[test]
    fn detects_email() {
        let findings = scan_pii("contact me at jane.doe@example.com please");
        assert!(findings.iter().any(|f| f.pii_type == PiiType::Email));
    }

    #[test]
    fn detects_phone_with_dashes() {
        let findings = scan_pii("call 010-1234-5678 now");
        assert!(findings.iter().any(|f| f.pii_type == PiiType::Phone));
    }

    #[test]
    fn short_values_mask_to_stars_only() {
        assert_eq!(mask_value("1234"), "****");
    }

    #[test]
    fn long_values_keep_a_prefix() {
        assert_eq!(mask_value("jane.doe@example.com"), "jane****");
    }

    #[test]
    fn card_shaped_number_is_not_also_reported_as_account() {
        let findings = scan_pii("card on file: 1234-5678-9012-3456 thanks");
        let card_hits: Vec<_> = findings.iter().filter(|f| f.pii_type == PiiType::Card).collect();
        let account_hits: Vec<_> = findings.iter().filter(|f| f.pii_type == PiiType::Account).collect();
        assert_eq!(card_hits.len(), 1);
        assert!(account_hits.is_empty());
    }
}
