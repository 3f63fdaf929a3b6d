//! The sensitive-data detector (spec §4.6a): credential and internal-
//! info pattern catalogs, plus caller-supplied custom patterns,
//! de-duplicated by `(start, end, type)`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitiveCategory {
    Credential,
    Internal,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitiveFinding {
    pub category: SensitiveCategory,
    pub label: String,
    pub value: String,
    pub start: usize,
    pub end: usize,
    pub masked_value: String,
}

struct SensitivePattern {
    label: &'static str,
    category: SensitiveCategory,
    regex: Regex,
}

fn compile(label: &'static str, category: SensitiveCategory, pattern: &str) -> SensitivePattern {
    SensitivePattern {
        label,
        category,
        regex: Regex::new(pattern).unwrap_or_else(|e| panic!("bad sensitive pattern {label}: {e}")),
    }
}

static CREDENTIALS: Lazy<Vec<SensitivePattern>> = Lazy::new(|| {
    vec![
        compile("openai_api_key", SensitiveCategory::Credential, r"\bsk-[A-Za-z0-9]{20,}\b"),
        compile("anthropic_api_key", SensitiveCategory::Credential, r"\bsk-ant-[A-Za-z0-9_-]{20,}\b"),
        compile("google_api_key", SensitiveCategory::Credential, r"\bAIza[A-Za-z0-9_-]{30,}\b"),
        compile(
            "github_token",
            SensitiveCategory::Credential,
            r"\bgh[pou]_[A-Za-z0-9]{20,}\b",
        ),
        compile("slack_token", SensitiveCategory::Credential, r"\bxox[bp]-[A-Za-z0-9-]{10,}\b"),
        compile("aws_access_key", SensitiveCategory::Credential, r"\bAKIA[0-9A-Z]{16}\b"),
        compile(
            "aws_secret_key",
            SensitiveCategory::Credential,
            r"(?i)aws_secret_access_key\s*=\s*\S+",
        ),
        compile(
            "jwt",
            SensitiveCategory::Credential,
            r"\beyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\b",
        ),
        compile(
            "pem_private_key",
            SensitiveCategory::Credential,
            r"-----BEGIN (RSA |EC |OPENSSH )?PRIVATE KEY-----",
        ),
        compile(
            "db_connection_uri",
            SensitiveCategory::Credential,
            r"(?i)\b(mongodb(\+srv)?|postgres(ql)?|mysql|redis|mssql)://[^\s]+",
        ),
        compile(
            "password_assignment",
            SensitiveCategory::Credential,
            r"(?i)\b(password|passwd)\s*[:=]\s*\S+",
        ),
    ]
});

static INTERNAL: Lazy<Vec<SensitivePattern>> = Lazy::new(|| {
    vec![
        compile(
            "localhost_url",
            SensitiveCategory::Internal,
            r"(?i)\bhttps?://(localhost|127\.0\.0\.1)(:\d+)?\b",
        ),
        compile(
            "rfc1918_address",
            SensitiveCategory::Internal,
            r"\b(10\.\d{1,3}\.\d{1,3}\.\d{1,3}|192\.168\.\d{1,3}\.\d{1,3}|172\.(1[6-9]|2\d|3[01])\.\d{1,3}\.\d{1,3})\b",
        ),
        compile("unix_path", SensitiveCategory::Internal, r"\b(/etc|/var|/home)/[^\s]*"),
        compile(
            "windows_path",
            SensitiveCategory::Internal,
            r"[A-Za-z]:\\Users\\[^\s]*",
        ),
        compile(
            "env_var_reference",
            SensitiveCategory::Internal,
            r"\$\{[A-Za-z_][A-Za-z0-9_]*\}|\$[A-Za-z_][A-Za-z0-9_]*\b",
        ),
    ]
});

/// The built-in credential + internal catalogs, plus any custom patterns
/// supplied at detector construction (spec §4.6a).
pub struct SensitiveDataDetector {
    custom: Vec<SensitivePattern>,
}

impl SensitiveDataDetector {
    pub fn new() -> Self {
        Self { custom: Vec::new() }
    }

    pub fn with_custom_patterns(patterns: Vec<(String, String)>) -> Self {
        let custom = patterns
            .into_iter()
            .filter_map(|(label, pattern)| {
                Regex::new(&pattern).ok().map(|regex| SensitivePattern {
                    label: label.leak(),
                    category: SensitiveCategory::Custom,
                    regex,
                })
            })
            .collect();
        Self { custom }
    }

    pub fn scan(&self, text: &str) -> Vec<SensitiveFinding> {
        let mut seen: HashSet<(usize, usize, SensitiveCategory)> = HashSet::new();
        let mut findings = Vec::new();
        let all = CREDENTIALS
            .iter()
            .chain(INTERNAL.iter())
            .chain(self.custom.iter());
        for pattern in all {
            for m in pattern.regex.find_iter(text) {
                let key = (m.start(), m.end(), pattern.category);
                if !seen.insert(key) {
                    continue;
                }
                findings.push(SensitiveFinding {
                    category: pattern.category,
                    label: pattern.label.to_string(),
                    value: m.as_str().to_string(),
                    start: m.start(),
                    end: m.end(),
                    masked_value: crate::pii::mask_value(m.as_str()),
                });
            }
        }
        findings
    }
}

impl Default for SensitiveDataDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_openai_key() {
        let detector = SensitiveDataDetector::new();
        let findings = detector.scan("here is my key sk-abcdefghijklmnopqrstuvwxyz1234567890");
        assert!(findings.iter().any(|f| f.label == "openai_api_key"));
    }

    #[test]
    fn detects_localhost_url_as_internal() {
        let detector = SensitiveDataDetector::new();
        let findings = detector.scan("the backend lives at http://localhost:8081/health");
        assert!(findings
            .iter()
            .any(|f| f.category == SensitiveCategory::Internal && f.label == "localhost_url"));
    }

    #[test]
    fn dedups_overlapping_matches_by_span_and_type() {
        let detector = SensitiveDataDetector::new();
        let findings = detector.scan("sk-abcdefghijklmnopqrstuvwxyz1234567890");
        let count = findings
            .iter()
            .filter(|f| f.label == "openai_api_key")
            .count();
        assert_eq!(count, 1);
    }
}
