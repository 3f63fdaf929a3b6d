//! The output analyzer facade (spec §4.6): PII detection, sensitive-data
//! detection, optional NER, policy-violation derivation, and the
//! `sanitizedOutput` masking pass.

use crate::pii::{scan_pii, PiiFinding};
use crate::sensitive::{SensitiveCategory, SensitiveDataDetector, SensitiveFinding};
use aegis_ml::{NerSpan, Tensor, WordpieceTokenizer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputAnalysisResult {
    pub contains_pii: bool,
    pub pii_findings: Vec<PiiFinding>,
    pub sensitive_findings: Vec<SensitiveFinding>,
    pub ner_entities: Vec<NerEntityResult>,
    pub policy_violations: Vec<String>,
    pub sanitized_output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerEntityResult {
    pub entity_type: String,
    pub start_token: usize,
    pub end_token: usize,
    pub confidence: f64,
}

impl From<NerSpan> for NerEntityResult {
    fn from(span: NerSpan) -> Self {
        Self {
            entity_type: span.entity_type,
            start_token: span.start_token,
            end_token: span.end_token,
            confidence: span.confidence,
        }
    }
}

pub struct OutputAnalyzer {
    sensitive: SensitiveDataDetector,
}

impl Default for OutputAnalyzer {
    fn default() -> Self {
        Self::new(SensitiveDataDetector::new())
    }
}

impl OutputAnalyzer {
    pub fn new(sensitive: SensitiveDataDetector) -> Self {
        Self { sensitive }
    }

    fn policy_violations(findings: &[SensitiveFinding]) -> Vec<String> {
        findings
            .iter()
            .filter_map(|f| match f.category {
                SensitiveCategory::Credential => {
                    Some(format!("Credential exposure: {}", f.label))
                }
                SensitiveCategory::Internal => {
                    Some(format!("Internal system info exposed: {}", f.label))
                }
                SensitiveCategory::Custom => None,
            })
            .collect()
    }

    /// Masks `findings` sorted by descending `start` so earlier offsets
    /// stay valid as later (higher-offset) replacements are applied.
    /// Findings whose span overlaps one already masked are skipped
    /// rather than applied against stale offsets.
    fn mask_pii(text: &str, findings: &[PiiFinding]) -> String {
        let mut ordered: Vec<&PiiFinding> = findings.iter().collect();
        ordered.sort_by(|a, b| b.start.cmp(&a.start));
        let mut out = text.to_string();
        let mut masked_from = text.len();
        for finding in ordered {
            if finding.end > masked_from {
                continue;
            }
            out.replace_range(finding.start..finding.end, &finding.masked_value);
            masked_from = finding.start;
        }
        out
    }

    fn mask_sensitive(text: &str, findings: &[SensitiveFinding]) -> String {
        let mut ordered: Vec<&SensitiveFinding> = findings.iter().collect();
        ordered.sort_by(|a, b| b.start.cmp(&a.start));
        let mut out = text.to_string();
        let mut masked_from = text.len();
        for finding in ordered {
            if finding.end > masked_from {
                continue;
            }
            out.replace_range(finding.start..finding.end, &finding.masked_value);
            masked_from = finding.start;
        }
        out
    }

    /// Runs steps 1-5 of spec §4.6. The ML NER step is run separately by
    /// [`Self::analyze_with_ner`] since it needs a tokenizer + session.
    pub fn analyze(&self, output: &str) -> OutputAnalysisResult {
        self.analyze_inner(output, Vec::new())
    }

    /// Same as [`Self::analyze`] but also decodes NER spans from a
    /// pre-run `pii_detector` tensor (spec §4.2/§4.6 step 3). Callers
    /// that have no ML session available should call [`Self::analyze`].
    pub fn analyze_with_ner(
        &self,
        output: &str,
        tokenizer: &WordpieceTokenizer,
        tensor: &Tensor,
    ) -> OutputAnalysisResult {
        let tokenized = tokenizer.tokenize(output);
        let spans = aegis_ml::decode_bio(tensor, &tokenized.attention_mask);
        self.analyze_inner(output, spans)
    }

    fn analyze_inner(&self, output: &str, ner_spans: Vec<NerSpan>) -> OutputAnalysisResult {
        let pii_findings = scan_pii(output);
        let sensitive_findings = self.sensitive.scan(output);
        let ner_entities: Vec<NerEntityResult> =
            ner_spans.into_iter().map(NerEntityResult::from).collect();
        let policy_violations = Self::policy_violations(&sensitive_findings);

        let contains_pii = !pii_findings.is_empty();
        let has_any_finding = contains_pii || !sensitive_findings.is_empty();

        // spec §4.6 step 5 / §9 open question: PII is masked first, then
        // sensitive-data detection re-runs on the *already masked* text
        // and masks again — preserved even though it can double-mask
        // overlapping regions.
        let sanitized_output = if has_any_finding {
            let pii_masked = Self::mask_pii(output, &pii_findings);
            let re_detected = self.sensitive.scan(&pii_masked);
            Some(Self::mask_sensitive(&pii_masked, &re_detected))
        } else {
            None
        };

        OutputAnalysisResult {
            contains_pii,
            pii_findings,
            sensitive_findings,
            ner_entities,
            policy_violations,
            sanitized_output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rrn_is_masked_out_of_sanitized_output() {
        let analyzer = OutputAnalyzer::default();
        let result = analyzer.analyze("주민등록번호는 900101-1234567 입니다");
        assert!(result.contains_pii);
        assert_eq!(result.pii_findings.len(), 1);
        let sanitized = result.sanitized_output.unwrap();
        assert!(!sanitized.contains("1234567"));
    }

    #[test]
    fn credential_produces_policy_violation() {
        let analyzer = OutputAnalyzer::default();
        let result = analyzer.analyze("key: sk-abcdefghijklmnopqrstuvwxyz1234567890");
        assert!(result
            .policy_violations
            .iter()
            .any(|v| v.starts_with("Credential exposure")));
    }

    #[test]
    fn benign_text_has_no_sanitized_output() {
        let analyzer = OutputAnalyzer::default();
        let result = analyzer.analyze("the weather today is mild and clear");
        assert!(result.sanitized_output.is_none());
    }

    #[test]
    fn re_analysis_of_sanitized_output_finds_no_new_pii_of_same_type() {
        let analyzer = OutputAnalyzer::default();
        let result = analyzer.analyze("reach me at jane.doe@example.com");
        let sanitized = result.sanitized_output.unwrap();
        let re_scan = analyzer.analyze(&sanitized);
        assert!(re_scan.pii_findings.is_empty());
    }
}
