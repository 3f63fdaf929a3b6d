//! Document provenance (spec §4.7c): trust scoring by source type and
//! domain, a timestamped action chain, and access decisions against a
//! required trust level.

use aegis_core::{DocumentProvenance, DocumentSource, ProvenanceEntry, SourceType, TrustLevel};
use chrono::{Duration, Utc};

/// Base trust weight per source type (spec §4.7c).
pub fn base_trust_weight(source_type: SourceType) -> f64 {
    match source_type {
        SourceType::Internal => 1.0,
        SourceType::External => 0.6,
        SourceType::UserUpload => 0.4,
        SourceType::Api => 0.7,
        SourceType::Crawl => 0.3,
    }
}

const TRUSTED_DOMAIN_SUFFIXES: [&str; 4] = ["gov.kr", "go.kr", "ac.kr", "edu"];
const TRUSTED_DOMAIN_EXACT: [&str; 1] = ["org"];
const UNTRUSTED_DOMAINS: [&str; 2] = ["pastebin.com", "temp-mail.org"];

/// True if `domain` *is* `suffix` or is a subdomain of it (i.e. ends in
/// `.suffix`) — a bare `ends_with` would also match unrelated domains
/// like `evilgov.kr` against the zone `gov.kr`.
fn matches_domain_suffix(domain: &str, suffix: &str) -> bool {
    domain == suffix || domain.ends_with(&format!(".{suffix}"))
}

fn domain_bonus(domain: Option<&str>) -> f64 {
    let Some(domain) = domain else {
        return 0.0;
    };
    let domain = domain.to_lowercase();
    if UNTRUSTED_DOMAINS.iter().any(|d| matches_domain_suffix(&domain, d)) || domain.contains("anonymous") {
        return -0.3;
    }
    if TRUSTED_DOMAIN_SUFFIXES
        .iter()
        .any(|suffix| matches_domain_suffix(&domain, suffix))
        || TRUSTED_DOMAIN_EXACT
            .iter()
            .any(|suffix| matches_domain_suffix(&domain, suffix))
    {
        return 0.2;
    }
    0.0
}

/// Computes the initial trust score for a freshly created source (spec
/// §4.7c): base weight + domain bonus + verified bonus, clipped to
/// `[0, 1]`.
pub fn compute_trust_score(source: &DocumentSource) -> f64 {
    let mut score = base_trust_weight(source.source_type);
    score += domain_bonus(source.domain.as_deref());
    if source.verified {
        score += 0.1;
    }
    score.clamp(0.0, 1.0)
}

/// Creates a new provenance record for a document, with its first chain
/// entry recording the ingestion action.
pub fn create_provenance(document_id: impl Into<String>, source: DocumentSource) -> DocumentProvenance {
    let trust_score = compute_trust_score(&source);
    let now = Utc::now();
    DocumentProvenance {
        document_id: document_id.into(),
        source,
        chain: vec![ProvenanceEntry {
            action: "ingested".to_string(),
            timestamp: now,
            actor: None,
        }],
        trust_score,
        trust_level: TrustLevel::from_score(trust_score),
        last_verified: None,
    }
}

/// Appends a timestamped action to a provenance chain. Chain timestamps
/// are non-decreasing by construction (each entry uses "now").
pub fn add_entry(provenance: &mut DocumentProvenance, action: impl Into<String>, actor: Option<String>) {
    provenance.chain.push(ProvenanceEntry {
        action: action.into(),
        timestamp: Utc::now(),
        actor,
    });
}

const REVERIFICATION_WINDOW_DAYS: i64 = 7;

/// Whether this document's trust needs re-verification (spec §4.7c:
/// "re-verification is deemed required after 7 days").
pub fn needs_reverification(provenance: &DocumentProvenance) -> bool {
    match provenance.last_verified {
        None => true,
        Some(last) => Utc::now() - last > Duration::days(REVERIFICATION_WINDOW_DAYS),
    }
}

pub fn mark_verified(provenance: &mut DocumentProvenance) {
    provenance.last_verified = Some(Utc::now());
    add_entry(provenance, "verified", None);
}

/// Access-control check: the provenance's trust level must be at least
/// `required` on the closed ordering `unknown < untrusted < standard <
/// trusted < verified` (spec §4.7c).
pub fn check_access(provenance: &DocumentProvenance, required: TrustLevel) -> bool {
    provenance.trust_level >= required
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(source_type: SourceType, domain: Option<&str>, verified: bool) -> DocumentSource {
        DocumentSource {
            source_type,
            origin: "test".to_string(),
            domain: domain.map(|d| d.to_string()),
            verified,
            trust_weight: base_trust_weight(source_type),
        }
    }

    #[test]
    fn internal_source_is_fully_trusted() {
        let s = source(SourceType::Internal, None, false);
        assert_eq!(compute_trust_score(&s), 1.0);
    }

    #[test]
    fn gov_domain_gets_bonus() {
        let s = source(SourceType::External, Some("data.go.kr"), false);
        assert!((compute_trust_score(&s) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn pastebin_domain_is_penalized() {
        let s = source(SourceType::External, Some("pastebin.com"), false);
        assert!((compute_trust_score(&s) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn lookalike_domain_does_not_get_trusted_bonus() {
        let s = source(SourceType::External, Some("evilgov.kr"), false);
        assert!((compute_trust_score(&s) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn lookalike_domain_does_not_get_untrusted_penalty() {
        let s = source(SourceType::External, Some("notpastebin.com"), false);
        assert!((compute_trust_score(&s) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn trust_score_clips_to_one() {
        let s = source(SourceType::Internal, Some("data.go.kr"), true);
        assert_eq!(compute_trust_score(&s), 1.0);
    }

    #[test]
    fn fresh_provenance_needs_reverification() {
        let p = create_provenance("d1", source(SourceType::Crawl, None, false));
        assert!(needs_reverification(&p));
    }

    #[test]
    fn check_access_respects_ordering() {
        let mut p = create_provenance("d1", source(SourceType::Internal, None, true));
        p.trust_level = TrustLevel::Trusted;
        assert!(check_access(&p, TrustLevel::Standard));
        assert!(!check_access(&p, TrustLevel::Verified));
    }
}
