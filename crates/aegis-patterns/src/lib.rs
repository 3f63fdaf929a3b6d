//! # Aegis Patterns
//!
//! The curated pattern library (spec component 1): regex/phrase sets for
//! prompt injection, jailbreaks, data exfiltration and hidden directives
//! (EN + KR), plus Unicode helpers for Korean-script awareness, the
//! fixed invisible-character set, and homoglyph ranges.
//!
//! Patterns are data, not code (spec §9): every entry has a stable id so
//! findings and audit records can cite exactly which pattern fired.

pub mod catalog;
pub mod unicode;

pub use catalog::{
    data_exfiltration_patterns, direct_injection_patterns, hidden_directive_patterns,
    jailbreak_patterns, scan_hidden_directives, scan_injection_groups, GroupHit, PatternEntry,
    PatternGroup,
};
pub use unicode::{
    find_homoglyphs, find_invisible_chars, has_latin_word, is_hangul_compat_jamo,
    is_hangul_jamo, is_hangul_syllable, is_homoglyph_candidate, is_invisible_char, is_korean,
};
