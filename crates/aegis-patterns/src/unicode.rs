//! Unicode range helpers: Korean script detection, the fixed invisible
//! character set, and the homoglyph ranges used by the RAG scanner.

use aegis_core::MatchSpan;

/// Hangul syllable block.
pub fn is_hangul_syllable(c: char) -> bool {
    ('\u{AC00}'..='\u{D7AF}').contains(&c)
}

/// Hangul jamo block.
pub fn is_hangul_jamo(c: char) -> bool {
    ('\u{1100}'..='\u{11FF}').contains(&c)
}

/// Hangul compatibility jamo block.
pub fn is_hangul_compat_jamo(c: char) -> bool {
    ('\u{3130}'..='\u{318F}').contains(&c)
}

pub fn is_korean(c: char) -> bool {
    is_hangul_syllable(c) || is_hangul_jamo(c) || is_hangul_compat_jamo(c)
}

/// The fixed invisible-character set (spec §4.1): zero-width characters,
/// directional overrides, word joiners, BOM, and soft hyphen.
pub fn is_invisible_char(c: char) -> bool {
    matches!(c, '\u{200B}'..='\u{200F}')
        || matches!(c, '\u{2060}'..='\u{2064}')
        || c == '\u{FEFF}'
        || c == '\u{00AD}'
}

/// Scans `text` for invisible characters, stopping after `cap` hits
/// (enough to flag without scanning the whole document pathologically).
pub fn find_invisible_chars(text: &str, cap: usize) -> Vec<MatchSpan> {
    let mut spans = Vec::new();
    for (idx, c) in text.char_indices() {
        if spans.len() >= cap {
            break;
        }
        if is_invisible_char(c) {
            spans.push(MatchSpan {
                start: idx,
                end: idx + c.len_utf8(),
                matched: c.to_string(),
            });
        }
    }
    spans
}

/// Homoglyph ranges: Cyrillic, fullwidth forms, and the Letterlike
/// symbols block — scripts with characters visually similar to Latin
/// letters, used to disguise directives.
pub fn is_homoglyph_candidate(c: char) -> bool {
    ('\u{0400}'..='\u{04FF}').contains(&c)
        || ('\u{FF01}'..='\u{FF5E}').contains(&c)
        || ('\u{2100}'..='\u{214F}').contains(&c)
}

/// At least one 3+-letter Latin word alongside homoglyph candidates is
/// required before flagging (spec §4.7): otherwise ordinary non-Latin
/// text (e.g. pure Cyrillic prose) would be a constant false positive.
pub fn has_latin_word(text: &str, min_len: usize) -> bool {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .any(|word| word.len() >= min_len)
}

pub fn find_homoglyphs(text: &str) -> Vec<MatchSpan> {
    if !has_latin_word(text, 3) {
        return Vec::new();
    }
    text.char_indices()
        .filter(|(_, c)| is_homoglyph_candidate(*c))
        .map(|(idx, c)| MatchSpan {
            start: idx,
            end: idx + c.len_utf8(),
            matched: c.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_korean_weather_text() {
        assert!("오늘".chars().all(is_korean));
    }

    #[test]
    fn detects_zero_width_space() {
        assert!(is_invisible_char('\u{200B}'));
        assert!(!is_invisible_char('a'));
    }

    #[test]
    fn invisible_scan_respects_cap() {
        let text = "\u{200B}".repeat(100);
        let spans = find_invisible_chars(&text, 50);
        assert_eq!(spans.len(), 50);
    }

    #[test]
    fn homoglyphs_require_latin_word_context() {
        let cyrillic_only = "привет мир";
        assert!(find_homoglyphs(cyrillic_only).is_empty());

        let mixed = "Please аpprove this".to_string(); // 'а' is Cyrillic
        assert!(!find_homoglyphs(&mixed).is_empty());
    }
}
