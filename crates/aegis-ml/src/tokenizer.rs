//! Greedy-longest-match WordPiece tokenization (spec §4.2).

use crate::vocab::{Vocab, CLS_TOKEN, PAD_TOKEN, SEP_TOKEN, UNK_TOKEN};

/// Fixed-length tokenizer output: three parallel int64 arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedInput {
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub token_type_ids: Vec<i64>,
}

pub struct WordpieceTokenizer {
    vocab: Vocab,
    max_length: usize,
}

impl WordpieceTokenizer {
    pub fn new(vocab: Vocab, max_length: usize) -> Self {
        Self { vocab, max_length }
    }

    pub fn vocab(&self) -> &Vocab {
        &self.vocab
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Splits on whitespace; each ASCII punctuation character becomes its
    /// own token (spec §4.2 "basic tokenization" step).
    fn basic_tokenize(text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let mut words = Vec::new();
        let mut current = String::new();
        for c in lowered.chars() {
            if c.is_whitespace() {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            } else if c.is_ascii_punctuation() {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                words.push(c.to_string());
            } else {
                current.push(c);
            }
        }
        if !current.is_empty() {
            words.push(current);
        }
        words
    }

    /// Greedy longest-prefix WordPiece split of a single basic token.
    fn wordpiece_split(&self, word: &str) -> Vec<String> {
        let chars: Vec<char> = word.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }
        let mut pieces = Vec::new();
        let mut start = 0usize;
        while start < chars.len() {
            let mut end = chars.len();
            let mut found: Option<String> = None;
            while start < end {
                let mut candidate: String = chars[start..end].iter().collect();
                if start > 0 {
                    candidate = format!("##{candidate}");
                }
                if self.vocab.id_of(&candidate).is_some() {
                    found = Some(candidate);
                    break;
                }
                end -= 1;
            }
            match found {
                Some(piece) => {
                    pieces.push(piece);
                    start = end;
                }
                None => return vec![UNK_TOKEN.to_string()],
            }
        }
        pieces
    }

    fn wordpiece_tokens(&self, text: &str) -> Vec<String> {
        Self::basic_tokenize(text)
            .iter()
            .flat_map(|w| self.wordpiece_split(w))
            .collect()
    }

    /// Tokenizes `text` into the fixed-length `[CLS] ... [SEP] [PAD]...`
    /// layout. Content is truncated to `max_length - 2` tokens.
    pub fn tokenize(&self, text: &str) -> TokenizedInput {
        let pieces = self.wordpiece_tokens(text);
        let content_budget = self.max_length.saturating_sub(2);
        let truncated = &pieces[..pieces.len().min(content_budget)];

        let cls = self.vocab.special_id(CLS_TOKEN) as i64;
        let sep = self.vocab.special_id(SEP_TOKEN) as i64;
        let pad = self.vocab.special_id(PAD_TOKEN) as i64;
        let unk = self.vocab.special_id(UNK_TOKEN) as i64;

        let mut input_ids = Vec::with_capacity(self.max_length);
        input_ids.push(cls);
        for piece in truncated {
            input_ids.push(self.vocab.id_of(piece).map(|id| id as i64).unwrap_or(unk));
        }
        input_ids.push(sep);

        let mut attention_mask = vec![1i64; input_ids.len()];
        while input_ids.len() < self.max_length {
            input_ids.push(pad);
            attention_mask.push(0);
        }

        let token_type_ids = vec![0i64; self.max_length];

        TokenizedInput {
            input_ids,
            attention_mask,
            token_type_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vocab() -> Vocab {
        Vocab::from_lines(
            vec![
                "[UNK]", "[PAD]", "[CLS]", "[SEP]", "hello", "world", "##lo", "hel", "!",
            ]
            .into_iter()
            .map(String::from),
        )
    }

    #[test]
    fn output_arrays_have_fixed_length_and_bracketing() {
        let tok = WordpieceTokenizer::new(sample_vocab(), 8);
        let out = tok.tokenize("hello world");
        assert_eq!(out.input_ids.len(), 8);
        assert_eq!(out.attention_mask.len(), 8);
        assert_eq!(out.token_type_ids.len(), 8);
        assert_eq!(out.input_ids[0], tok.vocab().special_id(CLS_TOKEN) as i64);
        let last_real = out
            .attention_mask
            .iter()
            .rposition(|&m| m == 1)
            .expect("at least one real token");
        assert_eq!(out.input_ids[last_real], tok.vocab().special_id(SEP_TOKEN) as i64);
        assert!(out.token_type_ids.iter().all(|&t| t == 0));
    }

    #[test]
    fn truncates_to_max_length_minus_two_content_tokens() {
        let tok = WordpieceTokenizer::new(sample_vocab(), 4);
        let out = tok.tokenize("hello world hello world hello world");
        // max_length=4 => 2 content tokens + CLS + SEP, no room for padding.
        assert_eq!(out.input_ids.len(), 4);
        assert!(out.attention_mask.iter().all(|&m| m == 1));
    }

    #[test]
    fn unknown_word_falls_back_to_unk() {
        let tok = WordpieceTokenizer::new(sample_vocab(), 8);
        let pieces = tok.wordpiece_tokens("xyzzy");
        assert_eq!(pieces, vec![UNK_TOKEN.to_string()]);
    }

    #[test]
    fn punctuation_becomes_its_own_token() {
        let tok = WordpieceTokenizer::new(sample_vocab(), 16);
        let pieces = tok.wordpiece_tokens("hello!");
        assert_eq!(pieces.last().map(String::as_str), Some("!"));
    }
}
