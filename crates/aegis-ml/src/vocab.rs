//! WordPiece vocabulary: one token per line, line number is the token id.

use crate::error::{MlError, Result};
use std::collections::HashMap;
use std::io::BufRead;

pub const UNK_TOKEN: &str = "[UNK]";
pub const PAD_TOKEN: &str = "[PAD]";
pub const CLS_TOKEN: &str = "[CLS]";
pub const SEP_TOKEN: &str = "[SEP]";

#[derive(Debug, Clone)]
pub struct Vocab {
    tokens: Vec<String>,
    ids: HashMap<String, u32>,
}

impl Vocab {
    pub fn from_lines<I: IntoIterator<Item = String>>(lines: I) -> Self {
        let tokens: Vec<String> = lines.into_iter().collect();
        let ids = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as u32))
            .collect();
        Self { tokens, ids }
    }

    pub fn load(path: &str) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| MlError::VocabLoad(e.to_string()))?;
        let reader = std::io::BufReader::new(file);
        let lines: std::result::Result<Vec<String>, _> = reader.lines().collect();
        let lines = lines.map_err(|e| MlError::VocabLoad(e.to_string()))?;
        Ok(Self::from_lines(lines))
    }

    pub fn id_of(&self, token: &str) -> Option<u32> {
        self.ids.get(token).copied()
    }

    /// Special-token ids fall back to 0 when the token isn't present in
    /// the vocab file (spec §4.2).
    pub fn special_id(&self, token: &str) -> u32 {
        self.id_of(token).unwrap_or(0)
    }

    pub fn token_of(&self, id: u32) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_special_tokens_fall_back_to_zero() {
        let vocab = Vocab::from_lines(vec!["[PAD]".into(), "hello".into()]);
        assert_eq!(vocab.special_id(PAD_TOKEN), 0);
        assert_eq!(vocab.special_id(CLS_TOKEN), 0); // not present
        assert_eq!(vocab.special_id("hello"), 1);
    }
}
