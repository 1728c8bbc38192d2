//! Mastered/learning term lists stored as single-quote-joined strings.
//!
//! A term may sit in at most one of the two lists. Terms containing the
//! delimiter cannot be represented and are rejected up front.

use serde::Serialize;
use thiserror::Error;

pub const DELIMITER: char = '\'';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WordStringError {
    #[error("word must not be empty")]
    EmptyTerm,
    #[error("word must not contain the ' character")]
    ContainsDelimiter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WordStatus {
    Mastered,
    Learning,
    NotStarted,
}

impl WordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WordStatus::Mastered => "mastered",
            WordStatus::Learning => "learning",
            WordStatus::NotStarted => "not-started",
        }
    }
}

/// Both lists for one `(user, source)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordLists {
    pub mastered: Vec<String>,
    pub learning: Vec<String>,
}

pub fn normalize_term(term: &str) -> Result<String, WordStringError> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        return Err(WordStringError::EmptyTerm);
    }
    if trimmed.contains(DELIMITER) {
        return Err(WordStringError::ContainsDelimiter);
    }
    Ok(trimmed.to_string())
}

pub fn split_terms(encoded: &str) -> Vec<String> {
    encoded
        .split(DELIMITER)
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_terms<S: AsRef<str>>(terms: &[S]) -> String {
    let mut out = String::new();
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        out.push_str(term.as_ref());
    }
    out
}

impl WordLists {
    pub fn decode(mastered: &str, learning: &str) -> Self {
        Self {
            mastered: split_terms(mastered),
            learning: split_terms(learning),
        }
    }

    pub fn encode(&self) -> (String, String) {
        (join_terms(&self.mastered), join_terms(&self.learning))
    }

    pub fn status_of(&self, term: &str) -> WordStatus {
        let term = term.trim();
        if self.mastered.iter().any(|t| t.eq_ignore_ascii_case(term)) {
            WordStatus::Mastered
        } else if self.learning.iter().any(|t| t.eq_ignore_ascii_case(term)) {
            WordStatus::Learning
        } else {
            WordStatus::NotStarted
        }
    }

    /// Removes `term` from both lists, then appends it to the one picked by `is_correct`.
    pub fn record(&mut self, term: &str, is_correct: bool) -> WordStatus {
        self.mastered.retain(|t| !t.eq_ignore_ascii_case(term));
        self.learning.retain(|t| !t.eq_ignore_ascii_case(term));
        if is_correct {
            self.mastered.push(term.to_string());
            WordStatus::Mastered
        } else {
            self.learning.push(term.to_string());
            WordStatus::Learning
        }
    }
}
