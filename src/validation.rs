//! Answer matching for typed and selected answers.
//!
//! Matching is deliberately loose: after normalization, an exact match or
//! substring containment in either direction is accepted. Expected answers
//! may list alternatives separated by `/` or `;` (e.g. `"hi / hello"`).

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// Result types
// ============================================================================

/// Result of comparing a learner's answer with the expected one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerResult {
  /// Normalized strings are identical
  Exact,
  /// One normalized string contains the other
  Contained,
  /// No match
  Incorrect,
}

impl AnswerResult {
  pub fn is_correct(&self) -> bool {
    !matches!(self, Self::Incorrect)
  }
}

// ============================================================================
// Normalization
// ============================================================================

/// Normalize an answer for comparison
/// - Unicode NFC so composed and decomposed accents compare equal
/// - Lowercase, trimmed
/// - Punctuation removed
/// - Internal whitespace collapsed
pub fn normalize(input: &str) -> String {
  input
    .nfc()
    .collect::<String>()
    .to_lowercase()
    .chars()
    .filter(|c| c.is_alphanumeric() || c.is_whitespace() || is_combining_mark(*c))
    .collect::<String>()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

/// Marks that survive NFC (e.g. Devanagari vowel signs) are letters, not punctuation
fn is_combining_mark(c: char) -> bool {
  unicode_normalization::char::is_combining_mark(c)
}

/// Split an expected answer into its accepted alternatives
fn alternatives(expected: &str) -> Vec<String> {
  let mut result: Vec<String> = Vec::new();
  for part in expected.split(['/', ';']) {
    let normalized = normalize(part);
    if !normalized.is_empty() && !result.contains(&normalized) {
      result.push(normalized);
    }
  }
  // The whole string also counts, so "a/b" typed verbatim still matches
  let whole = normalize(expected);
  if !whole.is_empty() && !result.contains(&whole) {
    result.push(whole);
  }
  result
}

// ============================================================================
// Matching
// ============================================================================

/// Compare a learner's answer against the expected answer.
///
/// Blank input never matches, even though "" is technically a substring of
/// everything.
pub fn check_answer(user_input: &str, expected: &str) -> AnswerResult {
  let given = normalize(user_input);
  if given.is_empty() {
    return AnswerResult::Incorrect;
  }

  let accepted = alternatives(expected);
  if accepted.iter().any(|a| *a == given) {
    return AnswerResult::Exact;
  }
  if accepted
    .iter()
    .any(|a| a.contains(given.as_str()) || given.contains(a.as_str()))
  {
    return AnswerResult::Contained;
  }
  AnswerResult::Incorrect
}
