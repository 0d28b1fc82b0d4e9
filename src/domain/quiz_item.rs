use serde::{Deserialize, Deserializer, Serialize};

/// What kind of practice a quiz item represents.
///
/// Lesson files in the wild carry all sorts of type strings; anything unknown
/// is read as vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
  Grammar,
  Phrase,
  /// Generated: answer-to-question translation
  Reverse,
  /// Generated: asks for the romanized reading
  Pronunciation,
  /// Generated: asks the learner to write the target-language form
  Writing,
  /// Generated from the phrasebook when real content runs out
  Filler,
  #[default]
  #[serde(other)]
  Vocabulary,
}

impl ItemType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Vocabulary => "vocabulary",
      Self::Grammar => "grammar",
      Self::Phrase => "phrase",
      Self::Reverse => "reverse",
      Self::Pronunciation => "pronunciation",
      Self::Writing => "writing",
      Self::Filler => "filler",
    }
  }
}

/// The atomic unit of lesson content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizItem {
  #[serde(default, deserialize_with = "string_or_number")]
  pub id: String,
  #[serde(rename = "type", default)]
  pub item_type: ItemType,
  pub question: String,
  pub answer: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub options: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub translation: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pronunciation: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub example: Option<String>,
  #[serde(
    default,
    deserialize_with = "optional_string_or_number",
    skip_serializing_if = "Option::is_none"
  )]
  pub difficulty: Option<String>,
}

impl QuizItem {
  pub fn new(id: impl Into<String>, item_type: ItemType, question: &str, answer: &str) -> Self {
    Self {
      id: id.into(),
      item_type,
      question: question.to_string(),
      answer: answer.to_string(),
      options: None,
      translation: None,
      pronunciation: None,
      example: None,
      difficulty: None,
    }
  }

  pub fn with_pronunciation(mut self, pronunciation: &str) -> Self {
    self.pronunciation = Some(pronunciation.to_string());
    self
  }

  pub fn with_example(mut self, example: &str) -> Self {
    self.example = Some(example.to_string());
    self
  }

  pub fn with_options(mut self, options: Vec<String>) -> Self {
    self.options = Some(options);
    self
  }

  /// Pronunciation data, if present and non-blank
  pub fn pronunciation(&self) -> Option<&str> {
    self
      .pronunciation
      .as_deref()
      .map(str::trim)
      .filter(|p| !p.is_empty())
  }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(optional_string_or_number(deserializer)?.unwrap_or_default())
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<serde_json::Value>::deserialize(deserializer)?;
  Ok(match value {
    None | Some(serde_json::Value::Null) => None,
    Some(serde_json::Value::String(s)) => Some(s),
    Some(other) => Some(other.to_string()),
  })
}
