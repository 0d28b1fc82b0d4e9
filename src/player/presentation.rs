//! Per-mode rendering of a quiz item for the client.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::config::{DISTRACTOR_COUNT, MATCHING_EXTRA_PAIRS};
use crate::domain::QuizItem;
use crate::validation::normalize;

use super::QuizMode;

const BLANK: &str = "____";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum Presentation {
  Flashcard {
    item_id: String,
    front: String,
    back: String,
    pronunciation: Option<String>,
  },
  MultipleChoice {
    item_id: String,
    question: String,
    options: Vec<String>,
  },
  /// Left column in item order, right column shuffled. The current item is
  /// always the first left entry.
  Matching {
    item_id: String,
    left: Vec<String>,
    right: Vec<String>,
  },
  DragDrop {
    item_id: String,
    question: String,
    tokens: Vec<String>,
  },
  Writing {
    item_id: String,
    prompt: String,
    hint: Option<String>,
  },
  FillBlank {
    item_id: String,
    sentence: String,
    hint: Option<String>,
  },
}

/// Build the presentation of `items[index]` in `mode`.
pub fn present<R: Rng + ?Sized>(
  items: &[QuizItem],
  index: usize,
  mode: QuizMode,
  rng: &mut R,
) -> Presentation {
  let item = &items[index];
  let item_id = item.id.clone();

  match mode {
    QuizMode::Flashcard => Presentation::Flashcard {
      item_id,
      front: item.question.clone(),
      back: item.answer.clone(),
      pronunciation: item.pronunciation().map(String::from),
    },
    QuizMode::MultipleChoice => Presentation::MultipleChoice {
      item_id,
      question: item.question.clone(),
      options: choices(items, index, rng),
    },
    QuizMode::Matching => {
      let (left, right) = matching_columns(items, index, rng);
      Presentation::Matching {
        item_id,
        left,
        right,
      }
    }
    QuizMode::DragDrop => Presentation::DragDrop {
      item_id,
      question: item.question.clone(),
      tokens: scrambled_tokens(&item.answer, rng),
    },
    QuizMode::Writing => Presentation::Writing {
      item_id,
      prompt: item.question.clone(),
      hint: item.pronunciation().map(String::from),
    },
    QuizMode::FillBlank => Presentation::FillBlank {
      item_id,
      sentence: blanked_sentence(item),
      hint: item.translation.clone(),
    },
  }
}

/// Correct answer plus up to DISTRACTOR_COUNT distinct distractors, shuffled.
/// The item's own `options` are preferred over answers borrowed from other items.
pub(crate) fn choices<R: Rng + ?Sized>(items: &[QuizItem], index: usize, rng: &mut R) -> Vec<String> {
  let item = &items[index];
  let correct = item.answer.clone();
  let mut seen = vec![normalize(&correct)];
  let mut distractors: Vec<String> = Vec::new();

  let mut offer = |candidate: &str, distractors: &mut Vec<String>| {
    let key = normalize(candidate);
    if !key.is_empty() && !seen.contains(&key) {
      seen.push(key);
      distractors.push(candidate.to_string());
    }
  };

  // Phase 1: authored options
  let mut authored: Vec<String> = item.options.clone().unwrap_or_default();
  authored.shuffle(rng);
  for option in &authored {
    if distractors.len() == DISTRACTOR_COUNT {
      break;
    }
    offer(option, &mut distractors);
  }

  // Phase 2: answers of other items in the session
  if distractors.len() < DISTRACTOR_COUNT {
    let mut others: Vec<&str> = items
      .iter()
      .enumerate()
      .filter(|(i, _)| *i != index)
      .map(|(_, other)| other.answer.as_str())
      .collect();
    others.shuffle(rng);
    for other in others {
      if distractors.len() == DISTRACTOR_COUNT {
        break;
      }
      offer(other, &mut distractors);
    }
  }

  let mut options = distractors;
  options.push(correct);
  options.shuffle(rng);
  options
}

/// Current item plus the next few items with distinct answers (wrapping)
fn matching_columns<R: Rng + ?Sized>(
  items: &[QuizItem],
  index: usize,
  rng: &mut R,
) -> (Vec<String>, Vec<String>) {
  let mut picked: Vec<&QuizItem> = vec![&items[index]];
  let mut seen = vec![normalize(&items[index].answer)];

  for offset in 1..items.len() {
    if picked.len() > MATCHING_EXTRA_PAIRS {
      break;
    }
    let candidate = &items[(index + offset) % items.len()];
    let key = normalize(&candidate.answer);
    if !key.is_empty() && !seen.contains(&key) {
      seen.push(key);
      picked.push(candidate);
    }
  }

  let left = picked.iter().map(|i| i.question.clone()).collect();
  let mut right: Vec<String> = picked.iter().map(|i| i.answer.clone()).collect();
  right.shuffle(rng);
  (left, right)
}

/// Words of the answer in random order. Answers without spaces (CJK and
/// single words) are split into characters instead.
fn scrambled_tokens<R: Rng + ?Sized>(answer: &str, rng: &mut R) -> Vec<String> {
  let words: Vec<String> = answer.split_whitespace().map(String::from).collect();
  let mut tokens = if words.len() > 1 {
    words
  } else {
    answer.trim().chars().map(String::from).collect()
  };
  tokens.shuffle(rng);
  tokens
}

/// The example sentence with the answer blanked out, or a plain prompt when
/// the example doesn't contain it.
fn blanked_sentence(item: &QuizItem) -> String {
  let answer = item.answer.trim();
  if let Some(example) = item.example.as_deref()
    && !answer.is_empty()
    && example.contains(answer)
  {
    return example.replacen(answer, BLANK, 1);
  }
  format!("{} = {}", item.question, BLANK)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ItemType;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn items() -> Vec<QuizItem> {
    vec![
      QuizItem::new("1", ItemType::Vocabulary, "perro", "dog"),
      QuizItem::new("2", ItemType::Vocabulary, "gato", "cat"),
      QuizItem::new("3", ItemType::Vocabulary, "pájaro", "bird"),
      QuizItem::new("4", ItemType::Vocabulary, "pez", "fish"),
      QuizItem::new("5", ItemType::Vocabulary, "caballo", "horse"),
      QuizItem::new("6", ItemType::Vocabulary, "perro", "Dog!"),
    ]
  }

  fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
  }

  #[test]
  fn test_multiple_choice_contains_answer_and_distinct_distractors() {
    let items = items();
    let options = choices(&items, 0, &mut rng());
    assert_eq!(options.len(), DISTRACTOR_COUNT + 1);
    assert!(options.contains(&"dog".to_string()));
    // "Dog!" normalizes to the correct answer and must not appear
    assert!(!options.contains(&"Dog!".to_string()));
    let mut keys: Vec<String> = options.iter().map(|o| normalize(o)).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), options.len());
  }

  #[test]
  fn test_multiple_choice_prefers_authored_options() {
    let mut items = items();
    items[0] = items[0]
      .clone()
      .with_options(vec!["dog".into(), "wolf".into(), "fox".into(), "coyote".into()]);
    let options = choices(&items, 0, &mut rng());
    let mut sorted = options.clone();
    sorted.sort();
    assert_eq!(sorted, vec!["coyote", "dog", "fox", "wolf"]);
  }

  #[test]
  fn test_multiple_choice_with_single_item() {
    let items = vec![QuizItem::new("1", ItemType::Vocabulary, "sí", "yes")];
    assert_eq!(choices(&items, 0, &mut rng()), vec!["yes".to_string()]);
  }

  #[test]
  fn test_matching_pairs() {
    let items = items();
    match present(&items, 4, QuizMode::Matching, &mut rng()) {
      Presentation::Matching { left, right, .. } => {
        assert_eq!(left.len(), MATCHING_EXTRA_PAIRS + 1);
        assert_eq!(left[0], "caballo");
        // wraps to the start; item 0 ("dog") duplicates "Dog!" and is skipped
        assert_eq!(left, vec!["caballo", "perro", "gato", "pájaro"]);
        let mut sorted = right.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["Dog!", "bird", "cat", "horse"]);
      }
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn test_drag_drop_tokens() {
    let item = QuizItem::new("1", ItemType::Phrase, "good morning", "buenos días");
    match present(&[item], 0, QuizMode::DragDrop, &mut rng()) {
      Presentation::DragDrop { mut tokens, .. } => {
        tokens.sort();
        assert_eq!(tokens, vec!["buenos", "días"]);
      }
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn test_drag_drop_splits_cjk_into_characters() {
    let item = QuizItem::new("1", ItemType::Phrase, "thank you", "ありがとう");
    match present(&[item], 0, QuizMode::DragDrop, &mut rng()) {
      Presentation::DragDrop { tokens, .. } => {
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens.concat().chars().count(), 5);
      }
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn test_fill_blank_uses_example() {
    let item = QuizItem::new("1", ItemType::Vocabulary, "dog", "perro").with_example("El perro corre.");
    match present(&[item], 0, QuizMode::FillBlank, &mut rng()) {
      Presentation::FillBlank { sentence, .. } => assert_eq!(sentence, "El ____ corre."),
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn test_fill_blank_without_example() {
    let item = QuizItem::new("1", ItemType::Vocabulary, "dog", "perro");
    match present(&[item], 0, QuizMode::FillBlank, &mut rng()) {
      Presentation::FillBlank { sentence, .. } => assert_eq!(sentence, "dog = ____"),
      other => panic!("unexpected {:?}", other),
    }
  }

  #[test]
  fn test_flashcard_and_writing() {
    let item = QuizItem::new("1", ItemType::Vocabulary, "犬", "dog").with_pronunciation("inu");
    let items = [item];
    assert_eq!(
      present(&items, 0, QuizMode::Flashcard, &mut rng()),
      Presentation::Flashcard {
        item_id: "1".into(),
        front: "犬".into(),
        back: "dog".into(),
        pronunciation: Some("inu".into()),
      }
    );
    assert_eq!(
      present(&items, 0, QuizMode::Writing, &mut rng()),
      Presentation::Writing {
        item_id: "1".into(),
        prompt: "犬".into(),
        hint: Some("inu".into()),
      }
    );
  }

  #[test]
  fn test_presentation_serializes_with_mode_tag() {
    let item = QuizItem::new("1", ItemType::Vocabulary, "q", "a");
    let json = serde_json::to_value(present(&[item], 0, QuizMode::FillBlank, &mut rng())).unwrap();
    assert_eq!(json["mode"], "fill-blank");
  }
}
