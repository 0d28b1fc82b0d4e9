//! Pads sparse lesson content out to a full practice session.
//!
//! Order of the output:
//! 1. the source items as loaded
//! 2. generated variants per source item: reverse translation, pronunciation
//!    (non-Latin scripts with reading data only), writing prompt
//! 3. phrasebook filler, numbered, until the session is full
//!
//! The result always has exactly [`SESSION_SIZE`] items. Content quality is
//! not guaranteed: the same phrase can recur with different suffixes.

use crate::config::SESSION_SIZE;
use crate::domain::{ItemType, QuizItem};

use super::phrasebook::{self, LanguageInfo};

/// Expand `source` into exactly `SESSION_SIZE` items for `language`/`lesson`.
pub fn expand_items(source: &[QuizItem], language: &str, lesson: u32) -> Vec<QuizItem> {
    let info = phrasebook::lookup(language);
    let mut items: Vec<QuizItem> = Vec::with_capacity(SESSION_SIZE);

    for (index, item) in source.iter().enumerate() {
        if items.len() == SESSION_SIZE {
            return items;
        }
        items.push(with_stable_id(item, language, lesson, index));
    }

    for (index, item) in source.iter().enumerate() {
        let base = with_stable_id(item, language, lesson, index);
        for variant in variants_of(&base, info) {
            if items.len() == SESSION_SIZE {
                return items;
            }
            items.push(variant);
        }
    }

    let mut counter = 1;
    while items.len() < SESSION_SIZE {
        items.push(filler_item(info, language, lesson, counter));
        counter += 1;
    }

    tracing::debug!(
        "Expanded {} source items for {}-{} ({} filler)",
        source.len(),
        language,
        lesson,
        counter - 1
    );
    items
}

/// Source items without an id get one derived from their position
fn with_stable_id(item: &QuizItem, language: &str, lesson: u32, index: usize) -> QuizItem {
    let mut item = item.clone();
    if item.id.trim().is_empty() {
        item.id = format!("{}-{}-{}", language, lesson, index + 1);
    }
    item
}

fn language_label(info: &LanguageInfo) -> &'static str {
    if std::ptr::eq(info, &phrasebook::GENERIC) {
        "the target language"
    } else {
        info.name
    }
}

/// Generated variants for one item, in emission order
fn variants_of(item: &QuizItem, info: &LanguageInfo) -> Vec<QuizItem> {
    let mut variants = Vec::with_capacity(3);
    let meaning = item.answer.trim();
    let label = language_label(info);

    if !meaning.is_empty() {
        let mut reverse = QuizItem::new(
            format!("{}-rev", item.id),
            ItemType::Reverse,
            &format!("How do you say \"{}\" in {}?", meaning, label),
            &item.question,
        );
        reverse.translation = Some(meaning.to_string());
        reverse.pronunciation = item.pronunciation.clone();
        reverse.difficulty = item.difficulty.clone();
        variants.push(reverse);
    }

    if !info.is_latin() {
        if let Some(reading) = item.pronunciation() {
            let mut pron = QuizItem::new(
                format!("{}-pron", item.id),
                ItemType::Pronunciation,
                &format!("How do you pronounce \"{}\"?", item.question),
                reading,
            );
            pron.translation = Some(meaning.to_string()).filter(|m| !m.is_empty());
            pron.difficulty = item.difficulty.clone();
            variants.push(pron);
        }
    }

    if !meaning.is_empty() {
        let mut writing = QuizItem::new(
            format!("{}-write", item.id),
            ItemType::Writing,
            &format!("Write \"{}\" in {}", meaning, label),
            &item.question,
        );
        writing.translation = Some(meaning.to_string());
        writing.pronunciation = item.pronunciation.clone();
        writing.example = item.example.clone();
        writing.difficulty = item.difficulty.clone();
        variants.push(writing);
    }

    variants
}

/// Synthetic item number `counter` (1-based). Every full pass over the
/// phrasebook flips direction so consecutive rounds aren't identical.
fn filler_item(info: &LanguageInfo, language: &str, lesson: u32, counter: usize) -> QuizItem {
    let phrases = info.phrases;
    let phrase = phrases[(counter - 1) % phrases.len()];
    let round = (counter - 1) / phrases.len();
    let id = format!("{}-{}-extra-{}", language, lesson, counter);

    let mut item = if round % 2 == 0 {
        QuizItem::new(id, ItemType::Filler, phrase.text, phrase.meaning)
    } else {
        let mut item = QuizItem::new(
            id,
            ItemType::Filler,
            &format!("How do you say \"{}\" in {}?", phrase.meaning, language_label(info)),
            phrase.text,
        );
        item.translation = Some(phrase.meaning.to_string());
        item
    };
    item.pronunciation = phrase.reading.map(String::from);
    item.example = Some(format!("{} #{}", phrase.text, counter));
    item
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ja_source(n: usize) -> Vec<QuizItem> {
        let words = [
            ("犬", "dog", "inu"),
            ("猫", "cat", "neko"),
            ("水", "water", "mizu"),
            ("本", "book", "hon"),
            ("山", "mountain", "yama"),
            ("川", "river", "kawa"),
        ];
        (0..n)
            .map(|i| {
                let (q, a, r) = words[i % words.len()];
                QuizItem::new(format!("w{}", i), ItemType::Vocabulary, q, a).with_pronunciation(r)
            })
            .collect()
    }

    #[test]
    fn test_empty_source_yields_full_session() {
        let items = expand_items(&[], "ja", 1);
        assert_eq!(items.len(), SESSION_SIZE);
        assert!(items.iter().all(|i| i.item_type == ItemType::Filler));
    }

    #[test]
    fn test_always_exactly_session_size() {
        for n in [0, 1, 5, 24, 25, 33, 99, 100, 101, 250] {
            assert_eq!(expand_items(&ja_source(n), "ja", 1).len(), SESSION_SIZE, "n = {}", n);
            assert_eq!(expand_items(&ja_source(n), "es", 1).len(), SESSION_SIZE, "n = {}", n);
            assert_eq!(expand_items(&ja_source(n), "tlh", 1).len(), SESSION_SIZE, "n = {}", n);
        }
    }

    #[test]
    fn test_source_items_come_first() {
        let source = ja_source(5);
        let items = expand_items(&source, "ja", 1);
        assert_eq!(&items[..5], &source[..]);
    }

    #[test]
    fn test_non_latin_gets_pronunciation_variants() {
        let items = expand_items(&ja_source(5), "ja", 1);
        // 5 originals + 3 variants each, then filler
        assert_eq!(items[5].item_type, ItemType::Reverse);
        assert_eq!(items[6].item_type, ItemType::Pronunciation);
        assert_eq!(items[7].item_type, ItemType::Writing);
        assert_eq!(items[6].answer, "inu");
        assert_eq!(items[19].id, "w4-write");
        assert_eq!(items[20].item_type, ItemType::Filler);
    }

    #[test]
    fn test_latin_script_skips_pronunciation() {
        let source = vec![
            QuizItem::new("a", ItemType::Vocabulary, "hola", "hello").with_pronunciation("OH-lah"),
        ];
        let items = expand_items(&source, "es", 2);
        assert_eq!(items[1].item_type, ItemType::Reverse);
        assert_eq!(items[2].item_type, ItemType::Writing);
        assert!(items.iter().all(|i| i.item_type != ItemType::Pronunciation));
    }

    #[test]
    fn test_reverse_swaps_question_and_answer() {
        let source = vec![QuizItem::new("a", ItemType::Vocabulary, "hola", "hello")];
        let items = expand_items(&source, "es", 1);
        assert_eq!(items[1].answer, "hola");
        assert!(items[1].question.contains("hello"));
        assert!(items[1].question.contains("Spanish"));
    }

    #[test]
    fn test_missing_ids_are_assigned() {
        let source = vec![QuizItem::new("", ItemType::Phrase, "merci", "thanks")];
        let items = expand_items(&source, "fr", 3);
        assert_eq!(items[0].id, "fr-3-1");
        assert_eq!(items[1].id, "fr-3-1-rev");
    }

    #[test]
    fn test_blank_answer_skips_meaning_variants() {
        let source = vec![QuizItem::new("a", ItemType::Vocabulary, "?", "  ")];
        let items = expand_items(&source, "es", 1);
        assert_eq!(items[1].item_type, ItemType::Filler);
    }

    #[test]
    fn test_filler_ids_are_numbered() {
        let items = expand_items(&[], "ko", 7);
        assert_eq!(items[0].id, "ko-7-extra-1");
        assert_eq!(items[99].id, "ko-7-extra-100");
        // Same phrase recurs with a different suffix
        assert_eq!(items[0].question, items[6].question);
        assert_ne!(items[0].example, items[6].example);
    }

    #[test]
    fn test_filler_alternates_direction() {
        let items = expand_items(&[], "ko", 1);
        // 3 phrases: round 0 forward, round 1 reversed
        assert_eq!(items[0].question, "안녕하세요");
        assert_eq!(items[3].answer, "안녕하세요");
        assert!(items[3].question.contains("Korean"));
    }

    #[test]
    fn test_oversized_source_is_truncated() {
        let source = ja_source(150);
        let items = expand_items(&source, "ja", 1);
        assert_eq!(items.len(), SESSION_SIZE);
        assert_eq!(items[99].id, "w99");
    }

    #[test]
    fn test_unknown_language_uses_generic_label() {
        let source = vec![QuizItem::new("a", ItemType::Vocabulary, "qapla'", "success")];
        let items = expand_items(&source, "tlh", 1);
        assert!(items[1].question.contains("the target language"));
    }
}
