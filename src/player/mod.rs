//! Lesson player state machine.
//!
//! A session walks a fixed list of quiz items in batches. Each item is
//! presented in the learner's chosen mode, answered (or skipped), and then
//! advanced past. Hearts, score and streak are tracked along the way; every
//! `BATCH_SIZE` answered items the session pauses on a batch summary.
//!
//! ```text
//! presenting --answer/rate--> answered --advance--> presenting
//!     |                                     |-> batch_complete --continue/restart/review--> presenting
//!     |--skip--------------------------------|-> lesson_complete --review--> presenting
//!                                            |-> out_of_hearts --refill--> presenting
//! ```

pub mod presentation;

use serde::{Deserialize, Serialize};

use crate::config::{
  BATCH_SIZE, CORRECT_POINTS, FLASHCARD_EASY_POINTS, FLASHCARD_OK_POINTS, MAX_HEARTS,
};
use crate::domain::QuizItem;
use crate::validation::{check_answer, AnswerResult};

pub use presentation::{present, Presentation};

/// How the current item is shown. Independent of item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum QuizMode {
  Flashcard,
  #[default]
  MultipleChoice,
  Matching,
  DragDrop,
  Writing,
  FillBlank,
}

impl QuizMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Flashcard => "flashcard",
      Self::MultipleChoice => "multiple-choice",
      Self::Matching => "matching",
      Self::DragDrop => "drag-drop",
      Self::Writing => "writing",
      Self::FillBlank => "fill-blank",
    }
  }
}

/// Self-assessment after flipping a flashcard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashcardRating {
  /// Didn't know it: treated as incorrect
  Again,
  Ok,
  Easy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Presenting,
  Answered,
  BatchComplete,
  LessonComplete,
  OutOfHearts,
}

impl Phase {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Presenting => "presenting",
      Self::Answered => "answered",
      Self::BatchComplete => "batch_complete",
      Self::LessonComplete => "lesson_complete",
      Self::OutOfHearts => "out_of_hearts",
    }
  }
}

/// Per-batch counters shown on the summary screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
  pub correct: u32,
  pub incorrect: u32,
  pub skipped: u32,
}

impl BatchStats {
  pub fn total(&self) -> u32 {
    self.correct + self.incorrect + self.skipped
  }
}

/// Which list the session is currently walking
#[derive(Debug, Clone, PartialEq, Eq)]
enum Round {
  Main,
  /// Replaying missed items; `queue` holds indices into `items`
  Review { queue: Vec<usize>, position: usize },
}

/// What happened on the last answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
  pub item_id: String,
  pub correct: bool,
  pub result: AnswerResult,
  pub expected: String,
  pub points: u32,
}

/// Final numbers handed to persistence when a lesson completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonResult {
  pub lesson_id: String,
  pub language: String,
  pub lesson: u32,
  pub score: u32,
  pub correct_answers: u32,
  pub incorrect_answers: u32,
  pub skipped: u32,
  pub best_streak: u32,
  pub hearts_left: u8,
}

/// Illegal transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
  InvalidAction { action: &'static str, phase: Phase },
  WrongMode { action: &'static str, mode: QuizMode },
  EmptyReviewQueue,
}

impl std::fmt::Display for SessionError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SessionError::InvalidAction { action, phase } => {
        write!(f, "Cannot {} while {}", action, phase.as_str())
      }
      SessionError::WrongMode { action, mode } => {
        write!(f, "Cannot {} in {} mode", action, mode.as_str())
      }
      SessionError::EmptyReviewQueue => write!(f, "No incorrect answers to review"),
    }
  }
}

impl std::error::Error for SessionError {}

/// Serializable snapshot for clients
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
  pub lesson_id: String,
  pub mode: QuizMode,
  pub phase: Phase,
  pub position: usize,
  pub total_items: usize,
  pub batch_number: usize,
  pub batch: BatchStats,
  pub hearts: u8,
  pub score: u32,
  pub streak: u32,
  pub best_streak: u32,
  pub correct_answers: u32,
  pub incorrect_answers: u32,
  pub skipped: u32,
  pub answered_count: usize,
  pub reviewing: bool,
  pub review_queue: usize,
  pub last_outcome: Option<AnswerOutcome>,
}

#[derive(Debug, Clone)]
pub struct LessonSession {
  pub user_id: Option<i64>,
  pub lesson_id: String,
  pub language: String,
  pub lesson: u32,
  items: Vec<QuizItem>,
  index: usize,
  mode: QuizMode,
  phase: Phase,
  round: Round,
  hearts: u8,
  score: u32,
  streak: u32,
  best_streak: u32,
  correct_answers: u32,
  incorrect_answers: u32,
  skipped: u32,
  /// Main-round items answered or skipped
  answered_count: usize,
  batch: BatchStats,
  batch_start: usize,
  review_queue: Vec<usize>,
  last_outcome: Option<AnswerOutcome>,
  result_taken: bool,
}

impl LessonSession {
  pub fn new(lesson_id: &str, language: &str, lesson: u32, items: Vec<QuizItem>) -> Self {
    let phase = if items.is_empty() {
      Phase::LessonComplete
    } else {
      Phase::Presenting
    };
    Self {
      user_id: None,
      lesson_id: lesson_id.to_string(),
      language: language.to_string(),
      lesson,
      items,
      index: 0,
      mode: QuizMode::default(),
      phase,
      round: Round::Main,
      hearts: MAX_HEARTS,
      score: 0,
      streak: 0,
      best_streak: 0,
      correct_answers: 0,
      incorrect_answers: 0,
      skipped: 0,
      answered_count: 0,
      batch: BatchStats::default(),
      batch_start: 0,
      review_queue: Vec::new(),
      last_outcome: None,
      result_taken: false,
    }
  }

  pub fn with_user(mut self, user_id: i64) -> Self {
    self.user_id = Some(user_id);
    self
  }

  // ==================== Accessors ====================

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn mode(&self) -> QuizMode {
    self.mode
  }

  pub fn hearts(&self) -> u8 {
    self.hearts
  }

  pub fn score(&self) -> u32 {
    self.score
  }

  pub fn streak(&self) -> u32 {
    self.streak
  }

  pub fn correct_answers(&self) -> u32 {
    self.correct_answers
  }

  pub fn batch_stats(&self) -> BatchStats {
    self.batch
  }

  pub fn items(&self) -> &[QuizItem] {
    &self.items
  }

  pub fn review_queue(&self) -> &[usize] {
    &self.review_queue
  }

  pub fn is_reviewing(&self) -> bool {
    matches!(self.round, Round::Review { .. })
  }

  /// Index into `items` of the item being played
  pub fn current_index(&self) -> Option<usize> {
    match &self.round {
      Round::Main => (self.index < self.items.len()).then_some(self.index),
      Round::Review { queue, position } => queue.get(*position).copied(),
    }
  }

  pub fn current_item(&self) -> Option<&QuizItem> {
    self.current_index().and_then(|i| self.items.get(i))
  }

  /// Presentation of the current item in the current mode
  pub fn presentation(&self) -> Option<Presentation> {
    let index = self.current_index()?;
    if !matches!(self.phase, Phase::Presenting | Phase::Answered) {
      return None;
    }
    Some(present(&self.items, index, self.mode, &mut rand::rng()))
  }

  pub fn view(&self) -> SessionView {
    let position = self.current_index().unwrap_or(self.index);
    SessionView {
      lesson_id: self.lesson_id.clone(),
      mode: self.mode,
      phase: self.phase,
      position,
      total_items: self.items.len(),
      batch_number: self.batch_start / BATCH_SIZE + 1,
      batch: self.batch,
      hearts: self.hearts,
      score: self.score,
      streak: self.streak,
      best_streak: self.best_streak,
      correct_answers: self.correct_answers,
      incorrect_answers: self.incorrect_answers,
      skipped: self.skipped,
      answered_count: self.answered_count,
      reviewing: self.is_reviewing(),
      review_queue: match &self.round {
        Round::Review { queue, position } => queue.len().saturating_sub(*position),
        Round::Main => self.review_queue.len(),
      },
      last_outcome: self.last_outcome.clone(),
    }
  }

  // ==================== Transitions ====================

  /// Switch presentation mode. Allowed at any time.
  pub fn set_mode(&mut self, mode: QuizMode) {
    self.mode = mode;
  }

  /// Check a typed or selected answer against the current item.
  pub fn submit_answer(&mut self, input: &str) -> Result<AnswerOutcome, SessionError> {
    self.require_phase("answer", Phase::Presenting)?;
    if self.mode == QuizMode::Flashcard {
      return Err(SessionError::WrongMode {
        action: "submit a typed answer",
        mode: self.mode,
      });
    }
    let (index, item) = self.current()?;

    let result = check_answer(input, &item.answer);
    let outcome = AnswerOutcome {
      item_id: item.id.clone(),
      correct: result.is_correct(),
      result,
      expected: item.answer.clone(),
      points: if result.is_correct() { CORRECT_POINTS } else { 0 },
    };
    self.record(index, &outcome);
    Ok(outcome)
  }

  /// Self-rate a flipped flashcard.
  pub fn rate_flashcard(&mut self, rating: FlashcardRating) -> Result<AnswerOutcome, SessionError> {
    self.require_phase("rate a flashcard", Phase::Presenting)?;
    if self.mode != QuizMode::Flashcard {
      return Err(SessionError::WrongMode {
        action: "rate a flashcard",
        mode: self.mode,
      });
    }
    let (index, item) = self.current()?;

    let (result, points) = match rating {
      FlashcardRating::Again => (AnswerResult::Incorrect, 0),
      FlashcardRating::Ok => (AnswerResult::Exact, FLASHCARD_OK_POINTS),
      FlashcardRating::Easy => (AnswerResult::Exact, FLASHCARD_EASY_POINTS),
    };
    let outcome = AnswerOutcome {
      item_id: item.id.clone(),
      correct: result.is_correct(),
      result,
      expected: item.answer.clone(),
      points,
    };
    self.record(index, &outcome);
    Ok(outcome)
  }

  /// Skip the current item: neither correct nor incorrect, but the streak
  /// breaks. Advances immediately.
  pub fn skip(&mut self) -> Result<(), SessionError> {
    self.require_phase("skip", Phase::Presenting)?;
    self.current()?;

    self.streak = 0;
    self.skipped += 1;
    self.last_outcome = None;
    if !self.is_reviewing() {
      self.answered_count += 1;
      self.batch.skipped += 1;
    }
    self.step_forward();
    Ok(())
  }

  /// Move past an answered item.
  pub fn advance(&mut self) -> Result<Phase, SessionError> {
    self.require_phase("advance", Phase::Answered)?;
    self.step_forward();
    Ok(self.phase)
  }

  /// Start the next batch from the summary screen.
  pub fn continue_batch(&mut self) -> Result<(), SessionError> {
    self.require_phase("continue", Phase::BatchComplete)?;
    self.batch = BatchStats::default();
    self.batch_start = self.index;
    self.phase = Phase::Presenting;
    Ok(())
  }

  /// Replay the batch that just finished. Totals keep what was already
  /// earned; batch counters and the batch's review entries are cleared.
  pub fn restart_batch(&mut self) -> Result<(), SessionError> {
    self.require_phase("restart the batch", Phase::BatchComplete)?;
    let replayed = self.index - self.batch_start;
    self.answered_count -= replayed;
    self.index = self.batch_start;
    let batch_start = self.batch_start;
    self.review_queue.retain(|&i| i < batch_start);
    self.batch = BatchStats::default();
    self.last_outcome = None;
    self.phase = Phase::Presenting;
    Ok(())
  }

  /// Play only the items answered incorrectly so far.
  pub fn start_review(&mut self) -> Result<(), SessionError> {
    if !matches!(self.phase, Phase::BatchComplete | Phase::LessonComplete) {
      return Err(SessionError::InvalidAction {
        action: "review",
        phase: self.phase,
      });
    }
    if self.review_queue.is_empty() {
      return Err(SessionError::EmptyReviewQueue);
    }
    let queue = std::mem::take(&mut self.review_queue);
    self.round = Round::Review { queue, position: 0 };
    self.last_outcome = None;
    self.phase = Phase::Presenting;
    Ok(())
  }

  /// Reset hearts to full. No cost, no cooldown.
  pub fn refill_hearts(&mut self) {
    self.hearts = MAX_HEARTS;
    if self.phase == Phase::OutOfHearts {
      self.phase = self.resume_phase();
    }
  }

  /// The completed lesson's numbers, handed out once.
  pub fn take_result(&mut self) -> Option<LessonResult> {
    if self.phase != Phase::LessonComplete || self.result_taken {
      return None;
    }
    self.result_taken = true;
    Some(LessonResult {
      lesson_id: self.lesson_id.clone(),
      language: self.language.clone(),
      lesson: self.lesson,
      score: self.score,
      correct_answers: self.correct_answers,
      incorrect_answers: self.incorrect_answers,
      skipped: self.skipped,
      best_streak: self.best_streak,
      hearts_left: self.hearts,
    })
  }

  /// Give back a result that could not be stored, so the next
  /// `take_result` hands it out again.
  pub fn return_result(&mut self) {
    self.result_taken = false;
  }

  // ==================== Internals ====================

  fn require_phase(&self, action: &'static str, expected: Phase) -> Result<(), SessionError> {
    if self.phase == expected {
      Ok(())
    } else {
      Err(SessionError::InvalidAction {
        action,
        phase: self.phase,
      })
    }
  }

  fn current(&self) -> Result<(usize, &QuizItem), SessionError> {
    self
      .current_index()
      .and_then(|i| self.items.get(i).map(|item| (i, item)))
      .ok_or(SessionError::InvalidAction {
        action: "answer",
        phase: self.phase,
      })
  }

  fn record(&mut self, index: usize, outcome: &AnswerOutcome) {
    let in_main = !self.is_reviewing();
    if outcome.correct {
      self.score += outcome.points;
      self.streak += 1;
      self.best_streak = self.best_streak.max(self.streak);
      self.correct_answers += 1;
      if in_main {
        self.batch.correct += 1;
      }
    } else {
      self.hearts = self.hearts.saturating_sub(1);
      self.streak = 0;
      self.incorrect_answers += 1;
      self.review_queue.push(index);
      if in_main {
        self.batch.incorrect += 1;
      }
    }
    if in_main {
      self.answered_count += 1;
    }
    self.last_outcome = Some(outcome.clone());
    self.phase = Phase::Answered;
  }

  fn step_forward(&mut self) {
    match &mut self.round {
      Round::Main => self.index += 1,
      Round::Review { position, .. } => *position += 1,
    }

    if self.hearts == 0 {
      tracing::debug!("Lesson {} out of hearts", self.lesson_id);
      self.phase = Phase::OutOfHearts;
      return;
    }

    self.phase = match self.review_finished() {
      None if self.index >= self.items.len() => Phase::LessonComplete,
      None if self.answered_count % BATCH_SIZE == 0 => Phase::BatchComplete,
      None => Phase::Presenting,
      Some(false) => Phase::Presenting,
      Some(true) => self.finish_review(),
    };
  }

  /// None in the main round, otherwise whether the review queue is used up
  fn review_finished(&self) -> Option<bool> {
    match &self.round {
      Round::Main => None,
      Round::Review { queue, position } => Some(*position >= queue.len()),
    }
  }

  /// Leave the review round and return to wherever the main round paused
  fn finish_review(&mut self) -> Phase {
    self.round = Round::Main;
    if self.index >= self.items.len() {
      Phase::LessonComplete
    } else {
      Phase::BatchComplete
    }
  }

  fn resume_phase(&mut self) -> Phase {
    match self.review_finished() {
      None if self.index >= self.items.len() => Phase::LessonComplete,
      None if self.batch.total() as usize >= BATCH_SIZE => Phase::BatchComplete,
      None => Phase::Presenting,
      Some(false) => Phase::Presenting,
      Some(true) => self.finish_review(),
    }
  }
}
