//! Domain models used by the backend: riddle rows, match results and wisdom content kinds.

use serde::{Deserialize, Serialize};

/// One row of the riddle dataset. Immutable once the corpus is built.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiddleRecord {
  pub riddle: String,
  #[serde(default)] pub hint: String,
  pub answer: String,
  #[serde(default)] pub religion: String,
  #[serde(default)] pub landmark: String,
  #[serde(default)] pub difficulty: String,
  #[serde(default)] pub points: u32,
}

impl RiddleRecord {
  /// The text shown as "the correct answer": the landmark when the row has one.
  pub fn expected_display(&self) -> &str {
    if self.landmark.trim().is_empty() { &self.answer } else { &self.landmark }
  }
}

/// Which tier of the matcher produced a result?
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
  ExactSubstring,
  VectorSimilarity,
  ReligionFilteredSimilarity,
  EmotionFallback,
  RandomFallback,
}

impl MatchStrategy {
  pub fn as_str(&self) -> &'static str {
    match self {
      MatchStrategy::ExactSubstring => "exact_substring",
      MatchStrategy::VectorSimilarity => "vector_similarity",
      MatchStrategy::ReligionFilteredSimilarity => "religion_filtered_similarity",
      MatchStrategy::EmotionFallback => "emotion_fallback",
      MatchStrategy::RandomFallback => "random_fallback",
    }
  }

  /// True for tiers that returned a record without a confident match.
  pub fn is_fallback(&self) -> bool {
    matches!(self, MatchStrategy::EmotionFallback | MatchStrategy::RandomFallback)
  }
}

/// Per-query result. Built fresh for every query, never stored.
#[derive(Clone, Debug, Serialize)]
pub struct QueryResult {
  /// Position of the record in the corpus.
  pub index: usize,
  pub record: RiddleRecord,
  /// Cosine similarity in [0,1]; `None` when the exact-substring mode matched.
  pub confidence: Option<f32>,
  pub strategy: MatchStrategy,
  /// Religion or emotion category that steered the result, if any.
  pub category: Option<String>,
}

/// Result of the legacy exact-substring mode.
#[derive(Clone, Debug)]
pub enum SubstringMatch {
  Found(QueryResult),
  NoMatch,
}

/// Outcome of checking a submitted riddle answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerCheck {
  pub correct: bool,
  pub earned_points: u32,
}

/// Kind of daily-wisdom content.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ContentType {
  #[default]
  #[serde(alias = "quote")]
  Quote,
  #[serde(rename = "Short Story", alias = "short_story", alias = "story")]
  ShortStory,
  #[serde(alias = "pathway")]
  Pathway,
}

impl ContentType {
  pub fn as_str(&self) -> &'static str {
    match self {
      ContentType::Quote => "Quote",
      ContentType::ShortStory => "Short Story",
      ContentType::Pathway => "Pathway",
    }
  }

  /// Generation budget per content kind.
  pub fn max_tokens(&self) -> u32 {
    match self {
      ContentType::Quote => 60,
      ContentType::ShortStory => 220,
      ContentType::Pathway => 600,
    }
  }

  pub fn temperature(&self) -> f32 {
    match self {
      ContentType::Pathway => 0.35,
      _ => 0.7,
    }
  }
}

/// A belief system and the books its generated content may draw on.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Belief {
  pub name: String,
  #[serde(default)] pub books: Vec<String>,
  /// Label matched against `RiddleRecord::religion`; empty means "any".
  #[serde(default)] pub category: String,
}
