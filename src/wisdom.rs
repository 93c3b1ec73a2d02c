//! Daily-wisdom helpers: belief/book selection, cleanup of generated text,
//! and wisdom assembled locally from the riddle corpus when no model is available.

use std::sync::OnceLock;

use rand::{seq::SliceRandom, Rng};
use regex::Regex;

use crate::domain::{Belief, ContentType, RiddleRecord};
use crate::text::fold_case;

/// Target languages offered for translation.
pub const LANGUAGES: &[&str] = &[
  "English", "Hindi", "Tamil", "Telugu", "Kannada", "Malayalam", "Bengali", "Gujarati",
  "Marathi", "Punjabi", "Urdu",
];

/// Book label used when a belief lists none, or content comes from the corpus.
pub const CORPUS_BOOK: &str = "Derived from authentic religious riddles";

/// Most rows a local pathway draws on.
const LOCAL_PATHWAY_STEPS: usize = 5;
const MAX_PATHWAY_STEPS: usize = 8;

static SENTENCE_END_REGEX: OnceLock<Regex> = OnceLock::new();
static STEP_MARKER_REGEX: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();

fn sentence_end_regex() -> &'static Regex {
  SENTENCE_END_REGEX.get_or_init(|| Regex::new(r"([.!?])\s+").expect("sentence regex is valid"))
}

fn step_marker_regex() -> &'static Regex {
  STEP_MARKER_REGEX.get_or_init(|| Regex::new(r"\d+\.\s").expect("step regex is valid"))
}

fn whitespace_regex() -> &'static Regex {
  WHITESPACE_REGEX.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex is valid"))
}

/// Canonical language name, case-insensitive. `None` for unsupported languages.
pub fn resolve_language(name: &str) -> Option<&'static str> {
  let wanted = fold_case(name);
  LANGUAGES.iter().copied().find(|l| l.to_lowercase() == wanted)
}

pub fn is_english(language: &str) -> bool {
  fold_case(language) == "english"
}

/// Find a belief by its name or category label.
pub fn find_belief<'a>(beliefs: &'a [Belief], name: &str) -> Option<&'a Belief> {
  let wanted = fold_case(name);
  beliefs
    .iter()
    .find(|b| fold_case(&b.name) == wanted || (!b.category.is_empty() && fold_case(&b.category) == wanted))
}

pub fn pick_book<R: Rng + ?Sized>(belief: &Belief, rng: &mut R) -> String {
  belief
    .books
    .choose(rng)
    .cloned()
    .unwrap_or_else(|| CORPUS_BOOK.to_string())
}

fn split_sentences(text: &str) -> Vec<String> {
  sentence_end_regex()
    .replace_all(text, "$1\n")
    .split('\n')
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())
    .collect()
}

fn word_count(s: &str) -> usize {
  s.split_whitespace().count()
}

/// Tidy raw model output for the given content kind.
///
/// Quote keeps the first substantial sentence, Short Story up to five,
/// Pathway becomes 1..=8 numbered steps with a dangling last step dropped.
pub fn clean_output(text: &str, content_type: ContentType) -> String {
  let unquoted: String = text.chars().filter(|c| !matches!(c, '"' | '“' | '”')).collect();
  let text = whitespace_regex().replace_all(unquoted.trim(), " ").to_string();

  match content_type {
    ContentType::Quote | ContentType::ShortStory => {
      let sentences: Vec<String> = split_sentences(&text)
        .into_iter()
        .filter(|s| word_count(s) > 5)
        .collect();
      if sentences.is_empty() {
        return text;
      }
      if content_type == ContentType::Quote {
        let first = &sentences[0];
        if first.ends_with(['.', '!', '?']) { first.clone() } else { format!("{}.", first) }
      } else {
        sentences.into_iter().take(5).collect::<Vec<_>>().join(" ")
      }
    }
    ContentType::Pathway => {
      let mut steps = numbered_steps(&text);
      if steps.len() < 3 {
        steps = split_sentences(&text).into_iter().filter(|s| word_count(s) > 6).collect();
      }

      if steps.last().is_some_and(|last| is_dangling(last)) {
        steps.pop();
      }
      if steps.is_empty() {
        return text;
      }

      steps
        .iter()
        .take(MAX_PATHWAY_STEPS)
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect::<Vec<_>>()
        .join("\n")
    }
  }
}

fn numbered_steps(text: &str) -> Vec<String> {
  let markers: Vec<(usize, usize)> = step_marker_regex()
    .find_iter(text)
    .map(|m| (m.start(), m.end()))
    .collect();

  markers
    .iter()
    .enumerate()
    .map(|(i, &(_, body_start))| {
      let body_end = markers.get(i + 1).map(|&(start, _)| start).unwrap_or(text.len());
      text[body_start..body_end].trim().to_string()
    })
    .filter(|s| word_count(s) > 4)
    .collect()
}

fn is_dangling(step: &str) -> bool {
  step.ends_with('-') || step.ends_with('(') || step.matches('(').count() > step.matches(')').count()
}

/// Wisdom assembled from corpus rows (already narrowed to one religion).
pub fn local_wisdom<R: Rng + ?Sized>(
  rows: &[&RiddleRecord],
  content_type: ContentType,
  rng: &mut R,
) -> String {
  let picked: Vec<&RiddleRecord> = rows
    .choose_multiple(rng, LOCAL_PATHWAY_STEPS)
    .copied()
    .collect();
  let Some(first) = picked.first() else {
    return String::new();
  };

  match content_type {
    ContentType::Quote => first.answer.clone(),
    ContentType::ShortStory => format!(
      "A seeker once pondered:\n\n{}\n\nReflection:\n{}\n\nWisdom:\n{}",
      first.riddle, first.hint, first.answer
    ),
    ContentType::Pathway => {
      let steps: Vec<String> = picked
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {}", i + 1, r.answer))
        .collect();
      format!("Spiritual Pathway:\n\n{}", steps.join("\n"))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::{rngs::StdRng, SeedableRng};

  use crate::seeds::{default_beliefs, seed_riddles};

  #[test]
  fn quote_keeps_first_substantial_sentence() {
    let raw = "  \"Yes. The quiet mind sees what the busy eye misses. Another long sentence follows here too.\" ";
    assert_eq!(
      clean_output(raw, ContentType::Quote),
      "The quiet mind sees what the busy eye misses."
    );
    assert_eq!(clean_output("Too short", ContentType::Quote), "Too short");
  }

  #[test]
  fn story_keeps_at_most_five_sentences() {
    let sentence = "A monk walked slowly to the river bank.";
    let raw = vec![sentence; 7].join(" ");
    let cleaned = clean_output(&raw, ContentType::ShortStory);
    assert_eq!(cleaned.matches("monk").count(), 5);
  }

  #[test]
  fn pathway_is_renumbered_and_drops_dangling_step() {
    let raw = "Intro 1. Practise daily self study of the texts. \
               2. Serve others without any expectation of reward. \
               3. Sit in meditation every single morning at dawn. \
               4. Surrender the fruits of action to the divine (like";
    let cleaned = clean_output(raw, ContentType::Pathway);
    let lines: Vec<&str> = cleaned.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("1. Practise"));
    assert!(lines[2].starts_with("3. Sit in meditation"));
  }

  #[test]
  fn pathway_falls_back_to_sentences() {
    let raw = "Begin with honest study of the sacred texts each day. Then practise seva for the community around you. Finally rest in the silent awareness that remains.";
    let cleaned = clean_output(raw, ContentType::Pathway);
    assert_eq!(cleaned.lines().count(), 3);
    assert!(cleaned.starts_with("1. Begin"));
  }

  #[test]
  fn belief_lookup_by_name_or_category() {
    let beliefs = default_beliefs();
    assert_eq!(find_belief(&beliefs, "hinduism").map(|b| b.name.as_str()), Some("Hinduism"));
    assert_eq!(find_belief(&beliefs, "Muslim").map(|b| b.name.as_str()), Some("Islam"));
    assert!(find_belief(&beliefs, "Zoroastrianism").is_none());
  }

  #[test]
  fn languages_resolve_case_insensitively() {
    assert_eq!(resolve_language("tamil"), Some("Tamil"));
    assert_eq!(resolve_language("Klingon"), None);
    assert!(is_english(" English "));
  }

  #[test]
  fn local_wisdom_uses_corpus_rows() {
    let riddles = seed_riddles();
    let rows: Vec<&RiddleRecord> = riddles.iter().collect();
    let mut rng = StdRng::seed_from_u64(11);

    let quote = local_wisdom(&rows, ContentType::Quote, &mut rng);
    assert!(riddles.iter().any(|r| r.answer == quote));

    let story = local_wisdom(&rows, ContentType::ShortStory, &mut rng);
    assert!(story.starts_with("A seeker once pondered:"));

    let pathway = local_wisdom(&rows, ContentType::Pathway, &mut rng);
    assert_eq!(pathway.lines().filter(|l| l.starts_with(char::is_numeric)).count(), 5);

    assert!(local_wisdom(&[], ContentType::Quote, &mut rng).is_empty());
  }
}
