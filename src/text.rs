//! Text normalization shared by indexing, querying and answer checks.
//!
//! `fold_case` (trim + lower-case) is the only rule used for answer equality.
//! `normalize` starts from `fold_case` and additionally drops punctuation and
//! place words, so corpus text and queries are scored symmetrically.

use std::sync::OnceLock;

use regex::Regex;

/// Words naming physical places. They describe landmarks, not spiritual
/// content, and must not pull scoring towards geography.
pub const PLACE_WORDS: &[&str] = &[
  "temple", "temples", "mandir", "church", "churches", "mosque", "masjid", "gurudwara",
  "gurdwara", "dargah", "ashram", "shrine", "location", "place", "places",
];

static NON_LETTER_REGEX: OnceLock<Regex> = OnceLock::new();
static PLACE_WORD_REGEX: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();

fn non_letter_regex() -> &'static Regex {
  NON_LETTER_REGEX.get_or_init(|| {
    Regex::new(r"[^\p{L}\s]").expect("non-letter regex is valid")
  })
}

fn place_word_regex() -> &'static Regex {
  PLACE_WORD_REGEX.get_or_init(|| {
    let alternation = PLACE_WORDS.join("|");
    Regex::new(&format!(r"\b(?:{})\b", alternation)).expect("place word regex is valid")
  })
}

fn whitespace_regex() -> &'static Regex {
  WHITESPACE_REGEX.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex is valid"))
}

/// Trim + lower-case. Nothing else: "Peace." and "peace" stay different.
pub fn fold_case(s: &str) -> String {
  s.trim().to_lowercase()
}

/// Case/whitespace-insensitive answer equality.
pub fn answers_match(submitted: &str, expected: &str) -> bool {
  fold_case(submitted) == fold_case(expected)
}

/// Scoring normalization. Idempotent.
///
/// 1. `fold_case`
/// 2. drop every character that is not a letter or whitespace
/// 3. drop place words
/// 4. collapse whitespace runs and trim
pub fn normalize(text: &str) -> String {
  let lowered = fold_case(text);
  let letters = non_letter_regex().replace_all(&lowered, "");
  let without_places = place_word_regex().replace_all(&letters, " ");
  whitespace_regex()
    .replace_all(&without_places, " ")
    .trim()
    .to_string()
}

/// Whitespace tokens of already-normalized text.
pub fn words(normalized: &str) -> impl Iterator<Item = &str> {
  normalized.split_whitespace()
}

/// Keyword cue lookup on a raw query.
///
/// Works on whole words so "rama" does not fire inside "drama";
/// multi-word cues ("guru nanak") match as phrases.
#[derive(Debug, Clone)]
pub struct CueText {
  padded: String,
}

impl CueText {
  pub fn new(raw: &str) -> Self {
    let lowered = fold_case(raw);
    let letters = non_letter_regex().replace_all(&lowered, " ");
    let joined = words(&letters).collect::<Vec<_>>().join(" ");
    Self { padded: format!(" {} ", joined) }
  }

  pub fn contains(&self, cue: &str) -> bool {
    let cue = fold_case(cue);
    if cue.is_empty() {
      return false;
    }
    self.padded.contains(&format!(" {} ", cue))
  }

  pub fn contains_any<S: AsRef<str>>(&self, cues: &[S]) -> bool {
    cues.iter().any(|c| self.contains(c.as_ref()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_strips_punctuation_places_and_spacing() {
    assert_eq!(normalize("  Which TEMPLE holds   the Light?! "), "which holds the light");
    assert_eq!(normalize("Dargah, mosque & church"), "");
    assert_eq!(normalize("don't"), "dont");
  }

  #[test]
  fn normalize_is_idempotent() {
    let inputs = [
      "",
      "   ",
      "!!!???",
      "Tem-ple of the Sun",
      "Gurudwara... langar; seva!",
      "Ärger  und\tFrieden\n",
      "İstanbul mosque 2024",
      "place-place placeplace",
    ];
    for input in inputs {
      let once = normalize(input);
      assert_eq!(normalize(&once), once, "input: {input:?}");
    }
  }

  #[test]
  fn fold_case_only_trims_and_lowercases() {
    assert!(answers_match(" Peace  ", "peace"));
    assert!(!answers_match("Peace.", "peace"));
    assert_eq!(fold_case("\tOm Shanti "), "om shanti");
  }

  #[test]
  fn cue_text_matches_whole_words_and_phrases() {
    let cues = CueText::new("What did Guru Nanak say about drama?");
    assert!(cues.contains("guru nanak"));
    assert!(cues.contains("Drama"));
    assert!(!cues.contains("rama"));
    assert!(!cues.contains(""));
    assert!(cues.contains_any(&["krishna", "nanak"]));
  }
}
