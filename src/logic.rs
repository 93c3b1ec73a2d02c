//! Core behaviours shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Answering questions through the riddle matcher (similarity or substring mode)
//!   - Serving random riddles, hints and answer checks
//!   - Daily wisdom (model generation + translation, corpus fallback)
//!   - Philosopher answers per belief
//!   - Translation

use tracing::{debug, error, info, instrument, warn};

use crate::config::MatchMode;
use crate::domain::{Belief, ContentType, SubstringMatch};
use crate::protocol::{
  to_riddle_out, AnswerOut, AskOut, PhilosopherAnswer, PhilosopherOut, RiddleOut, WisdomOut,
};
use crate::state::AppState;
use crate::util::preview;
use crate::wisdom::{
  clean_output, find_belief, is_english, local_wisdom, pick_book, resolve_language, CORPUS_BOOK,
};

const NO_SUBSTRING_MATCH: &str = "No riddle in the collection matches that question yet. Try asking in other words.";

#[instrument(level = "info", skip(state, question), fields(question_len = question.len()))]
pub async fn ask(state: &AppState, question: &str) -> AskOut {
  let matcher = state.matcher().await;
  match matcher.settings().mode {
    MatchMode::Similarity => {
      let result = matcher.match_query(question);
      info!(target: "riddle", index = result.index, strategy = result.strategy.as_str(), confidence = ?result.confidence, fallback = result.strategy.is_fallback(), "Question answered");
      AskOut::from_result(&result)
    }
    MatchMode::Substring => match matcher.match_substring(question) {
      SubstringMatch::Found(result) => {
        info!(target: "riddle", index = result.index, strategy = result.strategy.as_str(), "Question answered");
        AskOut::from_result(&result)
      }
      SubstringMatch::NoMatch => {
        info!(target: "riddle", preview = %preview(question, 40), "No substring match");
        AskOut::no_match(NO_SUBSTRING_MATCH)
      }
    },
  }
}

#[instrument(level = "info", skip(state))]
pub async fn random_riddle(state: &AppState) -> RiddleOut {
  let matcher = state.matcher().await;
  let (id, record) = matcher.random_record(&mut rand::thread_rng());
  to_riddle_out(id, record)
}

#[instrument(level = "info", skip(state), fields(%riddle_id))]
pub async fn hint_text(state: &AppState, riddle_id: usize) -> String {
  let matcher = state.matcher().await;
  match matcher.get(riddle_id) {
    Some(r) if !r.hint.trim().is_empty() => r.hint.clone(),
    Some(_) => "No hint for this riddle. Trust your first thought.".into(),
    None => "No hint: unknown riddle.".into(),
  }
}

#[instrument(level = "info", skip(state, answer), fields(%riddle_id, answer_len = answer.len()))]
pub async fn submit_answer(state: &AppState, riddle_id: usize, answer: &str) -> AnswerOut {
  let matcher = state.matcher().await;
  match (matcher.check_answer(riddle_id, answer), matcher.get(riddle_id)) {
    (Some(check), Some(record)) => AnswerOut {
      correct: check.correct,
      earned_points: check.earned_points,
      expected: record.expected_display().to_string(),
      message: None,
    },
    _ => AnswerOut {
      correct: false,
      earned_points: 0,
      expected: String::new(),
      message: Some(format!("Unknown riddleId: {}", riddle_id)),
    },
  }
}

/// Translate English text. Returns the text unchanged (`false`) when the target is
/// English, unsupported, or the model is unavailable.
#[instrument(level = "info", skip(state, text), fields(%language, text_len = text.len()))]
pub async fn translate(state: &AppState, text: &str, language: &str) -> (String, bool) {
  if is_english(language) || text.trim().is_empty() {
    return (text.to_string(), false);
  }
  let Some(language) = resolve_language(language) else {
    warn!(target: "wisdom_backend", %language, "Unsupported translation language; returning original text");
    return (text.to_string(), false);
  };
  if let Some(llm) = &state.llm {
    match llm.translate(&state.prompts, text, language).await {
      Ok(t) => return (t, true),
      Err(e) => error!(target: "wisdom_backend", error = %e, "Translation failed; returning original text."),
    }
  }
  (text.to_string(), false)
}

#[instrument(level = "info", skip(state), fields(content_type = content_type.as_str()))]
pub async fn daily_wisdom(
  state: &AppState,
  religion: &str,
  content_type: ContentType,
  language: Option<&str>,
) -> WisdomOut {
  let belief = find_belief(&state.beliefs, religion).cloned().unwrap_or_else(|| Belief {
    name: religion.to_string(),
    books: Vec::new(),
    category: religion.to_string(),
  });
  let book = pick_book(&belief, &mut rand::thread_rng());

  let generated = match &state.llm {
    Some(llm) => match llm.generate_wisdom(&state.prompts, &belief.name, &book, content_type).await {
      Ok(raw) => Some(clean_output(&raw, content_type)).filter(|t| !t.is_empty()),
      Err(e) => {
        error!(target: "wisdom_backend", belief = %belief.name, error = %e, "Wisdom generation failed; using corpus.");
        None
      }
    },
    None => None,
  };

  let (english, book, source) = match generated {
    Some(text) => (text, book, "model"),
    None => {
      let matcher = state.matcher().await;
      let rows: Vec<_> = matcher
        .records_for_religion(&belief.category)
        .into_iter()
        .map(|(_, r)| r)
        .collect();
      let text = local_wisdom(&rows, content_type, &mut rand::thread_rng());
      (text, CORPUS_BOOK.to_string(), "corpus")
    }
  };

  let language = language.unwrap_or("English");
  let (translated, _) = translate(state, &english, language).await;
  debug!(target: "wisdom_backend", belief = %belief.name, %source, english_len = english.len(), "Daily wisdom ready");

  WisdomOut {
    religion: belief.name,
    book,
    content_type,
    english,
    translated,
    language: language.to_string(),
    source,
  }
}

/// One answer per requested belief. Without a model the matcher supplies a
/// reflection from that belief's riddles.
#[instrument(level = "info", skip(state, question, beliefs), fields(question_len = question.len(), beliefs = beliefs.len()))]
pub async fn philosopher(state: &AppState, question: &str, beliefs: &[String]) -> PhilosopherOut {
  let selected: Vec<Belief> = if beliefs.is_empty() {
    state.beliefs.first().cloned().into_iter().collect()
  } else {
    beliefs
      .iter()
      .filter_map(|name| {
        let found = find_belief(&state.beliefs, name).cloned();
        if found.is_none() {
          warn!(target: "wisdom_backend", belief = %name, "Unknown belief skipped");
        }
        found
      })
      .collect()
  };

  let mut results = Vec::with_capacity(selected.len());
  for belief in selected {
    let book = pick_book(&belief, &mut rand::thread_rng());
    let answer = match &state.llm {
      Some(llm) => match llm.philosopher_answer(&state.prompts, &belief.name, &book, question).await {
        Ok(text) if !text.trim().is_empty() => Some(first_sentences(&text, 2)),
        Ok(_) => None,
        Err(e) => {
          error!(target: "wisdom_backend", belief = %belief.name, error = %e, "Philosopher answer failed; using corpus reflection.");
          None
        }
      },
      None => None,
    };

    let result = match answer {
      Some(answer) => PhilosopherAnswer { belief: belief.name, book, answer, source: "model" },
      None => {
        let matcher = state.matcher().await;
        let hit = matcher.match_within(&belief.category, question, &mut rand::thread_rng());
        PhilosopherAnswer {
          belief: belief.name,
          book: CORPUS_BOOK.to_string(),
          answer: reflection(&hit.record.answer, &hit.record.hint),
          source: "corpus",
        }
      }
    };
    results.push(result);
  }

  PhilosopherOut { question: question.to_string(), results }
}

/// First `n` sentences, newlines flattened, always ending in a full stop.
fn first_sentences(text: &str, n: usize) -> String {
  let flat = text.replace('\n', " ");
  let joined = flat
    .split(". ")
    .take(n)
    .collect::<Vec<_>>()
    .join(". ");
  let joined = joined.trim().trim_end_matches('.');
  format!("{}.", joined)
}

fn reflection(answer: &str, hint: &str) -> String {
  let hint = hint.trim();
  if hint.is_empty() {
    answer.trim().to_string()
  } else {
    format!("{}. {}", answer.trim().trim_end_matches('.'), hint)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_sentences_trims_to_two() {
    assert_eq!(
      first_sentences("Fear is a shadow. Light dissolves it. Then walk on.\n", 2),
      "Fear is a shadow. Light dissolves it."
    );
    assert_eq!(first_sentences("Be still", 2), "Be still.");
  }

  #[test]
  fn reflection_joins_answer_and_hint() {
    assert_eq!(reflection("Love.", "Read Corinthians"), "Love. Read Corinthians");
    assert_eq!(reflection("Ahimsa", " "), "Ahimsa");
  }
}
