//! Loading service configuration (matcher knobs, cue tables, prompts, beliefs,
//! optional riddle bank) from TOML.
//!
//! Every section is optional; see `AppConfig`, `MatcherSettings` and `Prompts`
//! for the schema and defaults.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Belief, RiddleRecord};
use crate::seeds::{default_beliefs, default_emotion_cues, default_religion_cues};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub matcher: MatcherSettings,
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub beliefs: Vec<Belief>,
  /// Inline riddle bank, merged after the CSV rows.
  #[serde(default)]
  pub riddles: Vec<RiddleRecord>,
}

impl AppConfig {
  /// Configured beliefs, or the built-in table when none are given.
  pub fn beliefs_or_default(&self) -> Vec<Belief> {
    if self.beliefs.is_empty() { default_beliefs() } else { self.beliefs.clone() }
  }
}

/// Which matching flow answers `/ask`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
  #[default]
  Similarity,
  Substring,
}

/// Tiers tried in order before the terminal random fallback.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
  Similarity,
  EmotionFallback,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ReligionCues {
  pub category: String,
  pub keywords: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmotionCues {
  pub category: String,
  /// Words in the query that reveal the emotion.
  pub cues: Vec<String>,
  /// Words an answer must contain to be offered for that emotion.
  pub themes: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MatcherSettings {
  pub mode: MatchMode,
  /// Best similarity below this is treated as "no confident match".
  pub confidence_threshold: f32,
  pub min_df: usize,
  pub include_religion: bool,
  pub include_riddle: bool,
  pub religion_filter: bool,
  pub tiers: Vec<TierKind>,
  pub religion_cues: Vec<ReligionCues>,
  pub emotion_cues: Vec<EmotionCues>,
}

impl Default for MatcherSettings {
  fn default() -> Self {
    Self {
      mode: MatchMode::Similarity,
      confidence_threshold: 0.05,
      min_df: 1,
      include_religion: false,
      include_riddle: false,
      religion_filter: true,
      tiers: vec![TierKind::Similarity, TierKind::EmotionFallback],
      religion_cues: default_religion_cues(),
      emotion_cues: default_emotion_cues(),
    }
  }
}

/// Prompts used by the LLM client. Placeholders in `{braces}` are filled at call time.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub wisdom_system: String,
  pub quote_template: String,
  pub story_template: String,
  pub pathway_template: String,
  pub philosopher_system: String,
  pub philosopher_template: String,
  pub translate_system: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      wisdom_system: "You are a wise spiritual philosopher.".into(),
      quote_template: "Generate ONE philosophical quote inspired by {book} of {belief}. Single sentence only. Deep and reflective.".into(),
      story_template: "Generate a short philosophical story inspired by {book} of {belief}. 3 to 5 sentences. Reflective and parable-like.".into(),
      pathway_template: "You are a traditional spiritual master.\nCreate a structured spiritual roadmap for attaining the highest spiritual goal in {belief}, based strictly on teachings from {book}.\n\nThe roadmap must:\n- Contain 6 to 8 numbered steps.\n- Show spiritual progression from beginner to advanced level.\n- Include real concepts, practices, or doctrines from {book}.\n- End with the final spiritual realization (moksha, enlightenment, salvation, or divine union depending on the tradition).\n\nNumber each step clearly from 1.\nDo not give general moral advice. Focus on spiritual advancement.".into(),
      philosopher_system: "You are a calm philosophical thinker. Answer in EXACTLY 2 sentences with a calm, emotionally neutral tone. Never defend, criticise or rank any religion. Focus only on inner psychological and philosophical insight. If the question expresses anger or hatred, treat it as inner conflict and answer with wisdom about understanding and self-examination.".into(),
      philosopher_template: "You represent {belief}. Base your reasoning only on the philosophical themes found in {book}.\n\nQuestion:\n{question}\n\nAnswer:".into(),
      translate_system: "Translate the user's text from English into {language}. Preserve line breaks and numbering. Output ONLY the translation.".into(),
    }
  }
}

/// Parse configuration text.
pub fn parse_app_config(s: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(s)
}

/// Attempt to load `AppConfig` from WISDOM_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("WISDOM_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_app_config(&s) {
      Ok(cfg) => {
        info!(target: "wisdom_backend", %path, "Loaded service config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "wisdom_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "wisdom_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
