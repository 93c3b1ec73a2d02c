//! Application state: the active riddle matcher, prompts, beliefs and the LLM client.
//!
//! This module owns:
//!   - the matcher snapshot (corpus + indices), swapped whole on reload
//!   - the settings and riddle bank it was built from
//!   - the prompts and belief table (from TOML or defaults)
//!   - optional LLM client
//!
//! Readers clone the `Arc` snapshot and release the lock before matching, so a
//! reload never blocks an in-flight query and never exposes a half-built index.

use std::{collections::HashMap, path::PathBuf, sync::Arc};
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use crate::config::{load_app_config_from_env, AppConfig, MatcherSettings, Prompts};
use crate::dataset::{assemble_corpus, csv_path_from_env};
use crate::domain::{Belief, RiddleRecord};
use crate::llm::LlmClient;
use crate::matcher::RiddleMatcher;

#[derive(Clone)]
pub struct AppState {
    matcher: Arc<RwLock<Arc<RiddleMatcher>>>,
    pub settings: MatcherSettings,
    pub bank: Vec<RiddleRecord>,
    pub csv_path: PathBuf,
    pub llm: Option<LlmClient>,
    pub prompts: Prompts,
    pub beliefs: Vec<Belief>,
}

impl AppState {
    /// Build state from env: load config, assemble the corpus, build the matcher, init the LLM client.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let cfg = load_app_config_from_env().unwrap_or_default();
        let llm = LlmClient::from_env();
        if let Some(c) = &llm {
            info!(target: "wisdom_backend", base_url = %c.base_url, model = %c.model, "LLM enabled.");
        } else {
            info!(target: "wisdom_backend", "LLM disabled (no LLM_BASE_URL). Using corpus-derived content.");
        }
        Self::new(cfg, csv_path_from_env(), llm)
    }

    /// Build state from explicit parts.
    pub fn new(
        cfg: AppConfig,
        csv_path: PathBuf,
        llm: Option<LlmClient>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let beliefs = cfg.beliefs_or_default();
        let records = assemble_corpus(&csv_path, &cfg.riddles)?;
        log_inventory(&records);
        let matcher = RiddleMatcher::new(records, cfg.matcher.clone())?;

        Ok(Self {
            matcher: Arc::new(RwLock::new(Arc::new(matcher))),
            settings: cfg.matcher,
            bank: cfg.riddles,
            csv_path,
            llm,
            prompts: cfg.prompts,
            beliefs,
        })
    }

    /// Consistent matcher snapshot for one request.
    pub async fn matcher(&self) -> Arc<RiddleMatcher> {
        self.matcher.read().await.clone()
    }

    /// Re-read the dataset, rebuild the matcher off-lock and swap it in.
    /// On failure the current matcher stays active.
    #[instrument(level = "info", skip(self), fields(csv = %self.csv_path.display()))]
    pub async fn reload_corpus(&self) -> Result<usize, String> {
        let csv_path = self.csv_path.clone();
        let bank = self.bank.clone();
        let settings = self.settings.clone();

        let built = tokio::task::spawn_blocking(move || {
            let records = assemble_corpus(&csv_path, &bank).map_err(|e| e.to_string())?;
            RiddleMatcher::new(records, settings).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| format!("reload task failed: {e}"))?;

        match built {
            Ok(next) => {
                let size = next.len();
                *self.matcher.write().await = Arc::new(next);
                info!(target: "riddle", riddles = size, "Riddle corpus reloaded");
                Ok(size)
            }
            Err(e) => {
                error!(target: "riddle", error = %e, "Riddle corpus reload failed; keeping previous corpus");
                Err(e)
            }
        }
    }
}

/// Startup inventory by religion label.
fn log_inventory(records: &[RiddleRecord]) {
    let mut by_religion: HashMap<&str, (usize, u32)> = HashMap::new();
    for r in records {
        let label = if r.religion.trim().is_empty() { "(none)" } else { r.religion.trim() };
        let entry = by_religion.entry(label).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += r.points;
    }
    for (religion, (count, points)) in by_religion {
        info!(target: "riddle", %religion, riddles = count, total_points = points, "Startup riddle inventory");
    }
}
