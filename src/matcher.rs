//! Riddle matcher: maps a free-text question to one corpus record.
//!
//! Matching runs an ordered tier pipeline. Each tier either produces a result
//! or passes; the terminal random tier always succeeds, so `match_query` never
//! fails once the matcher exists.
//!
//!   similarity        best TF-IDF cosine (restricted to the detected religion
//!                     when one is named and present), kept only when the score
//!                     reaches the confidence threshold
//!   emotion_fallback  random record whose answer carries a theme of the
//!                     emotion found in the query
//!   random_fallback   uniform pick (within the detected religion when possible)
//!
//! The legacy exact-substring mode lives beside the pipeline in `match_substring`.

use rand::{seq::SliceRandom, Rng};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::{EmotionCues, MatcherSettings, TierKind};
use crate::domain::{AnswerCheck, MatchStrategy, QueryResult, RiddleRecord, SubstringMatch};
use crate::index::{argmax, CategoryIndex, IndexOptions, TfIdfIndex};
use crate::text::{answers_match, fold_case, normalize, CueText};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatcherError {
    #[error("cannot build a riddle matcher from an empty corpus")]
    EmptyCorpus,
}

/// Immutable corpus + derived indices. Share it behind an `Arc`.
#[derive(Debug)]
pub struct RiddleMatcher {
    records: Vec<RiddleRecord>,
    index: TfIdfIndex,
    religions: CategoryIndex,
    riddle_keys: Vec<String>,
    settings: MatcherSettings,
}

/// Per-query facts computed once and read by every tier.
struct QueryContext {
    cues: CueText,
    normalized: String,
    best: (usize, f32),
    filtered: bool,
    religion: Option<String>,
}

impl RiddleMatcher {
    /// Build the vector index and the religion index over `records`.
    #[instrument(level = "info", skip_all, fields(records = records.len()))]
    pub fn new(records: Vec<RiddleRecord>, settings: MatcherSettings) -> Result<Self, MatcherError> {
        if records.is_empty() {
            return Err(MatcherError::EmptyCorpus);
        }

        let documents: Vec<String> = records
            .iter()
            .map(|r| normalize(&indexed_text(r, &settings)))
            .collect();
        let index = TfIdfIndex::build(&documents, &IndexOptions { min_df: settings.min_df });

        let labels: Vec<&str> = records.iter().map(|r| r.religion.as_str()).collect();
        let categories: Vec<&str> = settings
            .religion_cues
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        let religions = CategoryIndex::build(&labels, &categories);

        let riddle_keys = records.iter().map(|r| normalize(&r.riddle)).collect();

        debug!(target: "riddle", vocabulary = index.vocabulary_len(), "Riddle index built");

        Ok(Self { records, index, religions, riddle_keys, settings })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn settings(&self) -> &MatcherSettings {
        &self.settings
    }

    pub fn get(&self, index: usize) -> Option<&RiddleRecord> {
        self.records.get(index)
    }

    /// Records of the given religion category, or the whole corpus when none match.
    pub fn records_for_religion(&self, religion: &str) -> Vec<(usize, &RiddleRecord)> {
        let key = fold_case(religion);
        let hits: Vec<(usize, &RiddleRecord)> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| !key.is_empty() && religion_matches(&r.religion, &key))
            .collect();
        if hits.is_empty() {
            self.records.iter().enumerate().collect()
        } else {
            hits
        }
    }

    /// Uniformly sample one record.
    pub fn random_record<R: Rng + ?Sized>(&self, rng: &mut R) -> (usize, &RiddleRecord) {
        let i = rng.gen_range(0..self.records.len());
        (i, &self.records[i])
    }

    /// Case/whitespace-insensitive answer check. `None` for an unknown position.
    pub fn check_answer(&self, index: usize, submitted: &str) -> Option<AnswerCheck> {
        let record = self.records.get(index)?;
        let correct = answers_match(submitted, &record.answer);
        Some(AnswerCheck {
            correct,
            earned_points: if correct { record.points } else { 0 },
        })
    }

    /// Best record for the query. Never fails.
    pub fn match_query(&self, query: &str) -> QueryResult {
        self.match_query_with_rng(query, &mut rand::thread_rng())
    }

    #[instrument(level = "debug", skip(self, query, rng), fields(query_len = query.len()))]
    pub fn match_query_with_rng<R: Rng + ?Sized>(&self, query: &str, rng: &mut R) -> QueryResult {
        let ctx = self.context(query);

        for tier in &self.settings.tiers {
            let produced = match tier {
                TierKind::Similarity => self.similarity_tier(&ctx),
                TierKind::EmotionFallback => self.emotion_tier(&ctx, rng),
            };
            if let Some(result) = produced {
                debug!(target: "riddle", strategy = result.strategy.as_str(), index = result.index, best_score = ctx.best.1, "Tier matched");
                return result;
            }
        }

        let result = self.random_tier(&ctx, rng);
        debug!(target: "riddle", index = result.index, best_score = ctx.best.1, religion = ?ctx.religion, "Random fallback");
        result
    }

    /// Best record for the query among one religion's records.
    ///
    /// Religion cues in the query are ignored: the category alone picks the pool.
    /// Below the confidence threshold a random record of that pool is returned.
    /// An empty category, or one without records, searches the whole corpus.
    pub fn match_within<R: Rng + ?Sized>(&self, category: &str, query: &str, rng: &mut R) -> QueryResult {
        let pool = self.positions_for(category);
        if pool.is_empty() {
            return self.match_query_with_rng(query, rng);
        }
        let category = Some(fold_case(category));

        let scores = self.index.score_subset(&normalize(query), &pool);
        let (best, score) = argmax(&scores).unwrap_or((pool[0], 0.0));
        if score >= self.settings.confidence_threshold {
            return self.result(best, Some(score), MatchStrategy::ReligionFilteredSimilarity, category);
        }

        let index = pool.choose(rng).copied().unwrap_or(best);
        debug!(target: "riddle", index, score, category = ?category, "Random pick within category");
        self.result(index, Some(score), MatchStrategy::RandomFallback, category)
    }

    /// Legacy mode: does the normalized query contain a normalized riddle verbatim?
    #[instrument(level = "debug", skip(self, query), fields(query_len = query.len()))]
    pub fn match_substring(&self, query: &str) -> SubstringMatch {
        let normalized = normalize(query);
        let hit = self
            .riddle_keys
            .iter()
            .position(|key| !key.is_empty() && normalized.contains(key.as_str()));

        match hit {
            Some(index) => SubstringMatch::Found(QueryResult {
                index,
                record: self.records[index].clone(),
                confidence: None,
                strategy: MatchStrategy::ExactSubstring,
                category: None,
            }),
            None => SubstringMatch::NoMatch,
        }
    }

    fn context(&self, query: &str) -> QueryContext {
        let normalized = normalize(query);
        let cues = CueText::new(query);

        let global = argmax(&self.index.score(&normalized)).unwrap_or((0, 0.0));

        let religion = if self.settings.religion_filter {
            self.settings
                .religion_cues
                .iter()
                .find(|c| cues.contains_any(&c.keywords))
                .map(|c| fold_case(&c.category))
        } else {
            None
        };

        let subset = religion.as_deref().map(|r| self.religions.positions(r)).unwrap_or(&[]);
        let (best, filtered) = if subset.is_empty() {
            (global, false)
        } else {
            let scores = self.index.score_subset(&normalized, subset);
            (argmax(&scores).unwrap_or(global), true)
        };

        QueryContext { cues, normalized, best, filtered, religion }
    }

    /// Positions whose `religion` label contains `category`; cue categories come from the index.
    fn positions_for(&self, category: &str) -> Vec<usize> {
        let key = fold_case(category);
        if key.is_empty() {
            return Vec::new();
        }
        let indexed = self.religions.positions(&key);
        if !indexed.is_empty() {
            return indexed.to_vec();
        }
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| religion_matches(&r.religion, &key))
            .map(|(i, _)| i)
            .collect()
    }

    fn religion_pool(&self, ctx: &QueryContext) -> Option<&[usize]> {
        let pool = self.religions.positions(ctx.religion.as_deref()?);
        if pool.is_empty() { None } else { Some(pool) }
    }

    fn similarity_tier(&self, ctx: &QueryContext) -> Option<QueryResult> {
        let (index, score) = ctx.best;
        if score < self.settings.confidence_threshold {
            debug!(target: "riddle", score, threshold = self.settings.confidence_threshold, normalized_len = ctx.normalized.len(), "Similarity below threshold");
            return None;
        }
        let (strategy, category) = if ctx.filtered {
            (MatchStrategy::ReligionFilteredSimilarity, ctx.religion.clone())
        } else {
            (MatchStrategy::VectorSimilarity, None)
        };
        Some(self.result(index, Some(score), strategy, category))
    }

    fn emotion_tier<R: Rng + ?Sized>(&self, ctx: &QueryContext, rng: &mut R) -> Option<QueryResult> {
        let emotion = self
            .settings
            .emotion_cues
            .iter()
            .find(|e| ctx.cues.contains_any(&e.cues))?;

        let themed: Vec<usize> = (0..self.records.len())
            .filter(|&i| answer_has_theme(&self.records[i], emotion))
            .collect();

        // Prefer themed answers inside the named religion; themes win over religion otherwise.
        let in_religion: Vec<usize> = match self.religion_pool(ctx) {
            Some(pool) => themed.iter().copied().filter(|i| pool.contains(i)).collect(),
            None => Vec::new(),
        };
        let pool = if in_religion.is_empty() { themed } else { in_religion };

        let index = *pool.choose(rng)?;
        Some(self.result(
            index,
            Some(ctx.best.1),
            MatchStrategy::EmotionFallback,
            Some(emotion.category.clone()),
        ))
    }

    fn random_tier<R: Rng + ?Sized>(&self, ctx: &QueryContext, rng: &mut R) -> QueryResult {
        let (index, category) = match self.religion_pool(ctx).and_then(|pool| pool.choose(rng)) {
            Some(&i) => (i, ctx.religion.clone()),
            None => (rng.gen_range(0..self.records.len()), None),
        };
        self.result(index, Some(ctx.best.1), MatchStrategy::RandomFallback, category)
    }

    fn result(
        &self,
        index: usize,
        confidence: Option<f32>,
        strategy: MatchStrategy,
        category: Option<String>,
    ) -> QueryResult {
        QueryResult {
            index,
            record: self.records[index].clone(),
            confidence,
            strategy,
            category,
        }
    }
}

fn indexed_text(record: &RiddleRecord, settings: &MatcherSettings) -> String {
    let mut parts = vec![record.answer.as_str(), record.hint.as_str()];
    if settings.include_riddle {
        parts.push(record.riddle.as_str());
    }
    if settings.include_religion {
        parts.push(record.religion.as_str());
    }
    parts.join(" ")
}

fn religion_matches(label: &str, folded_category: &str) -> bool {
    fold_case(label).contains(folded_category)
}

fn answer_has_theme(record: &RiddleRecord, emotion: &EmotionCues) -> bool {
    let answer = fold_case(&record.answer);
    emotion
        .themes
        .iter()
        .map(|t| fold_case(t))
        .any(|t| !t.is_empty() && answer.contains(&t))
}
