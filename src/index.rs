//! TF-IDF vector index over the riddle corpus plus a category → positions index.
//!
//! Terms are unigrams and bigrams of normalized text. Unigrams shorter than two
//! characters and English stop words are dropped before bigrams are formed.
//! Weights are raw term counts times a smoothed inverse document frequency,
//! `idf(t) = ln((1 + n) / (1 + df(t))) + 1`, and every row is L2-normalized, so
//! cosine similarity reduces to a sparse dot product.

use std::collections::{HashMap, HashSet};

use crate::text::{fold_case, words};

/// Standard English stop words ignored by the vectorizer.
pub const STOP_WORDS: &[&str] = &[
  "a", "about", "above", "after", "again", "against", "all", "almost", "alone", "along",
  "already", "also", "although", "always", "am", "among", "an", "and", "another", "any",
  "anyhow", "anyone", "anything", "anyway", "anywhere", "are", "around", "as", "at", "be",
  "became", "because", "become", "becomes", "been", "before", "being", "below", "beside",
  "besides", "between", "beyond", "both", "but", "by", "can", "cannot", "could", "did", "do",
  "does", "done", "down", "during", "each", "either", "else", "elsewhere", "enough", "etc",
  "even", "ever", "every", "everyone", "everything", "everywhere", "few", "for", "from",
  "further", "get", "give", "go", "had", "has", "have", "he", "hence", "her", "here", "hers",
  "herself", "him", "himself", "his", "how", "however", "i", "ie", "if", "in", "into", "is",
  "it", "its", "itself", "just", "keep", "last", "least", "less", "made", "many", "may", "me",
  "meanwhile", "might", "mine", "more", "moreover", "most", "mostly", "much", "must", "my",
  "myself", "neither", "never", "nevertheless", "next", "no", "nobody", "none", "nor", "not",
  "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
  "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "per",
  "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed", "seems",
  "several", "she", "should", "since", "so", "some", "somehow", "someone", "something",
  "sometime", "sometimes", "somewhere", "still", "such", "take", "than", "that", "the",
  "their", "them", "themselves", "then", "there", "thereafter", "therefore", "these", "they",
  "this", "those", "though", "through", "throughout", "thus", "to", "together", "too",
  "toward", "towards", "under", "until", "up", "upon", "us", "very", "via", "was", "we",
  "well", "were", "what", "whatever", "when", "whenever", "where", "whereas", "wherever",
  "whether", "which", "while", "who", "whoever", "whole", "whom", "whose", "why", "will",
  "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
  "yourselves",
];

/// Sparse row: (term id, weight), sorted by term id.
pub type SparseVector = Vec<(usize, f32)>;

#[derive(Clone, Debug)]
pub struct IndexOptions {
  /// Terms found in fewer documents than this are left out of the vocabulary.
  pub min_df: usize,
}

impl Default for IndexOptions {
  fn default() -> Self {
    Self { min_df: 1 }
  }
}

/// Unigram + bigram terms of normalized text.
pub fn terms(normalized: &str) -> Vec<String> {
  let unigrams: Vec<&str> = words(normalized)
    .filter(|w| w.chars().count() >= 2 && !is_stop_word(w))
    .collect();

  let mut out: Vec<String> = unigrams.iter().map(|w| (*w).to_string()).collect();
  out.extend(unigrams.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
  out
}

fn is_stop_word(word: &str) -> bool {
  STOP_WORDS.binary_search(&word).is_ok()
}

/// Fixed-vocabulary TF-IDF index. Rebuilt from scratch when the corpus changes.
#[derive(Clone, Debug)]
pub struct TfIdfIndex {
  vocabulary: HashMap<String, usize>,
  idf: Vec<f32>,
  rows: Vec<SparseVector>,
}

impl TfIdfIndex {
  /// Build over already-normalized documents, one per corpus position.
  pub fn build<S: AsRef<str>>(documents: &[S], options: &IndexOptions) -> Self {
    let tokenized: Vec<Vec<String>> = documents.iter().map(|d| terms(d.as_ref())).collect();

    let mut df: HashMap<&str, usize> = HashMap::new();
    for doc in &tokenized {
      let unique: HashSet<&str> = doc.iter().map(String::as_str).collect();
      for term in unique {
        *df.entry(term).or_insert(0) += 1;
      }
    }

    // Sorted so term ids do not depend on hash order.
    let mut kept: Vec<(&str, usize)> = df
      .into_iter()
      .filter(|(_, count)| *count >= options.min_df.max(1))
      .collect();
    kept.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let n = documents.len() as f32;
    let mut vocabulary = HashMap::with_capacity(kept.len());
    let mut idf = Vec::with_capacity(kept.len());
    for (id, (term, count)) in kept.into_iter().enumerate() {
      vocabulary.insert(term.to_string(), id);
      idf.push(((1.0 + n) / (1.0 + count as f32)).ln() + 1.0);
    }

    let mut index = Self { vocabulary, idf, rows: Vec::new() };
    index.rows = tokenized.iter().map(|doc| index.weigh(doc)).collect();
    index
  }

  pub fn vocabulary_len(&self) -> usize {
    self.vocabulary.len()
  }

  /// Vector of normalized text through the fixed vocabulary. Unknown terms are ignored.
  pub fn vectorize(&self, normalized: &str) -> SparseVector {
    self.weigh(&terms(normalized))
  }

  fn weigh(&self, doc_terms: &[String]) -> SparseVector {
    let mut counts: HashMap<usize, f32> = HashMap::new();
    for term in doc_terms {
      if let Some(&id) = self.vocabulary.get(term) {
        *counts.entry(id).or_insert(0.0) += 1.0;
      }
    }

    let mut row: SparseVector = counts
      .into_iter()
      .map(|(id, tf)| (id, tf * self.idf[id]))
      .collect();
    row.sort_unstable_by_key(|(id, _)| *id);

    let norm = row.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
      for (_, w) in &mut row {
        *w /= norm;
      }
    }
    row
  }

  /// Cosine similarity of the query against every row, in corpus order.
  pub fn score(&self, normalized_query: &str) -> Vec<(usize, f32)> {
    let query = self.vectorize(normalized_query);
    self.rows
      .iter()
      .enumerate()
      .map(|(i, row)| (i, cosine(&query, row)))
      .collect()
  }

  /// Cosine similarity restricted to the given positions, in the given order.
  pub fn score_subset(&self, normalized_query: &str, positions: &[usize]) -> Vec<(usize, f32)> {
    let query = self.vectorize(normalized_query);
    positions
      .iter()
      .filter_map(|&i| self.rows.get(i).map(|row| (i, cosine(&query, row))))
      .collect()
  }
}

/// Dot product of two L2-normalized sparse vectors, clamped to [0,1].
pub fn cosine(a: &[(usize, f32)], b: &[(usize, f32)]) -> f32 {
  let (mut i, mut j) = (0, 0);
  let mut dot = 0.0f32;
  while i < a.len() && j < b.len() {
    match a[i].0.cmp(&b[j].0) {
      std::cmp::Ordering::Less => i += 1,
      std::cmp::Ordering::Greater => j += 1,
      std::cmp::Ordering::Equal => {
        dot += a[i].1 * b[j].1;
        i += 1;
        j += 1;
      }
    }
  }
  dot.clamp(0.0, 1.0)
}

/// Highest score; ties go to the earliest position.
pub fn argmax(scores: &[(usize, f32)]) -> Option<(usize, f32)> {
  scores.iter().copied().fold(None, |best, (i, s)| match best {
    Some((_, b)) if s <= b => best,
    _ => Some((i, s)),
  })
}

/// Category label → corpus positions whose `religion` field contains it.
#[derive(Clone, Debug, Default)]
pub struct CategoryIndex {
  by_category: HashMap<String, Vec<usize>>,
}

impl CategoryIndex {
  pub fn build<S: AsRef<str>, C: AsRef<str>>(labels: &[S], categories: &[C]) -> Self {
    let folded: Vec<String> = labels.iter().map(|l| fold_case(l.as_ref())).collect();
    let mut by_category = HashMap::new();
    for category in categories {
      let key = fold_case(category.as_ref());
      if key.is_empty() {
        continue;
      }
      let positions: Vec<usize> = folded
        .iter()
        .enumerate()
        .filter(|(_, label)| label.contains(&key))
        .map(|(i, _)| i)
        .collect();
      by_category.insert(key, positions);
    }
    Self { by_category }
  }

  pub fn positions(&self, category: &str) -> &[usize] {
    self.by_category
      .get(&fold_case(category))
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::text::normalize;

  fn corpus() -> Vec<String> {
    [
      "peace of mind comes from letting go of attachment",
      "karma returns every deed",
      "silence is the language of god",
      "love thy neighbour",
    ]
    .iter()
    .map(|s| normalize(s))
    .collect()
  }

  #[test]
  fn stop_words_are_sorted_for_binary_search() {
    let mut sorted = STOP_WORDS.to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, STOP_WORDS);
  }

  #[test]
  fn terms_drop_stop_words_and_build_bigrams() {
    let t = terms("the peace of inner mind");
    assert_eq!(t, vec!["peace", "inner", "mind", "peace inner", "inner mind"]);
    assert!(terms("a i o").is_empty());
  }

  #[test]
  fn scores_are_bounded_and_zero_without_overlap() {
    let index = TfIdfIndex::build(&corpus(), &IndexOptions::default());
    for query in ["", "zzz qqq", "peace karma silence love", "mind"] {
      for (_, s) in index.score(&normalize(query)) {
        assert!((0.0..=1.0).contains(&s), "score {s} for {query:?}");
      }
    }
    assert!(index.score("xyzzy").iter().all(|(_, s)| *s == 0.0));
  }

  #[test]
  fn identical_text_scores_one() {
    let docs = corpus();
    let index = TfIdfIndex::build(&docs, &IndexOptions::default());
    let scores = index.score(&docs[2]);
    assert!((scores[2].1 - 1.0).abs() < 1e-5, "got {}", scores[2].1);
    assert_eq!(argmax(&scores).map(|(i, _)| i), Some(2));
  }

  #[test]
  fn common_terms_weigh_less_than_rare_ones() {
    let docs = vec![
      normalize("wisdom light"),
      normalize("wisdom river"),
      normalize("wisdom mountain"),
    ];
    let index = TfIdfIndex::build(&docs, &IndexOptions::default());
    let row = index.vectorize(&docs[0]);
    let wisdom = index.vocabulary["wisdom"];
    let light = index.vocabulary["light"];
    let weight = |id: usize| row.iter().find(|(t, _)| *t == id).map(|(_, w)| *w).unwrap();
    assert!(weight(light) > weight(wisdom));
  }

  #[test]
  fn min_df_excludes_rare_terms() {
    let docs = vec![normalize("truth light"), normalize("truth river")];
    let index = TfIdfIndex::build(&docs, &IndexOptions { min_df: 2 });
    assert_eq!(index.vocabulary_len(), 1);
    assert!(index.score("light").iter().all(|(_, s)| *s == 0.0));
  }

  #[test]
  fn subset_scoring_only_visits_given_positions() {
    let index = TfIdfIndex::build(&corpus(), &IndexOptions::default());
    let scores = index.score_subset("karma deed", &[3, 1, 99]);
    assert_eq!(scores.len(), 2);
    assert_eq!(argmax(&scores).map(|(i, _)| i), Some(1));
  }

  #[test]
  fn argmax_prefers_first_on_ties() {
    assert_eq!(argmax(&[(0, 0.0), (1, 0.0)]), Some((0, 0.0)));
    assert_eq!(argmax(&[(4, 0.2), (7, 0.9), (9, 0.9)]), Some((7, 0.9)));
    assert_eq!(argmax(&[]), None);
  }

  #[test]
  fn category_index_matches_label_substrings() {
    let labels = ["Hindu", "", "Hinduism", "Buddhist"];
    let index = CategoryIndex::build(&labels, &["hindu", "buddhist", "sikh"]);
    assert_eq!(index.positions("Hindu"), &[0, 2]);
    assert_eq!(index.positions("buddhist"), &[3]);
    assert!(index.positions("sikh").is_empty());
    assert!(index.positions("jain").is_empty());
  }
}
