//! Seed data and built-in tables: riddles, belief books and keyword cues.

use crate::config::{EmotionCues, ReligionCues};
use crate::domain::{Belief, RiddleRecord};

fn riddle(
  riddle: &str,
  hint: &str,
  answer: &str,
  religion: &str,
  landmark: &str,
  difficulty: &str,
  points: u32,
) -> RiddleRecord {
  RiddleRecord {
    riddle: riddle.into(),
    hint: hint.into(),
    answer: answer.into(),
    religion: religion.into(),
    landmark: landmark.into(),
    difficulty: difficulty.into(),
    points,
  }
}

/// Minimal set of built-in riddles that keep the service useful
/// when no dataset file or config bank is available.
pub fn seed_riddles() -> Vec<RiddleRecord> {
  vec![
    riddle(
      "I am the charioteer who spoke on a battlefield about duty without attachment. Who am I?",
      "The song of the Lord was sung at Kurukshetra",
      "Krishna",
      "Hindu",
      "Brahma Sarovar, Kurukshetra",
      "Easy",
      10,
    ),
    riddle(
      "Still water shows the moon; a restless mind shows only ripples. What brings the stillness?",
      "Sit, breathe and watch the mind settle into calm",
      "Meditation brings peace of mind",
      "Buddhist",
      "Mahabodhi, Bodh Gaya",
      "Medium",
      20,
    ),
    riddle(
      "What is given freely, costs nothing, yet feeds thousands every day?",
      "The community kitchen serves everyone seated together",
      "Langar",
      "Sikh",
      "Golden Temple, Amritsar",
      "Easy",
      10,
    ),
    riddle(
      "What harms no living being, not even in thought?",
      "The first vow of the Jain path",
      "Ahimsa",
      "Jain",
      "Shravanabelagola",
      "Medium",
      20,
    ),
    riddle(
      "What is patient, is kind, and keeps no record of wrongs?",
      "Read the letter to the Corinthians",
      "Love",
      "Christian",
      "Basilica of Bom Jesus, Goa",
      "Easy",
      10,
    ),
    riddle(
      "What is proclaimed five times a day from the minaret?",
      "It calls the faithful to prayer",
      "Adhan",
      "Muslim",
      "Jama Masjid, Delhi",
      "Medium",
      20,
    ),
    riddle(
      "The more of me you release, the lighter and freer you become. What am I?",
      "Let go of what you cling to",
      "Attachment, let go of it and find calm",
      "Hindu",
      "",
      "Hard",
      30,
    ),
  ]
}

/// Belief systems and the books their generated content is drawn from.
pub fn default_beliefs() -> Vec<Belief> {
  let b = |name: &str, category: &str, books: &[&str]| Belief {
    name: name.into(),
    books: books.iter().map(|s| (*s).to_string()).collect(),
    category: category.into(),
  };
  vec![
    b("Hinduism", "hindu", &["Bhagavad Gita", "Upanishads", "Yoga Vasistha"]),
    b("Buddhism", "buddhist", &["Sutta Nipata", "Majjhima Nikaya"]),
    b("Jainism", "jain", &["Acaranga Sutra", "Samayasara"]),
    b("Sikhism", "sikh", &["Guru Granth Sahib"]),
    b("Christianity", "christian", &["Bible"]),
    b("Islam", "muslim", &["Quran"]),
    b("Atheism", "", &["The Age of Reason", "Human Values"]),
  ]
}

/// Religion keyword cues, checked in this order; first hit wins.
pub fn default_religion_cues() -> Vec<ReligionCues> {
  let c = |category: &str, keywords: &[&str]| ReligionCues {
    category: category.into(),
    keywords: keywords.iter().map(|s| (*s).to_string()).collect(),
  };
  vec![
    c("hindu", &[
      "hindu", "hinduism", "krishna", "rama", "shiva", "vishnu", "ganesha", "hanuman", "gita",
      "upanishad", "upanishads", "veda", "vedas", "dharma", "moksha",
    ]),
    c("buddhist", &["buddha", "buddhist", "buddhism", "dhamma", "nirvana", "sangha", "bodhi"]),
    c("jain", &["jain", "jainism", "mahavira", "tirthankara", "ahimsa"]),
    c("sikh", &["sikh", "sikhism", "guru nanak", "waheguru", "granth", "langar"]),
    c("christian", &["christian", "christianity", "jesus", "christ", "bible", "gospel"]),
    c("muslim", &["muslim", "islam", "allah", "quran", "prophet", "ramadan"]),
  ]
}

/// Emotion cues and the answer themes offered for each, checked in this order.
pub fn default_emotion_cues() -> Vec<EmotionCues> {
  let e = |category: &str, cues: &[&str], themes: &[&str]| EmotionCues {
    category: category.into(),
    cues: cues.iter().map(|s| (*s).to_string()).collect(),
    themes: themes.iter().map(|s| (*s).to_string()).collect(),
  };
  vec![
    e(
      "anxiety",
      &["anxious", "anxiety", "worried", "worry", "fear", "afraid", "nervous", "stress", "stressed", "panic"],
      &["peace", "mind", "fear", "attachment", "calm"],
    ),
    e(
      "sadness",
      &["sad", "sadness", "grief", "grieving", "lonely", "depressed", "crying", "heartbroken", "loss"],
      &["hope", "love", "compassion", "light", "joy"],
    ),
    e(
      "confusion",
      &["confused", "confusion", "lost", "doubt", "uncertain", "meaning", "purpose"],
      &["truth", "wisdom", "path", "knowledge", "self"],
    ),
  ]
}
