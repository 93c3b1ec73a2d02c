//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{ContentType, MatchStrategy, QueryResult, RiddleRecord};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Ask {
        question: String,
    },
    NewRiddle,
    Hint {
        #[serde(rename = "riddleId")]
        riddle_id: usize,
    },
    SubmitAnswer {
        #[serde(rename = "riddleId")]
        riddle_id: usize,
        answer: String,
    },
    Translate {
        text: String,
        language: String,
    },
    Wisdom {
        religion: String,
        #[serde(default, rename = "contentType")]
        content_type: ContentType,
        #[serde(default)]
        language: Option<String>,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Answer {
        #[serde(flatten)]
        answer: AskOut,
    },
    Riddle {
        riddle: RiddleOut,
    },
    Hint {
        text: String,
    },
    AnswerResult {
        #[serde(flatten)]
        result: AnswerOut,
    },
    Translate {
        text: String,
        translation: String,
        translated: bool,
    },
    Wisdom {
        #[serde(flatten)]
        wisdom: WisdomOut,
    },
    Error {
        message: String,
    },
}

/// Riddle as shown to a player (no answer).
#[derive(Debug, Serialize)]
pub struct RiddleOut {
    pub id: usize,
    pub riddle: String,
    pub hint: String,
    pub points: u32,
    pub religion: String,
    pub difficulty: String,
}

pub fn to_riddle_out(id: usize, r: &RiddleRecord) -> RiddleOut {
    RiddleOut {
        id,
        riddle: r.riddle.clone(),
        hint: r.hint.clone(),
        points: r.points,
        religion: r.religion.clone(),
        difficulty: r.difficulty.clone(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct AskIn {
    pub question: String,
}
#[derive(Debug, Serialize)]
pub struct AskOut {
    pub matched: bool,
    pub answer: String,
    pub religion: String,
    pub landmark: String,
    pub difficulty: String,
    pub confidence: Option<f32>,
    pub strategy: Option<MatchStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AskOut {
    pub fn from_result(r: &QueryResult) -> Self {
        Self {
            matched: true,
            answer: r.record.answer.clone(),
            religion: r.record.religion.clone(),
            landmark: r.record.landmark.clone(),
            difficulty: r.record.difficulty.clone(),
            confidence: r.confidence,
            strategy: Some(r.strategy),
            category: r.category.clone(),
            message: None,
        }
    }

    pub fn no_match(message: &str) -> Self {
        Self {
            matched: false,
            answer: String::new(),
            religion: String::new(),
            landmark: String::new(),
            difficulty: String::new(),
            confidence: None,
            strategy: None,
            category: None,
            message: Some(message.to_string()),
        }
    }
}

/// `riddleId` stays text so a malformed id gets a JSON reply instead of a bare 400.
#[derive(Debug, Deserialize)]
pub struct HintQuery {
    #[serde(rename = "riddleId", default)]
    pub riddle_id: String,
}

impl HintQuery {
    pub fn parsed_id(&self) -> Option<usize> {
        self.riddle_id.trim().parse().ok()
    }
}
#[derive(Serialize)]
pub struct HintOut {
    pub text: String,
}

#[derive(Deserialize)]
pub struct AnswerIn {
    #[serde(rename = "riddleId")]
    pub riddle_id: usize,
    pub answer: String,
}
#[derive(Debug, Serialize)]
pub struct AnswerOut {
    pub correct: bool,
    #[serde(rename = "earnedPoints")]
    pub earned_points: u32,
    pub expected: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WisdomQuery {
    pub religion: String,
    #[serde(default, rename = "contentType")]
    pub content_type: ContentType,
    #[serde(default)]
    pub language: Option<String>,
}
#[derive(Debug, Serialize)]
pub struct WisdomOut {
    pub religion: String,
    pub book: String,
    #[serde(rename = "contentType")]
    pub content_type: ContentType,
    pub english: String,
    pub translated: String,
    pub language: String,
    /// "model" or "corpus".
    pub source: &'static str,
}

#[derive(Deserialize)]
pub struct PhilosopherIn {
    pub question: String,
    #[serde(default)]
    pub beliefs: Vec<String>,
}
#[derive(Serialize)]
pub struct PhilosopherAnswer {
    pub belief: String,
    pub book: String,
    pub answer: String,
    pub source: &'static str,
}
#[derive(Serialize)]
pub struct PhilosopherOut {
    pub question: String,
    pub results: Vec<PhilosopherAnswer>,
}

#[derive(Deserialize)]
pub struct TranslateIn {
    pub text: String,
    pub language: String,
}
#[derive(Serialize)]
pub struct TranslateOut {
    pub translation: String,
    pub translated: bool,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub riddles: usize,
}

#[derive(Serialize)]
pub struct ReloadOut {
    pub ok: bool,
    pub riddles: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
