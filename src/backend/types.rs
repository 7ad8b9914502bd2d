//! Wire types for the interview backend protocol.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Literal `message` value that signals end-of-interview in a
/// [`SubmitReply`].
pub const COMPLETION_MESSAGE: &str = "Interview completed";

// ---------------------------------------------------------------------------
// StartRequest / StartReply
// ---------------------------------------------------------------------------

/// JSON body of `POST /start_interview`.
#[derive(Debug, Clone, Serialize)]
pub struct StartRequest {
    pub candidate_name: String,
}

/// JSON response of `POST /start_interview`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StartReply {
    /// Server-issued identifier correlating this candidate's turns.
    pub session_id: String,
    /// The first question to display and speak.
    pub question: String,
}

// ---------------------------------------------------------------------------
// ScoreValue
// ---------------------------------------------------------------------------

/// Scenario score as returned by the backend.
///
/// The service is loose about the type here — some deployments send a number,
/// others a pre-formatted string — so both are accepted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for ScoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreValue::Number(n) => write!(f, "{n}"),
            ScoreValue::Text(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// SubmitReply
// ---------------------------------------------------------------------------

/// JSON response of `POST /submit_response`.
///
/// All fields are optional; which ones are present depends on where the
/// interview is:
///
/// * completion turn — `message == "Interview completed"`, nothing else used.
/// * ordinary turn — `question` carries the next question; `score` and an
///   extra `message` may accompany it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SubmitReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub score: Option<ScoreValue>,
}

impl SubmitReply {
    /// Whether this reply signals the end of the interview.
    pub fn is_completed(&self) -> bool {
        self.message.as_deref() == Some(COMPLETION_MESSAGE)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
