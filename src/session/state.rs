//! Session state and shared application state.
//!
//! [`SessionState`] is the single source of truth for everything the UI
//! needs: session phase, current question, transcript, countdown, score and
//! any pending alert.  The controller mutates it; the egui update loop reads
//! it each frame through [`SharedSessionState`] (`Arc<Mutex<…>>` — cheap to
//! clone and safe to share across threads).

use std::sync::{Arc, Mutex};

use crate::backend::ScoreValue;
use crate::config::AppConfig;

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// Phases of an interview session.
///
/// The state machine transitions are:
///
/// ```text
/// NotStarted ──start ok───▶ AwaitingAnswer
/// AwaitingAnswer ──record──▶ Recording
/// Recording ──stop (user / countdown 0)──▶ Submitting ──reply──▶ AwaitingAnswer
/// any ──completion reply──▶ NotStarted   (full reset)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No server-side session exists; the name form is shown.
    #[default]
    NotStarted,

    /// A question is on screen; waiting for the candidate to record.
    AwaitingAnswer,

    /// Microphone samples are being gated into the capture buffer and the
    /// countdown is running.
    Recording,

    /// The recorded answer is being uploaded; buttons are disabled.
    Submitting,
}

impl SessionPhase {
    /// `true` only while the capture buffer is being filled.
    pub fn is_recording(&self) -> bool {
        matches!(self, SessionPhase::Recording)
    }

    /// A short human-readable label for the status display.
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::NotStarted => "Not started",
            SessionPhase::AwaitingAnswer => "Awaiting answer",
            SessionPhase::Recording => "Recording",
            SessionPhase::Submitting => "Submitting",
        }
    }
}

// ---------------------------------------------------------------------------
// Role / Turn
// ---------------------------------------------------------------------------

/// Who a transcript turn is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    Candidate,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::System => "System",
            Role::Candidate => "Candidate",
        }
    }
}

/// One exchange unit in the conversation transcript.  Turns are appended in
/// order and never mutated or removed; only a session reset clears them.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Shared interview state — the single source of truth for the UI.
pub struct SessionState {
    /// Current phase of the session state machine.
    pub phase: SessionPhase,

    /// Server-issued session identifier.  `None` until a session starts and
    /// again after completion; required on every submission.
    pub session_id: Option<String>,

    /// Candidate name the session was started with.
    pub candidate_name: String,

    /// The question the candidate must answer now.  Overwritten whenever a
    /// new question arrives.
    pub current_question: String,

    /// Append-only conversation log.
    pub transcript: Vec<Turn>,

    /// Most recent scenario score, when the backend has sent one.
    pub score: Option<ScoreValue>,

    /// Seconds remaining on the answer countdown.  Pinned at the configured
    /// limit whenever recording is not active.
    pub seconds_left: u32,

    /// Pending blocking notice for the user (validation failure, network
    /// failure, completion message).  The UI shows it as a modal and clears
    /// it on dismissal.
    pub alert: Option<String>,

    /// Application configuration snapshot.
    pub config: AppConfig,
}

impl SessionState {
    /// Create a fresh `SessionState` for `config`.
    pub fn new(config: AppConfig) -> Self {
        let seconds_left = config.audio.answer_secs;
        Self {
            phase: SessionPhase::NotStarted,
            session_id: None,
            candidate_name: String::new(),
            current_question: String::new(),
            transcript: Vec::new(),
            score: None,
            seconds_left,
            alert: None,
            config,
        }
    }

    /// Append one turn to the transcript.
    pub fn log_turn(&mut self, role: Role, text: impl Into<String>) {
        self.transcript.push(Turn {
            role,
            text: text.into(),
        });
    }

    /// Clear all session-scoped state.
    ///
    /// Used on interview completion.  A pending alert survives so the
    /// completion notice stays on screen after the reset.
    pub fn reset(&mut self) {
        self.phase = SessionPhase::NotStarted;
        self.session_id = None;
        self.candidate_name.clear();
        self.current_question.clear();
        self.transcript.clear();
        self.score = None;
        self.seconds_left = self.config.audio.answer_secs;
    }
}

// ---------------------------------------------------------------------------
// SharedSessionState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`SessionState`].
///
/// Lock with `.lock().unwrap()` for a short critical section; do **not**
/// hold the lock across `.await` points.
pub type SharedSessionState = Arc<Mutex<SessionState>>;

/// Construct a new [`SharedSessionState`] wrapping a fresh [`SessionState`].
pub fn new_shared_session_state(config: AppConfig) -> SharedSessionState {
    Arc::new(Mutex::new(SessionState::new(config)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
