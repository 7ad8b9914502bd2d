//! Interview session module — the state machine at the heart of the client.
//!
//! # Architecture
//!
//! ```text
//! SessionCommand (mpsc)  ← UI buttons, countdown ticker
//!        │
//!        ▼
//! SessionController::run()  ← async tokio task
//!        │
//!        ├─ Start          → POST /start_interview → install first question
//!        ├─ StartRecording → gate capture buffer, spawn 1 s ticker
//!        ├─ Tick           → decrement countdown; 0 → auto stop + submit
//!        ├─ StopRecording  → drain buffer → WAV → POST /submit_response
//!        │                     ├─ "Interview completed" → notice + reset
//!        │                     └─ next question → display + speak (+score)
//!        └─ (completion)   → reset all session state
//!
//! SharedSessionState (Arc<Mutex<…>>) ←── read by egui update() each frame
//! ```
//!
//! The session-level state machine is
//! `NotStarted → AwaitingAnswer → Recording → AwaitingAnswer → … → reset`.

pub mod controller;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use controller::{
    new_shared_audio_buffer, SessionCommand, SessionController, SessionError, SharedAudioBuffer,
};
pub use state::{
    new_shared_session_state, Role, SessionPhase, SessionState, SharedSessionState, Turn,
};
