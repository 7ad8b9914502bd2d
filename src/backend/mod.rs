//! Interview backend client module.
//!
//! This module provides:
//! * [`InterviewBackend`] — async trait implemented by backend clients.
//! * [`HttpBackend`] — reqwest client for the real interview service.
//! * [`StartReply`] / [`SubmitReply`] / [`ScoreValue`] — wire types.
//! * [`BackendError`] — error variants for backend calls.
//!
//! The backend owns all interview logic (question generation, transcription,
//! scoring).  This client only drives the two-endpoint protocol:
//!
//! ```text
//! POST /start_interview   { candidate_name }            → { session_id, question }
//! POST /submit_response   session_id + audio.wav (multipart)
//!                         → { message?, question?, score? }
//! ```
//!
//! A `message` equal to [`COMPLETION_MESSAGE`] ends the interview.

pub mod client;
pub mod types;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{BackendError, HttpBackend, InterviewBackend};
pub use types::{ScoreValue, StartReply, SubmitReply, COMPLETION_MESSAGE};
