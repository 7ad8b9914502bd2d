//! Question speech playback.
//!
//! The original interview flow reads each question aloud with the platform
//! speech engine.  This module provides:
//! * [`Speaker`] — trait the session controller speaks through.
//! * [`ProcessSpeaker`] — drives an external `espeak-ng` / `espeak` process,
//!   selecting the configured voice by name and falling back to the engine's
//!   default voice when it is not installed.
//! * [`NullSpeaker`] — no-op implementation for headless runs and tests.
//!
//! Playback is fire-and-forget: the synthesis process is detached and the
//! controller never waits for it, so recording an answer may start while
//! the tail of a question is still audible.

pub mod synth;

pub use synth::{NullSpeaker, ProcessSpeaker, Speaker, SpeechError};
