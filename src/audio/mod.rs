//! Audio pipeline — microphone capture → downmix/resample → WAV payload.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → interleaved_to_mono
//!           → resample_to_16k → capture buffer → encode_wav → upload
//! ```
//!
//! The capture stream runs for the lifetime of the app; the session
//! controller gates whether samples are kept via the shared capture buffer
//! flag (see `session::SharedAudioBuffer`).

pub mod capture;
pub mod resample;
pub mod wav;

pub use capture::{AudioCapture, AudioChunk, CaptureError, StreamHandle};
pub use resample::{interleaved_to_mono, resample_to_16k};
pub use wav::encode_wav;
