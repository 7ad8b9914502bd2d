//! Voice interview client — library crate.
//!
//! A desktop client for voice-driven interviews: the backend asks questions,
//! the app speaks them aloud, records the candidate's spoken answer from the
//! microphone (with a hard time limit), and uploads it as a WAV file to drive
//! the interview forward.
//!
//! # Module map
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`config`]  | TOML configuration and on-disk paths |
//! | [`backend`] | HTTP client for the interview service |
//! | [`audio`]   | Microphone capture, resampling, WAV encoding |
//! | [`speech`]  | Question playback via a system speech engine |
//! | [`session`] | Interview state machine and controller |
//! | [`app`]     | egui/eframe user interface |

pub mod app;
pub mod audio;
pub mod backend;
pub mod config;
pub mod session;
pub mod speech;
