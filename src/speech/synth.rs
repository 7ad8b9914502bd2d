//! `Speaker` trait and the espeak-ng process speaker.
//!
//! A missing engine or a failed launch is a *soft* degradation: the
//! controller logs it and the interview carries on silently.  Only the
//! voice-name lookup has an audibly observable fallback — when the
//! configured voice is absent the engine default is used.

use std::process::{Command, Stdio};

use thiserror::Error;

use crate::config::SpeechConfig;

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Errors that can occur when launching speech playback.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// No synthesis binary was found on this system.
    #[error("no speech synthesis engine found (tried espeak-ng, espeak)")]
    EngineMissing,

    /// The synthesis process could not be spawned.
    #[error("failed to launch speech synthesis: {0}")]
    Spawn(String),
}

// ---------------------------------------------------------------------------
// Speaker trait
// ---------------------------------------------------------------------------

/// Speaks a piece of text out loud.
///
/// Implementors must be `Send + Sync` so the controller can hold them as
/// `Arc<dyn Speaker>`.  `speak` must return promptly — playback itself
/// happens out of band.
pub trait Speaker: Send + Sync {
    fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

// ---------------------------------------------------------------------------
// NullSpeaker
// ---------------------------------------------------------------------------

/// Speaker that discards all text.  Used when speech is disabled in the
/// config and as the test double in controller tests.
pub struct NullSpeaker;

impl Speaker for NullSpeaker {
    fn speak(&self, _text: &str) -> Result<(), SpeechError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ProcessSpeaker
// ---------------------------------------------------------------------------

/// Speaks via a detached `espeak-ng` (or `espeak`) child process.
pub struct ProcessSpeaker {
    /// Resolved engine binary; `None` when no engine is installed.
    binary: Option<String>,
    /// Voice passed as `-v`; `None` means the engine default voice.
    voice: Option<String>,
    /// Speaking rate in words per minute (`-s`).
    rate_wpm: u32,
}

impl ProcessSpeaker {
    const CANDIDATE_BINARIES: [&'static str; 2] = ["espeak-ng", "espeak"];

    /// Build a `ProcessSpeaker` from application config.
    ///
    /// Probes for an installed engine binary and checks whether the
    /// configured voice exists; both probes run once here so `speak` stays
    /// cheap.
    pub fn from_config(config: &SpeechConfig) -> Self {
        let binary = Self::detect_binary();

        let voice = match &binary {
            Some(bin) => Self::resolve_voice(bin, &config.voice),
            None => {
                log::warn!("speech: no synthesis engine found; questions will not be read aloud");
                None
            }
        };

        Self {
            binary,
            voice,
            rate_wpm: config.rate_wpm,
        }
    }

    /// Find the first candidate binary that answers `--version`.
    fn detect_binary() -> Option<String> {
        for candidate in Self::CANDIDATE_BINARIES {
            let probe = Command::new(candidate)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
            if matches!(probe, Ok(status) if status.success()) {
                log::info!("speech: using {candidate}");
                return Some(candidate.to_string());
            }
        }
        None
    }

    /// Check `wanted` against the engine's installed voice list.
    ///
    /// Returns `Some(wanted)` when the voice exists; `None` (engine default)
    /// otherwise.  The fallback is logged because it is audible, not silent.
    fn resolve_voice(binary: &str, wanted: &str) -> Option<String> {
        let output = Command::new(binary).arg("--voices").output().ok()?;
        let listing = String::from_utf8_lossy(&output.stdout);

        if voice_available(&listing, wanted) {
            Some(wanted.to_string())
        } else {
            log::warn!("speech: voice {wanted:?} not installed; using the engine default voice");
            None
        }
    }

    #[cfg(test)]
    fn from_parts(binary: Option<String>, voice: Option<String>, rate_wpm: u32) -> Self {
        Self {
            binary,
            voice,
            rate_wpm,
        }
    }
}

impl Speaker for ProcessSpeaker {
    /// Launch a detached synthesis process for `text` and return immediately.
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let binary = self.binary.as_deref().ok_or(SpeechError::EngineMissing)?;

        let mut cmd = Command::new(binary);
        if let Some(voice) = &self.voice {
            cmd.arg("-v").arg(voice);
        }
        cmd.arg("-s")
            .arg(self.rate_wpm.to_string())
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Detached: the Child is dropped, playback continues on its own.
        cmd.spawn().map_err(|e| SpeechError::Spawn(e.to_string()))?;

        log::debug!("speech: speaking {} chars", text.chars().count());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Voice-list parsing
// ---------------------------------------------------------------------------

/// Whether `wanted` appears in an `espeak-ng --voices` listing.
///
/// Each body line looks like:
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  en-us           --/M      English (America)  gmw/en-US
/// ```
///
/// A voice matches on its language code (column 2) or its file name
/// (the `gmw/en-US` form), the two forms `-v` accepts.  The voice name
/// column may itself contain spaces, so the file name is looked for in any
/// later field rather than at a fixed index.
fn voice_available(listing: &str, wanted: &str) -> bool {
    listing.lines().skip(1).any(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        fields.get(1) == Some(&wanted) || fields.iter().skip(2).any(|f| *f == wanted)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
