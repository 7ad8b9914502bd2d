//! Application entry point — voice interview client.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the HTTP interview backend and the speech engine from config.
//! 5. Create the session command channel and shared state.
//! 6. Start the cpal audio capture stream and its resample feed thread.
//! 7. Spawn the session controller on the tokio runtime.
//! 8. Run [`eframe::run_native`] — blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use tokio::sync::mpsc;
use voice_interview::{
    app::InterviewApp,
    audio::{interleaved_to_mono, resample_to_16k, AudioCapture, AudioChunk},
    backend::{HttpBackend, InterviewBackend},
    config::AppConfig,
    session::{
        new_shared_audio_buffer, new_shared_session_state, SessionCommand, SessionController,
        SharedAudioBuffer,
    },
    speech::{NullSpeaker, ProcessSpeaker, Speaker},
};

use eframe::egui;

// ---------------------------------------------------------------------------
// Audio capture startup
// ---------------------------------------------------------------------------

/// Open the default input device and wire its chunks into `audio_buf`.
///
/// A dedicated thread drains cpal chunks, downmixes and resamples them to
/// 16 kHz mono, and appends to the shared buffer while its gate flag is set.
/// Returns the stream handle (which must stay alive for capture to continue),
/// or `None` if no usable input device exists — the app still launches and
/// the controller raises an alert if the user tries to record.
fn start_capture(audio_buf: SharedAudioBuffer) -> Option<voice_interview::audio::StreamHandle> {
    let capture = match AudioCapture::new() {
        Ok(capture) => capture,
        Err(e) => {
            log::warn!("Audio capture unavailable: {e}");
            return None;
        }
    };

    let native_sample_rate = capture.sample_rate();
    let channels = capture.channels();
    let (chunk_tx, chunk_rx) = std::sync::mpsc::channel::<AudioChunk>();

    std::thread::Builder::new()
        .name("audio-resample".into())
        .spawn(move || {
            while let Ok(chunk) = chunk_rx.recv() {
                // Check the gate under a brief lock; chunks that arrive
                // outside a recording are discarded.
                let is_recording = audio_buf.lock().unwrap().1;
                if !is_recording {
                    continue;
                }

                let mono = if channels > 1 {
                    interleaved_to_mono(&chunk.samples, channels)
                } else {
                    chunk.samples.clone()
                };

                let resampled = if chunk.sample_rate != 16_000 {
                    resample_to_16k(&mono, chunk.sample_rate)
                } else {
                    mono
                };

                audio_buf.lock().unwrap().0.extend_from_slice(&resampled);
            }
        })
        .expect("failed to spawn audio-resample thread");

    match capture.start(chunk_tx) {
        Ok(handle) => {
            log::info!(
                "Audio capture started ({} Hz, {} ch)",
                native_sample_rate,
                channels
            );
            Some(handle)
        }
        Err(e) => {
            log::warn!("Failed to start audio stream: {e}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let mut vp = egui::ViewportBuilder::default()
        .with_inner_size([520.0, 640.0])
        .with_min_inner_size([400.0, 480.0]);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    if let Some((x, y)) = config.ui.window_position {
        vp = vp.with_position(egui::pos2(x, y));
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Voice interview client starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (2 workers — the controller plus HTTP I/O)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Interview backend and speech engine
    let backend: Arc<dyn InterviewBackend> = Arc::new(HttpBackend::from_config(&config.backend));

    let speaker: Arc<dyn Speaker> = if config.speech.enabled {
        Arc::new(ProcessSpeaker::from_config(&config.speech))
    } else {
        log::info!("Question speech disabled by configuration");
        Arc::new(NullSpeaker)
    };

    // 5. Session channel and shared state
    let (command_tx, command_rx) = mpsc::channel::<SessionCommand>(32);
    let state = new_shared_session_state(config.clone());
    let audio_buf = new_shared_audio_buffer();

    // 6. cpal audio capture — feeds 16 kHz mono samples into audio_buf while
    //    the recording gate is open.  The handle must outlive run_native.
    let _stream_handle = start_capture(Arc::clone(&audio_buf));
    let capture_available = _stream_handle.is_some();

    // 7. Session controller on the tokio runtime
    let controller = SessionController::new(
        Arc::clone(&state),
        audio_buf,
        backend,
        speaker,
        capture_available,
        command_tx.downgrade(),
    );
    rt.spawn(controller.run(command_rx));

    // 8. Build the egui app and run it (blocks until the window is closed)
    let app = InterviewApp::new(state, command_tx);
    let options = native_options(&config);

    eframe::run_native(
        "Interview System",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
}
