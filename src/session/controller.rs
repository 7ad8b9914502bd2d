//! Session controller — drives the interview state machine.
//!
//! [`SessionController`] owns the [`SharedSessionState`] and responds to
//! [`SessionCommand`]s received over a `tokio::sync::mpsc` channel.
//!
//! # Command flow
//!
//! ```text
//! Start { candidate_name }
//!   └─▶ validate name → backend.start_interview → install first question
//!
//! StartRecording
//!   └─▶ open capture gate, countdown = answer_secs, spawn 1 s ticker
//!
//! Tick { generation }   (from the ticker task)
//!   └─▶ countdown -= 1; at 0 → stop recording + submit
//!
//! StopRecording         (from the UI button)
//!   └─▶ drain capture buffer → encode WAV → backend.submit_response
//!         ├─ completion message → notice + full reset
//!         └─ next question → display + speak; store score; log message
//! ```
//!
//! Exactly one ticker is ever live: starting or stopping a recording bumps
//! the shared generation counter and stale ticks are discarded.  Failures
//! never touch committed state — a failed submit leaves the transcript and
//! session id exactly as they were.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::audio::encode_wav;
use crate::backend::{BackendError, InterviewBackend};
use crate::session::state::{Role, SessionPhase, SharedSessionState};
use crate::speech::Speaker;

// ---------------------------------------------------------------------------
// User-facing alert texts
// ---------------------------------------------------------------------------

const ALERT_EMPTY_NAME: &str = "Please enter your name";
const ALERT_START_FAILED: &str =
    "An error occurred while starting the interview. Please try again.";
const ALERT_SUBMIT_FAILED: &str = "An error occurred while submitting your response.";
const ALERT_NO_SESSION: &str = "Session ID is missing.";
const ALERT_NO_CAPTURE: &str = "Audio capture is not available on this system.";
const ALERT_COMPLETED: &str = "Interview completed. Thank you for your participation!";

// ---------------------------------------------------------------------------
// SessionCommand
// ---------------------------------------------------------------------------

/// Commands handled by the controller.  The UI sends the first three; `Tick`
/// comes from the countdown ticker task.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Start a new interview session for the given candidate.
    Start { candidate_name: String },
    /// Begin capturing an answer.
    StartRecording,
    /// Stop capturing and submit the answer.
    StopRecording,
    /// One second of the answer countdown has elapsed.
    Tick { generation: u64 },
}

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Errors that can surface inside the session controller.
///
/// These are logged with full detail; the user only sees the generic alert
/// text for the action that failed.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The candidate name was empty or whitespace-only.
    #[error("candidate name is empty")]
    EmptyName,

    /// A submission was attempted without an active session.
    #[error("no active session")]
    NoSession,

    /// No usable microphone was found at startup.
    #[error("audio capture unavailable")]
    CaptureUnavailable,

    /// The interview backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

// ---------------------------------------------------------------------------
// SharedAudioBuffer
// ---------------------------------------------------------------------------

/// Thread-shared capture buffer: accumulated 16 kHz mono samples plus the
/// gate flag.  The audio feed thread appends only while the flag is `true`;
/// the controller drains it when recording stops.
pub type SharedAudioBuffer = Arc<Mutex<(Vec<f32>, bool)>>;

/// Construct an empty, closed-gate [`SharedAudioBuffer`].
pub fn new_shared_audio_buffer() -> SharedAudioBuffer {
    Arc::new(Mutex::new((Vec::new(), false)))
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

/// Drives the complete interview session.
///
/// Create with [`SessionController::new`], then call [`run`](Self::run)
/// inside a tokio task.
pub struct SessionController {
    state: SharedSessionState,
    audio_buf: SharedAudioBuffer,
    backend: Arc<dyn InterviewBackend>,
    speaker: Arc<dyn Speaker>,
    /// Whether a capture stream was successfully opened at startup.
    capture_available: bool,
    /// Generation counter for countdown tickers; bumping it tears the live
    /// ticker down.
    timer_generation: Arc<AtomicU64>,
    /// Weak handle to the command channel so the ticker can feed ticks back
    /// without keeping the channel open after the UI is gone.
    cmd_tx: mpsc::WeakSender<SessionCommand>,
}

impl SessionController {
    /// Create a new controller.
    ///
    /// # Arguments
    ///
    /// * `state`             — shared session state (also read by the UI).
    /// * `audio_buf`         — capture buffer filled by the audio feed thread.
    /// * `backend`           — interview service client.
    /// * `speaker`           — question playback engine.
    /// * `capture_available` — result of the startup microphone probe.
    /// * `cmd_tx`            — weak sender for the countdown ticker.
    pub fn new(
        state: SharedSessionState,
        audio_buf: SharedAudioBuffer,
        backend: Arc<dyn InterviewBackend>,
        speaker: Arc<dyn Speaker>,
        capture_available: bool,
        cmd_tx: mpsc::WeakSender<SessionCommand>,
    ) -> Self {
        Self {
            state,
            audio_buf,
            backend,
            speaker,
            capture_available,
            timer_generation: Arc::new(AtomicU64::new(0)),
            cmd_tx,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run the controller until `cmd_rx` is closed.
    ///
    /// This is an `async fn` and should be spawned as a tokio task from
    /// `main()`.  It never returns while the channel is open.
    pub async fn run(mut self, mut cmd_rx: mpsc::Receiver<SessionCommand>) {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                SessionCommand::Start { candidate_name } => {
                    self.handle_start(candidate_name).await;
                }
                SessionCommand::StartRecording => {
                    self.handle_start_recording();
                }
                SessionCommand::StopRecording => {
                    self.stop_recording(true).await;
                }
                SessionCommand::Tick { generation } => {
                    self.handle_tick(generation).await;
                }
            }
        }

        log::info!("session: command channel closed, controller shutting down");
    }

    // -----------------------------------------------------------------------
    // Command handlers
    // -----------------------------------------------------------------------

    /// Validate the candidate name and start a server-side session.
    ///
    /// On failure no partial state is committed — no session id, no
    /// transcript entry.
    async fn handle_start(&mut self, candidate_name: String) {
        let name = candidate_name.trim().to_string();
        if name.is_empty() {
            self.fail(&SessionError::EmptyName, ALERT_EMPTY_NAME);
            return;
        }

        if self.state.lock().unwrap().session_id.is_some() {
            log::warn!("session: start ignored, a session is already active");
            return;
        }

        match self.backend.start_interview(&name).await {
            Ok(reply) => {
                log::info!("session: started for {name} (id {})", reply.session_id);
                {
                    let mut st = self.state.lock().unwrap();
                    st.session_id = Some(reply.session_id);
                    st.candidate_name = name;
                    st.phase = SessionPhase::AwaitingAnswer;
                }
                self.present_question(&reply.question);
            }
            Err(e) => {
                self.fail(&SessionError::Backend(e), ALERT_START_FAILED);
            }
        }
    }

    /// Record the question as current, append a System turn, and speak it.
    ///
    /// Playback is fire-and-forget and its failure is soft: logged, never
    /// alerted.
    fn present_question(&self, question: &str) {
        let speech_enabled = {
            let mut st = self.state.lock().unwrap();
            st.current_question = question.to_string();
            st.log_turn(Role::System, question);
            st.config.speech.enabled
        };

        if speech_enabled {
            if let Err(e) = self.speaker.speak(question) {
                log::warn!("session: question playback unavailable: {e}");
            }
        }
    }

    /// Open the capture gate and start the answer countdown.
    fn handle_start_recording(&mut self) {
        let phase = self.state.lock().unwrap().phase;
        match phase {
            SessionPhase::Recording => {
                // At most one recording at a time.
                log::debug!("session: already recording, start ignored");
                return;
            }
            SessionPhase::AwaitingAnswer => {}
            other => {
                log::warn!("session: cannot record in phase {:?}", other);
                return;
            }
        }

        if !self.capture_available {
            self.fail(&SessionError::CaptureUnavailable, ALERT_NO_CAPTURE);
            return;
        }

        {
            let mut buf = self.audio_buf.lock().unwrap();
            buf.1 = true;
        }

        let answer_secs = {
            let mut st = self.state.lock().unwrap();
            st.phase = SessionPhase::Recording;
            st.seconds_left = st.config.audio.answer_secs;
            st.config.audio.answer_secs
        };

        self.spawn_ticker(answer_secs);
        log::debug!("session: recording started ({answer_secs} s limit)");
    }

    /// Apply one countdown tick.  Stale generations (from a torn-down
    /// ticker) are discarded; expiry stops the recording and submits.
    async fn handle_tick(&mut self, generation: u64) {
        if generation != self.timer_generation.load(Ordering::SeqCst) {
            return;
        }

        let seconds_left = {
            let mut st = self.state.lock().unwrap();
            if !st.phase.is_recording() {
                return;
            }
            st.seconds_left = st.seconds_left.saturating_sub(1);
            st.seconds_left
        };

        if seconds_left == 0 {
            log::info!("session: answer time limit reached, auto-stopping");
            self.stop_recording(true).await;
        }
    }

    /// Stop an active recording, draining the capture buffer.
    ///
    /// `submit` distinguishes the user/countdown paths (upload the answer)
    /// from the reset path (discard it).  No-op when nothing is recording.
    async fn stop_recording(&mut self, submit: bool) {
        if !self.state.lock().unwrap().phase.is_recording() {
            log::debug!("session: stop ignored, not recording");
            return;
        }

        self.invalidate_timer();

        let samples: Vec<f32> = {
            let mut buf = self.audio_buf.lock().unwrap();
            buf.1 = false;
            std::mem::take(&mut buf.0)
        };

        {
            // Countdown resets the instant recording stops, by any path.
            let mut st = self.state.lock().unwrap();
            st.phase = SessionPhase::AwaitingAnswer;
            st.seconds_left = st.config.audio.answer_secs;
        }

        if submit {
            self.submit_answer(samples).await;
        } else {
            log::debug!("session: discarded {} captured samples", samples.len());
        }
    }

    /// Encode the captured answer and upload it.
    ///
    /// On failure the transcript and session are left untouched — the
    /// "Audio response submitted." turn only appears after a 2xx reply.
    async fn submit_answer(&mut self, samples: Vec<f32>) {
        let (session_id, sample_rate) = {
            let st = self.state.lock().unwrap();
            (st.session_id.clone(), st.config.audio.sample_rate)
        };

        let Some(session_id) = session_id else {
            self.fail(&SessionError::NoSession, ALERT_NO_SESSION);
            return;
        };

        let wav = match encode_wav(&samples, sample_rate) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("session: WAV encoding failed: {e}");
                self.alert(ALERT_SUBMIT_FAILED);
                return;
            }
        };

        self.state.lock().unwrap().phase = SessionPhase::Submitting;

        let reply = match self.backend.submit_response(&session_id, wav).await {
            Ok(reply) => reply,
            Err(e) => {
                self.fail(&SessionError::Backend(e), ALERT_SUBMIT_FAILED);
                self.state.lock().unwrap().phase = SessionPhase::AwaitingAnswer;
                return;
            }
        };

        self.state
            .lock()
            .unwrap()
            .log_turn(Role::Candidate, "Audio response submitted.");

        if reply.is_completed() {
            self.finish_interview();
            return;
        }

        if let Some(question) = &reply.question {
            self.present_question(question);
        }

        let mut st = self.state.lock().unwrap();
        if let Some(score) = reply.score {
            st.log_turn(Role::System, format!("Scenario score: {score}"));
            st.score = Some(score);
        }
        if let Some(message) = reply.message {
            st.log_turn(Role::System, message);
        }
        st.phase = SessionPhase::AwaitingAnswer;
    }

    /// Completion: show the thank-you notice and clear all session state,
    /// including any still-captured audio.
    fn finish_interview(&mut self) {
        log::info!("session: interview completed");
        self.invalidate_timer();

        {
            let mut buf = self.audio_buf.lock().unwrap();
            buf.1 = false;
            buf.0.clear();
        }

        let mut st = self.state.lock().unwrap();
        st.alert = Some(ALERT_COMPLETED.to_string());
        st.reset();
    }

    // -----------------------------------------------------------------------
    // Countdown ticker
    // -----------------------------------------------------------------------

    /// Spawn a fresh one-second ticker for this recording.
    ///
    /// The ticker stops on its own after `answer_secs` ticks, when its
    /// generation is superseded, or when the command channel closes — so at
    /// most one ticker ever feeds the controller.
    fn spawn_ticker(&mut self, answer_secs: u32) {
        let generation = self.timer_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let live_generation = Arc::clone(&self.timer_generation);

        let Some(tx) = self.cmd_tx.upgrade() else {
            log::warn!("session: command channel gone, countdown not started");
            return;
        };

        tokio::spawn(async move {
            for _ in 0..answer_secs {
                tokio::time::sleep(Duration::from_secs(1)).await;
                if live_generation.load(Ordering::SeqCst) != generation {
                    break;
                }
                if tx.send(SessionCommand::Tick { generation }).await.is_err() {
                    break;
                }
            }
        });
    }

    /// Supersede the live ticker, if any.
    fn invalidate_timer(&mut self) {
        self.timer_generation.fetch_add(1, Ordering::SeqCst);
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn alert(&self, message: &str) {
        let mut st = self.state.lock().unwrap();
        st.alert = Some(message.to_string());
    }

    fn fail(&self, err: &SessionError, user_message: &str) {
        log::error!("session: {err}");
        self.alert(user_message);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ScoreValue, StartReply, SubmitReply};
    use crate::config::AppConfig;
    use crate::session::state::{new_shared_session_state, SessionState};
    use crate::speech::NullSpeaker;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Scriptable interview backend: a fixed start result and a queue of
    /// submit results, with call counters.
    struct MockBackend {
        start_result: Result<StartReply, u16>,
        submit_results: Mutex<VecDeque<Result<SubmitReply, u16>>>,
        start_calls: AtomicUsize,
        submit_calls: AtomicUsize,
        last_payload_len: Mutex<Option<usize>>,
    }

    impl MockBackend {
        fn new(start_result: Result<StartReply, u16>) -> Arc<Self> {
            Arc::new(Self {
                start_result,
                submit_results: Mutex::new(VecDeque::new()),
                start_calls: AtomicUsize::new(0),
                submit_calls: AtomicUsize::new(0),
                last_payload_len: Mutex::new(None),
            })
        }

        fn starting_with(question: &str) -> Arc<Self> {
            Self::new(Ok(StartReply {
                session_id: "s1".into(),
                question: question.into(),
            }))
        }

        fn queue_submit(&self, result: Result<SubmitReply, u16>) {
            self.submit_results.lock().unwrap().push_back(result);
        }

        fn start_calls(&self) -> usize {
            self.start_calls.load(Ordering::SeqCst)
        }

        fn submit_calls(&self) -> usize {
            self.submit_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InterviewBackend for MockBackend {
        async fn start_interview(&self, _name: &str) -> Result<StartReply, BackendError> {
            self.start_calls.fetch_add(1, Ordering::SeqCst);
            match &self.start_result {
                Ok(reply) => Ok(reply.clone()),
                Err(status) => Err(BackendError::Status {
                    status: *status,
                    body: String::new(),
                }),
            }
        }

        async fn submit_response(
            &self,
            _session_id: &str,
            wav_bytes: Vec<u8>,
        ) -> Result<SubmitReply, BackendError> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_payload_len.lock().unwrap() = Some(wav_bytes.len());
            match self.submit_results.lock().unwrap().pop_front() {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(status)) => Err(BackendError::Status {
                    status,
                    body: "simulated failure".into(),
                }),
                None => Ok(SubmitReply::default()),
            }
        }
    }

    fn next_question(text: &str) -> SubmitReply {
        SubmitReply {
            question: Some(text.into()),
            ..SubmitReply::default()
        }
    }

    fn completion() -> SubmitReply {
        SubmitReply {
            message: Some(crate::backend::COMPLETION_MESSAGE.into()),
            ..SubmitReply::default()
        }
    }

    // -----------------------------------------------------------------------
    // Harness
    // -----------------------------------------------------------------------

    struct Harness {
        controller: SessionController,
        state: SharedSessionState,
        audio_buf: SharedAudioBuffer,
        tx: mpsc::Sender<SessionCommand>,
        rx: mpsc::Receiver<SessionCommand>,
    }

    fn make_harness(backend: Arc<MockBackend>, capture_available: bool) -> Harness {
        let (tx, rx) = mpsc::channel(64);
        let state = new_shared_session_state(AppConfig::default());
        let audio_buf = new_shared_audio_buffer();

        let controller = SessionController::new(
            Arc::clone(&state),
            Arc::clone(&audio_buf),
            backend,
            Arc::new(NullSpeaker),
            capture_available,
            tx.downgrade(),
        );

        Harness {
            controller,
            state,
            audio_buf,
            tx,
            rx,
        }
    }

    /// Fill the capture buffer with half a second of a quiet tone.
    fn fill_capture_buffer(audio_buf: &SharedAudioBuffer) {
        let samples: Vec<f32> = (0..8_000).map(|i| (i as f32 * 0.01).sin() * 0.1).collect();
        audio_buf.lock().unwrap().0.extend_from_slice(&samples);
    }

    fn snapshot<T>(state: &SharedSessionState, f: impl FnOnce(&SessionState) -> T) -> T {
        f(&state.lock().unwrap())
    }

    // -----------------------------------------------------------------------
    // Start session
    // -----------------------------------------------------------------------

    /// An empty name must never produce a network call.
    #[tokio::test]
    async fn empty_name_alerts_without_network_call() {
        let backend = MockBackend::starting_with("Q1");
        let h = make_harness(Arc::clone(&backend), true);

        h.tx.send(SessionCommand::Start {
            candidate_name: String::new(),
        })
        .await
        .unwrap();
        drop(h.tx);
        h.controller.run(h.rx).await;

        assert_eq!(backend.start_calls(), 0);
        assert_eq!(
            snapshot(&h.state, |st| st.alert.clone()).as_deref(),
            Some(ALERT_EMPTY_NAME)
        );
        assert_eq!(snapshot(&h.state, |st| st.phase), SessionPhase::NotStarted);
    }

    /// Whitespace-only names are as empty as empty ones.
    #[tokio::test]
    async fn whitespace_name_alerts_without_network_call() {
        let backend = MockBackend::starting_with("Q1");
        let h = make_harness(Arc::clone(&backend), true);

        h.tx.send(SessionCommand::Start {
            candidate_name: "   \t ".into(),
        })
        .await
        .unwrap();
        drop(h.tx);
        h.controller.run(h.rx).await;

        assert_eq!(backend.start_calls(), 0);
        assert!(snapshot(&h.state, |st| st.alert.is_some()));
    }

    /// After a successful start the transcript's first entry is the System
    /// turn carrying the returned question.
    #[tokio::test]
    async fn successful_start_installs_first_question() {
        let backend = MockBackend::starting_with("Tell me about yourself.");
        let h = make_harness(backend, true);

        h.tx.send(SessionCommand::Start {
            candidate_name: "Ada".into(),
        })
        .await
        .unwrap();
        drop(h.tx);
        h.controller.run(h.rx).await;

        let st = h.state.lock().unwrap();
        assert_eq!(st.session_id.as_deref(), Some("s1"));
        assert_eq!(st.phase, SessionPhase::AwaitingAnswer);
        assert_eq!(st.candidate_name, "Ada");
        assert_eq!(st.current_question, "Tell me about yourself.");
        assert_eq!(st.transcript.len(), 1);
        assert_eq!(st.transcript[0].role, Role::System);
        assert_eq!(st.transcript[0].text, "Tell me about yourself.");
        assert!(st.alert.is_none());
    }

    /// A failed start must commit no partial state.
    #[tokio::test]
    async fn failed_start_commits_no_state() {
        let backend = MockBackend::new(Err(500));
        let h = make_harness(backend, true);

        h.tx.send(SessionCommand::Start {
            candidate_name: "Ada".into(),
        })
        .await
        .unwrap();
        drop(h.tx);
        h.controller.run(h.rx).await;

        let st = h.state.lock().unwrap();
        assert!(st.session_id.is_none());
        assert!(st.transcript.is_empty());
        assert_eq!(st.phase, SessionPhase::NotStarted);
        assert_eq!(st.alert.as_deref(), Some(ALERT_START_FAILED));
    }

    // -----------------------------------------------------------------------
    // Recording
    // -----------------------------------------------------------------------

    /// Recording without a capture device raises the capability alert.
    #[tokio::test]
    async fn recording_without_capture_device_alerts() {
        let backend = MockBackend::starting_with("Q1");
        let h = make_harness(backend, false);

        h.tx.send(SessionCommand::Start {
            candidate_name: "Ada".into(),
        })
        .await
        .unwrap();
        h.tx.send(SessionCommand::StartRecording).await.unwrap();
        drop(h.tx);
        h.controller.run(h.rx).await;

        let st = h.state.lock().unwrap();
        assert_eq!(st.phase, SessionPhase::AwaitingAnswer);
        assert_eq!(st.alert.as_deref(), Some(ALERT_NO_CAPTURE));
    }

    /// User stop: drains the buffer, submits once, resets the countdown and
    /// installs the next question.
    #[tokio::test]
    async fn stop_recording_submits_and_installs_next_question() {
        let backend = MockBackend::starting_with("Q1");
        backend.queue_submit(Ok(next_question("Q2")));
        let h = make_harness(Arc::clone(&backend), true);

        fill_capture_buffer(&h.audio_buf);

        h.tx.send(SessionCommand::Start {
            candidate_name: "Ada".into(),
        })
        .await
        .unwrap();
        h.tx.send(SessionCommand::StartRecording).await.unwrap();
        h.tx.send(SessionCommand::StopRecording).await.unwrap();
        drop(h.tx);
        h.controller.run(h.rx).await;

        assert_eq!(backend.submit_calls(), 1);
        // WAV payload: 44-byte header + 2 bytes per sample.
        assert_eq!(
            *backend.last_payload_len.lock().unwrap(),
            Some(44 + 8_000 * 2)
        );

        let st = h.state.lock().unwrap();
        assert_eq!(st.session_id.as_deref(), Some("s1"));
        assert_eq!(st.current_question, "Q2");
        assert_eq!(st.seconds_left, 45);
        assert_eq!(st.phase, SessionPhase::AwaitingAnswer);
        // System Q1, Candidate submission, System Q2 — exactly one new
        // System entry for the new question.
        assert_eq!(st.transcript.len(), 3);
        assert_eq!(st.transcript[1].role, Role::Candidate);
        assert_eq!(st.transcript[1].text, "Audio response submitted.");
        assert_eq!(st.transcript[2].role, Role::System);
        assert_eq!(st.transcript[2].text, "Q2");
        // Capture buffer drained and gate closed.
        let buf = h.audio_buf.lock().unwrap();
        assert!(buf.0.is_empty());
        assert!(!buf.1);
    }

    /// Stop when nothing is recording is an idempotent no-op.
    #[tokio::test]
    async fn stop_without_recording_is_noop() {
        let backend = MockBackend::starting_with("Q1");
        let h = make_harness(Arc::clone(&backend), true);

        h.tx.send(SessionCommand::StopRecording).await.unwrap();
        drop(h.tx);
        h.controller.run(h.rx).await;

        assert_eq!(backend.submit_calls(), 0);
        assert!(snapshot(&h.state, |st| st.alert.is_none()));
    }

    // -----------------------------------------------------------------------
    // Countdown
    // -----------------------------------------------------------------------

    /// Valid ticks decrement the countdown by exactly one; stale ticks are
    /// ignored; the countdown never goes negative.
    #[tokio::test(start_paused = true)]
    async fn ticks_decrement_and_stale_ticks_are_ignored() {
        let backend = MockBackend::starting_with("Q1");
        let mut h = make_harness(backend, true);

        h.controller.handle_start("Ada".into()).await;
        h.controller.handle_start_recording();

        let generation = h.controller.timer_generation.load(Ordering::SeqCst);
        assert_eq!(snapshot(&h.state, |st| st.seconds_left), 45);

        h.controller.handle_tick(generation).await;
        assert_eq!(snapshot(&h.state, |st| st.seconds_left), 44);

        // A tick from a superseded ticker must change nothing.
        h.controller.handle_tick(generation + 7).await;
        assert_eq!(snapshot(&h.state, |st| st.seconds_left), 44);

        // Stopping resets the countdown immediately.
        h.controller.stop_recording(false).await;
        assert_eq!(snapshot(&h.state, |st| st.seconds_left), 45);

        // Ticks after the stop are stale and ignored.
        h.controller.handle_tick(generation).await;
        assert_eq!(snapshot(&h.state, |st| st.seconds_left), 45);
    }

    /// Countdown expiry stops the recording and submits exactly once.
    ///
    /// The controller runs as a task and `tx` is held open while the paused
    /// clock drives the 45 s countdown to zero.
    #[tokio::test(start_paused = true)]
    async fn countdown_expiry_auto_submits_exactly_once() {
        let backend = MockBackend::starting_with("Q1");
        backend.queue_submit(Ok(next_question("Q2")));
        let h = make_harness(Arc::clone(&backend), true);

        fill_capture_buffer(&h.audio_buf);

        let run = tokio::spawn(h.controller.run(h.rx));

        h.tx.send(SessionCommand::Start {
            candidate_name: "Ada".into(),
        })
        .await
        .unwrap();
        h.tx.send(SessionCommand::StartRecording).await.unwrap();

        // No stop command: the countdown must stop and submit on its own.
        tokio::time::timeout(Duration::from_secs(300), async {
            while backend.submit_calls() == 0 {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        })
        .await
        .expect("countdown never expired");

        drop(h.tx);
        run.await.unwrap();

        assert_eq!(backend.submit_calls(), 1);
        let st = h.state.lock().unwrap();
        assert_eq!(st.seconds_left, 45);
        assert_eq!(st.phase, SessionPhase::AwaitingAnswer);
        assert_eq!(st.current_question, "Q2");
        assert_eq!(st.session_id.as_deref(), Some("s1"));
    }

    // -----------------------------------------------------------------------
    // Submission outcomes
    // -----------------------------------------------------------------------

    /// A completion reply clears everything, however long the transcript.
    #[tokio::test]
    async fn completion_reply_resets_session() {
        let backend = MockBackend::starting_with("Q1");
        backend.queue_submit(Ok(next_question("Q2")));
        backend.queue_submit(Ok(completion()));
        let h = make_harness(Arc::clone(&backend), true);

        fill_capture_buffer(&h.audio_buf);

        h.tx.send(SessionCommand::Start {
            candidate_name: "Ada".into(),
        })
        .await
        .unwrap();
        h.tx.send(SessionCommand::StartRecording).await.unwrap();
        h.tx.send(SessionCommand::StopRecording).await.unwrap();
        h.tx.send(SessionCommand::StartRecording).await.unwrap();
        h.tx.send(SessionCommand::StopRecording).await.unwrap();
        drop(h.tx);
        h.controller.run(h.rx).await;

        assert_eq!(backend.submit_calls(), 2);
        let st = h.state.lock().unwrap();
        assert!(st.session_id.is_none());
        assert!(st.transcript.is_empty());
        assert!(st.candidate_name.is_empty());
        assert!(st.current_question.is_empty());
        assert!(st.score.is_none());
        assert_eq!(st.phase, SessionPhase::NotStarted);
        assert_eq!(st.alert.as_deref(), Some(ALERT_COMPLETED));
    }

    /// A failed submit leaves the transcript and session id untouched — no
    /// "Audio response submitted." entry appears.
    #[tokio::test]
    async fn failed_submit_preserves_state() {
        let backend = MockBackend::starting_with("Q1");
        backend.queue_submit(Err(500));
        let h = make_harness(Arc::clone(&backend), true);

        fill_capture_buffer(&h.audio_buf);

        h.tx.send(SessionCommand::Start {
            candidate_name: "Ada".into(),
        })
        .await
        .unwrap();
        h.tx.send(SessionCommand::StartRecording).await.unwrap();
        h.tx.send(SessionCommand::StopRecording).await.unwrap();
        drop(h.tx);
        h.controller.run(h.rx).await;

        assert_eq!(backend.submit_calls(), 1);
        let st = h.state.lock().unwrap();
        // Only the System Q1 entry from the start — nothing was appended.
        assert_eq!(st.transcript.len(), 1);
        assert_eq!(st.session_id.as_deref(), Some("s1"));
        assert_eq!(st.current_question, "Q1");
        assert_eq!(st.phase, SessionPhase::AwaitingAnswer);
        assert_eq!(st.alert.as_deref(), Some(ALERT_SUBMIT_FAILED));
    }

    /// Score and extra message are logged as System turns after the new
    /// question, and the score is stored for display.
    #[tokio::test]
    async fn score_and_message_are_logged() {
        let backend = MockBackend::starting_with("Q1");
        backend.queue_submit(Ok(SubmitReply {
            message: Some("Good depth on that answer.".into()),
            question: Some("Q2".into()),
            score: Some(ScoreValue::Number(8.0)),
        }));
        let h = make_harness(Arc::clone(&backend), true);

        fill_capture_buffer(&h.audio_buf);

        h.tx.send(SessionCommand::Start {
            candidate_name: "Ada".into(),
        })
        .await
        .unwrap();
        h.tx.send(SessionCommand::StartRecording).await.unwrap();
        h.tx.send(SessionCommand::StopRecording).await.unwrap();
        drop(h.tx);
        h.controller.run(h.rx).await;

        let st = h.state.lock().unwrap();
        assert_eq!(st.score, Some(ScoreValue::Number(8.0)));
        let texts: Vec<&str> = st.transcript.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Q1",
                "Audio response submitted.",
                "Q2",
                "Scenario score: 8",
                "Good depth on that answer.",
            ]
        );
    }

    /// Submitting with no active session raises the missing-session alert
    /// and never reaches the backend.
    #[tokio::test]
    async fn submit_without_session_alerts() {
        let backend = MockBackend::starting_with("Q1");
        let mut h = make_harness(Arc::clone(&backend), true);

        // Force a recording without a session (not reachable through the
        // UI, but the invariant must hold regardless).
        {
            let mut st = h.state.lock().unwrap();
            st.phase = SessionPhase::Recording;
        }
        h.audio_buf.lock().unwrap().1 = true;

        h.controller.stop_recording(true).await;

        assert_eq!(backend.submit_calls(), 0);
        assert_eq!(
            snapshot(&h.state, |st| st.alert.clone()).as_deref(),
            Some(ALERT_NO_SESSION)
        );
    }
}
