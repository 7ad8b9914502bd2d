//! Interview window — egui/eframe application.
//!
//! # Architecture
//!
//! [`InterviewApp`] is the top-level [`eframe::App`].  It owns no session
//! logic: every frame it snapshots the [`SharedSessionState`] maintained by
//! the session controller and renders it, sending [`SessionCommand`]s over
//! `command_tx` when the user acts.
//!
//! # Screens
//!
//! | Session | Content |
//! |---------|---------|
//! | none    | Name field + "Start Interview" button |
//! | active  | Current question, record controls, countdown, score, transcript |
//!
//! A pending alert renders as a centred modal window with an OK button and
//! blocks the rest of the UI until dismissed.

use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::session::{
    Role, SessionCommand, SessionPhase, SharedSessionState, Turn,
};

// ---------------------------------------------------------------------------
// Colours
// ---------------------------------------------------------------------------

const SYSTEM_COLOR: egui::Color32 = egui::Color32::from_rgb(102, 153, 255);
const CANDIDATE_COLOR: egui::Color32 = egui::Color32::from_rgb(120, 200, 120);
const COUNTDOWN_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 140, 140);

// ---------------------------------------------------------------------------
// Pure view helpers
// ---------------------------------------------------------------------------

/// Which of the record buttons are clickable in `phase`:
/// `(start_enabled, stop_enabled)`.
fn record_controls(phase: SessionPhase) -> (bool, bool) {
    match phase {
        SessionPhase::AwaitingAnswer => (true, false),
        SessionPhase::Recording => (false, true),
        SessionPhase::NotStarted | SessionPhase::Submitting => (false, false),
    }
}

fn countdown_text(seconds_left: u32) -> String {
    format!("Time remaining: {seconds_left} seconds")
}

fn turn_color(role: Role) -> egui::Color32 {
    match role {
        Role::System => SYSTEM_COLOR,
        Role::Candidate => CANDIDATE_COLOR,
    }
}

// ---------------------------------------------------------------------------
// FrameView — per-frame snapshot of the shared state
// ---------------------------------------------------------------------------

/// Everything a single frame renders, copied out of the shared state so the
/// lock is held only for the snapshot.
struct FrameView {
    phase: SessionPhase,
    session_active: bool,
    current_question: String,
    transcript: Vec<Turn>,
    score: Option<String>,
    seconds_left: u32,
    alert: Option<String>,
}

// ---------------------------------------------------------------------------
// InterviewApp
// ---------------------------------------------------------------------------

/// eframe application — the interview client window.
pub struct InterviewApp {
    /// Session state maintained by the controller, read each frame.
    state: SharedSessionState,
    /// Send user actions to the session controller.
    command_tx: mpsc::Sender<SessionCommand>,
    /// Contents of the candidate-name field (UI-local until Start is clicked).
    name_input: String,
}

impl InterviewApp {
    /// Create a new [`InterviewApp`].
    ///
    /// * `state`      — shared session state written by the controller.
    /// * `command_tx` — sender end of the session command channel.
    pub fn new(state: SharedSessionState, command_tx: mpsc::Sender<SessionCommand>) -> Self {
        Self {
            state,
            command_tx,
            name_input: String::new(),
        }
    }

    fn snapshot(&self) -> FrameView {
        let st = self.state.lock().unwrap();
        FrameView {
            phase: st.phase,
            session_active: st.session_id.is_some(),
            current_question: st.current_question.clone(),
            transcript: st.transcript.clone(),
            score: st.score.as_ref().map(|s| s.to_string()),
            seconds_left: st.seconds_left,
            alert: st.alert.clone(),
        }
    }

    fn send(&self, cmd: SessionCommand) {
        if let Err(e) = self.command_tx.try_send(cmd) {
            log::warn!("ui: dropping command, controller busy or gone: {e}");
        }
    }

    // ── Screen renderers ─────────────────────────────────────────────────

    /// Pre-session screen: name entry and the start button.
    fn draw_name_entry(&mut self, ui: &mut egui::Ui) {
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("Name:");
            ui.add(
                egui::TextEdit::singleline(&mut self.name_input)
                    .hint_text("Enter your name")
                    .desired_width(220.0),
            );
        });

        ui.add_space(8.0);
        if ui.button("Start Interview").clicked() {
            self.send(SessionCommand::Start {
                candidate_name: self.name_input.clone(),
            });
        }
    }

    /// Active-session screen: question, record controls, countdown, score.
    fn draw_session(&mut self, ui: &mut egui::Ui, view: &FrameView) {
        ui.add_space(4.0);
        ui.label(egui::RichText::new("Current Question:").strong());
        ui.label(egui::RichText::new(view.current_question.as_str()).size(15.0));

        ui.add_space(8.0);
        let (start_enabled, stop_enabled) = record_controls(view.phase);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(start_enabled, egui::Button::new("Start Recording"))
                .clicked()
            {
                self.send(SessionCommand::StartRecording);
            }
            if ui
                .add_enabled(stop_enabled, egui::Button::new("Stop Recording"))
                .clicked()
            {
                self.send(SessionCommand::StopRecording);
            }
            if view.phase == SessionPhase::Submitting {
                ui.spinner();
                ui.label("Submitting...");
            }
        });

        ui.add_space(4.0);
        let countdown = egui::RichText::new(countdown_text(view.seconds_left));
        if view.phase.is_recording() {
            ui.label(countdown.color(COUNTDOWN_COLOR));
        } else {
            ui.label(countdown.weak());
        }

        if let Some(score) = &view.score {
            ui.add_space(4.0);
            ui.label(egui::RichText::new(format!("Scenario Score: {score}")).strong());
        }
    }

    /// Scrollable conversation transcript, newest entry kept in view.
    fn draw_transcript(&self, ui: &mut egui::Ui, transcript: &[Turn]) {
        ui.separator();
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for turn in transcript {
                    ui.label(
                        egui::RichText::new(format!("{}: {}", turn.role.label(), turn.text))
                            .color(turn_color(turn.role)),
                    );
                }
            });
    }

    /// Centred modal notice.  OK clears the alert in the shared state.
    fn draw_alert(&self, ctx: &egui::Context, message: &str) {
        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        self.state.lock().unwrap().alert = None;
                    }
                });
            });
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for InterviewApp {
    /// Called every frame by eframe.  Snapshots the shared state, renders it,
    /// and forwards user actions to the controller.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let view = self.snapshot();

        // The countdown and the submit spinner change without user input;
        // keep repainting while they are live.
        match view.phase {
            SessionPhase::Recording | SessionPhase::Submitting => {
                ctx.request_repaint_after(Duration::from_millis(200));
            }
            _ => {}
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Interview System");
            ui.separator();

            // The modal notice blocks everything behind it.
            ui.add_enabled_ui(view.alert.is_none(), |ui| {
                if view.session_active {
                    self.draw_session(ui, &view);
                } else {
                    self.draw_name_entry(ui);
                }
                self.draw_transcript(ui, &view.transcript);
            });
        });

        if let Some(message) = &view.alert {
            self.draw_alert(ctx, message);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("interview window closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
