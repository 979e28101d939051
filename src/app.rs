//! EchoVerse window: egui/eframe application.
//!
//! # Architecture
//!
//! [`ExplainerApp`] is the top-level [`eframe::App`].  It never touches the
//! session directly; it owns two channel endpoints to the
//! [`SessionWorker`](crate::session::SessionWorker):
//!
//! * `command_tx` sends [`SessionCommand`]s.
//! * `event_rx` receives [`SessionEvent`]s, drained every frame with
//!   `try_recv`.
//!
//! Audio playback stays on the UI thread because the cpal stream is not
//! `Send`.
//!
//! # Layout
//!
//! | Area | Contents |
//! |------|----------|
//! | Header | Title, input-mode radio |
//! | Input | PDF path + Load (or drop a file) / URL + Fetch / free-text area |
//! | Actions | Explain, Speak (disabled until an explanation exists) |
//! | Preview | First `preview_chars` characters (at most 1000) + total count |
//! | Explanation | Last generated explanation, playback controls |
//! | Status | Spinner while busy, error line |

use std::path::PathBuf;
use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::audio::AudioPlayer;
use crate::config::AppConfig;
use crate::extract::DocumentSource;
use crate::session::{Activity, InputMode, SessionCommand, SessionEvent, TextPreview};
use crate::speech::AudioClip;

const TITLE: &str = "Smart Learning Assistant (EchoVerse)";

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 136, 68);
const HINT_COLOR: egui::Color32 = egui::Color32::from_rgb(140, 140, 140);

// ---------------------------------------------------------------------------
// ExplainerApp
// ---------------------------------------------------------------------------

/// eframe application for the EchoVerse window.
pub struct ExplainerApp {
    // ── Inputs ───────────────────────────────────────────────────────────
    mode: InputMode,
    pdf_path: String,
    url: String,
    typed_text: String,
    /// Set when `typed_text` changed but the worker has not been sent it yet.
    text_dirty: bool,

    // ── Worker output ────────────────────────────────────────────────────
    preview: Option<TextPreview>,
    explanation: String,
    busy: Option<Activity>,
    notice: Option<String>,
    error_message: Option<String>,

    // ── Playback ─────────────────────────────────────────────────────────
    /// `None` when no output device was found at startup.
    player: Option<AudioPlayer>,
    last_clip: Option<AudioClip>,

    // ── Channels ─────────────────────────────────────────────────────────
    command_tx: mpsc::Sender<SessionCommand>,
    event_rx: mpsc::Receiver<SessionEvent>,

    config: AppConfig,
}

impl ExplainerApp {
    /// `player` is `None` when no output device could be opened; the window
    /// still works and shows a warning instead of playing audio.
    pub fn new(
        command_tx: mpsc::Sender<SessionCommand>,
        event_rx: mpsc::Receiver<SessionEvent>,
        player: Option<AudioPlayer>,
        config: AppConfig,
    ) -> Self {
        let error_message = player
            .is_none()
            .then(|| "No audio output device found; Speak will not be audible.".to_string());

        Self {
            mode: InputMode::default(),
            pdf_path: String::new(),
            url: String::new(),
            typed_text: String::new(),
            text_dirty: false,
            preview: None,
            explanation: String::new(),
            busy: None,
            notice: None,
            error_message,
            player,
            last_clip: None,
            command_tx,
            event_rx,
            config,
        }
    }

    // ── Channel plumbing ─────────────────────────────────────────────────

    fn try_queue(&self, command: SessionCommand) -> bool {
        match self.command_tx.try_send(command) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("ui: could not queue command: {e}");
                false
            }
        }
    }

    fn send(&mut self, command: SessionCommand) {
        if !self.try_queue(command) {
            self.report_busy();
        }
    }

    fn report_busy(&mut self) {
        self.error_message = Some("The assistant is still busy; try again in a moment.".into());
    }

    /// Hand the latest typed text to the worker. Retried every frame while
    /// the command queue is full so no edit is lost.
    fn sync_typed_text(&mut self) {
        if !self.text_dirty || self.mode != InputMode::Text {
            return;
        }
        if self.try_queue(SessionCommand::ProvideText(self.typed_text.clone())) {
            self.text_dirty = false;
        }
    }

    /// Drain all pending session events (non-blocking).
    fn poll_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                SessionEvent::Busy(activity) => {
                    self.busy = Some(activity);
                    self.notice = None;
                    self.error_message = None;
                }
                SessionEvent::TextReady(preview) => {
                    self.busy = None;
                    self.preview = Some(preview);
                }
                SessionEvent::TextCleared => {
                    self.preview = None;
                }
                SessionEvent::ExplanationReady(text) => {
                    self.busy = None;
                    self.explanation = text;
                }
                SessionEvent::ExplainSkipped => {
                    self.busy = None;
                    self.notice = Some("Nothing to explain yet; provide some text first.".into());
                }
                SessionEvent::AudioReady(clip) => {
                    self.busy = None;
                    self.play(clip);
                }
                SessionEvent::Failed { message } => {
                    self.busy = None;
                    self.error_message = Some(message);
                }
            }
        }
    }

    fn play(&mut self, clip: AudioClip) {
        if let Some(player) = self.player.as_mut() {
            if let Err(e) = player.play(&clip) {
                log::error!("playback failed: {e}");
                self.error_message = Some(format!("Playback failed: {e}"));
            }
        }
        self.last_clip = Some(clip);
    }

    // ── Actions ──────────────────────────────────────────────────────────

    fn select_mode(&mut self, mode: InputMode) {
        self.mode = mode;
        self.send(SessionCommand::SelectMode(mode));
        if mode == InputMode::Text && !self.typed_text.is_empty() {
            self.text_dirty = true;
            self.sync_typed_text();
        }
    }

    fn edit_typed_text(&mut self) {
        self.text_dirty = true;
        self.sync_typed_text();
    }

    /// Explain never runs ahead of an unsent edit.
    fn request_explain(&mut self) {
        self.sync_typed_text();
        if self.text_dirty {
            self.report_busy();
            return;
        }
        self.send(SessionCommand::Explain);
    }

    fn load_pdf_path(&mut self) {
        if self.busy.is_some() {
            return;
        }
        let path = self.pdf_path.trim();
        if path.is_empty() {
            return;
        }
        let source = DocumentSource::Path(PathBuf::from(path));
        self.send(SessionCommand::LoadDocument(source));
    }

    /// Files dropped on the window are loaded in PDF mode only.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };
        if self.mode != InputMode::Pdf {
            log::debug!("ui: ignoring dropped file outside PDF mode");
            return;
        }

        let source = if let Some(path) = file.path {
            self.pdf_path = path.display().to_string();
            DocumentSource::Path(path)
        } else if let Some(bytes) = file.bytes {
            self.pdf_path = file.name.clone();
            DocumentSource::Bytes {
                name: file.name,
                bytes: bytes.to_vec(),
            }
        } else {
            return;
        };
        self.send(SessionCommand::LoadDocument(source));
    }

    // ── Panels ───────────────────────────────────────────────────────────

    fn draw_header(&mut self, ui: &mut egui::Ui) {
        ui.heading(TITLE);
        ui.add_space(4.0);

        let mut mode = self.mode;
        ui.horizontal(|ui| {
            ui.label("Choose input type:");
            for option in InputMode::ALL {
                ui.radio_value(&mut mode, option, option.label());
            }
        });
        if mode != self.mode {
            self.select_mode(mode);
        }
    }

    fn draw_input(&mut self, ui: &mut egui::Ui) {
        let idle = self.busy.is_none();
        match self.mode {
            InputMode::Pdf => {
                ui.horizontal(|ui| {
                    ui.label("PDF file:");
                    let field = ui.add(
                        egui::TextEdit::singleline(&mut self.pdf_path)
                            .hint_text("path/to/document.pdf"),
                    );
                    let submitted =
                        field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.add_enabled(idle, egui::Button::new("Load")).clicked() || submitted {
                        self.load_pdf_path();
                    }
                });
                ui.label(
                    egui::RichText::new("…or drop a PDF onto this window.").color(HINT_COLOR),
                );
            }
            InputMode::Link => {
                ui.horizontal(|ui| {
                    ui.label("URL:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.url).hint_text("https://example.com"),
                    );
                    if ui.add_enabled(idle, egui::Button::new("Fetch")).clicked() {
                        self.send(SessionCommand::FetchLink(self.url.clone()));
                    }
                });
            }
            InputMode::Text => {
                let edit = ui.add(
                    egui::TextEdit::multiline(&mut self.typed_text)
                        .hint_text("Paste or type your text here")
                        .desired_rows(6)
                        .desired_width(f32::INFINITY),
                );
                if edit.changed() {
                    self.edit_typed_text();
                }
            }
        }
    }

    fn draw_actions(&mut self, ui: &mut egui::Ui) {
        let idle = self.busy.is_none();
        ui.horizontal(|ui| {
            if ui.add_enabled(idle, egui::Button::new("Explain")).clicked() {
                self.request_explain();
            }
            let can_speak = idle && !self.explanation.is_empty();
            if ui.add_enabled(can_speak, egui::Button::new("Speak")).clicked() {
                self.send(SessionCommand::Speak);
            }
        });
    }

    fn draw_preview(&self, ui: &mut egui::Ui) {
        // Typed text is already on screen.
        if self.mode == InputMode::Text {
            return;
        }
        let Some(preview) = &self.preview else {
            return;
        };

        ui.label(egui::RichText::new("Preview").strong());
        egui::ScrollArea::vertical()
            .id_salt("preview")
            .max_height(160.0)
            .show(ui, |ui| {
                ui.label(egui::RichText::new(preview.text.as_str()).monospace());
            });
        let count = if preview.is_truncated() {
            format!(
                "Showing the first {} of {} characters.",
                preview.text.chars().count(),
                preview.total_chars
            )
        } else {
            format!("{} characters.", preview.total_chars)
        };
        ui.label(egui::RichText::new(count).color(HINT_COLOR).size(11.0));
    }

    fn draw_explanation(&mut self, ui: &mut egui::Ui) {
        if self.explanation.is_empty() {
            return;
        }

        ui.label(egui::RichText::new("Explanation").strong());
        egui::ScrollArea::vertical()
            .id_salt("explanation")
            .max_height(260.0)
            .show(ui, |ui| {
                ui.label(self.explanation.as_str());
            });

        if self.last_clip.is_some() && self.player.is_some() {
            let playing = self.player.as_ref().is_some_and(AudioPlayer::is_playing);
            ui.horizontal(|ui| {
                if ui.button("Play again").clicked() {
                    if let Some(clip) = self.last_clip.clone() {
                        self.play(clip);
                    }
                }
                if ui.add_enabled(playing, egui::Button::new("Stop")).clicked() {
                    if let Some(player) = self.player.as_mut() {
                        player.stop();
                    }
                }
            });
        }
    }

    /// Remember the window geometry so it can be restored next launch.
    fn track_window(&mut self, ctx: &egui::Context) {
        let (outer, inner) = ctx.input(|i| (i.viewport().outer_rect, i.viewport().inner_rect));
        if let Some(rect) = outer {
            self.config.ui.window_position = Some((rect.min.x, rect.min.y));
        }
        if let Some(rect) = inner {
            self.config.ui.window_size = (rect.width(), rect.height());
        }
    }

    fn draw_status(&self, ui: &mut egui::Ui) {
        if let Some(activity) = self.busy {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(activity.label());
            });
        }
        if let Some(notice) = &self.notice {
            ui.label(egui::RichText::new(notice.as_str()).color(HINT_COLOR));
        }
        if let Some(message) = &self.error_message {
            ui.label(egui::RichText::new(message.as_str()).color(ERROR_COLOR));
        }
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for ExplainerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events();
        self.sync_typed_text();
        self.handle_dropped_files(ctx);
        self.track_window(ctx);

        // Events only arrive through polling, so keep a slow tick even when idle.
        let playing = self.player.as_ref().is_some_and(AudioPlayer::is_playing);
        let tick = if self.busy.is_some() || playing { 100 } else { 250 };
        ctx.request_repaint_after(Duration::from_millis(tick));

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.draw_header(ui);
                ui.separator();
                self.draw_input(ui);
                ui.add_space(6.0);
                self.draw_actions(ui);
                ui.add_space(4.0);
                self.draw_status(ui);
                ui.separator();
                self.draw_preview(ui);
                ui.add_space(6.0);
                self.draw_explanation(ui);
            });
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(player) = self.player.as_mut() {
            player.stop();
        }
        if let Err(e) = self.config.save() {
            log::warn!("could not save window geometry: {e}");
        }
        log::info!("EchoVerse window closing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with_queue(capacity: usize) -> (ExplainerApp, mpsc::Receiver<SessionCommand>) {
        let (command_tx, command_rx) = mpsc::channel(capacity);
        let (_event_tx, event_rx) = mpsc::channel(1);
        let app = ExplainerApp::new(command_tx, event_rx, None, AppConfig::default());
        (app, command_rx)
    }

    fn fill(app: &ExplainerApp) {
        while app.command_tx.try_send(SessionCommand::Speak).is_ok() {}
    }

    fn drain(rx: &mut mpsc::Receiver<SessionCommand>) -> Vec<SessionCommand> {
        let mut commands = Vec::new();
        while let Ok(command) = rx.try_recv() {
            commands.push(command);
        }
        commands
    }

    #[test]
    fn edit_made_while_queue_is_full_is_sent_later() {
        let (mut app, mut rx) = app_with_queue(1);
        fill(&app);

        app.typed_text = "Photosynthesis".into();
        app.edit_typed_text();
        app.typed_text.push_str(" turns light into sugar");
        app.edit_typed_text();
        assert!(app.text_dirty);

        drain(&mut rx);
        app.sync_typed_text();
        assert!(!app.text_dirty);
        match rx.try_recv() {
            Ok(SessionCommand::ProvideText(text)) => {
                assert_eq!(text, "Photosynthesis turns light into sugar");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn explain_waits_for_unsent_text() {
        let (mut app, mut rx) = app_with_queue(2);
        fill(&app);
        app.error_message = None;
        app.typed_text = "Hello world".into();
        app.edit_typed_text();

        app.request_explain();
        assert!(app.text_dirty);
        assert!(app.error_message.is_some());
        let queued = drain(&mut rx);
        assert!(queued.iter().all(|c| matches!(c, SessionCommand::Speak)));

        app.request_explain();
        let commands = drain(&mut rx);
        assert!(matches!(
            commands.as_slice(),
            [SessionCommand::ProvideText(text), SessionCommand::Explain] if text == "Hello world"
        ));
    }

    #[test]
    fn returning_to_text_mode_resends_typed_text() {
        let (mut app, mut rx) = app_with_queue(4);
        app.typed_text = "kept".into();

        app.select_mode(InputMode::Link);
        app.select_mode(InputMode::Text);

        let commands = drain(&mut rx);
        assert!(matches!(
            commands.as_slice(),
            [
                SessionCommand::SelectMode(InputMode::Link),
                SessionCommand::SelectMode(InputMode::Text),
                SessionCommand::ProvideText(text),
            ] if text == "kept"
        ));
    }

    #[test]
    fn pdf_path_is_not_loaded_while_busy() {
        let (mut app, mut rx) = app_with_queue(2);
        app.mode = InputMode::Pdf;
        app.pdf_path = "notes.pdf".into();
        app.busy = Some(Activity::Explaining);

        app.load_pdf_path();
        assert!(rx.try_recv().is_err());

        app.busy = None;
        app.load_pdf_path();
        assert!(matches!(rx.try_recv(), Ok(SessionCommand::LoadDocument(_))));
    }
}
