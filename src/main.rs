//! YouDown: a small window around yt-dlp for saving a video as MP4 or MP3

// Startup settings (tool path, language, default folder)
mod config;
// yt-dlp argument building and process spawning
mod downloader;
// Error taxonomy
mod error;
// Translation tables and locale detection
mod i18n;
// Requests, progress and session messages
mod model;
// Progress parsing from tool output
mod progress;
// Single-download lifecycle
mod session;

use config::AppConfig;
use error::DownloadError;
use i18n::Strings;
use model::{MediaFormat, ProgressState, SessionEvent, SessionOutcome, SessionPhase};
use session::{FolderDialog, SessionController};

use eframe::{egui, App, Frame};
use egui::{Color32, RichText, Visuals};
use log::{debug, error, info};
use once_cell::sync::OnceCell;
use rfd::{MessageButtons, MessageDialog, MessageLevel};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tokio::{
    runtime::Runtime,
    sync::mpsc::{unbounded_channel, UnboundedReceiver},
};

const ACCENT: Color32 = Color32::from_rgb(0xab, 0x7a, 0xb5);
const BAR: Color32 = Color32::from_rgb(0x7b, 0xd8, 0x8f);
const ICON_PATH: &str = "/usr/share/icons/youdown.png";

// Global Tokio runtime; every download session runs on it
static RUNTIME: OnceCell<Arc<Runtime>> = OnceCell::new();

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let rt = Arc::new(Runtime::new().expect("failed to start tokio runtime"));
    let _ = RUNTIME.set(rt);

    let config = AppConfig::from_env();
    info!(
        "starting with {} ({:?}), folders from {}",
        config.tool.program,
        config.language,
        config.start_dir.display()
    );
    let title = config.language.strings().title;

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size([480.0, 300.0])
        .with_resizable(false);
    match load_icon(Path::new(ICON_PATH)) {
        Some(icon) => viewport = viewport.with_icon(icon),
        None => debug!("no window icon at {}", ICON_PATH),
    }
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        title,
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(Visuals::dark());
            Box::new(YouDownApp::new(config))
        }),
    )
}

/// Decodes the installed icon; a missing or unreadable file just means no icon.
fn load_icon(path: &Path) -> Option<egui::viewport::IconData> {
    let img = image::open(path).ok()?.to_rgba8();
    let (width, height) = img.dimensions();
    Some(egui::viewport::IconData {
        rgba: img.into_raw(),
        width,
        height,
    })
}

/// Window state. Only the UI thread touches it; the running session talks
/// to it through `events`.
struct YouDownApp {
    /// Localized text
    t: &'static Strings,
    /// Folder the picker opens in
    start_dir: PathBuf,
    controller: SessionController,
    url_input: String,
    format: MediaFormat,
    progress: ProgressState,
    phase: SessionPhase,
    status: String,
    /// Receiver for the session in flight, if any
    events: Option<UnboundedReceiver<SessionEvent>>,
}

impl YouDownApp {
    fn new(config: AppConfig) -> Self {
        Self {
            t: config.language.strings(),
            start_dir: config.start_dir,
            controller: SessionController::new(config.tool),
            url_input: String::new(),
            format: MediaFormat::default(),
            progress: ProgressState::default(),
            phase: SessionPhase::Idle,
            status: String::new(),
            events: None,
        }
    }

    fn start_download(&mut self) {
        let Some(runtime) = RUNTIME.get() else {
            error!("runtime not initialised");
            return;
        };
        let picker = FolderDialog {
            title: self.t.choose_folder.to_owned(),
            start_dir: self.start_dir.clone(),
        };
        let (tx, rx) = unbounded_channel();

        match self
            .controller
            .submit(&self.url_input, self.format, &picker, runtime.handle(), tx)
        {
            Ok(Some(_task)) => {
                self.progress.reset();
                self.events = Some(rx);
            }
            // picker closed, nothing to report
            Ok(None) => {}
            Err(DownloadError::EmptyInput) => alert(MessageLevel::Error, self.t.title, self.t.error),
            Err(DownloadError::Busy) => info!("ignoring download request while busy"),
            Err(e) => alert(
                MessageLevel::Error,
                self.t.title,
                &format!("{}\n{}", self.t.error, e),
            ),
        }
    }

    fn drain_events(&mut self) {
        let Some(rx) = self.events.as_mut() else {
            return;
        };
        let mut pending = Vec::new();
        while let Ok(event) = rx.try_recv() {
            pending.push(event);
        }
        for event in pending {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Phase(phase) => {
                self.phase = phase;
                if phase == SessionPhase::Invoking {
                    self.status = self.t.downloading.to_owned();
                }
            }
            SessionEvent::Progress(percent) => self.progress.set(percent),
            SessionEvent::Finished(outcome) => {
                self.phase = SessionPhase::Idle;
                self.events = None;
                match outcome {
                    SessionOutcome::Success => {
                        self.progress.complete();
                        self.status = self.t.success.to_owned();
                        alert(MessageLevel::Info, self.t.title, self.t.success);
                    }
                    SessionOutcome::Cancelled => {}
                    SessionOutcome::Failed(reason) => {
                        self.status = self.t.error.to_owned();
                        alert(
                            MessageLevel::Error,
                            self.t.title,
                            &format!("{}\n{}", self.t.error, reason),
                        );
                    }
                }
            }
        }
    }
}

/// Modal message box
fn alert(level: MessageLevel, title: &str, text: &str) {
    let _ = MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(text)
        .set_buttons(MessageButtons::Ok)
        .show();
}

impl App for YouDownApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        // 1️⃣ Apply whatever the running session reported since last frame
        self.drain_events();

        // 2️⃣ Inputs, progress and status
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(RichText::new(self.t.title).strong());
                ui.label(RichText::new(self.t.footer).small().color(ACCENT));
                ui.add_space(8.0);

                ui.label(self.t.url_label);
                ui.add(egui::TextEdit::singleline(&mut self.url_input).desired_width(420.0));

                ui.label(self.t.format_label);
                egui::ComboBox::from_id_source("format")
                    .selected_text(self.format.label())
                    .width(80.0)
                    .show_ui(ui, |ui| {
                        for f in MediaFormat::ALL {
                            ui.selectable_value(&mut self.format, f, f.label());
                        }
                    });

                ui.add_space(8.0);
                ui.add(
                    egui::ProgressBar::new(self.progress.fraction())
                        .desired_width(360.0)
                        .fill(BAR),
                );
                ui.add_space(8.0);

                let idle = self.phase == SessionPhase::Idle
                    && self.events.is_none()
                    && !self.controller.is_busy();
                if ui
                    .add_enabled(idle, egui::Button::new(self.t.download_button))
                    .clicked()
                {
                    self.start_download();
                }

                ui.label(RichText::new(&self.status).color(ACCENT));
            });
        });

        // Poll for progress while something is running
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
