use std::path::PathBuf;

/// Output container requested from yt-dlp
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MediaFormat {
    /// Best video and audio streams merged into MP4
    #[default]
    Video,
    /// Audio-only extraction encoded to MP3
    Audio,
}

impl MediaFormat {
    /// Both choices in the order the format selector shows them
    pub const ALL: [MediaFormat; 2] = [MediaFormat::Video, MediaFormat::Audio];

    /// Label used in the format selector
    pub fn label(self) -> &'static str {
        match self {
            MediaFormat::Video => "MP4",
            MediaFormat::Audio => "MP3",
        }
    }
}

/// One validated download, fixed once the tool is spawned
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Trimmed, non-empty source URL
    pub url: String,
    /// Requested output kind
    pub format: MediaFormat,
    /// Existing folder the file is written into
    pub destination: PathBuf,
}

/// Where a session currently is in its lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Idle,
    Validating,
    SelectingDestination,
    Invoking,
    Monitoring,
}

/// Terminal result of a session, reported exactly once
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    Success,
    /// The folder picker was closed without a choice
    Cancelled,
    /// Display text of the error that ended the session
    Failed(String),
}

/// Messages sent from the background session to the window
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Phase(SessionPhase),
    /// Latest percentage in [0, 100]
    Progress(f32),
    Finished(SessionOutcome),
}

/// Latest progress value shown by the progress bar.
///
/// Only the most recent value is kept. Values are taken as-is, so a
/// percentage lower than the previous one simply replaces it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProgressState {
    percent: f32,
}

impl ProgressState {
    pub fn reset(&mut self) {
        self.percent = 0.0;
    }

    pub fn set(&mut self, percent: f32) {
        self.percent = percent;
    }

    pub fn complete(&mut self) {
        self.percent = 100.0;
    }

    pub fn percent(&self) -> f32 {
        self.percent
    }

    /// Fraction in [0, 1] for the egui progress bar
    pub fn fraction(&self) -> f32 {
        (self.percent() / 100.0).clamp(0.0, 1.0)
    }
}
