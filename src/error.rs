use thiserror::Error;

pub type Result<T> = std::result::Result<T, DownloadError>;

/// Everything that can stop a download session before it reports success.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("No URL was given")]
    EmptyInput,

    #[error("A download is already running")]
    Busy,

    #[error("Could not start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The tool's own diagnostics are not inspected; only the status matters.
    #[error("yt-dlp error")]
    ToolFailed { code: Option<i32> },
}
