use async_trait::async_trait;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::mpsc::UnboundedReceiver;

/// `42.7%`: one to three integer digits, exactly one fractional digit.
static PERCENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,3}\.\d)%").expect("valid progress pattern"));

/// Extracts the first percentage found in a line of yt-dlp output.
///
/// The value is not clamped, so whatever the tool prints is passed on.
pub fn parse_progress(line: &str) -> Option<f32> {
    let caps = PERCENT.captures(line)?;
    caps.get(1)?.as_str().parse().ok()
}

/// A single progress report taken from the tool
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressEvent {
    pub percent: f32,
}

/// Lazy, finite sequence of progress reports for one running download.
///
/// Returns `None` once the underlying output is exhausted.
#[async_trait]
pub trait ProgressSource: Send {
    async fn next_event(&mut self) -> Option<ProgressEvent>;
}

/// Scrapes percentages out of the merged text output of the tool.
pub struct ScrapedOutput {
    lines: UnboundedReceiver<String>,
}

impl ScrapedOutput {
    pub fn new(lines: UnboundedReceiver<String>) -> Self {
        Self { lines }
    }
}

#[async_trait]
impl ProgressSource for ScrapedOutput {
    async fn next_event(&mut self) -> Option<ProgressEvent> {
        loop {
            let line = self.lines.recv().await?;
            debug!("yt-dlp> {}", line);
            if let Some(percent) = parse_progress(&line) {
                return Some(ProgressEvent { percent });
            }
        }
    }
}
