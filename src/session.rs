//! Download session lifecycle: validate, pick a folder, run yt-dlp, report.
//!
//! A session moves through `Validating -> SelectingDestination -> Invoking ->
//! Monitoring` and ends with exactly one [`SessionOutcome`]. Everything the
//! window needs to know is sent as [`SessionEvent`]s over a channel, so the
//! background task never touches UI state directly.

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use log::{info, warn};
use rfd::FileDialog;
use tokio::{runtime::Handle, sync::mpsc::UnboundedSender, task::JoinHandle};
use crate::{
    downloader::{build_args, spawn_tool, ToolConfig},
    error::{DownloadError, Result},
    model::{DownloadRequest, MediaFormat, SessionEvent, SessionOutcome, SessionPhase},
    progress::ProgressSource,
};

/// Asks the user where the file should go. `None` means they backed out.
pub trait DestinationPicker {
    fn pick(&self) -> Option<PathBuf>;
}

/// Native folder chooser
pub struct FolderDialog {
    pub title: String,
    pub start_dir: PathBuf,
}

impl DestinationPicker for FolderDialog {
    fn pick(&self) -> Option<PathBuf> {
        FileDialog::new()
            .set_title(&self.title)
            .set_directory(&self.start_dir)
            .pick_folder()
    }
}

/// Holds the single-session slot until dropped.
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Starts download sessions, one at a time.
pub struct SessionController {
    tool: ToolConfig,
    in_flight: Arc<AtomicBool>,
}

impl SessionController {
    pub fn new(tool: ToolConfig) -> Self {
        Self {
            tool,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True while a session's process has not finished
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Returns the trimmed URL, rejecting blank input.
    pub fn validate(url: &str) -> Result<&str> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DownloadError::EmptyInput);
        }
        Ok(url)
    }

    /// Validates the input, asks for a destination and launches the
    /// download on `runtime`.
    ///
    /// Returns `Ok(None)` when the user cancels the folder picker; nothing is
    /// spawned in that case and the only event sent is `Finished(Cancelled)`.
    /// The launched task reports its own outcome through `events`.
    pub fn submit(
        &self,
        url: &str,
        format: MediaFormat,
        picker: &dyn DestinationPicker,
        runtime: &Handle,
        events: UnboundedSender<SessionEvent>,
    ) -> Result<Option<JoinHandle<SessionOutcome>>> {
        emit(&events, SessionEvent::Phase(SessionPhase::Validating));
        let url = Self::validate(url)?.to_owned();
        let guard = InFlight::acquire(&self.in_flight).ok_or(DownloadError::Busy)?;

        emit(&events, SessionEvent::Phase(SessionPhase::SelectingDestination));
        let Some(destination) = picker.pick() else {
            info!("destination selection cancelled");
            drop(guard);
            emit(&events, SessionEvent::Finished(SessionOutcome::Cancelled));
            return Ok(None);
        };

        let request = DownloadRequest {
            url,
            format,
            destination,
        };
        let tool = self.tool.clone();
        Ok(Some(runtime.spawn(async move {
            let outcome = run_session(&tool, &request, &events).await;
            drop(guard);
            emit(&events, SessionEvent::Finished(outcome.clone()));
            outcome
        })))
    }
}

/// Runs one download to completion and maps the result to an outcome.
///
/// Progress starts at 0 and is forced to 100 on success. Errors never
/// escape; they become `Failed` with the error's text.
pub async fn run_session(
    tool: &ToolConfig,
    request: &DownloadRequest,
    events: &UnboundedSender<SessionEvent>,
) -> SessionOutcome {
    info!(
        "downloading {} as {} into {}",
        request.url,
        request.format.label(),
        request.destination.display()
    );
    emit(events, SessionEvent::Progress(0.0));

    match invoke(tool, request, events).await {
        Ok(()) => {
            emit(events, SessionEvent::Progress(100.0));
            info!("download of {} finished", request.url);
            SessionOutcome::Success
        }
        Err(e) => {
            match &e {
                DownloadError::ToolFailed { code } => {
                    warn!("yt-dlp exited with status {:?} for {}", code, request.url)
                }
                other => warn!("download of {} failed: {}", request.url, other),
            }
            SessionOutcome::Failed(e.to_string())
        }
    }
}

async fn invoke(
    tool: &ToolConfig,
    request: &DownloadRequest,
    events: &UnboundedSender<SessionEvent>,
) -> Result<()> {
    emit(events, SessionEvent::Phase(SessionPhase::Invoking));
    let mut process = spawn_tool(tool, &build_args(request))?;

    emit(events, SessionEvent::Phase(SessionPhase::Monitoring));
    monitor(&mut process.output, events).await;

    let status = process.wait().await?;
    if status.success() {
        Ok(())
    } else {
        Err(DownloadError::ToolFailed { code: status.code() })
    }
}

/// Forwards every progress report, in arrival order, until the source ends.
pub async fn monitor<S>(source: &mut S, events: &UnboundedSender<SessionEvent>)
where
    S: ProgressSource + ?Sized,
{
    while let Some(event) = source.next_event().await {
        emit(events, SessionEvent::Progress(event.percent));
    }
}

// The window may already be gone; there is nobody left to tell.
fn emit(events: &UnboundedSender<SessionEvent>, event: SessionEvent) {
    let _ = events.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgressState;
    use std::cell::Cell;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    struct FixedPicker {
        choice: Option<PathBuf>,
        calls: Cell<usize>,
    }

    impl FixedPicker {
        fn new(choice: Option<PathBuf>) -> Self {
            Self { choice, calls: Cell::new(0) }
        }
    }

    impl DestinationPicker for FixedPicker {
        fn pick(&self) -> Option<PathBuf> {
            self.calls.set(self.calls.get() + 1);
            self.choice.clone()
        }
    }

    fn shell(script: &str) -> ToolConfig {
        ToolConfig {
            program: "sh".into(),
            leading_args: vec!["-c".into(), script.into()],
        }
    }

    fn drain(rx: &mut UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn progress_values(events: &[SessionEvent]) -> Vec<f32> {
        events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn blank_urls_are_rejected() {
        assert!(matches!(SessionController::validate(""), Err(DownloadError::EmptyInput)));
        assert!(matches!(SessionController::validate(" \t\n"), Err(DownloadError::EmptyInput)));
        assert_eq!(SessionController::validate("  https://youtu.be/x ").unwrap(), "https://youtu.be/x");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn empty_input_never_reaches_picker_or_tool() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("spawned");
        let controller = SessionController::new(shell(&format!("touch '{}'", marker.display())));
        let picker = FixedPicker::new(Some(dir.path().to_path_buf()));
        let (tx, mut rx) = unbounded_channel();

        let result = controller.submit("   ", MediaFormat::Video, &picker, &Handle::current(), tx);

        assert!(matches!(result, Err(DownloadError::EmptyInput)));
        assert_eq!(picker.calls.get(), 0);
        assert!(!marker.exists());
        assert!(!controller.is_busy());
        assert_eq!(drain(&mut rx), vec![SessionEvent::Phase(SessionPhase::Validating)]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancelled_destination_aborts_quietly() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("spawned");
        let controller = SessionController::new(shell(&format!("touch '{}'", marker.display())));
        let picker = FixedPicker::new(None);
        let (tx, mut rx) = unbounded_channel();

        let launched = controller
            .submit("https://youtu.be/x", MediaFormat::Audio, &picker, &Handle::current(), tx)
            .unwrap();

        assert!(launched.is_none());
        assert_eq!(picker.calls.get(), 1);
        assert!(!marker.exists());
        assert!(!controller.is_busy());
        let events = drain(&mut rx);
        assert!(progress_values(&events).is_empty());
        assert_eq!(events.last(), Some(&SessionEvent::Finished(SessionOutcome::Cancelled)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn progress_lines_arrive_in_order_then_success() {
        let dir = tempfile::tempdir().unwrap();
        let controller = SessionController::new(shell(
            "echo '[download]  10.0% of 1MiB'; echo 'Merging formats'; echo '55.5%'; echo '100.0%'; exit 0",
        ));
        let picker = FixedPicker::new(Some(dir.path().to_path_buf()));
        let (tx, mut rx) = unbounded_channel();

        let task = controller
            .submit("https://youtu.be/x", MediaFormat::Video, &picker, &Handle::current(), tx)
            .unwrap()
            .unwrap();
        let outcome = task.await.unwrap();

        assert_eq!(outcome, SessionOutcome::Success);
        let events = drain(&mut rx);
        assert_eq!(progress_values(&events), vec![0.0, 10.0, 55.5, 100.0, 100.0]);
        assert_eq!(events.last(), Some(&SessionEvent::Finished(SessionOutcome::Success)));

        let mut display = ProgressState::default();
        for p in progress_values(&events) {
            display.set(p);
        }
        assert_eq!(display.percent(), 100.0);
        assert!(!controller.is_busy());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let controller = SessionController::new(shell("echo '42.0%'; exit 1"));
        let picker = FixedPicker::new(Some(dir.path().to_path_buf()));
        let (tx, mut rx) = unbounded_channel();

        let outcome = controller
            .submit("https://youtu.be/x", MediaFormat::Audio, &picker, &Handle::current(), tx)
            .unwrap()
            .unwrap()
            .await
            .unwrap();

        assert_eq!(outcome, SessionOutcome::Failed("yt-dlp error".into()));
        let events = drain(&mut rx);
        assert!(!events.contains(&SessionEvent::Finished(SessionOutcome::Success)));
        // no forced 100 after a failure
        assert_eq!(progress_values(&events), vec![0.0, 42.0]);
    }

    #[tokio::test]
    async fn spawn_failure_reports_raw_error() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ToolConfig {
            program: "definitely-not-a-real-yt-dlp-binary".into(),
            leading_args: Vec::new(),
        };
        let request = DownloadRequest {
            url: "https://youtu.be/x".into(),
            format: MediaFormat::Video,
            destination: dir.path().to_path_buf(),
        };
        let (tx, _rx) = unbounded_channel();

        match run_session(&tool, &request, &tx).await {
            SessionOutcome::Failed(reason) => {
                assert!(reason.contains("definitely-not-a-real-yt-dlp-binary"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn second_session_starts_from_zero() {
        let dir = tempfile::tempdir().unwrap();
        let controller = SessionController::new(shell("echo '73.1%'"));
        let picker = FixedPicker::new(Some(dir.path().to_path_buf()));

        for _ in 0..2 {
            let (tx, mut rx) = unbounded_channel();
            let outcome = controller
                .submit("https://youtu.be/x", MediaFormat::Video, &picker, &Handle::current(), tx)
                .unwrap()
                .unwrap()
                .await
                .unwrap();
            assert_eq!(outcome, SessionOutcome::Success);
            assert_eq!(progress_values(&drain(&mut rx)).first(), Some(&0.0));
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn only_one_session_in_flight() {
        let dir = tempfile::tempdir().unwrap();
        let controller = SessionController::new(shell("sleep 1"));
        let picker = FixedPicker::new(Some(dir.path().to_path_buf()));
        let (tx, _rx) = unbounded_channel();

        let first = controller
            .submit("https://youtu.be/a", MediaFormat::Video, &picker, &Handle::current(), tx.clone())
            .unwrap()
            .unwrap();
        assert!(controller.is_busy());

        let second = controller.submit("https://youtu.be/b", MediaFormat::Video, &picker, &Handle::current(), tx);
        assert!(matches!(second, Err(DownloadError::Busy)));
        assert_eq!(picker.calls.get(), 1);

        assert_eq!(first.await.unwrap(), SessionOutcome::Success);
        assert!(!controller.is_busy());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn interleaved_stdout_stderr_progress_never_regresses() {
        let dir = tempfile::tempdir().unwrap();
        let tool = shell(
            "i=1; while [ $i -le 99 ]; do \
             if [ $((i % 2)) -eq 1 ]; then echo \"$i.0%\"; else echo \"$i.0%\" 1>&2; fi; \
             i=$((i + 1)); done",
        );
        let request = DownloadRequest {
            url: "https://youtu.be/x".into(),
            format: MediaFormat::Video,
            destination: dir.path().to_path_buf(),
        };
        let (tx, mut rx) = unbounded_channel();

        assert_eq!(run_session(&tool, &request, &tx).await, SessionOutcome::Success);

        let mut expected = vec![0.0];
        expected.extend((1..=99).map(|i| i as f32));
        expected.push(100.0);
        assert_eq!(progress_values(&drain(&mut rx)), expected);
    }
}
