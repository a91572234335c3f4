use std::{
    ffi::OsString,
    io::{self, BufRead, BufReader, PipeReader},
    process::{ExitStatus, Stdio},
};
use log::{info, warn};
use tokio::{
    process::{Child, Command},
    sync::mpsc::{unbounded_channel, UnboundedSender},
};
use crate::{
    error::{DownloadError, Result},
    model::{DownloadRequest, MediaFormat},
    progress::ScrapedOutput,
};

/// Default executable name looked up on PATH
pub fn default_program() -> &'static str {
    if cfg!(target_os = "windows") { "yt-dlp.exe" } else { "yt-dlp" }
}

/// How the external downloader is launched
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolConfig {
    /// Executable name or path
    pub program: String,
    /// Arguments placed before the generated ones (wrappers such as `python -m yt_dlp`)
    pub leading_args: Vec<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: default_program().to_owned(),
            leading_args: Vec::new(),
        }
    }
}

/// Builds the yt-dlp arguments for a request.
///
/// Output lands in the destination folder as `<title>.<ext>`.
pub fn build_args(request: &DownloadRequest) -> Vec<OsString> {
    let stream_args: &[&str] = match request.format {
        MediaFormat::Video => &["-f", "bestvideo+bestaudio", "--merge-output-format", "mp4"],
        MediaFormat::Audio => &["--extract-audio", "--audio-format", "mp3"],
    };

    let mut args: Vec<OsString> = vec!["--newline".into()];
    args.extend(stream_args.iter().map(OsString::from));
    args.push("-o".into());
    args.push(request.destination.join("%(title)s.%(ext)s").into_os_string());
    args.push(request.url.as_str().into());
    args
}

/// A running tool with its stdout and stderr merged into one line stream
pub struct ToolProcess {
    child: Child,
    pub output: ScrapedOutput,
}

impl ToolProcess {
    /// Waits for the process to exit. Call after the output is drained.
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        Ok(self.child.wait().await?)
    }
}

/// Spawns the tool with stdout and stderr sharing one pipe, so lines are
/// read back in the order the tool wrote them. The stream ends once every
/// write end has closed.
pub fn spawn_tool(tool: &ToolConfig, args: &[OsString]) -> Result<ToolProcess> {
    info!("running {} {:?}", tool.program, args);
    let (reader, writer) = io::pipe()?;
    let child = Command::new(&tool.program)
        .args(&tool.leading_args)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(writer.try_clone()?))
        .stderr(Stdio::from(writer))
        .spawn()
        .map_err(|source| DownloadError::Spawn {
            program: tool.program.clone(),
            source,
        })?;
    // the parent's write ends went away with the Command above

    let (tx, rx) = unbounded_channel();
    forward_lines(reader, tx);

    Ok(ToolProcess {
        child,
        output: ScrapedOutput::new(rx),
    })
}

fn forward_lines(pipe: PipeReader, tx: UnboundedSender<String>) {
    tokio::task::spawn_blocking(move || {
        let mut reader = BufReader::new(pipe);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(['\r', '\n']).to_owned();
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("reading tool output failed: {}", e);
                    break;
                }
            }
        }
    });
}
