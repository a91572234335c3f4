use std::{
    fs,
    path::{Path, PathBuf},
};
use log::debug;
use crate::{downloader::ToolConfig, i18n::Language};

/// Environment variable overriding the yt-dlp executable
pub const TOOL_ENV: &str = "YOUDOWN_YTDLP";

/// Startup settings, read once. Nothing is ever written back.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub tool: ToolConfig,
    pub language: Language,
    /// Folder the destination picker opens in
    pub start_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut tool = ToolConfig::default();
        if let Ok(program) = std::env::var(TOOL_ENV) {
            if !program.trim().is_empty() {
                tool.program = program;
            }
        }
        let config = Self {
            tool,
            language: Language::detect(),
            start_dir: default_start_dir(),
        };
        debug!("{:?}", config);
        config
    }
}

/// Desktop folder when the user has one configured, else home, else `.`
pub fn default_start_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => start_dir_in(&home),
        None => PathBuf::from("."),
    }
}

/// Desktop folder listed in `<home>/.config/user-dirs.dirs`, else `home`
pub fn start_dir_in(home: &Path) -> PathBuf {
    let user_dirs = home.join(".config").join("user-dirs.dirs");
    fs::read_to_string(&user_dirs)
        .ok()
        .and_then(|contents| desktop_from_user_dirs(&contents, home))
        .unwrap_or_else(|| home.to_path_buf())
}

/// Reads `XDG_DESKTOP_DIR` out of a `user-dirs.dirs` file.
///
/// Lines look like `XDG_DESKTOP_DIR="$HOME/Desktop"`.
pub fn desktop_from_user_dirs(contents: &str, home: &Path) -> Option<PathBuf> {
    let line = contents
        .lines()
        .find(|line| line.starts_with("XDG_DESKTOP_DIR"))?;
    let (_, value) = line.split_once('=')?;
    let value = value
        .trim()
        .trim_matches('"')
        .replace("$HOME", &home.to_string_lossy());
    if value.is_empty() {
        return None;
    }
    Some(PathBuf::from(value))
}
