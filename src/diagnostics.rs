use chrono::Local;
use log::{log, Level, LevelFilter};
use std::fmt::Display;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::fs::write;

/// Format used for the timestamp prefix of every log line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Name of the file buffered log lines are flushed to when a quiet run fails
pub const DIAGNOSTIC_FILE: &str = "error.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// Messages are written to the console as soon as they are recorded
    Verbose,
    /// Messages are kept in memory until the end of the run
    Quiet,
}

/// Log for a single run. In verbose mode messages are passed straight
/// through to the logger, in quiet mode they are buffered so they can
/// be written out if the run fails
#[derive(Debug)]
pub struct RunLog {
    mode: LogMode,
    lines: Vec<String>,
}

impl RunLog {
    pub fn new(mode: LogMode) -> Self {
        Self {
            mode,
            lines: Vec::new(),
        }
    }

    pub fn mode(&self) -> LogMode {
        self.mode
    }

    /// The buffered lines, always empty in verbose mode
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn record(&mut self, level: Level, message: impl Display) {
        match self.mode {
            LogMode::Verbose => log!(level, "{message}"),
            LogMode::Quiet => self.lines.push(timestamped(message)),
        }
    }

    pub fn info(&mut self, message: impl Display) {
        self.record(Level::Info, message)
    }

    pub fn warn(&mut self, message: impl Display) {
        self.record(Level::Warn, message)
    }

    pub fn error(&mut self, message: impl Display) {
        self.record(Level::Error, message)
    }
}

/// Prefixes the message with the current local time
pub fn timestamped(message: impl Display) -> String {
    format!("[{}] {}", Local::now().format(TIMESTAMP_FORMAT), message)
}

/// Sets up the console logger. Verbose runs log at info level, quiet
/// runs only let warnings from outside the run log through. `RUST_LOG`
/// overrides both
pub fn init_logger(mode: LogMode) {
    let level = match mode {
        LogMode::Verbose => LevelFilter::Info,
        LogMode::Quiet => LevelFilter::Warn,
    };
    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "{}", timestamped(record.args())))
        .try_init()
        .ok();
}

/// Completes the run log. When a quiet run failed the buffered lines
/// are written to the diagnostic file inside `root_path` and its path
/// is returned. Nothing is ever written for verbose runs
pub async fn finalize(log: &RunLog, succeeded: bool, root_path: &Path) -> io::Result<Option<PathBuf>> {
    if succeeded || log.mode() == LogMode::Verbose {
        return Ok(None);
    }
    let path = root_path.join(DIAGNOSTIC_FILE);
    let mut contents = log.lines().join("\n");
    contents.push('\n');
    write(&path, contents).await?;
    Ok(Some(path))
}
