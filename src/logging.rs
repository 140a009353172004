//! Logging setup: `env_logger` writing to the log file and stderr at once

use env_logger::{Builder, Env, Target, WriteStyle};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Log file appended to across runs, relative to the working directory
pub const LOG_FILE: &str = "log/image_matcher.log";

/// Forwards every write to stderr and, when open, the log file
pub struct TeeWriter {
    file: Option<File>,
}

impl TeeWriter {
    pub fn new(file: Option<File>) -> Self {
        Self { file }
    }
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // stderr is best effort, the file is what gets inspected later
        let _ = io::stderr().write_all(buf);
        if let Some(file) = self.file.as_mut() {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = io::stderr().flush();
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Keeps logging alive for the process; flushes on drop
pub struct LogHandle(());

impl Drop for LogHandle {
    fn drop(&mut self) {
        log::logger().flush();
    }
}

/// Open (or create) the log file in append mode, creating its directory
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global logger. `RUST_LOG` overrides the default `info` level.
pub fn init(path: &Path) -> LogHandle {
    let (file, open_error) = match open_log_file(path) {
        Ok(f) => (Some(f), None),
        Err(e) => (None, Some(e)),
    };

    let installed = Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                buf.timestamp_millis(),
                record.level(),
                record.args()
            )
        })
        .write_style(WriteStyle::Never)
        .target(Target::Pipe(Box::new(TeeWriter::new(file))))
        .try_init();

    if let Err(e) = installed {
        eprintln!("Logger already installed: {e}");
    }
    if let Some(e) = open_error {
        log::warn!("Cannot open log file {}: {e}; logging to stderr only", path.display());
    }

    LogHandle(())
}
