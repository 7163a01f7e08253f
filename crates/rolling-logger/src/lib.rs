//! Rolling Logger
//!
//! A `tracing` subscriber that writes to `<dir>/<app>.log`, rotates the file to
//! `<app>.log.1` once it grows past a size limit, mirrors output to stderr and
//! keeps the most recent lines in a circular buffer.
//!
//! `log` records are bridged into the same sink, so crates using the `log`
//! facade need no extra setup.

use std::collections::VecDeque;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Rotate once the active file would exceed this many bytes
pub const DEFAULT_MAX_BYTES: u64 = 1024 * 1024;

/// Number of lines kept in memory
pub const DEFAULT_BUFFER_LINES: usize = 200;

static LOGGER: OnceLock<RollingLog> = OnceLock::new();

/// Shared handle to a rolling log file and its in-memory line buffer
#[derive(Clone)]
pub struct RollingLog {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    recent: VecDeque<String>,
    capacity: usize,
    partial: String,
}

impl RollingLog {
    /// Open (or append to) `<dir>/<app_name>.log`
    pub fn open(
        dir: impl AsRef<Path>,
        app_name: &str,
        max_bytes: u64,
        capacity: usize,
    ) -> io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.log", app_name));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                path,
                file,
                written,
                max_bytes,
                recent: VecDeque::with_capacity(capacity),
                capacity,
                partial: String::new(),
            })),
        })
    }

    /// Path of the active log file
    pub fn path(&self) -> PathBuf {
        match self.inner.lock() {
            Ok(inner) => inner.path.clone(),
            Err(poisoned) => poisoned.into_inner().path.clone(),
        }
    }

    /// Most recent complete lines, oldest first
    pub fn recent(&self) -> Vec<String> {
        match self.inner.lock() {
            Ok(inner) => inner.recent.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().recent.iter().cloned().collect(),
        }
    }

    fn write_bytes(&self, buf: &[u8]) -> io::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "rolling log lock poisoned"))?;
        inner.write(buf)
    }

    fn flush(&self) -> io::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "rolling log lock poisoned"))?;
        inner.file.flush()
    }
}

impl Inner {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;

        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(pos) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=pos).collect();
            self.push_line(line.trim_end().to_string());
        }
        Ok(())
    }

    fn push_line(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.recent.len() == self.capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(line);
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let rotated = self.path.with_extension("log.1");
        if rotated.exists() {
            fs::remove_file(&rotated)?;
        }
        fs::rename(&self.path, &rotated)?;
        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

/// `io::Write` adapter handed out to the fmt layer
pub struct RollingWriter(RollingLog);

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingLog {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RollingWriter(self.clone())
    }
}

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Install the global subscriber.
///
/// The filter comes from `<APP_NAME>_LOG` (e.g. `KOLLEKTIV_LOG=debug`) and
/// defaults to `info`.
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<(), String> {
    let log = RollingLog::open(log_dir, app_name, DEFAULT_MAX_BYTES, DEFAULT_BUFFER_LINES)
        .map_err(|e| format!("Failed to open log file: {}", e))?;

    let env_var = format!("{}_LOG", app_name.to_uppercase());
    let filter = EnvFilter::try_from_env(&env_var).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(LocalTime)
                .with_ansi(false)
                .with_writer(log.clone()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(LocalTime)
                .with_writer(io::stderr),
        )
        .try_init()
        .map_err(|e| format!("Failed to install subscriber: {}", e))?;

    LOGGER
        .set(log)
        .map_err(|_| "Logger already initialized".to_string())
}

/// Log an info line through the installed logger
pub fn info(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    log::info!(target: "rolling_logger", "{}", msg);
    Ok(())
}

/// Log an error line through the installed logger
pub fn error(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    log::error!(target: "rolling_logger", "{}", msg);
    Ok(())
}

/// Recent lines from the installed logger (empty before `init_logger`)
pub fn recent_lines() -> Vec<String> {
    LOGGER.get().map(RollingLog::recent).unwrap_or_default()
}

fn ensure_initialized() -> Result<(), String> {
    if LOGGER.get().is_some() {
        Ok(())
    } else {
        Err("Logger not initialized".to_string())
    }
}
