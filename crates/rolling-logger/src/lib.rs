//! Rolling file logger with an in-memory circular buffer.
//!
//! `init_logger` installs a `tracing-subscriber` fmt layer writing to
//! `<log_dir>/<app_name>.log`. When the file grows past the size limit it is
//! archived under a timestamped name and a fresh file is started; only the
//! newest archives are kept. The most recent formatted lines are also held in
//! memory for an in-app log viewer.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

static WRITER: OnceLock<RollingWriter> = OnceLock::new();

#[derive(Debug)]
pub enum LoggerError {
    Io(io::Error),
    AlreadyInitialized(String),
    NotInitialized,
}

impl std::fmt::Display for LoggerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggerError::Io(e) => write!(f, "Log file error: {}", e),
            LoggerError::AlreadyInitialized(msg) => write!(f, "Logger already initialized: {}", msg),
            LoggerError::NotInitialized => write!(f, "Logger not initialized"),
        }
    }
}

impl std::error::Error for LoggerError {}

impl From<io::Error> for LoggerError {
    fn from(e: io::Error) -> Self {
        LoggerError::Io(e)
    }
}

/// Size and retention limits
#[derive(Debug, Clone, Copy)]
pub struct RollingConfig {
    pub max_file_bytes: u64,
    pub max_archives: usize,
    pub buffer_lines: usize,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 1024 * 1024,
            max_archives: 5,
            buffer_lines: 500,
        }
    }
}

struct RollingFile {
    dir: PathBuf,
    app_name: String,
    config: RollingConfig,
    file: File,
    written: u64,
    recent: VecDeque<String>,
    partial: String,
    rotations: u32,
}

impl RollingFile {
    fn open(dir: &Path, app_name: &str, config: RollingConfig) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.log", app_name));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            dir: dir.to_path_buf(),
            app_name: app_name.to_string(),
            config,
            file,
            written,
            recent: VecDeque::with_capacity(config.buffer_lines),
            partial: String::new(),
            rotations: 0,
        })
    }

    fn current_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.app_name))
    }

    fn write_record(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.written > 0 && self.written + buf.len() as u64 > self.config.max_file_bytes {
            self.rotate()?;
        }
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;
        self.remember(buf);
        Ok(())
    }

    fn remember(&mut self, buf: &[u8]) {
        if self.config.buffer_lines == 0 {
            return;
        }
        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(end) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=end).collect();
            if self.recent.len() == self.config.buffer_lines {
                self.recent.pop_front();
            }
            self.recent.push_back(line.trim_end().to_string());
        }
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f").to_string();
        let archive = self
            .dir
            .join(format!("{}-{}-{:04}.log", self.app_name, stamp, self.rotations));
        self.rotations = self.rotations.wrapping_add(1);
        fs::rename(self.current_path(), &archive)?;
        self.file = OpenOptions::new().create(true).append(true).open(self.current_path())?;
        self.written = 0;
        self.prune()
    }

    fn prune(&self) -> io::Result<()> {
        let mut archives = self.archives()?;
        if archives.len() <= self.config.max_archives {
            return Ok(());
        }
        let excess = archives.len() - self.config.max_archives;
        for old in archives.drain(..excess) {
            fs::remove_file(old)?;
        }
        Ok(())
    }

    /// Archived files, oldest first
    fn archives(&self) -> io::Result<Vec<PathBuf>> {
        let prefix = format!("{}-", self.app_name);
        let mut found: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix) && n.ends_with(".log"))
            })
            .collect();
        found.sort();
        Ok(found)
    }
}

/// Shared handle used as the subscriber's writer
#[derive(Clone)]
pub struct RollingWriter {
    inner: Arc<Mutex<RollingFile>>,
}

impl RollingWriter {
    pub fn open(dir: impl AsRef<Path>, app_name: &str, config: RollingConfig) -> io::Result<Self> {
        let file = RollingFile::open(dir.as_ref(), app_name, config)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(file)),
        })
    }

    /// Most recent lines, oldest first
    pub fn recent_lines(&self) -> Vec<String> {
        match self.inner.lock() {
            Ok(guard) => guard.recent.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().recent.iter().cloned().collect(),
        }
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.inner.lock().ok().map(|g| g.current_path())
    }

    pub fn archives(&self) -> io::Result<Vec<PathBuf>> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;
        guard.archives()
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;
        guard.write_record(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;
        guard.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install the global subscriber with default limits.
/// Filtering follows `RUST_LOG`, defaulting to `info`.
pub fn init_logger(log_dir: impl AsRef<Path>, app_name: &str) -> Result<(), LoggerError> {
    init_logger_with(log_dir, app_name, RollingConfig::default())
}

pub fn init_logger_with(
    log_dir: impl AsRef<Path>,
    app_name: &str,
    config: RollingConfig,
) -> Result<(), LoggerError> {
    if WRITER.get().is_some() {
        return Err(LoggerError::AlreadyInitialized(app_name.to_string()));
    }
    let writer = RollingWriter::open(log_dir, app_name, config)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(writer.clone())
            .with_ansi(false)
            .with_target(true),
    );

    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Info)
                .with_tag(app_name.to_string()),
        );
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))?;
    }

    #[cfg(not(target_os = "android"))]
    {
        use tracing_subscriber::util::SubscriberInitExt;
        subscriber
            .try_init()
            .map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))?;
    }

    let _ = WRITER.set(writer);
    tracing::info!(app = app_name, "logger initialized");
    Ok(())
}

/// Recent lines from the global logger, empty before init
pub fn recent_lines() -> Vec<String> {
    WRITER.get().map(RollingWriter::recent_lines).unwrap_or_default()
}

pub fn log_path() -> Option<PathBuf> {
    WRITER.get().and_then(RollingWriter::log_path)
}

pub fn info(msg: &str) -> Result<(), LoggerError> {
    WRITER.get().ok_or(LoggerError::NotInitialized)?;
    log::info!("{}", msg);
    Ok(())
}

pub fn warn(msg: &str) -> Result<(), LoggerError> {
    WRITER.get().ok_or(LoggerError::NotInitialized)?;
    log::warn!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), LoggerError> {
    WRITER.get().ok_or(LoggerError::NotInitialized)?;
    log::error!("{}", msg);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> RollingConfig {
        RollingConfig {
            max_file_bytes: 64,
            max_archives: 2,
            buffer_lines: 3,
        }
    }

    #[test]
    fn test_writes_to_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RollingWriter::open(dir.path(), "Shop", RollingConfig::default()).unwrap();
        writer.write_all(b"hello\n").unwrap();
        writer.flush().unwrap();

        let content = fs::read_to_string(dir.path().join("Shop.log")).unwrap();
        assert_eq!(content, "hello\n");
    }

    #[test]
    fn test_circular_buffer_keeps_latest_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RollingWriter::open(dir.path(), "Shop", small()).unwrap();
        for i in 0..5 {
            writer.write_all(format!("line {}\n", i).as_bytes()).unwrap();
        }
        assert_eq!(writer.recent_lines(), vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_partial_lines_are_joined() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RollingWriter::open(dir.path(), "Shop", small()).unwrap();
        writer.write_all(b"par").unwrap();
        writer.write_all(b"tial\n").unwrap();
        assert_eq!(writer.recent_lines(), vec!["partial"]);
    }

    #[test]
    fn test_rotation_limits_archives() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RollingWriter::open(dir.path(), "Shop", small()).unwrap();
        let record = [b'x'; 40];
        for _ in 0..6 {
            writer.write_all(&record).unwrap();
        }

        let archives = writer.archives().unwrap();
        assert_eq!(archives.len(), 2);
        let current = fs::metadata(dir.path().join("Shop.log")).unwrap().len();
        assert!(current <= 64);
    }

    #[test]
    fn test_helpers_require_init() {
        if WRITER.get().is_none() {
            assert!(matches!(info("early"), Err(LoggerError::NotInitialized)));
        }
    }
}
