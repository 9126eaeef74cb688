//! Rolling file sink
//!
//! Events go to `stem + period + [_NNN] + extension`, e.g. `logs/app20240305.log`
//! then `logs/app20240305_001.log` once the size limit is reached. The period
//! comes from each event's local timestamp. Old files are never deleted.

use crate::core::error::{LoggerError, Result};
use crate::core::{LogEvent, Sink};
use crate::formatters::{CompactJsonFormatter, TextFormatter};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_FILE_SIZE_LIMIT_BYTES: u64 = 128_000_000;

/// How often a new file is started
///
/// # Examples
///
/// ```
/// use compact_logger::appenders::RollingInterval;
///
/// assert_eq!(RollingInterval::default(), RollingInterval::Day);
/// assert_eq!(RollingInterval::Hour.period_format(), "%Y%m%d%H");
/// assert_eq!(RollingInterval::Infinite.period_format(), "");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RollingInterval {
    /// A single file for the lifetime of the sink
    Infinite,
    Year,
    Month,
    #[default]
    Day,
    Hour,
    Minute,
}

impl RollingInterval {
    /// chrono format of the period embedded in file names
    pub fn period_format(&self) -> &'static str {
        match self {
            RollingInterval::Infinite => "",
            RollingInterval::Year => "%Y",
            RollingInterval::Month => "%Y%m",
            RollingInterval::Day => "%Y%m%d",
            RollingInterval::Hour => "%Y%m%d%H",
            RollingInterval::Minute => "%Y%m%d%H%M",
        }
    }

    /// Period for a timestamp, in the timestamp's own offset
    pub fn period(&self, timestamp: &DateTime<FixedOffset>) -> String {
        match self {
            RollingInterval::Infinite => String::new(),
            _ => timestamp.format(self.period_format()).to_string(),
        }
    }
}

impl FromStr for RollingInterval {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "infinite" => Ok(RollingInterval::Infinite),
            "year" => Ok(RollingInterval::Year),
            "month" => Ok(RollingInterval::Month),
            "day" => Ok(RollingInterval::Day),
            "hour" => Ok(RollingInterval::Hour),
            "minute" => Ok(RollingInterval::Minute),
            _ => Err(format!("Invalid rolling interval: '{}'", s)),
        }
    }
}

/// Rolling behaviour of a [`RollingFileSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingPolicy {
    pub interval: RollingInterval,
    /// `None` disables size-based rolling
    pub file_size_limit_bytes: Option<u64>,
    /// Take an exclusive advisory lock around every write
    pub shared: bool,
}

impl Default for RollingPolicy {
    fn default() -> Self {
        Self {
            interval: RollingInterval::default(),
            file_size_limit_bytes: Some(DEFAULT_FILE_SIZE_LIMIT_BYTES),
            shared: false,
        }
    }
}

impl RollingPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_interval(mut self, interval: RollingInterval) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_size_limit(mut self, limit: Option<u64>) -> Self {
        self.file_size_limit_bytes = limit;
        self
    }

    #[must_use]
    pub fn with_shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }
}

struct OpenFile {
    period: String,
    sequence: u32,
    path: PathBuf,
    writer: BufWriter<File>,
    size: u64,
    /// Set after a failed size roll; the file then grows until the period ends
    roll_blocked: bool,
}

/// File sink that starts a new file per period and per size limit
///
/// # Examples
///
/// ```no_run
/// use compact_logger::appenders::{RollingFileSink, RollingInterval, RollingPolicy};
///
/// // Daily files, rolled at the default 128 MB
/// let sink = RollingFileSink::new("logs/app.log").unwrap();
///
/// // Hourly files shared with other processes
/// let policy = RollingPolicy::new()
///     .with_interval(RollingInterval::Hour)
///     .with_shared(true);
/// let sink = RollingFileSink::with_policy("logs/app.log", policy).unwrap();
/// ```
pub struct RollingFileSink {
    base_path: PathBuf,
    directory: PathBuf,
    stem: String,
    extension: String,
    policy: RollingPolicy,
    formatter: Box<dyn TextFormatter>,
    current: Option<OpenFile>,
    buffer: Vec<u8>,
}

impl RollingFileSink {
    /// Daily compact JSON files with the default size limit
    ///
    /// # Errors
    ///
    /// Returns error if the path is invalid or its directory cannot be created
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_policy(path, RollingPolicy::default())
    }

    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RollingPolicy) -> Result<Self> {
        Self::with_formatter(path, policy, Box::new(CompactJsonFormatter::new()))
    }

    /// # Errors
    ///
    /// `InvalidArgument` for an empty path, a path without a file name or a
    /// zero size limit; an I/O error if the directory cannot be created.
    pub fn with_formatter<P: AsRef<Path>>(
        path: P,
        policy: RollingPolicy,
        formatter: Box<dyn TextFormatter>,
    ) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        if base_path.as_os_str().is_empty() {
            return Err(LoggerError::invalid_argument("path", "must not be empty"));
        }
        if policy.file_size_limit_bytes == Some(0) {
            return Err(LoggerError::invalid_argument(
                "file_size_limit_bytes",
                "must be greater than zero",
            ));
        }

        let stem = base_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| {
                LoggerError::invalid_argument("path", format!("'{}' has no file name", base_path.display()))
            })?;
        let extension = base_path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let directory = match base_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        fs::create_dir_all(&directory).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", directory.display()),
                e,
            )
        })?;

        Ok(Self {
            base_path,
            directory,
            stem,
            extension,
            policy,
            formatter,
            current: None,
            buffer: Vec::with_capacity(512),
        })
    }

    pub fn policy(&self) -> &RollingPolicy {
        &self.policy
    }

    /// Path as configured, before period and sequence are applied
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// File currently written, if any event has been emitted
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|open| open.path.as_path())
    }

    pub fn current_size(&self) -> u64 {
        self.current.as_ref().map_or(0, |open| open.size)
    }

    /// `stem + period + [_NNN] + extension`
    pub fn file_path(&self, period: &str, sequence: u32) -> PathBuf {
        let name = if sequence == 0 {
            format!("{}{}{}", self.stem, period, self.extension)
        } else {
            format!("{}{}_{:03}{}", self.stem, period, sequence, self.extension)
        };
        self.directory.join(name)
    }

    /// Highest sequence already on disk for `period`, 0 if none
    fn latest_sequence(&self, period: &str) -> u32 {
        let prefix = format!("{}{}", self.stem, period);
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(_) => return 0,
        };

        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                let middle = name
                    .strip_prefix(prefix.as_str())?
                    .strip_suffix(self.extension.as_str())?;
                if middle.is_empty() {
                    return Some(0);
                }
                let digits = middle.strip_prefix('_')?;
                if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                digits.parse().ok()
            })
            .max()
            .unwrap_or(0)
    }

    fn open_file(&self, period: String, sequence: u32) -> Result<OpenFile> {
        let path = self.file_path(&period, sequence);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::file_sink(path.display().to_string(), format!("Failed to open: {}", e))
            })?;
        let size = file
            .metadata()
            .map_err(|e| {
                LoggerError::file_sink(
                    path.display().to_string(),
                    format!("Cannot access file metadata: {}", e),
                )
            })?
            .len();

        Ok(OpenFile {
            period,
            sequence,
            path,
            writer: BufWriter::new(file),
            size,
            roll_blocked: false,
        })
    }

    /// Switch to `period`/`sequence`. The current file stays open if the new
    /// one cannot be opened.
    fn roll_to(&mut self, period: String, sequence: u32) -> Result<()> {
        if let Some(ref mut previous) = self.current {
            previous.writer.flush().map_err(|e| {
                LoggerError::file_roll(
                    previous.path.display().to_string(),
                    format!("Failed to flush before roll: {}", e),
                )
            })?;
        }

        let next = self.open_file(period, sequence)?;
        self.current = Some(next);
        Ok(())
    }

    fn size_limit_reached(&self) -> bool {
        match (&self.current, self.policy.file_size_limit_bytes) {
            (Some(open), Some(limit)) => !open.roll_blocked && open.size >= limit,
            _ => false,
        }
    }

    /// Make sure the open file matches the event's period and has room left
    fn prepare(&mut self, timestamp: &DateTime<FixedOffset>) -> Result<()> {
        let period = self.policy.interval.period(timestamp);

        let same_period = self
            .current
            .as_ref()
            .is_some_and(|open| open.period == period);
        if !same_period {
            let sequence = self.latest_sequence(&period);
            self.roll_to(period, sequence)?;
        }

        if self.size_limit_reached() {
            let (period, next) = match self.current {
                Some(ref open) => (open.period.clone(), open.sequence + 1),
                None => return Ok(()),
            };
            if let Err(e) = self.roll_to(period, next) {
                eprintln!(
                    "[LOGGER WARNING] Log file roll failed: {}. Continuing with current file until the period changes.",
                    e
                );
                if let Some(ref mut open) = self.current {
                    open.roll_blocked = true;
                }
            }
        }
        Ok(())
    }

    fn write_buffer(&mut self) -> Result<()> {
        let shared = self.policy.shared;
        let open = self
            .current
            .as_mut()
            .ok_or_else(|| LoggerError::file_sink("", "No file open"))?;
        let path = open.path.display().to_string();

        if shared {
            fs2::FileExt::lock_exclusive(open.writer.get_ref())
                .map_err(|_| LoggerError::file_lock(path.clone()))?;
            let written = open
                .writer
                .write_all(&self.buffer)
                .and_then(|()| open.writer.flush());
            let unlocked = fs2::FileExt::unlock(open.writer.get_ref());
            written.map_err(|e| {
                LoggerError::file_sink(path.clone(), format!("Failed to write event: {}", e))
            })?;
            unlocked.map_err(|_| LoggerError::file_lock(path.clone()))?;
            open.size = open
                .writer
                .get_ref()
                .metadata()
                .map(|m| m.len())
                .unwrap_or(open.size + self.buffer.len() as u64);
        } else {
            open.writer.write_all(&self.buffer).map_err(|e| {
                LoggerError::file_sink(path, format!("Failed to write event: {}", e))
            })?;
            open.size += self.buffer.len() as u64;
        }
        Ok(())
    }
}

impl Sink for RollingFileSink {
    fn name(&self) -> &str {
        "rolling_file"
    }

    fn emit(&mut self, event: &LogEvent) -> Result<()> {
        self.buffer.clear();
        self.formatter.format(event, &mut self.buffer)?;

        self.prepare(&event.timestamp)?;
        self.write_buffer()
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut open) = self.current {
            open.writer.flush().map_err(|e| {
                LoggerError::file_sink(
                    open.path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }
}

impl Drop for RollingFileSink {
    fn drop(&mut self) {
        if let Some(mut open) = self.current.take() {
            // Best effort flush - ignore errors during drop
            let _ = open.writer.flush();
        }
    }
}
