//! Structured JSONL logging for lookup initialization.
//!
//! Provides:
//! - [`LogEntry`]: one JSON object per line with required `timestamp`,
//!   `trace_id`, `level`, `event` and optional context fields.
//! - [`LogEmitter`]: writes entries to any `Write` sink, numbering trace ids.
//! - [`init`] / [`emit`]: process-wide sink, configured from the first
//!   lookup configuration it sees (`SYSLOOKUP_LOG` for the global lookup).
//!
//! Only initialization is logged. `find` stays silent.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::{LogTarget, LookupConfig};

/// Severity, ordered from most to least verbose.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse from string (case-insensitive); unknown values fall back to `Info`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" | "verbose" => Self::Trace,
            "debug" => Self::Debug,
            "warn" | "warning" => Self::Warn,
            "error" | "err" => Self::Error,
            _ => Self::Info,
        }
    }
}

/// Canonical structured log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    /// Entry with required fields only; the emitter assigns `trace_id`.
    #[must_use]
    pub fn new(level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: String::new(),
            level,
            event: event.into(),
            platform: None,
            runtime: None,
            library: None,
            error: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    #[must_use]
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = Some(runtime.into());
        self
    }

    #[must_use]
    pub fn with_library(mut self, path: &Path) -> Self {
        self.library = Some(path.display().to_string());
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Serialize to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Writes JSONL entries to a sink.
pub struct LogEmitter {
    writer: Box<dyn Write + Send>,
    seq: u64,
    run_id: String,
}

impl LogEmitter {
    #[must_use]
    pub fn to_writer(writer: impl Write + Send + 'static, run_id: impl Into<String>) -> Self {
        Self {
            writer: Box::new(writer),
            seq: 0,
            run_id: run_id.into(),
        }
    }

    pub fn to_file(path: &Path, run_id: impl Into<String>) -> io::Result<Self> {
        let file = File::options().create(true).append(true).open(path)?;
        Ok(Self::to_writer(BufWriter::new(file), run_id))
    }

    /// Open the emitter described by `target`, or `None` when logging is off.
    pub fn for_target(target: &LogTarget, run_id: impl Into<String>) -> io::Result<Option<Self>> {
        Ok(match target {
            LogTarget::Off => None,
            LogTarget::Stderr => Some(Self::to_writer(io::stderr(), run_id)),
            LogTarget::Stdout => Some(Self::to_writer(io::stdout(), run_id)),
            LogTarget::File(path) => Some(Self::to_file(path, run_id)?),
        })
    }

    fn next_trace_id(&mut self) -> String {
        self.seq += 1;
        format!("syslookup::{}::{:03}", self.run_id, self.seq)
    }

    /// Write one entry, assigning a trace id if it has none.
    pub fn emit_entry(&mut self, mut entry: LogEntry) -> io::Result<()> {
        if entry.trace_id.is_empty() {
            entry.trace_id = self.next_trace_id();
        }
        let line = entry.to_jsonl().map_err(io::Error::other)?;
        writeln!(self.writer, "{line}")?;
        self.writer.flush()
    }
}

struct Sink {
    emitter: Option<LogEmitter>,
    min_level: LogLevel,
}

impl Sink {
    fn from_config(config: &LookupConfig) -> Self {
        let run_id = std::process::id().to_string();
        // A log target that cannot be opened silences logging rather than
        // failing the lookup.
        let emitter = LogEmitter::for_target(&config.log_target, run_id)
            .ok()
            .flatten();
        Self {
            emitter,
            min_level: config.log_level,
        }
    }
}

static SINK: OnceLock<Mutex<Sink>> = OnceLock::new();

fn sink() -> &'static Mutex<Sink> {
    SINK.get_or_init(|| Mutex::new(Sink::from_config(LookupConfig::process())))
}

/// Set up the process-wide sink from `config` unless it already exists.
///
/// The first configuration wins; later calls leave the sink untouched. A sink
/// that is first touched by [`emit`] follows the process environment.
pub fn init(config: &LookupConfig) {
    SINK.get_or_init(|| Mutex::new(Sink::from_config(config)));
}

/// Replace the process-wide sink. `None` turns logging off.
pub fn install(emitter: Option<LogEmitter>, min_level: LogLevel) {
    let mut sink = sink().lock();
    sink.emitter = emitter;
    sink.min_level = min_level;
}

/// Write `entry` to the process-wide sink if its level passes the filter.
///
/// Write failures are dropped.
pub fn emit(entry: LogEntry) {
    let mut sink = sink().lock();
    if entry.level < sink.min_level {
        return;
    }
    if let Some(emitter) = sink.emitter.as_mut() {
        let _ = emitter.emit_entry(entry);
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
fn now_utc() -> String {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format_utc(elapsed.as_secs(), elapsed.subsec_millis())
}

fn format_utc(secs: u64, millis: u32) -> String {
    let days = secs / 86_400;
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{millis:03}Z",
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60,
    )
}

/// Days since 1970-01-01 to a proleptic Gregorian (year, month, day).
fn civil_from_days(days: u64) -> (u64, u64, u64) {
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z % 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);
    (year, month, day)
}
