//! Structured logging for zwogen
//!
//! Diagnostics always go to stderr: `zwogen generate --dry-run` prints the
//! rendered workout on stdout and that stream must stay clean. A JSON copy can
//! also be written to a log file, optionally rotated daily.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Only events from this crate pass the configured filter
const CRATE_TARGET: &str = "zwogen";

const DEFAULT_LOG_FILE: &str = "zwogen.log";

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// `[logging]` section of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Base level before `-v` flags are applied
    pub level: LogLevel,

    /// Layout of stderr output
    pub format: LogFormat,

    /// Also append JSON logs here
    pub file_path: Option<PathBuf>,

    /// Roll `file_path` over once a day
    pub rotation: bool,

    /// Log span enter/close events
    pub include_spans: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Pretty,
            file_path: None,
            rotation: true,
            include_spans: false,
        }
    }
}

impl LogConfig {
    /// `EnvFilter` directive for the configured level, e.g. `zwogen=info`
    pub fn filter_directive(&self) -> String {
        format!("{}={}", CRATE_TARGET, self.level.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const ORDER: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Raise the level by one step per `-v` flag, saturating at trace
    pub fn raised_by(self, verbosity: u8) -> LogLevel {
        let current = Self::ORDER.iter().position(|l| *l == self).unwrap_or(1);
        let raised = (current + verbosity as usize).min(Self::ORDER.len() - 1);
        Self::ORDER[raised]
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warning" => Ok(LogLevel::Warn),
            lower => Self::ORDER
                .into_iter()
                .find(|level| level.as_str() == lower)
                .ok_or_else(|| format!("Invalid log level: {}", s)),
        }
    }
}

/// Layout of stderr output (`--log-format`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Invalid log format: {} (expected pretty, json or compact)", s)),
        }
    }
}

/// Formatting layer writing to `writer`
fn format_layer<S, W>(format: LogFormat, include_spans: bool, writer: W) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_line_number(true)
            .with_span_events(if include_spans {
                FmtSpan::ENTER | FmtSpan::CLOSE
            } else {
                FmtSpan::NONE
            })
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_current_span(include_spans)
            .with_span_list(include_spans)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(writer)
            .with_target(true)
            .boxed(),
    }
}

/// Daily-rolling appender or a plain append-only file
fn file_writer(path: &Path, rotation: bool) -> anyhow::Result<BoxMakeWriter> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    if rotation {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(DEFAULT_LOG_FILE);
        return Ok(BoxMakeWriter::new(tracing_appender::rolling::daily(dir, file_name)));
    }

    let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BoxMakeWriter::new(Mutex::new(file)))
}

/// Install the global subscriber
///
/// `RUST_LOG` overrides the configured level when set.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.filter_directive()));

    let file_layer = match &config.file_path {
        Some(path) => Some(format_layer(
            LogFormat::Json,
            config.include_spans,
            file_writer(path, config.rotation)?,
        )),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(format_layer(config.format, config.include_spans, std::io::stderr))
        .with(file_layer)
        .try_init()?;

    tracing::debug!(
        level = config.level.as_str(),
        format = ?config.format,
        file = ?config.file_path,
        "Logging initialized"
    );

    Ok(())
}
