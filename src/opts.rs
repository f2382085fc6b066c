use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::level_filters::LevelFilter;

use crate::Error;
use crate::caption_format::CaptionFormat;

/// Options that control a harvesting run.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI maps user input into this type so that batch jobs and tests can construct
/// a run programmatically, and nothing depends on process-wide state.
#[derive(Debug, Clone)]
pub struct Opts {
    /// Payload shape for every record in the run.
    pub caption_format: CaptionFormat,

    /// Preferred caption language (e.g. `"en"`). Not validated; providers fall back
    /// to whatever track exists.
    pub language: Option<String>,

    /// How many videos to process at once. Values below 1 are treated as 1.
    pub concurrency: usize,

    /// Directory the export files are written into.
    pub out_dir: PathBuf,

    /// Which export files to produce.
    pub export: ExportKind,

    pub log_level: LogLevel,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            caption_format: CaptionFormat::default(),
            language: None,
            concurrency: 4,
            out_dir: PathBuf::from("out"),
            export: ExportKind::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Opts {
    /// Batch size actually used by the runner.
    pub fn batch_size(&self) -> usize {
        self.concurrency.max(1)
    }
}

/// Which export files a run produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ExportKind {
    #[default]
    Json,
    Csv,
    Ndjson,
    All,
}

impl ExportKind {
    pub fn includes_json(self) -> bool {
        matches!(self, ExportKind::Json | ExportKind::All)
    }

    pub fn includes_csv(self) -> bool {
        matches!(self, ExportKind::Csv | ExportKind::All)
    }

    pub fn includes_ndjson(self) -> bool {
        matches!(self, ExportKind::Ndjson | ExportKind::All)
    }
}

impl FromStr for ExportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ExportKind::Json),
            "csv" => Ok(ExportKind::Csv),
            "ndjson" => Ok(ExportKind::Ndjson),
            "all" => Ok(ExportKind::All),
            other => Err(Error::UnsupportedExport(other.to_owned())),
        }
    }
}

/// Verbosity for the run's log output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}
