use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use ytcaptions::export::default_basename;
use ytcaptions::logging;
use ytcaptions::url::load_urls;
use ytcaptions::{
    CaptionFormat, ExportCoordinator, ExportKind, Harvester, LogLevel, Opts, YtDlpClient,
};

#[derive(Parser, Debug)]
#[command(name = "ytcaptions")]
#[command(about = "Extract structured YouTube transcripts at scale")]
struct Params {
    /// One or more YouTube URLs, or a single path to a text file with one URL per line.
    #[arg(required = true, num_args = 1..)]
    inputs: Vec<String>,

    /// Caption payload format.
    #[arg(long = "format", value_enum, default_value_t = CaptionFormat::ArrayWithTimestamps)]
    format: CaptionFormat,

    /// Preferred caption language (e.g. `en`). Falls back to the first available track.
    #[arg(long = "language")]
    language: Option<String>,

    /// Number of videos processed at once.
    #[arg(long = "concurrency", default_value_t = 4)]
    concurrency: usize,

    /// Output directory for exported files (created if missing).
    #[arg(long = "out", default_value = "out")]
    out_dir: PathBuf,

    /// Which export files to write.
    #[arg(long = "export", value_enum, default_value_t = ExportKind::Json)]
    export: ExportKind,

    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

impl Params {
    fn into_opts(self) -> (Vec<String>, Opts) {
        let opts = Opts {
            caption_format: self.format,
            language: self.language,
            concurrency: self.concurrency,
            out_dir: self.out_dir,
            export: self.export,
            log_level: self.log_level,
        };
        (self.inputs, opts)
    }
}

fn main() -> Result<ExitCode> {
    let (inputs, opts) = Params::parse().into_opts();
    logging::init(opts.log_level.as_filter());

    let urls = load_urls(&inputs)?;
    if urls.is_empty() {
        error!("No input URLs found.");
        return Ok(ExitCode::from(2));
    }

    // Fail on an unwritable output directory before spending time on fetches.
    let exporter = ExportCoordinator::new(&opts.out_dir, default_basename(Utc::now()))?;

    let client = YtDlpClient::new()?;
    let export = opts.export;
    let harvester = Harvester::from_source(&client, opts);

    let progress = ProgressBar::new(urls.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .context("invalid progress bar template")?,
    );
    let records = harvester.run(&urls, |record| {
        progress.set_message(record.video_id.clone());
        progress.inc(1);
    });
    progress.finish_and_clear();

    let failed = records.iter().filter(|r| r.is_error()).count();
    exporter.export(&records, export)?;
    exporter.write_compact_json(&records)?;

    let out_dir = exporter
        .out_dir()
        .canonicalize()
        .unwrap_or_else(|_| exporter.out_dir().to_path_buf());
    info!(
        records = records.len(),
        failed,
        "Done. Wrote outputs to {}",
        out_dir.display()
    );
    Ok(ExitCode::SUCCESS)
}
