use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use odds_tables::config::Config;
use odds_tables::error::Result;
use odds_tables::output::{render, write_matrix_file};
use odds_tables::pipeline::{align_document, record_specials, SpecialsTargets};
use odds_tables::specials::summarize_specials;
use odds_tables::table::file::write_atomic;
use odds_tables::types::{OutputFormat, TimestampFormat};

#[derive(Debug, Parser)]
#[command(name = "odds-tables", about = "Build aligned odds tables from fetched JSON")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Align an event's odds history into one column per outcome.
    Align {
        /// Saved markets JSON containing `events[].periods[].history`.
        input: PathBuf,
        /// Write here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
        /// csv or json.
        #[arg(long, default_value = "csv")]
        format: OutputFormat,
        /// Keep rows with more than this many populated cells (MIN_NONNULL_PER_ROW).
        #[arg(long)]
        min_nonnull: Option<usize>,
        /// Render timestamps as UTC dates instead of epoch seconds.
        #[arg(long)]
        human_dates: bool,
        /// Write the fill audit summary as JSON.
        #[arg(long)]
        audit: Option<PathBuf>,
    },
    /// Merge one specials snapshot into the long and wide tables.
    Specials {
        /// Saved special-markets JSON.
        input: PathBuf,
        #[arg(long)]
        event_id: Option<String>,
        #[arg(long)]
        long_csv: Option<PathBuf>,
        #[arg(long)]
        wide_csv: Option<PathBuf>,
        #[arg(long)]
        key_output: Option<PathBuf>,
        /// Number of markets to summarise in the log.
        #[arg(long)]
        preview: Option<usize>,
        /// Capture time; defaults to now (RFC 3339, UTC).
        #[arg(long)]
        fetched_at: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(cli, cfg) {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, cfg: Config) -> Result<()> {
    match cli.command {
        Command::Align {
            input,
            output,
            format,
            min_nonnull,
            human_dates,
            audit,
        } => {
            let doc = read_json(&input)?;
            let min_nonnull = min_nonnull.unwrap_or(cfg.min_nonnull_per_row);
            let run = align_document(&doc, min_nonnull)?;
            let matrix = &run.alignment.matrix;
            info!(
                "Aligned period {}: {} columns x {} rows (min_nonnull={min_nonnull})",
                run.period,
                matrix.columns.len(),
                matrix.rows.len(),
            );

            let ts_format = if human_dates {
                TimestampFormat::Human
            } else {
                TimestampFormat::Epoch
            };
            match output {
                Some(path) => {
                    write_matrix_file(&path, matrix, format, ts_format)?;
                    info!("Output saved to: {}", path.display());
                }
                None => render(matrix, format, ts_format, io::stdout().lock())?,
            }

            if let Some(path) = audit {
                let summary = run.alignment.audit.summary();
                write_atomic(&path, |out| Ok(serde_json::to_writer_pretty(out, &summary)?))?;
                info!("Fill audit saved to: {}", path.display());
            }
        }

        Command::Specials {
            input,
            event_id,
            long_csv,
            wide_csv,
            key_output,
            preview,
            fetched_at,
        } => {
            let payload = read_json(&input)?;
            let count = payload
                .get("specials")
                .and_then(|s| s.as_array())
                .map_or(0, |a| a.len());
            info!("Loaded {count} special markets from {}", input.display());
            if let Some(last) = payload.get("last") {
                info!("API reported last timestamp: {last}");
            }
            for line in summarize_specials(&payload, preview.unwrap_or(cfg.specials_preview)) {
                info!(" - {line}");
            }

            let targets = SpecialsTargets {
                long_csv: long_csv.unwrap_or(cfg.long_csv_path),
                wide_csv: wide_csv.unwrap_or(cfg.wide_csv_path),
                key_json: key_output.unwrap_or(cfg.key_json_path),
            };
            let fetched_at = fetched_at
                .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false));
            let summary = record_specials(&payload, event_id.as_deref(), &fetched_at, &targets)?;
            info!(
                "Recorded {} outcomes ({} new long columns, {} new wide columns)",
                summary.rows,
                summary.long.added_columns.len(),
                summary.wide.added_columns.len(),
            );
        }
    }
    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
