//! scalarlog CLI: record scalars and inspect event files from the shell.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Table};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use scalarlog::{find_event_files, global, read_events, Logger, LoggerConfig};

#[derive(Parser)]
#[command(
    name = "scalarlog",
    about = "scalarlog: fork-safe scalar logging to TensorBoard event files",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a set of sample series into <dir>, <dir>2 and <dir>3
    Demo {
        /// Base directory for the demo event files
        #[arg(long, default_value = "logs")]
        dir: PathBuf,
        /// Pause between rate measurements, in milliseconds
        #[arg(long, default_value_t = 1000)]
        rate_interval_ms: u64,
    },
    /// Append a single scalar to a new event file
    Record {
        /// Tag of the scalar (e.g. "loss")
        key: String,
        /// Value to record
        #[arg(allow_negative_numbers = true)]
        value: f64,
        /// Explicit step (default: 0, as each invocation starts a new file)
        #[arg(long, short)]
        step: Option<i64>,
        /// Directory to write into
        #[arg(long, default_value = "logs", conflicts_with = "config")]
        dir: PathBuf,
        /// YAML logger config (log_dir, filename_suffix)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the scalars stored in an event file or directory of event files
    Dump {
        /// Event file, or directory containing event files
        path: PathBuf,
        /// Output format
        #[arg(long, short, value_enum, default_value_t = DumpFormat::Table)]
        format: DumpFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DumpFormat {
    Table,
    Json,
    Csv,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo {
            dir,
            rate_interval_ms,
        } => {
            cmd_demo(&dir, Duration::from_millis(rate_interval_ms))?;
        }
        Commands::Record {
            key,
            value,
            step,
            dir,
            config,
        } => {
            cmd_record(&key, value, step, dir, config)?;
        }
        Commands::Dump { path, format } => {
            cmd_dump(&path, format)?;
        }
    }

    Ok(())
}

// ─── Command implementations ──────────────────────────────────────────────────

fn cmd_demo(dir: &Path, rate_interval: Duration) -> Result<()> {
    global::configure_default_target(dir)?;
    for i in 0..10 {
        scalarlog::record("foo", f64::from(i), None)?;
    }
    for j in 10..20 {
        scalarlog::record("bar", f64::from(j), None)?;
    }

    let second = sibling(dir, "2");
    global::configure_default_target(&second)?;
    for k in 20..30 {
        scalarlog::record("baz", f64::from(k), None)?;
    }
    for l in 0..5 {
        scalarlog::record("qux", f64::from(l), Some(10 * i64::from(l)))?;
    }
    global::close_default()?;

    let third = sibling(dir, "3");
    let mut logger = Logger::open(&third)?;
    for i in 0..10 {
        logger.log("quux", f64::from(i), None)?;
    }
    logger.log_list_statistics("quuz", &[1.0, 2.0, 3.0, 4.0, 5.0])?;

    logger.measure_rate("corge", 10.0)?;
    thread::sleep(rate_interval);
    logger.measure_rate("corge", 20.0)?;
    thread::sleep(rate_interval * 2);
    logger.measure_rate("corge", 30.0)?;
    logger.close()?;

    println!("Demo event files written:");
    for d in [dir, second.as_path(), third.as_path()] {
        println!("  {}", d.display());
    }
    Ok(())
}

fn cmd_record(
    key: &str,
    value: f64,
    step: Option<i64>,
    dir: PathBuf,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = match config {
        Some(path) => LoggerConfig::load(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => LoggerConfig::new(dir),
    };

    let mut logger = Logger::from_config(&config)?;
    logger.log(key, value, step)?;
    let event_file = logger.event_file().map(Path::to_path_buf);
    logger.close()?;

    if let Some(path) = event_file {
        println!("Recorded {} = {} in {}", key, value, path.display());
    }
    Ok(())
}

#[derive(Serialize)]
struct DumpRow {
    file: String,
    wall_time: f64,
    step: i64,
    tag: String,
    value: f32,
}

fn cmd_dump(path: &Path, format: DumpFormat) -> Result<()> {
    let files = if path.is_dir() {
        find_event_files(path)?
    } else {
        vec![path.to_path_buf()]
    };
    if files.is_empty() {
        anyhow::bail!("No event files found in {}", path.display());
    }
    debug!(count = files.len(), "Reading event files");

    let mut rows = vec![];
    for file in &files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let events =
            read_events(file).with_context(|| format!("Failed to read {}", file.display()))?;
        for event in &events {
            for (tag, value) in event.scalars() {
                rows.push(DumpRow {
                    file: name.clone(),
                    wall_time: event.wall_time,
                    step: event.step,
                    tag: tag.to_string(),
                    value,
                });
            }
        }
    }

    match format {
        DumpFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        DumpFormat::Csv => {
            println!("file,wall_time,step,tag,value");
            for r in &rows {
                println!("{},{},{},{},{}", r.file, r.wall_time, r.step, r.tag, r.value);
            }
        }
        DumpFormat::Table => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(["Time", "Step", "Tag", "Value"]);
            for r in &rows {
                table.add_row([
                    format_wall_time(r.wall_time),
                    r.step.to_string(),
                    r.tag.clone(),
                    r.value.to_string(),
                ]);
            }
            println!("{} scalar(s) in {} file(s)", rows.len(), files.len());
            println!("{}", table);
        }
    }

    Ok(())
}

// ─── Utilities ────────────────────────────────────────────────────────────────

/// `dir` with `suffix` appended to its last component ("logs" -> "logs2").
fn sibling(dir: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(dir.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn format_wall_time(secs: f64) -> String {
    let micros = (secs * 1_000_000.0).round() as i64;
    chrono::DateTime::<chrono::Utc>::from_timestamp_micros(micros)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| secs.to_string())
}
