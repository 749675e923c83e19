//! The `augment run` command: discover images, run a batch, write a zip.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use augment_core::package::{OutputPackager, ZipArchiveWriter};
use augment_core::pipeline::{FileDiscovery, ProgressSink};
use augment_core::{
    Augmenter, BatchOptions, BatchStats, Bound, CancelToken, Config, OperatorId, OutputFormat,
    ParameterSet,
};
use clap::{Args, ValueEnum};
use serde_json::Value;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Image files or directories to augment
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Operators to apply, comma-separated (see `augment list`)
    #[arg(long, value_delimiter = ',', required_unless_present = "all")]
    pub ops: Vec<String>,

    /// Apply every operator in the catalog
    #[arg(long, conflicts_with = "ops")]
    pub all: bool,

    /// Override a parameter: OP.FIELD=VALUE or OP.FIELD.low|high=NUMBER (repeatable)
    #[arg(long = "set", value_name = "OP.FIELD=VALUE")]
    pub overrides: Vec<String>,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of parallel workers
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Directory to write the archive to
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Image encoding inside the archive
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,
}

/// Archive image encodings.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    Jpeg,
    Png,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jpeg => OutputFormat::Jpeg,
            FormatArg::Png => OutputFormat::Png,
        }
    }
}

/// A parsed `--set` flag.
#[derive(Debug, Clone, PartialEq)]
enum Override {
    Field {
        op: OperatorId,
        field: String,
        value: Value,
    },
    Bound {
        op: OperatorId,
        field: String,
        bound: Bound,
        value: f32,
    },
}

/// Execute the run command.
pub async fn execute(args: RunArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(dir) = &args.output {
        config.output.dir = dir.clone();
    }
    if let Some(format) = args.format {
        config.output.format = format.into();
    }
    if args.parallel == Some(0) {
        anyhow::bail!("--parallel must be at least 1");
    }

    let operators = resolve_operators(&args.ops, args.all)?;
    let params = apply_overrides(&config.operators, &args.overrides)?;

    let discovery = FileDiscovery::new(config.processing.clone());
    let files = discovery.discover_all(&args.inputs);
    if files.is_empty() {
        anyhow::bail!("No supported images found in the given input(s)");
    }
    tracing::info!(
        "Found {} image(s), {:.1} MB",
        files.len(),
        FileDiscovery::total_size(&files) as f64 / 1_000_000.0
    );

    let mut inputs = Vec::with_capacity(files.len());
    for file in &files {
        match file.read().await {
            Ok(input) => inputs.push(input),
            Err(e) => tracing::warn!("Cannot read {:?}: {}", file.path, e),
        }
    }
    if inputs.is_empty() {
        anyhow::bail!("None of the discovered images could be read");
    }

    let options = BatchOptions {
        seed: args.seed,
        parallel_workers: args.parallel,
        cancel: CancelToken::new(),
    };
    let cancel = options.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, waiting for in-flight tasks");
            cancel.cancel();
        }
    });

    let progress = create_progress_bar();
    let bar = progress.clone();
    let sink: Arc<dyn ProgressSink> = Arc::new(move |percent: u8| bar.set_position(percent as u64));

    let start = Instant::now();
    let outcome = Augmenter::new(&config)
        .run(inputs, &operators, &params, &options, sink)
        .await;
    progress.finish_and_clear();
    let result = outcome?;
    let elapsed = start.elapsed();

    if result.is_empty() {
        anyhow::bail!("No image could be decoded; nothing to package");
    }

    let archive = OutputPackager::new(&config.output)
        .package(&result, &ZipArchiveWriter::new())
        .await?;
    let path = archive
        .save_to(&config.output_dir())
        .await
        .with_context(|| format!("Failed to write archive to {}", config.output_dir().display()))?;

    print_summary(&result.stats(), elapsed, &path);
    Ok(())
}

/// Resolve `--ops`/`--all` to catalog ids, keeping the first occurrence of duplicates.
fn resolve_operators(ops: &[String], all: bool) -> anyhow::Result<Vec<OperatorId>> {
    if all {
        return Ok(OperatorId::ALL.to_vec());
    }

    let mut resolved: Vec<OperatorId> = Vec::with_capacity(ops.len());
    for op in ops {
        let id: OperatorId = op
            .trim()
            .parse()
            .with_context(|| "Run `augment list` to see available operators")?;
        if !resolved.contains(&id) {
            resolved.push(id);
        }
    }
    if resolved.is_empty() {
        anyhow::bail!("No operators selected");
    }
    Ok(resolved)
}

fn parse_override(flag: &str) -> anyhow::Result<Override> {
    let (key, raw) = flag
        .split_once('=')
        .with_context(|| format!("Expected OP.FIELD=VALUE, got '{flag}'"))?;
    let raw = raw.trim();

    match key.trim().split('.').collect::<Vec<_>>().as_slice() {
        [op, field] => Ok(Override::Field {
            op: op.parse()?,
            field: field.to_string(),
            // Bare words (e.g. noise modes) are taken as strings
            value: serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
        }),
        [op, field, bound] => Ok(Override::Bound {
            op: op.parse()?,
            field: field.to_string(),
            bound: Bound::parse(bound)
                .with_context(|| format!("Unknown bound '{bound}', expected low or high"))?,
            value: raw
                .parse()
                .with_context(|| format!("'{raw}' is not a number"))?,
        }),
        _ => anyhow::bail!("Expected OP.FIELD or OP.FIELD.BOUND, got '{key}'"),
    }
}

/// Apply `--set` flags in order on top of `base`.
fn apply_overrides(base: &ParameterSet, flags: &[String]) -> anyhow::Result<ParameterSet> {
    let mut params = base.clone();
    for flag in flags {
        params = match parse_override(flag)? {
            Override::Field { op, field, value } => params.with_field(op, &field, value)?,
            Override::Bound {
                op,
                field,
                bound,
                value,
            } => params.with_bound(op, &field, bound, value)?,
        };
        tracing::debug!("Applied override {}", flag);
    }
    Ok(params)
}

/// Create a percentage progress bar for the batch.
fn create_progress_bar() -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(100);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}%")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb
}

/// Print a formatted summary table after the batch.
fn print_summary(stats: &BatchStats, elapsed: Duration, archive: &Path) {
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        (stats.completed + stats.degraded) as f64 / secs
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Completed:    {:>8}", stats.completed);
    if stats.degraded > 0 {
        eprintln!("    Degraded:     {:>8}", stats.degraded);
    }
    if stats.skipped_tasks > 0 {
        eprintln!(
            "    Skipped:      {:>8}  ({} unreadable image(s))",
            stats.skipped_tasks, stats.skipped_images
        );
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", stats.total_tasks);
    eprintln!("    Duration:     {:>7.1}s", secs);
    eprintln!("    Rate:         {:>7.1} tasks/sec", rate);
    eprintln!("  ====================================");
    println!("{}", archive.display());
}
