use clap::Parser;
use swfnorm::batch::{run, BatchInputs, BatchOptions, DuplicatePolicy, OutputTarget, DEFAULT_EXTENSION};
use swfnorm::filter::decode_pattern;
use swfnorm::recovery::{UnpackOptions, DEFAULT_MAX_RECOVERY_DEPTH};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "swfnorm", about = "Unpack SWF files into canonical uncompressed form")]
struct Cli {
    /// Input directory, walked recursively for *.swf
    #[arg(short, long)]
    dir: Option<PathBuf>,
    /// Single input file
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Output directory, or output file when only -f is given and this ends in .swf
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,
    /// Skip files whose decompressed body contains this pattern (\xHH escapes allowed)
    #[arg(short, long, default_value = "")]
    exclude: String,
    /// Maximum number of embedded headers to follow per file
    #[arg(long, default_value_t = DEFAULT_MAX_RECOVERY_DEPTH)]
    max_depth: usize,
    /// Reject files whose decoded body is larger than this many bytes
    #[arg(long)]
    max_body_size: Option<usize>,
    /// Same output name twice: overwrite, skip, error
    #[arg(long, default_value = "overwrite")]
    on_duplicate: String,
    /// Write a JSON summary of the run to this path
    #[arg(long)]
    report: Option<PathBuf>,
    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
    /// Warnings only
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli);

    let exclude = decode_pattern(&cli.exclude);
    if !exclude.is_empty() {
        info!(
            text = %String::from_utf8_lossy(&exclude),
            hex = %hex::encode(&exclude),
            "exclude pattern"
        );
    }

    let opts = BatchOptions {
        unpack: UnpackOptions {
            max_recovery_depth: cli.max_depth,
            max_body_size:      cli.max_body_size,
        },
        exclude,
        extension:    DEFAULT_EXTENSION.to_string(),
        on_duplicate: parse_policy(&cli.on_duplicate),
        output:       output_target(&cli),
    };
    let inputs = BatchInputs { dir: cli.dir, file: cli.file };

    let report = run(&inputs, &opts)?;
    if let Some(path) = cli.report {
        std::fs::write(&path, report.to_json()?)?;
        info!(path = %path.display(), "report written");
    }
    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else if cli.quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn output_target(cli: &Cli) -> OutputTarget {
    let names_a_file = cli.output
        .extension()
        .map_or(false, |ext| ext == DEFAULT_EXTENSION);
    if cli.dir.is_none() && cli.file.is_some() && names_a_file {
        OutputTarget::File(cli.output.clone())
    } else {
        OutputTarget::Directory(cli.output.clone())
    }
}

fn parse_policy(s: &str) -> DuplicatePolicy {
    DuplicatePolicy::from_name(s).unwrap_or_else(|| {
        warn!("Unknown duplicate policy '{}', defaulting to overwrite", s);
        DuplicatePolicy::Overwrite
    })
}
