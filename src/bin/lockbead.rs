//! Command-line driver: writes `bead_<i>_top.stl` / `bead_<i>_bottom.stl`
//! pairs plus a timestamped run log into the output directory.
//!
//! ```text
//! lockbead                                  # defaults, ./beads
//! lockbead --config bead.json --seed 7      # file, then overrides
//! RUST_LOG=lockbead=debug lockbead --ascii  # per-key detail, ASCII STL
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use lockbead::bead::{BeadConfig, BeadGenerator, RunSummary};
use lockbead::io::{resolve_output_dir, StlFormat, StlSink};
use lockbead::operations::boolean::BspEvaluator;
use lockbead::Result;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::{MakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate interlocking lock-and-key bead halves as STL")]
struct Args {
    /// JSON configuration file; omitted keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory for STL files and the run log
    #[arg(long, default_value = "beads")]
    output: PathBuf,
    /// Override the placement seed
    #[arg(long)]
    seed: Option<u64>,
    /// Override the number of bead pairs
    #[arg(long)]
    count: Option<usize>,
    /// Disable surface noise
    #[arg(long)]
    no_noise: bool,
    /// Write ASCII instead of binary STL
    #[arg(long)]
    ascii: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let prepared =
        tracing::subscriber::with_default(subscriber(std::io::stderr), || prepare(&args));
    let (config, output_dir) = match prepared {
        Ok(prepared) => prepared,
        Err(err) => {
            eprintln!("lockbead: {err}");
            return ExitCode::FAILURE;
        }
    };

    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let log_path = output_dir.join(format!("beads_log_{stamp}.txt"));
    // The log file is closed when the scoped subscriber is dropped.
    let (summary, log_saved) = match File::create(&log_path) {
        Ok(file) => {
            let writer = std::io::stderr.and(Mutex::new(file));
            let summary = tracing::subscriber::with_default(subscriber(writer), || {
                run(&config, &output_dir, Some(log_path.as_path()))
            });
            (summary, true)
        }
        Err(err) => {
            eprintln!(
                "lockbead: cannot open log file {}: {err}; logging to stderr only",
                log_path.display()
            );
            let summary = tracing::subscriber::with_default(subscriber(std::io::stderr), || {
                run(&config, &output_dir, None)
            });
            (summary, false)
        }
    };

    if log_saved {
        eprintln!("lockbead: log saved to {}", log_path.display());
    }
    if summary.aborted.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Default `info`; `RUST_LOG` overrides.
fn subscriber<W>(writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer)
        .finish()
}

/// Loads and validates the configuration and picks the output directory.
fn prepare(args: &Args) -> Result<(BeadConfig, PathBuf)> {
    let mut config = match &args.config {
        Some(path) => BeadConfig::load(path)?,
        None => BeadConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(count) = args.count {
        config.bead_count = count;
    }
    if args.no_noise {
        config.add_surface_noise = false;
    }
    if args.ascii {
        config.stl_format = StlFormat::Ascii;
    }
    config.validate()?;

    let output_dir = resolve_output_dir(Some(args.output.as_path()))?;
    Ok((config, output_dir))
}

fn run(config: &BeadConfig, output_dir: &Path, log_path: Option<&Path>) -> RunSummary {
    tracing::info!("bead generator started");
    if let Some(path) = log_path {
        tracing::info!(path = %path.display(), "log file created");
    }
    tracing::info!(
        beads = config.bead_count,
        seed = config.seed,
        shapes = ?config.key_shapes,
        noise = config.add_surface_noise,
        output = %output_dir.display(),
        "configuration"
    );

    let mut sink = StlSink::new(output_dir, config.stl_format);
    let summary = BeadGenerator::new(config).execute(&mut BspEvaluator, &mut sink);

    if let Some(reason) = &summary.aborted {
        tracing::error!(%reason, "bead generator stopped early");
    } else {
        tracing::info!("bead generator finished");
    }
    summary
}
