use std::io::{self, BufWriter};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use bitdiff::utils::plural;
use bitdiff::{build_options, Args, DiffEngine};

const EXIT_DIFFERENT: u8 = 1;
const EXIT_FAILURE: u8 = 10;

fn init_logging(quiet: bool) {
    let level = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Returns the number of differing bytes.
fn run(args: &Args) -> Result<u64> {
    let opts = build_options(args)?;

    if args.file_a == args.file_b {
        info!("File A and B are the same path");
        return Ok(0);
    }

    info!("Initializing diff");
    let mut diff = DiffEngine::new(&args.file_a, &args.file_b, opts.buffer_size)
        .context("Diff initialization failure")?;

    info!("Size {}: {}", diff.path_a().display(), diff.file_a_size());
    info!("Size {}: {}", diff.path_b().display(), diff.file_b_size());

    let stdout = io::stdout();
    let count = diff
        .process(BufWriter::new(stdout.lock()), opts.mode, opts.header)
        .context("Diff failed")?;

    info!(
        "{} difference{} found, {} bit{}",
        count.bytes,
        plural(count.bytes),
        count.bits,
        plural(count.bits)
    );

    Ok(count.bytes)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.quiet);

    match run(&args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(EXIT_DIFFERENT),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
