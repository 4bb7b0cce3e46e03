use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::render::RenderMode;
use crate::utils::parse_size;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// First file to compare (A)
    pub file_a: PathBuf,

    /// Second file to compare (B)
    pub file_b: PathBuf,

    /// How differing bytes are rendered
    #[arg(short, long, value_enum, default_value_t = RenderMode::Bits)]
    pub mode: RenderMode,

    /// Do not print the header line
    #[arg(long)]
    pub no_header: bool,

    /// Read-ahead chunk size per file (e.g., 512KiB, 4MB, 65536)
    #[arg(short, long, default_value = "512KiB")]
    pub buffer_size: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug)]
pub struct Options {
    pub mode: RenderMode,
    pub header: bool,
    pub buffer_size: usize,
}

pub fn build_options(args: &Args) -> Result<Options> {
    let size = parse_size(&args.buffer_size)?;
    let buffer_size = usize::try_from(size)
        .with_context(|| format!("Buffer size too large: {}", args.buffer_size))?;

    Ok(Options {
        mode: args.mode,
        header: !args.no_header,
        buffer_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["bitdiff", "a.bin", "b.bin"]);
        let opts = build_options(&args).unwrap();
        assert_eq!(opts.mode, RenderMode::Bits);
        assert!(opts.header);
        assert_eq!(opts.buffer_size, 512 * 1024);
    }

    #[test]
    fn explicit_flags() {
        let args = Args::parse_from([
            "bitdiff", "-m", "hex", "--no-header", "-b", "4k", "a.bin", "b.bin",
        ]);
        let opts = build_options(&args).unwrap();
        assert_eq!(opts.mode, RenderMode::Hex);
        assert!(!opts.header);
        assert_eq!(opts.buffer_size, 4000);
    }

    #[test]
    fn invalid_buffer_size() {
        let args = Args::parse_from(["bitdiff", "-b", "huge", "a.bin", "b.bin"]);
        assert!(build_options(&args).is_err());
    }
}
