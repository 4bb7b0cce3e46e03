use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BitDiffError {
    #[error("chunk size must be at least one byte")]
    InvalidChunkSize,

    #[error("destination holds {len} bytes, chunk size is {chunk_size}")]
    ShortDestination { len: usize, chunk_size: usize },

    #[error("unable to open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("attempt to process a diff that has already been used")]
    AlreadyProcessed,

    /// Both streams produced chunks of different length before either one ended.
    #[error("read mismatch at offset {offset:#x} before end of file: {len_a} vs {len_b} bytes")]
    ChunkMismatch {
        offset: u64,
        len_a: usize,
        len_b: usize,
    },

    #[error("bytes read {consumed} not equal to expected {expected}")]
    ByteCountMismatch { consumed: u64, expected: u64 },

    /// A read was woken by a stop signal instead of staged data.
    #[error("read-ahead buffer was stopped while a read was pending")]
    ShutdownRace,

    #[error("read failure: {0}")]
    Read(#[source] io::Error),

    #[error("failed to write diff output: {0}")]
    Output(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, BitDiffError>;
