use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{BitDiffError, Result};
use crate::reader::ReadAheadBuffer;
use crate::render::{ByteRenderer, RenderMode};

pub const OUT_DELIM: char = '\t';
const OFFSET_WIDTH: usize = (u64::BITS / 4) as usize;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffCount {
    pub bytes: u64,
    pub bits: u64,
}

/// Positional byte comparison of two files.
///
/// Both files are prefetched by their own [`ReadAheadBuffer`]. An engine can
/// be processed once; dropping it stops and joins both readers.
pub struct DiffEngine {
    path_a: PathBuf,
    path_b: PathBuf,
    size_a: u64,
    size_b: u64,
    reader_a: ReadAheadBuffer,
    reader_b: ReadAheadBuffer,
    chunk_size: usize,
    spent: bool,
}

fn file_size(path: &Path) -> Result<u64> {
    let open_error = |source| BitDiffError::Open {
        path: path.to_path_buf(),
        source,
    };
    let meta = fs::metadata(path).map_err(open_error)?;
    if !meta.is_file() {
        return Err(open_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }
    Ok(meta.len())
}

fn write_line<W: Write + ?Sized>(
    out: &mut W,
    offset: u64,
    renderer: &mut ByteRenderer,
) -> io::Result<()> {
    write!(out, "0x{:0width$x}{}", offset, OUT_DELIM, width = OFFSET_WIDTH)?;
    renderer.render(out)?;
    out.write_all(b"\n")
}

impl DiffEngine {
    pub fn new(a: impl AsRef<Path>, b: impl AsRef<Path>, chunk_size: usize) -> Result<Self> {
        let path_a = a.as_ref().to_path_buf();
        let path_b = b.as_ref().to_path_buf();

        let size_a = file_size(&path_a)?;
        let size_b = file_size(&path_b)?;

        let reader_a = ReadAheadBuffer::open(&path_a, chunk_size)?;
        let reader_b = ReadAheadBuffer::open(&path_b, chunk_size)?;

        Ok(Self::from_readers(
            (path_a, size_a, reader_a),
            (path_b, size_b, reader_b),
        ))
    }

    /// Builds an engine over already running readers. Each side carries the
    /// size the comparison is expected to cover.
    pub(crate) fn from_readers(
        (path_a, size_a, reader_a): (PathBuf, u64, ReadAheadBuffer),
        (path_b, size_b, reader_b): (PathBuf, u64, ReadAheadBuffer),
    ) -> Self {
        let chunk_size = reader_a.chunk_size().max(reader_b.chunk_size());
        Self {
            path_a,
            path_b,
            size_a,
            size_b,
            reader_a,
            reader_b,
            chunk_size,
            spent: false,
        }
    }

    pub fn path_a(&self) -> &Path {
        &self.path_a
    }

    pub fn path_b(&self) -> &Path {
        &self.path_b
    }

    pub fn file_a_size(&self) -> u64 {
        self.size_a
    }

    pub fn file_b_size(&self) -> u64 {
        self.size_b
    }

    /// Compares both files up to the shorter length and writes one line per
    /// differing byte to `out`.
    ///
    /// Fails with [`BitDiffError::AlreadyProcessed`] on a second call, even
    /// if the first one failed.
    pub fn process<W: Write>(
        &mut self,
        mut out: W,
        mode: RenderMode,
        emit_header: bool,
    ) -> Result<DiffCount> {
        if self.spent {
            return Err(BitDiffError::AlreadyProcessed);
        }
        self.spent = true;

        if self.size_a != self.size_b {
            warn!(
                "{} ({}) and {} ({}) differ in size; diff will end at smaller size",
                self.path_a.display(),
                self.size_a,
                self.path_b.display(),
                self.size_b
            );
        }

        if emit_header {
            writeln!(
                out,
                "Offset{OUT_DELIM}Byte in {}{OUT_DELIM}Byte in {}",
                self.path_a.display(),
                self.path_b.display()
            )
            .map_err(BitDiffError::Output)?;
        }

        let mut chunk_a = vec![0u8; self.chunk_size];
        let mut chunk_b = vec![0u8; self.chunk_size];
        let mut renderer = ByteRenderer::new(mode, OUT_DELIM);
        let mut count = DiffCount::default();
        let mut consumed: u64 = 0;

        loop {
            let len_a = self.reader_a.read(&mut chunk_a)?;
            let len_b = self.reader_b.read(&mut chunk_b)?;
            let len = len_a.min(len_b);

            let pairs = chunk_a[..len].iter().zip(&chunk_b[..len]);
            for (i, (&a, &b)) in pairs.enumerate() {
                if a == b {
                    continue;
                }
                renderer.init(a, b);
                count.bytes += 1;
                count.bits += u64::from(renderer.popcount());
                write_line(&mut out, consumed + i as u64, &mut renderer)
                    .map_err(BitDiffError::Output)?;
            }

            consumed += len as u64;

            let end_a = self.reader_a.is_drained();
            let end_b = self.reader_b.is_drained();
            if end_a || end_b {
                match (end_a, end_b) {
                    (true, true) => debug!("End of both files reached at {consumed} bytes"),
                    (true, false) => debug!("End of {} reached first", self.path_a.display()),
                    _ => debug!("End of {} reached first", self.path_b.display()),
                }
                break;
            }

            if len_a != len_b {
                return Err(BitDiffError::ChunkMismatch {
                    offset: consumed,
                    len_a,
                    len_b,
                });
            }
        }

        out.flush().map_err(BitDiffError::Output)?;

        let expected = self.size_a.min(self.size_b);
        if consumed != expected {
            return Err(BitDiffError::ByteCountMismatch { consumed, expected });
        }

        Ok(count)
    }
}
