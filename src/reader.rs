//! Background read-ahead over a single byte source.
//!
//! A [`ReadAheadBuffer`] owns one worker thread that fills a chunk while the
//! owner works on the previous one. Handoff goes through a single staged slot
//! guarded by one mutex: the worker waits on `freed` until the owner has
//! copied the staged bytes out, the owner waits on `filled` until the worker
//! has staged the next chunk or hit the end of the stream.

use std::fs::File;
use std::io::{self, Read};
use std::mem;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use log::{trace, warn};

use crate::error::{BitDiffError, Result};

struct Slot {
    buffer: Vec<u8>,
    staged: usize,
    eof: bool,
    failure: Option<io::Error>,
}

struct Shared {
    slot: Mutex<Slot>,
    filled: Condvar,
    freed: Condvar,
    stop: AtomicBool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn signal_stop(&self) {
        // Set under the lock so a waiter cannot miss the wakeup between its
        // predicate check and the wait.
        let _slot = self.lock();
        self.stop.store(true, Ordering::SeqCst);
        self.filled.notify_all();
        self.freed.notify_all();
    }
}

/// Cloneable handle that stops a [`ReadAheadBuffer`] from another thread.
///
/// A pending or later [`ReadAheadBuffer::read`] fails with
/// [`BitDiffError::ShutdownRace`] once this has been called.
#[derive(Clone)]
pub struct StopHandle(Arc<Shared>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.signal_stop();
    }
}

pub struct ReadAheadBuffer {
    shared: Arc<Shared>,
    chunk_size: usize,
    worker: Option<JoinHandle<()>>,
}

impl ReadAheadBuffer {
    /// Opens `path` for reading and starts prefetching `chunk_size` bytes at a time.
    pub fn open(path: &Path, chunk_size: usize) -> Result<Self> {
        let file = File::open(path).map_err(|source| BitDiffError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(file, chunk_size)
    }

    pub fn new<R>(source: R, chunk_size: usize) -> Result<Self>
    where
        R: Read + Send + 'static,
    {
        if chunk_size == 0 {
            return Err(BitDiffError::InvalidChunkSize);
        }

        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot {
                buffer: vec![0; chunk_size],
                staged: 0,
                eof: false,
                failure: None,
            }),
            filled: Condvar::new(),
            freed: Condvar::new(),
            stop: AtomicBool::new(false),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("bitdiff-reader".into())
            .spawn(move || run(source, &worker_shared))
            .map_err(BitDiffError::Read)?;

        Ok(Self {
            shared,
            chunk_size,
            worker: Some(worker),
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Blocks until a chunk is staged, then copies it into `dest`.
    ///
    /// Returns `Ok(0)` once the stream has ended and every staged byte has
    /// been handed out. A hard I/O error hit by the worker is returned by the
    /// first call after it happened. `dest` must hold at least one chunk.
    pub fn read(&self, dest: &mut [u8]) -> Result<usize> {
        if dest.len() < self.chunk_size {
            return Err(BitDiffError::ShortDestination {
                len: dest.len(),
                chunk_size: self.chunk_size,
            });
        }

        let mut slot = self.shared.lock();
        loop {
            if self.shared.stopped() {
                return Err(BitDiffError::ShutdownRace);
            }
            if slot.staged > 0 {
                break;
            }
            if let Some(err) = slot.failure.take() {
                return Err(BitDiffError::Read(err));
            }
            if slot.eof {
                return Ok(0);
            }
            slot = self
                .shared
                .filled
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }

        let len = slot.staged;
        dest[..len].copy_from_slice(&slot.buffer[..len]);
        slot.staged = 0;
        self.shared.freed.notify_one();

        Ok(len)
    }

    /// True once the worker has reached the end of the source; no further
    /// bytes will be staged. The last chunk may still be waiting to be read.
    pub fn is_end_of_stream(&self) -> bool {
        self.shared.lock().eof
    }

    /// True once the end of the source was reached and nothing is left staged.
    pub fn is_drained(&self) -> bool {
        let slot = self.shared.lock();
        slot.eof && slot.staged == 0
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.shared))
    }
}

impl Drop for ReadAheadBuffer {
    fn drop(&mut self) {
        self.shared.signal_stop();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("read-ahead worker panicked");
            }
        }
    }
}

struct Filled {
    len: usize,
    eof: bool,
}

fn run<R: Read>(mut source: R, shared: &Shared) {
    loop {
        let mut buffer = {
            let mut slot = shared.lock();
            while slot.staged > 0 && !shared.stopped() {
                slot = shared
                    .freed
                    .wait(slot)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            if shared.stopped() {
                break;
            }
            mem::take(&mut slot.buffer)
        };

        // The lock is released while the source is read.
        let outcome = fill(&mut source, &mut buffer, &shared.stop);

        let mut slot = shared.lock();
        slot.buffer = buffer;
        match outcome {
            Ok(Some(Filled { len, eof })) => {
                trace!("staged {len} bytes (eof: {eof})");
                slot.staged = len;
                slot.eof = eof;
                shared.filled.notify_all();
                if eof {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                slot.failure = Some(err);
                slot.eof = true;
                shared.filled.notify_all();
                break;
            }
        }
    }
}

/// Reads until `buffer` is full or the source reports end of file.
/// Returns `None` if a stop was signalled before the chunk completed.
fn fill<R: Read>(
    source: &mut R,
    buffer: &mut [u8],
    stop: &AtomicBool,
) -> io::Result<Option<Filled>> {
    let mut len = 0;
    while len < buffer.len() {
        if stop.load(Ordering::SeqCst) {
            return Ok(None);
        }
        match source.read(&mut buffer[len..]) {
            Ok(0) => return Ok(Some(Filled { len, eof: true })),
            Ok(n) => len += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(Some(Filled { len, eof: false }))
}
