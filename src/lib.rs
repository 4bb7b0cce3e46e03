//
// lib.rs
// bitdiff
//
// Library entry that re-exports the read-ahead buffer, the byte renderers and the diff engine so the binary and tests share one surface.
//
// Thales Matheus Mendonça Santos - November 2025
//
// Public crate interface: re-export modules used by the binary and tests.
pub mod cli;
pub mod diff;
pub mod error;
pub mod reader;
pub mod render;
pub mod utils;

pub use cli::{build_options, Args, Options};
pub use diff::{DiffCount, DiffEngine};
pub use error::{BitDiffError, Result};
pub use reader::{ReadAheadBuffer, StopHandle};
pub use render::{ByteRenderer, RenderMode};
