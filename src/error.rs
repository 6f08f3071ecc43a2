use std::io;

use thiserror::Error;

/// Reasons the managed heap could not be extended.
///
/// The public allocation functions report all of these as a null pointer;
/// the variants exist for logging and for the heap sources' own callers.
#[derive(Debug, Error)]
pub enum HeapError {
  #[error("the operating system refused to extend the heap by {requested} bytes")]
  OutOfMemory { requested: usize },

  /// Someone else moved the top of the heap between two of our growths.
  #[error("heap grew at {found:#x}, expected contiguous growth at {expected:#x}")]
  Discontiguous { expected: usize, found: usize },

  #[error("failed to map heap region: {0}")]
  Map(#[from] io::Error),
}
