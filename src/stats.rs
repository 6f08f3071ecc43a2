use std::{fmt, io::Write};

/// Counters describing everything an allocator has done so far.
///
/// `requested` counts the raw sizes passed to `allocate`, including zero-sized
/// and failed requests. `max_heap` counts payload bytes obtained from the heap
/// source and excludes header overhead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
  pub allocations: usize,
  pub releases: usize,
  pub reuses: usize,
  pub grows: usize,
  pub splits: usize,
  pub coalesces: usize,
  /// Blocks currently threaded on the list, free or not.
  pub blocks: usize,
  pub requested: usize,
  pub max_heap: usize,
}

impl Statistics {
  pub const fn new() -> Self {
    Self {
      allocations: 0,
      releases: 0,
      reuses: 0,
      grows: 0,
      splits: 0,
      coalesces: 0,
      blocks: 0,
      requested: 0,
      max_heap: 0,
    }
  }

  /// Writes the report into `buffer` without allocating and returns the
  /// number of bytes written. Output that doesn't fit is cut off.
  pub fn render(
    &self,
    buffer: &mut [u8],
  ) -> usize {
    let capacity = buffer.len();
    let mut remaining = buffer;
    let _ = write!(remaining, "\n{self}");
    capacity - remaining.len()
  }
}

impl fmt::Display for Statistics {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    writeln!(f, "heap management statistics")?;
    writeln!(f, "mallocs:\t{}", self.allocations)?;
    writeln!(f, "frees:\t\t{}", self.releases)?;
    writeln!(f, "reuses:\t\t{}", self.reuses)?;
    writeln!(f, "grows:\t\t{}", self.grows)?;
    writeln!(f, "splits:\t\t{}", self.splits)?;
    writeln!(f, "coalesces:\t{}", self.coalesces)?;
    writeln!(f, "blocks:\t\t{}", self.blocks)?;
    writeln!(f, "requested:\t{}", self.requested)?;
    writeln!(f, "max heap:\t{}", self.max_heap)
  }
}
