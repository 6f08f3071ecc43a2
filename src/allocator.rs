use std::{process, ptr};

use crate::{
  align,
  block::{Block, Blocks, HEADER_SIZE},
  error::HeapError,
  fit::SearchMode,
  source::{HeapSource, Sbrk},
  stats::Statistics,
};

/// A heap of blocks threaded on one address-ordered list, carved out of a
/// [`HeapSource`] that only ever grows.
///
/// ```text
///   first                                                   last     top
///     |                                                       |       |
///     v                                                       v       v
///   +--------+---------+   +--------+------+   +--------+---------+
///   | Block  | in use  |-->| Block  | free |-->| Block  | in use  |
///   +--------+---------+   +--------+------+   +--------+---------+
/// ```
///
/// Not thread safe. Every method that touches the heap is `unsafe` because
/// the pointers passed in must have come from this same allocator.
#[derive(Debug)]
pub struct FitAllocator<S = Sbrk> {
  pub(crate) source: S,
  pub(crate) mode: SearchMode,
  pub(crate) first: *mut Block,
  pub(crate) last: *mut Block,
  /// Where the next [`SearchMode::NextFit`] search resumes.
  pub(crate) cursor: *mut Block,
  /// One past the highest byte obtained from `source`.
  pub(crate) top: *mut u8,
  pub(crate) stats: Statistics,
}

impl FitAllocator<Sbrk> {
  /// Allocator on top of the process break.
  pub const fn new(mode: SearchMode) -> Self {
    Self {
      source: Sbrk,
      mode,
      first: ptr::null_mut(),
      last: ptr::null_mut(),
      cursor: ptr::null_mut(),
      top: ptr::null_mut(),
      stats: Statistics::new(),
    }
  }
}

impl Default for FitAllocator<Sbrk> {
  fn default() -> Self {
    Self::new(SearchMode::default())
  }
}

impl<S: HeapSource> FitAllocator<S> {
  pub fn with_source(
    mode: SearchMode,
    source: S,
  ) -> Self {
    Self {
      source,
      mode,
      first: ptr::null_mut(),
      last: ptr::null_mut(),
      cursor: ptr::null_mut(),
      top: ptr::null_mut(),
      stats: Statistics::new(),
    }
  }

  pub fn mode(&self) -> SearchMode {
    self.mode
  }

  pub fn stats(&self) -> &Statistics {
    &self.stats
  }

  pub fn source(&self) -> &S {
    &self.source
  }

  /// Every block on the heap in address order, free or not.
  pub fn blocks(&self) -> Blocks<'_> {
    Blocks::new(self.first)
  }

  /// Returns the address of at least `size` writable bytes, aligned to 4, or
  /// null if `size` is zero or the heap cannot grow.
  ///
  /// # Safety
  ///
  /// The allocator must not be used concurrently from another thread, and
  /// nothing else may write to the heap outside of handed out payloads.
  pub unsafe fn allocate(
    &mut self,
    size: usize,
  ) -> *mut u8 {
    self.stats.requested = self.stats.requested.wrapping_add(size);

    let size = align!(size);

    if size == 0 {
      return ptr::null_mut();
    }

    unsafe {
      let found = self.mode.find(self.first, &mut self.cursor, size);

      let block = if found.is_null() {
        match self.grow_heap(size) {
          Ok(block) => block,
          Err(error) => {
            tracing::debug!(%error, size, "allocation failed");
            return ptr::null_mut();
          }
        }
      } else {
        if self.split(found, size) {
          self.stats.splits += 1;
        }
        (*found).is_free = false;
        self.stats.reuses += 1;

        tracing::trace!(size, capacity = { (*found).size }, mode = %self.mode, "reused free block");

        found
      };

      self.stats.allocations += 1;

      Block::payload(block)
    }
  }

  /// Marks the block at `address` free and merges list-adjacent free blocks
  /// in a single pass. Null is ignored.
  ///
  /// The pass looks at each pair once, so a run of three or more free blocks
  /// can survive it partially merged.
  ///
  /// Releasing a block that is already free aborts the process.
  ///
  /// # Safety
  ///
  /// `address` must be null or a pointer returned by this allocator.
  pub unsafe fn release(
    &mut self,
    address: *mut u8,
  ) {
    if address.is_null() {
      return;
    }

    unsafe {
      let block = Block::from_payload(address);

      if (*block).is_free {
        tracing::error!(?address, "block released twice, heap is corrupt");
        process::abort();
      }

      (*block).is_free = true;
      self.stats.releases += 1;

      self.coalesce();
    }
  }

  /// Resizes the allocation at `address` to `size` bytes, keeping its
  /// contents up to the smaller of the two sizes.
  ///
  /// - Null `address` allocates, zero `size` releases and returns null.
  /// - Shrinking keeps the block where it is. The freed tail becomes a new
  ///   free block only when more than [`HEADER_SIZE`] bytes are left over,
  ///   otherwise the block keeps its capacity.
  /// - Growing the last block of the heap extends it in place.
  /// - Growing any other block moves it to the end of the heap. The old block
  ///   is marked free but only merged with its neighbours by a later release.
  ///
  /// Returns null if the heap cannot grow, leaving the old block untouched.
  ///
  /// # Safety
  ///
  /// `address` must be null or a live pointer returned by this allocator.
  pub unsafe fn reallocate(
    &mut self,
    address: *mut u8,
    size: usize,
  ) -> *mut u8 {
    unsafe {
      if address.is_null() {
        return self.allocate(size);
      }

      if size == 0 {
        self.release(address);
        return ptr::null_mut();
      }

      let size = align!(size);
      if size == 0 {
        return ptr::null_mut();
      }

      let block = Block::from_payload(address);
      let capacity = (*block).size;

      if size <= capacity {
        if self.split(block, size) {
          tracing::trace!(size, capacity, "shrank block in place");
        }
        return address;
      }

      if (*block).next.is_null() {
        match self.extend_tail(size - capacity) {
          Ok(()) => return address,
          Err(HeapError::Discontiguous { .. }) => {}
          Err(error) => {
            tracing::debug!(%error, size, "reallocation failed");
            return ptr::null_mut();
          }
        }
      }

      let moved = match self.grow_heap(size) {
        Ok(block) => block,
        Err(error) => {
          tracing::debug!(%error, size, "reallocation failed");
          return ptr::null_mut();
        }
      };

      let destination = Block::payload(moved);
      ptr::copy_nonoverlapping(address, destination, capacity);
      (*block).is_free = true;

      tracing::trace!(size, from = ?address, to = ?destination, "moved block to the end of the heap");

      destination
    }
  }

  /// Allocates `count * size` bytes and zeroes the whole block, including
  /// any capacity beyond the request. The multiplication is not checked for
  /// overflow.
  ///
  /// # Safety
  ///
  /// Same as [`FitAllocator::allocate`].
  pub unsafe fn zero_allocate(
    &mut self,
    count: usize,
    size: usize,
  ) -> *mut u8 {
    unsafe {
      let address = self.allocate(count.wrapping_mul(size));

      if address.is_null() {
        return address;
      }

      let block = Block::from_payload(address);
      address.write_bytes(0, (*block).size);

      address
    }
  }

  /// Cuts `block` down to `size` bytes and turns the rest into a new free
  /// block right after it. Does nothing unless more than a header's worth of
  /// bytes would be left over.
  unsafe fn split(
    &mut self,
    block: *mut Block,
    size: usize,
  ) -> bool {
    unsafe {
      let leftover = (*block).size - size;

      if leftover <= HEADER_SIZE {
        return false;
      }

      let remainder = Block::write(
        Block::payload(block).add(size),
        Block::new(leftover - HEADER_SIZE, true, (*block).next),
      );

      (*block).size = size;
      (*block).next = remainder;

      if block == self.last {
        self.last = remainder;
      }

      self.stats.blocks += 1;

      true
    }
  }

  /// One left to right pass merging every free block into a free
  /// predecessor that ends right where it starts.
  unsafe fn coalesce(&mut self) {
    unsafe {
      let mut current = self.first;

      while !current.is_null() {
        let next = (*current).next;

        if (*current).is_free
          && !next.is_null()
          && (*next).is_free
          && Block::end(current) == next.cast::<u8>()
        {
          (*current).size = (*current).size + (*next).size + HEADER_SIZE;
          (*current).next = (*next).next;

          if next == self.last {
            self.last = current;
          }
          if next == self.cursor {
            self.cursor = current;
          }

          self.stats.coalesces += 1;
          self.stats.blocks -= 1;

          tracing::trace!(size = { (*current).size }, "coalesced free blocks");
        }

        current = (*current).next;
      }
    }
  }
}
