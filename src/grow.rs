use std::ptr;

use crate::{
  allocator::FitAllocator,
  block::{Block, HEADER_SIZE},
  error::HeapError,
  source::HeapSource,
};

impl<S: HeapSource> FitAllocator<S> {
  /// Appends a new in-use block of `size` payload bytes after the current
  /// tail. Nothing in the list changes unless the heap source succeeds.
  pub(crate) unsafe fn grow_heap(
    &mut self,
    size: usize,
  ) -> Result<*mut Block, HeapError> {
    unsafe {
      let increment = HEADER_SIZE
        .checked_add(size)
        .ok_or(HeapError::OutOfMemory { requested: size })?;

      let address = self.claim(increment)?;
      let block = Block::write(address, Block::new(size, false, ptr::null_mut()));

      if self.first.is_null() {
        self.first = block;
        self.cursor = block;
      } else {
        (*self.last).next = block;
      }
      self.last = block;

      self.stats.grows += 1;
      self.stats.blocks += 1;
      self.stats.max_heap += size;

      tracing::trace!(size, address = ?address, "grew heap with a new block");

      Ok(block)
    }
  }

  /// Grows the tail block by `additional` bytes without moving it. Fails with
  /// [`HeapError::Discontiguous`] if the new bytes don't start right where the
  /// tail's payload ends.
  pub(crate) unsafe fn extend_tail(
    &mut self,
    additional: usize,
  ) -> Result<(), HeapError> {
    unsafe {
      let tail = self.last;
      let expected = Block::end(tail);
      let address = self.claim(additional)?;

      if address != expected {
        return Err(HeapError::Discontiguous {
          expected: expected as usize,
          found: address as usize,
        });
      }

      (*tail).size = (*tail).size + additional;

      self.stats.grows += 1;
      self.stats.max_heap += additional;

      tracing::trace!(additional, size = { (*tail).size }, "extended tail block in place");

      Ok(())
    }
  }

  /// Takes `increment` bytes from the heap source. Memory below the current
  /// top would break address ordering, so it is refused.
  unsafe fn claim(
    &mut self,
    increment: usize,
  ) -> Result<*mut u8, HeapError> {
    unsafe {
      let address = self.source.extend(increment)?.as_ptr();

      if address < self.top {
        tracing::warn!(
          expected = ?self.top,
          found = ?address,
          "heap source returned memory below the top of the heap"
        );
        return Err(HeapError::Discontiguous {
          expected: self.top as usize,
          found: address as usize,
        });
      }

      if !self.top.is_null() && address != self.top {
        tracing::warn!(
          gap = address as usize - self.top as usize,
          "heap grew discontiguously, blocks across the gap will not coalesce"
        );
      }

      self.top = address.add(increment);

      Ok(address)
    }
  }
}
