use std::{io, ptr::NonNull};

use libc::{c_void, intptr_t, sbrk};

use crate::{align::ALIGNMENT, error::HeapError};

/// Where the allocator gets fresh memory from.
///
/// A source behaves like a program break: each call to [`HeapSource::extend`]
/// hands out `increment` new bytes, and consecutive calls return consecutive
/// memory unless somebody else moved the break in between. The allocator
/// checks that property itself, so sources only need to report what they got.
pub trait HeapSource {
  /// Extends the heap by `increment` bytes and returns the first new byte.
  /// The returned address is 4-byte aligned.
  ///
  /// # Safety
  ///
  /// The returned memory belongs to the caller until the source is dropped.
  /// Implementations never give memory back, so callers must not assume
  /// anything about addresses handed out by other users of the same source.
  unsafe fn extend(
    &mut self,
    increment: usize,
  ) -> Result<NonNull<u8>, HeapError>;
}

/// The process data segment, extended with `sbrk(2)`.
///
/// There is only one program break per process, so every allocator built on
/// [`Sbrk`] shares it with the C library and with each other.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sbrk;

impl HeapSource for Sbrk {
  unsafe fn extend(
    &mut self,
    increment: usize,
  ) -> Result<NonNull<u8>, HeapError> {
    unsafe {
      let current = sbrk(0) as usize;
      let padding = current.wrapping_neg() & (ALIGNMENT - 1);

      let total = increment
        .checked_add(padding)
        .and_then(|total| intptr_t::try_from(total).ok())
        .ok_or(HeapError::OutOfMemory { requested: increment })?;

      let address = sbrk(total);

      if address == usize::MAX as *mut c_void {
        return Err(HeapError::OutOfMemory { requested: increment });
      }

      let start = address.cast::<u8>().add(padding);
      NonNull::new(start).ok_or(HeapError::OutOfMemory { requested: increment })
    }
  }
}

/// One anonymous `mmap(2)` reservation handed out front to back, like a
/// private program break with a hard ceiling.
///
/// Each allocator built on its own region has a heap nobody else can grow, so
/// growth is always contiguous. The mapping is released when the region is
/// dropped.
#[derive(Debug)]
pub struct MappedRegion {
  base: NonNull<u8>,
  capacity: usize,
  brk: usize,
}

impl MappedRegion {
  /// Reserves `capacity` bytes, rounded up to the page size.
  pub fn new(capacity: usize) -> Result<Self, HeapError> {
    let page_size = page_size();
    let capacity = capacity
      .checked_next_multiple_of(page_size)
      .ok_or(HeapError::OutOfMemory { requested: capacity })?
      .max(page_size);

    // Memory protection. Read-Write only.
    let protection = libc::PROT_READ | libc::PROT_WRITE;
    // Private to this process and not backed by any file.
    let flags = libc::MAP_PRIVATE | libc::MAP_ANONYMOUS;

    let address = unsafe { libc::mmap(std::ptr::null_mut(), capacity, protection, flags, -1, 0) };

    if address == libc::MAP_FAILED {
      return Err(HeapError::Map(io::Error::last_os_error()));
    }

    let base = NonNull::new(address.cast::<u8>()).ok_or(HeapError::OutOfMemory { requested: capacity })?;

    tracing::debug!(capacity, base = ?base, "mapped heap region");

    Ok(Self {
      base,
      capacity,
      brk: 0,
    })
  }

  /// Total bytes reserved.
  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Bytes not handed out yet.
  pub fn remaining(&self) -> usize {
    self.capacity - self.brk
  }
}

impl HeapSource for MappedRegion {
  unsafe fn extend(
    &mut self,
    increment: usize,
  ) -> Result<NonNull<u8>, HeapError> {
    if increment > self.remaining() {
      return Err(HeapError::OutOfMemory { requested: increment });
    }

    // SAFETY: `brk + increment <= capacity`, so the offset stays inside the mapping.
    let start = unsafe { self.base.add(self.brk) };
    self.brk += increment;

    Ok(start)
  }
}

impl Drop for MappedRegion {
  fn drop(&mut self) {
    unsafe {
      if libc::munmap(self.base.as_ptr().cast(), self.capacity) != 0 {
        tracing::warn!(error = %io::Error::last_os_error(), "failed to unmap heap region");
      }
    }
  }
}

fn page_size() -> usize {
  match unsafe { libc::sysconf(libc::_SC_PAGESIZE) } {
    size if size > 0 => size as usize,
    _ => 4096,
  }
}
