use std::{marker::PhantomData, mem};

/// Metadata written right before every payload handed out by the allocator.
///
/// ```text
/// +-------------+
/// |    Block    | <- header, HEADER_SIZE bytes
/// +-------------+
/// |   Payload   | <- `size` bytes, the address returned to callers
/// +-------------+
/// |    Block    | <- header of the next block in the list
/// +-------------+
/// ```
///
/// Packed to 4 bytes so that a header living on any 4-byte boundary can be
/// read and written through a plain `*mut Block`.
#[repr(C, packed(4))]
pub(crate) struct Block {
  pub size: usize,
  pub next: *mut Block,
  pub is_free: bool,
}

/// Bytes taken by a [`Block`] header. A multiple of 4, so payloads stay
/// aligned whenever headers are.
pub const HEADER_SIZE: usize = mem::size_of::<Block>();

const _: () = assert!(HEADER_SIZE % crate::align::ALIGNMENT == 0);

impl Block {
  pub fn new(
    size: usize,
    is_free: bool,
    next: *mut Block,
  ) -> Self {
    Self { size, next, is_free }
  }

  /// Writes a fresh header at `address` and returns it as a block.
  ///
  /// # Safety
  ///
  /// `address` must be 4-byte aligned and valid for `HEADER_SIZE` bytes.
  pub unsafe fn write(
    address: *mut u8,
    block: Block,
  ) -> *mut Block {
    let header = address.cast::<Block>();
    unsafe { header.write(block) };
    header
  }

  /// Returns the header that precedes `payload`.
  ///
  /// # Safety
  ///
  /// `payload` must be an address previously returned by [`Block::payload`].
  pub unsafe fn from_payload(payload: *mut u8) -> *mut Block {
    unsafe { payload.sub(HEADER_SIZE) }.cast()
  }

  /// Returns the first payload byte of `block`.
  ///
  /// # Safety
  ///
  /// `block` must point to a valid header.
  pub unsafe fn payload(block: *mut Block) -> *mut u8 {
    unsafe { block.cast::<u8>().add(HEADER_SIZE) }
  }

  /// Address one past the last payload byte of `block`. The next block in
  /// memory, if any, starts here.
  ///
  /// # Safety
  ///
  /// `block` must point to a valid header.
  pub unsafe fn end(block: *mut Block) -> *mut u8 {
    unsafe { Self::payload(block).add((*block).size) }
  }
}

/// Read-only view of one block, as yielded by [`Blocks`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
  /// Payload address, the pointer callers see.
  pub address: *mut u8,
  /// Payload capacity in bytes.
  pub size: usize,
  pub is_free: bool,
}

/// Walks the block list in address order.
#[derive(Debug)]
pub struct Blocks<'a> {
  current: *mut Block,
  marker: PhantomData<&'a ()>,
}

impl Blocks<'_> {
  pub(crate) fn new(first: *mut Block) -> Self {
    Self {
      current: first,
      marker: PhantomData,
    }
  }
}

impl Iterator for Blocks<'_> {
  type Item = BlockInfo;

  fn next(&mut self) -> Option<BlockInfo> {
    if self.current.is_null() {
      return None;
    }

    // SAFETY: every non-null link in the list points at a header owned by
    // the allocator that created this iterator.
    unsafe {
      let block = self.current;
      self.current = (*block).next;

      Some(BlockInfo {
        address: Block::payload(block),
        size: (*block).size,
        is_free: (*block).is_free,
      })
    }
  }
}
