//! `malloc`, `free`, `realloc` and `calloc` exported with the C ABI, for
//! loading the allocator into an unmodified program:
//!
//! ```text
//! cargo build --release --features preload,next-fit
//! LD_PRELOAD=target/release/libfitalloc.so ./program
//! ```
//!
//! All four functions share one [`FitAllocator`] on top of the process break.
//! The search mode is picked with the `best-fit`, `worst-fit` and `next-fit`
//! features and defaults to first fit. Statistics are printed to stdout when
//! the process exits.
//!
//! None of this is thread safe.

use std::{
  cell::UnsafeCell,
  ffi::c_void,
  sync::atomic::{AtomicBool, Ordering},
};

use crate::{FitAllocator, SearchMode};

const MODE: SearchMode = if cfg!(feature = "next-fit") {
  SearchMode::NextFit
} else if cfg!(feature = "worst-fit") {
  SearchMode::WorstFit
} else if cfg!(feature = "best-fit") {
  SearchMode::BestFit
} else {
  SearchMode::FirstFit
};

struct GlobalHeap(UnsafeCell<FitAllocator>);

// SAFETY: callers of the exported functions promise not to race each other.
unsafe impl Sync for GlobalHeap {}

static HEAP: GlobalHeap = GlobalHeap(UnsafeCell::new(FitAllocator::new(MODE)));

static REPORT_REGISTERED: AtomicBool = AtomicBool::new(false);

unsafe fn heap() -> &'static mut FitAllocator {
  unsafe { &mut *HEAP.0.get() }
}

extern "C" fn print_statistics() {
  let mut buffer = [0u8; 512];
  let stats = unsafe { *heap().stats() };
  let length = stats.render(&mut buffer);

  unsafe {
    // Exit handlers run before stdio is flushed; the report goes last.
    libc::fflush(std::ptr::null_mut());
    libc::write(libc::STDOUT_FILENO, buffer.as_ptr().cast(), length);
  }
}

/// Arranges for the statistics to be printed at exit, once.
fn register_report() {
  if !REPORT_REGISTERED.swap(true, Ordering::Relaxed) {
    unsafe { libc::atexit(print_statistics) };
  }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn malloc(size: usize) -> *mut c_void {
  register_report();

  unsafe { heap().allocate(size).cast() }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn free(ptr: *mut c_void) {
  unsafe { heap().release(ptr.cast()) }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn realloc(
  ptr: *mut c_void,
  size: usize,
) -> *mut c_void {
  unsafe {
    if ptr.is_null() {
      return malloc(size);
    }

    heap().reallocate(ptr.cast(), size).cast()
  }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn calloc(
  count: usize,
  size: usize,
) -> *mut c_void {
  register_report();

  unsafe { heap().zero_allocate(count, size).cast() }
}
