use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::block::Block;

/// Which free block satisfies a request when more than one could.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SearchMode {
  /// The first free block large enough, in address order.
  #[default]
  FirstFit,
  /// The smallest free block large enough. Ties go to the lowest address.
  BestFit,
  /// The largest free block. Ties go to the lowest address.
  WorstFit,
  /// Like [`SearchMode::FirstFit`], but resumes where the previous search
  /// stopped and wraps around to the start of the heap.
  NextFit,
}

impl SearchMode {
  pub const ALL: [SearchMode; 4] = [
    SearchMode::FirstFit,
    SearchMode::BestFit,
    SearchMode::WorstFit,
    SearchMode::NextFit,
  ];

  pub fn name(self) -> &'static str {
    match self {
      SearchMode::FirstFit => "first-fit",
      SearchMode::BestFit => "best-fit",
      SearchMode::WorstFit => "worst-fit",
      SearchMode::NextFit => "next-fit",
    }
  }

  /// Looks for a free block of at least `size` bytes in the list starting at
  /// `first`. Returns null if there is none.
  ///
  /// `cursor` is only used by [`SearchMode::NextFit`]: the scan starts there
  /// and leaves it on the last block examined before the returned one.
  ///
  /// # Safety
  ///
  /// `first` and `cursor` must be null or point into a valid block list.
  pub(crate) unsafe fn find(
    self,
    first: *mut Block,
    cursor: &mut *mut Block,
    size: usize,
  ) -> *mut Block {
    unsafe {
      match self {
        SearchMode::FirstFit => first_fit(first, size),
        SearchMode::BestFit => extreme_fit(first, size, |candidate, best| candidate < best),
        SearchMode::WorstFit => extreme_fit(first, size, |candidate, best| candidate > best),
        SearchMode::NextFit => next_fit(first, cursor, size),
      }
    }
  }
}

unsafe fn fits(
  block: *mut Block,
  size: usize,
) -> bool {
  unsafe { (*block).is_free && (*block).size >= size }
}

unsafe fn first_fit(
  first: *mut Block,
  size: usize,
) -> *mut Block {
  unsafe {
    let mut current = first;

    while !current.is_null() && !fits(current, size) {
      current = (*current).next;
    }

    current
  }
}

/// Scans the whole list and keeps the candidate for which `better(candidate,
/// best)` held last. Strict comparisons keep the earliest block on ties.
unsafe fn extreme_fit(
  first: *mut Block,
  size: usize,
  better: impl Fn(usize, usize) -> bool,
) -> *mut Block {
  unsafe {
    let mut best: *mut Block = std::ptr::null_mut();
    let mut current = first;

    while !current.is_null() {
      if fits(current, size) && (best.is_null() || better((*current).size, (*best).size)) {
        best = current;
      }
      current = (*current).next;
    }

    best
  }
}

unsafe fn next_fit(
  first: *mut Block,
  cursor: &mut *mut Block,
  size: usize,
) -> *mut Block {
  unsafe {
    let mut current = if cursor.is_null() { first } else { *cursor };

    while !current.is_null() && !fits(current, size) {
      *cursor = current;
      current = (*current).next;
    }

    if current.is_null() {
      current = first;

      while !current.is_null() && !fits(current, size) {
        *cursor = current;
        current = (*current).next;
      }
    }

    current
  }
}

impl fmt::Display for SearchMode {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.name())
  }
}

#[derive(Debug, Error)]
#[error("unknown search mode {0:?}, expected one of first-fit, best-fit, worst-fit, next-fit")]
pub struct ParseSearchModeError(String);

impl FromStr for SearchMode {
  type Err = ParseSearchModeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized = s.trim().to_ascii_lowercase().replace('_', "-");

    SearchMode::ALL
      .into_iter()
      .find(|mode| mode.name() == normalized || mode.name().replace('-', "") == normalized)
      .ok_or_else(|| ParseSearchModeError(s.to_owned()))
  }
}
