/// Every block size is a multiple of this many bytes.
pub const ALIGNMENT: usize = 4;

/// Rounds the given size up to the next multiple of [`ALIGNMENT`].
///
/// The addition wraps, so sizes within three bytes of `usize::MAX` align to
/// zero and are treated as empty requests.
///
/// # Examples
///
/// ```rust
/// use fitalloc::align;
///
/// assert_eq!(align!(0usize), 0);
/// assert_eq!(align!(1usize), 4);
/// assert_eq!(align!(13usize), 16);
/// assert_eq!(align!(16usize), 16);
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value).wrapping_add($crate::align::ALIGNMENT - 1) & !($crate::align::ALIGNMENT - 1)
  };
}
