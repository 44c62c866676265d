use core::ptr::NonNull;

#[cfg(any(target_os = "linux", target_os = "macos"))]
use crate::unix::UNIX_SYSTEM;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysError {
  Unsupported,
  OutOfMemory,
  InvalidArgument,
}

pub type SysResult<T> = Result<T, SysError>;

/// The mapping capability slabs are carved from.
///
/// # Safety
///
/// Implementors must ensure that:
/// - `reserve` returns page-aligned, zero-initialized, read/write memory
///   whose address stays fixed until it is released
/// - `release` only operates on memory previously reserved by this system
/// - Memory is not handed out twice while it is still reserved
pub unsafe trait System
where
  Self: Send + Sync,
{
  /// Reserves `len` bytes of fresh memory.
  ///
  /// # Safety
  ///
  /// Caller must ensure `len` is page-aligned and that the returned memory
  /// is eventually given back through `release` with the same length.
  unsafe fn reserve<'mem>(&self, len: usize) -> SysResult<&'mem mut [u8]> {
    _ = len;
    Err(SysError::Unsupported)
  }

  /// Releases a region previously returned by `reserve`.
  ///
  /// # Safety
  ///
  /// Caller must ensure `base`/`len` describe exactly one reserved region,
  /// and that nothing reads or writes it after this call.
  unsafe fn release(&self, base: NonNull<u8>, len: usize) -> SysResult<()> {
    _ = (base, len);
    Err(SysError::Unsupported)
  }
}

pub struct UnsupportedSystem {}
unsafe impl System for UnsupportedSystem {}

#[cfg(any(target_os = "linux", target_os = "macos"))]
pub static GLOBAL_SYSTEM: &dyn System = &UNIX_SYSTEM;

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub static GLOBAL_SYSTEM: &dyn System = &UnsupportedSystem {};
