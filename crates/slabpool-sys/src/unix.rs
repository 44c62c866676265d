#[cfg(any(target_os = "linux", target_os = "macos"))]
use core::ptr::NonNull;

#[cfg(any(target_os = "linux", target_os = "macos"))]
use crate::{
  prim::is_page_aligned,
  system::{
    SysError,
    SysResult,
    System,
  },
};

pub struct UnixSystem {}

#[cfg(any(target_os = "linux", target_os = "macos"))]
pub static UNIX_SYSTEM: UnixSystem = UnixSystem {};

#[cfg(any(target_os = "linux", target_os = "macos"))]
impl UnixSystem {
  const fn prot() -> i32 {
    libc::PROT_READ | libc::PROT_WRITE
  }

  // Anonymous private mappings come back zero-filled.
  const fn flags() -> i32 {
    libc::MAP_PRIVATE | libc::MAP_ANONYMOUS
  }
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
unsafe impl System for UnixSystem {
  unsafe fn reserve<'mem>(&self, len: usize) -> SysResult<&'mem mut [u8]> {
    if len == 0 || is_page_aligned(len) != Ok(true) {
      return Err(SysError::InvalidArgument);
    }

    let ptr = unsafe { libc::mmap(core::ptr::null_mut(), len, Self::prot(), Self::flags(), -1, 0) };

    match ptr {
      libc::MAP_FAILED => Err(SysError::OutOfMemory),
      _ => Ok(unsafe { core::slice::from_raw_parts_mut(ptr as *mut u8, len) }),
    }
  }

  unsafe fn release(&self, base: NonNull<u8>, len: usize) -> SysResult<()> {
    let result = unsafe { libc::munmap(base.as_ptr() as *mut libc::c_void, len) };
    if result == 0 {
      return Ok(());
    }

    Err(SysError::InvalidArgument)
  }
}
