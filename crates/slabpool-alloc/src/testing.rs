use core::{
  ptr::NonNull,
  sync::atomic::{
    AtomicBool,
    AtomicPtr,
    AtomicUsize,
    Ordering,
  },
};

use slabpool_sys::{
  system::{
    SysError,
    SysResult,
    System,
  },
  unix::UNIX_SYSTEM,
};

pub fn init_logger() {
  let _ = env_logger::builder().is_test(true).try_init();
}

/// Maps through the real system until its reserve budget runs out, and can
/// be told to refuse releases.
pub struct FlakySystem {
  reserves_left: AtomicUsize,
  fail_release: AtomicBool,
  releases: AtomicUsize,
}

impl FlakySystem {
  pub const fn new(reserves: usize) -> Self {
    Self {
      reserves_left: AtomicUsize::new(reserves),
      fail_release: AtomicBool::new(false),
      releases: AtomicUsize::new(0),
    }
  }

  pub fn fail_releases(&self, fail: bool) {
    self.fail_release.store(fail, Ordering::SeqCst);
  }

  pub fn releases(&self) -> usize {
    self.releases.load(Ordering::SeqCst)
  }
}

unsafe impl System for FlakySystem {
  unsafe fn reserve<'mem>(&self, len: usize) -> SysResult<&'mem mut [u8]> {
    self
      .reserves_left
      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
      .map_err(|_| SysError::OutOfMemory)?;
    unsafe { UNIX_SYSTEM.reserve(len) }
  }

  unsafe fn release(&self, base: NonNull<u8>, len: usize) -> SysResult<()> {
    self.releases.fetch_add(1, Ordering::SeqCst);
    if self.fail_release.load(Ordering::SeqCst) {
      return Err(SysError::InvalidArgument);
    }
    unsafe { UNIX_SYSTEM.release(base, len) }
  }
}

/// Hands out the same mapping on every reserve.
pub struct EchoSystem {
  base: AtomicPtr<u8>,
}

impl EchoSystem {
  pub const fn new() -> Self {
    Self {
      base: AtomicPtr::new(core::ptr::null_mut()),
    }
  }
}

unsafe impl System for EchoSystem {
  unsafe fn reserve<'mem>(&self, len: usize) -> SysResult<&'mem mut [u8]> {
    let mut base = self.base.load(Ordering::SeqCst);
    if base.is_null() {
      base = unsafe { UNIX_SYSTEM.reserve(len) }?.as_mut_ptr();
      self.base.store(base, Ordering::SeqCst);
    }
    Ok(unsafe { core::slice::from_raw_parts_mut(base, len) })
  }

  unsafe fn release(&self, base: NonNull<u8>, len: usize) -> SysResult<()> {
    self.base.store(core::ptr::null_mut(), Ordering::SeqCst);
    unsafe { UNIX_SYSTEM.release(base, len) }
  }
}
