#![cfg_attr(not(test), no_std)]

use core::{
  mem::ManuallyDrop,
  ops::Range,
  ptr::NonNull,
};

use slabpool_sys::{
  prim::{
    PrimError,
    page_align,
  },
  system::{
    SysError,
    System,
  },
};

#[derive(Debug)]
pub enum RegionError {
  SystemError(SysError),
  PrimError(PrimError),
  Empty,
  OutOfBounds,
}

pub type RegionResult<T> = Result<T, RegionError>;

/// One reserved mapping. The backing memory is given back exactly once:
/// through [`Region::release`] when the owner wants to hear about failure,
/// otherwise when the region is dropped.
pub struct Region {
  base: NonNull<u8>,
  len: usize,
  system: &'static dyn System,
}

impl Region {
  /// Reserves at least `size` bytes, rounded up to whole pages.
  pub fn new(size: usize, system: &'static dyn System) -> RegionResult<Region> {
    if size == 0 {
      return Err(RegionError::Empty);
    }

    let len = page_align(size).map_err(RegionError::PrimError)?;
    let slice = unsafe { system.reserve(len) }.map_err(RegionError::SystemError)?;
    let base = NonNull::new(slice.as_mut_ptr()).ok_or(RegionError::SystemError(SysError::OutOfMemory))?;

    Ok(Region { base, len, system })
  }

  #[inline(always)]
  pub fn base(&self) -> NonNull<u8> {
    self.base
  }

  #[inline(always)]
  pub fn addr(&self) -> usize {
    self.base.as_ptr() as usize
  }

  #[inline(always)]
  pub fn len(&self) -> usize {
    self.len
  }

  #[inline(always)]
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  #[inline]
  pub fn contains(&self, addr: usize) -> bool {
    addr >= self.addr() && addr - self.addr() < self.len
  }

  pub fn check(&self, range: &Range<usize>) -> RegionResult<()> {
    if range.start > range.end || range.end > self.len {
      return Err(RegionError::OutOfBounds);
    }
    Ok(())
  }

  pub fn slice(&self, range: Range<usize>) -> RegionResult<&[u8]> {
    self.check(&range)?;
    Ok(unsafe { core::slice::from_raw_parts(self.base.as_ptr().add(range.start), range.len()) })
  }

  pub fn slice_mut(&mut self, range: Range<usize>) -> RegionResult<&mut [u8]> {
    self.check(&range)?;
    Ok(unsafe { core::slice::from_raw_parts_mut(self.base.as_ptr().add(range.start), range.len()) })
  }

  /// Gives the mapping back. On failure the mapping is leaked, never
  /// released a second time.
  pub fn release(self) -> RegionResult<()> {
    let this = ManuallyDrop::new(self);
    unsafe { this.system.release(this.base, this.len) }.map_err(RegionError::SystemError)
  }
}

impl Drop for Region {
  fn drop(&mut self) {
    if let Err(err) = unsafe { self.system.release(self.base, self.len) } {
      log::warn!("leaking region {:#x}+{}: {:?}", self.addr(), self.len, err);
    }
  }
}

unsafe impl Send for Region {}
unsafe impl Sync for Region {}

#[cfg(test)]
mod tests;
