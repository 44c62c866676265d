use core::sync::atomic::{
  AtomicUsize,
  Ordering,
};

use slabpool_sys::{
  GLOBAL_SYSTEM,
  prim::page_size,
  system::SysResult,
  unix::UNIX_SYSTEM,
};

use super::*;

struct CountingSystem {
  releases: AtomicUsize,
  fail_release: bool,
}

unsafe impl System for CountingSystem {
  unsafe fn reserve<'mem>(&self, len: usize) -> SysResult<&'mem mut [u8]> {
    unsafe { UNIX_SYSTEM.reserve(len) }
  }

  unsafe fn release(&self, base: NonNull<u8>, len: usize) -> SysResult<()> {
    self.releases.fetch_add(1, Ordering::SeqCst);
    if self.fail_release {
      return Err(SysError::InvalidArgument);
    }
    unsafe { UNIX_SYSTEM.release(base, len) }
  }
}

#[test]
fn test_region_new_rounds_to_pages() {
  let ps = page_size();
  let region = Region::new(1, GLOBAL_SYSTEM).unwrap();
  assert_eq!(region.len(), ps);
  assert_eq!(region.addr() % ps, 0);

  let region = Region::new(ps + 1, GLOBAL_SYSTEM).unwrap();
  assert_eq!(region.len(), ps * 2);
}

#[test]
fn test_region_zero_size() {
  assert!(matches!(Region::new(0, GLOBAL_SYSTEM), Err(RegionError::Empty)));
}

#[test]
fn test_region_slices() {
  let ps = page_size();
  let mut region = Region::new(ps, GLOBAL_SYSTEM).unwrap();

  assert!(region.slice(0..ps).unwrap().iter().all(|&b| b == 0));

  region.slice_mut(10..14).unwrap().copy_from_slice(b"abcd");
  assert_eq!(region.slice(10..14).unwrap(), b"abcd");
  assert_eq!(region.slice(ps - 1..ps).unwrap().len(), 1);
}

#[test]
fn test_region_check_invalid() {
  let ps = page_size();
  let region = Region::new(ps, GLOBAL_SYSTEM).unwrap();

  assert!(matches!(region.check(&(0..ps + 1)), Err(RegionError::OutOfBounds)));
  #[allow(clippy::reversed_empty_ranges)]
  let reversed = 100..50;
  assert!(matches!(region.check(&reversed), Err(RegionError::OutOfBounds)));
  assert!(matches!(region.slice(ps..ps + 2), Err(RegionError::OutOfBounds)));
}

#[test]
fn test_region_contains() {
  let ps = page_size();
  let region = Region::new(ps, GLOBAL_SYSTEM).unwrap();
  let base = region.addr();

  assert!(region.contains(base));
  assert!(region.contains(base + ps - 1));
  assert!(!region.contains(base + ps));
  assert!(!region.contains(base - 1));
}

#[test]
fn test_region_release_once() {
  static SYSTEM: CountingSystem = CountingSystem {
    releases: AtomicUsize::new(0),
    fail_release: false,
  };

  let region = Region::new(page_size(), &SYSTEM).unwrap();
  assert!(region.release().is_ok());
  assert_eq!(SYSTEM.releases.load(Ordering::SeqCst), 1);

  let region = Region::new(page_size(), &SYSTEM).unwrap();
  drop(region);
  assert_eq!(SYSTEM.releases.load(Ordering::SeqCst), 2);
}

#[test]
fn test_region_release_failure_leaks() {
  static SYSTEM: CountingSystem = CountingSystem {
    releases: AtomicUsize::new(0),
    fail_release: true,
  };

  let region = Region::new(page_size(), &SYSTEM).unwrap();
  assert!(matches!(
    region.release(),
    Err(RegionError::SystemError(SysError::InvalidArgument))
  ));
  assert_eq!(SYSTEM.releases.load(Ordering::SeqCst), 1);
}
