use core::fmt;

use getset::CopyGetters;

/// Identity of one slab: the base address of its mapping plus the
/// generation it was created in. Pools sort slabs by `addr` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct SlabAddr {
  addr: usize,
  epoch: u64,
}

impl SlabAddr {
  pub(crate) const fn new(addr: usize, epoch: u64) -> Self {
    Self { addr, epoch }
  }
}

impl fmt::Display for SlabAddr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:#x}@{}", self.addr, self.epoch)
  }
}

/// Address of a stored object's first byte, tagged with the generation of
/// the slab holding it. A handle whose slab was deleted (or whose address
/// was later reused by a newer slab) no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct ObjAddr {
  addr: usize,
  epoch: u64,
}

impl ObjAddr {
  pub(crate) const fn new(addr: usize, epoch: u64) -> Self {
    Self { addr, epoch }
  }

  #[inline(always)]
  pub fn as_ptr(&self) -> *const u8 {
    self.addr as *const u8
  }
}

impl fmt::Display for ObjAddr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:#x}@{}", self.addr, self.epoch)
  }
}
