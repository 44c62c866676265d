use core::ops::Range;

use getset::CopyGetters;
use slabpool_bitmap::{
  Bitmap,
  BitmapError,
  BitmapView,
  BitmapWord,
};
use slabpool_region::{
  Region,
  RegionError,
};
use slabpool_sys::system::System;

use crate::{
  config::{
    PoolConfig,
    SlabLayout,
  },
  handle::{
    ObjAddr,
    SlabAddr,
  },
};

#[derive(Debug)]
pub enum SlabError {
  RegionError(RegionError),
  BitmapError(BitmapError),
  SizeMismatch { expected: usize, got: usize },
  Full,
  Vacant(usize),
}

pub type SlabResult<T> = Result<T, SlabError>;

/// A single mapping of `capacity` equal-sized slots. The occupancy bitmap
/// sits at the head of the mapping and the slots follow it, so the mapping
/// never moves and slot addresses stay valid until the slab is released.
#[derive(CopyGetters)]
pub struct Slab {
  region: Region,
  layout: SlabLayout,
  #[getset(get_copy = "pub")]
  obj_size: usize,
  #[getset(get_copy = "pub")]
  capacity: usize,
  #[getset(get_copy = "pub")]
  epoch: u64,
}

impl Slab {
  pub fn new(config: &PoolConfig, epoch: u64, system: &'static dyn System) -> SlabResult<Slab> {
    let region = Region::new(config.slab_len(), system).map_err(SlabError::RegionError)?;
    Self::from_region(config, epoch, region)
  }

  /// Lays a slab over an already reserved mapping and clears its bitmap.
  pub fn from_region(config: &PoolConfig, epoch: u64, region: Region) -> SlabResult<Slab> {
    let layout = config.layout();
    region
      .check(&(0..layout.total_len()))
      .map_err(SlabError::RegionError)?;

    let slab = Self {
      region,
      layout,
      obj_size: config.obj_len(),
      capacity: config.objs_per_slab(),
      epoch,
    };
    Bitmap::zero(slab.words(), slab.capacity).map_err(SlabError::BitmapError)?;

    Ok(slab)
  }

  fn words(&self) -> &[BitmapWord] {
    // SAFETY: the mapping is page-aligned and its first `header_len` bytes
    // are reserved for exactly this many words.
    unsafe {
      core::slice::from_raw_parts(
        self.region.base().as_ptr() as *const BitmapWord,
        Bitmap::words(self.capacity),
      )
    }
  }

  // Writable occupancy. Only `add_obj` and `remove_obj` flip bits, and both
  // hold `&mut self`.
  #[inline]
  fn occupancy(&self) -> Bitmap<'_> {
    Bitmap::within(self.words(), self.capacity)
  }

  #[inline]
  pub fn bitmap(&self) -> BitmapView<'_> {
    self.occupancy().view()
  }

  #[inline(always)]
  pub fn addr(&self) -> SlabAddr {
    SlabAddr::new(self.region.addr(), self.epoch)
  }

  /// Base address of the mapping; the pool's sort key.
  #[inline(always)]
  pub fn base(&self) -> usize {
    self.region.addr()
  }

  /// Mapped length, bookkeeping included.
  #[inline(always)]
  pub fn total_len(&self) -> usize {
    self.region.len()
  }

  #[inline(always)]
  pub fn contains(&self, addr: usize) -> bool {
    self.region.contains(addr)
  }

  fn slot_range(&self, idx: usize) -> Range<usize> {
    let start = self.layout.slot_offset(self.obj_size, idx);
    start..start + self.obj_size
  }

  pub fn obj_addr(&self, idx: usize) -> Option<ObjAddr> {
    if idx >= self.capacity {
      return None;
    }
    let addr = self.region.addr() + self.layout.slot_offset(self.obj_size, idx);
    Some(ObjAddr::new(addr, self.epoch))
  }

  /// Slot index whose first byte is `addr`.
  pub fn slot_of(&self, addr: usize) -> Option<usize> {
    let offset = addr
      .checked_sub(self.region.addr())?
      .checked_sub(self.layout.header_len())?;
    if offset % self.obj_size != 0 {
      return None;
    }

    let idx = offset / self.obj_size;
    (idx < self.capacity).then_some(idx)
  }

  /// Bytes of slot `idx`, occupied or not.
  pub fn obj(&self, idx: usize) -> Option<&[u8]> {
    if idx >= self.capacity {
      return None;
    }
    self.region.slice(self.slot_range(idx)).ok()
  }

  #[inline]
  pub fn is_occupied(&self, idx: usize) -> bool {
    self.bitmap().get(idx).unwrap_or(false)
  }

  pub fn add_obj(&mut self, bytes: &[u8]) -> SlabResult<ObjAddr> {
    if bytes.len() != self.obj_size {
      return Err(SlabError::SizeMismatch {
        expected: self.obj_size,
        got: bytes.len(),
      });
    }

    let idx = self.bitmap().find_fc().ok_or(SlabError::Full)?;
    let range = self.slot_range(idx);
    self
      .region
      .slice_mut(range)
      .map_err(SlabError::RegionError)?
      .copy_from_slice(bytes);
    self.occupancy().set(idx).map_err(SlabError::BitmapError)?;

    log::trace!("slab {} slot {} <- {} bytes", self.addr(), idx, bytes.len());
    Ok(ObjAddr::new(
      self.region.addr() + self.layout.slot_offset(self.obj_size, idx),
      self.epoch,
    ))
  }

  /// Frees slot `idx` and zeroes its bytes.
  pub fn remove_obj(&mut self, idx: usize) -> SlabResult<()> {
    if !self.bitmap().get(idx).map_err(SlabError::BitmapError)? {
      return Err(SlabError::Vacant(idx));
    }

    let range = self.slot_range(idx);
    self
      .region
      .slice_mut(range)
      .map_err(SlabError::RegionError)?
      .fill(0);
    self.occupancy().clear(idx).map_err(SlabError::BitmapError)
  }

  /// Occupied slots in ascending index order.
  pub fn occupied(&self) -> impl Iterator<Item = (usize, &[u8])> + '_ {
    self
      .bitmap()
      .ones()
      .filter_map(move |idx| self.obj(idx).map(|obj| (idx, obj)))
  }

  /// First occupied slot holding exactly `target`.
  pub fn find(&self, target: &[u8]) -> Option<ObjAddr> {
    if target.len() != self.obj_size {
      return None;
    }
    self
      .occupied()
      .find(|(_, obj)| *obj == target)
      .and_then(|(idx, _)| self.obj_addr(idx))
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.bitmap().count()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.bitmap().is_clear()
  }

  #[inline]
  pub fn is_full(&self) -> bool {
    self.bitmap().is_full()
  }

  /// Unmaps the slab. Handles into it are dead afterwards, whether or not
  /// the release succeeded.
  pub fn release(self) -> SlabResult<()> {
    self.region.release().map_err(SlabError::RegionError)
  }
}
