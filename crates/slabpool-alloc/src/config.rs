use getset::CopyGetters;
use slabpool_bitmap::Bitmap;
use slabpool_sys::prim::{
  PrimError,
  page_align,
};

/// Largest object a pool can store; sizes travel as a `u8`.
pub const MAX_OBJ_SIZE: usize = u8::MAX as usize;
pub const DEFAULT_OBJS_PER_SLAB: usize = 1024;

#[derive(Debug, PartialEq)]
pub enum ConfigError {
  ZeroObjSize,
  ZeroCapacity,
  Overflow,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Byte offsets of one slab mapping: `[bitmap | objects | padding]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct SlabLayout {
  header_len: usize,
  objects_len: usize,
  total_len: usize,
}

impl SlabLayout {
  pub fn new(obj_size: usize, capacity: usize) -> ConfigResult<Self> {
    let header_len = Bitmap::bytes(capacity);
    let objects_len = capacity.checked_mul(obj_size).ok_or(ConfigError::Overflow)?;
    let used = header_len.checked_add(objects_len).ok_or(ConfigError::Overflow)?;
    let total_len = page_align(used).map_err(|_: PrimError| ConfigError::Overflow)?;

    Ok(Self {
      header_len,
      objects_len,
      total_len,
    })
  }

  #[inline(always)]
  pub fn slot_offset(&self, obj_size: usize, idx: usize) -> usize {
    self.header_len + idx * obj_size
  }
}

/// Construction parameters of a pool, fixed for its whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct PoolConfig {
  obj_size: u8,
  objs_per_slab: usize,
  layout: SlabLayout,
}

impl PoolConfig {
  pub fn new(obj_size: u8, objs_per_slab: usize) -> ConfigResult<Self> {
    if obj_size == 0 {
      return Err(ConfigError::ZeroObjSize);
    }
    if objs_per_slab == 0 {
      return Err(ConfigError::ZeroCapacity);
    }

    let layout = SlabLayout::new(obj_size as usize, objs_per_slab)?;
    Ok(Self {
      obj_size,
      objs_per_slab,
      layout,
    })
  }

  pub fn with_obj_size(obj_size: u8) -> ConfigResult<Self> {
    Self::new(obj_size, DEFAULT_OBJS_PER_SLAB)
  }

  #[inline(always)]
  pub fn obj_len(&self) -> usize {
    self.obj_size as usize
  }

  /// Mapped length of one slab, bookkeeping and page padding included.
  #[inline(always)]
  pub fn slab_len(&self) -> usize {
    self.layout.total_len()
  }
}

#[cfg(test)]
mod tests {
  use slabpool_sys::prim::page_size;

  use super::*;

  #[test]
  fn test_config_rejects_zero() {
    assert_eq!(PoolConfig::new(0, 8), Err(ConfigError::ZeroObjSize));
    assert_eq!(PoolConfig::new(8, 0), Err(ConfigError::ZeroCapacity));
  }

  #[test]
  fn test_config_defaults() {
    let config = PoolConfig::with_obj_size(16).unwrap();
    assert_eq!(config.obj_size(), 16);
    assert_eq!(config.obj_len(), 16);
    assert_eq!(config.objs_per_slab(), DEFAULT_OBJS_PER_SLAB);
  }

  #[test]
  fn test_config_max_obj_size() {
    let config = PoolConfig::new(u8::MAX, 3).unwrap();
    assert_eq!(config.obj_len(), MAX_OBJ_SIZE);
  }

  #[test]
  fn test_layout_small_slab() {
    let layout = SlabLayout::new(8, 2).unwrap();
    assert_eq!(layout.header_len(), core::mem::size_of::<usize>());
    assert_eq!(layout.objects_len(), 16);
    assert_eq!(layout.total_len(), page_size());
    assert_eq!(layout.slot_offset(8, 1), layout.header_len() + 8);
  }

  #[test]
  fn test_layout_spans_pages() {
    let ps = page_size();
    let layout = SlabLayout::new(255, 1024).unwrap();
    let used = layout.header_len() + 255 * 1024;
    assert!(layout.total_len() >= used);
    assert!(layout.total_len() < used + ps);
    assert_eq!(layout.total_len() % ps, 0);
  }

  #[test]
  fn test_layout_overflow() {
    assert_eq!(SlabLayout::new(255, usize::MAX), Err(ConfigError::Overflow));
  }
}
