use slabpool_region::Region;
use slabpool_sys::{
  GLOBAL_SYSTEM,
  system::System,
};

use crate::{
  config::PoolConfig,
  error::{
    PoolError,
    PoolResult,
  },
  handle::{
    ObjAddr,
    SlabAddr,
  },
  slab::{
    Slab,
    SlabError,
  },
};

/// Slabs of one object size, kept sorted by descending base address.
///
/// Structural operations (`add`, `add_slab`, `remove`, `delete_slab`) need
/// `&mut self`; lookups and searches only `&self`. The pool holds no lock of
/// its own, so sharing one between threads goes through
/// [`SharedPool`](crate::shared::SharedPool) or an equivalent wrapper.
pub struct SlabPool {
  config: PoolConfig,
  slabs: Vec<Slab>,
  system: &'static dyn System,
  next_epoch: u64,
}

impl SlabPool {
  pub fn new(obj_size: u8, objs_per_slab: usize) -> PoolResult<Self> {
    Ok(Self::from_config(PoolConfig::new(obj_size, objs_per_slab)?))
  }

  pub fn from_config(config: PoolConfig) -> Self {
    Self::with_system(config, GLOBAL_SYSTEM)
  }

  pub fn with_system(config: PoolConfig, system: &'static dyn System) -> Self {
    Self {
      config,
      slabs: Vec::new(),
      system,
      next_epoch: 0,
    }
  }

  #[inline(always)]
  pub fn config(&self) -> &PoolConfig {
    &self.config
  }

  /// Slabs in descending address order.
  #[inline(always)]
  pub fn slabs(&self) -> &[Slab] {
    &self.slabs
  }

  #[inline(always)]
  pub fn slab_count(&self) -> usize {
    self.slabs.len()
  }

  /// Objects currently stored.
  pub fn len(&self) -> usize {
    self.slabs.iter().map(Slab::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.slabs.iter().all(Slab::is_empty)
  }

  /// Slots across all mapped slabs, free or not.
  pub fn capacity(&self) -> usize {
    self.slabs.len() * self.config.objs_per_slab()
  }

  fn check_size(&self, obj: &[u8]) -> PoolResult<()> {
    let expected = self.config.obj_len();
    if obj.len() != expected {
      return Err(PoolError::SizeMismatch {
        expected,
        got: obj.len(),
      });
    }
    Ok(())
  }

  fn is_ordered(&self) -> bool {
    self
      .slabs
      .windows(2)
      .all(|pair| pair[0].base() > pair[1].base())
  }

  // Shared by insertion and lookup: index of the first slab whose base is
  // not above `addr`.
  #[inline]
  fn position(&self, addr: usize) -> usize {
    self.slabs.partition_point(|slab| slab.base() > addr)
  }

  /// Stores `obj` in the first slab, in list order, that has a free slot,
  /// mapping a new slab when none has. The second value is the new slab's
  /// address when this call created one.
  pub fn add(&mut self, obj: &[u8]) -> PoolResult<(ObjAddr, Option<SlabAddr>)> {
    self.check_size(obj)?;

    for slab in self.slabs.iter_mut() {
      match slab.add_obj(obj) {
        Ok(addr) => return Ok((addr, None)),
        Err(SlabError::Full) => continue,
        Err(cause) => {
          return Err(PoolError::Invariant {
            slab: slab.addr(),
            cause,
          });
        }
      }
    }

    let slab = self.add_slab()?;
    let slab_addr = slab.addr();
    match slab.add_obj(obj) {
      Ok(addr) => Ok((addr, Some(slab_addr))),
      Err(cause) => Err(PoolError::Invariant {
        slab: slab_addr,
        cause,
      }),
    }
  }

  /// Maps an empty slab and links it in at its address-ordered position.
  pub fn add_slab(&mut self) -> PoolResult<&mut Slab> {
    let region = Region::new(self.config.slab_len(), self.system)
      .map_err(|err| PoolError::Exhausted(SlabError::RegionError(err)))?;

    let key = region.addr();
    let at = self.position(key);
    if self.slabs.get(at).is_some_and(|slab| slab.base() == key) {
      // Same mapping as a live slab; releasing it would unmap that slab too.
      core::mem::forget(region);
      log::warn!("mapping returned live slab address {:#x}", key);
      return Err(PoolError::DuplicateSlab(key));
    }

    let slab = Slab::from_region(&self.config, self.next_epoch, region).map_err(PoolError::Exhausted)?;
    self.next_epoch += 1;
    log::debug!(
      "mapped slab {} ({} bytes, {} x {} bytes)",
      slab.addr(),
      slab.total_len(),
      slab.capacity(),
      slab.obj_size()
    );

    self.slabs.insert(at, slab);
    debug_assert!(self.is_ordered());
    Ok(&mut self.slabs[at])
  }

  /// Index of the slab whose mapping contains `addr`; `None` when no live
  /// slab does.
  pub fn find_slab_by_addr(&self, addr: usize) -> Option<usize> {
    let idx = self.position(addr);
    self
      .slabs
      .get(idx)
      .filter(|slab| slab.contains(addr))
      .map(|_| idx)
  }

  fn locate(&self, addr: SlabAddr) -> PoolResult<usize> {
    self
      .find_slab_by_addr(addr.addr())
      .filter(|&idx| self.slabs[idx].addr() == addr)
      .ok_or(PoolError::SlabNotFound(addr))
  }

  fn resolve(&self, addr: ObjAddr) -> PoolResult<(usize, usize)> {
    let stale = PoolError::StaleHandle(addr);
    let Some(idx) = self.find_slab_by_addr(addr.addr()) else {
      return Err(stale);
    };

    let slab = &self.slabs[idx];
    if slab.epoch() != addr.epoch() {
      return Err(stale);
    }

    match slab.slot_of(addr.addr()) {
      Some(slot) if slab.is_occupied(slot) => Ok((idx, slot)),
      _ => Err(stale),
    }
  }

  pub fn slab(&self, addr: SlabAddr) -> PoolResult<&Slab> {
    self.locate(addr).map(|idx| &self.slabs[idx])
  }

  /// Bytes of a live object, without copying.
  pub fn get(&self, addr: ObjAddr) -> PoolResult<&[u8]> {
    let (idx, slot) = self.resolve(addr)?;
    self.slabs[idx].obj(slot).ok_or(PoolError::StaleHandle(addr))
  }

  /// Reads `obj_size` bytes at `addr` as they are.
  ///
  /// # Safety
  ///
  /// `addr` must come from `add` or a search on this pool, and its slab
  /// must not have been deleted since.
  pub unsafe fn get_unchecked(&self, addr: ObjAddr) -> &[u8] {
    unsafe { core::slice::from_raw_parts(addr.as_ptr(), self.config.obj_len()) }
  }

  /// Frees one object's slot. The slab stays mapped.
  pub fn remove(&mut self, addr: ObjAddr) -> PoolResult<()> {
    let (idx, slot) = self.resolve(addr)?;
    let slab = &mut self.slabs[idx];
    slab.remove_obj(slot).map_err(|cause| PoolError::Invariant {
      slab: slab.addr(),
      cause,
    })
  }

  /// Unlinks the slab at `addr` and unmaps it. Every handle into it is dead
  /// once this returns, including when the unmap itself failed.
  pub fn delete_slab(&mut self, addr: SlabAddr) -> PoolResult<()> {
    let idx = self.locate(addr)?;
    let slab = self.slabs.remove(idx);
    debug_assert!(self.is_ordered());

    let dropped = slab.len();
    match slab.release() {
      Ok(()) => {
        log::debug!("released slab {} ({} objects)", addr, dropped);
        Ok(())
      }
      Err(cause) => {
        log::warn!("leaking slab {}: {:?}", addr, cause);
        Err(PoolError::Release { slab: addr, cause })
      }
    }
  }

  /// Every stored object, slab by slab in list order.
  pub fn iter(&self) -> impl Iterator<Item = (ObjAddr, &[u8])> + '_ {
    self.slabs.iter().flat_map(|slab| {
      slab
        .occupied()
        .filter_map(move |(idx, obj)| slab.obj_addr(idx).map(|addr| (addr, obj)))
    })
  }
}
