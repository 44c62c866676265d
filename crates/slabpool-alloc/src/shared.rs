use spin::{
  RwLock,
  RwLockReadGuard,
  RwLockWriteGuard,
};

use crate::{
  error::PoolResult,
  handle::{
    ObjAddr,
    SlabAddr,
  },
  pool::SlabPool,
};

/// A pool behind a reader-writer lock. Anything that changes the slab list
/// takes the write side, so it can never overlap a running batched search.
pub struct SharedPool {
  inner: RwLock<SlabPool>,
}

impl SharedPool {
  pub fn new(pool: SlabPool) -> Self {
    Self {
      inner: RwLock::new(pool),
    }
  }

  pub fn add(&self, obj: &[u8]) -> PoolResult<(ObjAddr, Option<SlabAddr>)> {
    self.inner.write().add(obj)
  }

  pub fn remove(&self, addr: ObjAddr) -> PoolResult<()> {
    self.inner.write().remove(addr)
  }

  pub fn delete_slab(&self, addr: SlabAddr) -> PoolResult<()> {
    self.inner.write().delete_slab(addr)
  }

  pub fn search(&self, target: &[u8]) -> Option<ObjAddr> {
    self.inner.read().search(target)
  }

  pub fn search_batched<T>(&self, targets: &[T]) -> Vec<Option<ObjAddr>>
  where
    T: AsRef<[u8]> + Sync,
  {
    self.inner.read().search_batched(targets)
  }

  /// Runs `f` on an object's bytes while the read lock is held.
  pub fn with_obj<R>(&self, addr: ObjAddr, f: impl FnOnce(&[u8]) -> R) -> PoolResult<R> {
    let pool = self.inner.read();
    pool.get(addr).map(f)
  }

  pub fn read(&self) -> RwLockReadGuard<'_, SlabPool> {
    self.inner.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, SlabPool> {
    self.inner.write()
  }

  pub fn into_inner(self) -> SlabPool {
    self.inner.into_inner()
  }
}

impl From<SlabPool> for SharedPool {
  fn from(pool: SlabPool) -> Self {
    Self::new(pool)
  }
}
