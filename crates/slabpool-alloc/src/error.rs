use thiserror::Error;

use crate::{
  config::ConfigError,
  handle::{
    ObjAddr,
    SlabAddr,
  },
  slab::SlabError,
};

#[derive(Debug, Error)]
pub enum PoolError {
  #[error("invalid pool configuration: {0:?}")]
  Config(ConfigError),
  /// Mapping a new slab failed; nothing was inserted.
  #[error("failed to map a new slab: {0:?}")]
  Exhausted(SlabError),
  #[error("object is {got} bytes, pool stores {expected}-byte objects")]
  SizeMismatch { expected: usize, got: usize },
  /// A freshly mapped slab refused the object it was created for.
  #[error("new slab {slab} rejected its first object: {cause:?}")]
  Invariant { slab: SlabAddr, cause: SlabError },
  #[error("slab address {0:#x} is already mapped by this pool")]
  DuplicateSlab(usize),
  #[error("no live slab at {0}")]
  SlabNotFound(SlabAddr),
  #[error("{0} does not refer to a live object")]
  StaleHandle(ObjAddr),
  /// The slab was unlinked but its mapping could not be released and is
  /// leaked.
  #[error("failed to release slab {slab}: {cause:?}")]
  Release { slab: SlabAddr, cause: SlabError },
}

impl From<ConfigError> for PoolError {
  fn from(err: ConfigError) -> Self {
    PoolError::Config(err)
  }
}

pub type PoolResult<T> = Result<T, PoolError>;
