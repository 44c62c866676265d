pub mod config;
pub mod error;
pub mod handle;
pub mod pool;
pub mod search;
pub mod shared;
pub mod slab;

#[cfg(test)]
mod testing;

pub mod prelude {
  pub use super::{
    config::{
      ConfigError,
      DEFAULT_OBJS_PER_SLAB,
      MAX_OBJ_SIZE,
      PoolConfig,
    },
    error::{
      PoolError,
      PoolResult,
    },
    handle::{
      ObjAddr,
      SlabAddr,
    },
    pool::SlabPool,
    shared::SharedPool,
    slab::{
      Slab,
      SlabError,
    },
  };
}
