//! Fixed-size object pools over memory-mapped slabs.
//!
//! ```no_run
//! use slabpool::prelude::*;
//!
//! let mut pool = SlabPool::new(8, 1024)?;
//! let (addr, _) = pool.add(b"AAAAAAAA")?;
//! assert_eq!(pool.search(b"AAAAAAAA"), Some(addr));
//! assert_eq!(pool.get(addr)?, b"AAAAAAAA");
//! # Ok::<(), PoolError>(())
//! ```

pub use slabpool_alloc::{
  config,
  error,
  handle,
  pool,
  shared,
  slab,
};

pub mod prelude {
  pub use slabpool_alloc::prelude::*;
  pub use slabpool_sys::prelude::{
    GLOBAL_SYSTEM,
    SysError,
    System,
    page_size,
  };
}
