#![no_std]

pub mod prim;
pub mod system;
pub mod unix;

pub use system::GLOBAL_SYSTEM;

pub mod prelude {
  pub use super::{
    GLOBAL_SYSTEM,
    prim::{
      align_up,
      is_page_aligned,
      page_align,
      page_size,
      word_width,
    },
    system::{
      SysError,
      SysResult,
      System,
    },
  };
}
