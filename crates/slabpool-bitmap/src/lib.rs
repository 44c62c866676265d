#![cfg_attr(not(test), no_std)]

use core::sync::atomic::{
  AtomicUsize,
  Ordering,
};


#[derive(Debug, PartialEq)]
pub enum BitmapError {
  InsufficientSize { have: usize, need: usize },
  OutOfBounds { index: usize, size: usize },
}

pub type BitmapResult<T> = Result<T, BitmapError>;

pub type BitmapWord = AtomicUsize;

const USIZE_BITS: usize = usize::BITS as usize;

/// Occupancy view over words that live elsewhere (normally the head of a
/// slab mapping). Bit `i` set means slot `i` holds an object.
///
/// Setting a bit publishes with `Release` and reads use `Acquire`, so a
/// reader that observes a set bit also observes the slot bytes written
/// before it.
#[derive(Debug, Clone, Copy)]
pub struct Bitmap<'slice> {
  store: &'slice [BitmapWord],
  bits: usize,
}

impl<'slice> Bitmap<'slice> {
  #[inline(always)]
  pub const fn words(fields: usize) -> usize {
    fields.div_ceil(USIZE_BITS)
  }

  #[inline(always)]
  pub const fn bytes(fields: usize) -> usize {
    Self::words(fields) * core::mem::size_of::<BitmapWord>()
  }

  #[inline(always)]
  pub const fn bits(&self) -> usize {
    self.bits
  }

  const fn position(&self, index: usize) -> BitmapResult<(usize, usize)> {
    if index >= self.bits {
      return Err(BitmapError::OutOfBounds {
        index,
        size: self.bits,
      });
    }
    Ok((index / USIZE_BITS, index % USIZE_BITS))
  }

  const fn check(store: &[BitmapWord], bits: usize) -> BitmapResult<()> {
    let have = store.len() * USIZE_BITS;
    if bits > have {
      return Err(BitmapError::InsufficientSize { have, need: bits });
    }
    Ok(())
  }

  /// Wraps `store` and clears every word.
  pub fn zero(store: &'slice [BitmapWord], bits: usize) -> BitmapResult<Self> {
    Self::check(store, bits)?;
    for word in store.iter() {
      word.store(0, Ordering::Relaxed);
    }
    Ok(Self { store, bits })
  }

  /// Wraps `store` as it is.
  pub fn attach(store: &'slice [BitmapWord], bits: usize) -> BitmapResult<Self> {
    Self::check(store, bits)?;
    Ok(Self { store, bits })
  }

  /// Wraps `store` as it is, tracking at most as many bits as it can hold.
  pub const fn within(store: &'slice [BitmapWord], bits: usize) -> Self {
    let have = store.len() * USIZE_BITS;
    let bits = if bits > have { have } else { bits };
    Self { store, bits }
  }

  #[inline]
  pub fn set(&self, index: usize) -> BitmapResult<()> {
    let (word, bit) = self.position(index)?;
    self.store[word].fetch_or(1usize << bit, Ordering::Release);
    Ok(())
  }

  #[inline]
  pub fn clear(&self, index: usize) -> BitmapResult<()> {
    let (word, bit) = self.position(index)?;
    self.store[word].fetch_and(!(1usize << bit), Ordering::Release);
    Ok(())
  }

  #[inline]
  pub fn get(&self, index: usize) -> BitmapResult<bool> {
    let (word, bit) = self.position(index)?;
    let value = self.store[word].load(Ordering::Acquire);
    Ok(value & (1usize << bit) != 0)
  }

  // Bits past `self.bits` in the last word are never set, so they only
  // need masking when looking for clear bits.
  fn valid_mask(&self, word_index: usize) -> usize {
    let start = word_index * USIZE_BITS;
    let remaining = self.bits.saturating_sub(start);
    if remaining >= USIZE_BITS {
      usize::MAX
    } else {
      (1usize << remaining) - 1
    }
  }

  /// Lowest clear index, i.e. the first-fit free slot.
  pub fn find_fc(&self) -> Option<usize> {
    for (word_index, word) in self.store.iter().enumerate() {
      let free = !word.load(Ordering::Acquire) & self.valid_mask(word_index);
      if free != 0 {
        return Some(word_index * USIZE_BITS + free.trailing_zeros() as usize);
      }
    }
    None
  }

  pub fn count(&self) -> usize {
    self
      .store
      .iter()
      .enumerate()
      .map(|(i, word)| (word.load(Ordering::Acquire) & self.valid_mask(i)).count_ones() as usize)
      .sum()
  }

  #[inline]
  pub fn is_clear(&self) -> bool {
    self.count() == 0
  }

  #[inline]
  pub fn is_full(&self) -> bool {
    self.find_fc().is_none()
  }

  /// Set indices in ascending order.
  pub fn ones(&self) -> Ones<'slice> {
    Ones {
      bitmap: *self,
      word_index: 0,
      pending: self.load_word(0),
    }
  }

  fn load_word(&self, word_index: usize) -> usize {
    match self.store.get(word_index) {
      Some(word) => word.load(Ordering::Acquire) & self.valid_mask(word_index),
      None => 0,
    }
  }

  #[inline(always)]
  pub const fn view(&self) -> BitmapView<'slice> {
    BitmapView { bitmap: *self }
  }
}

/// Read-only side of a [`Bitmap`]. Handed out to callers that may inspect
/// occupancy but must not change it.
///
/// ```compile_fail
/// use core::sync::atomic::AtomicUsize;
/// use slabpool_bitmap::Bitmap;
///
/// let store = [AtomicUsize::new(0)];
/// let view = Bitmap::within(&store, 8).view();
/// view.set(0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BitmapView<'slice> {
  bitmap: Bitmap<'slice>,
}

impl<'slice> BitmapView<'slice> {
  #[inline(always)]
  pub const fn bits(&self) -> usize {
    self.bitmap.bits
  }

  #[inline]
  pub fn get(&self, index: usize) -> BitmapResult<bool> {
    self.bitmap.get(index)
  }

  #[inline]
  pub fn find_fc(&self) -> Option<usize> {
    self.bitmap.find_fc()
  }

  #[inline]
  pub fn count(&self) -> usize {
    self.bitmap.count()
  }

  #[inline]
  pub fn is_clear(&self) -> bool {
    self.bitmap.is_clear()
  }

  #[inline]
  pub fn is_full(&self) -> bool {
    self.bitmap.is_full()
  }

  pub fn ones(&self) -> Ones<'slice> {
    self.bitmap.ones()
  }
}

pub struct Ones<'slice> {
  bitmap: Bitmap<'slice>,
  word_index: usize,
  pending: usize,
}

impl Iterator for Ones<'_> {
  type Item = usize;

  fn next(&mut self) -> Option<usize> {
    let words = Bitmap::words(self.bitmap.bits);
    loop {
      if self.pending != 0 {
        let bit = self.pending.trailing_zeros() as usize;
        self.pending &= self.pending - 1;
        return Some(self.word_index * USIZE_BITS + bit);
      }

      self.word_index += 1;
      if self.word_index >= words {
        return None;
      }
      self.pending = self.bitmap.load_word(self.word_index);
    }
  }
}
