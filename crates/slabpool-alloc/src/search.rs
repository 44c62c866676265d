use std::sync::mpsc;

use rayon::prelude::*;

use crate::{
  handle::ObjAddr,
  pool::SlabPool,
};

struct Match {
  target: usize,
  addr: ObjAddr,
}

impl SlabPool {
  /// First stored object equal to `target`, scanning slabs in list order and
  /// slots in ascending order.
  pub fn search(&self, target: &[u8]) -> Option<ObjAddr> {
    if target.len() != self.config().obj_len() {
      return None;
    }
    self.slabs().iter().find_map(|slab| slab.find(target))
  }

  /// Looks up many targets at once, one task per slab.
  ///
  /// Entry `i` of the result belongs to `targets[i]` and is `None` when
  /// nothing matched. Within one slab the lowest matching slot wins; when
  /// copies sit in different slabs, which of them is reported is
  /// unspecified.
  pub fn search_batched<T>(&self, targets: &[T]) -> Vec<Option<ObjAddr>>
  where
    T: AsRef<[u8]> + Sync,
  {
    let mut results = vec![None; targets.len()];
    if targets.is_empty() || self.slabs().is_empty() {
      return results;
    }

    let (sender, receiver) = mpsc::channel();

    // Each task reports at most one slot per target: the lowest match in
    // its slab, the same one `search` would pick there.
    self.slabs().par_iter().for_each_with(sender, |sender, slab| {
      for (target, wanted) in targets.iter().enumerate() {
        if let Some(addr) = slab.find(wanted.as_ref()) {
          sender.send(Match { target, addr }).ok();
        }
      }
    });

    // Every sender clone is gone by now, so this drains and stops.
    for Match { target, addr } in receiver {
      results[target] = Some(addr);
    }

    log::trace!(
      "batched search over {} slabs: {}/{} targets found",
      self.slab_count(),
      results.iter().filter(|r| r.is_some()).count(),
      targets.len()
    );
    results
  }
}
