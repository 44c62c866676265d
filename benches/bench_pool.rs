use std::hint::black_box;

use criterion::{
  BenchmarkId,
  Criterion,
  criterion_group,
  criterion_main,
};
use slabpool::prelude::*;

fn bench_pool_add(c: &mut Criterion) {
  let mut group = c.benchmark_group("pool_add");

  for obj_size in [8u8, 64, 255] {
    group.bench_with_input(BenchmarkId::from_parameter(obj_size), &obj_size, |b, &sz| {
      let obj = vec![0x5a; sz as usize];
      b.iter_batched(
        || SlabPool::new(sz, 256).unwrap(),
        |mut pool| {
          for _ in 0..1024 {
            black_box(pool.add(&obj).unwrap());
          }
          pool
        },
        criterion::BatchSize::SmallInput,
      );
    });
  }

  group.finish();
}

fn bench_pool_add_remove(c: &mut Criterion) {
  let mut pool = SlabPool::new(32, 1024).unwrap();
  let obj = [7u8; 32];
  for _ in 0..512 {
    pool.add(&obj).unwrap();
  }

  c.bench_function("pool_add_remove_same_slot", |b| {
    b.iter(|| {
      let (addr, _) = pool.add(black_box(&obj)).unwrap();
      pool.remove(black_box(addr)).unwrap();
    });
  });
}

fn bench_pool_get(c: &mut Criterion) {
  let mut pool = SlabPool::new(16, 128).unwrap();
  let addrs: Vec<ObjAddr> = (0..4096u32)
    .map(|i| {
      let mut obj = [0u8; 16];
      obj[..4].copy_from_slice(&i.to_le_bytes());
      pool.add(&obj).unwrap().0
    })
    .collect();

  c.bench_function("pool_get_checked", |b| {
    b.iter(|| {
      for addr in &addrs {
        black_box(pool.get(*addr).unwrap());
      }
    });
  });

  c.bench_function("pool_get_unchecked", |b| {
    b.iter(|| {
      for addr in &addrs {
        black_box(unsafe { pool.get_unchecked(*addr) });
      }
    });
  });
}

fn bench_slab_churn(c: &mut Criterion) {
  c.bench_function("pool_add_delete_slab", |b| {
    let mut pool = SlabPool::new(64, 64).unwrap();
    b.iter(|| {
      let slab = pool.add_slab().unwrap().addr();
      pool.delete_slab(black_box(slab)).unwrap();
    });
  });
}

criterion_group!(
  benches,
  bench_pool_add,
  bench_pool_add_remove,
  bench_pool_get,
  bench_slab_churn
);
criterion_main!(benches);
