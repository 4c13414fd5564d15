use core::hint::black_box;
use std::collections::HashMap as StdHashMap;

use criterion::BatchSize;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rh_hash::HashMap;

const SIZES: &[usize] = &[1 << 10, 1 << 15];

fn random_keys(count: usize) -> Vec<u64> {
    let mut rng = OsRng;
    (0..count).map(|_| rng.try_next_u64().unwrap()).collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_random");
    for &size in SIZES {
        group.throughput(Throughput::Elements(size as u64));
        let keys = random_keys(size);

        group.bench_function(format!("rh_hash/{size}"), |b| {
            b.iter(|| {
                let mut map = HashMap::new();
                for &key in &keys {
                    map.insert(black_box(key), key);
                }
                map
            });
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                let mut map = hashbrown::HashMap::new();
                for &key in &keys {
                    map.insert(black_box(key), key);
                }
                map
            });
        });

        group.bench_function(format!("std/{size}"), |b| {
            b.iter(|| {
                let mut map = StdHashMap::new();
                for &key in &keys {
                    map.insert(black_box(key), key);
                }
                map
            });
        });
    }
    group.finish();
}

fn bench_lookup_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup_hit");
    for &size in SIZES {
        group.throughput(Throughput::Elements(size as u64));
        let keys = random_keys(size);

        let rh: HashMap<u64, u64> = keys.iter().map(|&k| (k, k)).collect();
        let hb: hashbrown::HashMap<u64, u64> = keys.iter().map(|&k| (k, k)).collect();
        let std_map: StdHashMap<u64, u64> = keys.iter().map(|&k| (k, k)).collect();

        group.bench_function(format!("rh_hash/{size}"), |b| {
            b.iter(|| {
                for key in &keys {
                    black_box(rh.get(black_box(key)));
                }
            });
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                for key in &keys {
                    black_box(hb.get(black_box(key)));
                }
            });
        });

        group.bench_function(format!("std/{size}"), |b| {
            b.iter(|| {
                for key in &keys {
                    black_box(std_map.get(black_box(key)));
                }
            });
        });
    }
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");
    for &size in SIZES {
        group.throughput(Throughput::Elements(size as u64));
        let keys = random_keys(size);

        let rh: HashMap<u64, u64> = keys.iter().map(|&k| (k, k)).collect();
        let hb: hashbrown::HashMap<u64, u64> = keys.iter().map(|&k| (k, k)).collect();
        let std_map: StdHashMap<u64, u64> = keys.iter().map(|&k| (k, k)).collect();

        group.bench_function(format!("rh_hash/{size}"), |b| {
            b.iter_batched(
                || rh.clone(),
                |mut map| {
                    for key in &keys {
                        black_box(map.remove(black_box(key)));
                    }
                    map
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || hb.clone(),
                |mut map| {
                    for key in &keys {
                        black_box(map.remove(black_box(key)));
                    }
                    map
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(format!("std/{size}"), |b| {
            b.iter_batched(
                || std_map.clone(),
                |mut map| {
                    for key in &keys {
                        black_box(map.remove(black_box(key)));
                    }
                    map
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_lookup_hit, bench_remove);
criterion_main!(benches);
