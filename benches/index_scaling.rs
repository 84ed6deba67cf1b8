use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use layered_response_cache::domain::vector_index::{normalize, IndexConfig, VectorIndex};
use layered_response_cache::infrastructure::vector_index::LshVectorIndex;

const DIM: usize = 64;

fn random_vector(rng: &mut StdRng) -> Vec<f32> {
    let mut v: Vec<f32> = (0..DIM).map(|_| rng.gen_range(-1.0..1.0)).collect();
    normalize(&mut v);
    v
}

fn populated(count: usize, rng: &mut StdRng) -> LshVectorIndex<u32> {
    let index = LshVectorIndex::new(IndexConfig::new(DIM)).unwrap();
    for i in 0..count {
        index.add(random_vector(rng), i as u32).unwrap();
    }
    index
}

/// Mean search latency should stay flat as the index grows
fn bench_search_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("lsh_search");
    group.sample_size(20);

    for count in [1_000usize, 10_000, 100_000, 1_000_000] {
        let mut rng = StdRng::seed_from_u64(7);
        let index = populated(count, &mut rng);
        let queries: Vec<Vec<f32>> = (0..64).map(|_| random_vector(&mut rng)).collect();
        let mut next = 0;

        group.bench_with_input(BenchmarkId::new("top3", count), &queries, |b, queries| {
            b.iter(|| {
                next = (next + 1) % queries.len();
                index.search(black_box(&queries[next]), 3).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_add(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let index = populated(10_000, &mut rng);
    let vector = random_vector(&mut rng);
    let mut payload = 0u32;

    c.bench_function("lsh_add_64d", |b| {
        b.iter(|| {
            payload = payload.wrapping_add(1);
            index.add(black_box(vector.clone()), payload).unwrap()
        });
    });
}

criterion_group!(benches, bench_search_scaling, bench_add);
criterion_main!(benches);
