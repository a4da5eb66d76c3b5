use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use prism_perf::random_corpus;
use sieve_core::{PrimeCache, TrialDivision, PrimalityTest};

const CACHED: usize = 4096;

fn bench_cache(c: &mut Criterion) {
    let cache = PrimeCache::new();
    let primes: Vec<i32> = random_corpus(CACHED * 16, 11)
        .into_iter()
        .filter(|&n| TrialDivision.is_prime(n))
        .take(CACHED)
        .collect();
    for &p in &primes {
        cache.insert(p);
    }
    let misses: Vec<i32> = primes.iter().map(|p| p.wrapping_add(1)).collect();

    let mut group = c.benchmark_group("prime_cache");
    group.throughput(Throughput::Elements(1));

    let mut idx = 0usize;
    group.bench_function("contains (hit)", |b| {
        b.iter(|| {
            let n = primes[idx % primes.len()];
            idx += 1;
            black_box(cache.contains(black_box(n)))
        });
    });

    let mut idx = 0usize;
    group.bench_function("contains (miss)", |b| {
        b.iter(|| {
            let n = misses[idx % misses.len()];
            idx += 1;
            black_box(cache.contains(black_box(n)))
        });
    });

    group.bench_function("insert (existing)", |b| {
        b.iter(|| black_box(cache.insert(black_box(primes[0]))));
    });

    group.finish();
}

criterion_group!(benches, bench_cache);
criterion_main!(benches);
