use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use prism_perf::random_corpus;
use sieve_core::{MillerRabin, PrimalityTest, TrialDivision};

const CORPUS_SIZE: usize = 1024;

fn bench_testers(c: &mut Criterion) {
    let small: Vec<i32> = (1..=CORPUS_SIZE as i32).collect();
    let large = random_corpus(CORPUS_SIZE, 7);

    let testers: [(&str, &dyn PrimalityTest); 2] =
        [("trial_division", &TrialDivision), ("miller_rabin", &MillerRabin)];

    let mut group = c.benchmark_group("primality");
    group.throughput(Throughput::Elements(CORPUS_SIZE as u64));

    for (name, tester) in testers {
        group.bench_with_input(BenchmarkId::new(name, "small"), &small, |b, corpus| {
            b.iter(|| corpus.iter().filter(|&&n| tester.is_prime(black_box(n))).count());
        });
        group.bench_with_input(BenchmarkId::new(name, "large"), &large, |b, corpus| {
            b.iter(|| corpus.iter().filter(|&&n| tester.is_prime(black_box(n))).count());
        });
    }

    // worst case for trial division: a prime near the top of the range
    group.throughput(Throughput::Elements(1));
    for (name, tester) in testers {
        group.bench_function(BenchmarkId::new(name, "i32::MAX"), |b| {
            b.iter(|| tester.is_prime(black_box(i32::MAX)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_testers);
criterion_main!(benches);
