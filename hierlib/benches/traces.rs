use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hierlib::config::ReplacementPolicy;
use hierlib::simulator::CacheHierarchy;
use hierlib::util::hierarchy_config;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform random addresses in a range - a trace with no spatial or temporal
/// locality, the worst case for the replacement policies
fn generate_trace(count: usize, start: u64, end: u64, rng: &mut StdRng) -> Vec<u64> {
    (0..count).map(|_| rng.gen_range(start..=end)).collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Traces");
    let mut rng = StdRng::seed_from_u64(0x5EED);

    for count in [1_000usize, 100_000] {
        let trace = generate_trace(count, 0x1000, 0x8000, &mut rng);
        for policy in [ReplacementPolicy::Lru, ReplacementPolicy::Fifo] {
            group.bench_with_input(
                BenchmarkId::new(format!("uniform_{policy}"), count),
                &trace,
                |bench, trace| {
                    bench.iter(|| {
                        let mut hierarchy =
                            CacheHierarchy::new(&hierarchy_config(policy)).unwrap();
                        hierarchy.run_simulation(trace);
                        hierarchy.results()
                    });
                },
            );
        }
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = criterion_benchmark
);
criterion_main!(benches);
