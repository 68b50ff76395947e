use criterion::{black_box, criterion_group, criterion_main, Criterion};
use symbol_coordinator::{
    partition, HashBasedPolicy, OsRandom, PlacementPolicy, ScriptedRandom, SymbolSet,
};

fn universe(size: usize) -> SymbolSet {
    (0..size).map(|i| format!("sym{i}")).collect()
}

fn bench_partition_os_random(c: &mut Criterion) {
    let symbols = universe(500);

    c.bench_function("partition_500_os_random", |b| {
        b.iter(|| {
            black_box(partition(&symbols, 16, &mut OsRandom)).unwrap();
        });
    });
}

fn bench_partition_scripted(c: &mut Criterion) {
    let symbols = universe(500);

    c.bench_function("partition_500_scripted", |b| {
        b.iter(|| {
            let mut rng = ScriptedRandom::new(vec![3, 1, 4, 1, 5, 9, 2, 6]);
            black_box(partition(&symbols, 16, &mut rng)).unwrap();
        });
    });
}

fn bench_hash_placement(c: &mut Criterion) {
    let policy = HashBasedPolicy::new(16);

    c.bench_function("hash_placement", |b| {
        b.iter(|| {
            black_box(policy.assign_worker(black_box("aapl")));
        });
    });
}

criterion_group!(benches, bench_partition_os_random, bench_partition_scripted, bench_hash_placement);
criterion_main!(benches);
