use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use phishsim::report::{aggregate_individuals, aggregate_types_by_month};
use phishsim::{Organization, ResultStore, SqliteStore, TrainingConfig};

fn bench_config() -> TrainingConfig {
    TrainingConfig {
        n_users: 100,
        n_simulations: 20,
        ..TrainingConfig::default()
    }
}

fn bench_training(c: &mut Criterion) {
    let config = bench_config();
    let mut group = c.benchmark_group("training");
    group.throughput(Throughput::Elements((config.n_users * config.n_simulations) as u64));

    group.bench_function("do_training", |b| {
        b.iter_batched(
            || Organization::new(&config).unwrap(),
            |mut org| {
                org.do_training().unwrap();
                black_box(org.rounds_completed())
            },
            BatchSize::SmallInput,
        );
    });

    let mut trained = Organization::new(&config).unwrap();
    trained.do_training().unwrap();
    let rows = trained.result();

    group.bench_function("replace_results", |b| {
        let mut store = SqliteStore::in_memory().unwrap();
        b.iter(|| store.replace_results(&config.table, black_box(&rows)).unwrap());
    });
    group.finish();
}

fn bench_aggregation(c: &mut Criterion) {
    let config = bench_config();
    let mut org = Organization::new(&config).unwrap();
    org.do_training().unwrap();
    let mut store = SqliteStore::in_memory().unwrap();
    store.replace_results(&config.table, &org.result()).unwrap();

    c.bench_function("aggregate/types_by_month", |b| {
        b.iter(|| black_box(aggregate_types_by_month(&store, &config.table).unwrap()));
    });
    c.bench_function("aggregate/individuals", |b| {
        b.iter(|| black_box(aggregate_individuals(&store, &config.table).unwrap()));
    });
}

criterion_group!(benches, bench_training, bench_aggregation);
criterion_main!(benches);
