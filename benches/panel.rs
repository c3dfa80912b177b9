use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statpanel::config::PanelConfig;
use statpanel::dataset::{Dataset, Target};
use statpanel::panel::Panel;
use statpanel::pipeline::{prepare_split, run_dataset};
use statpanel::stats::ols;

const ROWS: usize = 600;
const FEATURES: usize = 13;

fn synthetic_classes() -> Dataset {
    let mut rng = StdRng::seed_from_u64(42);
    let mut records = Vec::with_capacity(ROWS);
    let mut labels = Vec::with_capacity(ROWS);
    for row in 0..ROWS {
        let class = row % 3;
        records.push(
            (0..FEATURES)
                .map(|j| 3.0 * ((class + j) % 3) as f64 + rng.random::<f64>() * 2.0)
                .collect(),
        );
        labels.push(class);
    }
    Dataset::new(
        "bench",
        (0..FEATURES).map(|j| format!("f{j}")).collect(),
        records,
        Target::Classes {
            labels,
            classes: vec!["a".into(), "b".into(), "c".into()],
        },
    )
    .expect("bench dataset")
}

fn bench_classification_panel(c: &mut Criterion) {
    let dataset = synthetic_classes();
    let mut group = c.benchmark_group("classification_panel");
    group.sample_size(10);
    for workers in [1usize, 5] {
        let config = PanelConfig {
            workers,
            ..PanelConfig::default()
        };
        let panel = Panel::classification(&config);
        group.bench_with_input(BenchmarkId::new("workers", workers), &config, |b, config| {
            b.iter(|| run_dataset(black_box(&dataset), &panel, config).expect("panel run"));
        });
    }
    group.finish();
}

fn bench_prepare_split(c: &mut Criterion) {
    let dataset = synthetic_classes();
    let config = PanelConfig::default();
    let panel = Panel::classification(&config);
    c.bench_function("prepare_split", |b| {
        b.iter(|| prepare_split(black_box(&dataset), &panel, &config).expect("split"));
    });
}

fn bench_ols(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let names: Vec<String> = (0..5).map(|j| format!("x{j}")).collect();
    let columns: Vec<Vec<f64>> = (0..5)
        .map(|_| (0..ROWS).map(|_| rng.random::<f64>()).collect())
        .collect();
    let response: Vec<f64> = (0..ROWS)
        .map(|i| columns.iter().map(|col| col[i]).sum::<f64>() + rng.random::<f64>())
        .collect();
    c.bench_function("ols_fit", |b| {
        b.iter(|| ols::fit(&names, black_box(&columns), &response, 0.05).expect("ols"));
    });
}

criterion_group!(
    benches,
    bench_classification_panel,
    bench_prepare_split,
    bench_ols
);
criterion_main!(benches);
