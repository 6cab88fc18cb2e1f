use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dj_hist::{trim, BinnedSeries, TrimCuts};

fn wide_series(bins: usize) -> BinnedSeries {
    let width = 0.05;
    BinnedSeries {
        edges: (0..bins)
            .map(|i| (i as f64 * width, (i + 1) as f64 * width))
            .collect(),
        values: vec![1.0; bins],
        stat: vec![0.1; bins],
        syst: vec![0.2; bins],
    }
}

fn trim_bench(c: &mut Criterion) {
    let series = wide_series(10_000);
    let cuts = TrimCuts::range(25.0, 400.0);
    c.bench_function("trim_range_10k_bins", |b| {
        b.iter(|| {
            let mut working = series.clone();
            let report = trim(&mut working, &cuts).unwrap();
            black_box(report);
        });
    });
}

criterion_group!(benches, trim_bench);
criterion_main!(benches);
