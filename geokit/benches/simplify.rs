use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geokit::{simplify_with, DistanceMode, Point};

/// A noisy sine track, the typical shape of a recorded GPS path.
fn track(n: usize) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let x = i as f64 * 0.01;
            let noise = ((i * 7919) % 13) as f64 * 0.001;
            Point::new(x, x.sin() + noise)
        })
        .collect()
}

fn bench_simplify(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplify");

    for n in [1_000, 10_000, 100_000] {
        let points = track(n);

        group.bench_with_input(BenchmarkId::new("unnormalized", n), &points, |b, points| {
            b.iter(|| {
                black_box(
                    simplify_with(black_box(points), 0.01, DistanceMode::Unnormalized).unwrap(),
                );
            });
        });

        group.bench_with_input(BenchmarkId::new("perpendicular", n), &points, |b, points| {
            b.iter(|| {
                black_box(
                    simplify_with(black_box(points), 0.01, DistanceMode::Perpendicular).unwrap(),
                );
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_simplify);
criterion_main!(benches);
