use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sbank_bank::{generate, Bank, ConvergenceCriteria, Metric, NoopObserver, Region};
use sbank_core::{CoordinateFrame, NeighborhoodKey, RngHandle};

fn grown_bank() -> Bank {
    let mut bank = Bank::new(0.1, NeighborhoodKey::X1, Metric::identity()).unwrap();
    let mut rng = RngHandle::from_seed(5);
    let stream = generate(
        &Region::unit_square(),
        CoordinateFrame::Cartesian,
        Metric::identity(),
        &mut rng,
    )
    .unwrap();
    let criteria = ConvergenceCriteria::new(0.02, 200, None).unwrap();
    sbank_bank::run(&mut bank, stream, criteria, &mut NoopObserver).unwrap();
    bank
}

fn bench_covers(c: &mut Criterion) {
    let mut bank = grown_bank();
    let mut rng = RngHandle::from_seed(6);
    let candidates: Vec<_> = generate(
        &Region::unit_square(),
        CoordinateFrame::Cartesian,
        Metric::identity(),
        &mut rng,
    )
    .unwrap()
    .take(1024)
    .collect();

    c.bench_function("covers_unit_square", |b| {
        b.iter(|| {
            for candidate in &candidates {
                black_box(bank.covers(black_box(candidate), 0.02));
            }
        })
    });
}

fn bench_convergence(c: &mut Criterion) {
    c.bench_function("converge_threshold_50", |b| {
        b.iter(|| {
            let mut bank = Bank::new(0.25, NeighborhoodKey::X1, Metric::identity()).unwrap();
            let mut rng = RngHandle::from_seed(7);
            let stream = generate(
                &Region::unit_square(),
                CoordinateFrame::Cartesian,
                Metric::identity(),
                &mut rng,
            )
            .unwrap();
            let criteria = ConvergenceCriteria::new(0.1, 50, None).unwrap();
            black_box(sbank_bank::run(&mut bank, stream, criteria, &mut NoopObserver).unwrap())
        })
    });
}

criterion_group!(benches, bench_covers, bench_convergence);
criterion_main!(benches);
