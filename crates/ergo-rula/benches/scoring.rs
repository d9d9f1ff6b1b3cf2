//! Benchmarks for per-frame risk scoring.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ergo_core::{Joint, Landmark, PoseFrame};
use ergo_rula::RiskScorer;

fn create_test_frame(index: u64) -> PoseFrame {
    PoseFrame::from_landmarks(
        index,
        Joint::ALL.iter().map(|joint| {
            let i = joint.index() as f64;
            (*joint, Landmark::new(0.3 + (i * 0.37).sin() * 0.2, i / 33.0))
        }),
    )
}

fn benchmark_assess(c: &mut Criterion) {
    let scorer = RiskScorer::calibrated();
    let full = create_test_frame(0);
    let sparse = full.without(Joint::LeftWrist).without(Joint::RightKnee);
    let empty = PoseFrame::empty(0);

    c.bench_function("assess_full_frame", |b| {
        b.iter(|| scorer.assess(black_box(&full)))
    });

    c.bench_function("assess_sparse_frame", |b| {
        b.iter(|| scorer.assess(black_box(&sparse)))
    });

    c.bench_function("assess_empty_frame", |b| {
        b.iter(|| scorer.assess(black_box(&empty)))
    });
}

criterion_group!(benches, benchmark_assess);
criterion_main!(benches);
