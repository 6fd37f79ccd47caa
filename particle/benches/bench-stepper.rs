use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use config::GRAV_CONST;
use particle::Dop853;

/// One full accepted step plus dense-output preparation on the ballistic
/// system, the integrator's hot loop.
fn bench_step(c: &mut Criterion) {
    c.bench_function("dop853-ballistic-step", |b| {
        let mut rhs = |_t: f64, y: &[f64; 6]| [y[3], y[4], y[5], 0.0, 0.0, -GRAV_CONST];
        b.iter(|| {
            let mut stepper = Dop853::new(0.0, [0.0, 0.0, 0.0, 1.0, 0.0, 5.0]);
            let outcome = stepper.step(black_box(1e-3), &mut rhs).unwrap();
            black_box(outcome.h_did)
        })
    });
}

fn bench_dense(c: &mut Criterion) {
    c.bench_function("dop853-dense-eval", |b| {
        let mut rhs = |_t: f64, y: &[f64; 6]| [y[3], y[4], y[5], 0.0, 0.0, -GRAV_CONST];
        let mut stepper = Dop853::new(0.0, [0.0, 0.0, 0.0, 1.0, 0.0, 5.0]);
        let outcome = stepper.step(1e-3, &mut rhs).unwrap();
        let t = stepper.t_old() + 0.37 * outcome.h_did;
        b.iter(|| black_box(stepper.dense_state(black_box(t))))
    });
}

criterion_group!(benches, bench_step, bench_dense);
criterion_main!(benches);
