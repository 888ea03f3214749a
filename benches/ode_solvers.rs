//! Criterion benchmarks over the same seed scenarios the tests use, in the
//! teacher's `criterion_group!`/`criterion_main!` style.

use criterion::{criterion_group, criterion_main, Criterion};
use radau5::test_models::{van_der_pol, exponential_decay, pendulum_dae};
use radau5::{OdeSolverProblem, Radau5, RadauOptions};

fn bench_exponential_decay(c: &mut Criterion) {
    c.bench_function("exponential_decay", |b| {
        b.iter(|| {
            let (eqn, t0, y0) = exponential_decay::problem();
            let problem = OdeSolverProblem::new(eqn, t0, y0);
            let mut solver = Radau5::new(problem, RadauOptions::default()).unwrap();
            solver.integrate(5.0).unwrap();
        })
    });
}

fn bench_van_der_pol(c: &mut Criterion) {
    c.bench_function("van_der_pol_stiff", |b| {
        b.iter(|| {
            let (eqn, t0, y0) = van_der_pol::problem();
            let mut opts = RadauOptions::default();
            opts.maxsteps = 5000;
            let problem = OdeSolverProblem::new(eqn, t0, y0);
            let mut solver = Radau5::new(problem, opts).unwrap();
            solver.integrate(3000.0).unwrap();
        })
    });
}

fn bench_pendulum_dae(c: &mut Criterion) {
    c.bench_function("pendulum_dae", |b| {
        b.iter(|| {
            let (eqn, t0, y0) = pendulum_dae::problem();
            let mut opts = RadauOptions::default();
            opts.maxsteps = 20_000;
            let problem = OdeSolverProblem::new(eqn, t0, y0);
            let mut solver = Radau5::new(problem, opts).unwrap();
            solver.integrate(10.0).unwrap();
        })
    });
}

criterion_group!(benches, bench_exponential_decay, bench_van_der_pol, bench_pendulum_dae);
criterion_main!(benches);
