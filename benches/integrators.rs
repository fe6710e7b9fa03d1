//! Integrator, force model and trail benchmarks
//!
//! - Performance: time per step of every registered integrator on a random
//!   ensemble - Lower time is better
//! - Force scaling: direct summation cost as the body count grows
//! - Accuracy: harmonic oscillator error after one period, reported as a
//!   duration scaled by 1e9 - Lower values are better
//! - Trails: cost of recording one sample for every body

use criterion::{BenchmarkId, Criterion, PlotConfiguration, criterion_group, criterion_main};
use std::hint::black_box;

use orbitrail::physics::gravity::NewtonianGravity;
use orbitrail::physics::integrators::registry::IntegratorRegistry;
use orbitrail::physics::integrators::{AccelerationField, Integrator, build_integrator};
use orbitrail::physics::math::{Scalar, Vector};
use orbitrail::physics::state::{BodyState, RandomBodyRanges};
use orbitrail::resources::SharedRng;
use orbitrail::trails::TrailBuffer;

const PI: Scalar = std::f64::consts::PI;

/// Harmonic oscillator: a = -omega^2 * x
struct HarmonicOscillator {
    omega: Scalar,
}

impl AccelerationField for HarmonicOscillator {
    fn accelerations(&self, _masses: &[Scalar], positions: &[Vector], out: &mut [Vector]) {
        for (a, x) in out.iter_mut().zip(positions) {
            *a = *x * (-self.omega * self.omega);
        }
    }
}

/// Get all integrators to test using the registry
fn get_integrators() -> Vec<(String, Box<dyn Integrator>)> {
    let registry = IntegratorRegistry::new().with_standard_integrators();
    registry
        .list_available()
        .into_iter()
        .filter_map(|name| {
            let config = registry.create(&name).ok()?;
            let integrator = build_integrator(&config).ok()?;
            Some((name, integrator))
        })
        .collect()
}

fn random_ensemble(count: usize) -> BodyState {
    BodyState::random(
        count,
        &RandomBodyRanges::default(),
        &mut SharedRng::from_seed(1),
    )
}

fn bench_integrator_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrator_performance");
    let gravity = NewtonianGravity::new(1.0);
    let ensemble = random_ensemble(64);

    for (name, integrator) in &get_integrators() {
        group.bench_function(name.as_str(), |b| {
            let mut state = ensemble.clone();
            b.iter(|| {
                integrator.advance(&mut state, &gravity, black_box(0.01));
                black_box(&state.positions);
            });
        });
    }

    group.finish();
}

fn bench_force_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("force_scaling");
    group.plot_config(
        PlotConfiguration::default().summary_scale(criterion::AxisScale::Logarithmic),
    );
    let gravity = NewtonianGravity::new(1.0);

    for count in [16, 64, 256, 1024] {
        let state = random_ensemble(count);
        let mut out = vec![Vector::ZERO; count];
        group.bench_with_input(BenchmarkId::from_parameter(count), &state, |b, state| {
            b.iter(|| {
                gravity.compute(black_box(&state.positions), &state.masses, &mut out);
                black_box(&out);
            });
        });
    }

    group.finish();
}

fn bench_integrator_accuracy(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrator_accuracy");
    group.plot_config(
        PlotConfiguration::default().summary_scale(criterion::AxisScale::Logarithmic),
    );
    let oscillator = HarmonicOscillator { omega: 2.0 * PI };

    for (name, integrator) in &get_integrators() {
        group.bench_function(BenchmarkId::new("harmonic", name.as_str()), |b| {
            b.iter_custom(|iters| {
                let mut total_error = 0.0;

                for _ in 0..iters {
                    let mut state = BodyState {
                        masses: vec![1.0],
                        positions: vec![Vector::new(1.0, 0.0, 0.0)],
                        velocities: vec![Vector::ZERO],
                        accelerations: vec![Vector::ZERO],
                    };
                    let dt = 0.01;
                    let steps = 100;

                    for _ in 0..steps {
                        integrator.advance(&mut state, &oscillator, dt);
                    }

                    let t = dt * steps as Scalar;
                    let exact = Vector::new((oscillator.omega * t).cos(), 0.0, 0.0);
                    total_error += (state.positions[0] - exact).length();
                }

                // Errors are reported as durations so Criterion can chart them
                let avg_error = total_error / iters as f64;
                std::time::Duration::from_nanos((avg_error * 1e9) as u64)
            });
        });
    }

    group.finish();
}

fn bench_trail_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("trail_push");

    for count in [16, 256] {
        let state = random_ensemble(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &state, |b, state| {
            let mut trails = TrailBuffer::new(count, 500, 2000).unwrap();
            b.iter(|| {
                trails.push(black_box(&state.positions)).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(performance, bench_integrator_performance, bench_force_scaling);

criterion_group!(accuracy, bench_integrator_accuracy);

criterion_group!(trails, bench_trail_push);

criterion_main!(performance, accuracy, trails);
