//! # Steering Control Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use steer_lib::{
    lane_sim::{self, LaneSim},
    steer_ctrl::{InputData, Params, SteerCtrl},
    twiddle::TwiddleParams,
};
use util::module::State;

/// Run the closed loop for the given number of cycles.
fn run_loop(params: Params, cycles: u64) {
    let mut steer_ctrl = SteerCtrl::from_params(params).unwrap();
    let mut sim = LaneSim::new(lane_sim::Params::default()).unwrap();

    for _ in 0..cycles {
        let (output, _) = steer_ctrl
            .proc(&InputData { cte_m: sim.cte() })
            .unwrap();

        if output.reset {
            sim.reset();
        } else {
            sim.step(&output.cmd);
        }
    }

    black_box(steer_ctrl.gains());
}

fn steer_ctrl_benchmark(c: &mut Criterion) {
    c.bench_function("steer_ctrl fixed gains 10k cycles", |b| {
        b.iter(|| run_loop(Params::default(), 10_000))
    });

    let tuning_params = Params {
        tune: true,
        twiddle: TwiddleParams {
            window_length: 500,
            tolerance: 0.0,
            ..TwiddleParams::default()
        },
        ..Params::default()
    };

    c.bench_function("steer_ctrl twiddle 10k cycles", |b| {
        b.iter(|| run_loop(tuning_params.clone(), 10_000))
    });
}

criterion_group!(benches, steer_ctrl_benchmark);
criterion_main!(benches);
