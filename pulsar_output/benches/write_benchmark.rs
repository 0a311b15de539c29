//! Write-path micro-benchmark.
//!
//! Measures throughput of the per-cycle hot path against the simulation
//! backend:
//! - encode + store for one synced oneshot125 channel
//! - a full four-motor write sweep
//! - the synced completion step (overflows + register re-arm)
//! - the brushed duty remap, the most arithmetic-heavy encoder

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use pulsar_common::config::MotorConfig;
use pulsar_common::hw::TimerId;
use pulsar_common::protocol::MotorProtocol;
use pulsar_common::tag::PinTag;
use pulsar_output::motors::MotorOutputs;
use pulsar_output::sim::SimBoard;

fn quad_setup(protocol: MotorProtocol, pwm_rate_hz: u32) -> (MotorOutputs, SimBoard) {
    let mut board = SimBoard::new();
    let pins = ["A0", "A1", "B0", "B1"].map(|s| s.parse::<PinTag>().unwrap());
    for (i, tag) in pins.iter().enumerate() {
        board.map_pin(*tag, TimerId(1 + (i / 2) as u8), (i % 2 + 1) as u8);
    }

    let config = MotorConfig {
        protocol,
        pins: heapless::Vec::from_slice(&pins).unwrap(),
        pwm_rate_hz,
        use_unsynced_pwm: false,
        idle_pulse: 1000,
    };
    let motors = MotorOutputs::init(&config, 4, &mut board, None);
    (motors, board)
}

fn bench_single_write(c: &mut Criterion) {
    let (mut motors, _board) = quad_setup(MotorProtocol::OneShot125, 480);

    c.bench_function("motor_write_oneshot125", |b| {
        b.iter(|| {
            motors.write(black_box(0), black_box(1500));
        })
    });
}

fn bench_quad_write_sweep(c: &mut Criterion) {
    let (mut motors, _board) = quad_setup(MotorProtocol::OneShot125, 480);
    let mut value: u16 = 1000;

    c.bench_function("motor_write_quad_sweep", |b| {
        b.iter(|| {
            value = if value >= 2000 { 1000 } else { value + 1 };
            for index in 0..4 {
                motors.write(black_box(index), black_box(value));
            }
        })
    });
}

fn bench_complete_update(c: &mut Criterion) {
    let (mut motors, mut board) = quad_setup(MotorProtocol::OneShot125, 480);

    c.bench_function("motor_complete_update_quad", |b| {
        b.iter(|| {
            for index in 0..4 {
                motors.write(index, 1500);
            }
            motors.complete_update(black_box(4), &mut board);
        })
    });
}

fn bench_brushed_write(c: &mut Criterion) {
    let (mut motors, _board) = quad_setup(MotorProtocol::Brushed, 16_000);

    c.bench_function("motor_write_brushed", |b| {
        b.iter(|| {
            motors.write(black_box(0), black_box(1730));
        })
    });
}

criterion_group!(
    benches,
    bench_single_write,
    bench_quad_write_sweep,
    bench_complete_update,
    bench_brushed_write
);
criterion_main!(benches);
