//! # Pulsar Output Demo Runner
//!
//! Drives the pulse output core against the simulation backend from a
//! TOML configuration, pacing a write/complete control loop at a fixed
//! rate.
//!
//! # Usage
//!
//! ```bash
//! # Run the built-in demo configuration
//! pulsar_output
//!
//! # Run a specific configuration for 10k cycles at 1 kHz
//! pulsar_output --config config/output.toml --cycles 10000 --loop-hz 1000
//!
//! # Run until Ctrl-C with verbose logging
//! pulsar_output --cycles 0 -v
//! ```

use clap::Parser;
use pulsar_common::config::OutputConfig;
use pulsar_common::hw::TimerId;
use pulsar_output::motors::MotorOutputs;
use pulsar_output::servos::ServoOutputs;
use pulsar_output::sim::{DshotLog, SimBoard, SimDshotBridge};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Built-in demo: four oneshot125 motors on two shared timers, two servos.
const DEMO_CONFIG: &str = r#"
[motors]
protocol = "oneshot125"
pins = ["A0", "A1", "B0", "B1"]
pwm_rate_hz = 480
idle_pulse = 1000

[servos]
pins = ["C0", "C1"]
pwm_rate_hz = 50
center_pulse = 1500
"#;

/// Pulse output demo runner against the simulation backend
#[derive(Parser, Debug)]
#[command(name = "pulsar_output")]
#[command(version)]
#[command(about = "ESC/servo pulse output core demo runner")]
struct Args {
    /// Path to output configuration (TOML). Omit for the built-in demo.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of control cycles to run (0 = until Ctrl-C).
    #[arg(long, default_value_t = 1000)]
    cycles: u64,

    /// Control loop rate [Hz].
    #[arg(long, default_value_t = 500)]
    loop_hz: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("startup failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_tracing(args.verbose);

    info!("pulsar output demo v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => {
            info!("loading config from {}", path.display());
            OutputConfig::from_path(path)?
        }
        None => OutputConfig::from_toml(DEMO_CONFIG)?,
    };

    // Map configured pins onto simulated timers, two channels per timer so
    // the synced completion path exercises timer sharing.
    let mut board = SimBoard::new();
    for (i, tag) in config.motors.pins.iter().enumerate() {
        board.map_pin(*tag, TimerId(1 + (i / 2) as u8), (i % 2 + 1) as u8);
    }
    for (i, tag) in config.servos.pins.iter().enumerate() {
        board.map_pin(*tag, TimerId(10 + (i / 2) as u8), (i % 2 + 1) as u8);
    }

    let motor_count = config.motors.pins.len() as u8;
    let mut dshot_log: Option<DshotLog> = None;
    let bridge = if config.motors.protocol.is_digital() {
        let (bridge, log) = SimDshotBridge::new();
        dshot_log = Some(log);
        Some(Box::new(bridge) as Box<dyn pulsar_common::hw::DshotBridge>)
    } else {
        None
    };

    let mut motors = MotorOutputs::init(&config.motors, motor_count, &mut board, bridge);
    let mut servos = ServoOutputs::init(&config.servos, &mut board);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst))?;

    let cycle_time = Duration::from_secs_f64(1.0 / args.loop_hz.max(1) as f64);
    let synced = motors.is_synced();
    info!(
        loop_hz = args.loop_hz,
        cycles = args.cycles,
        synced,
        "entering control loop"
    );

    let mut cycle: u64 = 0;
    while running.load(Ordering::SeqCst) && (args.cycles == 0 || cycle < args.cycles) {
        let start = Instant::now();

        // Triangle throttle sweep over the command domain.
        let phase = (cycle % 2000) as u16;
        let throttle = if phase < 1000 { 1000 + phase } else { 3000 - phase };

        for index in 0..motor_count {
            motors.write(index, throttle);
        }
        for index in 0..config.servos.pins.len() as u8 {
            servos.write(index, config.servos.center_pulse);
        }
        if synced {
            motors.complete_update(motor_count, &mut board);
        }

        cycle += 1;
        let elapsed = start.elapsed();
        if elapsed < cycle_time {
            std::thread::sleep(cycle_time - elapsed);
        }
    }

    info!(cycles = cycle, "control loop finished");
    for (index, port) in motors.ports().iter().enumerate() {
        if port.enabled() {
            info!(
                slot = index,
                timer = port.timer().map(|t| t.0),
                period = port.period(),
                compare = port.compare(),
                "motor port"
            );
        }
    }
    if let Some(timer) = motors.ports().iter().find_map(|p| p.timer()) {
        info!(
            timer = timer.0,
            overflows = board.overflow_count(timer),
            "first motor timer"
        );
    }
    if let Some(log) = &dshot_log {
        info!(
            writes = log.writes().len(),
            completions = log.completions().len(),
            "dshot bridge activity"
        );
    }

    Ok(())
}

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
