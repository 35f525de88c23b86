//! `rover-cli` – headless bench entry point for the rover control loop.
//!
//! 1. Loads `rover.toml` (or `ROVER_CONFIG`) with `ROVER_*` overrides.
//! 2. Wires a simulated producer for each enabled modality, so the full
//!    fusion loop runs without vehicle hardware.
//! 3. Intercepts **Ctrl-C** to raise the operator abort flag; the loop ends
//!    at the next cycle boundary.
//! 4. Prints the shutdown report: total cycles and observed cycle rate.
//!
//! Real sensor drivers live out-of-tree and plug in through the same
//! `rover-hal` seams the simulated rig uses.

mod config;

use std::process::ExitCode;
use std::sync::atomic::Ordering;

use tracing::warn;

use rover_hal::sim::{
    SimDepthMapper, SimHeadingSensor, SimLaneDetector, SimPlanner, SimPositionSensor,
    SimRangeScanner,
};
use rover_runtime::{ControlLoop, SensorSuite, init_tracing};
use rover_types::PositionFix;

fn main() -> ExitCode {
    init_tracing();

    let run_config = match config::load() {
        Ok(Some(cfg)) => {
            println!("Config loaded from {}", config::config_path().display());
            cfg
        }
        Ok(None) => {
            println!("No config file found; using defaults");
            config::RunConfig::default()
        }
        Err(e) => {
            eprintln!("Config error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let suite = build_sim_suite(&run_config);
    let mut control = match ControlLoop::new(run_config.to_loop_config(), suite) {
        Ok(control) => control,
        Err(e) => {
            eprintln!("Failed to build control loop: {e}");
            return ExitCode::FAILURE;
        }
    };

    // ── Ctrl-C → operator abort ───────────────────────────────────────────
    let abort = control.abort_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("Ctrl-C received; stopping at the next cycle boundary");
        abort.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "failed to install Ctrl-C handler; abort via signal unavailable");
    }

    match control.run() {
        Ok(report) => {
            println!("Number of cycles: {}", report.cycles);
            println!("Cycles per second: {:.2}", report.cycles_per_second);
            println!("Stop reason: {:?}", report.stop);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Control loop fault: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Wire a simulated producer for each enabled modality.
///
/// The obstacle patterns are arbitrary but deterministic: a short wall ahead
/// of the vehicle for the range scanner and a pair of lane boundary columns
/// for the detector, scaled to the configured grid.
fn build_sim_suite(cfg: &config::RunConfig) -> SensorSuite {
    let m = &cfg.modalities;
    let s = cfg.grid_size;
    let mut suite = SensorSuite {
        planner: Some(Box::new(SimPlanner::new())),
        ..Default::default()
    };

    if m.stereo {
        suite.depth_mapper = Some(Box::new(SimDepthMapper::new(
            "stereo_head",
            wall_cells(s, s * 6 / 10),
        )));
    }
    if m.range_scan {
        suite.range_scanner = Some(Box::new(SimRangeScanner::new(
            "front_laser",
            wall_cells(s, s * 7 / 10),
        )));
    }
    if m.visual_lane {
        suite.lane_detector = Some(Box::new(SimLaneDetector::new(
            "front_camera_lanes",
            600,
            lane_cells(s),
        )));
    }
    if m.inertial_heading {
        suite.heading_sensor = Some(Box::new(SimHeadingSensor::constant("imu_yaw", 0.0)));
    }
    if m.satellite_position {
        suite.position_sensor = Some(Box::new(SimPositionSensor::new(
            "gps_main",
            PositionFix {
                latitude: 22.322091,
                longitude: 87.306429,
            },
        )));
    }
    suite
}

/// A short horizontal obstacle wall centred ahead of the vehicle at row `y`.
fn wall_cells(size: usize, y: usize) -> Vec<(usize, usize)> {
    let half = size / 20;
    let centre = size / 2;
    (centre.saturating_sub(half)..centre + half)
        .map(|x| (x, y))
        .collect()
}

/// Two lane boundary columns flanking the vehicle's forward strip.
fn lane_cells(size: usize) -> Vec<(usize, usize)> {
    let left = size * 3 / 10;
    let right = size * 7 / 10;
    (size / 10..size * 9 / 10)
        .step_by(4)
        .flat_map(|y| [(left, y), (right, y)])
        .collect()
}
