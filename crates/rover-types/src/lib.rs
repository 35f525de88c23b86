//! `rover-types` – shared data model for the rover control stack.
//!
//! Vocabulary types that cross crate boundaries: which sensing modalities a
//! run has enabled, the per-cycle navigation target handed to the planner,
//! the producer outcome enums, and the global error type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The set of sensing modalities enabled for one run.
///
/// Fixed at startup from configuration and never mutated afterwards; the
/// target selector and warm-up gate read it but never write it. Range scan
/// and stereo feed the occupancy grid directly and do not participate in
/// target-selection branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModalitySet {
    /// Satellite positioning fix stream (latitude/longitude).
    #[serde(default)]
    pub satellite_position: bool,
    /// Visual lane detection from a camera stream.
    #[serde(default)]
    pub visual_lane: bool,
    /// Inertial heading (yaw) sensing.
    #[serde(default)]
    pub inertial_heading: bool,
    /// Planar range scanning into the occupancy grid.
    #[serde(default)]
    pub range_scan: bool,
    /// Stereo depth mapping into the occupancy grid.
    #[serde(default)]
    pub stereo: bool,
}

impl ModalitySet {
    /// The 3-bit target-selection index: `4·gps + 2·lane + 1·imu`.
    ///
    /// Only positioning, lane, and heading branch the target strategy, so
    /// the index is always in `0..=7` when derived from this set.
    pub fn selector_index(&self) -> u8 {
        (u8::from(self.satellite_position) << 2)
            | (u8::from(self.visual_lane) << 1)
            | u8::from(self.inertial_heading)
    }

    /// True when at least one enabled modality requires a settling window
    /// before its output is trustworthy.
    pub fn needs_warmup(&self) -> bool {
        self.inertial_heading || self.satellite_position
    }
}

/// A navigation target in grid-cell coordinates.
///
/// Produced fresh each cycle and consumed immediately by the planner; never
/// persisted across cycles by the selector itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub x: usize,
    pub y: usize,
}

impl Target {
    /// Build a target from continuous coordinates, clamping each axis into
    /// `[0, size)` so the planner always receives an in-bounds cell.
    pub fn clamped(x: f64, y: f64, size: usize) -> Self {
        let limit = (size.saturating_sub(1)) as f64;
        Self {
            x: x.clamp(0.0, limit) as usize,
            y: y.clamp(0.0, limit) as usize,
        }
    }
}

/// A raw satellite positioning reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
}

/// Lane-marking extraction mode for the visual lane detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneMode {
    /// Hough-transform line extraction only.
    Hough,
    /// Color-segmentation extraction only.
    #[default]
    Color,
    /// Both extractors, results merged into the grid.
    Both,
}

/// Outcome of a grid-populating producer call (range scan, stereo).
///
/// `NoData` is expected behavior, not an error: the grid is simply left
/// unchanged by that contributor for the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The producer rasterised fresh data into the grid.
    Updated,
    /// No new sample was available this cycle.
    NoData,
}

/// Outcome of a visual lane detection call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneOutcome {
    /// Lane markings were projected into the grid.
    Marked,
    /// The input stream is exhausted; the control loop ends gracefully.
    EndOfStream,
}

/// Planner return signal.
///
/// `Constrained` is the one distinguished alternate outcome: while the
/// planner reports it, the control loop leaves its forward extent untouched
/// instead of resetting it to the configured default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerSignal {
    /// Normal planning outcome.
    Clear,
    /// The planner is operating under a constrained forward window.
    Constrained,
}

/// Why the control loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The lane detector's input stream ended.
    EndOfInput,
    /// The operator raised the abort flag between cycles.
    Aborted,
    /// The configured cycle bound was reached.
    CycleLimit,
}

/// Terminal report emitted once at shutdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Wall-clock time the run started.
    pub started_at: DateTime<Utc>,
    /// Total completed cycles, warm-up cycles included.
    pub cycles: u64,
    /// Wall-clock duration of the whole run, in seconds.
    pub elapsed_secs: f64,
    /// Observed cycle rate over the whole run.
    pub cycles_per_second: f64,
    /// What ended the loop.
    pub stop: StopReason,
}

/// Global error type for the rover stack.
#[derive(Error, Debug)]
pub enum RoverError {
    /// The target selector received an index outside the 3-bit domain.
    /// Structurally impossible under correct configuration; the process
    /// halts with this diagnostic rather than producing a bad target.
    #[error("target selector index {0} is outside the valid 0..=7 domain")]
    InvalidSelector(u8),

    /// A heading or positioning sensor failed hard mid-cycle.
    #[error("sensor fault on {component}: {details}")]
    SensorFault { component: String, details: String },

    /// The run configuration is inconsistent (e.g. a modality enabled
    /// without a producer wired for it).
    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_index_encodes_three_bits() {
        let none = ModalitySet::default();
        assert_eq!(none.selector_index(), 0);

        let imu_only = ModalitySet {
            inertial_heading: true,
            ..Default::default()
        };
        assert_eq!(imu_only.selector_index(), 1);

        let lane_only = ModalitySet {
            visual_lane: true,
            ..Default::default()
        };
        assert_eq!(lane_only.selector_index(), 2);

        let gps_only = ModalitySet {
            satellite_position: true,
            ..Default::default()
        };
        assert_eq!(gps_only.selector_index(), 4);

        let all = ModalitySet {
            satellite_position: true,
            visual_lane: true,
            inertial_heading: true,
            ..Default::default()
        };
        assert_eq!(all.selector_index(), 7);
    }

    #[test]
    fn grid_feeders_do_not_branch_selection() {
        let feeders = ModalitySet {
            range_scan: true,
            stereo: true,
            ..Default::default()
        };
        assert_eq!(feeders.selector_index(), 0);
        assert!(!feeders.needs_warmup());
    }

    #[test]
    fn warmup_required_for_heading_or_position() {
        let imu = ModalitySet {
            inertial_heading: true,
            ..Default::default()
        };
        assert!(imu.needs_warmup());

        let gps = ModalitySet {
            satellite_position: true,
            ..Default::default()
        };
        assert!(gps.needs_warmup());

        let lane = ModalitySet {
            visual_lane: true,
            ..Default::default()
        };
        assert!(!lane.needs_warmup());
    }

    #[test]
    fn modality_set_serde_roundtrip() {
        let set = ModalitySet {
            satellite_position: true,
            inertial_heading: true,
            range_scan: true,
            ..Default::default()
        };
        let json = serde_json::to_string(&set).unwrap();
        let back: ModalitySet = serde_json::from_str(&json).unwrap();
        assert_eq!(set, back);
    }

    #[test]
    fn target_clamped_keeps_in_bounds() {
        let t = Target::clamped(-5.0, 1200.0, 1000);
        assert_eq!(t, Target { x: 0, y: 999 });

        let inside = Target::clamped(500.0, 100.0, 1000);
        assert_eq!(inside, Target { x: 500, y: 100 });
    }

    #[test]
    fn target_clamped_truncates_fractions() {
        let t = Target::clamped(499.9, 100.2, 1000);
        assert_eq!(t, Target { x: 499, y: 100 });
    }

    #[test]
    fn lane_mode_serde_uses_lowercase() {
        let json = serde_json::to_string(&LaneMode::Hough).unwrap();
        assert_eq!(json, "\"hough\"");
        let back: LaneMode = serde_json::from_str("\"both\"").unwrap();
        assert_eq!(back, LaneMode::Both);
    }

    #[test]
    fn invalid_selector_error_names_the_index() {
        let err = RoverError::InvalidSelector(8);
        assert!(err.to_string().contains('8'));
    }

    #[test]
    fn run_report_serde_roundtrip() {
        let report = RunReport {
            started_at: Utc::now(),
            cycles: 40,
            elapsed_secs: 2.5,
            cycles_per_second: 16.0,
            stop: StopReason::EndOfInput,
        };
        let json = serde_json::to_string(&report).unwrap();
        let back: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, back);
    }
}
