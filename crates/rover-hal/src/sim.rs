//! In-process simulated producers for headless testing.
//!
//! Stub implementations of every seam in this crate, recording enough of
//! what they saw that a test can drive the full control loop without any
//! physical sensor and assert on the interactions afterwards.
//!
//! The recorders are shared handles (`Arc`), so a test can keep a clone
//! before boxing the stub into the loop.
//!
//! # Example
//!
//! ```rust
//! use rover_hal::sim::SimPlanner;
//! use rover_hal::Planner;
//! use rover_perception::OccupancyGrid;
//! use rover_types::Target;
//!
//! let mut planner = SimPlanner::new();
//! let log = planner.target_log();
//!
//! let grid = OccupancyGrid::new(100);
//! planner.navigate(&grid, Target { x: 50, y: 90 }, 0, 0.0);
//!
//! assert_eq!(log.lock().unwrap().len(), 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use rover_perception::OccupancyGrid;
use rover_types::{LaneMode, LaneOutcome, PlannerSignal, PositionFix, RoverError, ScanOutcome, Target};
use tracing::debug;

use crate::display::GridRenderer;
use crate::heading::HeadingSensor;
use crate::lane::LaneDetector;
use crate::planner::Planner;
use crate::positioning::PositionSensor;
use crate::scanner::{DepthMapper, RangeScanner};

// ────────────────────────────────────────────────────────────────────────────
// Range scanner / depth mapper stubs
// ────────────────────────────────────────────────────────────────────────────

/// A simulated range scanner that marks a fixed obstacle pattern every
/// cycle. An empty pattern behaves as a scanner with no fresh sample.
pub struct SimRangeScanner {
    id: String,
    cells: Vec<(usize, usize)>,
    sweeps: Arc<AtomicU64>,
}

impl SimRangeScanner {
    /// Create a scanner that marks `cells` on every populate call.
    pub fn new(id: impl Into<String>, cells: Vec<(usize, usize)>) -> Self {
        Self {
            id: id.into(),
            cells,
            sweeps: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Shared counter of populate calls.
    pub fn sweep_count(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.sweeps)
    }
}

impl RangeScanner for SimRangeScanner {
    fn id(&self) -> &str {
        &self.id
    }

    fn populate(&mut self, grid: &mut OccupancyGrid) -> ScanOutcome {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        if self.cells.is_empty() {
            return ScanOutcome::NoData;
        }
        for &(x, y) in &self.cells {
            grid.mark_occupied(x, y);
        }
        ScanOutcome::Updated
    }
}

/// A simulated stereo depth mapper with the same behavior as
/// [`SimRangeScanner`].
pub struct SimDepthMapper {
    id: String,
    cells: Vec<(usize, usize)>,
}

impl SimDepthMapper {
    /// Create a mapper that marks `cells` on every populate call.
    pub fn new(id: impl Into<String>, cells: Vec<(usize, usize)>) -> Self {
        Self {
            id: id.into(),
            cells,
        }
    }
}

impl DepthMapper for SimDepthMapper {
    fn id(&self) -> &str {
        &self.id
    }

    fn populate(&mut self, grid: &mut OccupancyGrid) -> ScanOutcome {
        if self.cells.is_empty() {
            return ScanOutcome::NoData;
        }
        for &(x, y) in &self.cells {
            grid.mark_occupied(x, y);
        }
        ScanOutcome::Updated
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lane detector stub
// ────────────────────────────────────────────────────────────────────────────

/// A simulated lane detector backed by a finite recorded stream.
///
/// Marks a fixed lane pattern for `frames` calls, then reports
/// [`LaneOutcome::EndOfStream`] forever.
pub struct SimLaneDetector {
    id: String,
    frames_left: u32,
    cells: Vec<(usize, usize)>,
    last_mode: Option<LaneMode>,
    last_scale: Option<u32>,
}

impl SimLaneDetector {
    /// Create a detector with `frames` frames of recorded input that each
    /// project `cells` into the grid.
    pub fn new(id: impl Into<String>, frames: u32, cells: Vec<(usize, usize)>) -> Self {
        Self {
            id: id.into(),
            frames_left: frames,
            cells,
            last_mode: None,
            last_scale: None,
        }
    }

    /// The mode passed to the most recent detect call.
    pub fn last_mode(&self) -> Option<LaneMode> {
        self.last_mode
    }

    /// The scale passed to the most recent detect call.
    pub fn last_scale(&self) -> Option<u32> {
        self.last_scale
    }
}

impl LaneDetector for SimLaneDetector {
    fn id(&self) -> &str {
        &self.id
    }

    fn detect(&mut self, grid: &mut OccupancyGrid, mode: LaneMode, scale: u32) -> LaneOutcome {
        self.last_mode = Some(mode);
        self.last_scale = Some(scale);
        if self.frames_left == 0 {
            debug!(detector = %self.id, "simulated frame stream exhausted");
            return LaneOutcome::EndOfStream;
        }
        self.frames_left -= 1;
        for &(x, y) in &self.cells {
            grid.mark_occupied(x, y);
        }
        LaneOutcome::Marked
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Heading / positioning stubs
// ────────────────────────────────────────────────────────────────────────────

/// A simulated heading sensor that replays a scripted yaw sequence.
///
/// Once the script is exhausted the last value repeats; an empty script
/// reads as a constant 0°.
pub struct SimHeadingSensor {
    id: String,
    script: Vec<f64>,
    cursor: usize,
    samples: Arc<AtomicU64>,
}

impl SimHeadingSensor {
    /// Create a sensor that replays `script` one sample per call.
    pub fn new(id: impl Into<String>, script: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            script,
            cursor: 0,
            samples: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A sensor that always reads `value`.
    pub fn constant(id: impl Into<String>, value: f64) -> Self {
        Self::new(id, vec![value])
    }

    /// Shared counter of sample calls.
    pub fn sample_count(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.samples)
    }
}

impl HeadingSensor for SimHeadingSensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn sample(&mut self) -> Result<f64, RoverError> {
        self.samples.fetch_add(1, Ordering::Relaxed);
        let value = match self.script.get(self.cursor) {
            Some(&v) => {
                if self.cursor + 1 < self.script.len() {
                    self.cursor += 1;
                }
                v
            }
            None => *self.script.last().unwrap_or(&0.0),
        };
        Ok(value)
    }
}

/// A simulated positioning receiver that always returns the same fix.
pub struct SimPositionSensor {
    id: String,
    fix: PositionFix,
}

impl SimPositionSensor {
    /// Create a receiver pinned to `fix`.
    pub fn new(id: impl Into<String>, fix: PositionFix) -> Self {
        Self { id: id.into(), fix }
    }
}

impl PositionSensor for SimPositionSensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn sample(&mut self) -> Result<PositionFix, RoverError> {
        Ok(self.fix)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Planner stub
// ────────────────────────────────────────────────────────────────────────────

/// A simulated planner that records every navigate call and returns a fixed
/// signal.
pub struct SimPlanner {
    id: String,
    signal: PlannerSignal,
    targets: Arc<Mutex<Vec<Target>>>,
}

impl SimPlanner {
    /// A planner that always reports [`PlannerSignal::Clear`].
    pub fn new() -> Self {
        Self::with_signal(PlannerSignal::Clear)
    }

    /// A planner that always reports `signal`.
    pub fn with_signal(signal: PlannerSignal) -> Self {
        Self {
            id: "sim_nav".to_string(),
            signal,
            targets: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared log of every target this planner has been handed, in call
    /// order. Its length is the invocation count.
    pub fn target_log(&self) -> Arc<Mutex<Vec<Target>>> {
        Arc::clone(&self.targets)
    }
}

impl Default for SimPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Planner for SimPlanner {
    fn id(&self) -> &str {
        &self.id
    }

    fn navigate(
        &mut self,
        _grid: &OccupancyGrid,
        target: Target,
        _cycle_index: u64,
        _heading: f64,
    ) -> PlannerSignal {
        if let Ok(mut log) = self.targets.lock() {
            log.push(target);
        }
        self.signal
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer stub
// ────────────────────────────────────────────────────────────────────────────

/// A simulated renderer that counts frames.
pub struct SimRenderer {
    frames: Arc<AtomicU64>,
}

impl SimRenderer {
    /// Create a renderer with a zeroed frame counter.
    pub fn new() -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Shared counter of rendered frames.
    pub fn frame_count(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.frames)
    }
}

impl Default for SimRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GridRenderer for SimRenderer {
    fn render(&mut self, _grid: &OccupancyGrid) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
