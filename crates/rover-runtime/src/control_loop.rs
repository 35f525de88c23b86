//! [`ControlLoop`] – the per-cycle perception-to-action driver.
//!
//! Each cycle, strictly in order:
//!
//! 1. Reset the occupancy grid.
//! 2. Let every enabled producer repopulate it (stereo depth, range scan,
//!    visual lanes) and refresh the fused scalars (heading, position).
//! 3. Run the warm-up gate; a held cycle ends here, still advancing the
//!    cycle counter.
//! 4. Render the grid (best-effort collaborator).
//! 5. Select the cycle's navigation target.
//! 6. Hand grid + target to the planner and interpret its signal.
//! 7. Advance the cycle counter.
//!
//! One cycle runs to completion before the next begins; no stage overlaps
//! another. Producers may buffer internally, but each per-cycle call must
//! return within a bounded budget: a producer that never returns stalls the
//! vehicle.
//!
//! Three things end the loop: lane-detector end-of-input, the operator
//! abort flag (checked once per cycle boundary), and the configured cycle
//! bound. All are graceful; the run finishes with a [`RunReport`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use rover_hal::{
    DepthMapper, GridRenderer, HeadingSensor, LaneDetector, Planner, PositionSensor, RangeScanner,
};
use rover_perception::{FusedState, OccupancyGrid};
use rover_types::{
    LaneMode, LaneOutcome, ModalitySet, PlannerSignal, RoverError, RunReport, ScanOutcome,
    StopReason, Target,
};

use crate::target::{self, TargetDecision, TargetStrategy};
use crate::warmup::{GateDecision, WarmupGate};

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Configuration bundle for [`ControlLoop`].
#[derive(Debug, Clone)]
pub struct ControlLoopConfig {
    /// Which modalities this run has enabled. Fixed for the run's lifetime.
    pub modalities: ModalitySet,
    /// Side length of the square occupancy grid, in cells.
    pub grid_size: usize,
    /// Heading settling window K₁, in cycles.
    pub heading_warmup_cycles: u32,
    /// Position acquisition window K₂, in cycles.
    pub position_warmup_cycles: u32,
    /// Pause applied on each heading-settling cycle while the inertial unit
    /// stabilises.
    pub heading_settle_delay: Duration,
    /// Default usable forward extent of the grid, as a fraction of its size.
    pub forward_extent_ratio: f64,
    /// Whether a non-[`Constrained`][PlannerSignal::Constrained] planner
    /// signal resets the forward extent to its default.
    pub extent_reset_on_clear: bool,
    /// Lane extraction mode handed to the lane detector each cycle.
    pub lane_mode: LaneMode,
    /// Lane projection scale handed to the lane detector each cycle.
    pub lane_scale: u32,
    /// Optional bound on total cycles; `None` runs until a producer or the
    /// operator ends the loop.
    pub max_cycles: Option<u64>,
}

impl Default for ControlLoopConfig {
    fn default() -> Self {
        Self {
            modalities: ModalitySet::default(),
            grid_size: 1000,
            heading_warmup_cycles: 5,
            position_warmup_cycles: 35,
            heading_settle_delay: Duration::from_millis(200),
            forward_extent_ratio: 0.875,
            extent_reset_on_clear: true,
            lane_mode: LaneMode::Color,
            lane_scale: 1,
            max_cycles: None,
        }
    }
}

/// The set of collaborator handles the loop drives.
///
/// Every slot is optional; [`ControlLoop::new`] verifies that each enabled
/// modality has its producer wired. Planner and renderer are independent of
/// the modality set and simply skipped when absent.
#[derive(Default)]
pub struct SensorSuite {
    pub depth_mapper: Option<Box<dyn DepthMapper>>,
    pub range_scanner: Option<Box<dyn RangeScanner>>,
    pub lane_detector: Option<Box<dyn LaneDetector>>,
    pub heading_sensor: Option<Box<dyn HeadingSensor>>,
    pub position_sensor: Option<Box<dyn PositionSensor>>,
    pub planner: Option<Box<dyn Planner>>,
    pub renderer: Option<Box<dyn GridRenderer>>,
}

// ────────────────────────────────────────────────────────────────────────────
// ControlLoop
// ────────────────────────────────────────────────────────────────────────────

/// How one cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEvent {
    /// Full cycle: producers, target selection, planning all ran.
    Completed,
    /// Warm-up held the cycle after sensor sampling.
    Warming,
    /// The lane detector's input stream is exhausted.
    EndOfInput,
}

/// The top-level control loop. Owns the grid, the fused state, the warm-up
/// gate, and every collaborator handle for the lifetime of the run.
pub struct ControlLoop {
    config: ControlLoopConfig,
    suite: SensorSuite,
    grid: OccupancyGrid,
    state: FusedState,
    gate: WarmupGate,
    forward_extent: f64,
    last_target: Target,
    abort: Arc<AtomicBool>,
}

impl std::fmt::Debug for ControlLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("config", &self.config)
            .field("forward_extent", &self.forward_extent)
            .field("last_target", &self.last_target)
            .field("abort", &self.abort)
            .finish_non_exhaustive()
    }
}

impl ControlLoop {
    /// Build the loop, verifying that every enabled modality has a producer.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Config`] when a modality is enabled in
    /// `config.modalities` but its slot in `suite` is empty.
    pub fn new(config: ControlLoopConfig, suite: SensorSuite) -> Result<Self, RoverError> {
        let m = &config.modalities;
        if m.stereo && suite.depth_mapper.is_none() {
            return Err(RoverError::Config(
                "stereo modality enabled without a depth mapper".to_string(),
            ));
        }
        if m.range_scan && suite.range_scanner.is_none() {
            return Err(RoverError::Config(
                "range-scan modality enabled without a scanner".to_string(),
            ));
        }
        if m.visual_lane && suite.lane_detector.is_none() {
            return Err(RoverError::Config(
                "visual-lane modality enabled without a lane detector".to_string(),
            ));
        }
        if m.inertial_heading && suite.heading_sensor.is_none() {
            return Err(RoverError::Config(
                "inertial-heading modality enabled without a heading sensor".to_string(),
            ));
        }
        if m.satellite_position && suite.position_sensor.is_none() {
            return Err(RoverError::Config(
                "satellite-position modality enabled without a position sensor".to_string(),
            ));
        }
        if suite.planner.is_none() {
            warn!("no planner wired; targets will be acquired but not acted on");
        }

        let gate = WarmupGate::new(
            m,
            config.heading_warmup_cycles,
            config.position_warmup_cycles,
        );
        let grid = OccupancyGrid::new(config.grid_size);
        let forward_extent = config.forward_extent_ratio * config.grid_size as f64;
        let last_target = Target {
            x: grid.vehicle_cell().0,
            y: grid.vehicle_cell().1,
        };

        Ok(Self {
            config,
            suite,
            grid,
            state: FusedState::new(),
            gate,
            forward_extent,
            last_target,
            abort: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Shared operator abort flag. Setting it to `true` ends the run at the
    /// next cycle boundary.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    /// The fused state as of the most recent cycle. Test and telemetry
    /// support; the loop itself owns all mutation.
    pub fn fused_state(&self) -> &FusedState {
        &self.state
    }

    /// Read-only view of the occupancy grid.
    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Current forward extent in cells.
    pub fn forward_extent(&self) -> f64 {
        self.forward_extent
    }

    /// Run cycles until a producer, the operator, or the cycle bound ends
    /// the loop, then emit the shutdown report.
    ///
    /// # Errors
    ///
    /// Propagates a hard sensor fault or the fatal invalid-selector
    /// condition; both halt the run immediately.
    pub fn run(&mut self) -> Result<RunReport, RoverError> {
        let started_at = Utc::now();
        let started = Instant::now();
        info!(modalities = ?self.config.modalities, grid_size = self.config.grid_size, "control loop starting");

        let stop = loop {
            if self.abort.load(Ordering::SeqCst) {
                info!("operator abort raised; ending run");
                break StopReason::Aborted;
            }
            if let Some(limit) = self.config.max_cycles
                && self.state.cycle_index() >= limit
            {
                break StopReason::CycleLimit;
            }
            match self.cycle()? {
                CycleEvent::Completed | CycleEvent::Warming => {}
                CycleEvent::EndOfInput => break StopReason::EndOfInput,
            }
        };

        let elapsed = started.elapsed();
        let cycles = self.state.cycle_index();
        let report = RunReport {
            started_at,
            cycles,
            elapsed_secs: elapsed.as_secs_f64(),
            cycles_per_second: cycles as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
            stop,
        };
        info!(
            cycles = report.cycles,
            cycles_per_second = report.cycles_per_second,
            stop = ?report.stop,
            "run complete"
        );
        Ok(report)
    }

    /// Execute one control cycle.
    ///
    /// # Errors
    ///
    /// Returns a hard [`RoverError::SensorFault`] from the heading or
    /// position sensor, or the fatal [`RoverError::InvalidSelector`].
    pub fn cycle(&mut self) -> Result<CycleEvent, RoverError> {
        // ── 1. Fresh window ───────────────────────────────────────────────
        self.grid.reset();

        // ── 2. Data acquisition ───────────────────────────────────────────
        // Stereo and range scan rasterise depth; lanes mark boundaries;
        // heading and position refresh the fused scalars.
        if self.config.modalities.stereo
            && let Some(mapper) = self.suite.depth_mapper.as_mut()
            && mapper.populate(&mut self.grid) == ScanOutcome::NoData
        {
            debug!(producer = mapper.id(), "no depth data this cycle");
        }
        if self.config.modalities.range_scan
            && let Some(scanner) = self.suite.range_scanner.as_mut()
            && scanner.populate(&mut self.grid) == ScanOutcome::NoData
        {
            debug!(producer = scanner.id(), "no scan data this cycle");
        }
        if self.config.modalities.visual_lane
            && let Some(detector) = self.suite.lane_detector.as_mut()
            && detector.detect(&mut self.grid, self.config.lane_mode, self.config.lane_scale)
                == LaneOutcome::EndOfStream
        {
            info!(producer = detector.id(), "end of input stream");
            return Ok(CycleEvent::EndOfInput);
        }
        if self.config.modalities.inertial_heading
            && let Some(sensor) = self.suite.heading_sensor.as_mut()
        {
            self.state.heading = sensor.sample()?;
            debug!(heading = self.state.heading, "heading sampled");
        }
        if self.config.modalities.satellite_position
            && let Some(sensor) = self.suite.position_sensor.as_mut()
        {
            let fix = sensor.sample()?;
            self.state.update_fix(fix);
        }

        // ── 3. Warm-up gate ───────────────────────────────────────────────
        if let GateDecision::Hold { settle_heading } = self.gate.admit(&mut self.state) {
            if settle_heading && !self.config.heading_settle_delay.is_zero() {
                std::thread::sleep(self.config.heading_settle_delay);
            }
            self.state.advance_cycle();
            return Ok(CycleEvent::Warming);
        }

        // ── 4. Display ────────────────────────────────────────────────────
        if let Some(renderer) = self.suite.renderer.as_mut() {
            renderer.render(&self.grid);
        }

        // ── 5. Target acquisition ─────────────────────────────────────────
        let strategy = TargetStrategy::from_index(self.config.modalities.selector_index())?;
        let mut rng = StdRng::seed_from_u64(wall_clock_seed());
        let target = match target::select(
            strategy,
            &self.state,
            self.config.grid_size,
            self.forward_extent,
            &mut rng,
        ) {
            TargetDecision::Computed(t) => {
                self.last_target = t;
                t
            }
            TargetDecision::Delegated(s) => {
                debug!(strategy = ?s, "delegated strategy; keeping previous target");
                self.last_target
            }
        };
        info!(
            cycle = self.state.cycle_index(),
            x = target.x,
            y = target.y,
            "target acquired"
        );

        // ── 6. Planning ───────────────────────────────────────────────────
        if let Some(planner) = self.suite.planner.as_mut() {
            let signal = planner.navigate(
                &self.grid,
                target,
                self.state.cycle_index(),
                self.state.heading,
            );
            if signal != PlannerSignal::Constrained && self.config.extent_reset_on_clear {
                self.forward_extent =
                    self.config.forward_extent_ratio * self.config.grid_size as f64;
            }
        }

        // ── 7. Bookkeeping ────────────────────────────────────────────────
        self.state.advance_cycle();
        Ok(CycleEvent::Completed)
    }
}

/// Per-cycle RNG seed from wall-clock seconds, matching the fallback
/// strategy's reseed-each-cycle contract.
fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
