//! [`WarmupGate`] – per-modality settling state machine.
//!
//! Some modalities need several cycles before their output is trustworthy:
//! the inertial unit needs a short settling window before its first reading
//! can serve as the heading baseline, and the satellite receiver needs a
//! longer acquisition window before fixes are stable. While any required
//! window is open the gate holds the cycle back: the loop still samples and
//! discards sensor data, still advances the cycle counter, but never touches
//! the render/target/plan stage.
//!
//! The gate moves `Init → Warming → Active` exactly once per run; no
//! modality ever re-enters warm-up. The reference heading is latched on
//! exactly the cycle where the heading counter reaches its window, even when
//! the position window is still open.
//!
//! # Example
//!
//! ```rust
//! use rover_runtime::warmup::{GateDecision, WarmupGate};
//! use rover_perception::FusedState;
//! use rover_types::ModalitySet;
//!
//! let modalities = ModalitySet {
//!     inertial_heading: true,
//!     ..Default::default()
//! };
//! let mut gate = WarmupGate::new(&modalities, 2, 35);
//! let mut state = FusedState::new();
//! state.heading = 7.0;
//!
//! assert!(matches!(gate.admit(&mut state), GateDecision::Hold { .. }));
//! assert!(matches!(gate.admit(&mut state), GateDecision::Hold { .. }));
//! // Third cycle: window elapsed, reference latched, cycle proceeds.
//! assert_eq!(gate.admit(&mut state), GateDecision::Proceed);
//! assert_eq!(state.reference_heading(), Some(7.0));
//! ```

use rover_perception::FusedState;
use rover_types::ModalitySet;
use tracing::{debug, info};

// ────────────────────────────────────────────────────────────────────────────
// Public types
// ────────────────────────────────────────────────────────────────────────────

/// Lifecycle of the gate across a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No cycle has been admitted yet.
    Init,
    /// At least one required settling window is still open.
    Warming,
    /// All windows have elapsed; terminal for the rest of the run.
    Active,
}

/// Per-cycle gate verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Still settling: the cycle must end right after sensor sampling.
    Hold {
        /// True while the heading window specifically is open; the loop
        /// applies its configured settle delay on these cycles.
        settle_heading: bool,
    },
    /// Warm-up complete: proceed to render, target selection, and planning.
    Proceed,
}

// ────────────────────────────────────────────────────────────────────────────
// WarmupGate
// ────────────────────────────────────────────────────────────────────────────

/// Tracks the heading and position settling windows and latches the
/// reference heading at the heading window's boundary.
#[derive(Debug)]
pub struct WarmupGate {
    heading_window: Option<u32>,
    position_window: Option<u32>,
    heading_elapsed: u32,
    position_elapsed: u32,
    state: GateState,
}

impl WarmupGate {
    /// Build the gate for one run.
    ///
    /// A window only exists for a modality that is enabled in `modalities`;
    /// with neither heading nor position enabled the gate admits every cycle
    /// from cycle 0.
    pub fn new(modalities: &ModalitySet, heading_cycles: u32, position_cycles: u32) -> Self {
        Self {
            heading_window: modalities.inertial_heading.then_some(heading_cycles),
            position_window: modalities.satellite_position.then_some(position_cycles),
            heading_elapsed: 0,
            position_elapsed: 0,
            state: GateState::Init,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Evaluate one cycle, right after sensor sampling.
    ///
    /// Counts the cycle against every still-open window. On the cycle the
    /// heading counter reaches its window the current heading sample is
    /// latched into `fused` as the reference heading; the latch fires even
    /// when the position window keeps the cycle held.
    pub fn admit(&mut self, fused: &mut FusedState) -> GateDecision {
        let mut settle_heading = false;
        let mut holding = false;

        if let Some(window) = self.heading_window {
            if self.heading_elapsed < window {
                self.heading_elapsed += 1;
                settle_heading = true;
                holding = true;
                debug!(
                    elapsed = self.heading_elapsed,
                    window, "heading reference settling"
                );
            } else if fused.reference_heading().is_none() {
                fused.latch_reference(fused.heading);
            }
        }

        if let Some(window) = self.position_window {
            if self.position_elapsed < window {
                self.position_elapsed += 1;
                holding = true;
                debug!(
                    elapsed = self.position_elapsed,
                    window, "position fix acquiring"
                );
            }
        }

        if holding {
            self.state = GateState::Warming;
            GateDecision::Hold { settle_heading }
        } else {
            if self.state != GateState::Active {
                info!("warm-up complete; entering active operation");
                self.state = GateState::Active;
            }
            GateDecision::Proceed
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
