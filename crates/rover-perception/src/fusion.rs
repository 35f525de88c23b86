//! Fused navigation state.
//!
//! The scalar side of the world model: heading and satellite position as
//! refreshed by their producers each cycle, the reference heading latched
//! once at the end of warm-up, and the monotonic cycle counter.
//!
//! # Example
//!
//! ```rust
//! use rover_perception::fusion::FusedState;
//!
//! let mut state = FusedState::new();
//! state.heading = 12.5;
//!
//! assert!(state.latch_reference(12.5));
//! // The reference is immutable once set.
//! assert!(!state.latch_reference(90.0));
//! assert_eq!(state.reference_heading(), Some(12.5));
//! ```

use rover_types::PositionFix;
use tracing::info;

/// Per-run fused scalar state.
///
/// `heading`, `latitude`, and `longitude` are refreshed every cycle by their
/// producers. The reference heading is latched exactly once per run, on the
/// cycle the heading warm-up window elapses, and is the "forward" baseline
/// for every subsequent heading-relative target computation.
#[derive(Debug, Clone, Default)]
pub struct FusedState {
    /// Current heading in degrees, signed, vehicle-relative convention.
    pub heading: f64,
    /// Latest satellite latitude reading.
    pub latitude: f64,
    /// Latest satellite longitude reading.
    pub longitude: f64,
    reference_heading: Option<f64>,
    cycle_index: u64,
}

impl FusedState {
    /// Fresh state: zero heading and position, no reference, cycle 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch the reference heading. The first call wins and returns `true`;
    /// every later call is ignored and returns `false`.
    pub fn latch_reference(&mut self, value: f64) -> bool {
        if self.reference_heading.is_some() {
            return false;
        }
        info!(reference_heading = value, "reference heading latched");
        self.reference_heading = Some(value);
        true
    }

    /// The latched reference heading, `None` until warm-up completes.
    pub fn reference_heading(&self) -> Option<f64> {
        self.reference_heading
    }

    /// Store the latest satellite fix.
    pub fn update_fix(&mut self, fix: PositionFix) {
        self.latitude = fix.latitude;
        self.longitude = fix.longitude;
    }

    /// Monotonic count of completed cycles.
    pub fn cycle_index(&self) -> u64 {
        self.cycle_index
    }

    /// Count one completed cycle. Warm-up cycles advance too.
    pub fn advance_cycle(&mut self) {
        self.cycle_index += 1;
    }
}
