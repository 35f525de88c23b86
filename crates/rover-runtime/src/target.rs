//! Target acquisition – eight geometric strategies keyed by the modality
//! index.
//!
//! The selector is a pure function from (strategy, fused state, grid
//! geometry) to a single navigation target. The strategy is keyed by the
//! 3-bit modality index `4·gps + 2·lane + 1·imu`; anything outside `0..=7`
//! is structurally impossible and halts the run with a diagnostic rather
//! than producing a bad target.
//!
//! Two strategies are computed locally:
//!
//! - **Fallback** (no positioning/lane/heading modality): a pseudo-random
//!   point inside a fixed sub-region of the grid, so the planner always
//!   receives *some* target rather than stalling.
//! - **Heading projection** (inertial heading only): project the angular
//!   deviation from the latched reference heading onto the grid's forward
//!   strip; large deviations pin the target to the grid's turn-in edges.
//!
//! The remaining six strategies belong to external lane/position
//! collaborators and are reported as [`TargetDecision::Delegated`]; the
//! control loop keeps its previous target for those, which is intentional
//! degradation, not an error.

use rand::Rng;
use rover_perception::FusedState;
use rover_types::{RoverError, Target};
use tracing::debug;

// ────────────────────────────────────────────────────────────────────────────
// Strategy dispatch
// ────────────────────────────────────────────────────────────────────────────

/// The eight target-computation strategies, keyed by the 3-bit modality
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStrategy {
    /// 0b000 – no branching modality; pseudo-random fallback target.
    Fallback,
    /// 0b001 – inertial heading only; reference-relative projection.
    HeadingProjection,
    /// 0b010 – visual lane only; lane-following geometry (external).
    LaneFollow,
    /// 0b011 – lane + heading combination (external).
    LaneAndHeading,
    /// 0b100 – satellite position only; absolute-to-grid projection
    /// (external).
    PositionProjection,
    /// 0b101 – position + heading combination (external).
    PositionAndHeading,
    /// 0b110 – position + lane combination (external).
    PositionAndLane,
    /// 0b111 – all three modalities (external).
    FullFusion,
}

impl TargetStrategy {
    /// Map a modality index to its strategy.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::InvalidSelector`] for any index above 7. That
    /// value cannot arise from a well-formed
    /// [`ModalitySet`](rover_types::ModalitySet), so it indicates a
    /// configuration or logic defect and the caller must halt.
    pub fn from_index(index: u8) -> Result<Self, RoverError> {
        match index {
            0 => Ok(Self::Fallback),
            1 => Ok(Self::HeadingProjection),
            2 => Ok(Self::LaneFollow),
            3 => Ok(Self::LaneAndHeading),
            4 => Ok(Self::PositionProjection),
            5 => Ok(Self::PositionAndHeading),
            6 => Ok(Self::PositionAndLane),
            7 => Ok(Self::FullFusion),
            other => Err(RoverError::InvalidSelector(other)),
        }
    }
}

/// What the selector produced for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetDecision {
    /// A locally computed, in-bounds target.
    Computed(Target),
    /// The strategy belongs to an external collaborator; the loop keeps its
    /// previous target.
    Delegated(TargetStrategy),
}

/// Run one cycle of target selection.
///
/// `forward_extent` is the grid's usable forward depth in cells (default
/// `0.875 · size`). The RNG only feeds the fallback strategy; production
/// callers reseed it from wall-clock time each cycle.
///
/// Warm-up guarantees the reference heading is latched before the selector
/// ever runs with [`TargetStrategy::HeadingProjection`]; an unlatched
/// reference reads as 0°.
pub fn select<R: Rng>(
    strategy: TargetStrategy,
    state: &FusedState,
    grid_size: usize,
    forward_extent: f64,
    rng: &mut R,
) -> TargetDecision {
    match strategy {
        TargetStrategy::Fallback => {
            TargetDecision::Computed(fallback_target(grid_size, rng))
        }
        TargetStrategy::HeadingProjection => {
            let reference = state.reference_heading().unwrap_or_default();
            TargetDecision::Computed(heading_projection(
                state.heading,
                reference,
                grid_size,
                forward_extent,
            ))
        }
        delegated => {
            debug!(strategy = ?delegated, "target strategy delegated to external collaborator");
            TargetDecision::Delegated(delegated)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Geometry
// ────────────────────────────────────────────────────────────────────────────

/// Signed angular deviation `reference − heading` in degrees, wrapped to the
/// shortest arc in `(−180, 180]`.
///
/// The wrap removes the discontinuity at the 0°/360° boundary: a reference
/// of 10° against a heading of 350° and against a heading of −10° both
/// deviate by 20°.
pub fn angular_deviation(reference: f64, heading: f64) -> f64 {
    let alpha = (reference - heading).rem_euclid(360.0);
    if alpha > 180.0 { alpha - 360.0 } else { alpha }
}

/// Heading-projection strategy: place the target where the latched
/// reference direction intersects the grid's forward strip.
///
/// With the deviation `alpha` inside the representable half-angle
/// `beta = atan(0.4·size / forward_extent)` the target sits dead ahead,
/// offset laterally by `forward_extent · tan(alpha)`. Beyond `beta` the
/// target pins to the right (0.9·size) or left (0.1·size) edge with the
/// vertical position preserving the turn-in geometry. The residual branch
/// (unreachable for finite inputs) defaults to dead-ahead at the vehicle
/// cell.
pub fn heading_projection(
    heading: f64,
    reference: f64,
    grid_size: usize,
    forward_extent: f64,
) -> Target {
    let s = grid_size as f64;
    let alpha = angular_deviation(reference, heading).to_radians();
    let beta = (0.4 * s / forward_extent).atan();

    let (x, y) = if (-beta..=beta).contains(&alpha) {
        (0.5 * s + forward_extent * alpha.tan(), forward_extent + 0.1 * s)
    } else if alpha > beta {
        (0.9 * s, 0.1 * s + 0.4 * s / alpha.tan())
    } else if alpha < -beta {
        (0.1 * s, 0.1 * s - 0.4 * s / alpha.tan())
    } else {
        (0.5 * s, 0.1 * s)
    };

    Target::clamped(x, y, grid_size)
}

/// Fallback target: a pseudo-random point inside the fixed sub-region
/// `x ∈ [0.1·size, 0.8·size)`, `y ∈ [0.2·size, 0.9·size)` near the grid's
/// forward centre.
pub fn fallback_target<R: Rng>(grid_size: usize, rng: &mut R) -> Target {
    let s = grid_size as f64;
    let x = rng.gen_range((0.1 * s)..(0.8 * s));
    let y = rng.gen_range((0.2 * s)..(0.9 * s));
    Target::clamped(x, y, grid_size)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const SIZE: usize = 1000;
    const EXTENT: f64 = 875.0;

    #[test]
    fn from_index_covers_the_three_bit_domain() {
        assert_eq!(TargetStrategy::from_index(0).unwrap(), TargetStrategy::Fallback);
        assert_eq!(
            TargetStrategy::from_index(1).unwrap(),
            TargetStrategy::HeadingProjection
        );
        assert_eq!(TargetStrategy::from_index(2).unwrap(), TargetStrategy::LaneFollow);
        assert_eq!(
            TargetStrategy::from_index(3).unwrap(),
            TargetStrategy::LaneAndHeading
        );
        assert_eq!(
            TargetStrategy::from_index(4).unwrap(),
            TargetStrategy::PositionProjection
        );
        assert_eq!(
            TargetStrategy::from_index(5).unwrap(),
            TargetStrategy::PositionAndHeading
        );
        assert_eq!(
            TargetStrategy::from_index(6).unwrap(),
            TargetStrategy::PositionAndLane
        );
        assert_eq!(TargetStrategy::from_index(7).unwrap(), TargetStrategy::FullFusion);
    }

    #[test]
    fn out_of_domain_index_is_fatal() {
        let err = TargetStrategy::from_index(8).unwrap_err();
        assert!(matches!(err, RoverError::InvalidSelector(8)));
        assert!(TargetStrategy::from_index(255).is_err());
    }

    #[test]
    fn zero_deviation_on_matching_headings() {
        assert_eq!(angular_deviation(0.0, 0.0), 0.0);
        assert_eq!(angular_deviation(90.0, 90.0), 0.0);
        assert_eq!(angular_deviation(-45.0, -45.0), 0.0);
    }

    #[test]
    fn deviation_wraps_across_the_zero_boundary() {
        // reference=10° against heading=350° and heading=-10° are the same
        // 20° deviation.
        let wrapped = angular_deviation(10.0, 350.0);
        let signed = angular_deviation(10.0, -10.0);
        assert!((wrapped - 20.0).abs() < 1e-9);
        assert!((signed - 20.0).abs() < 1e-9);
        assert!((wrapped.abs() - signed.abs()).abs() < 1e-9);
    }

    #[test]
    fn deviation_is_signed() {
        // Heading to the left of the reference pulls positive, to the right
        // pulls negative.
        assert!((angular_deviation(10.0, 30.0) + 20.0).abs() < 1e-9);
        assert!((angular_deviation(350.0, 10.0) + 20.0).abs() < 1e-9);
    }

    #[test]
    fn deviation_stays_in_half_open_arc() {
        for reference in [-359.0, -180.0, 0.0, 10.0, 180.0, 359.0] {
            for heading in [-359.0, -90.0, 0.0, 90.0, 350.0] {
                let alpha = angular_deviation(reference, heading);
                assert!(
                    alpha > -180.0 && alpha <= 180.0,
                    "alpha({reference}, {heading}) = {alpha} out of (-180, 180]"
                );
            }
        }
    }

    #[test]
    fn on_heading_projects_dead_ahead() {
        let target = heading_projection(0.0, 0.0, SIZE, EXTENT);
        assert_eq!(target, Target { x: 500, y: 975 });
    }

    #[test]
    fn small_deviation_offsets_laterally() {
        // 10° is inside beta = atan(400/875) ≈ 24.57°.
        let target = heading_projection(0.0, 10.0, SIZE, EXTENT);
        let expected_x = 500.0 + 875.0 * 10.0_f64.to_radians().tan();
        assert_eq!(target.y, 975);
        assert_eq!(target.x, expected_x as usize);
    }

    #[test]
    fn large_positive_deviation_pins_right_edge() {
        // alpha = 45° > beta: right edge, y = 0.1·s + 0.4·s / tan(45°).
        let target = heading_projection(0.0, 45.0, SIZE, EXTENT);
        assert_eq!(target, Target { x: 900, y: 500 });
    }

    #[test]
    fn large_negative_deviation_pins_left_edge() {
        let target = heading_projection(0.0, -45.0, SIZE, EXTENT);
        assert_eq!(target, Target { x: 100, y: 500 });
    }

    #[test]
    fn edge_targets_stay_in_bounds_for_extreme_deviations() {
        // Past 90° the turn-in expression goes negative; the target must
        // still be a valid cell.
        for heading in [120.0, 175.0, -120.0, -175.0] {
            let target = heading_projection(0.0, heading, SIZE, EXTENT);
            assert!(target.x < SIZE);
            assert!(target.y < SIZE);
        }
    }

    #[test]
    fn fallback_stays_in_declared_sub_region() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let target = fallback_target(SIZE, &mut rng);
            assert!((100..800).contains(&target.x), "x = {}", target.x);
            assert!((200..900).contains(&target.y), "y = {}", target.y);
        }
    }

    #[test]
    fn select_computes_fallback_and_heading_branches() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = FusedState::new();
        state.latch_reference(0.0);

        let fallback = select(TargetStrategy::Fallback, &state, SIZE, EXTENT, &mut rng);
        assert!(matches!(fallback, TargetDecision::Computed(_)));

        let projected = select(
            TargetStrategy::HeadingProjection,
            &state,
            SIZE,
            EXTENT,
            &mut rng,
        );
        assert_eq!(
            projected,
            TargetDecision::Computed(Target { x: 500, y: 975 })
        );
    }

    #[test]
    fn reserved_strategies_are_delegated() {
        let mut rng = StdRng::seed_from_u64(7);
        let state = FusedState::new();
        for strategy in [
            TargetStrategy::LaneFollow,
            TargetStrategy::LaneAndHeading,
            TargetStrategy::PositionProjection,
            TargetStrategy::PositionAndHeading,
            TargetStrategy::PositionAndLane,
            TargetStrategy::FullFusion,
        ] {
            assert_eq!(
                select(strategy, &state, SIZE, EXTENT, &mut rng),
                TargetDecision::Delegated(strategy)
            );
        }
    }
}
