//! Path planner seam.

use rover_perception::OccupancyGrid;
use rover_types::{PlannerSignal, Target};

/// The path planner/navigator the control loop hands each cycle's world
/// model to.
///
/// The planner reads the grid, plans toward `target`, and drives the
/// vehicle; all of that is its own concern. The loop only interprets the
/// returned [`PlannerSignal`]: on [`PlannerSignal::Constrained`] the loop
/// keeps its current forward extent, on [`PlannerSignal::Clear`] the extent
/// resets to the configured default.
pub trait Planner: Send {
    /// Stable identifier for this planner, e.g. `"lattice_nav"`.
    fn id(&self) -> &str;

    /// Plan one cycle toward `target`.
    fn navigate(
        &mut self,
        grid: &OccupancyGrid,
        target: Target,
        cycle_index: u64,
        heading: f64,
    ) -> PlannerSignal;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockPlanner {
        calls: u64,
    }

    impl Planner for MockPlanner {
        fn id(&self) -> &str {
            "mock_nav"
        }

        fn navigate(
            &mut self,
            _grid: &OccupancyGrid,
            _target: Target,
            _cycle_index: u64,
            _heading: f64,
        ) -> PlannerSignal {
            self.calls += 1;
            PlannerSignal::Clear
        }
    }

    #[test]
    fn mock_planner_counts_invocations() {
        let mut planner = MockPlanner { calls: 0 };
        let grid = OccupancyGrid::new(10);
        let target = Target { x: 5, y: 9 };
        assert_eq!(
            planner.navigate(&grid, target, 0, 0.0),
            PlannerSignal::Clear
        );
        assert_eq!(planner.calls, 1);
    }
}
