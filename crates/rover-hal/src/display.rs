//! Best-effort grid visualisation hook.

use rover_perception::OccupancyGrid;

/// A read-only consumer that renders the grid each active cycle.
///
/// Rendering is a side channel: implementations must never mutate the grid
/// and must never block correctness. The control loop calls this after the
/// producers have populated the grid and before target selection, and
/// ignores whatever the renderer does with it.
pub trait GridRenderer: Send {
    /// Render or record one frame of the grid.
    fn render(&mut self, grid: &OccupancyGrid);
}
