//! Grid-populating range producers.
//!
//! Range scanning and stereo depth mapping share the same contract: each
//! cycle the producer gets a mutable borrow of the occupancy grid and marks
//! whatever obstacle cells its latest sample projects to. Neither can fail
//! fatally; a cycle with no fresh sample simply leaves the grid untouched.

use rover_perception::OccupancyGrid;
use rover_types::ScanOutcome;

/// A planar range scanner (e.g. a scanning laser) that rasterises obstacle
/// returns into the occupancy grid.
pub trait RangeScanner: Send {
    /// Stable identifier for this scanner, e.g. `"front_laser"`.
    fn id(&self) -> &str;

    /// Rasterise the latest scan into `grid`.
    ///
    /// Returns [`ScanOutcome::NoData`] when no new sample is available this
    /// cycle; the grid is left unchanged and the loop carries on.
    fn populate(&mut self, grid: &mut OccupancyGrid) -> ScanOutcome;
}

/// A stereo depth mapper that projects its disparity map into the grid.
///
/// Same contract as [`RangeScanner`]; kept as a separate seam because the
/// two devices are configured independently.
pub trait DepthMapper: Send {
    /// Stable identifier for this mapper, e.g. `"stereo_head"`.
    fn id(&self) -> &str;

    /// Project the latest depth map into `grid`.
    fn populate(&mut self, grid: &mut OccupancyGrid) -> ScanOutcome;
}
