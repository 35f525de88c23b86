//! Visual lane detection seam.

use rover_perception::OccupancyGrid;
use rover_types::{LaneMode, LaneOutcome};

/// A visual lane detector fed by a frame stream (camera or recording).
///
/// The detector owns its frame source: each call pulls the next frame,
/// extracts lane markings with the configured [`LaneMode`], and projects
/// them into the grid as occupied cells so the planner treats lane
/// boundaries as obstacles.
///
/// End of the frame stream is a normal termination signal for the whole
/// control loop, not an error.
pub trait LaneDetector: Send {
    /// Stable identifier for this detector, e.g. `"front_camera_lanes"`.
    fn id(&self) -> &str;

    /// Pull the next frame and mark detected lanes in `grid`.
    ///
    /// `scale` is the detector's projection tuning parameter (grid cells per
    /// image unit). Returns [`LaneOutcome::EndOfStream`] once the source is
    /// exhausted.
    fn detect(&mut self, grid: &mut OccupancyGrid, mode: LaneMode, scale: u32) -> LaneOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockLaneDetector {
        frames_left: u32,
    }

    impl LaneDetector for MockLaneDetector {
        fn id(&self) -> &str {
            "mock_lanes"
        }

        fn detect(
            &mut self,
            grid: &mut OccupancyGrid,
            _mode: LaneMode,
            _scale: u32,
        ) -> LaneOutcome {
            if self.frames_left == 0 {
                return LaneOutcome::EndOfStream;
            }
            self.frames_left -= 1;
            grid.mark_occupied(0, 0);
            LaneOutcome::Marked
        }
    }

    #[test]
    fn detector_signals_end_of_stream_when_exhausted() {
        let mut detector = MockLaneDetector { frames_left: 2 };
        let mut grid = OccupancyGrid::new(10);

        assert_eq!(
            detector.detect(&mut grid, LaneMode::Color, 1),
            LaneOutcome::Marked
        );
        assert_eq!(
            detector.detect(&mut grid, LaneMode::Color, 1),
            LaneOutcome::Marked
        );
        assert_eq!(
            detector.detect(&mut grid, LaneMode::Color, 1),
            LaneOutcome::EndOfStream
        );
    }
}
