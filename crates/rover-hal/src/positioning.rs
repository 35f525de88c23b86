//! Satellite positioning seam.

use rover_types::{PositionFix, RoverError};

/// A satellite positioning reader sampled once per cycle.
///
/// Fixes during the acquisition window (the first K₂ cycles, by default 35)
/// are declared unreliable; the runtime's warm-up gate consumes and discards
/// them before normal operation begins.
pub trait PositionSensor: Send {
    /// Stable identifier for this sensor, e.g. `"gps_main"`.
    fn id(&self) -> &str;

    /// Return the latest fix.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::SensorFault`] if the receiver fails hard. A fix
    /// that merely repeats the previous cycle's reading is not an error.
    fn sample(&mut self) -> Result<PositionFix, RoverError>;
}
