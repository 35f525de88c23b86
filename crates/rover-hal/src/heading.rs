//! Inertial heading seam.

use rover_types::RoverError;

/// An inertial heading estimator sampled once per cycle.
///
/// Readings are yaw in degrees, signed, in the vehicle-relative convention
/// the fusion state expects. The first few readings after power-on are not
/// trustworthy; the runtime's warm-up gate discards them and latches the
/// reference heading once the settling window elapses.
pub trait HeadingSensor: Send {
    /// Stable identifier for this sensor, e.g. `"imu_yaw"`.
    fn id(&self) -> &str;

    /// Return the latest heading sample in degrees.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::SensorFault`] if the device fails hard (e.g.
    /// serial link lost). A merely stale reading is not an error.
    fn sample(&mut self) -> Result<f64, RoverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockHeading {
        value: f64,
    }

    impl HeadingSensor for MockHeading {
        fn id(&self) -> &str {
            "imu_yaw"
        }

        fn sample(&mut self) -> Result<f64, RoverError> {
            Ok(self.value)
        }
    }

    #[test]
    fn mock_heading_samples() {
        let mut sensor = MockHeading { value: -42.5 };
        assert_eq!(sensor.id(), "imu_yaw");
        assert!((sensor.sample().unwrap() + 42.5).abs() < 1e-9);
    }
}
