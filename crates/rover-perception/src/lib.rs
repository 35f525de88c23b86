//! `rover-perception` – the vehicle's local world model.
//!
//! Maintains the forward-looking occupancy window around the vehicle and the
//! fused scalar state (heading, position, cycle counter) that the target
//! selector consumes.
//!
//! # Modules
//!
//! - [`grid`] – [`OccupancyGrid`][grid::OccupancyGrid]: fixed-size square
//!   boolean field, cleared and re-rasterised every control cycle.
//! - [`fusion`] – [`FusedState`][fusion::FusedState]: per-cycle heading and
//!   positioning scalars plus the once-latched reference heading.

pub mod fusion;
pub mod grid;

pub use fusion::FusedState;
pub use grid::OccupancyGrid;
