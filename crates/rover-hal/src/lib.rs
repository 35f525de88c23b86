//! `rover-hal` – sensor-producer and planner trait seams.
//!
//! The control loop never talks to hardware directly. Every collaborator it
//! depends on is a trait defined here, so drivers can be swapped (or
//! simulated) without touching the fusion or selection logic.
//!
//! # Modules
//!
//! - [`scanner`] – [`RangeScanner`][scanner::RangeScanner] and
//!   [`DepthMapper`][scanner::DepthMapper]: rasterise obstacle returns into
//!   the occupancy grid.
//! - [`lane`] – [`LaneDetector`][lane::LaneDetector]: project detected lane
//!   markings into the grid; signals end-of-stream for graceful shutdown.
//! - [`heading`] – [`HeadingSensor`][heading::HeadingSensor]: one yaw sample
//!   per cycle.
//! - [`positioning`] – [`PositionSensor`][positioning::PositionSensor]: one
//!   latitude/longitude fix per cycle.
//! - [`planner`] – [`Planner`][planner::Planner]: consumes the grid and the
//!   cycle's target.
//! - [`display`] – [`GridRenderer`][display::GridRenderer]: best-effort grid
//!   visualisation hook.
//! - [`sim`] – recording stub implementations of every trait so the full
//!   loop runs headless in tests and CI.
//!
//! Every producer call must return within a bounded per-cycle budget: the
//! loop is single-threaded and a producer that never returns stalls the
//! whole vehicle.

pub mod display;
pub mod heading;
pub mod lane;
pub mod planner;
pub mod positioning;
pub mod scanner;
pub mod sim;

pub use display::GridRenderer;
pub use heading::HeadingSensor;
pub use lane::LaneDetector;
pub use planner::Planner;
pub use positioning::PositionSensor;
pub use scanner::{DepthMapper, RangeScanner};
