//! `rover-runtime` – the perception-to-action control loop.
//!
//! Drives one control cycle at a time: reset the occupancy grid, let every
//! enabled producer repopulate it, gate on sensor warm-up, derive a single
//! navigation target, and hand grid + target to the planner.
//!
//! # Modules
//!
//! - [`warmup`] – [`WarmupGate`][warmup::WarmupGate]: per-modality settling
//!   state machine; withholds target computation until the inertial heading
//!   and satellite position references are trustworthy, and latches the
//!   reference heading exactly once.
//! - [`target`] – [`TargetStrategy`][target::TargetStrategy] and the
//!   selection functions: eight geometrically distinct strategies keyed by
//!   the 3-bit modality index, including the fully specified
//!   heading-projection geometry and the pseudo-random fallback.
//! - [`control_loop`] – [`ControlLoop`][control_loop::ControlLoop]: the
//!   top-level per-cycle driver with graceful termination and shutdown
//!   reporting.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: one-shot
//!   `tracing` subscriber setup honoring `RUST_LOG` and
//!   `ROVER_LOG_FORMAT=json`.
//!
//! The loop is single-threaded: every cycle runs to completion before the
//! next begins, so the grid and fused state can be mutated in place by
//! several producers without locking.

pub mod control_loop;
pub mod target;
pub mod telemetry;
pub mod warmup;

pub use control_loop::{ControlLoop, ControlLoopConfig, CycleEvent, SensorSuite};
pub use target::{TargetDecision, TargetStrategy};
pub use telemetry::init_tracing;
pub use warmup::{GateDecision, GateState, WarmupGate};
