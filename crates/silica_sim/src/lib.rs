//! A process-level evaluator for generated hardware logic.
//!
//! This crate executes the element-tree subset the composition passes
//! emit, one clock cycle at a time: signal assignments land at the end of
//! the cycle, variable assignments take effect immediately and persist per
//! process. It exists to validate generated arbitration and handshake
//! logic cycle-by-cycle; it is not a general VHDL simulator.

#![warn(missing_docs)]

pub mod simulation;
pub mod value;

pub use simulation::Simulation;
pub use value::Value;
