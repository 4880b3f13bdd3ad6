//! Dead-time/live-time state machine.

pub mod accumulator;

pub use accumulator::{LivetimeAccumulator, LivetimeState};
