//! The per-event decision pipeline and its input/output types.

pub mod input;
pub mod pipeline;
pub mod word;

pub use input::EventInput;
pub use pipeline::{TriggerDecision, Verdict, VerdictStatus};
pub use word::{derive_hardware_summary, HardwareSummary, TriggerWord};
