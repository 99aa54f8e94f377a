//! Frame Pump: the producer side of CPU/GPU frame synchronization.
//!
//! Each frame walks `Recording -> Submitted -> Signaled -> Awaited -> Recording`.
//! A monotonically increasing completion counter tags every submission, and a
//! recording buffer is only reset once the consumer's completion marker has
//! reached the value signaled for its last submission.
//!
//! # Invariants
//! - The counter increases by exactly one per submitted frame and is never reused.
//! - `reset` of a slot is causally after the marker reaches that slot's retire value.
//! - Shutdown drains all signaled work before resources are released.

mod device;
mod error;
mod pump;
pub mod sim;

pub use device::{CommandRecorder, SubmitQueue};
pub use error::{FrameError, Severity};
pub use pump::{FramePump, FrameState, PumpConfig, PumpStats};

pub fn crate_info() -> &'static str {
    "orbitframe-frame v0.1.0"
}
