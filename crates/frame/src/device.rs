use crate::error::FrameError;

/// A reusable command recording buffer.
///
/// `reset` must never be called while the consumer may still read the
/// commands last returned by `close`; the pump guarantees this.
pub trait CommandRecorder {
    /// Closed, submittable form of the recorded commands.
    type Commands;

    /// Whether the recorder currently accepts commands.
    fn is_recording(&self) -> bool;

    /// Stop accepting commands and hand out the recorded list.
    fn close(&mut self) -> Result<Self::Commands, FrameError>;

    /// Discard previous contents and start a new recording.
    fn reset(&mut self) -> Result<(), FrameError>;
}

/// The submission side of a device queue plus its completion counter.
///
/// Submissions and signals execute in FIFO order.
pub trait SubmitQueue {
    type Commands;
    /// Something that can be presented once rendered, e.g. a swap chain image.
    type Surface;

    fn submit(&mut self, commands: Self::Commands) -> Result<(), FrameError>;

    fn present(&mut self, surface: Self::Surface) -> Result<(), FrameError>;

    /// Ask the consumer to set its marker to `value` once all prior work retires.
    fn signal(&mut self, value: u64) -> Result<(), FrameError>;

    /// Highest value the consumer has retired so far.
    fn completed_value(&self) -> u64;

    /// Block until the marker reaches `value`. Must not spin.
    fn wait_for(&mut self, value: u64) -> Result<(), FrameError>;
}
