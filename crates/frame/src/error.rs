use crate::pump::FrameState;

/// Whether the process can keep rendering after an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Skip the current frame, log, continue.
    Recoverable,
    /// Tear down and exit.
    Fatal,
}

/// Errors from the frame pump and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame step out of order: expected {expected:?}, pump is {actual:?}")]
    OutOfOrder {
        expected: FrameState,
        actual: FrameState,
    },
    #[error("frame pump needs at least one recorder")]
    NoRecorders,
    #[error("recorder is closed")]
    RecorderClosed,
    #[error("recorder is already closed")]
    AlreadyClosed,
    #[error("reset of slot {slot} while in flight: marker {completed} < retire value {retire}")]
    ResetWhileInFlight {
        slot: usize,
        completed: u64,
        retire: u64,
    },
    #[error("command buffer still referenced by {readers} pending submission(s)")]
    BufferInUse { readers: u32 },
    #[error("signal value {value} is not above the last signaled value {last}")]
    SignalNotMonotonic { value: u64, last: u64 },
    #[error("wait for {value} can never complete: last signaled value is {last}")]
    WaitUnsignaled { value: u64, last: u64 },
    #[error("surface unavailable: {0}")]
    SurfaceUnavailable(String),
    #[error("device lost: {0}")]
    DeviceLost(String),
    #[error("consumer disconnected")]
    Disconnected,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    pub fn severity(&self) -> Severity {
        match self {
            Self::SurfaceUnavailable(_) => Severity::Recoverable,
            _ => Severity::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_surface_errors_are_recoverable() {
        assert!(!FrameError::SurfaceUnavailable("outdated".into()).is_fatal());
        assert!(FrameError::Disconnected.is_fatal());
        assert!(FrameError::DeviceLost("removed".into()).is_fatal());
        assert!(
            FrameError::ResetWhileInFlight {
                slot: 0,
                completed: 1,
                retire: 2
            }
            .is_fatal()
        );
    }

    #[test]
    fn messages_name_the_values() {
        let e = FrameError::SignalNotMonotonic { value: 3, last: 3 };
        assert_eq!(
            e.to_string(),
            "signal value 3 is not above the last signaled value 3"
        );
    }
}
