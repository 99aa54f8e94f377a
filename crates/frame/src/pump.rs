use std::time::{Duration, Instant};

use crate::device::{CommandRecorder, SubmitQueue};
use crate::error::FrameError;

/// Where the pump is within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// The current slot's recorder accepts commands.
    Recording,
    /// Commands are closed and handed to the queue.
    Submitted,
    /// A fresh counter value has been pushed to the queue.
    Signaled,
    /// The next slot's work has retired; its recorder may be reset.
    Awaited,
}

/// Pump configuration.
#[derive(Debug, Clone)]
pub struct PumpConfig {
    /// Number of recording buffers in the ring. 1 means strictly one frame in flight.
    pub frames_in_flight: usize,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self { frames_in_flight: 1 }
    }
}

/// Counters for instrumentation.
#[derive(Debug, Clone, Default)]
pub struct PumpStats {
    pub frames_submitted: u64,
    /// Awaits that had to block on the queue.
    pub stalls: u64,
    /// Awaits where the consumer had already retired the work.
    pub fast_paths: u64,
    pub last_wait: Duration,
    pub total_wait: Duration,
}

struct Slot<R> {
    recorder: R,
    /// Counter value signaled after this slot's last submission. 0 = never submitted.
    retire_value: u64,
}

/// Drives the per-frame submit/signal/await/reset protocol over a ring of
/// recorders.
///
/// The pump owns the queue and the recorders; dropping it drains every
/// signaled value before they are released.
pub struct FramePump<R, Q>
where
    R: CommandRecorder,
    Q: SubmitQueue<Commands = R::Commands>,
{
    queue: Q,
    slots: Vec<Slot<R>>,
    current: usize,
    fence_value: u64,
    state: FrameState,
    stats: PumpStats,
    drained: bool,
}

impl<R, Q> FramePump<R, Q>
where
    R: CommandRecorder,
    Q: SubmitQueue<Commands = R::Commands>,
{
    /// Build a pump over the given recorders. Recorders not already recording
    /// are reset first.
    pub fn new(queue: Q, recorders: Vec<R>) -> Result<Self, FrameError> {
        if recorders.is_empty() {
            return Err(FrameError::NoRecorders);
        }
        let mut slots = Vec::with_capacity(recorders.len());
        for mut recorder in recorders {
            if !recorder.is_recording() {
                recorder.reset()?;
            }
            slots.push(Slot {
                recorder,
                retire_value: 0,
            });
        }
        tracing::debug!(frames_in_flight = slots.len(), "frame pump created");
        Ok(Self {
            queue,
            slots,
            current: 0,
            fence_value: 0,
            state: FrameState::Recording,
            stats: PumpStats::default(),
            drained: true,
        })
    }

    /// Single-buffered pump: one frame in flight.
    pub fn single(queue: Q, recorder: R) -> Result<Self, FrameError> {
        Self::new(queue, vec![recorder])
    }

    /// Build a pump with `config.frames_in_flight` recorders from `make_recorder`.
    pub fn with_config(
        queue: Q,
        config: &PumpConfig,
        mut make_recorder: impl FnMut(usize) -> Result<R, FrameError>,
    ) -> Result<Self, FrameError> {
        let recorders = (0..config.frames_in_flight)
            .map(&mut make_recorder)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(queue, recorders)
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Last signaled counter value. 0 before the first frame.
    pub fn fence_value(&self) -> u64 {
        self.fence_value
    }

    pub fn frames_in_flight(&self) -> usize {
        self.slots.len()
    }

    /// Index of the slot currently recording (or last submitted).
    pub fn current_slot(&self) -> usize {
        self.current
    }

    pub fn stats(&self) -> &PumpStats {
        &self.stats
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut Q {
        &mut self.queue
    }

    /// The recorder for the current frame. Only available while recording.
    pub fn recorder_mut(&mut self) -> Result<&mut R, FrameError> {
        self.expect_state(FrameState::Recording)?;
        Ok(&mut self.slots[self.current].recorder)
    }

    /// Throw away what has been recorded this frame without submitting it.
    ///
    /// The slot already passed its retire check on entering `Recording`, so the
    /// consumer holds no reference to it.
    pub fn discard(&mut self) -> Result<(), FrameError> {
        self.expect_state(FrameState::Recording)?;
        tracing::debug!(slot = self.current, "discarding recorded frame");
        self.slots[self.current].recorder.reset()
    }

    /// Close the current recorder and submit its commands.
    pub fn submit(&mut self) -> Result<(), FrameError> {
        self.expect_state(FrameState::Recording)?;
        let commands = self.slots[self.current].recorder.close()?;
        self.queue.submit(commands)?;
        self.drained = false;
        self.state = FrameState::Submitted;
        tracing::trace!(slot = self.current, "submitted");
        Ok(())
    }

    /// Present the rendered surface. Does not advance the state.
    pub fn present(&mut self, surface: Q::Surface) -> Result<(), FrameError> {
        self.expect_state(FrameState::Submitted)?;
        self.queue.present(surface)
    }

    /// Push the next counter value and tag the current slot with it.
    pub fn signal(&mut self) -> Result<u64, FrameError> {
        self.expect_state(FrameState::Submitted)?;
        self.fence_value += 1;
        let value = self.fence_value;
        self.queue.signal(value)?;
        self.slots[self.current].retire_value = value;
        self.stats.frames_submitted += 1;
        self.state = FrameState::Signaled;
        tracing::trace!(slot = self.current, value, "signaled");
        Ok(value)
    }

    /// Move to the next slot and block until its last submission has retired.
    pub fn await_retire(&mut self) -> Result<(), FrameError> {
        self.expect_state(FrameState::Signaled)?;
        self.current = (self.current + 1) % self.slots.len();
        let retire = self.slots[self.current].retire_value;

        if self.queue.completed_value() >= retire {
            self.stats.fast_paths += 1;
            self.stats.last_wait = Duration::ZERO;
        } else {
            let start = Instant::now();
            self.queue.wait_for(retire)?;
            let waited = start.elapsed();
            self.stats.stalls += 1;
            self.stats.last_wait = waited;
            self.stats.total_wait += waited;
            tracing::trace!(slot = self.current, retire, ?waited, "stalled on consumer");
        }

        self.state = FrameState::Awaited;
        Ok(())
    }

    /// Reset the awaited slot's recorder and resume recording.
    pub fn reset(&mut self) -> Result<(), FrameError> {
        self.expect_state(FrameState::Awaited)?;
        let slot = &mut self.slots[self.current];
        let completed = self.queue.completed_value();
        if completed < slot.retire_value {
            return Err(FrameError::ResetWhileInFlight {
                slot: self.current,
                completed,
                retire: slot.retire_value,
            });
        }
        slot.recorder.reset()?;
        self.state = FrameState::Recording;
        Ok(())
    }

    /// Run the whole end-of-frame sequence and return the signaled value.
    ///
    /// A recoverable present failure still signals, awaits and resets so the
    /// protocol stays intact; the error is returned afterwards.
    pub fn end_frame(&mut self, surface: Q::Surface) -> Result<u64, FrameError> {
        let _span = tracing::debug_span!("end_frame", next = self.fence_value + 1).entered();

        self.submit()?;
        let skipped = match self.present(surface) {
            Ok(()) => None,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!("present failed, frame dropped: {e}");
                Some(e)
            }
        };
        let value = self.signal()?;
        self.await_retire()?;
        self.reset()?;
        match skipped {
            Some(e) => Err(e),
            None => Ok(value),
        }
    }

    /// Block until every signaled value has retired.
    ///
    /// A frame left in `Submitted` is signaled first so its work can be awaited.
    pub fn drain(&mut self) -> Result<(), FrameError> {
        if self.state == FrameState::Submitted {
            self.signal()?;
        }
        let last = self.fence_value;
        if self.queue.completed_value() < last {
            self.queue.wait_for(last)?;
        }
        self.drained = true;
        tracing::debug!(value = last, "frame pump drained");
        Ok(())
    }

    /// Drain and release the pump.
    pub fn shutdown(mut self) -> Result<(), FrameError> {
        self.drain()
    }

    fn expect_state(&self, expected: FrameState) -> Result<(), FrameError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(FrameError::OutOfOrder {
                expected,
                actual: self.state,
            })
        }
    }
}

impl<R, Q> Drop for FramePump<R, Q>
where
    R: CommandRecorder,
    Q: SubmitQueue<Commands = R::Commands>,
{
    fn drop(&mut self) {
        if !self.drained {
            if let Err(e) = self.drain() {
                tracing::error!("failed to drain frame pump on drop: {e}");
            }
        }
    }
}
