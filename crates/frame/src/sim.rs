//! Software consumer for headless runs and tests.
//!
//! `SimQueue` executes submitted command lists on a worker thread in FIFO
//! order and advances its completion marker when it reaches a signal.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::device::{CommandRecorder, SubmitQueue};
use crate::error::FrameError;

/// Resource states a barrier moves a render target between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    Present,
    RenderTarget,
}

/// Commands a `SimRecorder` accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum SimCommand {
    Barrier {
        before: ResourceState,
        after: ResourceState,
    },
    Clear {
        color: [f32; 4],
    },
    Draw {
        vertex_count: u32,
        instance_count: u32,
    },
}

/// A closed command list. Holds a reader count on its recorder's storage
/// until the consumer has executed it.
#[derive(Debug)]
pub struct SimCommandList {
    pub recorder_id: usize,
    pub commands: Vec<SimCommand>,
    readers: Arc<AtomicU32>,
}

/// Recording buffer for the simulated device.
#[derive(Debug)]
pub struct SimRecorder {
    id: usize,
    commands: Vec<SimCommand>,
    recording: bool,
    readers: Arc<AtomicU32>,
}

impl SimRecorder {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            commands: Vec::new(),
            recording: true,
            readers: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn record(&mut self, command: SimCommand) -> Result<(), FrameError> {
        if !self.recording {
            return Err(FrameError::RecorderClosed);
        }
        self.commands.push(command);
        Ok(())
    }

    /// The usual frame: barrier to render target, clear, draws, barrier back.
    pub fn record_frame(&mut self, draws: &[(u32, u32)]) -> Result<(), FrameError> {
        self.record(SimCommand::Barrier {
            before: ResourceState::Present,
            after: ResourceState::RenderTarget,
        })?;
        self.record(SimCommand::Clear {
            color: [0.1, 0.25, 0.5, 1.0],
        })?;
        for &(vertex_count, instance_count) in draws {
            self.record(SimCommand::Draw {
                vertex_count,
                instance_count,
            })?;
        }
        self.record(SimCommand::Barrier {
            before: ResourceState::RenderTarget,
            after: ResourceState::Present,
        })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Submissions of this recorder's contents not yet executed.
    pub fn pending_readers(&self) -> u32 {
        self.readers.load(Ordering::Acquire)
    }
}

impl CommandRecorder for SimRecorder {
    type Commands = SimCommandList;

    fn is_recording(&self) -> bool {
        self.recording
    }

    fn close(&mut self) -> Result<SimCommandList, FrameError> {
        if !self.recording {
            return Err(FrameError::AlreadyClosed);
        }
        self.recording = false;
        self.readers.fetch_add(1, Ordering::AcqRel);
        Ok(SimCommandList {
            recorder_id: self.id,
            commands: std::mem::take(&mut self.commands),
            readers: self.readers.clone(),
        })
    }

    fn reset(&mut self) -> Result<(), FrameError> {
        let readers = self.pending_readers();
        if readers > 0 {
            return Err(FrameError::BufferInUse { readers });
        }
        self.commands.clear();
        self.recording = true;
        Ok(())
    }
}

/// Simulated consumer tuning.
#[derive(Debug, Clone, Default)]
pub struct SimConfig {
    /// Time the consumer spends per executed command.
    pub command_latency: Duration,
}

enum Work {
    Execute(SimCommandList),
    Present,
    Signal(u64),
}

#[derive(Default)]
struct Marker {
    value: Mutex<u64>,
    reached: Condvar,
}

#[derive(Default)]
struct Counters {
    executed_lists: AtomicU64,
    executed_commands: AtomicU64,
    presented: AtomicU64,
}

/// Queue backed by a consumer thread.
pub struct SimQueue {
    sender: Option<Sender<Work>>,
    worker: Option<JoinHandle<()>>,
    marker: Arc<Marker>,
    counters: Arc<Counters>,
    last_signaled: u64,
}

impl SimQueue {
    pub fn new(config: SimConfig) -> Result<Self, FrameError> {
        let (sender, receiver) = mpsc::channel::<Work>();
        let marker = Arc::new(Marker::default());
        let counters = Arc::new(Counters::default());

        let worker = {
            let marker = marker.clone();
            let counters = counters.clone();
            std::thread::Builder::new()
                .name("sim-consumer".into())
                .spawn(move || {
                    for work in receiver {
                        match work {
                            Work::Execute(list) => {
                                for _ in &list.commands {
                                    if !config.command_latency.is_zero() {
                                        std::thread::sleep(config.command_latency);
                                    }
                                }
                                counters
                                    .executed_commands
                                    .fetch_add(list.commands.len() as u64, Ordering::Relaxed);
                                counters.executed_lists.fetch_add(1, Ordering::Relaxed);
                                list.readers.fetch_sub(1, Ordering::AcqRel);
                            }
                            Work::Present => {
                                counters.presented.fetch_add(1, Ordering::Relaxed);
                            }
                            Work::Signal(value) => {
                                let mut current = marker
                                    .value
                                    .lock()
                                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                                *current = (*current).max(value);
                                marker.reached.notify_all();
                            }
                        }
                    }
                    tracing::debug!("sim consumer exiting");
                })?
        };

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            marker,
            counters,
            last_signaled: 0,
        })
    }

    /// Last value handed to `signal`.
    pub fn last_signaled(&self) -> u64 {
        self.last_signaled
    }

    pub fn executed_lists(&self) -> u64 {
        self.counters.executed_lists.load(Ordering::Relaxed)
    }

    pub fn executed_commands(&self) -> u64 {
        self.counters.executed_commands.load(Ordering::Relaxed)
    }

    pub fn presented(&self) -> u64 {
        self.counters.presented.load(Ordering::Relaxed)
    }

    fn send(&self, work: Work) -> Result<(), FrameError> {
        self.sender
            .as_ref()
            .ok_or(FrameError::Disconnected)?
            .send(work)
            .map_err(|_| FrameError::Disconnected)
    }
}

impl SubmitQueue for SimQueue {
    type Commands = SimCommandList;
    type Surface = ();

    fn submit(&mut self, commands: SimCommandList) -> Result<(), FrameError> {
        self.send(Work::Execute(commands))
    }

    fn present(&mut self, _surface: ()) -> Result<(), FrameError> {
        self.send(Work::Present)
    }

    fn signal(&mut self, value: u64) -> Result<(), FrameError> {
        if value <= self.last_signaled {
            return Err(FrameError::SignalNotMonotonic {
                value,
                last: self.last_signaled,
            });
        }
        self.send(Work::Signal(value))?;
        self.last_signaled = value;
        Ok(())
    }

    fn completed_value(&self) -> u64 {
        *self
            .marker
            .value
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn wait_for(&mut self, value: u64) -> Result<(), FrameError> {
        if value > self.last_signaled {
            return Err(FrameError::WaitUnsignaled {
                value,
                last: self.last_signaled,
            });
        }
        // A poisoned marker still holds a valid value.
        let guard = self
            .marker
            .value
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _guard = self
            .marker
            .reached
            .wait_while(guard, |current| *current < value)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(())
    }
}

impl Drop for SimQueue {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish queued work and exit.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("sim consumer panicked");
            }
        }
    }
}
