use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use orbitframe_frame::{CommandRecorder, FrameError, SubmitQueue};

/// A `wgpu::CommandEncoder` slot that the pump closes and reopens each frame.
pub struct WgpuRecorder {
    device: Arc<wgpu::Device>,
    label: String,
    encoder: Option<wgpu::CommandEncoder>,
}

impl WgpuRecorder {
    /// Create a recorder with an open encoder.
    pub fn new(device: Arc<wgpu::Device>, index: usize) -> Self {
        let label = format!("frame_encoder_{index}");
        let encoder = Self::create_encoder(&device, &label);
        Self {
            device,
            label,
            encoder: Some(encoder),
        }
    }

    /// The open encoder for this frame.
    pub fn encoder(&mut self) -> Result<&mut wgpu::CommandEncoder, FrameError> {
        self.encoder.as_mut().ok_or(FrameError::RecorderClosed)
    }

    fn create_encoder(device: &wgpu::Device, label: &str) -> wgpu::CommandEncoder {
        device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }
}

impl CommandRecorder for WgpuRecorder {
    type Commands = wgpu::CommandBuffer;

    fn is_recording(&self) -> bool {
        self.encoder.is_some()
    }

    fn close(&mut self) -> Result<wgpu::CommandBuffer, FrameError> {
        self.encoder
            .take()
            .map(wgpu::CommandEncoder::finish)
            .ok_or(FrameError::AlreadyClosed)
    }

    fn reset(&mut self) -> Result<(), FrameError> {
        self.encoder = Some(Self::create_encoder(&self.device, &self.label));
        Ok(())
    }
}

/// The wgpu queue with a completion counter built from work-done callbacks.
///
/// `signal(v)` registers a callback that raises the counter to `v` once the
/// GPU finishes everything submitted so far. Callbacks only run while the
/// device is polled, so `completed_value` polls without blocking and
/// `wait_for` polls until the matching submission retires.
pub struct WgpuQueue {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    completed: Arc<AtomicU64>,
    last_submission: Option<wgpu::SubmissionIndex>,
    /// Signal values paired with the last submission preceding each.
    pending: VecDeque<(u64, wgpu::SubmissionIndex)>,
    last_signaled: u64,
    lost: Arc<Mutex<Option<String>>>,
}

impl WgpuQueue {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        let lost = Arc::new(Mutex::new(None));
        let flag = Arc::clone(&lost);
        device.set_device_lost_callback(move |reason, message| {
            if matches!(reason, wgpu::DeviceLostReason::Destroyed) {
                return;
            }
            tracing::error!(?reason, %message, "device lost");
            if let Ok(mut slot) = flag.lock() {
                *slot = Some(message);
            }
        });
        Self {
            device,
            queue,
            completed: Arc::new(AtomicU64::new(0)),
            last_submission: None,
            pending: VecDeque::new(),
            last_signaled: 0,
            lost,
        }
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn last_signaled(&self) -> u64 {
        self.last_signaled
    }

    fn check_lost(&self) -> Result<(), FrameError> {
        let message = self.lost.lock().ok().and_then(|slot| slot.clone());
        match message {
            Some(message) => Err(FrameError::DeviceLost(message)),
            None => Ok(()),
        }
    }
}

impl SubmitQueue for WgpuQueue {
    type Commands = wgpu::CommandBuffer;
    type Surface = wgpu::SurfaceTexture;

    fn submit(&mut self, commands: wgpu::CommandBuffer) -> Result<(), FrameError> {
        self.check_lost()?;
        self.last_submission = Some(self.queue.submit(std::iter::once(commands)));
        Ok(())
    }

    fn present(&mut self, surface: wgpu::SurfaceTexture) -> Result<(), FrameError> {
        surface.present();
        Ok(())
    }

    fn signal(&mut self, value: u64) -> Result<(), FrameError> {
        if value <= self.last_signaled {
            return Err(FrameError::SignalNotMonotonic {
                value,
                last: self.last_signaled,
            });
        }
        let completed = Arc::clone(&self.completed);
        self.queue.on_submitted_work_done(move || {
            completed.fetch_max(value, Ordering::AcqRel);
        });
        if let Some(index) = self.last_submission.take() {
            self.pending.push_back((value, index));
        }
        self.last_signaled = value;
        Ok(())
    }

    fn completed_value(&self) -> u64 {
        let _ = self.device.poll(wgpu::Maintain::Poll);
        self.completed.load(Ordering::Acquire)
    }

    fn wait_for(&mut self, value: u64) -> Result<(), FrameError> {
        if value > self.last_signaled {
            return Err(FrameError::WaitUnsignaled {
                value,
                last: self.last_signaled,
            });
        }
        if self.completed.load(Ordering::Acquire) >= value {
            return Ok(());
        }

        while self.pending.front().is_some_and(|(v, _)| *v < value) {
            self.pending.pop_front();
        }
        let maintain = match self.pending.pop_front() {
            Some((_, index)) => wgpu::Maintain::WaitForSubmissionIndex(index),
            None => wgpu::Maintain::Wait,
        };
        let _ = self.device.poll(maintain);
        self.check_lost()?;

        // All work up to the signal has retired once the poll returns.
        self.completed.fetch_max(value, Ordering::AcqRel);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitframe_frame::FramePump;

    /// Headless device, or `None` on machines without any adapter.
    fn headless() -> Option<(Arc<wgpu::Device>, Arc<wgpu::Queue>)> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))?;
        let (device, queue) =
            pollster::block_on(adapter.request_device(&Default::default(), None)).ok()?;
        Some((Arc::new(device), Arc::new(queue)))
    }

    #[test]
    fn recorder_close_and_reset() {
        let Some((device, _queue)) = headless() else {
            return;
        };
        let mut recorder = WgpuRecorder::new(device, 0);
        assert!(recorder.is_recording());
        assert!(recorder.encoder().is_ok());

        let _buffer = recorder.close().unwrap();
        assert!(!recorder.is_recording());
        assert!(matches!(recorder.encoder(), Err(FrameError::RecorderClosed)));
        assert!(matches!(recorder.close(), Err(FrameError::AlreadyClosed)));

        recorder.reset().unwrap();
        assert!(recorder.is_recording());
    }

    #[test]
    fn queue_counter_follows_signals() {
        let Some((device, queue)) = headless() else {
            return;
        };
        let mut q = WgpuQueue::new(device.clone(), queue);
        let mut recorder = WgpuRecorder::new(device, 0);

        q.submit(recorder.close().unwrap()).unwrap();
        q.signal(1).unwrap();
        assert!(matches!(
            q.signal(1),
            Err(FrameError::SignalNotMonotonic { value: 1, last: 1 })
        ));
        assert!(matches!(
            q.wait_for(2),
            Err(FrameError::WaitUnsignaled { value: 2, last: 1 })
        ));

        q.wait_for(1).unwrap();
        assert!(q.completed_value() >= 1);
    }

    #[test]
    fn pump_runs_headless_frames() {
        let Some((device, queue)) = headless() else {
            return;
        };
        let q = WgpuQueue::new(device.clone(), queue);
        let recorders = (0..2).map(|i| WgpuRecorder::new(device.clone(), i)).collect();
        let mut pump = FramePump::new(q, recorders).unwrap();

        for expected in 1..=4 {
            pump.recorder_mut().unwrap().encoder().unwrap();
            pump.submit().unwrap();
            assert_eq!(pump.signal().unwrap(), expected);
            pump.await_retire().unwrap();
            pump.reset().unwrap();
        }
        pump.shutdown().unwrap();
    }
}
