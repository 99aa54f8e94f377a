use std::hint::black_box;
use std::time::{Duration, Instant};

use orbitframe_frame::sim::{SimConfig, SimQueue, SimRecorder};
use orbitframe_frame::{FramePump, PumpConfig};

fn bench_pump(frames_in_flight: usize, latency: Duration, frames: u64) {
    let queue = SimQueue::new(SimConfig {
        command_latency: latency,
    })
    .expect("spawn sim consumer");
    let config = PumpConfig { frames_in_flight };
    let mut pump = FramePump::with_config(queue, &config, |id| Ok(SimRecorder::new(id)))
        .expect("build pump");

    let start = Instant::now();
    for _ in 0..frames {
        pump.recorder_mut()
            .expect("recording")
            .record_frame(black_box(&[(1536, 1), (6, 1)]))
            .expect("record");
        black_box(pump.end_frame(()).expect("end frame"));
    }
    let elapsed = start.elapsed();
    let stats = pump.stats().clone();
    pump.shutdown().expect("drain");

    println!(
        "in_flight={frames_in_flight} latency={latency:?} frames={frames}: total={elapsed:?} per_frame={:?} stalls={} fast={} waited={:?}",
        elapsed / frames as u32,
        stats.stalls,
        stats.fast_paths,
        stats.total_wait,
    );
}

fn main() {
    println!("=== Frame pump over simulated consumer ===");
    for depth in [1, 2, 3] {
        bench_pump(depth, Duration::ZERO, 10_000);
    }
    for depth in [1, 2, 3] {
        bench_pump(depth, Duration::from_micros(50), 200);
    }
}
