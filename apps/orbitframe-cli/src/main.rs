use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::IVec2;
use orbitframe_camera::{CameraConfig, OrbitCamera};
use orbitframe_frame::sim::{SimConfig, SimQueue, SimRecorder};
use orbitframe_frame::{FramePump, PumpConfig, SubmitQueue};
use orbitframe_input::{Button, InputState};
use orbitframe_render::{DebugTextRenderer, Renderer, SceneState, SceneView, Viewport};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orbitframe-cli", about = "Headless frame pump and camera driver")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Run the frame pump against the simulated queue
    Pump {
        /// Number of frames to submit
        #[arg(short, long, default_value = "8")]
        frames: u64,
        /// Recording buffers in the ring
        #[arg(short, long, default_value = "1")]
        in_flight: usize,
        /// Simulated execution time per command, in microseconds
        #[arg(short, long, default_value = "0")]
        latency_us: u64,
    },
    /// Replay scripted input against the orbit camera
    Camera {
        /// Number of updates
        #[arg(short, long, default_value = "1")]
        ticks: u32,
        /// Buttons held for every tick: rmb, mmb, shift, w, a, s, d
        #[arg(long, value_delimiter = ',')]
        hold: Vec<Button>,
        /// Pointer movement per tick along x
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        dx: i32,
        /// Pointer movement per tick along y
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        dy: i32,
        /// JSON file with camera sensitivities and start position
        #[arg(long)]
        camera_config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("orbitframe-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", orbitframe_common::crate_info());
            println!("camera: {}", orbitframe_camera::crate_info());
            println!("frame: {}", orbitframe_frame::crate_info());
            println!("render: {}", orbitframe_render::crate_info());
        }
        Commands::Pump {
            frames,
            in_flight,
            latency_us,
        } => run_pump(frames, in_flight, Duration::from_micros(latency_us))?,
        Commands::Camera {
            ticks,
            hold,
            dx,
            dy,
            camera_config,
        } => {
            let config = match camera_config {
                Some(path) => CameraConfig::load(&path)
                    .with_context(|| format!("failed to load {}", path.display()))?,
                None => CameraConfig::default(),
            };
            run_camera(config, ticks, &hold, IVec2::new(dx, dy));
        }
    }

    Ok(())
}

fn run_pump(frames: u64, in_flight: usize, latency: Duration) -> anyhow::Result<()> {
    println!("Frame pump: frames={frames}, in_flight={in_flight}, latency={latency:?}");

    let queue = SimQueue::new(SimConfig {
        command_latency: latency,
    })?;
    let config = PumpConfig {
        frames_in_flight: in_flight,
    };
    let mut pump = FramePump::with_config(queue, &config, |id| Ok(SimRecorder::new(id)))
        .context("failed to build frame pump")?;

    let start = Instant::now();
    for _ in 0..frames {
        let slot = pump.current_slot();
        // One sphere-sized and one sprite-sized draw per frame.
        pump.recorder_mut()?.record_frame(&[(1536, 1), (6, 1)])?;
        let value = pump.end_frame(())?;
        println!(
            "signaled {value} (slot {slot}, completed {})",
            pump.queue().completed_value()
        );
    }
    let elapsed = start.elapsed();

    let stats = pump.stats().clone();
    let executed = pump.queue().executed_lists();
    pump.shutdown()?;

    println!(
        "Done in {elapsed:?}: submitted={} stalls={} fast={} waited={:?} executed_before_drain={executed}",
        stats.frames_submitted, stats.stalls, stats.fast_paths, stats.total_wait
    );
    Ok(())
}

fn run_camera(config: CameraConfig, ticks: u32, hold: &[Button], step: IVec2) {
    let mut camera = OrbitCamera::new(config);
    let mut input = InputState::new();
    for &button in hold {
        input.press(button);
    }

    for tick in 1..=ticks {
        input.set_pointer(pointer_at(step, tick));
        camera.update(&input);
        let (r, t) = (camera.rotate(), camera.translate());
        tracing::debug!(tick, ?r, ?t, "camera updated");
    }

    let scene = SceneState::default();
    let view = SceneView {
        camera: &camera,
        scene: &scene,
        viewport: Viewport::default(),
    };
    print!("{}", DebugTextRenderer::new().render(&view));
}

/// Scripted pointer position after `tick` steps, clamped to the `i32` range.
fn pointer_at(step: IVec2, tick: u32) -> IVec2 {
    let tick = i32::try_from(tick).unwrap_or(i32::MAX);
    step.saturating_mul(IVec2::splat(tick))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_advances_by_step() {
        let step = IVec2::new(3, -2);
        assert_eq!(pointer_at(step, 1), IVec2::new(3, -2));
        assert_eq!(pointer_at(step, 10), IVec2::new(30, -20));
    }

    #[test]
    fn pointer_saturates_on_long_scripts() {
        let step = IVec2::new(i32::MAX / 2, i32::MIN / 2);
        assert_eq!(pointer_at(step, 3), IVec2::new(i32::MAX, i32::MIN));
        assert_eq!(pointer_at(IVec2::new(1, -1), u32::MAX), IVec2::new(i32::MAX, -i32::MAX));
    }

    #[test]
    fn long_camera_script_runs_to_completion() {
        run_camera(CameraConfig::default(), 64, &[Button::RightMouse], IVec2::splat(i32::MAX / 8));
    }
}
