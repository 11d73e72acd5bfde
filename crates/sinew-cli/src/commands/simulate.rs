//! Simulate command: drive the animation pipeline offline

use super::load_clips;
use anyhow::{Context, Result};
use serde::Serialize;
use sinew_animation::loader::{load_skeleton_from_file, load_state_graph_from_file};
use sinew_animation::{AnimController, AnimationConfig, AnimationSystem};
use sinew_runtime::{FrameClock, RuntimeSystem};
use std::path::Path;
use std::sync::Arc;

pub struct SimulateArgs {
    pub graph: String,
    pub clips: String,
    pub skeleton: String,
    pub state: String,
    pub transition: Option<String>,
    pub at_ms: f32,
    pub frames: u32,
    pub fps: f64,
    pub config: Option<String>,
    pub format: String,
}

#[derive(Serialize)]
struct SimulationReport {
    state: Option<String>,
    frames: u32,
    clock_ms: f32,
    cross_fading: bool,
    joints: Vec<JointReport>,
}

#[derive(Serialize)]
struct JointReport {
    name: String,
    translation: [f32; 3],
    rotation: [f32; 4],
    scale: f32,
    world_translation: [f32; 3],
    /// Column-major skinning matrix
    palette: [f32; 16],
}

pub fn run(args: SimulateArgs) -> Result<()> {
    if !(args.fps > 0.0) {
        anyhow::bail!("--fps must be positive, got {}", args.fps);
    }

    let config = match &args.config {
        Some(path) => AnimationConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load config {}", path))?,
        None => AnimationConfig::default(),
    };

    let clips = load_clips(&args.clips)?;
    let graph = Arc::new(
        load_state_graph_from_file(Path::new(&args.graph), &clips)
            .with_context(|| format!("Failed to load state graph {}", args.graph))?,
    );
    let skeleton = Arc::new(
        load_skeleton_from_file(Path::new(&args.skeleton))
            .with_context(|| format!("Failed to load skeleton {}", args.skeleton))?,
    );

    let mut system = AnimationSystem::new(config);
    system.initialize()?;
    let handle = system.create_default_controller(skeleton)?;
    {
        let controller = system
            .controller_mut(handle)
            .context("Controller vanished after creation")?;
        let base = controller.layer_mut(0);
        base.set_state_graph(graph);
        base.play(&args.state, 0.0)
            .with_context(|| format!("Failed to play state '{}'", args.state))?;
    }

    let mut clock = FrameClock::with_rate(args.fps);
    let mut pending_transition = args.transition.as_deref();

    for _ in 0..args.frames {
        clock.advance(clock.fixed_step_ms);
        while clock.should_step() {
            let step_ms = clock.consume_step() as f32;

            if let Some(name) = pending_transition {
                let controller = system
                    .controller_mut(handle)
                    .context("Controller vanished during simulation")?;
                let base = controller.layer_mut(0);
                if base.clock() >= args.at_ms {
                    base.transition(name)
                        .with_context(|| format!("Failed to fire transition '{}'", name))?;
                    log::info!("Fired transition '{}' at {} ms", name, base.clock());
                    pending_transition = None;
                }
            }

            system.run_frame(step_ms);
        }
    }

    if let Some(name) = pending_transition {
        log::warn!("Transition '{}' never fired (layer clock stayed below {} ms)", name, args.at_ms);
    }

    let controller = system
        .controller(handle)
        .context("Controller vanished during simulation")?;
    let report = build_report(controller, args.frames);

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report_text(&report);
    }

    system.shutdown()?;
    Ok(())
}

fn build_report(controller: &AnimController, frames: u32) -> SimulationReport {
    let base = controller.layer(0);
    let joints = controller
        .hierarchy()
        .nodes()
        .iter()
        .zip(controller.skinning_palette())
        .map(|(node, palette)| JointReport {
            name: node.name.clone(),
            translation: node.translation.to_array(),
            rotation: node.rotation.to_array(),
            scale: node.scale,
            world_translation: node.world.w_axis.truncate().to_array(),
            palette: palette.to_cols_array(),
        })
        .collect();

    SimulationReport {
        state: base.current_state_name().map(str::to_string),
        frames,
        clock_ms: base.clock(),
        cross_fading: base.is_cross_fading(),
        joints,
    }
}

fn print_report_text(report: &SimulationReport) {
    println!(
        "State: {}  (clock {:.1} ms after {} frames{})",
        report.state.as_deref().unwrap_or("<none>"),
        report.clock_ms,
        report.frames,
        if report.cross_fading { ", cross-fading" } else { "" }
    );

    for (index, joint) in report.joints.iter().enumerate() {
        let [x, y, z] = joint.world_translation;
        println!("\n  [{}] {}  world ({:.3}, {:.3}, {:.3})", index, joint.name, x, y, z);
        for row in 0..4 {
            let p = &joint.palette;
            println!(
                "      | {:>8.3} {:>8.3} {:>8.3} {:>8.3} |",
                p[row],
                p[4 + row],
                p[8 + row],
                p[12 + row]
            );
        }
    }
}
