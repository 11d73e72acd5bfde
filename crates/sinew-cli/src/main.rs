//! Sinew CLI - Command-line interface for the Sinew animation runtime

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{inspect, simulate};

#[derive(Parser)]
#[command(name = "sinew")]
#[command(about = "Offline driver for the Sinew skeletal animation runtime", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the states and transitions of a state graph
    Inspect {
        /// Path to a .graph.toml file
        graph: String,

        /// Directory of .clip.toml files
        #[arg(long, default_value = "clips")]
        clips: String,
    },

    /// Run the animation pipeline offline and print the resulting pose
    Simulate {
        /// Path to a .graph.toml file
        graph: String,

        /// Directory of .clip.toml files
        #[arg(long, default_value = "clips")]
        clips: String,

        /// Path to a .skeleton.toml file
        #[arg(long)]
        skeleton: String,

        /// State to play on the base layer
        #[arg(long)]
        state: String,

        /// Transition to fire during the run
        #[arg(long)]
        transition: Option<String>,

        /// Layer time in milliseconds at which the transition fires
        #[arg(long, default_value = "0")]
        at_ms: f32,

        /// Number of frames to simulate
        #[arg(long, default_value = "60")]
        frames: u32,

        /// Simulation rate in frames per second
        #[arg(long, default_value = "60")]
        fps: f64,

        /// Path to an animation config file
        #[arg(long)]
        config: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,
    },
}

fn parse_format(s: &str) -> Result<String, String> {
    match s {
        "text" | "json" => Ok(s.to_string()),
        _ => Err(format!("unknown format '{}'; valid values: text, json", s)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Inspect { graph, clips } => inspect::run(&graph, &clips),
        Commands::Simulate {
            graph,
            clips,
            skeleton,
            state,
            transition,
            at_ms,
            frames,
            fps,
            config,
            format,
        } => simulate::run(simulate::SimulateArgs {
            graph,
            clips,
            skeleton,
            state,
            transition,
            at_ms,
            frames,
            fps,
            config,
            format,
        }),
    }
}
