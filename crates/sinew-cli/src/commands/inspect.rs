//! Inspect command

use super::load_clips;
use anyhow::{Context, Result};
use sinew_animation::loader::load_state_graph_from_file;
use sinew_animation::BlendNode;
use std::path::Path;

pub fn run(graph_path: &str, clips_dir: &str) -> Result<()> {
    let clips = load_clips(clips_dir)?;
    let graph = load_state_graph_from_file(Path::new(graph_path), &clips)
        .with_context(|| format!("Failed to load state graph {}", graph_path))?;

    println!("State graph: {}", graph_path);
    println!("  Clips: {}", clips.names().join(", "));
    println!("  Max node count: {}", graph.max_node_count());

    for (index, state) in graph.states().iter().enumerate() {
        let tree = state.blend_tree();
        println!("\n  [{}] {} ({} nodes)", index, state.name(), tree.len());

        for (node_index, node) in tree.nodes().iter().enumerate() {
            println!("      {:>2}: {}", node_index, describe_node(node));
        }

        for transition in graph.transitions(index) {
            println!(
                "    -> {} => {} (fade {} ms{}, {:?})",
                transition.name(),
                graph.state(transition.destination()).name(),
                transition.blend_time(),
                if transition.is_synced() { ", synced" } else { "" },
                transition.curve()
            );
        }
    }

    Ok(())
}

fn describe_node(node: &BlendNode) -> String {
    match node {
        BlendNode::Value(animation) => format!(
            "clip '{}'{} x{}",
            animation.clip().name(),
            if animation.looped() { " looped" } else { "" },
            animation.playback_rate()
        ),
        BlendNode::Lerp { left, right, factor } => format!(
            "lerp {} {} [{} = {}]",
            left,
            right,
            factor.name.as_deref().unwrap_or("-"),
            factor.value
        ),
        BlendNode::Additive { left, right, factor } => format!(
            "additive {} {} [{} = {}]",
            left,
            right,
            factor.name.as_deref().unwrap_or("-"),
            factor.value
        ),
    }
}
