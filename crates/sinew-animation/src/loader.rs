//! TOML-based loading of clips, skeletons and state graphs

use crate::clip::AnimationClip;
use crate::library::ClipLibrary;
use crate::pose::JointPose;
use crate::skeleton::{Skeleton, SkeletonJoint};
use crate::states::{StateGraph, StateGraphDef};
use glam::{Mat4, Quat, Vec3};
use serde::Deserialize;
use sinew_core::{Result, SinewError};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ClipFile {
    name: String,
    frames_per_second: f32,
    frame_count: u32,
    joint_remap: Vec<i32>,
    #[serde(default)]
    poses: Vec<PoseDef>,
}

#[derive(Debug, Deserialize)]
struct PoseDef {
    #[serde(default = "identity_rotation")]
    rotation: [f32; 4],
    #[serde(default)]
    translation: [f32; 3],
    #[serde(default = "unit_scale")]
    scale: f32,
}

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn unit_scale() -> f32 {
    1.0
}

#[derive(Debug, Deserialize)]
struct SkeletonFile {
    name: String,
    #[serde(default)]
    joints: Vec<JointDef>,
}

#[derive(Debug, Deserialize)]
struct JointDef {
    name: String,
    #[serde(default)]
    parent: Option<u16>,
    /// Column-major
    #[serde(default = "identity_matrix")]
    inverse_bind_matrix: [f32; 16],
}

fn identity_matrix() -> [f32; 16] {
    Mat4::IDENTITY.to_cols_array()
}

/// Load a baked clip from a `.clip.toml` file.
///
/// ```toml
/// name = "walk"
/// frames_per_second = 30.0
/// frame_count = 2
/// joint_remap = [0, -1]     # one entry per skeleton joint
///
/// [[poses]]                 # frame-major, one per animated joint per frame
/// rotation = [0.0, 0.0, 0.0, 1.0]
/// translation = [0.0, 0.0, 0.0]
/// scale = 1.0
/// ```
pub fn load_clip_from_file(path: &Path) -> Result<AnimationClip> {
    let content = std::fs::read_to_string(path)?;
    load_clip_from_str(&content).map_err(|e| with_path(e, path))
}

/// Parse a baked clip from a TOML string.
pub fn load_clip_from_str(content: &str) -> Result<AnimationClip> {
    let file: ClipFile = toml::from_str(content)?;

    let mut poses = Vec::with_capacity(file.poses.len());
    for (i, pose) in file.poses.iter().enumerate() {
        let rotation = Quat::from_array(pose.rotation).normalize();
        if !rotation.is_finite() {
            return Err(SinewError::InvalidClip(format!(
                "clip '{}' pose {} has a degenerate rotation",
                file.name, i
            )));
        }
        poses.push(JointPose::new(rotation, Vec3::from_array(pose.translation), pose.scale));
    }

    AnimationClip::new(
        file.name,
        file.frames_per_second,
        file.frame_count,
        file.joint_remap,
        poses,
    )
}

/// Load a skeleton from a `.skeleton.toml` file.
///
/// Joints are listed parents-first: a joint's `parent` must be a smaller index.
pub fn load_skeleton_from_file(path: &Path) -> Result<Skeleton> {
    let content = std::fs::read_to_string(path)?;
    load_skeleton_from_str(&content).map_err(|e| with_path(e, path))
}

/// Parse a skeleton from a TOML string.
pub fn load_skeleton_from_str(content: &str) -> Result<Skeleton> {
    let file: SkeletonFile = toml::from_str(content)?;
    let joints = file
        .joints
        .into_iter()
        .map(|joint| SkeletonJoint {
            name: joint.name,
            parent: joint.parent,
            inverse_bind: Mat4::from_cols_array(&joint.inverse_bind_matrix),
        })
        .collect();
    Skeleton::new(file.name, joints)
}

/// Load a state graph from a `.graph.toml` file, resolving clips through `clips`.
pub fn load_state_graph_from_file(path: &Path, clips: &ClipLibrary) -> Result<StateGraph> {
    let content = std::fs::read_to_string(path)?;
    let graph = load_state_graph_from_str(&content, clips).map_err(|e| with_path(e, path))?;
    log::info!("Loaded state graph from {}", path.display());
    Ok(graph)
}

/// Parse and build a state graph from a TOML string.
pub fn load_state_graph_from_str(content: &str, clips: &ClipLibrary) -> Result<StateGraph> {
    let def: StateGraphDef = toml::from_str(content)?;
    StateGraph::build(&def, clips)
}

/// Prefix parse errors with the offending file
fn with_path(err: SinewError, path: &Path) -> SinewError {
    match err {
        SinewError::TomlParseError(msg) => {
            SinewError::TomlParseError(format!("{}: {}", path.display(), msg))
        }
        other => other,
    }
}
