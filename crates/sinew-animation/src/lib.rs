//! Skeletal animation runtime for Sinew
//!
//! Turns baked clips, a skeleton and a state graph into per-frame joint
//! poses and skinning matrices:
//! - **Clips and instances**: baked frames sampled at a local time derived
//!   from a layer clock
//! - **Blend trees**: index-addressed lerp/additive composition of clips
//! - **Layers**: state-graph driven playback with cross-fades
//! - **Controllers**: layers stacked over one skeleton, evaluated through the
//!   hierarchy into a skinning palette
//!
//! `AnimationSystem` owns the controllers and implements `RuntimeSystem`.

pub mod animation;
pub mod blend_tree;
pub mod clip;
pub mod config;
pub mod controller;
pub mod debug;
pub mod hierarchy;
pub mod layer;
pub mod library;
pub mod loader;
pub mod pose;
pub mod skeleton;
pub mod states;
pub mod system;

pub use animation::Animation;
pub use blend_tree::{BlendFactor, BlendNode, BlendTree};
pub use clip::{AnimationClip, UNANIMATED};
pub use config::AnimationConfig;
pub use controller::AnimController;
pub use debug::DebugRenderer;
pub use hierarchy::{AnimHierarchy, AnimTransformation};
pub use layer::{AnimLayer, CrossFadeCurve, LayerKind, LayerSettings};
pub use library::ClipLibrary;
pub use pose::JointPose;
pub use skeleton::{Skeleton, SkeletonJoint};
pub use states::{State, StateGraph, StateGraphDef, Transition};
pub use system::{AnimationSystem, ControllerHandle};
