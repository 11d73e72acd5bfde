//! Fixed-capacity blend tree evaluated by node index
//!
//! Nodes live in one contiguous array; index 0 is the root and inner nodes
//! refer to their children by index. Copying a tree into another one with
//! enough capacity reuses the destination's storage, so entering a state
//! does not allocate.

use crate::animation::Animation;
use crate::pose::JointPose;
use sinew_core::{Result, SinewError};
use std::sync::Arc;

/// Named, runtime-tunable blend weight of an inner node
#[derive(Debug, Clone, PartialEq)]
pub struct BlendFactor {
    pub name: Option<Arc<str>>,
    pub value: f32,
}

impl BlendFactor {
    pub fn new(name: Option<&str>, value: f32) -> Self {
        Self {
            name: name.map(Arc::from),
            value,
        }
    }

    fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

/// A single blend tree node
#[derive(Debug, Clone)]
pub enum BlendNode {
    /// Leaf playing one clip
    Value(Animation),
    /// Interpolates from `left` (factor 0) to `right` (factor 1)
    Lerp {
        left: u16,
        right: u16,
        factor: BlendFactor,
    },
    /// Adds the `right` pose onto the mandatory `left` base pose
    Additive {
        left: u16,
        right: u16,
        factor: BlendFactor,
    },
}

impl BlendNode {
    pub fn factor(&self) -> Option<&BlendFactor> {
        match self {
            BlendNode::Value(_) => None,
            BlendNode::Lerp { factor, .. } | BlendNode::Additive { factor, .. } => Some(factor),
        }
    }

    fn factor_mut(&mut self) -> Option<&mut BlendFactor> {
        match self {
            BlendNode::Value(_) => None,
            BlendNode::Lerp { factor, .. } | BlendNode::Additive { factor, .. } => Some(factor),
        }
    }

    pub fn animation(&self) -> Option<&Animation> {
        match self {
            BlendNode::Value(animation) => Some(animation),
            _ => None,
        }
    }

    fn animation_mut(&mut self) -> Option<&mut Animation> {
        match self {
            BlendNode::Value(animation) => Some(animation),
            _ => None,
        }
    }
}

/// Binary blend tree stored as a node array with a fixed capacity
#[derive(Debug, Clone, Default)]
pub struct BlendTree {
    nodes: Vec<BlendNode>,
    capacity: usize,
}

impl BlendTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of nodes in use
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// A tree is valid once it has a root node
    pub fn is_valid(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[BlendNode] {
        &self.nodes
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Change the capacity, keeping the nodes that still fit.
    pub fn resize(&mut self, capacity: usize) {
        self.nodes.truncate(capacity);
        if capacity > self.nodes.capacity() {
            self.nodes.reserve_exact(capacity - self.nodes.len());
        }
        self.capacity = capacity;
    }

    /// Append a node and return its index.
    ///
    /// Panics when the tree is full, or when a child index does not come
    /// after the new node or falls outside the capacity.
    pub fn push(&mut self, node: BlendNode) -> u16 {
        let index = self.nodes.len();
        assert!(index < self.capacity, "blend tree capacity {} exceeded", self.capacity);
        if let BlendNode::Lerp { left, right, .. } | BlendNode::Additive { left, right, .. } = &node {
            for child in [*left as usize, *right as usize] {
                assert!(
                    child > index,
                    "child index {} must follow node {}",
                    child,
                    index
                );
                assert!(child < self.capacity, "child index out of blend tree bounds");
            }
        }
        self.nodes.push(node);
        (self.nodes.len() - 1) as u16
    }

    /// Overwrite this tree with the nodes of `source`.
    ///
    /// Panics if `source` has more nodes than this tree can hold.
    pub fn copy_from(&mut self, source: &BlendTree) {
        assert!(
            self.capacity >= source.len(),
            "blend tree capacity {} too small for {} nodes",
            self.capacity,
            source.len()
        );
        self.nodes.clear();
        self.nodes.extend(source.nodes.iter().cloned());
    }

    /// Set the start time of every clip in the tree
    pub fn start(&mut self, time_ms: f32) {
        for animation in self.nodes.iter_mut().filter_map(BlendNode::animation_mut) {
            animation.set_start_time(time_ms);
        }
    }

    /// Shift every clip's start time back by `rewind_ms`, keeping playback
    /// phase while the layer clock is rewound by the same amount.
    pub fn rebase_start_times(&mut self, rewind_ms: f32) {
        for animation in self.nodes.iter_mut().filter_map(BlendNode::animation_mut) {
            animation.set_start_time(animation.start_time() - rewind_ms);
        }
    }

    /// Set the first factor called `name`
    pub fn set_node_factor(&mut self, name: &str, value: f32) -> Result<()> {
        let factor = self
            .nodes
            .iter_mut()
            .filter_map(BlendNode::factor_mut)
            .find(|factor| factor.is_named(name))
            .ok_or_else(|| SinewError::FactorNotFound(name.to_string()))?;
        factor.value = value;
        Ok(())
    }

    /// Value of the first factor called `name`
    pub fn node_factor(&self, name: &str) -> Option<f32> {
        self.nodes
            .iter()
            .filter_map(BlendNode::factor)
            .find(|factor| factor.is_named(name))
            .map(|factor| factor.value)
    }

    /// Local time of the first clip in index order, 0 if the tree has none.
    ///
    /// Used to phase-align synced transitions; it is not an aggregate over
    /// all clips in the tree.
    pub fn local_animation_time(&self, global_time_ms: f32) -> f32 {
        self.nodes
            .iter()
            .find_map(BlendNode::animation)
            .map_or(0.0, |animation| animation.local_time(global_time_ms))
    }

    /// Evaluate the pose of `joint_idx`, starting at the root.
    ///
    /// Returns `None` when no clip in the tree animates the joint.
    pub fn joint_pose(&self, global_time_ms: f32, joint_idx: usize) -> Option<JointPose> {
        assert!(self.is_valid(), "blend tree not valid");
        self.evaluate(0, global_time_ms, joint_idx)
    }

    fn evaluate(&self, index: u16, time_ms: f32, joint_idx: usize) -> Option<JointPose> {
        match &self.nodes[index as usize] {
            BlendNode::Value(animation) => animation
                .has_joint_pose(joint_idx)
                .then(|| animation.sample_joint_pose(time_ms, joint_idx)),
            BlendNode::Lerp { left, right, factor } => {
                let left_pose = self.evaluate(*left, time_ms, joint_idx);
                let right_pose = self.evaluate(*right, time_ms, joint_idx);

                match (left_pose, right_pose) {
                    (Some(a), Some(b)) => Some(JointPose::lerp(&a, &b, factor.value)),
                    (Some(pose), None) | (None, Some(pose)) => Some(pose),
                    (None, None) => None,
                }
            }
            BlendNode::Additive { left, right, factor } => {
                let Some(mut pose) = self.evaluate(*left, time_ms, joint_idx) else {
                    panic!("left subtree has to provide a base pose for additive blending");
                };
                if let Some(delta) = self.evaluate(*right, time_ms, joint_idx) {
                    pose.additive_add(&delta, factor.value);
                }
                Some(pose)
            }
        }
    }
}
