//! Per-entity animation controller: layers composed over one skeleton

use crate::debug::DebugRenderer;
use crate::hierarchy::AnimHierarchy;
use crate::layer::{AnimLayer, LayerKind, LayerSettings};
use crate::pose::JointPose;
use crate::skeleton::Skeleton;
use glam::Mat4;
use std::sync::Arc;

/// Binds a skeleton, its hierarchy instance, a stack of layers and the
/// resulting skinning palette.
///
/// Layer 0 is the full-body base layer. Every further active layer is blended
/// on top of the layers below it according to its kind and blend factor.
#[derive(Debug, Clone)]
pub struct AnimController {
    skeleton: Arc<Skeleton>,
    hierarchy: AnimHierarchy,
    layers: Vec<AnimLayer>,
    skinning_palette: Vec<Mat4>,
}

impl AnimController {
    /// Panics if `layer_count` is zero.
    pub fn new(skeleton: Arc<Skeleton>, layer_count: usize, settings: LayerSettings) -> Self {
        assert!(layer_count > 0, "controller needs at least the base layer");

        let hierarchy = AnimHierarchy::from_skeleton(&skeleton);
        let layers = (0..layer_count)
            .map(|_| AnimLayer::new(LayerKind::Lerp, settings))
            .collect();
        let skinning_palette = vec![Mat4::IDENTITY; skeleton.joint_count()];

        Self {
            skeleton,
            hierarchy,
            layers,
            skinning_palette,
        }
    }

    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    pub fn hierarchy(&self) -> &AnimHierarchy {
        &self.hierarchy
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[AnimLayer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> &AnimLayer {
        assert!(index < self.layers.len(), "layer index {} out of bounds", index);
        &self.layers[index]
    }

    pub fn layer_mut(&mut self, index: usize) -> &mut AnimLayer {
        assert!(index < self.layers.len(), "layer index {} out of bounds", index);
        &mut self.layers[index]
    }

    /// One matrix per joint, valid after `generate_matrix_palette`
    pub fn skinning_palette(&self) -> &[Mat4] {
        &self.skinning_palette
    }

    /// Advance every layer clock
    pub fn update(&mut self, delta_ms: f32) {
        for layer in &mut self.layers {
            layer.update(delta_ms);
        }
    }

    /// Final pose of a joint with all layers applied.
    ///
    /// Joints the base layer does not animate start from the skeleton's bind pose.
    pub fn joint_pose(&self, joint_idx: usize) -> JointPose {
        assert!(
            joint_idx < self.skeleton.joint_count(),
            "joint index {} out of bounds",
            joint_idx
        );

        let mut pose = self.layers[0]
            .joint_pose(joint_idx)
            .unwrap_or_else(|| self.skeleton.bind_local_pose(joint_idx));

        for layer in self.layers[1..].iter().filter(|layer| layer.is_active()) {
            let Some(layer_pose) = layer.joint_pose(joint_idx) else {
                continue;
            };
            match layer.kind() {
                LayerKind::Lerp => pose = JointPose::lerp(&pose, &layer_pose, layer.blend_factor()),
                LayerKind::Additive => pose.additive_add(&layer_pose, layer.blend_factor()),
            }
        }

        pose
    }

    /// Write the blended pose of every joint into the hierarchy
    pub fn calculate_local_pose(&mut self) {
        for joint_idx in 0..self.hierarchy.len() {
            let pose = self.joint_pose(joint_idx);
            self.hierarchy.node_mut(joint_idx).set_pose(&pose);
        }
        self.hierarchy.calculate_local_transformation();
    }

    pub fn calculate_global_pose(&mut self) {
        self.hierarchy.calculate_global_transformation();
    }

    /// `palette[i] = root.world^-1 * world[i] * inverse_bind[i]`
    pub fn generate_matrix_palette(&mut self) {
        let Some(root) = self.hierarchy.nodes().first() else {
            return;
        };
        let model_from_world = root.world.inverse();

        for (index, joint) in self.skeleton.joints().iter().enumerate() {
            self.skinning_palette[index] =
                model_from_world * self.hierarchy.node(index).world * joint.inverse_bind;
        }
    }

    pub fn draw(&self, renderer: &mut dyn DebugRenderer, axis_size: f32) {
        self.hierarchy.draw(renderer, axis_size);
    }
}
