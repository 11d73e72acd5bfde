//! Per-controller joint transforms: local pose to world matrices
//!
//! The hierarchy is a flat array in skeleton order. World transforms are
//! computed in one forward pass, which relies on parents preceding their
//! children (enforced when the skeleton is built).

use crate::debug::DebugRenderer;
use crate::pose::JointPose;
use crate::skeleton::Skeleton;
use glam::{Mat4, Quat, Vec3};
use sinew_core::Color;

/// Animated transform of one joint
#[derive(Debug, Clone)]
pub struct AnimTransformation {
    pub name: String,
    pub translation: Vec3,
    pub scale: f32,
    pub rotation: Quat,
    /// Parent-relative transform built from translation, rotation and scale
    pub local: Mat4,
    /// Model-space transform
    pub world: Mat4,
    pub parent: Option<u16>,
}

impl AnimTransformation {
    pub fn pose(&self) -> JointPose {
        JointPose::new(self.rotation, self.translation, self.scale)
    }

    pub fn set_pose(&mut self, pose: &JointPose) {
        self.translation = pose.translation;
        self.rotation = pose.rotation;
        self.scale = pose.scale;
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnimHierarchy {
    nodes: Vec<AnimTransformation>,
}

impl AnimHierarchy {
    /// One node per skeleton joint, initialized to the bind pose
    pub fn from_skeleton(skeleton: &Skeleton) -> Self {
        let nodes = skeleton
            .joints()
            .iter()
            .enumerate()
            .map(|(index, joint)| {
                let bind = skeleton.bind_local_pose(index);
                AnimTransformation {
                    name: joint.name.clone(),
                    translation: bind.translation,
                    scale: bind.scale,
                    rotation: bind.rotation,
                    local: Mat4::IDENTITY,
                    world: Mat4::IDENTITY,
                    parent: joint.parent,
                }
            })
            .collect();

        let mut hierarchy = Self { nodes };
        hierarchy.calculate_local_transformation();
        hierarchy.calculate_global_transformation();
        hierarchy
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[AnimTransformation] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &AnimTransformation {
        &self.nodes[index]
    }

    pub fn node_mut(&mut self, index: usize) -> &mut AnimTransformation {
        &mut self.nodes[index]
    }

    /// Rebuild every local matrix from its translation, rotation and scale
    pub fn calculate_local_transformation(&mut self) {
        for node in &mut self.nodes {
            node.local = node.pose().to_matrix();
        }
    }

    /// Propagate world transforms root-to-leaf: `world = parent.world * local`
    pub fn calculate_global_transformation(&mut self) {
        for index in 0..self.nodes.len() {
            let world = match self.nodes[index].parent {
                Some(parent) => self.nodes[parent as usize].world * self.nodes[index].local,
                None => self.nodes[index].local,
            };
            self.nodes[index].world = world;
        }
    }

    /// Draw the current pose: one axis per joint and a line to each parent.
    pub fn draw(&self, renderer: &mut dyn DebugRenderer, axis_size: f32) {
        for node in &self.nodes {
            renderer.add_axis(&node.world, axis_size);
            if let Some(parent) = node.parent {
                renderer.add_line(
                    self.nodes[parent as usize].world.w_axis.truncate(),
                    node.world.w_axis.truncate(),
                    Color::WHITE,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::tests::LineRecorder;
    use crate::skeleton::tests::two_joint_skeleton;
    use std::f32::consts::FRAC_PI_2;

    fn translation(m: &Mat4) -> Vec3 {
        m.w_axis.truncate()
    }

    #[test]
    fn starts_in_bind_pose() {
        let hierarchy = AnimHierarchy::from_skeleton(&two_joint_skeleton());
        assert_eq!(hierarchy.len(), 2);
        assert_eq!(hierarchy.node(1).name, "child");
        assert!(translation(&hierarchy.node(1).world).abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn identity_poses_give_identity_world() {
        let mut hierarchy = AnimHierarchy::from_skeleton(&two_joint_skeleton());
        for index in 0..hierarchy.len() {
            hierarchy.node_mut(index).set_pose(&JointPose::IDENTITY);
        }
        hierarchy.calculate_local_transformation();
        hierarchy.calculate_global_transformation();

        for node in hierarchy.nodes() {
            assert!(node.world.abs_diff_eq(Mat4::IDENTITY, 1e-6));
        }
    }

    #[test]
    fn child_world_accumulates_parent_translation() {
        // root translated by (1,0,0), child by (0,2,0) relative to root
        let mut hierarchy = AnimHierarchy::from_skeleton(&two_joint_skeleton());
        hierarchy.node_mut(0).translation = Vec3::new(1.0, 0.0, 0.0);
        hierarchy.node_mut(1).translation = Vec3::new(0.0, 2.0, 0.0);
        hierarchy.calculate_local_transformation();
        hierarchy.calculate_global_transformation();

        assert!(translation(&hierarchy.node(0).world).abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5));
        assert!(translation(&hierarchy.node(1).world).abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-5));
    }

    #[test]
    fn child_world_follows_parent_rotation_and_scale() {
        let mut hierarchy = AnimHierarchy::from_skeleton(&two_joint_skeleton());
        hierarchy.node_mut(0).set_pose(&JointPose::new(Quat::from_rotation_z(FRAC_PI_2), Vec3::ZERO, 2.0));
        hierarchy.calculate_local_transformation();
        hierarchy.calculate_global_transformation();

        // child bind offset (0,1,0), rotated a quarter turn about Z and doubled
        assert!(translation(&hierarchy.node(1).world).abs_diff_eq(Vec3::new(-2.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn draw_uses_current_pose() {
        let mut hierarchy = AnimHierarchy::from_skeleton(&two_joint_skeleton());
        hierarchy.node_mut(1).translation = Vec3::new(0.0, 3.0, 0.0);
        hierarchy.calculate_local_transformation();
        hierarchy.calculate_global_transformation();

        let mut recorder = LineRecorder::default();
        hierarchy.draw(&mut recorder, 0.1);

        assert_eq!(recorder.lines.len(), 7);
        let links: Vec<_> = recorder.lines.iter().filter(|(_, _, c)| *c == Color::WHITE).collect();
        assert_eq!(links.len(), 1);
        assert!(links[0].0.abs_diff_eq(Vec3::ZERO, 1e-5));
        assert!(links[0].1.abs_diff_eq(Vec3::new(0.0, 3.0, 0.0), 1e-5));
    }
}
