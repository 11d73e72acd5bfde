//! Immutable skeleton asset: joint hierarchy and inverse bind matrices

use crate::debug::DebugRenderer;
use crate::pose::JointPose;
use glam::Mat4;
use sinew_core::{Color, Result, SinewError};

#[derive(Debug, Clone)]
pub struct SkeletonJoint {
    pub name: String,
    /// Parent joint index, always smaller than this joint's own index
    pub parent: Option<u16>,
    /// Model space to joint space in the bind pose
    pub inverse_bind: Mat4,
}

/// Joint hierarchy in topological order (parents before children).
///
/// The bind pose is recovered from the inverse bind matrices once at
/// construction: `bind_world[i] = inverse_bind[i]^-1` and
/// `bind_local[i] = bind_world[parent]^-1 * bind_world[i]`.
#[derive(Debug, Clone)]
pub struct Skeleton {
    name: String,
    joints: Vec<SkeletonJoint>,
    bind_local: Vec<JointPose>,
}

impl Skeleton {
    /// Build a skeleton, checking that every parent precedes its child.
    pub fn new(name: impl Into<String>, joints: Vec<SkeletonJoint>) -> Result<Self> {
        let name = name.into();

        if joints.len() > u16::MAX as usize {
            return Err(SinewError::InvalidSkeleton(format!(
                "skeleton '{}' has {} joints, limit is {}",
                name,
                joints.len(),
                u16::MAX
            )));
        }

        for (index, joint) in joints.iter().enumerate() {
            if let Some(parent) = joint.parent {
                if parent as usize >= index {
                    return Err(SinewError::InvalidSkeleton(format!(
                        "skeleton '{}' joint {} ('{}') has parent {} which does not precede it",
                        name, index, joint.name, parent
                    )));
                }
            }
            if joint.inverse_bind.determinant().abs() < f32::EPSILON {
                return Err(SinewError::InvalidSkeleton(format!(
                    "skeleton '{}' joint '{}' has a singular inverse bind matrix",
                    name, joint.name
                )));
            }
        }

        let bind_local = joints
            .iter()
            .map(|joint| {
                let world = joint.inverse_bind.inverse();
                let local = match joint.parent {
                    Some(parent) => joints[parent as usize].inverse_bind * world,
                    None => world,
                };
                let (scale, rotation, translation) = local.to_scale_rotation_translation();
                JointPose::new(rotation, translation, scale.x)
            })
            .collect();

        Ok(Self {
            name,
            joints,
            bind_local,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn joints(&self) -> &[SkeletonJoint] {
        &self.joints
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn find_joint(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|joint| joint.name == name)
    }

    /// Local bind pose of a joint, used for joints no layer animates
    pub fn bind_local_pose(&self, joint_idx: usize) -> JointPose {
        self.bind_local[joint_idx]
    }

    /// Draw the bind pose: one axis per joint and a line to each parent.
    pub fn draw(&self, renderer: &mut dyn DebugRenderer, axis_size: f32) {
        for joint in &self.joints {
            let world = joint.inverse_bind.inverse();
            renderer.add_axis(&world, axis_size);

            if let Some(parent) = joint.parent {
                let parent_world = self.joints[parent as usize].inverse_bind.inverse();
                renderer.add_line(
                    parent_world.w_axis.truncate(),
                    world.w_axis.truncate(),
                    Color::WHITE,
                );
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::debug::tests::LineRecorder;
    use glam::{Quat, Vec3};

    /// Root at the origin, child bound one unit up the Y axis
    pub(crate) fn two_joint_skeleton() -> Skeleton {
        Skeleton::new(
            "test",
            vec![
                SkeletonJoint {
                    name: "root".to_string(),
                    parent: None,
                    inverse_bind: Mat4::IDENTITY,
                },
                SkeletonJoint {
                    name: "child".to_string(),
                    parent: Some(0),
                    inverse_bind: Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)),
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn bind_local_pose_is_relative_to_parent() {
        let skeleton = Skeleton::new(
            "arm",
            vec![
                SkeletonJoint {
                    name: "shoulder".to_string(),
                    parent: None,
                    inverse_bind: Mat4::from_translation(Vec3::new(-1.0, 0.0, 0.0)),
                },
                SkeletonJoint {
                    name: "elbow".to_string(),
                    parent: Some(0),
                    inverse_bind: Mat4::from_translation(Vec3::new(-3.0, 0.0, 0.0)),
                },
            ],
        )
        .unwrap();

        let shoulder = skeleton.bind_local_pose(0);
        let elbow = skeleton.bind_local_pose(1);
        assert!(shoulder.translation.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5));
        assert!(elbow.translation.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));
        assert!(elbow.rotation.abs_diff_eq(Quat::IDENTITY, 1e-5));
        assert!((elbow.scale - 1.0).abs() < 1e-5);
    }

    #[test]
    fn find_joint_by_name() {
        let skeleton = two_joint_skeleton();
        assert_eq!(skeleton.find_joint("child"), Some(1));
        assert_eq!(skeleton.find_joint("tail"), None);
    }

    #[test]
    fn reject_self_parent() {
        let result = Skeleton::new(
            "loop",
            vec![SkeletonJoint {
                name: "root".to_string(),
                parent: Some(0),
                inverse_bind: Mat4::IDENTITY,
            }],
        );
        assert!(matches!(result, Err(SinewError::InvalidSkeleton(_))));
    }

    #[test]
    fn reject_singular_inverse_bind() {
        let result = Skeleton::new(
            "flat",
            vec![SkeletonJoint {
                name: "root".to_string(),
                parent: None,
                inverse_bind: Mat4::ZERO,
            }],
        );
        assert!(matches!(result, Err(SinewError::InvalidSkeleton(_))));
    }

    #[test]
    fn draw_emits_axes_and_parent_links() {
        let mut recorder = LineRecorder::default();
        two_joint_skeleton().draw(&mut recorder, 0.1);

        // two axes of three lines, one parent link
        assert_eq!(recorder.lines.len(), 7);
        let link = recorder.lines.iter().find(|(_, _, c)| *c == Color::WHITE).unwrap();
        assert!(link.0.abs_diff_eq(Vec3::ZERO, 1e-6));
        assert!(link.1.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));
    }
}
