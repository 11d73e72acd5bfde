//! Joint pose value type and the blend operators built on it

use glam::{Mat4, Quat, Vec3};

/// A single joint's local-space pose: rotation, translation and uniform scale.
///
/// Uniform scale keeps baked clips small; every pose is local to the parent
/// joint so poses from different clips can be blended directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPose {
    pub rotation: Quat,
    pub translation: Vec3,
    pub scale: f32,
}

impl Default for JointPose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl JointPose {
    pub const IDENTITY: Self = Self {
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
        scale: 1.0,
    };

    pub fn new(rotation: Quat, translation: Vec3, scale: f32) -> Self {
        Self {
            rotation,
            translation,
            scale,
        }
    }

    /// Interpolate from `a` to `b`.
    ///
    /// `factor` of 0.0 = fully `a`, 1.0 = fully `b`. Translation and scale are
    /// lerped, rotation is slerped. The factor is not clamped.
    pub fn lerp(a: &JointPose, b: &JointPose, factor: f32) -> JointPose {
        JointPose {
            rotation: a.rotation.slerp(b.rotation, factor),
            translation: a.translation.lerp(b.translation, factor),
            scale: a.scale + (b.scale - a.scale) * factor,
        }
    }

    /// Layer an additive pose on top of this one, weighted by `factor`.
    ///
    /// Translation and scale add `delta * factor`; rotation slerps from the
    /// current rotation toward `rotation * delta.rotation`.
    pub fn additive_add(&mut self, delta: &JointPose, factor: f32) {
        self.translation += delta.translation * factor;
        self.rotation = self.rotation.slerp(self.rotation * delta.rotation, factor);
        self.scale += delta.scale * factor;
    }

    /// Difference `self - reference`, used to bake additive clips.
    ///
    /// Satisfies `reference.rotation * diff.rotation == self.rotation`, so
    /// `additive_add(diff, 1.0)` on the reference restores this pose.
    pub fn difference(&self, reference: &JointPose) -> JointPose {
        JointPose {
            rotation: (reference.rotation.inverse().normalize() * self.rotation),
            translation: self.translation - reference.translation,
            scale: self.scale - reference.scale,
        }
    }

    /// Uniform-scale TQS matrix for this pose
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.translation)
    }

    /// Approximate equality with an absolute tolerance per component
    pub fn abs_diff_eq(&self, other: &JointPose, max_abs_diff: f32) -> bool {
        // q and -q are the same rotation
        let same_rotation = self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
            || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff);
        same_rotation
            && self.translation.abs_diff_eq(other.translation, max_abs_diff)
            && (self.scale - other.scale).abs() <= max_abs_diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn pose(t: [f32; 3], scale: f32) -> JointPose {
        JointPose::new(Quat::IDENTITY, Vec3::from_array(t), scale)
    }

    #[test]
    fn lerp_factor_zero_returns_a() {
        let a = pose([1.0, 2.0, 3.0], 1.0);
        let b = pose([10.0, 20.0, 30.0], 2.0);
        let out = JointPose::lerp(&a, &b, 0.0);
        assert!(out.abs_diff_eq(&a, 1e-6));
    }

    #[test]
    fn lerp_factor_one_returns_b() {
        let a = pose([1.0, 2.0, 3.0], 1.0);
        let b = pose([10.0, 20.0, 30.0], 2.0);
        let out = JointPose::lerp(&a, &b, 1.0);
        assert!(out.abs_diff_eq(&b, 1e-5));
    }

    #[test]
    fn lerp_midpoint_interpolates() {
        let a = pose([0.0, 0.0, 0.0], 1.0);
        let b = pose([10.0, 20.0, 30.0], 3.0);
        let out = JointPose::lerp(&a, &b, 0.5);
        assert!((out.translation.x - 5.0).abs() < 1e-5);
        assert!((out.translation.y - 10.0).abs() < 1e-5);
        assert!((out.scale - 2.0).abs() < 1e-5);
    }

    #[test]
    fn lerp_rotation_slerps() {
        let a = JointPose::IDENTITY;
        let b = JointPose::new(Quat::from_rotation_y(FRAC_PI_2), Vec3::ZERO, 1.0);
        let out = JointPose::lerp(&a, &b, 0.5);
        let expected = Quat::from_rotation_y(FRAC_PI_2 * 0.5);
        assert!(out.rotation.abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn lerp_extrapolates_past_one() {
        let a = pose([0.0, 0.0, 0.0], 1.0);
        let b = pose([2.0, 0.0, 0.0], 1.0);
        let out = JointPose::lerp(&a, &b, 1.5);
        assert!((out.translation.x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn additive_zero_factor_keeps_base() {
        let mut base = pose([1.0, 2.0, 3.0], 1.0);
        let delta = JointPose::new(Quat::from_rotation_x(0.3), Vec3::new(5.0, 5.0, 5.0), 0.5);
        let before = base;
        base.additive_add(&delta, 0.0);
        assert!(base.abs_diff_eq(&before, 1e-6));
    }

    #[test]
    fn additive_full_factor_adds_delta() {
        let mut base = pose([1.0, 2.0, 3.0], 1.0);
        let delta = JointPose::new(Quat::from_rotation_z(FRAC_PI_2), Vec3::new(5.0, 0.0, 0.0), 0.5);
        base.additive_add(&delta, 1.0);
        assert!(base.translation.abs_diff_eq(Vec3::new(6.0, 2.0, 3.0), 1e-5));
        assert!((base.scale - 1.5).abs() < 1e-5);
        assert!(base.rotation.abs_diff_eq(Quat::from_rotation_z(FRAC_PI_2), 1e-5));
    }

    #[test]
    fn difference_then_additive_restores_pose() {
        let reference = JointPose::new(Quat::from_rotation_y(0.4), Vec3::new(1.0, 0.0, 0.0), 1.0);
        let target = JointPose::new(Quat::from_rotation_y(1.1), Vec3::new(1.0, 2.0, 0.0), 1.25);

        let delta = target.difference(&reference);
        let mut restored = reference;
        restored.additive_add(&delta, 1.0);

        assert!(restored.abs_diff_eq(&target, 1e-4));
    }

    #[test]
    fn identity_pose_produces_identity_matrix() {
        assert!(JointPose::IDENTITY.to_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn matrix_carries_translation_and_uniform_scale() {
        let m = pose([3.0, 5.0, 7.0], 2.0).to_matrix();
        assert!(m.w_axis.truncate().abs_diff_eq(Vec3::new(3.0, 5.0, 7.0), 1e-6));
        assert!((m.x_axis.x - 2.0).abs() < 1e-6);
        assert!((m.y_axis.y - 2.0).abs() < 1e-6);
        assert!((m.z_axis.z - 2.0).abs() < 1e-6);
    }
}
