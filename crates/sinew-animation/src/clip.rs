//! Baked skeletal animation clip and frame sampling
//!
//! A clip stores one `JointPose` per animated joint per frame, sampled at a
//! fixed rate. Sampling blends the two frames around the requested time.

use crate::pose::JointPose;
use sinew_core::{Result, SinewError};

/// Remap value for joints that carry no data in a clip
pub const UNANIMATED: i32 = -1;

/// Immutable baked animation data, shared read-only by every instance playing it.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    name: String,
    /// frames per second * 0.001; times are milliseconds throughout
    frames_per_ms: f32,
    frame_count: u32,
    animated_joint_count: usize,
    /// `frame_count * animated_joint_count` poses, frame-major
    joint_poses: Vec<JointPose>,
    /// skeleton joint index -> index into a frame's poses, or `UNANIMATED`
    joint_remap: Vec<i32>,
}

impl AnimationClip {
    /// Build a clip from baked frame data.
    ///
    /// `joint_remap` has one entry per skeleton joint. Every entry other than
    /// `UNANIMATED` must be a distinct index below the animated joint count,
    /// which is the number of animated entries.
    pub fn new(
        name: impl Into<String>,
        frames_per_second: f32,
        frame_count: u32,
        joint_remap: Vec<i32>,
        joint_poses: Vec<JointPose>,
    ) -> Result<Self> {
        let name = name.into();

        if !(frames_per_second > 0.0) {
            return Err(SinewError::InvalidClip(format!(
                "clip '{}' has non-positive frame rate: {}",
                name, frames_per_second
            )));
        }
        if frame_count == 0 {
            return Err(SinewError::InvalidClip(format!("clip '{}' has no frames", name)));
        }

        let animated_joint_count = joint_remap.iter().filter(|&&r| r != UNANIMATED).count();
        let mut seen = vec![false; animated_joint_count];
        for (joint, &remap) in joint_remap.iter().enumerate() {
            if remap == UNANIMATED {
                continue;
            }
            let slot = usize::try_from(remap)
                .ok()
                .filter(|&slot| slot < animated_joint_count && !seen[slot]);
            match slot {
                Some(slot) => seen[slot] = true,
                None => {
                    return Err(SinewError::InvalidClip(format!(
                        "clip '{}' joint {} has invalid remap index {}",
                        name, joint, remap
                    )))
                }
            }
        }

        let expected = frame_count as usize * animated_joint_count;
        if joint_poses.len() != expected {
            return Err(SinewError::InvalidClip(format!(
                "clip '{}' has {} poses, expected {} ({} frames x {} joints)",
                name,
                joint_poses.len(),
                expected,
                frame_count,
                animated_joint_count
            )));
        }

        Ok(Self {
            name,
            frames_per_ms: frames_per_second * 0.001,
            frame_count,
            animated_joint_count,
            joint_poses,
            joint_remap,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frames_per_ms(&self) -> f32 {
        self.frames_per_ms
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Number of skeleton joints this clip was baked against
    pub fn skeleton_joint_count(&self) -> usize {
        self.joint_remap.len()
    }

    /// Number of joints with data in this clip
    pub fn animated_joint_count(&self) -> usize {
        self.animated_joint_count
    }

    /// Playback extent in milliseconds.
    ///
    /// A looped clip's last frame is skipped since it matches the first one;
    /// a one-shot clip ends exactly on its last frame.
    pub fn duration(&self, looped: bool) -> f32 {
        if looped {
            self.frame_count as f32 / self.frames_per_ms
        } else {
            (self.frame_count - 1) as f32 / self.frames_per_ms
        }
    }

    /// Returns true if the skeleton joint has data in this clip
    pub fn has_joint_pose(&self, joint_idx: usize) -> bool {
        self.remapped(joint_idx).is_some()
    }

    /// Sample the pose of `joint_idx` at `local_time_ms`, blending the two
    /// frames around the sample time.
    ///
    /// Panics if the joint is not animated by this clip.
    pub fn sample_joint_pose(&self, local_time_ms: f32, joint_idx: usize, looped: bool) -> JointPose {
        let Some(slot) = self.remapped(joint_idx) else {
            panic!("joint {} has no pose in clip '{}'", joint_idx, self.name);
        };

        let sample_time = local_time_ms * self.frames_per_ms;
        let lower = sample_time.floor();
        let factor = sample_time - lower;

        let mut lower_frame = lower as u32;
        let mut upper_frame = sample_time.ceil() as u32;

        if looped {
            // blend the last frame toward the first one
            lower_frame %= self.frame_count;
            upper_frame %= self.frame_count;
        } else {
            let last = self.frame_count - 1;
            lower_frame = lower_frame.min(last);
            upper_frame = upper_frame.min(last);
        }

        let lower_pose = self.frame_pose(lower_frame, slot);
        let upper_pose = self.frame_pose(upper_frame, slot);

        JointPose::lerp(lower_pose, upper_pose, factor)
    }

    /// Turn this clip into an additive clip by subtracting `reference` frame by frame.
    ///
    /// Joints that the reference does not animate keep their absolute pose.
    pub fn make_additive(&mut self, reference: &AnimationClip) -> Result<()> {
        if self.skeleton_joint_count() != reference.skeleton_joint_count()
            || self.frames_per_ms != reference.frames_per_ms
            || self.frame_count != reference.frame_count
        {
            return Err(SinewError::AdditiveMismatch(format!(
                "'{}' and reference '{}' differ in joint count, frame rate or frame count",
                self.name, reference.name
            )));
        }

        for frame in 0..self.frame_count {
            for joint in 0..self.skeleton_joint_count() {
                let (Some(slot), Some(ref_slot)) = (self.remapped(joint), reference.remapped(joint)) else {
                    continue;
                };
                let base = *reference.frame_pose(frame, ref_slot);
                let index = frame as usize * self.animated_joint_count + slot;
                self.joint_poses[index] = self.joint_poses[index].difference(&base);
            }
        }

        log::debug!("Clip '{}' converted to additive against '{}'", self.name, reference.name);
        Ok(())
    }

    fn remapped(&self, joint_idx: usize) -> Option<usize> {
        self.joint_remap
            .get(joint_idx)
            .copied()
            .filter(|&r| r != UNANIMATED)
            .map(|r| r as usize)
    }

    fn frame_pose(&self, frame: u32, slot: usize) -> &JointPose {
        let index = frame as usize * self.animated_joint_count + slot;
        assert!(index < self.joint_poses.len(), "joint pose out of bounds");
        &self.joint_poses[index]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    /// Two-joint skeleton clip animating joint 0 only; frame `f` translates by `(f, 0, 0)`.
    pub(crate) fn ramp_clip(name: &str, frames_per_second: f32, frame_count: u32) -> AnimationClip {
        let poses = (0..frame_count)
            .map(|f| JointPose::new(Quat::IDENTITY, Vec3::new(f as f32, 0.0, 0.0), 1.0))
            .collect();
        AnimationClip::new(name, frames_per_second, frame_count, vec![0, UNANIMATED], poses).unwrap()
    }

    #[test]
    fn duration_looped_and_one_shot() {
        // 10 fps -> 0.01 frames/ms
        let clip = ramp_clip("walk", 10.0, 5);
        assert!((clip.duration(true) - 500.0).abs() < 1e-3);
        assert!((clip.duration(false) - 400.0).abs() < 1e-3);
    }

    #[test]
    fn sample_at_zero_is_first_frame() {
        let clip = ramp_clip("walk", 10.0, 5);
        let pose = clip.sample_joint_pose(0.0, 0, true);
        assert_eq!(pose.translation, Vec3::ZERO);
    }

    #[test]
    fn sample_on_frame_boundary_is_exact() {
        let clip = ramp_clip("walk", 10.0, 5);
        let pose = clip.sample_joint_pose(300.0, 0, false);
        assert!((pose.translation.x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn sample_between_frames_blends() {
        let clip = ramp_clip("walk", 10.0, 5);
        let pose = clip.sample_joint_pose(150.0, 0, false);
        assert!((pose.translation.x - 1.5).abs() < 1e-4);
    }

    #[test]
    fn looped_sample_near_end_blends_toward_first_frame() {
        let clip = ramp_clip("walk", 10.0, 5);
        // 475ms -> sample 4.75, between frame 4 (x=4) and wrapped frame 0 (x=0)
        let pose = clip.sample_joint_pose(475.0, 0, true);
        assert!((pose.translation.x - 1.0).abs() < 1e-3);
    }

    #[test]
    fn one_shot_sample_at_duration_is_last_frame() {
        let clip = ramp_clip("walk", 10.0, 5);
        let pose = clip.sample_joint_pose(clip.duration(false), 0, false);
        assert!((pose.translation.x - 4.0).abs() < 1e-5);
    }

    #[test]
    fn unanimated_joint_has_no_pose() {
        let clip = ramp_clip("walk", 10.0, 5);
        assert!(clip.has_joint_pose(0));
        assert!(!clip.has_joint_pose(1));
        assert!(!clip.has_joint_pose(7));
    }

    #[test]
    #[should_panic(expected = "has no pose")]
    fn sampling_unanimated_joint_panics() {
        let clip = ramp_clip("walk", 10.0, 5);
        clip.sample_joint_pose(0.0, 1, true);
    }

    #[test]
    fn reject_bad_frame_data() {
        let pose = JointPose::IDENTITY;
        assert!(AnimationClip::new("a", 0.0, 1, vec![0], vec![pose]).is_err());
        assert!(AnimationClip::new("b", 30.0, 0, vec![0], vec![]).is_err());
        assert!(AnimationClip::new("c", 30.0, 2, vec![0], vec![pose]).is_err());
        assert!(AnimationClip::new("d", 30.0, 1, vec![3], vec![pose]).is_err());
        assert!(AnimationClip::new("e", 30.0, 1, vec![0, 0], vec![pose, pose]).is_err());
    }

    #[test]
    fn make_additive_subtracts_reference() {
        let mut clip = ramp_clip("wave", 10.0, 3);
        let reference = AnimationClip::new(
            "bind",
            10.0,
            3,
            vec![0, UNANIMATED],
            vec![JointPose::new(Quat::IDENTITY, Vec3::new(1.0, 0.0, 0.0), 1.0); 3],
        )
        .unwrap();

        clip.make_additive(&reference).unwrap();

        let pose = clip.sample_joint_pose(200.0, 0, false);
        assert!((pose.translation.x - 1.0).abs() < 1e-5);
        assert!(pose.scale.abs() < 1e-6);
    }

    #[test]
    fn make_additive_rejects_mismatched_reference() {
        let mut clip = ramp_clip("wave", 10.0, 3);
        let reference = ramp_clip("bind", 10.0, 4);
        assert!(matches!(
            clip.make_additive(&reference),
            Err(SinewError::AdditiveMismatch(_))
        ));
    }
}
