//! Clip playback instance: maps a layer's clock onto clip-local time

use crate::clip::AnimationClip;
use crate::pose::JointPose;
use std::sync::Arc;

/// A clip bound to a start time, loop flag and playback rate.
///
/// The clip is shared; cloning an instance only bumps the reference count.
#[derive(Debug, Clone)]
pub struct Animation {
    clip: Arc<AnimationClip>,
    /// Start time relative to the owning layer's clock
    start_time_ms: f32,
    looped: bool,
    /// Playback speed multiplier (1.0 = normal, negative = reverse)
    playback_rate: f32,
}

impl Animation {
    pub fn new(clip: Arc<AnimationClip>, start_time_ms: f32, looped: bool, playback_rate: f32) -> Self {
        Self {
            clip,
            start_time_ms,
            looped,
            playback_rate,
        }
    }

    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    pub fn start_time(&self) -> f32 {
        self.start_time_ms
    }

    pub fn set_start_time(&mut self, time_ms: f32) {
        self.start_time_ms = time_ms;
    }

    pub fn looped(&self) -> bool {
        self.looped
    }

    pub fn playback_rate(&self) -> f32 {
        self.playback_rate
    }

    pub fn set_playback_rate(&mut self, rate: f32) {
        self.playback_rate = rate;
    }

    pub fn duration(&self) -> f32 {
        self.clip.duration(self.looped)
    }

    pub fn has_joint_pose(&self, joint_idx: usize) -> bool {
        self.clip.has_joint_pose(joint_idx)
    }

    /// Local clip time in milliseconds for the given layer clock value.
    ///
    /// Looped: `R * (T - Tstart) mod D`. One-shot: the same elapsed time
    /// clamped to `[-D, D]`. Negative results (reverse playback) are shifted
    /// up by `D`.
    pub fn local_time(&self, global_time_ms: f32) -> f32 {
        let duration = self.duration();
        let elapsed = self.playback_rate * (global_time_ms - self.start_time_ms);

        let mut local_time = if self.looped {
            elapsed % duration
        } else {
            elapsed.clamp(-duration, duration)
        };

        if local_time < 0.0 {
            local_time += duration;
        }

        local_time
    }

    /// Sample `joint_idx` at the given layer clock value
    pub fn sample_joint_pose(&self, global_time_ms: f32, joint_idx: usize) -> JointPose {
        let local_time = self.local_time(global_time_ms);
        debug_assert!(local_time <= self.duration(), "local time out of range");

        self.clip.sample_joint_pose(local_time, joint_idx, self.looped)
    }
}
