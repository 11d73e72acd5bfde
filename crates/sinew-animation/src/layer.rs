//! Animation layer: state-driven playback with cross-fades
//!
//! A layer is idle until a state is played, playing while only its current
//! tree is live, and cross-fading while the previous tree is still blended
//! in. The layer owns its clock; every clip start time is expressed on it.

use crate::blend_tree::BlendTree;
use crate::pose::JointPose;
use crate::states::StateGraph;
use serde::Deserialize;
use sinew_core::{Result, SinewError};
use std::sync::Arc;

/// Shape of the cross-fade weight over normalized fade time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossFadeCurve {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
}

impl CrossFadeCurve {
    /// Map normalized fade time `t` to the weight of the incoming tree
    pub fn apply(self, t: f32) -> f32 {
        match self {
            CrossFadeCurve::Linear => t,
            CrossFadeCurve::EaseIn => t * t,
            CrossFadeCurve::EaseOut => t * (2.0 - t),
        }
    }
}

/// How a layer's pose is combined with the layers below it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerKind {
    #[default]
    Lerp,
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSettings {
    /// Clock value past which the clock is rewound by this same amount
    pub clock_rebase_threshold_ms: f32,
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            clock_rebase_threshold_ms: f32::MAX * 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CrossFade {
    timer_ms: f32,
    duration_ms: f32,
    curve: CrossFadeCurve,
}

#[derive(Debug, Clone)]
pub struct AnimLayer {
    graph: Option<Arc<StateGraph>>,
    current_state: Option<usize>,
    clock_ms: f32,
    paused: bool,
    current: BlendTree,
    /// Outgoing tree, live only while `crossfade` is set
    previous: BlendTree,
    kind: LayerKind,
    blend_factor: f32,
    crossfade: Option<CrossFade>,
    settings: LayerSettings,
}

impl Default for AnimLayer {
    fn default() -> Self {
        Self::new(LayerKind::default(), LayerSettings::default())
    }
}

impl AnimLayer {
    pub fn new(kind: LayerKind, settings: LayerSettings) -> Self {
        Self {
            graph: None,
            current_state: None,
            clock_ms: 0.0,
            paused: false,
            current: BlendTree::new(),
            previous: BlendTree::new(),
            kind,
            blend_factor: 1.0,
            crossfade: None,
            settings,
        }
    }

    /// Assign the state graph and size both working trees for its largest state.
    ///
    /// Stops any playback.
    pub fn set_state_graph(&mut self, graph: Arc<StateGraph>) {
        self.stop();
        self.current_state = None;

        let capacity = graph.max_node_count();
        self.current.resize(capacity);
        self.previous.resize(capacity);
        self.graph = Some(graph);
    }

    pub fn state_graph(&self) -> Option<&Arc<StateGraph>> {
        self.graph.as_ref()
    }

    /// Enter `state_name`, cross-fading over `blend_ms` if something is playing.
    pub fn play(&mut self, state_name: &str, blend_ms: f32) -> Result<()> {
        let graph = self.graph.clone().ok_or(SinewError::StateGraphNotSet)?;
        let state_idx = graph.find_state(state_name).ok_or_else(|| {
            log::debug!("Play: no state '{}'", state_name);
            SinewError::StateNotFound(state_name.to_string())
        })?;

        let tree = graph.state(state_idx).blend_tree();
        if !tree.is_valid() {
            return Err(SinewError::EmptyBlendTree(state_name.to_string()));
        }

        self.play_tree(tree, blend_ms, self.clock_ms, CrossFadeCurve::Linear);
        self.current_state = Some(state_idx);
        Ok(())
    }

    /// Follow the named transition out of the current state.
    ///
    /// A synced transition starts the destination tree at the current tree's
    /// local time, so both play in phase.
    pub fn transition(&mut self, transition_name: &str) -> Result<()> {
        let graph = self.graph.clone().ok_or(SinewError::StateGraphNotSet)?;
        let state_idx = self.current_state.ok_or(SinewError::NoCurrentState)?;

        let transition = graph.find_transition(state_idx, transition_name).ok_or_else(|| {
            log::debug!(
                "Transition: no '{}' out of state '{}'",
                transition_name,
                graph.state(state_idx).name()
            );
            SinewError::TransitionNotFound {
                state: graph.state(state_idx).name().to_string(),
                transition: transition_name.to_string(),
            }
        })?;

        let destination = graph.state(transition.destination());
        if !destination.blend_tree().is_valid() {
            return Err(SinewError::EmptyBlendTree(destination.name().to_string()));
        }

        let start_time = if transition.is_synced() {
            self.clock_ms - self.current.local_animation_time(self.clock_ms)
        } else {
            self.clock_ms
        };

        self.play_tree(
            destination.blend_tree(),
            transition.blend_time(),
            start_time,
            transition.curve(),
        );
        self.current_state = Some(transition.destination());
        Ok(())
    }

    fn play_tree(&mut self, tree: &BlendTree, blend_ms: f32, start_time_ms: f32, curve: CrossFadeCurve) {
        if blend_ms > 0.0 && self.current.is_valid() {
            if self.crossfade.is_some() {
                // one level of history: the older outgoing tree is dropped
                log::debug!("Cross-fade interrupted, previous tree discarded");
            }
            std::mem::swap(&mut self.current, &mut self.previous);
            self.crossfade = Some(CrossFade {
                timer_ms: 0.0,
                duration_ms: blend_ms,
                curve,
            });
        } else {
            self.previous.clear();
            self.crossfade = None;
        }

        self.current.copy_from(tree);
        self.current.start(start_time_ms);
    }

    /// Drop both trees and any cross-fade. The current state is kept so a
    /// later transition still resolves from it.
    pub fn stop(&mut self) {
        self.current.clear();
        self.previous.clear();
        self.crossfade = None;
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// True while a tree is playing
    pub fn is_active(&self) -> bool {
        self.current.is_valid()
    }

    pub fn is_cross_fading(&self) -> bool {
        self.crossfade.is_some()
    }

    /// Weight of the incoming tree, if a cross-fade is running
    pub fn crossfade_factor(&self) -> Option<f32> {
        self.crossfade
            .map(|fade| fade.curve.apply(fade.timer_ms / fade.duration_ms))
    }

    pub fn current_state(&self) -> Option<usize> {
        self.current_state
    }

    pub fn current_state_name(&self) -> Option<&str> {
        let graph = self.graph.as_ref()?;
        self.current_state.map(|idx| graph.state(idx).name())
    }

    pub fn clock(&self) -> f32 {
        self.clock_ms
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: LayerKind) {
        self.kind = kind;
    }

    pub fn blend_factor(&self) -> f32 {
        self.blend_factor
    }

    /// Weight of this layer over the layers below it
    pub fn set_blend_factor(&mut self, factor: f32) {
        self.blend_factor = factor;
    }

    /// Tune a named factor of the playing tree
    pub fn set_node_factor(&mut self, name: &str, value: f32) -> Result<()> {
        self.current.set_node_factor(name, value)
    }

    pub fn node_factor(&self, name: &str) -> Option<f32> {
        self.current.node_factor(name)
    }

    /// Pose of `joint_idx`, or `None` when idle or no playing clip animates it.
    ///
    /// During a cross-fade the result is `lerp(previous, current, factor)`.
    pub fn joint_pose(&self, joint_idx: usize) -> Option<JointPose> {
        if !self.current.is_valid() {
            return None;
        }

        let current = self.current.joint_pose(self.clock_ms, joint_idx);
        let Some(fade) = self.crossfade else {
            return current;
        };

        let previous = self.previous.joint_pose(self.clock_ms, joint_idx);
        match (previous, current) {
            (Some(previous), Some(current)) => {
                let factor = fade.curve.apply(fade.timer_ms / fade.duration_ms);
                Some(JointPose::lerp(&previous, &current, factor))
            }
            (Some(pose), None) | (None, Some(pose)) => Some(pose),
            (None, None) => None,
        }
    }

    /// Advance the clock and any cross-fade by `delta_ms`. No-op while paused.
    pub fn update(&mut self, delta_ms: f32) {
        if self.paused {
            return;
        }

        self.clock_ms += delta_ms;

        let mut fade_done = false;
        if let Some(fade) = &mut self.crossfade {
            fade.timer_ms += delta_ms;
            fade_done = fade.timer_ms >= fade.duration_ms;
        }
        if fade_done {
            self.crossfade = None;
            self.previous.clear();
            log::debug!("Cross-fade into '{}' complete", self.current_state_name().unwrap_or("?"));
        }

        let threshold = self.settings.clock_rebase_threshold_ms;
        if self.clock_ms > threshold {
            self.rebase_clock(threshold);
        }
    }

    /// Rewind the clock by `rewind_ms`, moving every clip start time back by
    /// the same amount so playback phase is unchanged.
    pub fn rebase_clock(&mut self, rewind_ms: f32) {
        self.clock_ms -= rewind_ms;
        self.current.rebase_start_times(rewind_ms);
        self.previous.rebase_start_times(rewind_ms);
        log::debug!("Layer clock rebased by {} ms", rewind_ms);
    }
}
