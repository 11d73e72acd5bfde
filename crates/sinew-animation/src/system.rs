//! Animation system: owns every controller and runs the per-frame pipeline

use crate::config::AnimationConfig;
use crate::controller::AnimController;
use crate::debug::DebugRenderer;
use crate::skeleton::Skeleton;
use sinew_core::{Result, SinewError};
use sinew_runtime::RuntimeSystem;
use slotmap::{new_key_type, SlotMap};
use std::sync::Arc;

new_key_type! {
    /// Generation-checked handle to a controller; stale after `destroy_controller`.
    pub struct ControllerHandle;
}

/// Runs `update -> local pose -> global pose -> matrix palette` across all
/// live controllers.
pub struct AnimationSystem {
    controllers: SlotMap<ControllerHandle, AnimController>,
    config: AnimationConfig,
}

impl Default for AnimationSystem {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}

impl AnimationSystem {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            controllers: SlotMap::with_key(),
            config,
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Create a controller with the configured default layer count
    pub fn create_default_controller(&mut self, skeleton: Arc<Skeleton>) -> Result<ControllerHandle> {
        self.create_controller(skeleton, self.config.default_layer_count)
    }

    pub fn create_controller(&mut self, skeleton: Arc<Skeleton>, layer_count: usize) -> Result<ControllerHandle> {
        if self.controllers.len() >= self.config.max_controllers {
            log::warn!("Controller limit of {} reached", self.config.max_controllers);
            return Err(SinewError::ControllerLimit(self.config.max_controllers));
        }

        let name = skeleton.name().to_string();
        let controller = AnimController::new(skeleton, layer_count, self.config.layer_settings());
        let handle = self.controllers.insert(controller);
        log::debug!(
            "Created controller {:?} for skeleton '{}' with {} layers",
            handle,
            name,
            layer_count
        );
        Ok(handle)
    }

    /// Remove a controller, returning it if the handle was live
    pub fn destroy_controller(&mut self, handle: ControllerHandle) -> Option<AnimController> {
        let removed = self.controllers.remove(handle);
        if removed.is_some() {
            log::debug!("Destroyed controller {:?}", handle);
        }
        removed
    }

    pub fn has_controller(&self, handle: ControllerHandle) -> bool {
        self.controllers.contains_key(handle)
    }

    pub fn controller(&self, handle: ControllerHandle) -> Option<&AnimController> {
        self.controllers.get(handle)
    }

    pub fn controller_mut(&mut self, handle: ControllerHandle) -> Option<&mut AnimController> {
        self.controllers.get_mut(handle)
    }

    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    pub fn handles(&self) -> impl Iterator<Item = ControllerHandle> + '_ {
        self.controllers.keys()
    }

    /// Advance every layer clock by `delta_ms`
    pub fn update(&mut self, delta_ms: f32) {
        for controller in self.controllers.values_mut() {
            controller.update(delta_ms);
        }
    }

    pub fn local_pose_calculation(&mut self) {
        for controller in self.controllers.values_mut() {
            controller.calculate_local_pose();
        }
    }

    pub fn global_pose_calculation(&mut self) {
        for controller in self.controllers.values_mut() {
            controller.calculate_global_pose();
        }
    }

    pub fn matrix_palette_generation(&mut self) {
        for controller in self.controllers.values_mut() {
            controller.generate_matrix_palette();
        }
    }

    /// All four pipeline stages in order
    pub fn run_frame(&mut self, delta_ms: f32) {
        self.update(delta_ms);
        self.local_pose_calculation();
        self.global_pose_calculation();
        self.matrix_palette_generation();
    }

    pub fn draw(&self, renderer: &mut dyn DebugRenderer, axis_size: f32) {
        for controller in self.controllers.values() {
            controller.draw(renderer, axis_size);
        }
    }
}

impl RuntimeSystem for AnimationSystem {
    fn initialize(&mut self) -> Result<()> {
        log::info!(
            "Animation system initialized (max {} controllers)",
            self.config.max_controllers
        );
        Ok(())
    }

    fn update(&mut self, delta_ms: f32) -> Result<()> {
        self.run_frame(delta_ms);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        log::info!(
            "Animation system shutting down ({} controllers)",
            self.controllers.len()
        );
        self.controllers.clear();
        Ok(())
    }

    fn name(&self) -> &str {
        "animation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::tests::controller_graph;
    use crate::debug::tests::LineRecorder;
    use crate::skeleton::tests::two_joint_skeleton;
    use glam::{Mat4, Vec3};

    fn skeleton() -> Arc<Skeleton> {
        Arc::new(two_joint_skeleton())
    }

    #[test]
    fn create_and_destroy_controllers() {
        let mut system = AnimationSystem::default();
        let a = system.create_default_controller(skeleton()).unwrap();
        let b = system.create_controller(skeleton(), 3).unwrap();

        assert_eq!(system.controller_count(), 2);
        assert_eq!(system.controller(a).unwrap().layer_count(), 1);
        assert_eq!(system.controller(b).unwrap().layer_count(), 3);

        assert!(system.destroy_controller(a).is_some());
        assert!(!system.has_controller(a));
        assert!(system.controller(a).is_none());
        assert!(system.destroy_controller(a).is_none());
        assert!(system.has_controller(b));
    }

    #[test]
    fn stale_handle_does_not_alias_reused_slot() {
        let mut system = AnimationSystem::default();
        let old = system.create_default_controller(skeleton()).unwrap();
        system.destroy_controller(old);
        let new = system.create_default_controller(skeleton()).unwrap();

        assert_ne!(old, new);
        assert!(system.controller(old).is_none());
        assert!(system.controller(new).is_some());
    }

    #[test]
    fn controller_limit_is_enforced() {
        let mut system = AnimationSystem::new(AnimationConfig {
            max_controllers: 2,
            ..AnimationConfig::default()
        });
        system.create_default_controller(skeleton()).unwrap();
        let second = system.create_default_controller(skeleton()).unwrap();
        assert!(matches!(
            system.create_default_controller(skeleton()),
            Err(SinewError::ControllerLimit(2))
        ));

        system.destroy_controller(second);
        assert!(system.create_default_controller(skeleton()).is_ok());
    }

    #[test]
    fn run_frame_drives_full_pipeline() {
        let mut system = AnimationSystem::default();
        let handle = system.create_default_controller(skeleton()).unwrap();
        {
            let layer = system.controller_mut(handle).unwrap().layer_mut(0);
            layer.set_state_graph(controller_graph());
            layer.play("lift", 0.0).unwrap();
        }

        system.run_frame(16.0);

        let controller = system.controller(handle).unwrap();
        assert_eq!(controller.layer(0).clock(), 16.0);
        let world = controller.hierarchy().node(1).world;
        assert!(world.w_axis.truncate().abs_diff_eq(Vec3::new(0.0, 3.0, 0.0), 1e-5));
        assert!(controller.skinning_palette()[1]
            .abs_diff_eq(Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)), 1e-5));
    }

    #[test]
    fn runtime_system_lifecycle() {
        let mut system = AnimationSystem::default();
        system.initialize().unwrap();
        let handle = system.create_default_controller(skeleton()).unwrap();

        RuntimeSystem::update(&mut system, 10.0).unwrap();
        assert_eq!(system.controller(handle).unwrap().layer(0).clock(), 10.0);
        assert_eq!(system.name(), "animation");

        system.shutdown().unwrap();
        assert_eq!(system.controller_count(), 0);
    }

    #[test]
    fn draw_visits_every_controller() {
        let mut system = AnimationSystem::default();
        system.create_default_controller(skeleton()).unwrap();
        system.create_default_controller(skeleton()).unwrap();

        let mut recorder = LineRecorder::default();
        system.draw(&mut recorder, 0.1);
        assert_eq!(recorder.lines.len(), 14);
    }
}
