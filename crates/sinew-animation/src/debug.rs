//! Debug-draw hook for skeletons and animated hierarchies

use glam::{Mat4, Vec3};
use sinew_core::Color;

/// Line-drawing capability supplied by the host renderer.
pub trait DebugRenderer {
    fn add_line(&mut self, from: Vec3, to: Vec3, color: Color);

    /// Draw the three basis axes of `transform`, each `size` long.
    fn add_axis(&mut self, transform: &Mat4, size: f32) {
        let origin = transform.w_axis.truncate();
        self.add_line(origin, transform.transform_point3(Vec3::X * size), Color::RED);
        self.add_line(origin, transform.transform_point3(Vec3::Y * size), Color::GREEN);
        self.add_line(origin, transform.transform_point3(Vec3::Z * size), Color::BLUE);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Renderer that keeps every line it is given
    #[derive(Default)]
    pub(crate) struct LineRecorder {
        pub lines: Vec<(Vec3, Vec3, Color)>,
    }

    impl DebugRenderer for LineRecorder {
        fn add_line(&mut self, from: Vec3, to: Vec3, color: Color) {
            self.lines.push((from, to, color));
        }
    }

    #[test]
    fn default_axis_draws_three_colored_lines() {
        let mut recorder = LineRecorder::default();
        recorder.add_axis(&Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)), 0.5);

        assert_eq!(recorder.lines.len(), 3);
        let (from, to, color) = recorder.lines[1];
        assert_eq!(from, Vec3::new(1.0, 0.0, 0.0));
        assert!(to.abs_diff_eq(Vec3::new(1.0, 0.5, 0.0), 1e-6));
        assert_eq!(color, Color::GREEN);
    }
}
