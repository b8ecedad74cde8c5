//! Scroll camera with a bounded accelerate/decay integrator.

use glam::Vec2;
use tileproto_config::CameraConfig;
use tileproto_world::ViewRect;

/// 2D camera scrolled by the steering axis.
///
/// Each fixed step, in order: held directions add `accel` to the velocity,
/// each velocity axis is clamped to `±max_speed`, the position integrates
/// the velocity, and the velocity is divided by `decay`. Decaying after
/// the move gives a short glide once keys are released instead of a dead
/// stop.
#[derive(Debug, Clone)]
pub struct ScrollCamera {
    /// World-space position of the view's bottom-left corner.
    pub position: Vec2,
    /// Current velocity, world units per fixed step.
    pub velocity: Vec2,
    view_height: f32,
    accel: f32,
    max_speed: f32,
    decay: f32,
}

impl ScrollCamera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            view_height: config.view_height,
            accel: config.accel,
            max_speed: config.max_speed,
            decay: config.decay,
        }
    }

    /// Advance one fixed step with the current steering input (each axis in
    /// `{-1, 0, 1}`, as produced by `KeyboardState::steer_axis`).
    pub fn step(&mut self, steer: Vec2) {
        self.velocity += steer * self.accel;
        self.velocity = self
            .velocity
            .clamp(Vec2::splat(-self.max_speed), Vec2::splat(self.max_speed));
        self.position += self.velocity;
        self.velocity /= self.decay;
    }

    /// Magnitude of the current velocity.
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// The world-space rectangle the camera sees at the given window aspect
    /// ratio. The height is fixed by config; the width follows the aspect.
    pub fn view_rect(&self, aspect_ratio: f32) -> ViewRect {
        let size = Vec2::new(self.view_height * aspect_ratio, self.view_height);
        ViewRect::new(self.position, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> ScrollCamera {
        ScrollCamera::new(&CameraConfig::default())
    }

    /// Config whose accel is large enough for the per-axis clamp to engage
    /// on the second step.
    fn fast_config() -> CameraConfig {
        CameraConfig {
            accel: 0.5,
            ..CameraConfig::default()
        }
    }

    #[test]
    fn test_no_input_stays_put() {
        let mut cam = camera();
        for _ in 0..10 {
            cam.step(Vec2::ZERO);
        }
        assert_eq!(cam.position, Vec2::ZERO);
        assert_eq!(cam.speed(), 0.0);
    }

    #[test]
    fn test_first_step_moves_by_one_accel() {
        // Order is accelerate, clamp, move, decay: the position sees the
        // fresh acceleration, the stored velocity is already decayed.
        let mut cam = camera();
        cam.step(Vec2::new(1.0, 0.0));
        assert!((cam.position.x - 0.08).abs() < 1e-6);
        assert_eq!(cam.position.y, 0.0);
        assert!((cam.velocity.x - 0.08 / 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_terminal_speed_settles_below_clamp() {
        // Steady state solves v = v / decay + accel, so the per-step
        // displacement converges to accel * decay / (decay - 1) = 0.48,
        // inside the 0.8 clamp for the default constants.
        let mut cam = camera();
        for _ in 0..200 {
            cam.step(Vec2::new(1.0, 0.0));
        }
        let before = cam.position.x;
        cam.step(Vec2::new(1.0, 0.0));
        let per_step = cam.position.x - before;
        assert!(
            (per_step - 0.48).abs() < 1e-3,
            "terminal per-step displacement was {per_step}"
        );
    }

    #[test]
    fn test_axis_clamp_limits_displacement() {
        let mut cam = ScrollCamera::new(&fast_config());
        cam.step(Vec2::new(1.0, 0.0));
        let before = cam.position.x;
        cam.step(Vec2::new(1.0, 0.0));
        // Second step: velocity 0.5 / 1.2 + 0.5 exceeds the clamp.
        assert!((cam.position.x - before - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_diagonal_clamps_each_axis_independently() {
        let mut cam = ScrollCamera::new(&fast_config());
        cam.step(Vec2::ONE);
        let before = cam.position;
        cam.step(Vec2::ONE);
        let delta = cam.position - before;
        assert!((delta.x - 0.8).abs() < 1e-6);
        assert!((delta.y - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_release_glides_to_rest() {
        let mut cam = camera();
        for _ in 0..60 {
            cam.step(Vec2::new(0.0, 1.0));
        }
        assert!(cam.speed() > 0.1, "camera should be moving before release");

        for _ in 0..100 {
            cam.step(Vec2::ZERO);
        }
        assert!(cam.speed() < 1e-6, "camera should coast to rest");
        let resting = cam.position;
        cam.step(Vec2::ZERO);
        assert!((cam.position - resting).length() < 1e-6);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut cam = camera();
        // steer_axis already cancels opposite keys to zero; a zero axis
        // must add no velocity.
        cam.step(Vec2::ZERO);
        assert_eq!(cam.position, Vec2::ZERO);
    }

    #[test]
    fn test_view_rect_follows_position_and_aspect() {
        let mut cam = camera();
        cam.position = Vec2::new(3.0, 4.0);
        let view = cam.view_rect(2.0);
        assert_eq!(view.pos, Vec2::new(3.0, 4.0));
        assert_eq!(view.size, Vec2::new(30.0, 15.0));
    }
}
