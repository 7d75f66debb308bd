use std::cell::Cell;

use glam::{Mat4, Quat, Vec3};

/// Local translation, rotation and scale of an object, plus its cached world matrix.
#[derive(Debug, Clone)]
pub struct Transform {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,

    world_matrix: Cell<Mat4>,
    world_dirty: Cell<bool>,
}

impl Transform {
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
            world_matrix: Cell::new(Mat4::IDENTITY),
            world_dirty: Cell::new(true),
        }
    }

    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Valid after the owning scene's `late_update`.
    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix.get()
    }

    pub fn set_world_matrix(&self, world_matrix: Mat4) {
        self.world_matrix.set(world_matrix);
        self.world_dirty.set(false);
    }

    pub fn invalidate_world(&self) {
        self.world_dirty.set(true);
    }

    pub fn is_world_dirty(&self) -> bool {
        self.world_dirty.get()
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.invalidate_world();
    }

    #[cfg(test)]
    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
        self.invalidate_world();
    }

    pub fn set_transform(&mut self, translation: Vec3, rotation: Quat, scale: Vec3) {
        self.translation = translation;
        self.rotation = rotation;
        self.scale = scale;
        self.invalidate_world();
    }

    #[cfg(test)]
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    #[cfg(test)]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.translation == other.translation
            && self.rotation == other.rotation
            && self.scale == other.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_matrix_scales_then_rotates_then_translates() {
        let transform = Transform::new(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::splat(2.0),
        );

        let point = transform.local_matrix().transform_point3(Vec3::X);
        assert!(point.abs_diff_eq(Vec3::new(1.0, 0.0, -2.0), 1e-6));
    }

    #[test]
    fn setters_mark_world_dirty() {
        let mut transform = Transform::default();
        transform.set_world_matrix(Mat4::IDENTITY);
        assert!(!transform.is_world_dirty());

        transform.set_translation(Vec3::Y);
        assert!(transform.is_world_dirty());
    }

    #[test]
    fn non_uniform_scale_stretches_each_axis() {
        let transform = Transform::new(Vec3::ZERO, Quat::IDENTITY, Vec3::new(1.0, 10.0, 2.0));

        let point = transform.local_matrix().transform_point3(Vec3::ONE);
        assert!(point.abs_diff_eq(Vec3::new(1.0, 10.0, 2.0), 1e-6));
    }
}
