use std::f64::consts::TAU;

use glam::{Quat, Vec3};

use crate::{
    math::bounds::Aabb,
    scene_graph::{object3d::Object3D, ObjectId, Scene},
};

/// Offset and uniform scale that center a model at the origin and fit it
/// within `max_dimension` units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub offset: Vec3,
    pub scale: f32,
}

impl Normalization {
    pub const IDENTITY: Normalization = Normalization {
        offset: Vec3::ZERO,
        scale: 1.0,
    };

    pub fn from_bounds(bounds: &Aabb, max_dimension: f32) -> Normalization {
        if bounds.is_empty() {
            return Self::IDENTITY;
        }

        let largest = bounds.max_dimension();
        let scale = if largest > max_dimension {
            max_dimension / largest
        } else {
            1.0
        };

        // Scaling happens about the local origin, so the offset is scaled too.
        Normalization {
            offset: -bounds.center() * scale,
            scale,
        }
    }
}

/// Yaw that grows with time spent rotating.
///
/// Time is accumulated in `f64` and the angle derived from it, so the result
/// does not depend on how the elapsed time was split into frames.
#[derive(Debug, Clone)]
pub struct AutoRotate {
    pub enabled: bool,
    /// Radians per second.
    pub speed: f32,
    rotating_time: f64,
}

impl AutoRotate {
    pub fn new(enabled: bool, speed: f32) -> Self {
        Self {
            enabled,
            speed,
            rotating_time: 0.0,
        }
    }

    pub fn advance(&mut self, delta_time: f64) {
        if self.enabled && delta_time > 0.0 {
            self.rotating_time += delta_time;
        }
    }

    /// Current yaw in `[0, TAU)`.
    pub fn yaw(&self) -> f32 {
        (self.rotating_time * self.speed as f64).rem_euclid(TAU) as f32
    }
}

/// The displayed model: a pivot that carries the yaw, with the asset root
/// below it carrying the normalization.
///
/// Splitting the two keeps the model spinning about its own center.
pub struct ModelNode {
    pub pivot: ObjectId,
    root: Option<ObjectId>,
    normalization: Option<Normalization>,
}

impl ModelNode {
    pub fn new(scene: &mut Scene) -> Self {
        let pivot = scene.add_object(Object3D::named("Model pivot"));

        Self {
            pivot,
            root: None,
            normalization: None,
        }
    }

    pub fn root(&self) -> Option<ObjectId> {
        self.root
    }

    #[cfg(test)]
    pub fn normalization(&self) -> Option<Normalization> {
        self.normalization
    }

    /// Centers and scales a freshly spawned asset root. Runs once; later calls
    /// are ignored and return the normalization already applied.
    pub fn attach(
        &mut self,
        scene: &mut Scene,
        root: ObjectId,
        max_dimension: f32,
    ) -> Normalization {
        if let Some(normalization) = self.normalization {
            log::warn!("Model already attached, ignoring {:?}", root);
            return normalization;
        }

        scene.set_object_parent(root, Some(self.pivot));

        let bounds = scene.compute_bounds(root);
        let normalization = Normalization::from_bounds(&bounds, max_dimension);

        if bounds.is_empty() {
            log::warn!("Model has no geometry, skipping normalization");
        } else {
            log::debug!(
                "Model bounds {:?}..{:?}, offset {:?}, scale {}",
                bounds.min,
                bounds.max,
                normalization.offset,
                normalization.scale
            );
        }

        let rotation = scene
            .get_object_transform(root)
            .map(|transform| transform.rotation())
            .unwrap_or(Quat::IDENTITY);
        scene.set_object_transform(
            root,
            normalization.offset,
            rotation,
            Vec3::splat(normalization.scale),
        );

        self.root = Some(root);
        self.normalization = Some(normalization);
        normalization
    }

    pub fn update(&self, scene: &mut Scene, auto_rotate: &AutoRotate) {
        if self.root.is_some() {
            scene.set_object_rotation(self.pivot, Quat::from_rotation_y(auto_rotate.yaw()));
        }
    }
}
