//! Mouse driven orbit, pan and zoom around the camera target.
//!
//! Controls only ever touch the [`Camera`]. The displayed model keeps its own
//! transform, which is why the viewer disables `auto_rotate` here and spins
//! the model instead.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::camera::Camera;

const POLAR_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enable_rotate: bool,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub auto_rotate: bool,
    /// Full turns per minute when `auto_rotate` is on.
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            enable_rotate: true,
            enable_pan: true,
            enable_zoom: true,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.1,
            max_distance: 100.0,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
        }
    }
}

/// Camera offset from its target in spherical coordinates around +Y.
#[derive(Debug, Clone, Copy)]
struct Spherical {
    radius: f32,
    /// Angle from +Y.
    polar: f32,
    /// Angle around +Y, measured from +Z.
    azimuth: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius,
                polar: 0.0,
                azimuth: 0.0,
            };
        }

        Self {
            radius,
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            azimuth: offset.x.atan2(offset.z),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_polar = self.polar.sin();
        Vec3::new(
            self.radius * sin_polar * self.azimuth.sin(),
            self.radius * self.polar.cos(),
            self.radius * sin_polar * self.azimuth.cos(),
        )
    }
}

impl OrbitControls {
    fn apply(&self, camera: &mut Camera, f: impl FnOnce(&mut Spherical)) {
        let mut spherical = Spherical::from_offset(camera.eye - camera.target);
        f(&mut spherical);

        spherical.polar = spherical
            .polar
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        spherical.radius = spherical.radius.clamp(self.min_distance, self.max_distance);

        camera.eye = camera.target + spherical.to_offset();
    }

    /// Orbits by a cursor delta in pixels. Dragging across the full viewport
    /// height turns the camera a full circle.
    pub fn rotate(&self, camera: &mut Camera, delta: Vec2, viewport_height: f32) {
        if !self.enable_rotate || viewport_height <= 0.0 {
            return;
        }

        let scale = TAU * self.rotate_speed / viewport_height;
        self.apply(camera, |spherical| {
            spherical.azimuth -= delta.x * scale;
            spherical.polar -= delta.y * scale;
        });
    }

    /// Moves camera and target together so the point under the cursor follows it.
    pub fn pan(&self, camera: &mut Camera, delta: Vec2, viewport_height: f32) {
        if !self.enable_pan || viewport_height <= 0.0 {
            return;
        }

        let forward = (camera.target - camera.eye).normalize_or_zero();
        let right = forward.cross(camera.up).normalize_or_zero();
        let up = right.cross(forward);

        let visible_height = 2.0 * camera.distance_to_target() * (camera.fov_y * 0.5).tan();
        let units_per_pixel = visible_height / viewport_height * self.pan_speed;

        let offset = (-right * delta.x + up * delta.y) * units_per_pixel;
        camera.eye += offset;
        camera.target += offset;
    }

    /// Positive `steps` (scroll up) moves towards the target.
    pub fn zoom(&self, camera: &mut Camera, steps: f32) {
        if !self.enable_zoom || steps == 0.0 {
            return;
        }

        let factor = 0.95f32.powf(steps * self.zoom_speed);
        self.apply(camera, |spherical| spherical.radius *= factor);
    }

    pub fn update(&self, camera: &mut Camera, delta_time: f32) {
        if !self.auto_rotate {
            return;
        }

        let angle = TAU / 60.0 * self.auto_rotate_speed * delta_time;
        self.apply(camera, |spherical| spherical.azimuth -= angle);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Rotate,
    Pan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Turns raw cursor events into drag gestures.
#[derive(Debug, Default)]
pub struct PointerState {
    position: Option<Vec2>,
    drag: Option<DragMode>,
}

impl PointerState {
    pub fn button(&mut self, button: PointerButton, pressed: bool) {
        let mode = match button {
            PointerButton::Primary => DragMode::Rotate,
            PointerButton::Secondary | PointerButton::Middle => DragMode::Pan,
        };

        if pressed {
            self.drag = Some(mode);
        } else if self.drag == Some(mode) {
            self.drag = None;
        }
    }

    /// Returns the active drag and the cursor delta since the previous event.
    pub fn cursor_moved(&mut self, position: Vec2) -> Option<(DragMode, Vec2)> {
        let previous = self.position.replace(position)?;
        self.drag.map(|mode| (mode, position - previous))
    }

    pub fn cancel(&mut self) {
        self.drag = None;
    }
}
