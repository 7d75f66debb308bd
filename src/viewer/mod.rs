//! The model viewer: camera, lights, the normalized model and the loading overlay.

pub mod loading;
pub mod normalize;
pub mod overlay;

use std::time::Duration;

use glam::Vec2;

use crate::{
    asset::{AssetCache, PendingAsset},
    camera::Camera,
    config::ViewerConfig,
    lighting::Lighting,
    orbit_controls::{DragMode, OrbitControls, PointerButton, PointerState},
    scene_graph::Scene,
    viewer::{
        loading::LoadingIndicator,
        normalize::{AutoRotate, ModelNode},
    },
};

pub struct ViewerState {
    pub config: ViewerConfig,
    pub camera: Camera,
    pub controls: OrbitControls,
    pub lighting: Lighting,
    pub scene: Scene,
    pub model: ModelNode,
    pub loading: LoadingIndicator,
    auto_rotate: AutoRotate,
    pending: Option<PendingAsset>,
    pointer: PointerState,
    viewport: Vec2,
}

impl ViewerState {
    pub fn new(config: ViewerConfig, cache: &AssetCache) -> Self {
        let mut scene = Scene::new();
        let model = ModelNode::new(&mut scene);

        // The model spins itself, orbiting stays under user control only.
        let controls = OrbitControls {
            auto_rotate: false,
            ..Default::default()
        };

        log::info!("Requesting model {}", config.model_url);
        let pending = cache.request(&config.model_url);

        Self {
            camera: Camera::looking_at_origin(config.camera_position),
            controls,
            lighting: Lighting::new(config.environment),
            scene,
            model,
            loading: LoadingIndicator::new(),
            auto_rotate: AutoRotate::new(config.auto_rotate, config.rotation_speed),
            pending: Some(pending),
            pointer: PointerState::default(),
            viewport: Vec2::new(config.window_size.0 as f32, config.window_size.1 as f32),
            config,
        }
    }

    pub fn update(&mut self, delta_time: Duration) {
        self.poll_model();

        if self.model.root().is_some() {
            self.auto_rotate.advance(delta_time.as_secs_f64());
            self.model.update(&mut self.scene, &self.auto_rotate);
        }

        self.controls
            .update(&mut self.camera, delta_time.as_secs_f32());
    }

    fn poll_model(&mut self) {
        let Some(pending) = &self.pending else {
            return;
        };
        let Some(result) = pending.poll().cloned() else {
            return;
        };
        let url = pending.url().to_string();
        self.pending = None;

        match result {
            Ok(asset) => {
                let root = self.scene.spawn_asset(&asset, None);
                let normalization =
                    self.model
                        .attach(&mut self.scene, root, self.config.max_dimension);

                log::info!(
                    "Showing {} at scale {:.3}",
                    asset.url,
                    normalization.scale
                );
                self.loading.finish();
            }
            Err(err) => {
                log::error!("Model {} could not be shown: {}", url, err);
                self.loading.fail(err.to_string());
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width as f32, height as f32);
    }

    /// Input is swallowed while the overlay covers the view.
    fn accepts_input(&mut self) -> bool {
        if self.loading.is_visible() {
            self.pointer.cancel();
            return false;
        }

        true
    }

    pub fn pointer_button(&mut self, button: PointerButton, pressed: bool) {
        if self.accepts_input() || !pressed {
            self.pointer.button(button, pressed);
        }
    }

    pub fn cursor_moved(&mut self, position: Vec2) {
        let Some((mode, delta)) = self.pointer.cursor_moved(position) else {
            return;
        };

        if !self.accepts_input() {
            return;
        }

        match mode {
            DragMode::Rotate => self.controls.rotate(&mut self.camera, delta, self.viewport.y),
            DragMode::Pan => self.controls.pan(&mut self.camera, delta, self.viewport.y),
        }
    }

    pub fn scroll(&mut self, steps: f32) {
        if self.accepts_input() {
            self.controls.zoom(&mut self.camera, steps);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use glam::{Quat, Vec3};

    use super::*;
    use crate::{
        asset::{AssetLoader, AssetNode, LoadError, LoadedAsset},
        math::bounds::Aabb,
        model::{Model, ModelPrimitive, Vertex},
        scene_graph::transform::Transform,
        viewer::loading::LoadingState,
    };

    struct FakeLoader;

    impl AssetLoader for FakeLoader {
        fn load(&self, url: &str) -> Result<LoadedAsset, LoadError> {
            if url.contains("missing") {
                return Err(LoadError::NoScene(url.to_string()));
            }

            let vertices = Aabb::new(Vec3::new(2.0, 2.0, 2.0), Vec3::new(12.0, 6.0, 4.0))
                .corners()
                .map(|position| Vertex {
                    position,
                    normal: Vec3::Y,
                    color: [1.0; 4],
                })
                .to_vec();

            Ok(LoadedAsset {
                url: url.to_string(),
                meshes: vec![Some(Arc::new(Model {
                    name: "Crate".into(),
                    primitives: vec![ModelPrimitive::new(0, vertices, Vec::new())],
                }))],
                roots: vec![AssetNode::new("Crate").with_mesh(0)],
            })
        }
    }

    const FRAME: Duration = Duration::from_millis(16);

    fn viewer_with(config: ViewerConfig) -> ViewerState {
        let cache = AssetCache::new(Arc::new(FakeLoader));
        ViewerState::new(config, &cache)
    }

    fn viewer(url: &str) -> ViewerState {
        viewer_with(ViewerConfig {
            model_url: url.to_string(),
            ..Default::default()
        })
    }

    fn still_viewer() -> ViewerState {
        viewer_with(ViewerConfig {
            model_url: "/crate.glb".to_string(),
            auto_rotate: false,
            ..Default::default()
        })
    }

    fn run_until_settled(viewer: &mut ViewerState) {
        for _ in 0..5000 {
            viewer.update(FRAME);
            viewer.scene.late_update();
            if viewer.loading.state() != &LoadingState::Loading {
                return;
            }
            thread::sleep(Duration::from_millis(1));
        }
        panic!("model never finished loading");
    }

    fn root_transform(viewer: &ViewerState) -> Transform {
        let root = viewer.model.root().expect("model attached");
        viewer.scene.get_object_transform(root).unwrap().clone()
    }

    #[test]
    fn overlay_hides_once_model_loads() {
        let mut viewer = viewer("/crate.glb");
        assert!(viewer.loading.is_visible());

        run_until_settled(&mut viewer);
        assert!(!viewer.loading.is_visible());

        for _ in 0..10 {
            viewer.update(FRAME);
            assert!(!viewer.loading.is_visible());
        }
    }

    #[test]
    fn loaded_model_is_normalized() {
        let mut viewer = viewer("/crate.glb");
        run_until_settled(&mut viewer);

        let normalization = viewer.model.normalization().unwrap();
        assert!((normalization.scale - 0.2).abs() < 1e-6);

        let bounds = viewer.scene.compute_bounds(viewer.model.root().unwrap());
        assert!(bounds.center().abs_diff_eq(Vec3::ZERO, 1e-5));
        assert!((bounds.max_dimension() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn model_spins_at_half_a_radian_per_second() {
        let mut viewer = viewer("/crate.glb");
        run_until_settled(&mut viewer);

        let pivot_rotation = |viewer: &ViewerState| {
            viewer
                .scene
                .get_object_transform(viewer.model.pivot)
                .unwrap()
                .rotation()
        };
        let before = pivot_rotation(&viewer);

        viewer.update(Duration::from_secs(2));
        let after = pivot_rotation(&viewer);

        let turned = (before.inverse() * after).to_euler(glam::EulerRot::YXZ).0;
        assert!((turned - 1.0).abs() < 1e-4);
    }

    #[test]
    fn disabled_auto_rotate_keeps_model_still() {
        let mut viewer = still_viewer();
        run_until_settled(&mut viewer);
        viewer.update(Duration::from_secs(3));

        let rotation = viewer
            .scene
            .get_object_transform(viewer.model.pivot)
            .unwrap()
            .rotation();
        assert!(rotation.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn orbit_input_moves_camera_not_model() {
        let mut viewer = still_viewer();
        run_until_settled(&mut viewer);

        let model_before = root_transform(&viewer);
        let camera_before = viewer.camera.clone();

        viewer.pointer_button(PointerButton::Primary, true);
        viewer.cursor_moved(Vec2::new(100.0, 100.0));
        viewer.cursor_moved(Vec2::new(160.0, 130.0));
        viewer.pointer_button(PointerButton::Primary, false);
        viewer.pointer_button(PointerButton::Secondary, true);
        viewer.cursor_moved(Vec2::new(200.0, 100.0));
        viewer.pointer_button(PointerButton::Secondary, false);
        viewer.scroll(3.0);

        assert_ne!(viewer.camera, camera_before);
        assert_eq!(root_transform(&viewer), model_before);
    }

    #[test]
    fn input_is_ignored_while_loading() {
        // Completion is only observed in `update`, so the overlay is still up here.
        let mut viewer = viewer("/crate.glb");
        let camera_before = viewer.camera.clone();

        viewer.pointer_button(PointerButton::Primary, true);
        viewer.cursor_moved(Vec2::new(0.0, 0.0));
        viewer.cursor_moved(Vec2::new(300.0, 0.0));
        viewer.scroll(5.0);

        assert!(viewer.loading.is_visible());
        assert_eq!(viewer.camera, camera_before);
    }

    #[test]
    fn failed_load_shows_error() {
        let mut viewer = viewer("/missing.glb");
        run_until_settled(&mut viewer);

        assert!(viewer.loading.is_visible());
        assert!(matches!(viewer.loading.state(), LoadingState::Failed(_)));
        assert!(viewer.model.root().is_none());
    }
}
