use glam::{Mat4, Quat, Vec3};
use id_arena::Arena;

use crate::asset::{AssetNode, LoadedAsset};
use crate::math::bounds::Aabb;
use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::scene_model::{SceneModel, SceneModelId};
use crate::scene_graph::transform::Transform;

pub struct Scene {
    pub objects: Arena<Object3D>,
    pub models: Arena<SceneModel>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
            models: Arena::new(),
        }
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    #[cfg(test)]
    pub fn get_object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    pub fn add_model(&mut self, model: SceneModel) -> SceneModelId {
        self.models.alloc(model)
    }

    /// Instantiates an asset under `parent` and returns the id of its root.
    ///
    /// The root is a synthetic object with an identity transform that groups
    /// the asset's top-level nodes. Meshes referenced by several nodes share
    /// one scene model. Nodes pointing at a mesh that was skipped at load time
    /// are spawned without a model.
    pub fn spawn_asset(&mut self, asset: &LoadedAsset, parent: Option<ObjectId>) -> ObjectId {
        let model_ids = asset
            .meshes
            .iter()
            .map(|model| {
                model
                    .as_ref()
                    .map(|model| self.add_model(SceneModel::new(model.clone())))
            })
            .collect::<Vec<_>>();

        let root_id = self.add_object(Object3D::named(asset.url.clone()));
        if parent.is_some() {
            self.set_object_parent(root_id, parent);
        }

        for node in &asset.roots {
            self.spawn_asset_node(node, &model_ids, root_id);
        }

        root_id
    }

    fn spawn_asset_node(
        &mut self,
        node: &AssetNode,
        model_ids: &[Option<SceneModelId>],
        parent: ObjectId,
    ) -> ObjectId {
        let mut object = Object3D::named(node.name.clone());
        object
            .transform
            .set_transform(node.translation, node.rotation, node.scale);

        object.model_id = match node.mesh {
            Some(mesh) => match model_ids.get(mesh) {
                Some(model_id) => *model_id,
                None => {
                    log::warn!("Node {} references missing mesh {}", node.name, mesh);
                    None
                }
            },
            None => None,
        };

        let object_id = self.add_object(object);
        self.set_object_parent(object_id, Some(parent));

        for child in &node.children {
            self.spawn_asset_node(child, model_ids, object_id);
        }

        object_id
    }

    /// Bounds of an object and all of its descendants, in its parent's space.
    ///
    /// Each model's box is transformed corner by corner, so rotated children
    /// produce a box that may be larger than the tight one.
    pub fn compute_bounds(&self, object_id: ObjectId) -> Aabb {
        self.compute_bounds_recursive(object_id, Mat4::IDENTITY)
    }

    fn compute_bounds_recursive(&self, object_id: ObjectId, parent_matrix: Mat4) -> Aabb {
        let Some(object) = self.objects.get(object_id) else {
            return Aabb::empty();
        };

        let matrix = parent_matrix * object.transform.local_matrix();

        let own_bounds = object
            .model_id
            .and_then(|model_id| self.models.get(model_id))
            .map(|scene_model| scene_model.model.bounding_box().transform(&matrix))
            .unwrap_or_else(Aabb::empty);

        object
            .child_ids
            .iter()
            .fold(own_bounds, |bounds, &child_id| {
                bounds.union(self.compute_bounds_recursive(child_id, matrix))
            })
    }

    /// Updates all object transforms in hierarchical order
    fn update_transforms(&self) {
        let root_objects = self
            .objects
            .iter()
            .filter(|(_, object)| object.parent_id.is_none())
            .map(|(id, _)| id);

        for root_id in root_objects {
            self.update_object_transform_recursive(root_id, Mat4::IDENTITY, false);
        }
    }

    fn update_object_transform_recursive(
        &self,
        object_id: ObjectId,
        parent_world_matrix: Mat4,
        parent_changed: bool,
    ) {
        if let Some(object) = self.objects.get(object_id) {
            let changed = parent_changed || object.transform.is_world_dirty();

            if changed {
                let world_matrix = parent_world_matrix * object.transform.local_matrix();
                object.transform.set_world_matrix(world_matrix);
            }

            let world_matrix = object.transform.world_matrix();
            for &child_id in &object.child_ids {
                self.update_object_transform_recursive(child_id, world_matrix, changed);
            }
        }
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        if let Some(old_parent_id) = self.objects.get(child_id).and_then(|c| c.parent_id) {
            if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                old_parent.child_ids.retain(|&id| id != child_id);
            }
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;
            child.transform.invalidate_world();
        }

        if let Some(new_parent) = new_parent_id.and_then(|id| self.objects.get_mut(id)) {
            new_parent.child_ids.push(child_id);
        }
    }

    fn with_transform(&mut self, object_id: ObjectId, f: impl FnOnce(&mut Transform)) {
        if let Some(object) = self.objects.get_mut(object_id) {
            f(&mut object.transform);
        }
    }

    #[cfg(test)]
    pub fn set_object_translation(&mut self, object_id: ObjectId, translation: Vec3) {
        self.with_transform(object_id, |t| t.set_translation(translation));
    }

    pub fn set_object_rotation(&mut self, object_id: ObjectId, rotation: Quat) {
        self.with_transform(object_id, |t| t.set_rotation(rotation));
    }

    pub fn set_object_transform(
        &mut self,
        object_id: ObjectId,
        translation: Vec3,
        rotation: Quat,
        scale: Vec3,
    ) {
        self.with_transform(object_id, |t| t.set_transform(translation, rotation, scale));
    }

    pub fn get_object_transform(&self, object_id: ObjectId) -> Option<&Transform> {
        self.objects.get(object_id).map(|object| &object.transform)
    }

    pub fn late_update(&mut self) {
        self.update_transforms();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::{Model, ModelPrimitive, Vertex};

    fn cube_model(half_extent: f32) -> Arc<Model> {
        let vertices = [-half_extent, half_extent]
            .into_iter()
            .flat_map(|x| {
                [-half_extent, half_extent].into_iter().flat_map(move |y| {
                    [-half_extent, half_extent].into_iter().map(move |z| Vertex {
                        position: Vec3::new(x, y, z),
                        normal: Vec3::Y,
                        color: [1.0; 4],
                    })
                })
            })
            .collect();

        Arc::new(Model {
            name: "Cube".into(),
            primitives: vec![ModelPrimitive::new(0, vertices, Vec::new())],
        })
    }

    fn asset(roots: Vec<AssetNode>) -> LoadedAsset {
        LoadedAsset {
            url: "/test.glb".into(),
            meshes: vec![Some(cube_model(1.0)), None],
            roots,
        }
    }

    #[test]
    fn spawn_asset_builds_hierarchy_under_root() {
        let mut scene = Scene::new();
        let asset = asset(vec![AssetNode::new("Body")
            .with_mesh(0)
            .with_child(AssetNode::new("Wheel").with_mesh(0))]);

        let root = scene.spawn_asset(&asset, None);

        let body = scene.get_object_by_name("Body").unwrap();
        let wheel = scene.get_object_by_name("Wheel").unwrap();
        assert_eq!(scene.get_object(root).unwrap().child_ids, vec![body]);
        assert_eq!(scene.get_object(wheel).unwrap().parent_id, Some(body));
        assert_eq!(scene.models.len(), 1);
        assert_eq!(
            scene.get_object(body).unwrap().model_id,
            scene.get_object(wheel).unwrap().model_id
        );
    }

    #[test]
    fn missing_mesh_reference_is_ignored() {
        let mut scene = Scene::new();
        scene.spawn_asset(&asset(vec![AssetNode::new("Ghost").with_mesh(7)]), None);

        let ghost = scene.get_object_by_name("Ghost").unwrap();
        assert!(scene.get_object(ghost).unwrap().model_id.is_none());
    }

    #[test]
    fn node_with_skipped_mesh_has_no_model() {
        let mut scene = Scene::new();
        scene.spawn_asset(
            &asset(vec![
                AssetNode::new("Outline").with_mesh(1),
                AssetNode::new("Body").with_mesh(0),
            ]),
            None,
        );

        let outline = scene.get_object_by_name("Outline").unwrap();
        let body = scene.get_object_by_name("Body").unwrap();
        assert!(scene.get_object(outline).unwrap().model_id.is_none());
        assert!(scene.get_object(body).unwrap().model_id.is_some());
        assert_eq!(scene.models.len(), 1);
    }

    #[test]
    fn bounds_follow_non_uniform_node_scale() {
        let mut scene = Scene::new();
        let asset = asset(vec![AssetNode::new("Pillar").with_mesh(0).with_transform(
            Vec3::ZERO,
            Quat::IDENTITY,
            Vec3::new(1.0, 10.0, 0.5),
        )]);

        let root = scene.spawn_asset(&asset, None);
        let bounds = scene.compute_bounds(root);

        assert!(bounds.size().abs_diff_eq(Vec3::new(2.0, 20.0, 1.0), 1e-5));
    }

    #[test]
    fn bounds_include_node_transforms() {
        let mut scene = Scene::new();
        let asset = asset(vec![
            AssetNode::new("Left")
                .with_mesh(0)
                .with_transform(Vec3::new(-4.0, 0.0, 0.0), Quat::IDENTITY, Vec3::ONE),
            AssetNode::new("Right")
                .with_mesh(0)
                .with_transform(Vec3::new(4.0, 1.0, 0.0), Quat::IDENTITY, Vec3::splat(2.0)),
        ]);

        let root = scene.spawn_asset(&asset, None);
        let bounds = scene.compute_bounds(root);

        assert!(bounds.min.abs_diff_eq(Vec3::new(-5.0, -1.0, -2.0), 1e-6));
        assert!(bounds.max.abs_diff_eq(Vec3::new(6.0, 3.0, 2.0), 1e-6));
    }

    #[test]
    fn bounds_of_object_without_geometry_are_empty() {
        let mut scene = Scene::new();
        let empty = scene.add_object(Object3D::named("Empty"));

        assert!(scene.compute_bounds(empty).is_empty());
    }

    #[test]
    fn late_update_propagates_parent_changes() {
        let mut scene = Scene::new();
        let parent = scene.add_object(Object3D::named("Parent"));
        let child = scene.add_object(Object3D::named("Child"));
        scene.set_object_parent(child, Some(parent));
        scene.set_object_translation(child, Vec3::X);
        scene.late_update();

        scene.set_object_translation(parent, Vec3::new(0.0, 2.0, 0.0));
        scene.late_update();

        let world = scene.get_object_transform(child).unwrap().world_matrix();
        assert!(world
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-6));
    }

    #[test]
    fn reparenting_moves_child_between_lists() {
        let mut scene = Scene::new();
        let a = scene.add_object(Object3D::named("A"));
        let b = scene.add_object(Object3D::named("B"));
        let child = scene.add_object(Object3D::named("Child"));

        scene.set_object_parent(child, Some(a));
        scene.set_object_parent(child, Some(b));

        assert!(scene.get_object(a).unwrap().child_ids.is_empty());
        assert_eq!(scene.get_object(b).unwrap().child_ids, vec![child]);
    }
}
