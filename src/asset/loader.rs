use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use glam::{Quat, Vec3};
use rayon::prelude::*;

use crate::{
    asset::{AssetLoader, AssetNode, LoadError, LoadedAsset},
    model::Model,
};

/// Loads `.gltf` and `.glb` files from disk.
pub struct GltfLoader {
    asset_root: PathBuf,
}

impl GltfLoader {
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
        }
    }

    /// `/foo.glb` is served from the asset root, like a web server's public
    /// directory. `file://` URLs and relative paths are plain filesystem paths.
    pub fn resolve(&self, url: &str) -> Result<PathBuf, LoadError> {
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }

        if let Some((scheme, _)) = url.split_once("://") {
            return Err(LoadError::UnsupportedScheme(scheme.to_string()));
        }

        match url.strip_prefix('/') {
            Some(relative) => Ok(self.asset_root.join(relative)),
            None => Ok(PathBuf::from(url)),
        }
    }
}

impl AssetLoader for GltfLoader {
    fn load(&self, url: &str) -> Result<LoadedAsset, LoadError> {
        let path = self.resolve(url)?;
        log::debug!("Importing {} from {}", url, path.display());

        let (document, buffers, _images) =
            gltf::import(&path).map_err(|source| LoadError::Import {
                path: path.clone(),
                source,
            })?;

        let meshes = document.meshes().collect::<Vec<_>>();
        let meshes = meshes
            .par_iter()
            .map(|mesh| -> Result<Option<Arc<Model>>, LoadError> {
                let name = mesh
                    .name()
                    .map(String::from)
                    .unwrap_or_else(|| format!("{} (Mesh {})", file_name(&path), mesh.index()));

                let model = Model::from_gltf(name.clone(), mesh, &buffers).map_err(|err| {
                    LoadError::InvalidMesh {
                        mesh: name.clone(),
                        reason: format!("{err:#}"),
                    }
                })?;

                if model.primitives.is_empty() {
                    log::warn!("Mesh {} has no triangles, skipping it", name);
                    return Ok(None);
                }

                Ok(Some(Arc::new(model)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if meshes.iter().all(Option::is_none) {
            return Err(LoadError::EmptyAsset(url.to_string()));
        }

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| LoadError::NoScene(url.to_string()))?;

        let roots = scene.nodes().map(|node| convert_node(&node)).collect();

        Ok(LoadedAsset {
            url: url.to_string(),
            meshes,
            roots,
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn convert_node(node: &gltf::Node) -> AssetNode {
    let (translation, rotation, scale) = node.transform().decomposed();

    let mut asset_node = AssetNode::new(node.name().unwrap_or("Unnamed")).with_transform(
        Vec3::from(translation),
        Quat::from_array(rotation),
        Vec3::from(scale),
    );

    if let Some(mesh) = node.mesh() {
        asset_node = asset_node.with_mesh(mesh.index());
    }

    node.children().fold(asset_node, |asset_node, child| {
        asset_node.with_child(convert_node(&child))
    })
}
