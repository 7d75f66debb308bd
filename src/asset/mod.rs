//! Asset loading by URL.
//!
//! The viewer never talks to the glTF importer directly. It asks an
//! [`AssetCache`] for a URL and polls the returned [`PendingAsset`] once per
//! frame. The cache runs the injected [`AssetLoader`] on a worker thread.

mod cache;
mod loader;

use std::{path::PathBuf, sync::Arc};

use glam::{Quat, Vec3};

pub use cache::{AssetCache, LoadResult, PendingAsset};
pub use loader::GltfLoader;

use crate::model::Model;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("failed to import {}: {source}", .path.display())]
    Import {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("{0} contains no scenes")]
    NoScene(String),

    #[error("{0} contains no renderable meshes")]
    EmptyAsset(String),

    #[error("invalid mesh {mesh}: {reason}")]
    InvalidMesh { mesh: String, reason: String },

    #[error("failed to start loader thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("loader crashed: {0}")]
    Panicked(String),
}

/// Turns a URL into a GPU-free scene description.
pub trait AssetLoader: Send + Sync {
    fn load(&self, url: &str) -> Result<LoadedAsset, LoadError>;
}

/// A node of a loaded asset's hierarchy. `mesh` indexes into [`LoadedAsset::meshes`].
/// The scale may be non-uniform.
#[derive(Debug, Clone)]
pub struct AssetNode {
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub mesh: Option<usize>,
    pub children: Vec<AssetNode>,
}

impl AssetNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            mesh: None,
            children: Vec::new(),
        }
    }

    pub fn with_mesh(mut self, mesh: usize) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_transform(mut self, translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        self.translation = translation;
        self.rotation = rotation;
        self.scale = scale;
        self
    }

    pub fn with_child(mut self, child: AssetNode) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub url: String,
    /// One slot per mesh of the source document. Meshes with nothing drawable
    /// are `None` so node mesh indices stay valid.
    pub meshes: Vec<Option<Arc<Model>>>,
    pub roots: Vec<AssetNode>,
}
