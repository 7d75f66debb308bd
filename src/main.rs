use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

mod asset;
mod camera;
mod config;
mod engine;
mod lighting;
mod math;
mod model;
mod orbit_controls;
mod rendering;
mod scene_graph;
mod viewer;
mod window;

use crate::{
    asset::{AssetCache, AssetLoader, GltfLoader},
    config::{Args, ViewerConfig},
};

/// Builds the shared cache and starts loading the configured model before
/// the window exists, so the first frame doesn't wait on disk.
fn create_cache(config: &ViewerConfig, loader: Arc<dyn AssetLoader>) -> Arc<AssetCache> {
    let cache = Arc::new(AssetCache::new(loader));
    cache.preload(&config.model_url);
    cache
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = ViewerConfig::from(Args::parse());
    let cache = create_cache(
        &config,
        Arc::new(GltfLoader::new(config.asset_root.clone())),
    );

    pollster::block_on(window::run(config, cache))?;

    Ok(())
}
