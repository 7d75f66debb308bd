use std::{
    any::Any,
    collections::HashMap,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, OnceLock, PoisonError},
    thread,
    time::Instant,
};

use crate::asset::{AssetLoader, LoadError, LoadedAsset};

pub type LoadResult = Result<Arc<LoadedAsset>, Arc<LoadError>>;

type Slot = Arc<OnceLock<LoadResult>>;

/// Shared cache of loaded assets keyed by URL.
///
/// Every URL is loaded at most once. Failures are cached as well, so a broken
/// asset is not fetched again for the lifetime of the cache.
pub struct AssetCache {
    loader: Arc<dyn AssetLoader>,
    entries: Mutex<HashMap<String, Slot>>,
}

/// Handle to an asset that may still be loading.
#[derive(Clone)]
pub struct PendingAsset {
    url: String,
    slot: Slot,
}

impl PendingAsset {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Non-blocking. Returns `None` until the worker has finished.
    pub fn poll(&self) -> Option<&LoadResult> {
        self.slot.get()
    }
}

impl AssetCache {
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        Self {
            loader,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn preload(&self, url: &str) {
        let _ = self.request(url);
    }

    pub fn request(&self, url: &str) -> PendingAsset {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(slot) = entries.get(url) {
            return PendingAsset {
                url: url.to_string(),
                slot: slot.clone(),
            };
        }

        let slot: Slot = Arc::new(OnceLock::new());
        entries.insert(url.to_string(), slot.clone());
        drop(entries);

        self.spawn_load(url, slot.clone());

        PendingAsset {
            url: url.to_string(),
            slot,
        }
    }

    fn spawn_load(&self, url: &str, slot: Slot) {
        let loader = self.loader.clone();
        let worker_url = url.to_string();
        let worker_slot = slot.clone();

        let spawned = thread::Builder::new()
            .name(format!("asset loader ({url})"))
            .spawn(move || {
                let started = Instant::now();
                let result = panic::catch_unwind(AssertUnwindSafe(|| loader.load(&worker_url)))
                    .unwrap_or_else(|payload| Err(LoadError::Panicked(panic_message(&*payload))));

                match &result {
                    Ok(asset) => log::info!(
                        "Loaded {} ({} meshes) in {:.2?}",
                        worker_url,
                        asset.meshes.len(),
                        started.elapsed()
                    ),
                    Err(err) => log::error!("Failed to load {}: {}", worker_url, err),
                }

                let _ = worker_slot.set(result.map(Arc::new).map_err(Arc::new));
            });

        if let Err(err) = spawned {
            log::error!("Failed to spawn loader thread for {}: {}", url, err);
            let _ = slot.set(Err(Arc::new(LoadError::from(err))));
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
