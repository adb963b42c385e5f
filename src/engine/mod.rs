use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared, join_all};
use log::{info, trace, warn};

use crate::cache::{AssetCache, CacheEntry, CacheKey};
use crate::error::{LoadError, LoadErrorKind};
use crate::eviction::{self, EvictionReport};
use crate::io::source::AssetSource;
use crate::loader;
use crate::manifest::{Category, Descriptor, Manifest};

/// Shared in-flight loads hand every awaiter the same outcome, hence the
/// `Arc`s on both sides.
pub type LoadResult = Result<Arc<CacheEntry>, Arc<LoadError>>;
type PendingLoad = Shared<BoxFuture<'static, LoadResult>>;

/// What happens to entries a failed manifest load already inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Successfully loaded entries stay cached even though the aggregate
    /// fails. This mirrors the long-observed behavior scenes rely on.
    #[default]
    KeepPartial,
    /// Remove and dispose everything this session inserted before reporting
    /// the failure.
    RollbackOnFailure,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub requested: usize,
    pub already_cached: usize,
    pub loaded: usize,
    pub elapsed: Duration,
}

/// The cache, the load coordinator and the eviction pass behind one injected
/// instance. Constructed once per application lifetime; collaborators receive
/// a reference instead of reaching for ambient global state.
pub struct AssetEngine {
    cache: Arc<AssetCache>,
    source: Arc<dyn AssetSource>,
    pending: Arc<DashMap<CacheKey, PendingLoad>>,
    generation: Arc<AtomicU64>,
}

impl AssetEngine {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self {
            cache: Arc::new(AssetCache::new()),
            source,
            pending: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    pub fn get(&self, category: Category, name: &str) -> Option<Arc<CacheEntry>> {
        self.cache.get(category, name)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Resolves every descriptor of the manifest with the default failure
    /// policy. The returned future settles only after every constituent load
    /// has settled; the first failure is what it rejects with.
    pub async fn load_manifest(&self, manifest: &Manifest) -> Result<LoadReport, Arc<LoadError>> {
        self.load_manifest_with(manifest, FailurePolicy::default()).await
    }

    pub async fn load_manifest_with(
        &self,
        manifest: &Manifest,
        policy: FailurePolicy,
    ) -> Result<LoadReport, Arc<LoadError>> {
        manifest.validate().map_err(Arc::new)?;

        let started = Instant::now();
        let requests = manifest.requests();
        let requested = requests.len();

        let mut already_cached = 0;
        let mut started_keys = Vec::new();
        let mut in_flight = Vec::new();
        for (category, descriptor) in requests {
            if self.cache.has_name(category, descriptor.name()) {
                trace!("{}/{} already cached, skipping", category, descriptor.name());
                already_cached += 1;
                continue;
            }
            started_keys.push(CacheKey::new(category, descriptor.name()));
            in_flight.push(self.pending_load(category, descriptor));
        }
        let loaded = in_flight.len();

        let results = join_all(in_flight).await;
        if let Some(error) = results.into_iter().find_map(Result::err) {
            match policy {
                FailurePolicy::KeepPartial => {
                    warn!("Manifest load failed, keeping partial results: {}", error);
                }
                FailurePolicy::RollbackOnFailure => {
                    let mut rolled_back = 0;
                    for key in &started_keys {
                        if let Some(entry) = self.cache.remove(key.category, &key.name) {
                            entry.dispose();
                            rolled_back += 1;
                        }
                    }
                    warn!(
                        "Manifest load failed, rolled {} entries back: {}",
                        rolled_back, error
                    );
                }
            }
            return Err(error);
        }

        let report = LoadReport {
            requested,
            already_cached,
            loaded,
            elapsed: started.elapsed(),
        };
        info!(
            "Manifest resolved: {} loaded, {} reused in {}ms",
            report.loaded,
            report.already_cached,
            report.elapsed.as_millis()
        );
        Ok(report)
    }

    /// Single-resource load through the same dedup machinery. This is also
    /// the path that populates the persistent player-selection categories,
    /// which no scene manifest can declare.
    pub async fn load_one(&self, category: Category, descriptor: Descriptor) -> LoadResult {
        if let Some(entry) = self.cache.get(category, descriptor.name()) {
            trace!("{}/{} already cached", category, descriptor.name());
            return Ok(entry);
        }
        self.pending_load(category, descriptor).await
    }

    /// Diff the cache against the upcoming scene's manifest and dispose
    /// everything outside it (persistent categories exempt). Also advances
    /// the generation, so loads that finish late cannot resurrect a name
    /// this pass just evicted.
    pub fn evict_for_upcoming(&self, next_manifest: &Manifest) -> EvictionReport {
        self.generation.fetch_add(1, Ordering::SeqCst);
        eviction::evict_for_upcoming(&self.cache, next_manifest)
    }

    /// Either joins the load already in flight for this key or starts one.
    /// Checking the cache alone is not enough: two requests racing before
    /// either resolves must still end in exactly one fetch.
    fn pending_load(&self, category: Category, descriptor: Descriptor) -> PendingLoad {
        let key = CacheKey::new(category, descriptor.name());
        match self.pending.entry(key.clone()) {
            Entry::Occupied(in_flight) => {
                trace!("{}/{} load in flight, joining it", category, key.name);
                in_flight.get().clone()
            }
            Entry::Vacant(slot) => {
                let load = self.spawn_load(key, descriptor);
                slot.insert(load.clone());
                load
            }
        }
    }

    fn spawn_load(&self, key: CacheKey, descriptor: Descriptor) -> PendingLoad {
        let cache = self.cache.clone();
        let source = self.source.clone();
        let pending = self.pending.clone();
        let generation = self.generation.clone();
        let started_generation = generation.load(Ordering::SeqCst);
        let category = key.category;
        let locator = descriptor.locator().to_owned();

        let task = tokio::task::spawn_blocking(move || {
            loader::load(category, &descriptor, source.as_ref())
        });

        async move {
            let outcome: LoadResult = match task.await {
                Err(join_error) => Err(Arc::new(LoadError::new(
                    category,
                    &key.name,
                    &locator,
                    LoadErrorKind::Task(join_error.to_string()),
                ))),
                Ok(Err(load_error)) => Err(Arc::new(load_error)),
                Ok(Ok(entry)) => {
                    if generation.load(Ordering::SeqCst) != started_generation {
                        warn!(
                            "{}/{} finished after a newer scene generation, discarding",
                            category, key.name
                        );
                        entry.dispose();
                        Err(Arc::new(LoadError::new(
                            category,
                            &key.name,
                            &locator,
                            LoadErrorKind::Stale,
                        )))
                    } else {
                        trace!("{}/{} resolved", category, key.name);
                        Ok(cache.put(category, &key.name, Arc::new(entry)))
                    }
                }
            };
            // The entry is published before the in-flight marker drops; a
            // request arriving between the two would otherwise miss both and
            // start a duplicate load.
            pending.remove(&key);
            outcome
        }
        .boxed()
        .shared()
    }
}
