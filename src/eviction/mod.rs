use std::panic::{AssertUnwindSafe, catch_unwind};

use log::{debug, error, info, trace};

use crate::cache::AssetCache;
use crate::manifest::Manifest;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionReport {
    pub disposed: usize,
    pub retained: usize,
}

/// The diff-based sweep run at scene-transition boundaries: per category,
/// everything the upcoming manifest does not name is removed and disposed. A
/// category absent from the manifest means nothing in it survives; names the
/// manifest keeps are left untouched, so the upcoming load pass sees them
/// already present and skips them. Persistent categories are never swept.
///
/// The sweep never suspends, so no scene can observe a half-evicted
/// category.
pub fn evict_for_upcoming(cache: &AssetCache, next_manifest: &Manifest) -> EvictionReport {
    let keep_sets = next_manifest.keep_sets();
    let mut report = EvictionReport::default();

    for key in cache.keys() {
        if key.category.is_persistent() {
            trace!("{}/{} is persistent, skipping", key.category, key.name);
            report.retained += 1;
            continue;
        }

        let keep = keep_sets
            .get(&key.category)
            .map(|names| names.contains(key.name.as_str()))
            .unwrap_or(false);
        if keep {
            trace!("{}/{} still needed, keeping", key.category, key.name);
            report.retained += 1;
            continue;
        }

        let Some(entry) = cache.remove(key.category, &key.name) else {
            continue;
        };
        debug!("Disposing {}/{}", key.category, key.name);
        // One bad resource must not block reclaiming the rest of the
        // category; a panicking disposal counts as best-effort freed.
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| entry.dispose())) {
            error!(
                "Disposal of {}/{} panicked, treating as freed: {}",
                key.category,
                key.name,
                panic_message(&panic)
            );
        }
        report.disposed += 1;
    }

    info!(
        "Eviction pass: {} disposed, {} retained",
        report.disposed, report.retained
    );
    report
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
