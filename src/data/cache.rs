//! Process-wide dataset cache keyed by path.
//! A path is read once; later calls share the same `Arc<Dataset>` until `clear()` is called.
//! Edits to the file after the first load are not seen until then.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing::{debug, info, warn};

use crate::data::loader::{load_dataset, LoadError};
use crate::data::record::Dataset;

static DATASETS: OnceLock<Mutex<HashMap<PathBuf, Arc<Dataset>>>> = OnceLock::new();

fn datasets() -> MutexGuard<'static, HashMap<PathBuf, Arc<Dataset>>> {
    let cache = DATASETS.get_or_init(|| Mutex::new(HashMap::new()));
    // Entries are immutable once inserted, so a poisoned map is still consistent.
    cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Cached `load_dataset`. Failures are returned but never stored, so a missing file
/// is retried on the next call.
pub fn load_cached(path: impl AsRef<Path>) -> Result<Arc<Dataset>, LoadError> {
    let path = path.as_ref();
    if let Some(hit) = datasets().get(path) {
        debug!(path = %path.display(), "dataset cache hit");
        return Ok(Arc::clone(hit));
    }

    let dataset = match load_dataset(path) {
        Ok(dataset) => Arc::new(dataset),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "dataset load failed");
            return Err(err);
        }
    };
    info!(path = %path.display(), records = dataset.len(), "dataset loaded");

    // Another caller may have filled the slot meanwhile; keep whichever landed first.
    let mut cache = datasets();
    let entry = cache
        .entry(path.to_path_buf())
        .or_insert_with(|| Arc::clone(&dataset));
    Ok(Arc::clone(entry))
}

/// Drop every cached dataset. Returns how many entries were removed.
pub fn clear() -> usize {
    let mut cache = datasets();
    let removed = cache.len();
    cache.clear();
    info!(removed, "dataset cache cleared");
    removed
}

/// Remove a single path from the cache.
pub fn evict(path: impl AsRef<Path>) -> bool {
    datasets().remove(path.as_ref()).is_some()
}
