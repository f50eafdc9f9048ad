use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::instance::ScriptInstance;

/// Shared handle to one registered instance. The mutex serializes the tick
/// loop's `execute` against retirement of the same slot from the watcher.
pub type ScriptSlot = Arc<Mutex<ScriptInstance>>;

/// The authoritative path-to-instance map: at most one live instance per
/// canonical path. Cloned handles all point at the same map, which is how the
/// watcher thread and the tick loop share it. The registry applies no policy
/// of its own; it is a concurrent map with swap, delete and copy-on-iterate
/// semantics.
#[derive(Clone, Default)]
pub struct ScriptRegistry {
    entries: Arc<RwLock<BTreeMap<PathBuf, ScriptSlot>>>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically installs the instance for `path`. Any previous instance is
    /// retired by the swap; nothing further is called on it.
    pub fn upsert(&self, path: PathBuf, instance: ScriptInstance) {
        self.entries.write().insert(path, Arc::new(Mutex::new(instance)));
    }

    /// Atomically deletes the entry if present; returns whether it existed.
    pub fn remove(&self, path: &Path) -> bool {
        self.entries.write().remove(path).is_some()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.read().contains_key(path)
    }

    pub fn get(&self, path: &Path) -> Option<ScriptSlot> {
        self.entries.read().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.read().keys().cloned().collect()
    }

    /// Point-in-time copy of the entries, ordered by path. Iterating the
    /// snapshot holds no lock, so a tick in progress never blocks an upsert
    /// and never observes a half-applied swap.
    pub fn snapshot(&self) -> Vec<(PathBuf, ScriptSlot)> {
        self.entries.read().iter().map(|(path, slot)| (path.clone(), slot.clone())).collect()
    }
}
