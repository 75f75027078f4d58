//! Per-document cache of installed font handles.
//!
//! A font embedded into one document is only valid in that document, so
//! keys carry the document id. Drop a document's entries with
//! [`FontCache::invalidate_document`] once it is closed.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::FontConfig;
use crate::engine::{DocumentId, FontHandle, FontId};
use crate::store::LruStore;

/// What a cached handle was installed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FontKey {
    /// An external font file
    Path(PathBuf),
    /// A font program already embedded in the document
    Embedded(FontId),
    /// A built-in font by standard name
    Builtin(String),
}

/// Thread-safe font handle cache keyed by `(document, font)`.
#[derive(Debug)]
pub struct FontCache {
    store: Mutex<LruStore<(DocumentId, FontKey), FontHandle>>,
}

impl FontCache {
    /// Create a cache from the font settings.
    pub fn new(config: &FontConfig) -> Self {
        let mut store = LruStore::new(config.cache_capacity);
        if let Some(secs) = config.cache_ttl_secs {
            store = store.with_ttl(Duration::from_secs(secs));
        }
        Self {
            store: Mutex::new(store),
        }
    }

    /// Cached handle for `key` in document `doc`.
    pub fn get(&self, doc: DocumentId, key: &FontKey) -> Option<FontHandle> {
        let mut store = self.store.lock().ok()?;
        store.get(&(doc, key.clone()))
    }

    /// Remember a handle.
    pub fn insert(&self, doc: DocumentId, key: FontKey, handle: FontHandle) {
        if let Ok(mut store) = self.store.lock() {
            store.insert((doc, key), handle);
        }
    }

    /// Return the cached handle or install one with `load`.
    pub fn get_or_try_insert<E>(
        &self,
        doc: DocumentId,
        key: FontKey,
        load: impl FnOnce() -> Result<FontHandle, E>,
    ) -> Result<FontHandle, E> {
        if let Some(handle) = self.get(doc, &key) {
            log::trace!("font cache hit {:?}", key);
            return Ok(handle);
        }
        let handle = load()?;
        self.insert(doc, key, handle);
        Ok(handle)
    }

    /// Forget every handle of document `doc`.
    pub fn invalidate_document(&self, doc: DocumentId) -> usize {
        match self.store.lock() {
            Ok(mut store) => store.remove_where(|(d, _)| *d == doc),
            Err(_) => 0,
        }
    }

    /// Number of cached handles.
    pub fn len(&self) -> usize {
        self.store.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
