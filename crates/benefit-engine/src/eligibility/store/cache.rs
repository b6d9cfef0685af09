use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use super::error::ConfigStoreError;
use super::{load_or_rewrite, ConfigStore};
use crate::eligibility::schema::StateConfig;

/// Snapshot cache in front of another store.
///
/// Successful loads are kept as shared immutable snapshots until invalidated; failures are not
/// cached. Rewritten fallbacks are kept per code and display name, so a jurisdiction without its
/// own document is looked up in the inner store once. The rewrite always works on a copy, so
/// cached generic documents are never modified by a request.
pub struct CachedConfigStore<S> {
    inner: S,
    snapshots: RwLock<HashMap<String, Arc<StateConfig>>>,
    fallbacks: RwLock<HashMap<(String, String), Arc<StateConfig>>>,
}

impl<S: ConfigStore> CachedConfigStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            snapshots: RwLock::new(HashMap::new()),
            fallbacks: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop the snapshot and any rewritten fallbacks for one jurisdiction. Returns whether
    /// anything was cached.
    pub fn invalidate(&self, code: &str) -> bool {
        let key = cache_key(code);
        let snapshot = self
            .snapshots
            .write()
            .expect("config cache lock poisoned")
            .remove(&key)
            .is_some();

        let mut fallbacks = self.fallbacks.write().expect("config cache lock poisoned");
        let before = fallbacks.len();
        fallbacks.retain(|(fallback_code, _), _| *fallback_code != key);
        snapshot || fallbacks.len() != before
    }

    pub fn clear(&self) {
        self.snapshots
            .write()
            .expect("config cache lock poisoned")
            .clear();
        self.fallbacks
            .write()
            .expect("config cache lock poisoned")
            .clear();
    }

    pub fn cached_fallbacks(&self) -> usize {
        self.fallbacks
            .read()
            .expect("config cache lock poisoned")
            .len()
    }

    pub fn cached(&self) -> usize {
        self.snapshots
            .read()
            .expect("config cache lock poisoned")
            .len()
    }
}

impl<S: ConfigStore> ConfigStore for CachedConfigStore<S> {
    fn load(&self, code: &str) -> Result<Arc<StateConfig>, ConfigStoreError> {
        let key = cache_key(code);
        if let Some(snapshot) = self
            .snapshots
            .read()
            .expect("config cache lock poisoned")
            .get(&key)
        {
            return Ok(Arc::clone(snapshot));
        }

        let config = self.inner.load(code)?;
        debug!(jurisdiction = %key, "caching rule configuration snapshot");
        self.snapshots
            .write()
            .expect("config cache lock poisoned")
            .insert(key, Arc::clone(&config));
        Ok(config)
    }

    fn fallback_code(&self) -> &str {
        self.inner.fallback_code()
    }

    fn load_or_fallback(
        &self,
        code: &str,
        display_name: &str,
    ) -> Result<Arc<StateConfig>, ConfigStoreError> {
        let key = (cache_key(code), display_name.to_string());
        if let Some(rewritten) = self
            .fallbacks
            .read()
            .expect("config cache lock poisoned")
            .get(&key)
        {
            return Ok(Arc::clone(rewritten));
        }

        let config = load_or_rewrite(self, code, display_name)?;
        let own_document = self
            .snapshots
            .read()
            .expect("config cache lock poisoned")
            .contains_key(&key.0);
        if !own_document {
            debug!(jurisdiction = %key.0, "caching rewritten fallback configuration");
            self.fallbacks
                .write()
                .expect("config cache lock poisoned")
                .insert(key, Arc::clone(&config));
        }
        Ok(config)
    }
}

fn cache_key(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
