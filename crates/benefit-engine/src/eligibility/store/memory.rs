use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use super::error::ConfigStoreError;
use super::validation::validate_config;
use super::{ConfigStore, DEFAULT_FALLBACK_CODE};
use crate::eligibility::schema::StateConfig;

/// Store holding already-typed documents, keyed by their declared code.
///
/// Documents are validated on insert, so loads never return an unchecked configuration.
pub struct InMemoryConfigStore {
    configs: RwLock<HashMap<String, Arc<StateConfig>>>,
    fallback_code: String,
    loads: AtomicUsize,
}

impl Default for InMemoryConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_CODE)
    }
}

impl InMemoryConfigStore {
    pub fn new(fallback_code: impl Into<String>) -> Self {
        let fallback_code: String = fallback_code.into();
        Self {
            configs: RwLock::new(HashMap::new()),
            fallback_code: fallback_code.trim().to_ascii_uppercase(),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn insert(&self, config: StateConfig) -> Result<(), ConfigStoreError> {
        let code = config.state_code.trim().to_ascii_uppercase();
        validate_config(&config).map_err(|violations| ConfigStoreError::Invalid {
            code: code.clone(),
            violations,
        })?;
        self.configs
            .write()
            .expect("config store lock poisoned")
            .insert(code, Arc::new(config));
        Ok(())
    }

    /// Number of `load` calls served, hits and misses alike.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load(&self, code: &str) -> Result<Arc<StateConfig>, ConfigStoreError> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        let code = code.trim().to_ascii_uppercase();
        self.configs
            .read()
            .expect("config store lock poisoned")
            .get(&code)
            .cloned()
            .ok_or(ConfigStoreError::NotFound { code })
    }

    fn fallback_code(&self) -> &str {
        &self.fallback_code
    }
}
