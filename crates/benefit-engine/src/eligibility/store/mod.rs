//! Loading jurisdiction rule documents.
//!
//! `ConfigStore` is the cache boundary: callers see the same contract whether documents are read
//! from disk on every call or served from a snapshot cache.

mod cache;
mod directory;
mod error;
mod fallback;
mod memory;
pub mod validation;

use std::sync::Arc;

use tracing::info;

use super::schema::StateConfig;

pub use cache::CachedConfigStore;
pub use directory::DirectoryConfigStore;
pub use error::{ConfigStoreError, SchemaViolation};
pub use fallback::rewrite_for_jurisdiction;
pub use memory::InMemoryConfigStore;

/// Jurisdiction code of the generic document used when a jurisdiction has none of its own.
pub const DEFAULT_FALLBACK_CODE: &str = "FEDERAL";

pub trait ConfigStore: Send + Sync {
    /// Load and validate the document whose declared `stateCode` matches `code`.
    fn load(&self, code: &str) -> Result<Arc<StateConfig>, ConfigStoreError>;

    /// Code of the generic document used by [`ConfigStore::load_or_fallback`].
    fn fallback_code(&self) -> &str;

    /// Load `code`, or rewrite the generic document for it when none exists.
    ///
    /// The rewritten document carries the requested code and name, jurisdiction-prefixed
    /// program ids, and partial coverage. The generic snapshot itself is never modified.
    fn load_or_fallback(
        &self,
        code: &str,
        display_name: &str,
    ) -> Result<Arc<StateConfig>, ConfigStoreError> {
        load_or_rewrite(self, code, display_name)
    }
}

fn load_or_rewrite<S: ConfigStore + ?Sized>(
    store: &S,
    code: &str,
    display_name: &str,
) -> Result<Arc<StateConfig>, ConfigStoreError> {
    match store.load(code) {
        Err(err) if err.is_not_found() => {
            let generic = store.load(store.fallback_code())?;
            info!(
                jurisdiction = code,
                fallback = store.fallback_code(),
                "no jurisdiction rules found; using generic rules"
            );
            Ok(Arc::new(rewrite_for_jurisdiction(
                &generic,
                code,
                display_name,
            )))
        }
        other => other,
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for Arc<T> {
    fn load(&self, code: &str) -> Result<Arc<StateConfig>, ConfigStoreError> {
        (**self).load(code)
    }

    fn fallback_code(&self) -> &str {
        (**self).fallback_code()
    }

    fn load_or_fallback(
        &self,
        code: &str,
        display_name: &str,
    ) -> Result<Arc<StateConfig>, ConfigStoreError> {
        (**self).load_or_fallback(code, display_name)
    }
}
