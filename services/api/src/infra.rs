use benefit_engine::config::EngineConfig;
use benefit_engine::eligibility::{
    BenefitNavigator, CachedConfigStore, ConfigStore, DirectoryConfigStore, JsonContentCatalog,
    RepositoryError, ScreeningRecord, ScreeningRepository, ScreeningService,
};
use benefit_engine::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type SharedConfigStore = Arc<dyn ConfigStore>;
pub(crate) type Navigator = BenefitNavigator<SharedConfigStore, JsonContentCatalog>;
pub(crate) type ApiScreeningService =
    ScreeningService<SharedConfigStore, JsonContentCatalog, InMemoryScreeningRepository>;

#[derive(Default, Clone)]
pub(crate) struct InMemoryScreeningRepository {
    records: Arc<Mutex<HashMap<String, ScreeningRecord>>>,
}

impl ScreeningRepository for InMemoryScreeningRepository {
    fn insert(&self, record: ScreeningRecord) -> Result<ScreeningRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.session_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.session_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, session_id: &str) -> Result<Option<ScreeningRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(session_id).cloned())
    }
}

impl InMemoryScreeningRepository {
    pub(crate) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

/// Directory store for the configured rules root, behind the snapshot cache unless disabled.
pub(crate) fn config_store(engine: &EngineConfig) -> SharedConfigStore {
    let directory =
        DirectoryConfigStore::new(&engine.rules_dir).with_fallback_code(&engine.fallback_code);
    if engine.cache_rules {
        Arc::new(CachedConfigStore::new(directory))
    } else {
        Arc::new(directory)
    }
}

pub(crate) fn build_navigator(engine: &EngineConfig) -> Result<Navigator, AppError> {
    let catalog = JsonContentCatalog::from_path(&engine.content_path)?;
    info!(
        rules_dir = %engine.rules_dir.display(),
        fallback = %engine.fallback_code,
        cache = engine.cache_rules,
        "benefit engine configured"
    );
    Ok(BenefitNavigator::new(config_store(engine), catalog))
}

pub(crate) fn build_service(
    engine: &EngineConfig,
    repository: Arc<InMemoryScreeningRepository>,
) -> Result<Arc<ApiScreeningService>, AppError> {
    let navigator = build_navigator(engine)?;
    Ok(Arc::new(ScreeningService::new(
        Arc::new(navigator),
        repository,
    )))
}

#[cfg(test)]
pub(crate) fn shipped_engine_config() -> EngineConfig {
    use std::path::PathBuf;

    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config");
    EngineConfig {
        rules_dir: root.join("states"),
        content_path: root.join("content/programs.json"),
        fallback_code: "FEDERAL".to_string(),
        cache_rules: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_rejects_duplicate_sessions() {
        let repository = Arc::new(InMemoryScreeningRepository::default());
        let service = build_service(&shipped_engine_config(), repository.clone())
            .expect("service builds from shipped config");

        let record = service
            .screen(crate::demo::example_household(), None)
            .expect("screening succeeds");
        assert_eq!(repository.len(), 1);

        let duplicate = repository.insert(record.clone());
        assert!(matches!(duplicate, Err(RepositoryError::Conflict)));
        assert_eq!(
            repository
                .fetch(&record.session_id)
                .expect("fetch succeeds")
                .map(|stored| stored.session_id),
            Some(record.session_id)
        );
    }

    #[test]
    fn uncached_store_reads_the_directory_directly() {
        let mut engine = shipped_engine_config();
        engine.cache_rules = false;
        let store = config_store(&engine);
        let config = store.load("ky").expect("kentucky loads");
        assert_eq!(config.state_name, "Kentucky");
        assert_eq!(store.fallback_code(), "FEDERAL");
    }

    #[test]
    fn missing_catalog_fails_startup() {
        let mut engine = shipped_engine_config();
        engine.content_path = engine.content_path.with_file_name("absent.json");
        assert!(build_navigator(&engine).is_err());
    }
}
