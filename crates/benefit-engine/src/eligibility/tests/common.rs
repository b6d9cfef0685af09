use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::eligibility::content::JsonContentCatalog;
use crate::eligibility::domain::{
    ConfidenceTier, EligibilityResult, EnrichedResult, HouseholdSubmission,
};
use crate::eligibility::navigator::BenefitNavigator;
use crate::eligibility::repository::{RepositoryError, ScreeningRecord, ScreeningRepository};
use crate::eligibility::schema::StateConfig;
use crate::eligibility::service::ScreeningService;
use crate::eligibility::store::validation::parse_document;
use crate::eligibility::store::InMemoryConfigStore;

const KENTUCKY_DOCUMENT: &str = include_str!("../../../../../config/states/kentucky/config.json");
const FEDERAL_DOCUMENT: &str = include_str!("../../../../../config/states/federal/config.json");
const TEST_STATE_DOCUMENT: &str =
    include_str!("../../../../../config/states/test-state/config.json");
const CONTENT_CATALOG: &str = include_str!("../../../../../config/content/programs.json");

pub(crate) fn kentucky_document() -> Value {
    serde_json::from_str(KENTUCKY_DOCUMENT).expect("kentucky document is JSON")
}

pub(crate) fn federal_document() -> Value {
    serde_json::from_str(FEDERAL_DOCUMENT).expect("federal document is JSON")
}

pub(crate) fn kentucky_config() -> StateConfig {
    parse_document(kentucky_document()).expect("kentucky document is valid")
}

pub(crate) fn federal_config() -> StateConfig {
    parse_document(federal_document()).expect("federal document is valid")
}

pub(crate) fn test_state_config() -> StateConfig {
    let document = serde_json::from_str(TEST_STATE_DOCUMENT).expect("test-state document is JSON");
    parse_document(document).expect("test-state document is valid")
}

pub(crate) fn catalog() -> JsonContentCatalog {
    JsonContentCatalog::new(serde_json::from_str(CONTENT_CATALOG).expect("catalog is valid"))
}

pub(crate) fn store() -> InMemoryConfigStore {
    let store = InMemoryConfigStore::default();
    store.insert(kentucky_config()).expect("kentucky is valid");
    store.insert(federal_config()).expect("federal is valid");
    store.insert(test_state_config()).expect("test state is valid");
    store
}

pub(crate) type TestNavigator = BenefitNavigator<InMemoryConfigStore, JsonContentCatalog>;

pub(crate) fn navigator() -> TestNavigator {
    BenefitNavigator::new(store(), catalog())
}

/// Size-4 Kentucky household with a disabled 8-year-old, $2,000 a month, no private insurance.
pub(crate) fn household() -> HouseholdSubmission {
    HouseholdSubmission {
        state_code: Some("KY".to_string()),
        household_size: Some(4),
        monthly_income: Some(2000.0),
        has_disability_diagnosis: Some(true),
        age_of_disabled_member: Some(8),
        has_private_insurance: Some(false),
        ..HouseholdSubmission::default()
    }
}

pub(crate) fn result(program_id: &str, confidence: ConfidenceTier) -> EligibilityResult {
    EligibilityResult {
        program_id: program_id.to_string(),
        program: program_id.to_string(),
        eligible: confidence != ConfidenceTier::Unlikely,
        confidence,
        reasons: Vec::new(),
        next_steps: None,
        required_documents: None,
    }
}

pub(crate) fn enriched(program_id: &str, eligible: bool) -> EnrichedResult {
    let tier = if eligible {
        ConfidenceTier::Likely
    } else {
        ConfidenceTier::Unlikely
    };
    EnrichedResult {
        result: result(program_id, tier),
        content: Default::default(),
        rank: 0,
        interactions: Vec::new(),
    }
}

pub(crate) fn find<'a>(results: &'a [EligibilityResult], program_id: &str) -> &'a EligibilityResult {
    results
        .iter()
        .find(|result| result.program_id == program_id)
        .unwrap_or_else(|| panic!("no result for {program_id}"))
}

#[derive(Default)]
pub(crate) struct MemoryRepository {
    records: Mutex<HashMap<String, ScreeningRecord>>,
}

impl MemoryRepository {
    pub(crate) fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl ScreeningRepository for MemoryRepository {
    fn insert(&self, record: ScreeningRecord) -> Result<ScreeningRecord, RepositoryError> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&record.session_id) {
            return Err(RepositoryError::Conflict);
        }
        records.insert(record.session_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, session_id: &str) -> Result<Option<ScreeningRecord>, RepositoryError> {
        Ok(self.records.lock().unwrap().get(session_id).cloned())
    }
}

pub(crate) struct ConflictRepository;

impl ScreeningRepository for ConflictRepository {
    fn insert(&self, _record: ScreeningRecord) -> Result<ScreeningRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _session_id: &str) -> Result<Option<ScreeningRecord>, RepositoryError> {
        Ok(None)
    }
}

pub(crate) struct UnavailableRepository;

impl ScreeningRepository for UnavailableRepository {
    fn insert(&self, _record: ScreeningRecord) -> Result<ScreeningRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance".to_string()))
    }

    fn fetch(&self, _session_id: &str) -> Result<Option<ScreeningRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("maintenance".to_string()))
    }
}

pub(crate) type TestService<R> = ScreeningService<InMemoryConfigStore, JsonContentCatalog, R>;

pub(crate) fn service_with<R: ScreeningRepository + 'static>(repository: Arc<R>) -> Arc<TestService<R>> {
    Arc::new(ScreeningService::new(Arc::new(navigator()), repository))
}

pub(crate) fn build_service() -> (Arc<TestService<MemoryRepository>>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    (service_with(Arc::clone(&repository)), repository)
}

pub(crate) async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}

pub(crate) async fn assert_status_with_error(response: Response, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    let body = read_json(response).await;
    assert!(body.get("error").is_some(), "missing error field: {body}");
    body
}
