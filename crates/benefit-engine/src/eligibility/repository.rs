use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::EligibilityReport;

/// A completed screening as handed to the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningRecord {
    pub session_id: String,
    pub report: EligibilityReport,
    pub created_at: DateTime<Utc>,
}

impl ScreeningRecord {
    pub fn eligible_count(&self) -> usize {
        self.report.eligible_programs().count()
    }
}

/// Storage abstraction for screening sessions. The engine never persists anything itself;
/// implementations live with the service that owns the data.
pub trait ScreeningRepository: Send + Sync {
    fn insert(&self, record: ScreeningRecord) -> Result<ScreeningRecord, RepositoryError>;
    fn fetch(&self, session_id: &str) -> Result<Option<ScreeningRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
