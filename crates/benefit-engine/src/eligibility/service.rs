use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::content::ContentCatalog;
use super::domain::{BenefitInteraction, EligibilityResult, HouseholdSubmission};
use super::navigator::{BenefitNavigator, EligibilityError};
use super::repository::{RepositoryError, ScreeningRecord, ScreeningRepository};
use super::store::ConfigStore;

/// Service composing the navigator with a session repository.
pub struct ScreeningService<S, C, R> {
    navigator: Arc<BenefitNavigator<S, C>>,
    repository: Arc<R>,
}

static SCREENING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> String {
    let id = SCREENING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("screening-{id:06}")
}

impl<S, C, R> ScreeningService<S, C, R>
where
    S: ConfigStore + 'static,
    C: ContentCatalog + 'static,
    R: ScreeningRepository + 'static,
{
    pub fn new(navigator: Arc<BenefitNavigator<S, C>>, repository: Arc<R>) -> Self {
        Self {
            navigator,
            repository,
        }
    }

    pub fn navigator(&self) -> &BenefitNavigator<S, C> {
        &self.navigator
    }

    /// Run the full pipeline and store the report under a fresh session id.
    pub fn screen(
        &self,
        submission: HouseholdSubmission,
        display_name: Option<&str>,
    ) -> Result<ScreeningRecord, ScreeningServiceError> {
        let report = self.navigator.screen(&submission, display_name)?;
        let record = ScreeningRecord {
            session_id: next_session_id(),
            report,
            created_at: Utc::now(),
        };

        let stored = self.repository.insert(record)?;
        info!(
            session_id = %stored.session_id,
            jurisdiction = %stored.report.jurisdiction_code,
            eligible = stored.eligible_count(),
            "screening stored"
        );
        Ok(stored)
    }

    pub fn get(&self, session_id: &str) -> Result<ScreeningRecord, ScreeningServiceError> {
        let record = self
            .repository
            .fetch(session_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Ranked results for the submission's own jurisdiction, without enrichment.
    pub fn evaluate(
        &self,
        submission: &HouseholdSubmission,
    ) -> Result<Vec<EligibilityResult>, ScreeningServiceError> {
        let code = submission.state_code.clone().unwrap_or_default();
        Ok(self.navigator.evaluate_ranked(&code, submission)?)
    }

    pub fn interactions(
        &self,
        code: &str,
        eligible_program_ids: &[String],
        has_private_insurance: bool,
    ) -> Result<Vec<BenefitInteraction>, ScreeningServiceError> {
        Ok(self.navigator.get_benefit_interactions(
            eligible_program_ids,
            has_private_insurance,
            None,
            code,
        )?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScreeningServiceError {
    #[error(transparent)]
    Eligibility(#[from] EligibilityError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
