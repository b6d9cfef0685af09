use axum::http::StatusCode;
use tracing::info;

use super::content::{ContentCatalog, ContentError};
use super::domain::{
    BenefitInteraction, EligibilityReport, EligibilityResult, EnrichedResult, HouseholdFacts,
    HouseholdSubmission,
};
use super::enrichment::{annotate_interactions, attach, build_action_plan, detect_interactions};
use super::evaluation::EligibilityEngine;
use super::intake::{validate_submission, FactField, FactValidationError};
use super::ranking::sort_results;
use super::schema::StateConfig;
use super::store::{ConfigStore, ConfigStoreError};

/// Error taxonomy of the screening pipeline.
#[derive(Debug, thiserror::Error)]
pub enum EligibilityError {
    #[error(transparent)]
    Validation(#[from] FactValidationError),
    #[error(transparent)]
    Config(#[from] ConfigStoreError),
    #[error(transparent)]
    Content(#[from] ContentError),
}

impl EligibilityError {
    /// Input and configuration problems are the caller's; missing content and I/O failures are
    /// server-side defects.
    pub fn status_code(&self) -> StatusCode {
        match self {
            EligibilityError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EligibilityError::Config(ConfigStoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            EligibilityError::Config(ConfigStoreError::Invalid { .. }) => StatusCode::BAD_REQUEST,
            EligibilityError::Config(_) | EligibilityError::Content(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Validated facts for a submission that must belong to jurisdiction `code`.
fn facts_for(
    code: &str,
    submission: &HouseholdSubmission,
) -> Result<HouseholdFacts, FactValidationError> {
    let facts = validate_submission(submission)?;
    let requested = code.trim().to_ascii_uppercase();
    if facts.state_code != requested {
        return Err(FactValidationError::InvalidFact {
            field: FactField::StateCode,
            reason: format!(
                "'{}' does not match the requested jurisdiction '{requested}'",
                facts.state_code
            ),
        });
    }
    Ok(facts)
}

/// Entry points over a config store and a content catalog.
pub struct BenefitNavigator<S, C> {
    store: S,
    catalog: C,
}

impl<S, C> BenefitNavigator<S, C>
where
    S: ConfigStore,
    C: ContentCatalog,
{
    pub fn new(store: S, catalog: C) -> Self {
        Self { store, catalog }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// One result per program of `code`'s own rule document, in document order.
    ///
    /// Facts are validated before anything is loaded, and the submission's `stateCode` must name
    /// `code`. Unlike [`BenefitNavigator::screen`], an unknown jurisdiction is an error here
    /// rather than a fallback.
    pub fn evaluate_eligibility(
        &self,
        code: &str,
        submission: &HouseholdSubmission,
    ) -> Result<Vec<EligibilityResult>, EligibilityError> {
        let facts = facts_for(code, submission)?;
        let config = self.store.load(code)?;
        Ok(EligibilityEngine::new(&config).evaluate(&facts))
    }

    /// Evaluate and rank in one call, loading the document once.
    pub fn evaluate_ranked(
        &self,
        code: &str,
        submission: &HouseholdSubmission,
    ) -> Result<Vec<EligibilityResult>, EligibilityError> {
        let facts = facts_for(code, submission)?;
        let config = self.store.load(code)?;
        let results = EligibilityEngine::new(&config).evaluate(&facts);
        Ok(sort_results(results, &config))
    }

    /// Rank `raw` and attach catalog content. Loads `code` (with fallback) when no document is
    /// supplied.
    pub fn enrich_results(
        &self,
        raw: Vec<EligibilityResult>,
        code: &str,
        config: Option<&StateConfig>,
    ) -> Result<Vec<EnrichedResult>, EligibilityError> {
        let loaded;
        let config = match config {
            Some(config) => config,
            None => {
                loaded = self.store.load_or_fallback(code, code)?;
                &*loaded
            }
        };
        let ranked = sort_results(raw, config);
        Ok(attach(ranked, &config.program_prefix(), &self.catalog)?)
    }

    pub fn get_benefit_interactions(
        &self,
        eligible_program_ids: &[String],
        has_private_insurance: bool,
        config: Option<&StateConfig>,
        code: &str,
    ) -> Result<Vec<BenefitInteraction>, EligibilityError> {
        let loaded;
        let config = match config {
            Some(config) => config,
            None => {
                loaded = self.store.load_or_fallback(code, code)?;
                &*loaded
            }
        };
        Ok(detect_interactions(
            eligible_program_ids,
            has_private_insurance,
            config,
            &self.catalog,
        ))
    }

    /// Full pipeline for one household: validate, load (falling back to the generic rules),
    /// evaluate, rank, enrich, detect interactions, and build the action plan.
    pub fn screen(
        &self,
        submission: &HouseholdSubmission,
        display_name: Option<&str>,
    ) -> Result<EligibilityReport, EligibilityError> {
        let facts = validate_submission(submission)?;
        let name = display_name.unwrap_or(&facts.state_code);
        let config = self.store.load_or_fallback(&facts.state_code, name)?;

        let raw = EligibilityEngine::new(&config).evaluate(&facts);
        let ranked = sort_results(raw, &config);
        let mut results = attach(ranked, &config.program_prefix(), &self.catalog)?;

        let eligible_ids: Vec<String> = results
            .iter()
            .filter(|entry| entry.result.eligible)
            .map(|entry| entry.program_id().to_string())
            .collect();
        let interactions = detect_interactions(
            &eligible_ids,
            facts.has_private_insurance,
            &config,
            &self.catalog,
        );
        annotate_interactions(&mut results, &interactions);
        let action_plan = build_action_plan(&results, &config);

        info!(
            jurisdiction = %config.state_code,
            coverage = ?config.coverage,
            programs = results.len(),
            eligible = eligible_ids.len(),
            interactions = interactions.len(),
            "screening complete"
        );

        Ok(EligibilityReport {
            jurisdiction_code: config.state_code.clone(),
            jurisdiction_name: config.state_name.clone(),
            coverage: config.coverage,
            results,
            interactions,
            action_plan,
            metadata: config.metadata.clone(),
        })
    }
}
