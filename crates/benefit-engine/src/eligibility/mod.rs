//! Benefit eligibility screening.
//!
//! A screening validates household facts, loads the jurisdiction's rule document (or the generic
//! one, rewritten for the jurisdiction), evaluates every program, ranks the results, and enriches
//! them with catalog content, interaction notes, and an ordered action plan.

pub mod conditions;
pub mod content;
pub mod domain;
pub mod enrichment;
pub mod evaluation;
pub mod facts;
pub mod intake;
pub mod navigator;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod schema;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use content::{ContentCatalog, ContentError, JsonContentCatalog, ProgramContent};
pub use domain::{
    BenefitInteraction, ConfidenceTier, EligibilityReport, EligibilityResult, EnrichedResult,
    HouseholdFacts, HouseholdSubmission, InsuranceCategory,
};
pub use enrichment::{attach, build_action_plan, detect_interactions};
pub use evaluation::EligibilityEngine;
pub use intake::{validate_submission, FactField, FactValidationError};
pub use navigator::{BenefitNavigator, EligibilityError};
pub use ranking::sort_results;
pub use repository::{RepositoryError, ScreeningRecord, ScreeningRepository};
pub use router::eligibility_router;
pub use schema::{CoverageLevel, StateConfig};
pub use service::{ScreeningService, ScreeningServiceError};
pub use store::{
    CachedConfigStore, ConfigStore, ConfigStoreError, DirectoryConfigStore, InMemoryConfigStore,
    SchemaViolation,
};
