//! Turning ranked results into the caller-facing view: catalog content, interaction notes, and
//! the cross-program action plan.

mod action_plan;
mod interactions;

pub use action_plan::build_action_plan;
pub use interactions::detect_interactions;

use super::content::{ContentCatalog, ContentError};
use super::domain::{BenefitInteraction, EligibilityResult, EnrichedResult};

/// Attach catalog content and a 1-based rank to already sorted results.
///
/// `prefix` is the jurisdiction's program-id prefix, used for generic content fallback.
/// Fails on the first program with no content record; no result is ever dropped.
pub fn attach<C: ContentCatalog + ?Sized>(
    ranked: Vec<EligibilityResult>,
    prefix: &str,
    catalog: &C,
) -> Result<Vec<EnrichedResult>, ContentError> {
    ranked
        .into_iter()
        .enumerate()
        .map(|(index, result)| {
            let content = catalog.lookup(&result.program_id, prefix)?;
            Ok(EnrichedResult {
                result,
                content,
                rank: index + 1,
                interactions: Vec::new(),
            })
        })
        .collect()
}

/// Record on each result the descriptions of fired interactions that involve it.
pub fn annotate_interactions(results: &mut [EnrichedResult], interactions: &[BenefitInteraction]) {
    for entry in results.iter_mut() {
        let notes = interactions
            .iter()
            .filter(|interaction| {
                interaction
                    .programs
                    .iter()
                    .any(|program_id| program_id == entry.program_id())
            })
            .map(|interaction| interaction.description.clone())
            .collect();
        entry.interactions = notes;
    }
}
