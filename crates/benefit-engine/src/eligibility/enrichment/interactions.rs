use std::collections::HashSet;

use tracing::debug;

use crate::eligibility::content::ContentCatalog;
use crate::eligibility::domain::BenefitInteraction;
use crate::eligibility::schema::{InteractionRule, StateConfig};

/// Interaction rules that fire for this eligible set, in document order.
///
/// A rule fires when every program it names resolves to an id in `eligible_program_ids` and,
/// for insurance-conditional rules, the household has private insurance. Insurance-conditional
/// rules describe themselves with the base coverage program's coordination text when the
/// catalog has one.
pub fn detect_interactions<C: ContentCatalog + ?Sized>(
    eligible_program_ids: &[String],
    has_private_insurance: bool,
    config: &StateConfig,
    catalog: &C,
) -> Vec<BenefitInteraction> {
    let eligible: HashSet<&str> = eligible_program_ids.iter().map(String::as_str).collect();

    config
        .benefit_interactions
        .iter()
        .filter_map(|rule| {
            if rule.requires_private_insurance && !has_private_insurance {
                return None;
            }

            let programs: Vec<String> = rule
                .programs
                .iter()
                .map(|name| config.resolve_program_id(name))
                .collect();
            let fires = !programs.is_empty()
                && programs
                    .iter()
                    .all(|program_id| eligible.contains(program_id.as_str()));
            if !fires {
                return None;
            }

            debug!(programs = ?programs, "benefit interaction applies");
            Some(BenefitInteraction {
                description: describe(rule, config, catalog),
                recommendation: rule.recommendation.clone(),
                programs,
            })
        })
        .collect()
}

fn describe<C: ContentCatalog + ?Sized>(
    rule: &InteractionRule,
    config: &StateConfig,
    catalog: &C,
) -> String {
    if !rule.requires_private_insurance {
        return rule.description.clone();
    }

    catalog
        .find(&config.base_coverage_program_id(), &config.program_prefix())
        .and_then(|content| content.insurance_coordination.clone())
        .unwrap_or_else(|| rule.description.clone())
}
