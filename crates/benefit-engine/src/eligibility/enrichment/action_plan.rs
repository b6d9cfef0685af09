use std::collections::HashSet;

use tracing::debug;

use crate::eligibility::domain::EnrichedResult;
use crate::eligibility::schema::StateConfig;

/// Ordered next steps across every eligible program.
pub fn build_action_plan(results: &[EnrichedResult], config: &StateConfig) -> Vec<String> {
    let eligible: Vec<&str> = results
        .iter()
        .filter(|entry| entry.result.eligible)
        .map(EnrichedResult::program_id)
        .collect();
    action_plan_for(&eligible, config)
}

/// Walks `actionPlanOrder` against a set of eligible program ids.
///
/// Rule precedence for an eligible program: the combined step when its partner is also
/// eligible, then the `ifAlsoEligibleFor` step, then the plain step. A partner covered by a
/// combined step emits nothing of its own. Grouped placeholders and programs outside the
/// eligible set emit nothing.
fn action_plan_for(eligible: &[&str], config: &StateConfig) -> Vec<String> {
    let eligible: HashSet<&str> = eligible.iter().copied().collect();
    let is_eligible = |name: &str| eligible.contains(config.resolve_program_id(name).as_str());
    let steps = || config.action_plan_order.iter().filter(|rule| !rule.grouped);

    let mut covered: HashSet<&str> = HashSet::new();
    for rule in steps() {
        if covered.contains(rule.program.as_str()) || !is_eligible(&rule.program) {
            continue;
        }
        if let (Some(partner), Some(_)) = (&rule.combined_with, &rule.combined_step) {
            if is_eligible(partner) {
                covered.insert(partner.as_str());
            }
        }
    }

    let mut plan = Vec::new();
    for rule in steps() {
        if !is_eligible(&rule.program) {
            debug!(program = %rule.program, "no action step for ineligible or unconfigured program");
            continue;
        }
        if covered.contains(rule.program.as_str()) {
            debug!(program = %rule.program, "action step covered by a combined step");
            continue;
        }

        let combined = rule
            .combined_with
            .as_deref()
            .filter(|partner| is_eligible(partner))
            .and(rule.combined_step.as_ref());
        let conditional = rule
            .if_also_eligible_for
            .as_ref()
            .filter(|conditional| is_eligible(&conditional.program))
            .map(|conditional| &conditional.step);

        if let Some(step) = combined.or(conditional).or(rule.step.as_ref()) {
            plan.push(step.clone());
        }
    }
    plan
}
