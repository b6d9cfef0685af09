mod reasons;

pub use reasons::{format_currency, ReasonKind, REASON_KEYS};

use tracing::debug;

use super::conditions::{self, LeafOutcome};
use super::domain::{ConfidenceTier, EligibilityResult, HouseholdFacts};
use super::facts::{fact_label, FactDeriver, FactSource, FactValue};
use super::schema::{FactParams, ProgramRule, StateConfig};
use reasons::{classify_match, classify_miss, render_reason, unconfigured_limit, ReasonContext};

/// Applies one jurisdiction's rule document to validated household facts.
///
/// Holds only a borrowed document; every call derives facts afresh, so an engine can be shared
/// across threads and reused for any number of households.
pub struct EligibilityEngine<'a> {
    config: &'a StateConfig,
}

impl<'a> EligibilityEngine<'a> {
    pub fn new(config: &'a StateConfig) -> Self {
        Self { config }
    }

    /// One result per configured program, in document order.
    pub fn evaluate(&self, facts: &HouseholdFacts) -> Vec<EligibilityResult> {
        let deriver = FactDeriver::new(facts, self.config);
        self.config
            .programs
            .iter()
            .map(|program| self.evaluate_program(program, &deriver))
            .collect()
    }

    fn evaluate_program(&self, program: &ProgramRule, deriver: &FactDeriver<'_>) -> EligibilityResult {
        let facts = deriver.household();
        let mut context = ReasonContext::new(program, facts);

        if let Some(fact) = categorical_match(program, deriver) {
            context.benefit = Some(fact_label(fact));
            let reason = render_reason(program, ReasonKind::Categorical, &context);
            debug!(program_id = %program.id, via = fact, "categorically eligible");
            return eligible_result(program, vec![reason]);
        }

        let outcome = conditions::evaluate(&program.conditions, deriver);
        let unconfigured = outcome.matched.then(|| unconfigured_limit(&outcome)).flatten();
        let eligible = outcome.matched && unconfigured.is_none();
        let (kind, leaf) = match unconfigured {
            Some(leaf) => (ReasonKind::NoLimitConfigured, Some(leaf)),
            None if outcome.matched => classify_match(&outcome),
            None => classify_miss(&outcome),
        };
        annotate_context(&mut context, kind, leaf);
        let reason = render_reason(program, kind, &context);

        debug!(
            program_id = %program.id,
            matched = outcome.matched,
            eligible,
            outcome = kind.key(),
            "program evaluated"
        );

        if eligible {
            eligible_result(program, vec![reason])
        } else {
            EligibilityResult {
                program_id: program.id.clone(),
                program: program.name.clone(),
                eligible: false,
                confidence: ConfidenceTier::Unlikely,
                reasons: vec![reason],
                next_steps: None,
                required_documents: None,
            }
        }
    }
}

/// First categorical fact that is set, if any. Checked before the condition tree so the
/// income comparison never runs for categorically eligible households.
fn categorical_match<'p>(program: &'p ProgramRule, deriver: &FactDeriver<'_>) -> Option<&'p str> {
    program
        .categorical
        .iter()
        .find(|fact| deriver.fact(fact, &FactParams::default()) == Some(FactValue::Bool(true)))
        .map(String::as_str)
}

fn annotate_context(context: &mut ReasonContext<'_>, kind: ReasonKind, leaf: Option<&LeafOutcome>) {
    let Some(leaf) = leaf else {
        return;
    };
    match kind {
        ReasonKind::AtLimit
        | ReasonKind::BelowLimit
        | ReasonKind::AboveLimit
        | ReasonKind::NoLimitConfigured => {
            context.limit = Some(leaf.expected.as_number().unwrap_or(0.0));
        }
        ReasonKind::BelowMinimumAge | ReasonKind::AboveMaximumAge => {
            context.threshold = leaf.expected.as_number();
        }
        _ => {}
    }
}

fn eligible_result(program: &ProgramRule, reasons: Vec<String>) -> EligibilityResult {
    EligibilityResult {
        program_id: program.id.clone(),
        program: program.name.clone(),
        eligible: true,
        confidence: program.event.params.confidence,
        reasons,
        next_steps: non_empty(&program.next_steps),
        required_documents: non_empty(&program.required_documents),
    }
}

fn non_empty(items: &[String]) -> Option<Vec<String>> {
    if items.is_empty() {
        None
    } else {
        Some(items.to_vec())
    }
}
