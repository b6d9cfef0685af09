use crate::eligibility::conditions::{ConditionOutcome, LeafOutcome};
use crate::eligibility::domain::HouseholdFacts;
use crate::eligibility::facts::{
    AGE_OF_DISABLED_MEMBER, HAS_DISABILITY_DIAGNOSIS, INCOME_LIMIT, MONTHLY_INCOME,
};
use crate::eligibility::schema::ProgramRule;

/// Outcome classes a program's reason templates are keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonKind {
    Categorical,
    AtLimit,
    BelowLimit,
    Eligible,
    AboveLimit,
    NoLimitConfigured,
    BelowMinimumAge,
    AboveMaximumAge,
    NoDiagnosis,
    Ineligible,
}

pub const REASON_KEYS: [&str; 10] = [
    "categorical",
    "atLimit",
    "belowLimit",
    "eligible",
    "aboveLimit",
    "noLimitConfigured",
    "belowMinimumAge",
    "aboveMaximumAge",
    "noDiagnosis",
    "ineligible",
];

impl ReasonKind {
    pub const fn key(self) -> &'static str {
        match self {
            ReasonKind::Categorical => "categorical",
            ReasonKind::AtLimit => "atLimit",
            ReasonKind::BelowLimit => "belowLimit",
            ReasonKind::Eligible => "eligible",
            ReasonKind::AboveLimit => "aboveLimit",
            ReasonKind::NoLimitConfigured => "noLimitConfigured",
            ReasonKind::BelowMinimumAge => "belowMinimumAge",
            ReasonKind::AboveMaximumAge => "aboveMaximumAge",
            ReasonKind::NoDiagnosis => "noDiagnosis",
            ReasonKind::Ineligible => "ineligible",
        }
    }
}

/// Values available to `{placeholder}` substitution.
#[derive(Debug, Clone)]
pub struct ReasonContext<'a> {
    pub program: &'a str,
    pub income: f64,
    pub household_size: u32,
    pub age: u32,
    pub limit: Option<f64>,
    pub threshold: Option<f64>,
    pub benefit: Option<&'a str>,
}

impl<'a> ReasonContext<'a> {
    pub fn new(program: &'a ProgramRule, facts: &HouseholdFacts) -> Self {
        Self {
            program: &program.name,
            income: facts.monthly_income,
            household_size: facts.household_size,
            age: facts.age_of_disabled_member,
            limit: None,
            threshold: None,
            benefit: None,
        }
    }
}

fn is_income_ceiling(leaf: &LeafOutcome) -> bool {
    leaf.fact == MONTHLY_INCOME && leaf.operator.is_upper_bound() && !leaf.negated
}

/// Income ceiling among the deciding leaves of a match that was read from a derived limit of 0.
///
/// A missing limit table means nobody qualifies by income, even a household reporting $0.
pub fn unconfigured_limit(outcome: &ConditionOutcome) -> Option<&LeafOutcome> {
    outcome.deciding_leaves().find(|leaf| {
        is_income_ceiling(leaf)
            && leaf.reference.as_deref() == Some(INCOME_LIMIT)
            && leaf.expected.as_number() == Some(0.0)
    })
}

/// Classify a matched tree.
pub fn classify_match(outcome: &ConditionOutcome) -> (ReasonKind, Option<&LeafOutcome>) {
    let income_leaf = outcome
        .deciding_leaves()
        .find(|leaf| leaf.passed && is_income_ceiling(leaf));

    match income_leaf {
        Some(leaf) => {
            let at_limit = matches!(
                (leaf.actual.as_ref().and_then(|value| value.as_number()), leaf.expected.as_number()),
                (Some(income), Some(limit)) if income == limit
            );
            let kind = if at_limit {
                ReasonKind::AtLimit
            } else {
                ReasonKind::BelowLimit
            };
            (kind, Some(leaf))
        }
        None => (ReasonKind::Eligible, None),
    }
}

/// Classify an unmatched tree by the comparison that blocked it.
pub fn classify_miss(outcome: &ConditionOutcome) -> (ReasonKind, Option<&LeafOutcome>) {
    let Some(leaf) = outcome.deciding_failure() else {
        return (ReasonKind::Ineligible, None);
    };
    if leaf.negated {
        return (ReasonKind::Ineligible, Some(leaf));
    }

    let kind = match leaf.fact.as_str() {
        MONTHLY_INCOME if leaf.operator.is_upper_bound() => match leaf.expected.as_number() {
            Some(limit) if limit > 0.0 => ReasonKind::AboveLimit,
            _ => ReasonKind::NoLimitConfigured,
        },
        AGE_OF_DISABLED_MEMBER if leaf.operator.is_lower_bound() => ReasonKind::BelowMinimumAge,
        AGE_OF_DISABLED_MEMBER if leaf.operator.is_upper_bound() => ReasonKind::AboveMaximumAge,
        HAS_DISABILITY_DIAGNOSIS => ReasonKind::NoDiagnosis,
        _ => ReasonKind::Ineligible,
    };

    (kind, Some(leaf))
}

/// Render the program's template for `kind`, or the generic wording when none is configured.
pub fn render_reason(program: &ProgramRule, kind: ReasonKind, context: &ReasonContext<'_>) -> String {
    match program.reasons.get(kind.key()) {
        Some(template) => fill_template(template, context),
        None => default_reason(kind, context),
    }
}

fn default_reason(kind: ReasonKind, context: &ReasonContext<'_>) -> String {
    match kind {
        ReasonKind::Categorical => format!(
            "Categorically eligible for {} through current {} receipt",
            context.program,
            context.benefit.unwrap_or("benefit")
        ),
        ReasonKind::NoLimitConfigured => format!(
            "No {} income limit is configured for a household of {}",
            context.program, context.household_size
        ),
        ReasonKind::AtLimit | ReasonKind::BelowLimit | ReasonKind::Eligible => {
            format!("Meets eligibility criteria for {}", context.program)
        }
        ReasonKind::AboveLimit
        | ReasonKind::BelowMinimumAge
        | ReasonKind::AboveMaximumAge
        | ReasonKind::NoDiagnosis
        | ReasonKind::Ineligible => {
            format!("Does not meet eligibility criteria for {}", context.program)
        }
    }
}

fn fill_template(template: &str, context: &ReasonContext<'_>) -> String {
    let mut rendered = template
        .replace("{program}", context.program)
        .replace("{income}", &format_currency(context.income))
        .replace("{householdSize}", &context.household_size.to_string())
        .replace("{age}", &context.age.to_string());

    if let Some(limit) = context.limit {
        rendered = rendered.replace("{limit}", &format_currency(limit));
    }
    if let Some(threshold) = context.threshold {
        rendered = rendered.replace("{threshold}", &format_number(threshold));
    }
    if let Some(benefit) = context.benefit {
        rendered = rendered.replace("{benefit}", benefit);
    }
    rendered
}

/// `$3,588` for whole amounts, `$3,588.50` otherwise.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let (sign, cents) = if cents < 0 { ("-", -cents) } else { ("", cents) };
    let dollars = cents / 100;
    let remainder = cents % 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if remainder == 0 {
        format!("{sign}${grouped}")
    } else {
        format!("{sign}${grouped}.{remainder:02}")
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
