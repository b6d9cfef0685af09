use std::fmt;

use serde::Serialize;

use super::domain::HouseholdFacts;
use super::schema::{FactParams, StateConfig};

pub const HOUSEHOLD_SIZE: &str = "householdSize";
pub const MONTHLY_INCOME: &str = "monthlyIncome";
pub const HAS_DISABILITY_DIAGNOSIS: &str = "hasDisabilityDiagnosis";
pub const AGE_OF_DISABLED_MEMBER: &str = "ageOfDisabledMember";
pub const HAS_PRIVATE_INSURANCE: &str = "hasPrivateInsurance";
pub const INSURANCE_TYPE: &str = "insuranceType";
pub const RECEIVES_SSI: &str = "receivesSSI";
pub const RECEIVES_SSDI: &str = "receivesSSDI";
pub const INCOME_LIMIT: &str = "incomeLimit";

/// Every fact a condition may reference.
pub const KNOWN_FACTS: [&str; 9] = [
    HOUSEHOLD_SIZE,
    MONTHLY_INCOME,
    HAS_DISABILITY_DIAGNOSIS,
    AGE_OF_DISABLED_MEMBER,
    HAS_PRIVATE_INSURANCE,
    INSURANCE_TYPE,
    RECEIVES_SSI,
    RECEIVES_SSDI,
    INCOME_LIMIT,
];

/// Facts usable as categorical-eligibility switches.
pub const BOOLEAN_FACTS: [&str; 4] = [
    HAS_DISABILITY_DIAGNOSIS,
    HAS_PRIVATE_INSURANCE,
    RECEIVES_SSI,
    RECEIVES_SSDI,
];

pub fn is_known_fact(name: &str) -> bool {
    KNOWN_FACTS.contains(&name)
}

pub fn is_boolean_fact(name: &str) -> bool {
    BOOLEAN_FACTS.contains(&name)
}

/// Short label used when a fact shows up in reason text.
pub fn fact_label(name: &str) -> &str {
    match name {
        RECEIVES_SSI => "SSI",
        RECEIVES_SSDI => "SSDI",
        HAS_DISABILITY_DIAGNOSIS => "disability diagnosis",
        HAS_PRIVATE_INSURANCE => "private insurance",
        other => other,
    }
}

/// Scalar fact value as seen by the condition evaluator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FactValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl FactValue {
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(number) => number.as_f64().map(FactValue::Number),
            serde_json::Value::Bool(flag) => Some(FactValue::Bool(*flag)),
            serde_json::Value::String(text) => Some(FactValue::Text(text.clone())),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FactValue::Number(number) => Some(*number),
            _ => None,
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Number(number) => write!(f, "{number}"),
            FactValue::Bool(flag) => write!(f, "{flag}"),
            FactValue::Text(text) => f.write_str(text),
        }
    }
}

/// Anything that can answer fact lookups for the condition evaluator.
pub trait FactSource {
    fn fact(&self, name: &str, params: &FactParams) -> Option<FactValue>;
}

/// Pull-based view over primary household facts plus values derived from the rule document.
///
/// Nothing is precomputed; each lookup is answered when a condition asks for it.
pub struct FactDeriver<'a> {
    facts: &'a HouseholdFacts,
    config: &'a StateConfig,
}

impl<'a> FactDeriver<'a> {
    pub fn new(facts: &'a HouseholdFacts, config: &'a StateConfig) -> Self {
        Self { facts, config }
    }

    pub fn household(&self) -> &HouseholdFacts {
        self.facts
    }

    /// Monthly ceiling for `limit_name` at `household_size`.
    ///
    /// Sizes above the largest configured key clamp to that key. A limit name that is not
    /// configured, or a size with no entry, yields 0: nobody qualifies by income.
    pub fn income_limit(&self, limit_name: &str, household_size: u32) -> f64 {
        let Some(table) = self.config.income_limits.get(limit_name) else {
            return 0.0;
        };

        if let Some(amount) = table.get(&household_size) {
            return *amount;
        }

        match table.last_key_value() {
            Some((max_size, amount)) if household_size > *max_size => *amount,
            _ => 0.0,
        }
    }
}

impl FactSource for FactDeriver<'_> {
    fn fact(&self, name: &str, params: &FactParams) -> Option<FactValue> {
        let facts = self.facts;
        match name {
            HOUSEHOLD_SIZE => Some(FactValue::Number(f64::from(facts.household_size))),
            MONTHLY_INCOME => Some(FactValue::Number(facts.monthly_income)),
            HAS_DISABILITY_DIAGNOSIS => Some(FactValue::Bool(facts.has_disability_diagnosis)),
            AGE_OF_DISABLED_MEMBER => {
                Some(FactValue::Number(f64::from(facts.age_of_disabled_member)))
            }
            HAS_PRIVATE_INSURANCE => Some(FactValue::Bool(facts.has_private_insurance)),
            INSURANCE_TYPE => facts
                .insurance_type
                .map(|category| FactValue::Text(category.label().to_string())),
            RECEIVES_SSI => Some(FactValue::Bool(facts.receives_ssi.unwrap_or(false))),
            RECEIVES_SSDI => Some(FactValue::Bool(facts.receives_ssdi.unwrap_or(false))),
            INCOME_LIMIT => params
                .limit
                .as_deref()
                .map(|limit| FactValue::Number(self.income_limit(limit, facts.household_size))),
            _ => None,
        }
    }
}
