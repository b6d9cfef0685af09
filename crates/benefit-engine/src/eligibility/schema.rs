//! Typed form of a jurisdiction rule document.
//!
//! Documents are JSON with camelCase keys. Condition trees use the `all` / `any` / `not`
//! combinators over fact comparisons, and a comparison's right-hand side is either a literal or a
//! reference to a derived fact such as `{"fact": "incomeLimit", "params": {"limit": "medicaid"}}`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::ConfidenceTier;

/// Priority assigned to programs that do not configure one; sorts last within a tier.
pub const DEFAULT_PRIORITY: u32 = 999;

/// Generic program treated as base health coverage when a document does not name one.
pub const DEFAULT_BASE_COVERAGE_PROGRAM: &str = "medicaid";

/// Household size (1..N) to monthly dollar ceiling.
pub type IncomeLimitTable = BTreeMap<u32, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateConfig {
    pub state_code: String,
    pub state_name: String,
    #[serde(default)]
    pub coverage: CoverageLevel,
    #[serde(default = "default_base_coverage_program")]
    pub base_coverage_program: String,
    pub programs: Vec<ProgramRule>,
    #[serde(deserialize_with = "deserialize_income_limits")]
    pub income_limits: BTreeMap<String, IncomeLimitTable>,
    pub benefit_interactions: Vec<InteractionRule>,
    pub action_plan_order: Vec<ActionPlanRule>,
    pub metadata: ConfigMetadata,
}

fn default_base_coverage_program() -> String {
    DEFAULT_BASE_COVERAGE_PROGRAM.to_string()
}

/// JSON object keys are strings; household sizes are parsed here so a bad key names itself.
pub(crate) fn deserialize_income_limits<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, IncomeLimitTable>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = BTreeMap::<String, BTreeMap<String, f64>>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(name, table)| {
            let parsed = table
                .into_iter()
                .map(|(size, amount)| {
                    size.trim()
                        .parse::<u32>()
                        .map(|size| (size, amount))
                        .map_err(|_| {
                            serde::de::Error::custom(format!(
                                "household size key '{size}' in income limit '{name}' must be a positive integer"
                            ))
                        })
                })
                .collect::<Result<IncomeLimitTable, D::Error>>()?;
            Ok((name, parsed))
        })
        .collect()
}

impl StateConfig {
    /// Lowercase jurisdiction code every program id starts with.
    pub fn program_prefix(&self) -> String {
        self.state_code.trim().to_ascii_lowercase()
    }

    /// Resolve a generic program name (`medicaid`) to this jurisdiction's id (`ky-medicaid`).
    pub fn resolve_program_id(&self, generic_name: &str) -> String {
        format!("{}-{}", self.program_prefix(), generic_name)
    }

    pub fn program(&self, program_id: &str) -> Option<&ProgramRule> {
        self.programs.iter().find(|program| program.id == program_id)
    }

    pub fn priority_of(&self, program_id: &str) -> u32 {
        self.program(program_id)
            .and_then(|program| program.priority)
            .unwrap_or(DEFAULT_PRIORITY)
    }

    pub fn base_coverage_program_id(&self) -> String {
        self.resolve_program_id(&self.base_coverage_program)
    }
}

/// Whether the rules were written for this jurisdiction or borrowed from the generic document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageLevel {
    #[default]
    Full,
    Partial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramRule {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    /// Boolean facts that grant the program outright, skipping the condition tree.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categorical: Vec<String>,
    pub conditions: Condition,
    pub event: ProgramEvent,
    /// Reason templates keyed by outcome (`belowLimit`, `atLimit`, `aboveLimit`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub reasons: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_documents: Vec<String>,
}

/// Payload emitted when a program's conditions match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub params: EventParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventParams {
    pub confidence: ConfidenceTier,
}

/// Boolean combination of fact comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    All { all: Vec<Condition> },
    Any { any: Vec<Condition> },
    Not { not: Box<Condition> },
    Fact(FactCondition),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCondition {
    pub fact: String,
    pub operator: Operator,
    pub value: ConditionValue,
    #[serde(default, skip_serializing_if = "FactParams::is_empty")]
    pub params: FactParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equal,
    NotEqual,
    LessThan,
    LessThanInclusive,
    GreaterThan,
    GreaterThanInclusive,
    In,
    NotIn,
}

impl Operator {
    pub const fn label(self) -> &'static str {
        match self {
            Operator::Equal => "equal",
            Operator::NotEqual => "notEqual",
            Operator::LessThan => "lessThan",
            Operator::LessThanInclusive => "lessThanInclusive",
            Operator::GreaterThan => "greaterThan",
            Operator::GreaterThanInclusive => "greaterThanInclusive",
            Operator::In => "in",
            Operator::NotIn => "notIn",
        }
    }

    pub const fn is_upper_bound(self) -> bool {
        matches!(self, Operator::LessThan | Operator::LessThanInclusive)
    }

    pub const fn is_lower_bound(self) -> bool {
        matches!(self, Operator::GreaterThan | Operator::GreaterThanInclusive)
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Fact(FactReference),
    Literal(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactReference {
    pub fact: String,
    #[serde(default, skip_serializing_if = "FactParams::is_empty")]
    pub params: FactParams,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactParams {
    /// Income-limit table name for the `incomeLimit` fact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

impl FactParams {
    pub fn is_empty(&self) -> bool {
        self.limit.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRule {
    /// Generic program names; all must be eligible for the rule to fire.
    pub programs: Vec<String>,
    #[serde(default)]
    pub requires_private_insurance: bool,
    pub description: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlanRule {
    pub program: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_with: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_step: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_also_eligible_for: Option<ConditionalStep>,
    /// Grouping marker only; never emits a step of its own.
    #[serde(default)]
    pub grouped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalStep {
    pub program: String,
    pub step: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMetadata {
    pub last_updated: String,
    pub source: String,
    pub effective_date: String,
}

impl ConfigMetadata {
    pub fn last_updated_date(&self) -> Option<NaiveDate> {
        parse_metadata_date(&self.last_updated)
    }

    pub fn effective_date(&self) -> Option<NaiveDate> {
        parse_metadata_date(&self.effective_date)
    }
}

pub(crate) fn parse_metadata_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
