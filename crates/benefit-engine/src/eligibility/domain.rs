use serde::{Deserialize, Serialize};

use super::content::ProgramContent;
use super::schema::{ConfigMetadata, CoverageLevel};

/// Household facts as submitted by a caller, before the mandatory fields are checked.
///
/// Every field is optional at this stage so a missing fact surfaces as a named validation error
/// instead of a deserialization failure or a silent default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdSubmission {
    #[serde(default)]
    pub state_code: Option<String>,
    #[serde(default)]
    pub household_size: Option<i64>,
    #[serde(default)]
    pub monthly_income: Option<f64>,
    #[serde(default)]
    pub has_disability_diagnosis: Option<bool>,
    #[serde(default)]
    pub age_of_disabled_member: Option<i64>,
    #[serde(default)]
    pub has_private_insurance: Option<bool>,
    #[serde(default)]
    pub insurance_type: Option<InsuranceCategory>,
    #[serde(default, rename = "receivesSSI")]
    pub receives_ssi: Option<bool>,
    #[serde(default, rename = "receivesSSDI")]
    pub receives_ssdi: Option<bool>,
}

/// Validated household facts. Immutable for the duration of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdFacts {
    pub state_code: String,
    pub household_size: u32,
    pub monthly_income: f64,
    pub has_disability_diagnosis: bool,
    pub age_of_disabled_member: u32,
    pub has_private_insurance: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_type: Option<InsuranceCategory>,
    #[serde(default, rename = "receivesSSI", skip_serializing_if = "Option::is_none")]
    pub receives_ssi: Option<bool>,
    #[serde(default, rename = "receivesSSDI", skip_serializing_if = "Option::is_none")]
    pub receives_ssdi: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsuranceCategory {
    Employer,
    Marketplace,
    None,
}

impl InsuranceCategory {
    pub const fn label(self) -> &'static str {
        match self {
            InsuranceCategory::Employer => "employer",
            InsuranceCategory::Marketplace => "marketplace",
            InsuranceCategory::None => "none",
        }
    }
}

/// Estimated strength of an eligibility determination. Not a legal finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Likely,
    Possible,
    Unlikely,
}

impl ConfidenceTier {
    /// Sort position: likely (1) before possible (2) before unlikely (3).
    pub const fn rank(self) -> u8 {
        match self {
            ConfidenceTier::Likely => 1,
            ConfidenceTier::Possible => 2,
            ConfidenceTier::Unlikely => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ConfidenceTier::Likely => "likely",
            ConfidenceTier::Possible => "possible",
            ConfidenceTier::Unlikely => "unlikely",
        }
    }
}

/// Per-program outcome of one evaluation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    pub program_id: String,
    pub program: String,
    pub eligible: bool,
    pub confidence: ConfidenceTier,
    pub reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_documents: Option<Vec<String>>,
}

/// Ranked result carrying program content and interaction notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedResult {
    #[serde(flatten)]
    pub result: EligibilityResult,
    pub content: ProgramContent,
    /// 1-based position among all evaluated programs.
    pub rank: usize,
    pub interactions: Vec<String>,
}

impl EnrichedResult {
    pub fn program_id(&self) -> &str {
        &self.result.program_id
    }
}

/// Documented relationship between programs that are all eligible at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitInteraction {
    pub programs: Vec<String>,
    pub description: String,
    pub recommendation: String,
}

/// Final output of the evaluate, rank, and enrich pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityReport {
    pub jurisdiction_code: String,
    pub jurisdiction_name: String,
    pub coverage: CoverageLevel,
    pub results: Vec<EnrichedResult>,
    pub interactions: Vec<BenefitInteraction>,
    pub action_plan: Vec<String>,
    pub metadata: ConfigMetadata,
}

impl EligibilityReport {
    pub fn eligible_programs(&self) -> impl Iterator<Item = &EnrichedResult> {
        self.results.iter().filter(|entry| entry.result.eligible)
    }
}
