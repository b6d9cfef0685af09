use std::fmt;

use serde::Serialize;

use super::domain::{HouseholdFacts, HouseholdSubmission};

/// The six facts every evaluation requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FactField {
    StateCode,
    HouseholdSize,
    MonthlyIncome,
    HasDisabilityDiagnosis,
    AgeOfDisabledMember,
    HasPrivateInsurance,
}

impl FactField {
    pub const fn name(self) -> &'static str {
        match self {
            FactField::StateCode => "stateCode",
            FactField::HouseholdSize => "householdSize",
            FactField::MonthlyIncome => "monthlyIncome",
            FactField::HasDisabilityDiagnosis => "hasDisabilityDiagnosis",
            FactField::AgeOfDisabledMember => "ageOfDisabledMember",
            FactField::HasPrivateInsurance => "hasPrivateInsurance",
        }
    }
}

impl fmt::Display for FactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Input validation errors raised before any rule runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FactValidationError {
    #[error("missing required household facts: {}", join_fields(.fields))]
    MissingFacts { fields: Vec<FactField> },
    #[error("invalid value for {field}: {reason}")]
    InvalidFact { field: FactField, reason: String },
}

impl FactValidationError {
    pub fn fields(&self) -> Vec<FactField> {
        match self {
            FactValidationError::MissingFacts { fields } => fields.clone(),
            FactValidationError::InvalidFact { field, .. } => vec![*field],
        }
    }
}

fn join_fields(fields: &[FactField]) -> String {
    fields
        .iter()
        .map(|field| field.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convert a submission into validated facts, naming every missing mandatory field.
pub fn validate_submission(
    submission: &HouseholdSubmission,
) -> Result<HouseholdFacts, FactValidationError> {
    let state_code = submission
        .state_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty());

    let mut missing = Vec::new();
    if state_code.is_none() {
        missing.push(FactField::StateCode);
    }
    if submission.household_size.is_none() {
        missing.push(FactField::HouseholdSize);
    }
    if submission.monthly_income.is_none() {
        missing.push(FactField::MonthlyIncome);
    }
    if submission.has_disability_diagnosis.is_none() {
        missing.push(FactField::HasDisabilityDiagnosis);
    }
    if submission.age_of_disabled_member.is_none() {
        missing.push(FactField::AgeOfDisabledMember);
    }
    if submission.has_private_insurance.is_none() {
        missing.push(FactField::HasPrivateInsurance);
    }

    let (
        Some(state_code),
        Some(household_size),
        Some(monthly_income),
        Some(has_disability_diagnosis),
        Some(age),
        Some(has_private_insurance),
    ) = (
        state_code,
        submission.household_size,
        submission.monthly_income,
        submission.has_disability_diagnosis,
        submission.age_of_disabled_member,
        submission.has_private_insurance,
    )
    else {
        return Err(FactValidationError::MissingFacts { fields: missing });
    };

    let household_size = u32::try_from(household_size)
        .ok()
        .filter(|size| *size > 0)
        .ok_or_else(|| FactValidationError::InvalidFact {
            field: FactField::HouseholdSize,
            reason: format!("must be a positive integer (found {household_size})"),
        })?;

    if !monthly_income.is_finite() || monthly_income < 0.0 {
        return Err(FactValidationError::InvalidFact {
            field: FactField::MonthlyIncome,
            reason: format!("must be a non-negative amount (found {monthly_income})"),
        });
    }

    let age_of_disabled_member =
        u32::try_from(age).map_err(|_| FactValidationError::InvalidFact {
            field: FactField::AgeOfDisabledMember,
            reason: format!("must be a non-negative integer (found {age})"),
        })?;

    Ok(HouseholdFacts {
        state_code: state_code.to_ascii_uppercase(),
        household_size,
        monthly_income,
        has_disability_diagnosis,
        age_of_disabled_member,
        has_private_insurance,
        insurance_type: submission.insurance_type,
        receives_ssi: submission.receives_ssi,
        receives_ssdi: submission.receives_ssdi,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> HouseholdSubmission {
        HouseholdSubmission {
            state_code: Some("ky".to_string()),
            household_size: Some(4),
            monthly_income: Some(2000.0),
            has_disability_diagnosis: Some(true),
            age_of_disabled_member: Some(8),
            has_private_insurance: Some(false),
            ..HouseholdSubmission::default()
        }
    }

    #[test]
    fn complete_submission_normalizes_state_code() {
        let facts = validate_submission(&complete()).expect("valid facts");
        assert_eq!(facts.state_code, "KY");
        assert_eq!(facts.household_size, 4);
        assert_eq!(facts.receives_ssi, None);
    }

    #[test]
    fn every_missing_fact_is_named() {
        let mut submission = complete();
        submission.monthly_income = None;
        submission.has_private_insurance = None;

        let err = validate_submission(&submission).expect_err("missing facts");
        assert_eq!(
            err,
            FactValidationError::MissingFacts {
                fields: vec![FactField::MonthlyIncome, FactField::HasPrivateInsurance],
            }
        );
        assert_eq!(
            err.to_string(),
            "missing required household facts: monthlyIncome, hasPrivateInsurance"
        );
    }

    #[test]
    fn blank_state_code_counts_as_missing() {
        let mut submission = complete();
        submission.state_code = Some("  ".to_string());
        let err = validate_submission(&submission).expect_err("missing state");
        assert_eq!(err.fields(), vec![FactField::StateCode]);
    }

    #[test]
    fn zero_household_size_is_invalid() {
        let mut submission = complete();
        submission.household_size = Some(0);
        let err = validate_submission(&submission).expect_err("invalid size");
        assert!(matches!(
            err,
            FactValidationError::InvalidFact {
                field: FactField::HouseholdSize,
                ..
            }
        ));
    }

    #[test]
    fn negative_income_is_invalid() {
        let mut submission = complete();
        submission.monthly_income = Some(-1.0);
        let err = validate_submission(&submission).expect_err("invalid income");
        assert_eq!(err.fields(), vec![FactField::MonthlyIncome]);
    }
}
