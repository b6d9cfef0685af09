use std::sync::Arc;

use benefit_engine::eligibility::{
    BenefitNavigator, CachedConfigStore, ConfigStore, CoverageLevel, DirectoryConfigStore,
    EligibilityError, HouseholdSubmission, JsonContentCatalog,
};

const RULES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/states");
const CONTENT_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/content/programs.json");

fn navigator() -> BenefitNavigator<Arc<dyn ConfigStore>, JsonContentCatalog> {
    let store: Arc<dyn ConfigStore> =
        Arc::new(CachedConfigStore::new(DirectoryConfigStore::new(RULES_DIR)));
    let catalog = JsonContentCatalog::from_path(CONTENT_PATH).expect("shipped catalog loads");
    BenefitNavigator::new(store, catalog)
}

fn household(state_code: &str) -> HouseholdSubmission {
    HouseholdSubmission {
        state_code: Some(state_code.to_string()),
        household_size: Some(4),
        monthly_income: Some(2000.0),
        has_disability_diagnosis: Some(true),
        age_of_disabled_member: Some(8),
        has_private_insurance: Some(false),
        ..HouseholdSubmission::default()
    }
}

#[test]
fn shipped_rule_documents_are_discoverable_and_valid() {
    let store = DirectoryConfigStore::new(RULES_DIR);
    let codes = store.jurisdictions().expect("rules directory readable");
    assert_eq!(codes, vec!["FEDERAL", "KY", "TS"]);

    for code in &codes {
        let config = store.load(code).expect("shipped document validates");
        assert_eq!(&config.state_code, code);
        assert!(!config.programs.is_empty());
    }
}

#[test]
fn kentucky_screening_from_disk() {
    let report = navigator()
        .screen(&household("ky"), None)
        .expect("screening succeeds");

    assert_eq!(report.jurisdiction_code, "KY");
    assert_eq!(report.coverage, CoverageLevel::Full);
    assert_eq!(report.results.len(), 6);
    assert_eq!(report.results[0].program_id(), "ky-medicaid");
    assert_eq!(
        report.results[0].result.reasons,
        vec!["Household income of $2,000 is below the Medicaid limit of $3,588 for a household of 4"]
    );
    assert_eq!(
        report.action_plan.first().map(String::as_str),
        Some("Apply for Kentucky Medicaid and KCHIP together with one kynect application")
    );
}

#[test]
fn unconfigured_state_screens_against_federal_rules() {
    let report = navigator()
        .screen(&household("OH"), Some("Ohio"))
        .expect("fallback screening succeeds");

    assert_eq!(report.jurisdiction_name, "Ohio");
    assert_eq!(report.coverage, CoverageLevel::Partial);
    assert!(report
        .results
        .iter()
        .all(|entry| entry.program_id().starts_with("oh-")));
}

#[test]
fn strict_evaluation_rejects_unconfigured_states() {
    let err = navigator()
        .evaluate_eligibility("OH", &household("OH"))
        .expect_err("no Ohio rules");
    assert!(matches!(err, EligibilityError::Config(ref inner) if inner.is_not_found()));
}

#[test]
fn repeated_screenings_agree() {
    let navigator = navigator();
    let first = navigator.screen(&household("KY"), None).expect("first");
    let second = navigator.screen(&household("KY"), None).expect("second");
    assert_eq!(first, second);
}
