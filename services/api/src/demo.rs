use crate::infra::{build_service, InMemoryScreeningRepository};
use benefit_engine::config::AppConfig;
use benefit_engine::eligibility::{EligibilityReport, HouseholdSubmission, ScreeningRecord};
use benefit_engine::error::AppError;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Jurisdiction for the example household (defaults to KY).
    #[arg(long)]
    pub(crate) state: Option<String>,
    /// Display name used when the jurisdiction falls back to the generic rules.
    #[arg(long)]
    pub(crate) state_name: Option<String>,
    /// Mark the example household as covered by private insurance.
    #[arg(long)]
    pub(crate) private_insurance: bool,
}

/// Size-4 household with a disabled 8-year-old earning $2,000 a month.
pub(crate) fn example_household() -> HouseholdSubmission {
    HouseholdSubmission {
        state_code: Some("KY".to_string()),
        household_size: Some(4),
        monthly_income: Some(2000.0),
        has_disability_diagnosis: Some(true),
        age_of_disabled_member: Some(8),
        has_private_insurance: Some(false),
        ..HouseholdSubmission::default()
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let repository = Arc::new(InMemoryScreeningRepository::default());
    let service = build_service(&config.engine, repository)?;

    let mut household = example_household();
    if let Some(state) = args.state {
        household.state_code = Some(state);
    }
    household.has_private_insurance = Some(args.private_insurance);

    println!("Benefit screening demo");
    let record = match service.screen(household, args.state_name.as_deref()) {
        Ok(record) => record,
        Err(err) => {
            println!("  Screening rejected: {err}");
            return Ok(());
        }
    };

    render_record(&record);
    Ok(())
}

pub(crate) fn render_record(record: &ScreeningRecord) {
    let report = &record.report;
    println!(
        "Session {} | {} ({}) | {:?} coverage | rules updated {}",
        record.session_id,
        report.jurisdiction_name,
        report.jurisdiction_code,
        report.coverage,
        report.metadata.last_updated
    );
    render_results(report);

    if report.interactions.is_empty() {
        println!("\nBenefit interactions: none");
    } else {
        println!("\nBenefit interactions");
        for interaction in &report.interactions {
            println!("- [{}] {}", interaction.programs.join(" + "), interaction.description);
            println!("  Recommendation: {}", interaction.recommendation);
        }
    }

    if report.action_plan.is_empty() {
        println!("\nAction plan: nothing to apply for");
    } else {
        println!("\nAction plan");
        for (index, step) in report.action_plan.iter().enumerate() {
            println!("{}. {}", index + 1, step);
        }
    }
}

fn render_results(report: &EligibilityReport) {
    println!("\nPrograms by likelihood");
    for entry in &report.results {
        let result = &entry.result;
        println!(
            "{}. {} [{}] {}",
            entry.rank,
            entry.content.name,
            result.confidence.label(),
            if result.eligible { "eligible" } else { "not eligible" }
        );
        for reason in &result.reasons {
            println!("   - {reason}");
        }
        if let Some(waitlist) = &entry.content.waitlist {
            println!("   Waitlist: {waitlist}");
        }
    }
}
