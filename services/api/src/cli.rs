use crate::demo::{render_record, run_demo, DemoArgs};
use crate::infra::{build_service, config_store, InMemoryScreeningRepository};
use crate::server;
use benefit_engine::config::AppConfig;
use benefit_engine::eligibility::{ConfigStore, DirectoryConfigStore, HouseholdSubmission};
use benefit_engine::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "Benefit Eligibility Navigator",
    about = "Screen households against per-jurisdiction benefit rules from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Screen one household described by a JSON facts file and print the report
    Screen(ScreenArgs),
    /// Load and validate jurisdiction rule documents
    Validate(ValidateArgs),
    /// Screen the Kentucky example household end-to-end and print a summary
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct ScreenArgs {
    /// Jurisdiction code; overrides any stateCode in the facts file
    #[arg(long)]
    pub(crate) state: Option<String>,
    /// Display name used when the jurisdiction falls back to the generic rules
    #[arg(long)]
    pub(crate) state_name: Option<String>,
    /// Household facts as a JSON object (camelCase keys)
    #[arg(long)]
    pub(crate) facts: PathBuf,
    /// Print a readable summary instead of the JSON record
    #[arg(long)]
    pub(crate) summary: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ValidateArgs {
    /// Jurisdiction code to validate; every document under the rules root when omitted
    #[arg(long)]
    pub(crate) state: Option<String>,
    /// Validate a single document by path instead of discovering it
    #[arg(long, conflicts_with = "state")]
    pub(crate) file: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Screen(args) => run_screen(args),
        Command::Validate(args) => run_validate(args),
        Command::Demo(args) => run_demo(args),
    }
}

pub(crate) fn read_submission(
    path: &Path,
    state: Option<String>,
) -> Result<HouseholdSubmission, AppError> {
    let raw = fs::read_to_string(path)?;
    let mut submission: HouseholdSubmission = serde_json::from_str(&raw).map_err(io::Error::from)?;
    if state.is_some() {
        submission.state_code = state;
    }
    Ok(submission)
}

fn run_screen(args: ScreenArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let submission = read_submission(&args.facts, args.state)?;
    let service = build_service(
        &config.engine,
        Arc::new(InMemoryScreeningRepository::default()),
    )?;

    let record = service.screen(submission, args.state_name.as_deref())?;

    if args.summary {
        render_record(&record);
    } else {
        let json = serde_json::to_string_pretty(&record).map_err(io::Error::from)?;
        println!("{json}");
    }
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    if let Some(path) = args.file {
        let document = DirectoryConfigStore::load_file(&path)?;
        println!(
            "{} ({}): {} programs, effective {}",
            document.state_name,
            document.state_code,
            document.programs.len(),
            document.metadata.effective_date
        );
        return Ok(());
    }

    let config = AppConfig::load()?;
    let directory = DirectoryConfigStore::new(&config.engine.rules_dir);
    let codes = match args.state {
        Some(code) => vec![code.trim().to_ascii_uppercase()],
        None => directory.jurisdictions()?,
    };

    let store = config_store(&config.engine);
    for code in codes {
        let document = store.load(&code)?;
        println!(
            "{} ({}): {} programs, {} interaction rules, {} action-plan rules, updated {}",
            document.state_name,
            document.state_code,
            document.programs.len(),
            document.benefit_interactions.len(),
            document.action_plan_order.len(),
            document.metadata.last_updated
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facts_file_state_can_be_overridden() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("household.json");
        fs::write(
            &path,
            r#"{ "stateCode": "KY", "householdSize": 3, "monthlyIncome": 1500,
                 "hasDisabilityDiagnosis": true, "ageOfDisabledMember": 2,
                 "hasPrivateInsurance": false, "receivesSSI": true }"#,
        )
        .expect("write facts");

        let submission = read_submission(&path, Some("OH".to_string())).expect("facts parse");
        assert_eq!(submission.state_code.as_deref(), Some("OH"));
        assert_eq!(submission.household_size, Some(3));
        assert_eq!(submission.receives_ssi, Some(true));

        let unchanged = read_submission(&path, None).expect("facts parse");
        assert_eq!(unchanged.state_code.as_deref(), Some("KY"));
    }

    #[test]
    fn malformed_facts_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("household.json");
        fs::write(&path, "{ not json").expect("write facts");
        assert!(matches!(read_submission(&path, None), Err(AppError::Io(_))));
    }

    #[test]
    fn cli_parses_screen_arguments() {
        let cli = Cli::try_parse_from([
            "benefit-engine-api",
            "screen",
            "--state",
            "ky",
            "--facts",
            "household.json",
        ])
        .expect("arguments parse");
        match cli.command {
            Some(Command::Screen(args)) => {
                assert_eq!(args.state.as_deref(), Some("ky"));
                assert_eq!(args.facts, PathBuf::from("household.json"));
                assert!(!args.summary);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
