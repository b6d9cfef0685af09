//! Fixed schema for jurisdiction rule documents.
//!
//! Checks run in three passes: top-level shape, typed deserialization of each section, then
//! semantic constraints over the typed document. Each pass reports every violation it finds so a
//! config author sees the whole list at once. Later passes only run when earlier ones succeed.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::SchemaViolation;
use crate::eligibility::evaluation::REASON_KEYS;
use crate::eligibility::facts::{is_boolean_fact, is_known_fact, INCOME_LIMIT};
use crate::eligibility::schema::{
    deserialize_income_limits, parse_metadata_date, Condition, ConditionValue, CoverageLevel,
    FactCondition, Operator, StateConfig, DEFAULT_BASE_COVERAGE_PROGRAM,
};

#[derive(Debug, Clone, Copy)]
enum JsonKind {
    String,
    Array,
    Object,
}

impl JsonKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            JsonKind::String => value.is_string(),
            JsonKind::Array => value.is_array(),
            JsonKind::Object => value.is_object(),
        }
    }

    fn label(self) -> &'static str {
        match self {
            JsonKind::String => "a string",
            JsonKind::Array => "an array",
            JsonKind::Object => "an object",
        }
    }
}

const REQUIRED_KEYS: [(&str, JsonKind); 7] = [
    ("stateCode", JsonKind::String),
    ("stateName", JsonKind::String),
    ("programs", JsonKind::Array),
    ("incomeLimits", JsonKind::Object),
    ("benefitInteractions", JsonKind::Array),
    ("actionPlanOrder", JsonKind::Array),
    ("metadata", JsonKind::Object),
];

const OPTIONAL_KEYS: [(&str, JsonKind); 2] = [
    ("coverage", JsonKind::String),
    ("baseCoverageProgram", JsonKind::String),
];

#[derive(Debug, Default)]
struct Violations(Vec<SchemaViolation>);

impl Violations {
    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(SchemaViolation::new(path, message));
    }

    fn finish(&mut self) -> Result<(), Vec<SchemaViolation>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.0))
        }
    }
}

/// Parse and validate a raw rule document.
pub fn parse_document(document: Value) -> Result<StateConfig, Vec<SchemaViolation>> {
    let Value::Object(mut root) = document else {
        return Err(vec![SchemaViolation::new(
            "",
            "rule configuration must be a JSON object",
        )]);
    };

    let mut report = Violations::default();
    check_shape(&root, &mut report);
    report.finish()?;

    let state_code = take_string(&mut root, "stateCode");
    let state_name = take_string(&mut root, "stateName");
    let coverage = match root.remove("coverage") {
        Some(value) => section::<CoverageLevel>(value, "coverage", &mut report).unwrap_or_default(),
        None => CoverageLevel::default(),
    };
    let base_coverage_program = match root.remove("baseCoverageProgram") {
        Some(Value::String(name)) => name,
        _ => DEFAULT_BASE_COVERAGE_PROGRAM.to_string(),
    };
    let programs = elements(take(&mut root, "programs"), "programs", &mut report);
    let income_limits = deserialize_income_limits(take(&mut root, "incomeLimits"))
        .unwrap_or_else(|err| {
            report.push("incomeLimits", err.to_string());
            Default::default()
        });
    let benefit_interactions = elements(
        take(&mut root, "benefitInteractions"),
        "benefitInteractions",
        &mut report,
    );
    let action_plan_order = elements(
        take(&mut root, "actionPlanOrder"),
        "actionPlanOrder",
        &mut report,
    );
    let metadata = section(take(&mut root, "metadata"), "metadata", &mut report);
    report.finish()?;

    let Some(metadata) = metadata else {
        return Err(vec![SchemaViolation::new("metadata", "metadata is required")]);
    };

    let config = StateConfig {
        state_code,
        state_name,
        coverage,
        base_coverage_program,
        programs,
        income_limits,
        benefit_interactions,
        action_plan_order,
        metadata,
    };
    validate_config(&config)?;
    Ok(config)
}

/// Semantic constraints over an already typed document.
pub fn validate_config(config: &StateConfig) -> Result<(), Vec<SchemaViolation>> {
    let mut report = Violations::default();
    check_identity(config, &mut report);
    check_programs(config, &mut report);
    check_income_limits(config, &mut report);
    check_interactions(config, &mut report);
    check_action_plan(config, &mut report);
    check_metadata(config, &mut report);
    report.finish()
}

fn check_shape(root: &Map<String, Value>, report: &mut Violations) {
    for (key, kind) in REQUIRED_KEYS {
        match root.get(key) {
            None => report.push(key, "required field is missing"),
            Some(value) if !kind.matches(value) => {
                report.push(key, format!("must be {}", kind.label()))
            }
            Some(_) => {}
        }
    }
    for (key, kind) in OPTIONAL_KEYS {
        if let Some(value) = root.get(key) {
            if !kind.matches(value) {
                report.push(key, format!("must be {}", kind.label()));
            }
        }
    }
}

fn take(root: &mut Map<String, Value>, key: &str) -> Value {
    root.remove(key).unwrap_or(Value::Null)
}

fn take_string(root: &mut Map<String, Value>, key: &str) -> String {
    match root.remove(key) {
        Some(Value::String(value)) => value,
        _ => String::new(),
    }
}

fn section<T: DeserializeOwned>(value: Value, path: &str, report: &mut Violations) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            report.push(path, err.to_string());
            None
        }
    }
}

fn elements<T: DeserializeOwned>(value: Value, path: &str, report: &mut Violations) -> Vec<T> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| section(item, &format!("{path}[{index}]"), report))
        .collect()
}

fn check_identity(config: &StateConfig, report: &mut Violations) {
    if config.state_code.trim().is_empty() {
        report.push("stateCode", "must not be empty");
    }
    if config.state_name.trim().is_empty() {
        report.push("stateName", "must not be empty");
    }
    if config.base_coverage_program.trim().is_empty() {
        report.push("baseCoverageProgram", "must not be empty");
    }
}

fn check_programs(config: &StateConfig, report: &mut Violations) {
    if config.programs.is_empty() {
        report.push("programs", "at least one program is required");
    }

    let prefix = format!("{}-", config.program_prefix());
    let mut seen = HashSet::new();

    for (index, program) in config.programs.iter().enumerate() {
        let path = format!("programs[{index}]");

        if program.id.len() <= prefix.len() || !program.id.starts_with(&prefix) {
            report.push(
                format!("{path}.id"),
                format!("program id '{}' must start with '{prefix}'", program.id),
            );
        }
        if !seen.insert(program.id.as_str()) {
            report.push(
                format!("{path}.id"),
                format!("duplicate program id '{}'", program.id),
            );
        }
        if program.name.trim().is_empty() {
            report.push(format!("{path}.name"), "must not be empty");
        }

        check_condition(&program.conditions, &format!("{path}.conditions"), report);

        for (position, fact) in program.categorical.iter().enumerate() {
            if !is_boolean_fact(fact) {
                report.push(
                    format!("{path}.categorical[{position}]"),
                    format!("'{fact}' is not a boolean fact"),
                );
            }
        }

        for key in program.reasons.keys() {
            if !REASON_KEYS.contains(&key.as_str()) {
                report.push(
                    format!("{path}.reasons.{key}"),
                    format!("unknown outcome; expected one of {}", REASON_KEYS.join(", ")),
                );
            }
        }
    }
}

fn check_condition(condition: &Condition, path: &str, report: &mut Violations) {
    match condition {
        Condition::All { all } => check_branch("all", all, path, report),
        Condition::Any { any } => check_branch("any", any, path, report),
        Condition::Not { not } => check_condition(not, &format!("{path}.not"), report),
        Condition::Fact(leaf) => check_leaf(leaf, path, report),
    }
}

fn check_branch(kind: &str, children: &[Condition], path: &str, report: &mut Violations) {
    if children.is_empty() {
        report.push(
            format!("{path}.{kind}"),
            format!("'{kind}' must list at least one condition"),
        );
    }
    for (index, child) in children.iter().enumerate() {
        check_condition(child, &format!("{path}.{kind}[{index}]"), report);
    }
}

fn check_leaf(leaf: &FactCondition, path: &str, report: &mut Violations) {
    check_fact_name(
        &leaf.fact,
        leaf.params.limit.is_some(),
        &format!("{path}.fact"),
        report,
    );

    let value_path = format!("{path}.value");
    let is_list = match &leaf.value {
        ConditionValue::Fact(reference) => {
            check_fact_name(
                &reference.fact,
                reference.params.limit.is_some(),
                &format!("{value_path}.fact"),
                report,
            );
            false
        }
        ConditionValue::Literal(Value::Array(_)) => true,
        ConditionValue::Literal(Value::Object(_) | Value::Null) => {
            report.push(
                value_path.as_str(),
                "must be a scalar, an array, or a fact reference",
            );
            false
        }
        ConditionValue::Literal(_) => false,
    };

    let membership = matches!(leaf.operator, Operator::In | Operator::NotIn);
    if membership && !is_list {
        report.push(
            value_path,
            format!("operator '{}' requires an array value", leaf.operator.label()),
        );
    } else if !membership && is_list {
        report.push(
            value_path,
            format!("operator '{}' does not accept an array value", leaf.operator.label()),
        );
    }
}

fn check_fact_name(fact: &str, has_limit: bool, path: &str, report: &mut Violations) {
    if !is_known_fact(fact) {
        report.push(path, format!("unknown fact '{fact}'"));
    } else if fact == INCOME_LIMIT && !has_limit {
        report.push(path, "'incomeLimit' requires params.limit");
    }
}

fn check_income_limits(config: &StateConfig, report: &mut Violations) {
    for (name, table) in &config.income_limits {
        let path = format!("incomeLimits.{name}");
        if table.is_empty() {
            report.push(path.as_str(), "must list at least one household size");
        }
        for (size, amount) in table {
            if *size == 0 {
                report.push(format!("{path}.{size}"), "household sizes start at 1");
            }
            if !amount.is_finite() || *amount < 0.0 {
                report.push(
                    format!("{path}.{size}"),
                    "monthly limit must be a non-negative amount",
                );
            }
        }
    }
}

fn check_reference(config: &StateConfig, name: &str, path: String, report: &mut Violations) {
    let program_id = config.resolve_program_id(name);
    if config.program(&program_id).is_none() {
        report.push(
            path,
            format!("program '{name}' does not resolve to a configured program ('{program_id}')"),
        );
    }
}

fn check_text(text: &str, path: String, report: &mut Violations) {
    if text.trim().is_empty() {
        report.push(path, "must not be empty");
    }
}

fn check_interactions(config: &StateConfig, report: &mut Violations) {
    for (index, rule) in config.benefit_interactions.iter().enumerate() {
        let path = format!("benefitInteractions[{index}]");
        if rule.programs.is_empty() {
            report.push(format!("{path}.programs"), "must name at least one program");
        }
        for (position, name) in rule.programs.iter().enumerate() {
            check_reference(config, name, format!("{path}.programs[{position}]"), report);
        }
        check_text(&rule.description, format!("{path}.description"), report);
        check_text(&rule.recommendation, format!("{path}.recommendation"), report);
    }
}

fn check_action_plan(config: &StateConfig, report: &mut Violations) {
    for (index, rule) in config.action_plan_order.iter().enumerate() {
        if rule.grouped {
            continue;
        }
        let path = format!("actionPlanOrder[{index}]");

        check_reference(config, &rule.program, format!("{path}.program"), report);
        check_text(
            rule.step.as_deref().unwrap_or_default(),
            format!("{path}.step"),
            report,
        );

        match (&rule.combined_with, &rule.combined_step) {
            (Some(partner), step) => {
                check_reference(config, partner, format!("{path}.combinedWith"), report);
                check_text(
                    step.as_deref().unwrap_or_default(),
                    format!("{path}.combinedStep"),
                    report,
                );
            }
            (None, Some(_)) => {
                report.push(format!("{path}.combinedStep"), "requires combinedWith");
            }
            (None, None) => {}
        }

        if let Some(conditional) = &rule.if_also_eligible_for {
            check_reference(
                config,
                &conditional.program,
                format!("{path}.ifAlsoEligibleFor.program"),
                report,
            );
            check_text(
                &conditional.step,
                format!("{path}.ifAlsoEligibleFor.step"),
                report,
            );
        }
    }
}

fn check_metadata(config: &StateConfig, report: &mut Violations) {
    let metadata = &config.metadata;
    for (field, value) in [
        ("lastUpdated", &metadata.last_updated),
        ("effectiveDate", &metadata.effective_date),
    ] {
        if parse_metadata_date(value).is_none() {
            report.push(
                format!("metadata.{field}"),
                format!("'{value}' is not a YYYY-MM-DD date"),
            );
        }
    }
    check_text(&metadata.source, "metadata.source".to_string(), report);
}
