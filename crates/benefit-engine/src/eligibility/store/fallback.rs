use crate::eligibility::schema::{CoverageLevel, StateConfig};

/// Copy of `generic` presented as jurisdiction `code`.
///
/// Program ids swap the generic prefix for the jurisdiction's (`federal-ssi` -> `oh-ssi`);
/// interaction and action-plan rules use generic names and resolve against the new prefix
/// without changes. Applying the rewrite to its own output with the same code is a no-op.
pub fn rewrite_for_jurisdiction(generic: &StateConfig, code: &str, display_name: &str) -> StateConfig {
    let mut config = generic.clone();
    let code = code.trim().to_ascii_uppercase();
    let generic_prefix = format!("{}-", generic.program_prefix());
    let target_prefix = format!("{}-", code.to_ascii_lowercase());

    for program in &mut config.programs {
        if let Some(rest) = program.id.strip_prefix(&generic_prefix) {
            program.id = format!("{target_prefix}{rest}");
        }
    }

    config.state_name = if display_name.trim().is_empty() {
        code.clone()
    } else {
        display_name.trim().to_string()
    };
    config.state_code = code;
    config.coverage = CoverageLevel::Partial;
    config
}
