use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// One failed schema constraint, located by a JSON-path-like string such as
/// `programs[2].conditions.all[0].fact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

impl SchemaViolation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigStoreError {
    #[error("no rule configuration found for jurisdiction '{code}'")]
    NotFound { code: String },
    #[error("failed to read rule configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse rule configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(
        "rule configuration for '{code}' violates {} schema constraint(s): {}",
        .violations.len(),
        join_violations(.violations)
    )]
    Invalid {
        code: String,
        violations: Vec<SchemaViolation>,
    },
}

impl ConfigStoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigStoreError::NotFound { .. })
    }

    pub fn violations(&self) -> &[SchemaViolation] {
        match self {
            ConfigStoreError::Invalid { violations, .. } => violations,
            _ => &[],
        }
    }
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(SchemaViolation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
