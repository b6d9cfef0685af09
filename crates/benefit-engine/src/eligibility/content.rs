//! Read-only program content catalog.
//!
//! Content is authored outside the engine (display copy, application contacts, coordination
//! notes). The engine only looks entries up; it never writes the catalog.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramContent {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub coverage: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub required_documents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_phone: Option<String>,
    /// Canonical primary/secondary coverage text, used by insurance-conditional interactions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_coordination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waitlist: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("no content record for program '{program_id}'")]
    MissingContent { program_id: String },
    #[error("failed to read content catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse content catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Lookup from program identifier to content record.
pub trait ContentCatalog: Send + Sync {
    fn entry(&self, key: &str) -> Option<&ProgramContent>;

    /// Entry for `program_id`, or the generic entry once the jurisdiction `prefix` is stripped
    /// (`ky-ssi` under `ky` -> `ssi`).
    fn find(&self, program_id: &str, prefix: &str) -> Option<&ProgramContent> {
        self.entry(program_id).or_else(|| {
            program_id
                .strip_prefix(&format!("{prefix}-"))
                .and_then(|generic| self.entry(generic))
        })
    }

    /// Like [`ContentCatalog::find`], but a program with no content is a data-authoring defect
    /// and is reported as an error rather than dropped.
    fn lookup(&self, program_id: &str, prefix: &str) -> Result<ProgramContent, ContentError> {
        match self.find(program_id, prefix) {
            Some(content) => Ok(content.clone()),
            None => {
                error!(program_id, "program has no content record");
                Err(ContentError::MissingContent {
                    program_id: program_id.to_string(),
                })
            }
        }
    }
}

/// Catalog backed by a single JSON object keyed by program id or generic program name.
#[derive(Debug, Clone, Default)]
pub struct JsonContentCatalog {
    entries: BTreeMap<String, ProgramContent>,
}

impl JsonContentCatalog {
    pub fn new(entries: BTreeMap<String, ProgramContent>) -> Self {
        Self { entries }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: BTreeMap<String, ProgramContent> =
            serde_json::from_str(&raw).map_err(|source| ContentError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        info!(path = %path.display(), entries = entries.len(), "loaded program content catalog");
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ContentCatalog for JsonContentCatalog {
    fn entry(&self, key: &str) -> Option<&ProgramContent> {
        self.entries.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(name: &str) -> ProgramContent {
        ProgramContent {
            name: name.to_string(),
            description: format!("{name} description"),
            ..ProgramContent::default()
        }
    }

    fn catalog() -> JsonContentCatalog {
        JsonContentCatalog::new(BTreeMap::from([
            ("ky-medicaid".to_string(), content("Kentucky Medicaid")),
            ("medicaid".to_string(), content("Medicaid")),
            ("ssi".to_string(), content("Supplemental Security Income")),
            ("michelle-p-waiver".to_string(), content("Michelle P. Waiver")),
        ]))
    }

    #[test]
    fn jurisdiction_entry_wins_over_generic() {
        let found = catalog().lookup("ky-medicaid", "ky").expect("content");
        assert_eq!(found.name, "Kentucky Medicaid");
    }

    #[test]
    fn prefix_is_stripped_for_generic_lookup() {
        let catalog = catalog();
        assert_eq!(
            catalog.lookup("oh-ssi", "oh").expect("content").name,
            "Supplemental Security Income"
        );
        assert_eq!(
            catalog.lookup("ky-michelle-p-waiver", "ky").expect("content").name,
            "Michelle P. Waiver"
        );
    }

    #[test]
    fn hyphenated_jurisdiction_prefix_is_stripped_whole() {
        let catalog = catalog();
        assert_eq!(
            catalog.lookup("us-dc-medicaid", "us-dc").expect("content").name,
            "Medicaid"
        );
        assert!(catalog.find("us-dc-medicaid", "us").is_none());
        assert!(catalog.find("ky-medicaid-extra", "oh").is_none());
    }

    #[test]
    fn missing_content_names_the_program() {
        let err = catalog().lookup("ky-respite", "ky").expect_err("no content");
        match err {
            ContentError::MissingContent { program_id } => assert_eq!(program_id, "ky-respite"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn catalog_file_parses_optional_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("programs.json");
        fs::write(
            &path,
            r#"{ "medicaid": { "name": "Medicaid", "description": "Health coverage",
                 "insuranceCoordination": "Medicaid pays after private insurance" } }"#,
        )
        .expect("write catalog");

        let catalog = JsonContentCatalog::from_path(&path).expect("catalog loads");
        assert_eq!(catalog.len(), 1);
        let medicaid = catalog.lookup("medicaid", "ky").expect("content");
        assert_eq!(
            medicaid.insurance_coordination.as_deref(),
            Some("Medicaid pays after private insurance")
        );
        assert!(medicaid.coverage.is_empty());
    }
}
