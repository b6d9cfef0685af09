use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::ConfigStoreError;
use super::validation::parse_document;
use super::{ConfigStore, DEFAULT_FALLBACK_CODE};
use crate::eligibility::schema::StateConfig;

/// Filesystem-backed store.
///
/// Scans `root` recursively for `*.json` documents and matches on each document's declared
/// `stateCode`, so directories can be named for people (`kentucky/config.json`) without the
/// path ever deciding the jurisdiction. Dotfiles and dot-directories are skipped.
#[derive(Debug, Clone)]
pub struct DirectoryConfigStore {
    root: PathBuf,
    fallback_code: String,
}

impl DirectoryConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fallback_code: DEFAULT_FALLBACK_CODE.to_string(),
        }
    }

    pub fn with_fallback_code(mut self, code: impl Into<String>) -> Self {
        let code: String = code.into();
        self.fallback_code = code.trim().to_ascii_uppercase();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Declared codes of every readable document under the root, in path order.
    pub fn jurisdictions(&self) -> Result<Vec<String>, ConfigStoreError> {
        let mut codes = Vec::new();
        for path in self.candidates()? {
            if let Some(document) = read_candidate(&path)? {
                if let Some(code) = declared_code(&document) {
                    codes.push(code.to_ascii_uppercase());
                }
            }
        }
        Ok(codes)
    }

    /// Parse and validate one document directly, bypassing discovery.
    pub fn load_file(path: impl AsRef<Path>) -> Result<StateConfig, ConfigStoreError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigStoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Value = serde_json::from_str(&raw).map_err(|source| ConfigStoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let code = declared_code(&document)
            .map(str::to_ascii_uppercase)
            .unwrap_or_default();
        parse_document(document).map_err(|violations| ConfigStoreError::Invalid { code, violations })
    }

    fn candidates(&self) -> Result<Vec<PathBuf>, ConfigStoreError> {
        let mut found = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let entries = fs::read_dir(&dir).map_err(|source| ConfigStoreError::Io {
                path: dir.clone(),
                source,
            })?;
            for entry in entries {
                let path = entry
                    .map_err(|source| ConfigStoreError::Io {
                        path: dir.clone(),
                        source,
                    })?
                    .path();

                let hidden = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.starts_with('.'))
                    .unwrap_or(true);
                if hidden {
                    continue;
                }

                if path.is_dir() {
                    pending.push(path);
                } else if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                    found.push(path);
                }
            }
        }

        found.sort();
        Ok(found)
    }
}

impl ConfigStore for DirectoryConfigStore {
    fn load(&self, code: &str) -> Result<Arc<StateConfig>, ConfigStoreError> {
        let wanted = code.trim();

        for path in self.candidates()? {
            let Some(document) = read_candidate(&path)? else {
                continue;
            };

            match declared_code(&document) {
                Some(declared) if declared.eq_ignore_ascii_case(wanted) => {}
                declared => {
                    debug!(path = %path.display(), declared, "candidate does not match jurisdiction");
                    continue;
                }
            }

            let config = parse_document(document).map_err(|violations| {
                warn!(
                    path = %path.display(),
                    violations = violations.len(),
                    "rule configuration failed schema validation"
                );
                ConfigStoreError::Invalid {
                    code: wanted.to_ascii_uppercase(),
                    violations,
                }
            })?;

            info!(
                jurisdiction = %config.state_code,
                path = %path.display(),
                programs = config.programs.len(),
                "loaded rule configuration"
            );
            return Ok(Arc::new(config));
        }

        Err(ConfigStoreError::NotFound {
            code: wanted.to_ascii_uppercase(),
        })
    }

    fn fallback_code(&self) -> &str {
        &self.fallback_code
    }
}

/// Unparsable files are skipped with a warning so one broken document cannot hide the rest.
fn read_candidate(path: &Path) -> Result<Option<Value>, ConfigStoreError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigStoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match serde_json::from_str(&raw) {
        Ok(document) => Ok(Some(document)),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "skipping unparsable rule configuration");
            Ok(None)
        }
    }
}

fn declared_code(document: &Value) -> Option<&str> {
    document
        .get("stateCode")
        .and_then(Value::as_str)
        .map(str::trim)
}
