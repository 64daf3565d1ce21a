//! Read-only access to timer definitions.
//!
//! Authoring and persistence belong to the external timer store; playback
//! only needs to list and load definitions. [`DirectoryStore`] reads
//! `<name>.toml` / `<name>.json` files from one directory.

use std::path::{Path, PathBuf};

use crate::error::ValidationError;
use crate::timer::TimerDefinition;

pub trait DefinitionStore {
    /// Names of all stored timers, sorted.
    fn list(&self) -> crate::Result<Vec<String>>;

    fn load(&self, name: &str) -> crate::Result<TimerDefinition>;
}

#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DefinitionStore for DirectoryStore {
    fn list(&self) -> crate::Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if is_definition_file(&path) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn load(&self, name: &str) -> crate::Result<TimerDefinition> {
        for ext in ["toml", "json"] {
            let path = self.root.join(format!("{name}.{ext}"));
            if path.is_file() {
                return load_file(&path);
            }
        }
        Err(ValidationError::NotFound(name.to_string()).into())
    }
}

fn is_definition_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("toml") | Some("json")
    )
}

/// Parse a definition file by extension. A missing `name` falls back to
/// the file stem.
pub fn load_file(path: &Path) -> crate::Result<TimerDefinition> {
    let content = std::fs::read_to_string(path)?;
    let mut def = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => TimerDefinition::from_toml_str(&content)?,
        Some("json") => TimerDefinition::from_json_str(&content)?,
        _ => return Err(ValidationError::UnsupportedFormat(path.to_path_buf()).into()),
    };
    if def.name.is_empty() {
        def.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
    }
    Ok(def)
}
