use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::models::{ModelCatalog, DEFAULT_PYTHON, DEFAULT_SPACY_MODEL};

const CONFIG_FILE: &str = "config.json";
pub const ENV_STORAGE_PATH: &str = "OAS_STORAGE_PATH";
pub const ENV_KEEP_ARCHIVES: &str = "OAS_KEEP_ARCHIVES";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProvisionSettings {
    pub storage_path: PathBuf,
    pub keep_archives: bool,
    pub python: String,
    pub spacy_model: String,
}

impl Default for ProvisionSettings {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path().unwrap_or_default(),
            keep_archives: true,
            python: DEFAULT_PYTHON.into(),
            spacy_model: DEFAULT_SPACY_MODEL.into(),
        }
    }
}

impl ProvisionSettings {
    /// Defaults, then the user config file, then environment overrides.
    pub fn resolve() -> Result<Self> {
        let settings = match resolve_config_path() {
            Some(path) => load_settings(&path)?,
            None => Self::default(),
        };
        settings.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `OAS_*` overrides read through `lookup` and validates the result.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_STORAGE_PATH).filter(|value| !value.trim().is_empty()) {
            self.storage_path = PathBuf::from(path);
        }
        if let Some(value) = lookup(ENV_KEEP_ARCHIVES) {
            self.keep_archives = parse_flag(&value)
                .ok_or_else(|| anyhow!("{ENV_KEEP_ARCHIVES} must be true or false, got {value:?}"))?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn catalog(&self) -> ModelCatalog {
        ModelCatalog::with_package(self.python.clone(), self.spacy_model.clone())
    }

    fn validate(&self) -> Result<()> {
        if self.storage_path.as_os_str().is_empty() {
            return Err(anyhow!(
                "no storage path configured; set {ENV_STORAGE_PATH} or storagePath in {CONFIG_FILE}"
            ));
        }
        if !self.storage_path.is_absolute() {
            return Err(anyhow!(
                "storage path must be absolute, got {}",
                self.storage_path.display()
            ));
        }
        Ok(())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "OpenAudioSearch", "oas")
}

fn default_storage_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

fn resolve_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

pub fn load_settings(path: &Path) -> Result<ProvisionSettings> {
    if !path.exists() {
        return Ok(ProvisionSettings::default());
    }
    let bytes = fs::read(path).with_context(|| format!("failed reading {path:?}"))?;
    serde_json::from_slice(&bytes).context("config json could not be parsed")
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
