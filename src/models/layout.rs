use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::ProvisionError;

const MODELS_DIR: &str = "models";

/// Canonical directory layout under a storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<root>/models`, created on demand.
    pub fn models_dir(&self) -> Result<PathBuf, ProvisionError> {
        let dir = self.root.join(MODELS_DIR);
        ensure_dir(&dir)?;
        Ok(dir)
    }

    /// `<root>/models/<family_dir>`, created on demand.
    pub fn package_install_dir(&self, family_dir: &str) -> Result<PathBuf, ProvisionError> {
        let dir = self.models_dir()?.join(family_dir);
        ensure_dir(&dir)?;
        Ok(dir)
    }
}

pub(crate) fn ensure_dir(path: &Path) -> Result<(), ProvisionError> {
    fs::create_dir_all(path).map_err(|source| ProvisionError::filesystem(path, source))
}
