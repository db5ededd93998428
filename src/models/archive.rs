use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::anyhow;
use tracing::warn;

use crate::{core::events::ProvisionEvent, error::ProvisionError};

use super::{
    download::{Extractor, Fetcher},
    manager::CatalogEntry,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    Skipped(PathBuf),
    Installed(PathBuf),
}

/// Installs archive-based catalog entries that are not yet on disk.
pub struct ArchiveAcquirer<'a> {
    fetcher: &'a dyn Fetcher,
    extractor: &'a dyn Extractor,
    keep_archives: bool,
}

impl<'a> ArchiveAcquirer<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, extractor: &'a dyn Extractor, keep_archives: bool) -> Self {
        Self {
            fetcher,
            extractor,
            keep_archives,
        }
    }

    /// An existing directory named after the entry counts as installed; its contents are
    /// not inspected.
    pub fn ensure_installed(
        &self,
        entry: &CatalogEntry,
        models_dir: &Path,
        on_event: &mut dyn FnMut(ProvisionEvent),
    ) -> Result<AcquireOutcome, ProvisionError> {
        let target = entry.path(models_dir);
        if target.is_dir() {
            on_event(ProvisionEvent::Skipped {
                model: entry.name.clone(),
                source_url: entry.source_url.clone(),
            });
            return Ok(AcquireOutcome::Skipped(target));
        }

        on_event(ProvisionEvent::Downloading {
            model: entry.name.clone(),
            source_url: entry.source_url.clone(),
        });
        let archive = self
            .fetcher
            .fetch(&entry.source_url, models_dir, &mut |bytes| {
                on_event(ProvisionEvent::DownloadProgress {
                    model: entry.name.clone(),
                    bytes,
                })
            })
            .map_err(|source| ProvisionError::Download {
                model: entry.name.clone(),
                url: entry.source_url.clone(),
                source,
            })?;
        let archive = stage_archive(archive, &target, entry)?;

        on_event(ProvisionEvent::Extracting {
            model: entry.name.clone(),
            archive: archive.clone(),
        });
        self.extractor
            .extract(&archive, entry.archive_format)
            .map_err(|source| ProvisionError::Extraction {
                model: entry.name.clone(),
                archive: archive.clone(),
                source,
            })?;

        if !target.is_dir() {
            return Err(ProvisionError::Extraction {
                model: entry.name.clone(),
                archive,
                source: anyhow!("archive did not contain a top-level {}/ directory", entry.name),
            });
        }

        if !self.keep_archives {
            match fs::remove_file(&archive) {
                Ok(()) => on_event(ProvisionEvent::ArchiveRemoved {
                    model: entry.name.clone(),
                    archive: archive.clone(),
                }),
                Err(error) => warn!("Failed to remove archive {}: {error}", archive.display()),
            }
        }

        on_event(ProvisionEvent::Installed {
            model: entry.name.clone(),
            path: target.clone(),
        });
        Ok(AcquireOutcome::Installed(target))
    }
}

/// A download saved under the model's own name would block extraction, so it is moved
/// to `<name>.download.<ext>` first.
fn stage_archive(
    archive: PathBuf,
    target: &Path,
    entry: &CatalogEntry,
) -> Result<PathBuf, ProvisionError> {
    if archive != target {
        return Ok(archive);
    }
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".download.{}", entry.archive_format.extension()));
    let staged = target.with_file_name(name);
    fs::rename(&archive, &staged).map_err(|source| ProvisionError::Download {
        model: entry.name.clone(),
        url: entry.source_url.clone(),
        source: anyhow::Error::new(source).context(format!(
            "move download aside to {}",
            staged.display()
        )),
    })?;
    Ok(staged)
}
