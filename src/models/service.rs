use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::{
    core::{events::ProvisionEvent, settings::ProvisionSettings},
    error::ProvisionError,
};

use super::{
    archive::ArchiveAcquirer,
    download::{ArchiveExtractor, Extractor, Fetcher, HttpFetcher},
    layout::StorageLayout,
    manager::ModelCatalog,
    package::{PackageAcquirer, ProcessRunner, SystemRunner},
};

/// Drives both acquirers over a catalog, strictly in order.
pub struct Provisioner {
    fetcher: Box<dyn Fetcher>,
    extractor: Box<dyn Extractor>,
    runner: Box<dyn ProcessRunner>,
    keep_archives: bool,
}

impl Provisioner {
    /// HTTP downloads, on-disk extraction and real package manager processes.
    pub fn from_settings(settings: &ProvisionSettings) -> Result<Self> {
        Ok(Self::new(
            Box::new(HttpFetcher::new()?),
            Box::new(ArchiveExtractor),
            Box::new(SystemRunner),
            settings.keep_archives,
        ))
    }

    pub fn new(
        fetcher: Box<dyn Fetcher>,
        extractor: Box<dyn Extractor>,
        runner: Box<dyn ProcessRunner>,
        keep_archives: bool,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            runner,
            keep_archives,
        }
    }

    /// Provisions every archive entry, then the package-managed family. The first
    /// failure ends the run; later entries are not attempted.
    pub fn provision_all(
        &self,
        catalog: &ModelCatalog,
        storage_root: &Path,
        mut on_event: impl FnMut(ProvisionEvent),
    ) -> Result<(), ProvisionError> {
        let layout = StorageLayout::new(storage_root);
        let models_dir = layout.models_dir()?;
        let install_dir = layout.package_install_dir(&catalog.package.family_dir)?;
        info!(
            "Provisioning {} archive models and {} into {}",
            catalog.archives.len(),
            catalog.package.package_name,
            models_dir.display()
        );

        let archives =
            ArchiveAcquirer::new(&*self.fetcher, &*self.extractor, self.keep_archives);
        for entry in &catalog.archives {
            archives.ensure_installed(entry, &models_dir, &mut on_event)?;
        }

        PackageAcquirer::new(&*self.runner).ensure_installed(
            &catalog.package,
            &install_dir,
            &mut on_event,
        )
    }
}
