use std::path::PathBuf;

use tracing::{debug, info};

/// Progress notifications emitted while provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionEvent {
    Skipped { model: String, source_url: String },
    Downloading { model: String, source_url: String },
    DownloadProgress { model: String, bytes: u64 },
    Extracting { model: String, archive: PathBuf },
    ArchiveRemoved { model: String, archive: PathBuf },
    Installed { model: String, path: PathBuf },
    PackageInstalling { package: String, prefix: PathBuf },
    PackageInstalled { package: String, prefix: PathBuf },
}

/// Writes an event to the log at a level matching its weight.
pub fn log_event(event: &ProvisionEvent) {
    match event {
        ProvisionEvent::Skipped { source_url, .. } => info!("Skipping {source_url}"),
        ProvisionEvent::Downloading { source_url, .. } => info!("Downloading {source_url}"),
        ProvisionEvent::DownloadProgress { model, bytes } => {
            debug!("{model}: {bytes} bytes downloaded")
        }
        ProvisionEvent::Extracting { model, archive } => {
            info!("Extracting {} for {model}", archive.display())
        }
        ProvisionEvent::ArchiveRemoved { archive, .. } => {
            debug!("Removed archive {}", archive.display())
        }
        ProvisionEvent::Installed { model, path } => {
            info!("Installed {model} at {}", path.display())
        }
        ProvisionEvent::PackageInstalling { package, prefix } => {
            info!("Installing {package} into {}", prefix.display())
        }
        ProvisionEvent::PackageInstalled { package, .. } => info!("Installed package {package}"),
    }
}
