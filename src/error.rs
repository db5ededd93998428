use std::{io, path::PathBuf};

use thiserror::Error;

/// Terminal failure of a provisioning run. Every variant aborts the run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to create directory {}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to download model {model} from {url}")]
    Download {
        model: String,
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to extract model {model} from {}", archive.display())]
    Extraction {
        model: String,
        archive: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("package manager {program} failed to install {package}: {reason}")]
    ExternalProcess {
        package: String,
        program: String,
        reason: ProcessFailure,
    },
}

#[derive(Debug, Error)]
pub enum ProcessFailure {
    #[error("could not spawn process: {0}")]
    Spawn(#[source] io::Error),

    #[error("exited with status {0}")]
    ExitCode(i32),

    #[error("terminated by signal")]
    Terminated,
}

impl ProvisionError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Catalog entry or package the failure belongs to, if any.
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        match self {
            Self::Filesystem { .. } => None,
            Self::Download { model, .. } | Self::Extraction { model, .. } => Some(model),
            Self::ExternalProcess { package, .. } => Some(package),
        }
    }
}
