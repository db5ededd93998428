use std::path::{Path, PathBuf};

pub const DEFAULT_SPACY_MODEL: &str = "de_core_news_sm";
pub const DEFAULT_PYTHON: &str = "python";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
    TarBz2,
}

impl ArchiveFormat {
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarGz => "tar.gz",
            ArchiveFormat::TarBz2 => "tar.bz2",
        }
    }

    /// Guesses the format from a URL or file name, ignoring query and fragment.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        let clean = uri.split(['?', '#']).next()?.to_ascii_lowercase();
        if clean.ends_with(".zip") {
            Some(ArchiveFormat::Zip)
        } else if clean.ends_with(".tar.gz") || clean.ends_with(".tgz") {
            Some(ArchiveFormat::TarGz)
        } else if clean.ends_with(".tar.bz2") || clean.ends_with(".tbz2") {
            Some(ArchiveFormat::TarBz2)
        } else {
            None
        }
    }
}

/// One archive-based model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub source_url: String,
    pub archive_format: ArchiveFormat,
}

impl CatalogEntry {
    /// Builds an entry, inferring the archive format from the URL and falling back to zip.
    pub fn new(name: impl Into<String>, source_url: impl Into<String>) -> Self {
        let source_url = source_url.into();
        let archive_format = ArchiveFormat::from_uri(&source_url).unwrap_or(ArchiveFormat::Zip);
        Self {
            name: name.into(),
            source_url,
            archive_format,
        }
    }

    #[must_use]
    pub fn path(&self, models_dir: &Path) -> PathBuf {
        models_dir.join(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManager {
    pub program: String,
    /// Arguments placed before the package name.
    pub args: Vec<String>,
}

impl PackageManager {
    /// `<python> -m spacy download`
    pub fn spacy(python: impl Into<String>) -> Self {
        Self {
            program: python.into(),
            args: vec!["-m".into(), "spacy".into(), "download".into()],
        }
    }
}

/// The model family installed by an external package manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageModel {
    pub package_name: String,
    pub family_dir: String,
    pub manager: PackageManager,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    pub archives: Vec<CatalogEntry>,
    pub package: PackageModel,
}

impl ModelCatalog {
    /// Built-in catalog with the spaCy model and interpreter chosen by the caller.
    pub fn with_package(python: impl Into<String>, spacy_model: impl Into<String>) -> Self {
        Self {
            archives: default_archives(),
            package: PackageModel {
                package_name: spacy_model.into(),
                family_dir: "spacy".into(),
                manager: PackageManager::spacy(python),
            },
        }
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::with_package(DEFAULT_PYTHON, DEFAULT_SPACY_MODEL)
    }
}

fn default_archives() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new(
            "vosk-model-de-0.6",
            "https://alphacephei.com/vosk/models/vosk-model-de-0.6.zip",
        ),
        CatalogEntry::new(
            "vosk-model-spk-0.4",
            "https://alphacephei.com/vosk/models/vosk-model-spk-0.4.zip",
        ),
    ]
}
