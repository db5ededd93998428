mod archive;
mod download;
mod layout;
mod manager;
mod package;
mod service;

pub use archive::{AcquireOutcome, ArchiveAcquirer};
pub use download::{ArchiveExtractor, Extractor, Fetcher, HttpFetcher};
pub use layout::StorageLayout;
pub use manager::{
    ArchiveFormat, CatalogEntry, ModelCatalog, PackageManager, PackageModel, DEFAULT_PYTHON,
    DEFAULT_SPACY_MODEL,
};
pub use package::{PackageAcquirer, PackageInvocation, ProcessExit, ProcessRunner, SystemRunner};
pub use service::Provisioner;
