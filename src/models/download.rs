use std::{
    fs::{self, File},
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use reqwest::blocking::Client;
use tar::Archive;
use zip::read::ZipArchive;

use super::manager::ArchiveFormat;

const CHUNK_SIZE: usize = 32 * 1024;

/// Fetches a remote payload into a local directory.
pub trait Fetcher {
    /// Streams `url` into `dest_dir` and returns the final file path.
    /// `progress` receives the running byte count.
    fn fetch(&self, url: &str, dest_dir: &Path, progress: &mut dyn FnMut(u64)) -> Result<PathBuf>;
}

/// Unpacks an archive into the directory that contains it.
pub trait Extractor {
    fn extract(&self, archive: &Path, format: ArchiveFormat) -> Result<()>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(None)
            .build()
            .context("create http client")?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest_dir: &Path, progress: &mut dyn FnMut(u64)) -> Result<PathBuf> {
        let filename =
            filename_from_uri(url).ok_or_else(|| anyhow!("no file name in url {url}"))?;
        let target = dest_dir.join(&filename);
        let staging = staging_path(&target);

        let mut response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("request {url}"))?
            .error_for_status()
            .with_context(|| format!("download {url}"))?;

        if let Err(error) = stream_to_file(&mut response, &staging, progress) {
            let _ = fs::remove_file(&staging);
            return Err(error);
        }

        fs::rename(&staging, &target)
            .with_context(|| format!("move download into place at {}", target.display()))?;
        Ok(target)
    }
}

fn stream_to_file<R: Read>(
    reader: &mut R,
    path: &Path,
    progress: &mut dyn FnMut(u64),
) -> Result<u64> {
    let mut file =
        File::create(path).with_context(|| format!("create staging file {}", path.display()))?;
    let mut downloaded = 0u64;
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let read = reader.read(&mut buffer).context("read download chunk")?;
        if read == 0 {
            break;
        }
        file.write_all(&buffer[..read])
            .context("write download chunk")?;
        downloaded += read as u64;
        progress(downloaded);
    }
    file.flush().context("flush staging file")?;
    Ok(downloaded)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveExtractor;

impl Extractor for ArchiveExtractor {
    fn extract(&self, archive: &Path, format: ArchiveFormat) -> Result<()> {
        let destination = archive
            .parent()
            .ok_or_else(|| anyhow!("archive {} has no parent directory", archive.display()))?;
        let file = File::open(archive)
            .with_context(|| format!("open archive {}", archive.display()))?;
        match format {
            ArchiveFormat::Zip => extract_zip(destination, file),
            ArchiveFormat::TarGz => extract_tar(destination, GzDecoder::new(file)),
            ArchiveFormat::TarBz2 => extract_tar(destination, BzDecoder::new(file)),
        }
    }
}

fn extract_zip(destination: &Path, file: File) -> Result<()> {
    let mut archive = ZipArchive::new(file).context("open zip archive")?;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).context("read zip entry")?;
        let relative = entry
            .enclosed_name()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow!("zip entry {:?} escapes the archive directory", entry.name()))?;
        let dest = destination.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&dest).context("create zip dir")?;
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).context("create zip file parent")?;
            }
            let mut outfile = File::create(&dest).context("create zip file")?;
            io::copy(&mut entry, &mut outfile).context("write zip file")?;
        }
    }
    Ok(())
}

fn extract_tar<R: Read>(destination: &Path, reader: R) -> Result<()> {
    let mut archive = Archive::new(reader);
    for entry in archive.entries().context("iterate tar entries")? {
        let mut entry = entry.context("read tar entry")?;
        let path = entry.path().context("read entry path")?.into_owned();
        let unpacked = entry
            .unpack_in(destination)
            .with_context(|| format!("unpack tar entry {}", path.display()))?;
        if !unpacked {
            return Err(anyhow!(
                "tar entry {} escapes the archive directory",
                path.display()
            ));
        }
    }
    Ok(())
}

fn staging_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    target.with_file_name(name)
}

pub(crate) fn filename_from_uri(uri: &str) -> Option<String> {
    let last_segment = uri.split(['?', '#']).next()?.rsplit('/').next()?;
    let clean = last_segment.trim();
    if clean.is_empty() {
        None
    } else {
        Some(clean.to_string())
    }
}
