use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Component, Path};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub path: String,
    pub size: u64,
    pub is_directory: bool,
    pub compression_ratio: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveInfo {
    pub entries: Vec<ArchiveEntry>,
    pub total_files: u32,
    pub total_directories: u32,
    pub uncompressed_size: u64,
    pub compressed_size: u64,
    pub format: String,
}

/// Outcome of packing the label folders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveSummary {
    pub files_added: u32,
    pub files_skipped: u32,
    pub bytes_written: u64,
}

#[async_trait]
pub trait ArchiveHandler: Send + Sync {
    /// Packs every file below each direct subfolder of `working_dir` into a
    /// fresh archive at `output`. Files directly in `working_dir` are left out.
    async fn create_from_subfolders(&self, working_dir: &Path, output: &Path) -> Result<ArchiveSummary>;

    async fn list_contents(&self, archive_path: &Path) -> Result<ArchiveInfo>;
}

pub struct ZipHandler;

#[async_trait]
impl ArchiveHandler for ZipHandler {
    async fn create_from_subfolders(&self, working_dir: &Path, output: &Path) -> Result<ArchiveSummary> {
        let working_dir = working_dir.to_path_buf();
        let output = output.to_path_buf();

        tokio::task::spawn_blocking(move || write_zip(&working_dir, &output))
            .await
            .map_err(|e| AppError::ArchiveError {
                message: format!("Archive task failed: {}", e),
            })?
    }

    async fn list_contents(&self, archive_path: &Path) -> Result<ArchiveInfo> {
        let archive_path = archive_path.to_path_buf();

        tokio::task::spawn_blocking(move || read_zip(&archive_path))
            .await
            .map_err(|e| AppError::ArchiveError {
                message: format!("Archive task failed: {}", e),
            })?
    }
}

fn write_zip(working_dir: &Path, output: &Path) -> Result<ArchiveSummary> {
    // Read the folder list before creating the output, in case it lives inside working_dir
    let mut label_dirs = std::fs::read_dir(working_dir)
        .map_err(|e| AppError::ArchiveError {
            message: format!("Failed to read images directory {}: {}", working_dir.display(), e),
        })?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|entry| entry.path())
        .collect::<Vec<_>>();
    label_dirs.sort();

    let file = File::create(output).map_err(|e| AppError::ArchiveError {
        message: format!("Failed to create {}: {}", output.display(), e),
    })?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut summary = ArchiveSummary::default();

    for label_dir in label_dirs {
        for entry in WalkDir::new(&label_dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", label_dir.display(), e);
                    summary.files_skipped += 1;
                    continue;
                }
            };

            // Links are stored by their target's content, as long as it is a file
            let file_type = entry.file_type();
            if !(file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())) {
                continue;
            }

            let Some(name) = entry_name(working_dir, entry.path()) else {
                tracing::warn!("Skipping {}: not below the images directory", entry.path().display());
                summary.files_skipped += 1;
                continue;
            };

            match add_file(&mut writer, entry.path(), &name, options) {
                Ok(bytes) => {
                    tracing::info!("Added to zip: {}", name);
                    summary.files_added += 1;
                    summary.bytes_written += bytes;
                }
                Err(e) => {
                    tracing::warn!("Failed to add {} to archive: {}", name, e);
                    summary.files_skipped += 1;
                }
            }
        }
    }

    writer.finish()?;
    Ok(summary)
}

fn add_file(
    writer: &mut ZipWriter<BufWriter<File>>,
    path: &Path,
    name: &str,
    options: SimpleFileOptions,
) -> Result<u64> {
    // Open first so an unreadable file never leaves an empty entry behind
    let mut source = File::open(path)?;
    writer.start_file(name, options)?;
    Ok(io::copy(&mut source, writer)?)
}

/// Archive entry name for `path`: relative to `root`, always `/`-separated.
pub fn entry_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts = relative
        .components()
        .map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn read_zip(archive_path: &Path) -> Result<ArchiveInfo> {
    let file = File::open(archive_path).map_err(|e| AppError::ArchiveError {
        message: format!("Failed to open ZIP file: {}", e),
    })?;
    let compressed_size = file.metadata()?.len();
    let mut archive = ZipArchive::new(file)?;

    let mut entries = Vec::with_capacity(archive.len());
    let mut total_files = 0;
    let mut total_directories = 0;
    let mut uncompressed_size = 0;

    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        let is_directory = file.is_dir();
        if is_directory {
            total_directories += 1;
        } else {
            total_files += 1;
        }

        let size = file.size();
        uncompressed_size += size;

        entries.push(ArchiveEntry {
            path: file.name().to_string(),
            size,
            is_directory,
            compression_ratio: if size > 0 {
                Some(file.compressed_size() as f32 / size as f32)
            } else {
                None
            },
        });
    }

    Ok(ArchiveInfo {
        entries,
        total_files,
        total_directories,
        uncompressed_size,
        compressed_size,
        format: "ZIP".to_string(),
    })
}
