//! Data file consolidation and manifest generation.
//!
//! Freshly collected files land in the output directory. An index run moves
//! them into the canonical data directory, lists that directory, writes the
//! manifest (`files-index.json`) into the publish directory and copies every
//! data file next to it for the web viewer.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{SiteLayout, FILES_INDEX_NAME};
use crate::error::{CollectorError, Result};
use crate::types::FileManifest;
use crate::writer::write_json_atomic;

/// What an index run did.
#[derive(Debug, Clone)]
pub struct IndexReport {
    /// Files moved from the output directory into the data directory.
    pub moved: Vec<String>,
    /// Manifest written to the publish directory.
    pub manifest: FileManifest,
    pub manifest_path: PathBuf,
    /// Data files copied into the publish directory.
    pub copied: Vec<String>,
}

/// List the names of `*.json` regular files in a directory, sorted.
///
/// A missing directory is treated as empty. The manifest itself is never listed.
pub fn list_json_files(dir: &Path) -> Result<Vec<String>> {
    Ok(json_files_in(dir)?
        .into_iter()
        .filter(|name| name != FILES_INDEX_NAME)
        .collect())
}

/// Every `*.json` regular file in a directory, sorted, manifest included.
fn json_files_in(dir: &Path) -> Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(CollectorError::file("read directory", dir)(e)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(CollectorError::file("read directory", dir))?;
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".json") {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

/// Move every JSON file from `output_dir` into `data_dir`, replacing
/// same-named files. Returns the moved file names.
pub fn consolidate(output_dir: &Path, data_dir: &Path) -> Result<Vec<String>> {
    fs::create_dir_all(data_dir).map_err(CollectorError::file("create directory", data_dir))?;

    let names = json_files_in(output_dir)?;
    for name in &names {
        let from = output_dir.join(name);
        let to = data_dir.join(name);
        move_file(&from, &to)?;
        tracing::debug!(file = %name, "Moved into data directory");
    }

    if !names.is_empty() {
        tracing::info!(count = names.len(), "Moved output files into data directory");
    }
    Ok(names)
}

/// Rename a file, falling back to copy and remove across filesystems.
fn move_file(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            tracing::debug!(
                error = %rename_err,
                from = %from.display(),
                "Rename failed, copying instead"
            );
            fs::copy(from, to).map_err(CollectorError::file("copy", from))?;
            fs::remove_file(from).map_err(CollectorError::file("remove", from))?;
            Ok(())
        }
    }
}

/// Copy the named files from `from_dir` into `to_dir`, overwriting.
pub fn copy_files(names: &[String], from_dir: &Path, to_dir: &Path) -> Result<Vec<String>> {
    fs::create_dir_all(to_dir).map_err(CollectorError::file("create directory", to_dir))?;

    let mut copied = Vec::with_capacity(names.len());
    for name in names {
        let from = from_dir.join(name);
        fs::copy(&from, to_dir.join(name)).map_err(CollectorError::file("copy", &from))?;
        copied.push(name.clone());
    }
    Ok(copied)
}

/// Consolidate, regenerate the manifest and publish the data files.
///
/// Running twice without new input yields the same file listing; only the
/// manifest timestamp changes.
pub fn update_files_index(layout: &SiteLayout) -> Result<IndexReport> {
    let moved = consolidate(&layout.output_dir, &layout.data_dir)?;

    let data_files = list_json_files(&layout.data_dir)?;
    let manifest = FileManifest::new(data_files.iter().cloned());

    let manifest_path = layout.manifest_path();
    write_json_atomic(&manifest_path, &manifest)?;
    tracing::info!(
        count = manifest.count(),
        path = %manifest_path.display(),
        "Updated files index"
    );

    let copied = copy_files(manifest.files(), &layout.data_dir, &layout.publish_dir)?;

    Ok(IndexReport {
        moved,
        manifest,
        manifest_path,
        copied,
    })
}

/// Read a manifest back from disk.
pub fn read_manifest(path: &Path) -> Result<FileManifest> {
    let content = fs::read_to_string(path).map_err(CollectorError::file("read", path))?;
    Ok(serde_json::from_str(&content)?)
}
