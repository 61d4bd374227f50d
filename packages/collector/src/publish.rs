//! Static site publishing.
//!
//! Copies the viewer assets from the source tree into the publish directory
//! and refreshes the data files and manifest there.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::config::{SiteLayout, PRESERVED_LOG_NAME};
use crate::error::{CollectorError, Result};
use crate::index::{update_files_index, IndexReport};

/// Directory in the publish tree that survives cleaning.
const PRESERVED_DIR: &str = "assets";

/// Platform marker telling GitHub Pages not to run Jekyll.
const NOJEKYLL: &str = ".nojekyll";

/// Summary of a publish run.
#[derive(Debug)]
pub struct BuildReport {
    pub html_files: usize,
    pub css_files: usize,
    pub js_files: usize,
    pub data_files: usize,
    /// Index run result, `None` when indexing failed.
    pub index: Option<IndexReport>,
    /// Why indexing failed, if it did.
    pub index_error: Option<String>,
}

/// Remove everything from the publish directory except data files, the
/// server log and the assets directory.
pub fn clean_publish_dir(publish_dir: &Path) -> Result<()> {
    fs::create_dir_all(publish_dir)
        .map_err(CollectorError::file("create directory", publish_dir))?;

    let entries =
        fs::read_dir(publish_dir).map_err(CollectorError::file("read directory", publish_dir))?;
    for entry in entries {
        let entry = entry.map_err(CollectorError::file("read directory", publish_dir))?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        if path.is_dir() {
            if name != PRESERVED_DIR {
                fs::remove_dir_all(&path).map_err(CollectorError::file("remove", &path))?;
                tracing::debug!(dir = %name, "Removed stale directory");
            }
        } else if !name.ends_with(".json") && name != PRESERVED_LOG_NAME {
            fs::remove_file(&path).map_err(CollectorError::file("remove", &path))?;
            tracing::debug!(file = %name, "Removed stale file");
        }
    }
    Ok(())
}

/// Recursively copy `from` to `to`, replacing `to` if it exists.
pub fn replace_dir(from: &Path, to: &Path) -> Result<usize> {
    if to.exists() {
        fs::remove_dir_all(to).map_err(CollectorError::file("remove", to))?;
    }

    let mut copied = 0;
    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(from).to_path_buf();
            CollectorError::FileOperation {
                action: "walk",
                path,
                source: e.into(),
            }
        })?;

        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(CollectorError::file("create directory", &target))?;
        } else {
            fs::copy(entry.path(), &target).map_err(CollectorError::file("copy", entry.path()))?;
            copied += 1;
        }
    }
    Ok(copied)
}

fn copy_required_file(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        return Err(CollectorError::MissingAsset(from.to_path_buf()));
    }
    fs::copy(from, to).map_err(CollectorError::file("copy", from))?;
    Ok(())
}

fn copy_required_dir(from: &Path, to: &Path) -> Result<usize> {
    if !from.is_dir() {
        return Err(CollectorError::MissingAsset(from.to_path_buf()));
    }
    replace_dir(from, to)
}

/// Count files directly inside `dir` with the given extension.
fn count_with_extension(dir: &Path, extension: &str) -> usize {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == extension))
                .count()
        })
        .unwrap_or(0)
}

/// Build the static site into the publish directory.
///
/// Missing required assets (`index.html`, `css/`, `js/`) abort the build.
/// A failing index run is logged and reported, but the build still succeeds.
pub fn build_site(layout: &SiteLayout) -> Result<BuildReport> {
    let src = &layout.src_dir;
    let publish = &layout.publish_dir;

    clean_publish_dir(publish)?;

    copy_required_file(&src.join("index.html"), &publish.join("index.html"))?;
    let css = copy_required_dir(&src.join("css"), &publish.join("css"))?;
    let js = copy_required_dir(&src.join("js"), &publish.join("js"))?;
    tracing::info!(css, js, "Copied stylesheets and scripts");

    let assets = src.join(PRESERVED_DIR);
    if assets.is_dir() {
        let count = replace_dir(&assets, &publish.join(PRESERVED_DIR))?;
        tracing::info!(count, "Copied assets");
    }

    let nojekyll = src.join(NOJEKYLL);
    if nojekyll.is_file() {
        fs::copy(&nojekyll, publish.join(NOJEKYLL))
            .map_err(CollectorError::file("copy", &nojekyll))?;
    }

    let (index, index_error) = match update_files_index(layout) {
        Ok(report) => (Some(report), None),
        Err(e) => {
            tracing::warn!(error = %e, "Could not update files index, continuing without it");
            (None, Some(e.to_string()))
        }
    };

    Ok(BuildReport {
        html_files: count_with_extension(publish, "html"),
        css_files: count_with_extension(&publish.join("css"), "css"),
        js_files: count_with_extension(&publish.join("js"), "js"),
        data_files: count_with_extension(publish, "json"),
        index,
        index_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_clean_publish_dir_preserves_data_and_log() {
        let dir = tempdir().unwrap();
        let publish = dir.path();
        touch(&publish.join("old.html"));
        touch(&publish.join("simba_Penha_2025.json"));
        touch(&publish.join("files-index.json"));
        touch(&publish.join("server.log"));
        touch(&publish.join("js/old.js"));
        touch(&publish.join("assets/logo.png"));

        clean_publish_dir(publish).unwrap();

        assert!(!publish.join("old.html").exists());
        assert!(!publish.join("js").exists());
        assert!(publish.join("simba_Penha_2025.json").exists());
        assert!(publish.join("files-index.json").exists());
        assert!(publish.join("server.log").exists());
        assert!(publish.join("assets/logo.png").exists());
    }

    #[test]
    fn test_replace_dir_copies_nested_tree() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("from");
        let to = dir.path().join("to");
        touch(&from.join("a.js"));
        touch(&from.join("lib/b.js"));
        touch(&to.join("stale.js"));

        let copied = replace_dir(&from, &to).unwrap();

        assert_eq!(copied, 2);
        assert!(to.join("a.js").exists());
        assert!(to.join("lib/b.js").exists());
        assert!(!to.join("stale.js").exists());
    }

    #[test]
    fn test_missing_index_html_is_fatal() {
        let dir = tempdir().unwrap();
        let layout = SiteLayout::new(dir.path());
        touch(&layout.src_dir.join("css/style.css"));
        touch(&layout.src_dir.join("js/main.js"));

        let err = build_site(&layout).unwrap_err();
        assert!(matches!(err, CollectorError::MissingAsset(_)));
    }

    #[test]
    fn test_count_with_extension() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.css"));
        touch(&dir.path().join("b.css"));
        touch(&dir.path().join("c.js"));
        assert_eq!(count_with_extension(dir.path(), "css"), 2);
        assert_eq!(count_with_extension(&dir.path().join("missing"), "css"), 0);
    }
}
