//! JSON file writing.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::{CollectorError, Result};

/// Serialize a value as two-space indented JSON.
///
/// Non-ASCII characters are written as-is, not escaped.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write a value as indented JSON to `path`.
///
/// Uses atomic write pattern: writes to a hidden temp file next to the target,
/// syncs to disk, then renames over the target. An existing file is replaced.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = to_json_pretty(value)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(CollectorError::file("create directory", dir))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.json".to_string());
    let temp_file = dir.join(format!(".{file_name}.tmp"));

    {
        let mut file =
            File::create(&temp_file).map_err(CollectorError::file("create", &temp_file))?;
        file.write_all(content.as_bytes())
            .map_err(CollectorError::file("write", &temp_file))?;
        file.sync_all()
            .map_err(CollectorError::file("sync", &temp_file))?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path).map_err(CollectorError::file("remove", path))?;
    }

    if let Err(e) = fs::rename(&temp_file, path) {
        let _ = fs::remove_file(&temp_file);
        return Err(CollectorError::file("rename", path)(e));
    }

    Ok(())
}
