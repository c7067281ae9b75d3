// src/platform.rs
// =============================================================================
// File-system helpers shared by the link tools, the steps and deploy.
//
// Walking uses the `ignore` crate with every filter switched off: the build
// output lives under a hidden .docfx/ folder and must be visited in full,
// regardless of any .gitignore around it.
// =============================================================================

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

// Lists every file under a root, sorted so runs are reproducible
pub fn all_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

// Lists files under a root whose extension is one of `extensions`
//
// Extensions are given without the dot and compared case-insensitively.
pub fn files_with_extensions(root: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    all_files(root)
        .into_iter()
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        })
        .collect()
}

/// Copies the contents of `source` into `target`, overwriting existing files.
///
/// Returns the number of files copied.
pub fn copy_dir_recursive(source: &Path, target: &Path) -> io::Result<usize> {
    let mut copied = 0;
    fs::create_dir_all(target)?;

    for file in all_files(source) {
        let relative = file
            .strip_prefix(source)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let destination = target.join(relative);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        tracing::debug!("Copying {} => {}", file.display(), destination.display());
        fs::copy(&file, &destination)?;
        copied += 1;
    }

    Ok(copied)
}

/// Deletes every entry directly inside `dir` except the names in `keep`.
pub fn clear_dir_except(dir: &Path, keep: &[&str]) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if keep.iter().any(|k| entry.file_name() == *k) {
            continue;
        }
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

// Removes a directory tree if it exists; returns whether anything was removed
pub fn remove_dir_if_exists(dir: &Path) -> io::Result<bool> {
    if dir.is_dir() {
        fs::remove_dir_all(dir)?;
        return Ok(true);
    }
    Ok(false)
}

// Removes a single file if it exists; returns whether anything was removed
pub fn remove_file_if_exists(file: &Path) -> io::Result<bool> {
    if file.is_file() {
        fs::remove_file(file)?;
        return Ok(true);
    }
    Ok(false)
}

/// Path of `dir` relative to `root` with forward slashes and a trailing slash.
///
/// `root` itself maps to the empty string.
pub fn relative_dir(root: &Path, dir: &Path) -> String {
    let relative = dir.strip_prefix(root).unwrap_or(dir);
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if parts.is_empty() {
        String::new()
    } else {
        format!("{}/", parts.join("/"))
    }
}
