use regex::Regex;
use std::path::Path;
use walkdir::WalkDir;

use super::post::PostRecord;
use super::source::parse_file;
use crate::error::{ImportError, ImportErrors, Result};

/// Outcome of a directory walk: every post that parsed plus every file that did not.
#[derive(Debug, Default)]
pub struct DirectoryImport {
    pub posts: Vec<PostRecord>,
    pub errors: ImportErrors,
}

impl DirectoryImport {
    /// True when at least one candidate file failed.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse every file directly inside `dir` whose name matches `pattern`.
///
/// An empty or absent pattern matches everything. Sub-directories are skipped,
/// never descended into. Entries are visited in file name order.
///
/// Fails as a whole when the pattern does not compile (before touching the
/// file system), when `dir` cannot be listed, or when it has no entries at all.
/// Failures of individual files are collected in [`DirectoryImport::errors`]
/// and the walk carries on.
pub fn import_directory(dir: &Path, pattern: Option<&str>) -> Result<DirectoryImport> {
    let filter = match pattern {
        Some(p) if !p.is_empty() => Some(Regex::new(p)?),
        _ => None,
    };

    let metadata = std::fs::metadata(dir).map_err(|e| ImportError::io(dir, e))?;
    if !metadata.is_dir() {
        return Err(ImportError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) => entries.push(Ok(entry)),
            Err(e) if e.depth() == 0 => return Err(ImportError::io(dir, walk_io_error(e))),
            Err(e) => entries.push(Err(e)),
        }
    }

    if entries.is_empty() {
        return Err(ImportError::EmptyDirectory(dir.to_path_buf()));
    }

    let mut import = DirectoryImport::default();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let origin = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| dir.display().to_string());
                log::warn!("✗ {}: {}", origin, e);
                import.errors.push(origin.clone(), ImportError::io(origin, walk_io_error(e)));
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if let Some(rx) = &filter {
            if !rx.is_match(&file_name) {
                continue;
            }
        }

        match parse_file(entry.path()) {
            Ok(post) => import.posts.push(post),
            Err(e) => {
                log::warn!("✗ {}: {}", entry.path().display(), e);
                import.errors.push(entry.path().display().to_string(), e);
            }
        }
    }

    log::info!(
        "Imported {} posts from {} ({} failed)",
        import.posts.len(),
        dir.display(),
        import.errors.len()
    );
    Ok(import)
}

/// The I/O error behind a walkdir failure; symlink loops have none.
fn walk_io_error(error: walkdir::Error) -> std::io::Error {
    let message = error.to_string();
    error
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other(message))
}
