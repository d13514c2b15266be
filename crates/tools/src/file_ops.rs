//! File operations: list, delete, and batch delete by extension.
//!
//! Relative paths resolve against the configured working directory.
//! Every path is canonicalized and checked against the forbidden prefixes
//! before anything touches the filesystem. The canonical form is only used
//! for that check: operations act on the path as given, so deleting a
//! symlink removes the link and never its target.

use forgecore_core::error::ToolError;
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct FileOps {
    working_dir: PathBuf,
    /// Forbidden path prefixes; `~` expands to the home directory.
    forbidden_paths: Vec<String>,
}

impl FileOps {
    pub fn new(working_dir: PathBuf, forbidden_paths: Vec<String>) -> Self {
        Self {
            working_dir,
            forbidden_paths,
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn resolve(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    /// Resolve `raw` and refuse it if it falls under a forbidden prefix.
    ///
    /// Returns the resolved, non-canonical path.
    pub fn guard(&self, raw: &str) -> Result<PathBuf, ToolError> {
        let resolved = self.resolve(raw);

        // Canonicalize so symlinks and `..` cannot dodge the prefix check.
        // Both the entry itself (under its canonical parent) and whatever it
        // points to must be allowed.
        let mut checked = Vec::with_capacity(2);
        if resolved.exists() {
            let target = resolved.canonicalize().map_err(|e| ToolError::PermissionDenied {
                path: raw.to_string(),
                reason: format!("cannot resolve path: {e}"),
            })?;
            checked.push(target);
        }
        if let Some(parent) = resolved.parent()
            && let Some(name) = resolved.file_name()
            && let Ok(canonical_parent) = parent.canonicalize()
        {
            checked.push(canonical_parent.join(name));
        }
        if checked.is_empty() {
            checked.push(resolved.clone());
        }

        for path in &checked {
            let path_str = normalize(&path.to_string_lossy());
            for forbidden in &self.forbidden_paths {
                let prefix = normalize(&expand_tilde(forbidden));
                if is_under(&path_str, &prefix) {
                    return Err(ToolError::PermissionDenied {
                        path: raw.to_string(),
                        reason: format!("matches forbidden path '{forbidden}'"),
                    });
                }
            }
        }

        Ok(resolved)
    }

    /// Sorted entry names under `raw`, one per line.
    pub async fn list_files(&self, raw: &str) -> Result<String, ToolError> {
        let dir = self.guard(raw)?;

        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| ToolError::io("listing files", e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ToolError::io("listing files", e))?
        {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        debug!(path = %dir.display(), count = names.len(), "Listed directory");

        if names.is_empty() {
            return Ok(format!("No files found in {raw}"));
        }
        Ok(names.join("\n"))
    }

    pub async fn delete_file(&self, raw: &str) -> Result<String, ToolError> {
        let path = self.guard(raw)?;

        // The entry itself: a symlink is removed, not followed.
        let meta = tokio::fs::symlink_metadata(&path)
            .await
            .map_err(|e| ToolError::io("deleting file", e))?;
        if meta.is_dir() {
            return Err(ToolError::io("deleting file", format!("'{raw}' is a directory")));
        }

        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| ToolError::io("deleting file", e))?;

        Ok(format!("Deleted file: {raw}"))
    }

    /// Delete every `*.<extension>` file directly under `dir`.
    ///
    /// Subdirectories are not descended into. A file that cannot be
    /// removed is logged and skipped; the count covers only the files
    /// actually deleted.
    pub async fn batch_delete(&self, extension: &str, dir: Option<&str>) -> Result<String, ToolError> {
        let label = match dir {
            Some(d) => d.to_string(),
            None => self.working_dir.display().to_string(),
        };
        let root = self.guard(dir.unwrap_or("."))?;

        if !root.is_dir() {
            return Err(ToolError::io(
                "deleting files",
                format!("directory '{label}' not found"),
            ));
        }
        let root = root
            .canonicalize()
            .map_err(|e| ToolError::io("deleting files", e))?;

        let pattern = format!(
            "{}/*.{}",
            Pattern::escape(&root.to_string_lossy()),
            Pattern::escape(extension)
        );
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        let matches =
            glob::glob_with(&pattern, options).map_err(|e| ToolError::io("deleting files", e))?;

        let mut deleted = 0usize;
        for entry in matches {
            let path = match entry {
                Ok(p) => p,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            // Regular files and symlinks (the link itself); never directories.
            match tokio::fs::symlink_metadata(&path).await {
                Ok(meta) if !meta.is_dir() => {}
                _ => continue,
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => deleted += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to delete file"),
            }
        }

        Ok(format!("Deleted {deleted} .{extension} files from {label}"))
    }
}

fn normalize(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let trimmed = unified.trim_end_matches('/');
    if trimmed.is_empty() && unified.starts_with('/') {
        return "/".to_string();
    }
    trimmed.to_lowercase()
}

/// Whether `path` equals `prefix` or sits below it.
fn is_under(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    if prefix == "/" {
        return path.starts_with('/');
    }
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Expand ~ to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") || path == "~" {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"));
        if let Ok(home) = home {
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}
