//! Tracked-file enumeration
//!
//! The canonical "which files exist" list comes from version control, not
//! from walking the directory, so untracked build output and ignored files
//! never reach the index.

use crate::error::{Result, SemdexError};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::RwLock;

/// Source of the project's tracked file set
pub trait TrackedFileSource: Send + Sync {
    /// Project-relative, '/'-separated paths of every tracked file.
    ///
    /// Failure means the set is unknown and must abort a full indexing run.
    fn tracked_files(&self) -> Result<Vec<String>>;
}

/// Tracked files according to `git ls-files`
#[derive(Debug, Clone)]
pub struct GitTrackedFiles {
    root: PathBuf,
}

impl GitTrackedFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TrackedFileSource for GitTrackedFiles {
    fn tracked_files(&self) -> Result<Vec<String>> {
        let output = Command::new("git")
            .args(["ls-files", "--cached", "--others", "--exclude-standard", "-z"])
            .current_dir(&self.root)
            .output()
            .map_err(|e| SemdexError::Enumeration(format!("failed to run git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SemdexError::Enumeration(format!(
                "git ls-files failed in {}: {}",
                self.root.display(),
                stderr.trim()
            )));
        }

        let mut paths: Vec<String> = parse_nul_separated(&output.stdout)
            .into_iter()
            // Deleted but not yet staged: let the reconciler drop it
            .filter(|p| self.root.join(p).is_file())
            .collect();
        paths.sort();
        paths.dedup();
        Ok(paths)
    }
}

fn parse_nul_separated(stdout: &[u8]) -> Vec<String> {
    stdout
        .split(|b| *b == 0)
        .filter(|entry| !entry.is_empty())
        .map(|entry| String::from_utf8_lossy(entry).into_owned())
        .collect()
}

/// Fixed tracked set supplied by the caller
#[derive(Debug, Default)]
pub struct StaticTrackedFiles {
    paths: RwLock<Vec<String>>,
}

impl StaticTrackedFiles {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: RwLock::new(paths.into_iter().map(Into::into).collect()),
        }
    }

    /// Replace the tracked set
    pub fn set<I, S>(&self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut guard = self.paths.write().unwrap_or_else(|p| p.into_inner());
        *guard = paths.into_iter().map(Into::into).collect();
    }
}

impl TrackedFileSource for StaticTrackedFiles {
    fn tracked_files(&self) -> Result<Vec<String>> {
        let guard = self.paths.read().unwrap_or_else(|p| p.into_inner());
        Ok(guard.clone())
    }
}
