//! Deletion strategies, one per storage shape.
//!
//! A failure to remove one entry never stops the others. Whether it fails the target
//! depends on the shape: emptying a directory succeeds once the directory could be
//! listed, while pattern deletion fails if any matching file survives.

use std::fs;
use std::io;
use std::path::Path;

use crate::cancel::CancellationToken;
use crate::error::Cancelled;
use crate::scanner::PROFILE_CACHE_DIR;
use crate::shell::ShellRunner;
use crate::targets::{FilePattern, Method, Target};
use crate::trash;

/// Outcome of one cleaning step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanStatus {
    /// The step completed without an unrecoverable error.
    pub succeeded: bool,
    /// Entries removed.
    pub removed: usize,
    /// Entries that could not be removed.
    pub failed: usize,
    /// First reason the step failed, kept for diagnostics.
    pub reason: Option<String>,
}

impl CleanStatus {
    fn processed() -> Self {
        Self {
            succeeded: true,
            ..Self::default()
        }
    }

    fn failed(reason: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            reason: Some(reason.into()),
            ..Self::default()
        }
    }

    fn fail(&mut self, reason: String) {
        self.succeeded = false;
        self.reason.get_or_insert(reason);
    }

    /// Fold a sub-step in: success only if both succeeded.
    fn merge(&mut self, other: CleanStatus) {
        self.removed += other.removed;
        self.failed += other.failed;
        if !other.succeeded {
            self.succeeded = false;
        }
        if self.reason.is_none() {
            self.reason = other.reason;
        }
    }
}

fn remove_entry(path: &Path, is_dir: bool) -> io::Result<()> {
    let result = if is_dir {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Remove everything inside `path`, keeping `path` itself.
///
/// Links directly inside `path` are left alone and never followed. The directory is
/// recreated afterwards if it disappeared, so the owning application still finds it.
pub fn empty_directory(path: &Path, token: &CancellationToken) -> Result<CleanStatus, Cancelled> {
    token.check()?;

    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(path = %path.display(), "Nothing to clean: {}", e);
            return Ok(CleanStatus::failed(format!(
                "cannot list {}: {}",
                path.display(),
                e
            )));
        }
    };

    let mut status = CleanStatus::processed();
    for entry in entries {
        token.check()?;

        let Ok(entry) = entry else {
            status.failed += 1;
            continue;
        };
        let entry_path = entry.path();
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(path = %entry_path.display(), "Cannot inspect entry: {}", e);
                status.failed += 1;
                continue;
            }
        };

        if file_type.is_symlink() {
            tracing::debug!(path = %entry_path.display(), "Leaving symlink in place");
            continue;
        }

        match remove_entry(&entry_path, file_type.is_dir()) {
            Ok(()) => status.removed += 1,
            Err(e) => {
                tracing::warn!(path = %entry_path.display(), "Failed to remove: {}", e);
                status.failed += 1;
            }
        }
    }

    if !path.exists() {
        if let Err(e) = fs::create_dir_all(path) {
            tracing::warn!(path = %path.display(), "Failed to recreate directory: {}", e);
        }
    }

    Ok(status)
}

/// Empty `<profile>/cache2` for every profile directory below `base`.
///
/// Fails if the base cannot be listed or any profile's cache could not be emptied.
pub fn empty_multi_profile_cache(
    base: &Path,
    token: &CancellationToken,
) -> Result<CleanStatus, Cancelled> {
    token.check()?;

    let entries = match fs::read_dir(base) {
        Ok(entries) => entries,
        Err(e) => {
            return Ok(CleanStatus::failed(format!(
                "cannot list {}: {}",
                base.display(),
                e
            )))
        }
    };

    let mut status = CleanStatus::processed();
    for entry in entries {
        token.check()?;

        let Ok(entry) = entry else { continue };
        if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }

        let profile = empty_directory(&entry.path().join(PROFILE_CACHE_DIR), token)?;
        status.merge(profile);
    }

    Ok(status)
}

/// Delete the immediate files of `dir` whose name matches `pattern`.
///
/// Fails if `dir` cannot be listed or any matching file could not be deleted.
pub fn delete_pattern_matches(
    dir: &Path,
    token: &CancellationToken,
    pattern: &FilePattern,
) -> Result<CleanStatus, Cancelled> {
    token.check()?;

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            return Ok(CleanStatus::failed(format!(
                "cannot list {}: {}",
                dir.display(),
                e
            )))
        }
    };

    let mut status = CleanStatus::processed();
    for entry in entries {
        token.check()?;

        let Ok(entry) = entry else { continue };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if !pattern.matches(&entry.file_name().to_string_lossy()) {
            continue;
        }

        let path = entry.path();
        match remove_entry(&path, false) {
            Ok(()) => status.removed += 1,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to delete: {}", e);
                status.failed += 1;
                status.fail(format!("cannot delete {}: {}", path.display(), e));
            }
        }
    }

    Ok(status)
}

/// Empty the OS trash through the external shell.
pub fn empty_system_trash(
    runner: &dyn ShellRunner,
    token: &CancellationToken,
) -> Result<CleanStatus, Cancelled> {
    token.check()?;
    let emptied = trash::empty(runner);
    token.check()?;

    Ok(if emptied {
        CleanStatus::processed()
    } else {
        CleanStatus::failed("trash command failed")
    })
}

/// Dispatches a target to the deletion strategy for its method.
pub struct Cleaner<'a> {
    runner: &'a dyn ShellRunner,
}

impl<'a> Cleaner<'a> {
    pub fn new(runner: &'a dyn ShellRunner) -> Self {
        Self { runner }
    }

    pub fn clean(&self, target: &Target, token: &CancellationToken) -> Result<CleanStatus, Cancelled> {
        match &target.method {
            Method::PlainDirectory { path } => empty_directory(path, token),
            Method::MultiProfileCache { path } => empty_multi_profile_cache(path, token),
            Method::PatternMatch { path, pattern } => delete_pattern_matches(path, token, pattern),
            Method::SystemTrash => empty_system_trash(self.runner, token),
        }
    }
}
