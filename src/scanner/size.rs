//! Reclaimable-size estimation, one function per storage shape.
//!
//! Every estimator is best-effort: a missing or unreadable location is zero-sized and a
//! per-entry stat failure contributes nothing. The only error is [`Cancelled`], checked
//! once per visited entry.

use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::cancel::CancellationToken;
use crate::error::Cancelled;
use crate::shell::ShellRunner;
use crate::targets::{FilePattern, Method, Target};
use crate::trash;

/// Sub-directory of each browser profile holding its disk cache.
pub const PROFILE_CACHE_DIR: &str = "cache2";

/// Total size of everything below `path`.
///
/// A plain file yields its own length. Symbolic links below the root are neither
/// followed nor counted; unreadable sub-directories are skipped.
pub fn plain_directory(path: &Path, token: &CancellationToken) -> Result<u64, Cancelled> {
    token.check()?;

    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(_) => return Ok(0),
    };
    if !metadata.is_dir() {
        return Ok(metadata.len());
    }

    let mut total = 0u64;
    for entry in WalkDir::new(path).min_depth(1).follow_links(false) {
        token.check()?;

        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::debug!("Skipping unreadable entry: {}", err);
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_symlink() || file_type.is_dir() {
            continue;
        }

        if let Ok(metadata) = entry.metadata() {
            total += metadata.len();
        }
    }

    Ok(total)
}

/// Sum of `<profile>/cache2` over every profile directory directly below `base`.
pub fn multi_profile_cache(base: &Path, token: &CancellationToken) -> Result<u64, Cancelled> {
    token.check()?;

    let entries = match fs::read_dir(base) {
        Ok(entries) => entries,
        Err(_) => return Ok(0),
    };

    let mut total = 0u64;
    for entry in entries {
        token.check()?;

        let Ok(entry) = entry else { continue };
        if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }

        total += plain_directory(&entry.path().join(PROFILE_CACHE_DIR), token)?;
    }

    Ok(total)
}

/// Sum of the immediate files of `dir` whose name matches `pattern`.
pub fn pattern_match(
    dir: &Path,
    token: &CancellationToken,
    pattern: &FilePattern,
) -> Result<u64, Cancelled> {
    token.check()?;

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Ok(0),
    };

    let mut total = 0u64;
    for entry in entries {
        token.check()?;

        let Ok(entry) = entry else { continue };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if !pattern.matches(&entry.file_name().to_string_lossy()) {
            continue;
        }

        if let Ok(metadata) = entry.metadata() {
            total += metadata.len();
        }
    }

    Ok(total)
}

/// Trash size via the external shell. The call itself is not interruptible; the token
/// is checked on both sides of it.
pub fn system_trash(runner: &dyn ShellRunner, token: &CancellationToken) -> Result<u64, Cancelled> {
    token.check()?;
    let size = trash::query_size(runner);
    token.check()?;
    Ok(size)
}

/// Dispatches a target to the estimator for its method.
pub struct SizeEstimator<'a> {
    runner: &'a dyn ShellRunner,
}

impl<'a> SizeEstimator<'a> {
    pub fn new(runner: &'a dyn ShellRunner) -> Self {
        Self { runner }
    }

    /// Reclaimable bytes for `target`.
    pub fn estimate(&self, target: &Target, token: &CancellationToken) -> Result<u64, Cancelled> {
        match &target.method {
            Method::PlainDirectory { path } => plain_directory(path, token),
            Method::MultiProfileCache { path } => multi_profile_cache(path, token),
            Method::PatternMatch { path, pattern } => pattern_match(path, token, pattern),
            Method::SystemTrash => system_trash(self.runner, token),
        }
    }
}
