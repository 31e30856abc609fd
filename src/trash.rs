//! Recycle Bin size query and emptying, delegated to the external shell.

use crate::shell::ShellRunner;

/// Sums the length of every file under each drive's `$Recycle.Bin`.
pub const SIZE_SCRIPT: &str = "try { $ErrorActionPreference='SilentlyContinue'; \
(Get-PSDrive -PSProvider FileSystem | ForEach-Object { $p = Join-Path $_.Root '$Recycle.Bin'; \
if (Test-Path $p) { Get-ChildItem -Force -Recurse -ErrorAction SilentlyContinue $p } } | \
Where-Object { -not $_.PSIsContainer } | Measure-Object -Property Length -Sum).Sum } catch { 0 }";

/// Empties the bin on all drives and prints [`EMPTY_MARKER`] on success.
pub const EMPTY_SCRIPT: &str =
    "try { Clear-RecycleBin -Force -ErrorAction SilentlyContinue; 'OK' } catch { 'ERR' }";

/// Marker the empty script prints when it completed.
pub const EMPTY_MARKER: &str = "OK";

/// Bytes currently held in the trash. Any failure reads as 0.
pub fn query_size(runner: &dyn ShellRunner) -> u64 {
    let output = runner.run(SIZE_SCRIPT);
    if !output.ok {
        tracing::debug!("Trash size query failed");
        return 0;
    }
    parse_size(&output.stdout)
}

/// Empty the trash; `true` only if the command succeeded and confirmed it.
pub fn empty(runner: &dyn ShellRunner) -> bool {
    let output = runner.run(EMPTY_SCRIPT);
    let emptied = output.ok && output.stdout.contains(EMPTY_MARKER);
    if !emptied {
        tracing::warn!(stdout = %output.stdout, "Emptying the trash failed");
    }
    emptied
}

/// Leading decimal digits of the trimmed output; anything else is 0.
fn parse_size(stdout: &str) -> u64 {
    let trimmed = stdout.trim();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().unwrap_or(0)
}
