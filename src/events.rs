//! Messages exchanged with the surrounding shell.
//!
//! A run emits zero or more progress events followed by exactly one completion event.
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::cleaner::CleanOutcome;
use crate::scanner::ScanItem;

/// Position of a run after one target finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub target_id: String,
    /// `round(100 * completed / total)`
    pub percent: u8,
}

impl Progress {
    pub fn new(target_id: &str, completed: usize, total: usize) -> Self {
        Self {
            target_id: target_id.to_string(),
            percent: percent(completed, total),
        }
    }
}

/// Rounded percentage, half away from zero. An empty run counts as done.
pub fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let completed = completed.min(total) as u64;
    let total = total as u64;
    ((200 * completed + total) / (2 * total)) as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPayload {
    pub target_id: String,
    pub percent: u8,
}

impl From<Progress> for ProgressPayload {
    fn from(progress: Progress) -> Self {
        Self {
            target_id: progress.target_id,
            percent: progress.percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanComplete {
    pub aborted: bool,
    pub items: Vec<ScanItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanComplete {
    pub aborted: bool,
    pub freed_bytes: u64,
    pub details: Vec<CleanOutcome>,
}

/// Event streamed to the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum EngineEvent {
    ScanProgress(ProgressPayload),
    ScanComplete(ScanComplete),
    CleanProgress(ProgressPayload),
    CleanComplete(CleanComplete),
}

impl EngineEvent {
    /// True for the final event of a run.
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            EngineEvent::ScanComplete(_) | EngineEvent::CleanComplete(_)
        )
    }
}

/// Command issued by the shell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command")]
pub enum Request {
    #[serde(rename = "scan.start")]
    ScanStart,
    #[serde(rename = "scan.cancel")]
    ScanCancel,
    #[serde(rename = "clean.start")]
    CleanStart {
        #[serde(default, rename = "selectedIds")]
        selected_ids: Vec<String>,
    },
    #[serde(rename = "clean.cancel")]
    CleanCancel,
}
