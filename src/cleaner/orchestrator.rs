//! Sequential cleaning of a selection of targets.

use std::collections::HashMap;

use serde::Serialize;

use crate::cancel::CancellationToken;
use crate::error::Cancelled;
use crate::events::Progress;
use crate::scanner::SizeEstimator;
use crate::shell::ShellRunner;
use crate::targets::Target;

use super::executor::Cleaner;

/// Per-target record of one clean run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanOutcome {
    pub id: String,
    pub label: String,
    pub succeeded: bool,
    pub reclaimed_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a clean run that was not cancelled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanResult {
    pub total_reclaimed_bytes: u64,
    pub outcomes: Vec<CleanOutcome>,
}

/// Summary of cleaning results.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanSummary {
    pub success_count: usize,
    pub failed_count: usize,
    pub total_freed: u64,
}

/// Measures, cleans and re-measures each selected target in turn.
pub struct CleanOrchestrator<'a> {
    estimator: SizeEstimator<'a>,
    cleaner: Cleaner<'a>,
}

impl<'a> CleanOrchestrator<'a> {
    pub fn new(runner: &'a dyn ShellRunner) -> Self {
        Self {
            estimator: SizeEstimator::new(runner),
            cleaner: Cleaner::new(runner),
        }
    }

    /// Clean the targets named by `selected_ids`, in selection order.
    ///
    /// Ids not found in `targets` are skipped silently and report no progress.
    /// Reclaimed bytes are `before - after`, floored at zero.
    pub fn clean<F>(
        &self,
        targets: &[Target],
        selected_ids: &[String],
        token: &CancellationToken,
        mut on_progress: F,
    ) -> Result<CleanResult, Cancelled>
    where
        F: FnMut(Progress),
    {
        let by_id: HashMap<&str, &Target> = targets.iter().map(|t| (t.id.as_str(), t)).collect();
        let total = selected_ids.len();
        let mut result = CleanResult::default();

        for (index, id) in selected_ids.iter().enumerate() {
            token.check()?;

            let Some(target) = by_id.get(id.as_str()) else {
                tracing::debug!(%id, "Skipping unknown target");
                continue;
            };

            let before = self.estimator.estimate(target, token)?;
            let status = self.cleaner.clean(target, token)?;
            let after = self.estimator.estimate(target, token)?;
            let reclaimed_bytes = before.saturating_sub(after);

            if status.succeeded {
                tracing::info!(id = %target.id, reclaimed_bytes, removed = status.removed, "Cleaned target");
            } else {
                tracing::warn!(
                    id = %target.id,
                    reason = status.reason.as_deref().unwrap_or("unknown"),
                    "Clean failed"
                );
            }

            result.total_reclaimed_bytes += reclaimed_bytes;
            result.outcomes.push(CleanOutcome {
                id: target.id.clone(),
                label: target.label.clone(),
                succeeded: status.succeeded,
                reclaimed_bytes,
                error: if status.succeeded { None } else { status.reason },
            });

            on_progress(Progress::new(&target.id, index + 1, total));
        }

        Ok(result)
    }

    /// Get summary statistics from outcomes.
    pub fn summarize(outcomes: &[CleanOutcome]) -> CleanSummary {
        let mut summary = CleanSummary::default();

        for outcome in outcomes {
            if outcome.succeeded {
                summary.success_count += 1;
            } else {
                summary.failed_count += 1;
            }
            summary.total_freed += outcome.reclaimed_bytes;
        }

        summary
    }
}
