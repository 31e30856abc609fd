//! Sequential scan over the registry.

use serde::Serialize;

use crate::cancel::CancellationToken;
use crate::error::Cancelled;
use crate::events::Progress;
use crate::shell::ShellRunner;
use crate::targets::Target;

use super::size::SizeEstimator;

/// A target together with the size measured for it during one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanItem {
    #[serde(flatten)]
    pub target: Target,
    pub size_bytes: u64,
}

/// Measures every target in order, one at a time.
pub struct ScanOrchestrator<'a> {
    estimator: SizeEstimator<'a>,
}

impl<'a> ScanOrchestrator<'a> {
    pub fn new(runner: &'a dyn ShellRunner) -> Self {
        Self {
            estimator: SizeEstimator::new(runner),
        }
    }

    /// Size all `targets`, reporting progress after each one.
    ///
    /// Returns every item or, once the token is cancelled, nothing at all.
    pub fn scan<F>(
        &self,
        targets: &[Target],
        token: &CancellationToken,
        mut on_progress: F,
    ) -> Result<Vec<ScanItem>, Cancelled>
    where
        F: FnMut(Progress),
    {
        let total = targets.len();
        let mut items = Vec::with_capacity(total);

        for (index, target) in targets.iter().enumerate() {
            token.check()?;

            let size_bytes = self.estimator.estimate(target, token)?;
            tracing::debug!(id = %target.id, size_bytes, "Measured target");

            items.push(ScanItem {
                target: target.clone(),
                size_bytes,
            });

            on_progress(Progress::new(&target.id, index + 1, total));
        }

        Ok(items)
    }
}
