//! Subcommand implementations.

pub mod clean;
pub mod completions;
pub mod scan;
pub mod serve;
pub mod targets;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cancel::CancellationToken;
use crate::error::{Cancelled, SweeperError};

/// Percent-based bar on stderr, hidden when stdout carries JSON.
pub(crate) fn progress_bar(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(100);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% | {msg}")
    {
        bar.set_style(style.progress_chars("=>-"));
    }
    bar
}

/// Cancel `token` on Ctrl-C; the run stops at its next checkpoint.
pub(crate) fn cancel_on_interrupt(token: &CancellationToken) {
    let token = token.clone();
    let installed = ctrlc::set_handler(move || {
        eprintln!("\nCancelling, stopping after the current entry...");
        token.cancel();
    });

    if let Err(e) = installed {
        tracing::warn!("Failed to install Ctrl-C handler: {}", e);
    }
}

/// Error returned by a command whose run was aborted.
pub(crate) fn aborted() -> anyhow::Error {
    SweeperError::from(Cancelled).into()
}

/// Whether `err` reports an aborted run rather than a failure.
pub fn is_aborted(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<SweeperError>(), Some(SweeperError::Cancelled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_aborted_is_recognised() {
        assert!(is_aborted(&aborted()));
        assert!(!is_aborted(&SweeperError::UnknownTarget("x".into()).into()));
        assert!(!is_aborted(&SweeperError::from(ConfigError::Invalid("x".into())).into()));
        assert!(!is_aborted(&anyhow::anyhow!("operation cancelled")));
    }

    #[cfg(unix)]
    #[test]
    fn test_interrupt_cancels_token() {
        use std::time::{Duration, Instant};

        let token = CancellationToken::new();
        cancel_on_interrupt(&token);

        let status = std::process::Command::new("kill")
            .args(["-INT", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        let deadline = Instant::now() + Duration::from_secs(5);
        while !token.is_cancelled() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(token.is_cancelled());
    }
}
