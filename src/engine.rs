//! Session object driving scan and clean runs.
//!
//! The engine owns one token slot per run kind. Starting a run installs a fresh token in
//! its slot and hands a clone to the worker; cancelling flips whatever token currently
//! sits in the slot. A run that was started earlier keeps the token it was given.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::cancel::CancellationToken;
use crate::cleaner::CleanOrchestrator;
use crate::config::Config;
use crate::error::Result;
use crate::events::{CleanComplete, EngineEvent, ScanComplete};
use crate::scanner::ScanOrchestrator;
use crate::shell::{PowerShellRunner, ShellRunner};
use crate::targets::{BaseDirs, Registry, Target};

pub struct Engine {
    registry: Arc<Registry>,
    runner: Arc<dyn ShellRunner>,
    scan_token: Mutex<CancellationToken>,
    clean_token: Mutex<CancellationToken>,
}

impl Engine {
    pub fn new(registry: Registry, runner: Arc<dyn ShellRunner>) -> Self {
        Self {
            registry: Arc::new(registry),
            runner,
            scan_token: Mutex::new(CancellationToken::new()),
            clean_token: Mutex::new(CancellationToken::new()),
        }
    }

    /// Resolve base directories, build the registry and the PowerShell runner.
    pub fn from_config(config: &Config) -> Result<Self> {
        let dirs = BaseDirs::resolve(&config.paths);
        let registry = Registry::new(&dirs, &config.targets)?;
        let runner = PowerShellRunner::from_config(&config.shell);

        Ok(Self::new(registry, Arc::new(runner)))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn list_targets(&self) -> Vec<Target> {
        self.registry.list_targets()
    }

    /// Install a fresh scan token and return a clone for the new run.
    pub fn begin_scan(&self) -> CancellationToken {
        replace_token(&self.scan_token)
    }

    /// Install a fresh clean token and return a clone for the new run.
    pub fn begin_clean(&self) -> CancellationToken {
        replace_token(&self.clean_token)
    }

    pub fn cancel_scan(&self) {
        current_token(&self.scan_token).cancel();
    }

    pub fn cancel_clean(&self) {
        current_token(&self.clean_token).cancel();
    }

    /// Start a scan on a worker thread, streaming events into `events`.
    pub fn start_scan(&self, events: Sender<EngineEvent>) -> JoinHandle<()> {
        let token = self.begin_scan();
        let registry = Arc::clone(&self.registry);
        let runner = Arc::clone(&self.runner);

        thread::spawn(move || {
            scan_run(&registry, runner.as_ref(), &token, |event| {
                let _ = events.send(event);
            });
        })
    }

    /// Start a clean of `selected_ids` on a worker thread, streaming events into `events`.
    pub fn start_clean(&self, selected_ids: Vec<String>, events: Sender<EngineEvent>) -> JoinHandle<()> {
        let token = self.begin_clean();
        let registry = Arc::clone(&self.registry);
        let runner = Arc::clone(&self.runner);

        thread::spawn(move || {
            clean_run(&registry, runner.as_ref(), &selected_ids, &token, |event| {
                let _ = events.send(event);
            });
        })
    }

    /// Run a scan on the calling thread with `token`.
    ///
    /// Every event goes to `emit`; the completion payload is also returned.
    pub fn run_scan<F>(&self, token: &CancellationToken, emit: F) -> ScanComplete
    where
        F: FnMut(EngineEvent),
    {
        scan_run(&self.registry, self.runner.as_ref(), token, emit)
    }

    /// Run a clean on the calling thread with `token`.
    pub fn run_clean<F>(&self, selected_ids: &[String], token: &CancellationToken, emit: F) -> CleanComplete
    where
        F: FnMut(EngineEvent),
    {
        clean_run(&self.registry, self.runner.as_ref(), selected_ids, token, emit)
    }
}

fn replace_token(slot: &Mutex<CancellationToken>) -> CancellationToken {
    let token = CancellationToken::new();
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = token.clone();
    token
}

fn current_token(slot: &Mutex<CancellationToken>) -> CancellationToken {
    slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

fn scan_run<F>(
    registry: &Registry,
    runner: &dyn ShellRunner,
    token: &CancellationToken,
    mut emit: F,
) -> ScanComplete
where
    F: FnMut(EngineEvent),
{
    tracing::info!(targets = registry.len(), "Scan started");

    let orchestrator = ScanOrchestrator::new(runner);
    let result = orchestrator.scan(registry.targets(), token, |progress| {
        emit(EngineEvent::ScanProgress(progress.into()));
    });

    let complete = match result {
        Ok(items) => {
            tracing::info!(items = items.len(), "Scan finished");
            ScanComplete {
                aborted: false,
                items,
            }
        }
        Err(_) => {
            tracing::info!("Scan aborted");
            ScanComplete {
                aborted: true,
                items: Vec::new(),
            }
        }
    };

    emit(EngineEvent::ScanComplete(complete.clone()));
    complete
}

fn clean_run<F>(
    registry: &Registry,
    runner: &dyn ShellRunner,
    selected_ids: &[String],
    token: &CancellationToken,
    mut emit: F,
) -> CleanComplete
where
    F: FnMut(EngineEvent),
{
    tracing::info!(selected = selected_ids.len(), "Clean started");

    let orchestrator = CleanOrchestrator::new(runner);
    let result = orchestrator.clean(registry.targets(), selected_ids, token, |progress| {
        emit(EngineEvent::CleanProgress(progress.into()));
    });

    let complete = match result {
        Ok(result) => {
            tracing::info!(freed_bytes = result.total_reclaimed_bytes, "Clean finished");
            CleanComplete {
                aborted: false,
                freed_bytes: result.total_reclaimed_bytes,
                details: result.outcomes,
            }
        }
        Err(_) => {
            tracing::info!("Clean aborted");
            CleanComplete {
                aborted: true,
                freed_bytes: 0,
                details: Vec::new(),
            }
        }
    };

    emit(EngineEvent::CleanComplete(complete.clone()));
    complete
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ShellOutput;

    struct NoShell;

    impl ShellRunner for NoShell {
        fn run(&self, _script: &str) -> ShellOutput {
            ShellOutput::failed()
        }
    }

    fn engine() -> Engine {
        Engine::new(Registry::from_targets(Vec::new()).unwrap(), Arc::new(NoShell))
    }

    #[test]
    fn test_new_run_gets_fresh_token() {
        let engine = engine();

        let first = engine.begin_scan();
        engine.cancel_scan();
        let second = engine.begin_scan();

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[test]
    fn test_cancel_only_hits_latest_run() {
        let engine = engine();

        let first = engine.begin_clean();
        let second = engine.begin_clean();
        engine.cancel_clean();

        assert!(!first.is_cancelled());
        assert!(second.is_cancelled());
    }

    #[test]
    fn test_scan_and_clean_slots_are_independent() {
        let engine = engine();

        let scan = engine.begin_scan();
        let clean = engine.begin_clean();
        engine.cancel_scan();

        assert!(scan.is_cancelled());
        assert!(!clean.is_cancelled());
    }

    #[test]
    fn test_empty_registry_scan_completes() {
        let engine = engine();
        let mut events = Vec::new();

        let complete = engine.run_scan(&CancellationToken::new(), |e| events.push(e));

        assert!(!complete.aborted);
        assert_eq!(events.len(), 1);
        assert!(events[0].is_completion());
    }
}
