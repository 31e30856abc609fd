//! Serve command implementation.
//!
//! One request per stdin line, one event per stdout line. Runs execute on worker
//! threads so cancel requests are read while a run is in flight.

use anyhow::{anyhow, Result};
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use crate::engine::Engine;
use crate::events::{EngineEvent, Request};

pub fn run(engine: &Engine) -> Result<()> {
    let (tx, rx) = mpsc::channel::<EngineEvent>();

    let writer = thread::spawn(move || -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for event in rx {
            serde_json::to_writer(&mut out, &event)?;
            writeln!(out)?;
            out.flush()?;
        }
        Ok(())
    });

    let mut workers: Vec<JoinHandle<()>> = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Request>(&line) {
            Ok(request) => {
                tracing::debug!(?request, "Received request");
                if let Some(handle) = dispatch(engine, request, &tx) {
                    workers.push(handle);
                }
            }
            Err(e) => tracing::warn!("Ignoring malformed request: {}", e),
        }

        workers.retain(|w| !w.is_finished());
    }

    // Stdin closed: let in-flight runs emit their completion events.
    for worker in workers {
        if worker.join().is_err() {
            tracing::error!("Worker thread panicked");
        }
    }
    drop(tx);

    writer
        .join()
        .map_err(|_| anyhow!("event writer panicked"))?
}

/// Act on one request. Starting a run returns its worker handle.
pub fn dispatch(
    engine: &Engine,
    request: Request,
    events: &Sender<EngineEvent>,
) -> Option<JoinHandle<()>> {
    match request {
        Request::ScanStart => Some(engine.start_scan(events.clone())),
        Request::ScanCancel => {
            engine.cancel_scan();
            None
        }
        Request::CleanStart { selected_ids } => {
            Some(engine.start_clean(selected_ids, events.clone()))
        }
        Request::CleanCancel => {
            engine.cancel_clean();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::{ShellOutput, ShellRunner};
    use crate::targets::Registry;
    use std::sync::Arc;

    struct NoShell;

    impl ShellRunner for NoShell {
        fn run(&self, _script: &str) -> ShellOutput {
            ShellOutput::failed()
        }
    }

    #[test]
    fn test_dispatch_start_and_cancel() {
        let engine = Engine::new(Registry::from_targets(Vec::new()).unwrap(), Arc::new(NoShell));
        let (tx, rx) = mpsc::channel();

        let handle = dispatch(&engine, Request::ScanStart, &tx).unwrap();
        handle.join().unwrap();
        assert!(dispatch(&engine, Request::ScanCancel, &tx).is_none());
        drop(tx);

        let events: Vec<EngineEvent> = rx.iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            EngineEvent::ScanComplete(c) if !c.aborted && c.items.is_empty()
        ));
    }
}
