//! External shell-command runner.
//!
//! The engine only needs `(ok, stdout)` from a single bounded invocation, so the
//! contract is a small trait that tests can script.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::ShellConfig;

/// Outcome of one shell invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOutput {
    /// Process started, exited successfully and before the deadline.
    pub ok: bool,
    /// Trimmed standard output.
    pub stdout: String,
}

impl ShellOutput {
    pub fn failed() -> Self {
        Self::default()
    }
}

/// Runs one script and reports `(ok, stdout)`. Implementations must never hang past
/// their own deadline.
pub trait ShellRunner: Send + Sync {
    fn run(&self, script: &str) -> ShellOutput;
}

/// Interval between exit polls while waiting on a child.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs scripts through PowerShell (`-NoProfile -ExecutionPolicy Bypass -Command`).
#[derive(Debug, Clone)]
pub struct PowerShellRunner {
    program: String,
    timeout: Duration,
}

impl PowerShellRunner {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new(
            config.program.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn command(&self, script: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-NoProfile", "-ExecutionPolicy", "Bypass", "-Command", script])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        cmd
    }
}

impl ShellRunner for PowerShellRunner {
    fn run(&self, script: &str) -> ShellOutput {
        let child = match self.command(script).spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(program = %self.program, "Failed to start shell: {}", e);
                return ShellOutput::failed();
            }
        };

        run_with_deadline(child, self.timeout)
    }
}

/// Wait for `child` until `timeout` elapses, killing it on expiry.
///
/// Stdout is drained on a helper thread so a chatty child cannot block on a full pipe
/// while we poll for its exit.
fn run_with_deadline(mut child: Child, timeout: Duration) -> ShellOutput {
    let (tx, rx) = mpsc::channel();
    if let Some(mut stdout) = child.stdout.take() {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stdout.read_to_end(&mut buf);
            let _ = tx.send(buf);
        });
    } else {
        let _ = tx.send(Vec::new());
    }

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) if Instant::now() >= deadline => {
                tracing::warn!(timeout_secs = timeout.as_secs(), "Shell command timed out");
                reap(&mut child);
                break None;
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                tracing::warn!("Failed to wait for shell: {}", e);
                reap(&mut child);
                break None;
            }
        }
    };

    let Some(status) = status else {
        return ShellOutput::failed();
    };

    // The reader finishes once the pipe closes; a grandchild holding it open gets a
    // bounded grace period.
    let stdout = rx
        .recv_timeout(Duration::from_secs(1))
        .map(|buf| String::from_utf8_lossy(&buf).trim().to_string())
        .unwrap_or_default();

    ShellOutput {
        ok: status.success(),
        stdout,
    }
}

/// Kill `child` and collect its exit status so it does not linger as a zombie.
fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
