use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{CheckCommand, CheckRunner};
use crate::config::{OUTPUT_DRAIN_AFTER_EXIT_MS, OUTPUT_DRAIN_GRACE_MS};
use crate::error::ScorerError;

/// Runs checkers as child processes, each bounded by the same timeout.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `command` in `cwd` and return its stdout.
    ///
    /// A non-zero exit is not an error here: test runners and linters exit
    /// non-zero exactly when they found failures, and still print a complete
    /// report. Errors are reserved for spawn failures and for timeouts that
    /// left nothing on stdout.
    pub async fn execute(&self, command: &CheckCommand, cwd: &Path) -> Result<String, ScorerError> {
        debug!("Running `{}` in {:?}", command, cwd);

        let mut child = build_command(command, cwd)
            .spawn()
            .map_err(|e| ScorerError::Process(format!("Failed to spawn `{}`: {}", command, e)))?;

        let stdout_buf = Arc::new(Mutex::new(Vec::new()));
        let stderr_buf = Arc::new(Mutex::new(Vec::new()));
        let stdout_handle = child
            .stdout
            .take()
            .map(|stdout| spawn_drain(stdout, stdout_buf.clone()));
        let stderr_handle = child
            .stderr
            .take()
            .map(|stderr| spawn_drain(stderr, stderr_buf.clone()));

        let timed_out = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => {
                if !status.success() {
                    debug!("`{}` exited with {}", command, status);
                }
                false
            }
            Ok(Err(e)) => {
                return Err(ScorerError::Process(format!(
                    "Failed waiting for `{}`: {}",
                    command, e
                )));
            }
            Err(_) => {
                warn!(
                    "`{}` timed out after {}s, killing",
                    command,
                    self.timeout.as_secs()
                );
                let _ = child.kill().await;
                true
            }
        };

        // A grandchild can keep the pipe open past exit or kill; wait only briefly.
        let drain_limit = if timed_out {
            Duration::from_millis(OUTPUT_DRAIN_GRACE_MS)
        } else {
            Duration::from_millis(OUTPUT_DRAIN_AFTER_EXIT_MS)
        };
        for handle in [stdout_handle, stderr_handle].into_iter().flatten() {
            let _ = tokio::time::timeout(drain_limit, handle).await;
        }

        let stdout = String::from_utf8_lossy(&stdout_buf.lock().await).into_owned();
        let stderr = String::from_utf8_lossy(&stderr_buf.lock().await).into_owned();
        if let Some(last) = stderr.lines().rev().find(|line| !line.trim().is_empty()) {
            debug!("`{}` stderr ({} bytes), last line: {}", command, stderr.len(), last);
        }

        if timed_out && stdout.trim().is_empty() {
            return Err(ScorerError::Timeout(format!(
                "`{}` produced no output within {}s",
                command,
                self.timeout.as_secs()
            )));
        }

        Ok(stdout)
    }
}

impl CheckRunner for ProcessRunner {
    async fn run(&self, command: &CheckCommand, cwd: &Path) -> String {
        match self.execute(command, cwd).await {
            Ok(stdout) => stdout,
            Err(e) => {
                warn!("{}", e);
                String::new()
            }
        }
    }
}

fn build_command(command: &CheckCommand, cwd: &Path) -> Command {
    // npx is a .cmd shim on Windows and has to go through the shell
    #[cfg(windows)]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(&command.program);
        cmd
    };

    #[cfg(not(windows))]
    let mut cmd = Command::new(&command.program);

    cmd.args(&command.args)
        .current_dir(cwd)
        .env("NO_COLOR", "1")
        .env("FORCE_COLOR", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Copy a pipe into a shared buffer as it arrives, so partial output survives a kill.
fn spawn_drain<R>(mut stream: R, sink: Arc<Mutex<Vec<u8>>>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = [0u8; 8192];
        loop {
            match stream.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => sink.lock().await.extend_from_slice(&chunk[..n]),
                Err(e) => {
                    debug!("Error reading checker output: {}", e);
                    break;
                }
            }
        }
    })
}
