//! External script runner
//!
//! Runs a script with positional arguments, captures stdout and stderr, and
//! enforces a timeout. A script that overruns is killed and reaped before the
//! error is returned.

mod error;

pub use error::ScriptError;

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

use crate::logger;

/// Spawn attempts while the script is still open for writing elsewhere
const BUSY_RETRIES: u32 = 10;
const BUSY_BACKOFF: Duration = Duration::from_millis(20);

/// Captured result of a finished script
#[derive(Debug)]
pub struct ScriptOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ScriptOutput {
    /// Exit code 0. A script killed by a signal counts as failed.
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Run `script` with `args` and wait at most `timeout` for it to exit
pub async fn run(
    script: &Path,
    args: &[&str],
    timeout: Duration,
) -> Result<ScriptOutput, ScriptError> {
    let started = Instant::now();

    let mut child = spawn(script, args).await?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let finished = tokio::time::timeout(timeout, async {
        tokio::try_join!(child.wait(), read_stream(stdout), read_stream(stderr))
    })
    .await;

    match finished {
        Ok(Ok((status, stdout, stderr))) => {
            logger::log_script_finished(script, status.code(), started.elapsed());
            Ok(ScriptOutput {
                status,
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            })
        }
        Ok(Err(e)) => Err(ScriptError::Io(e)),
        Err(_) => {
            // kill() also waits, so the child is reaped here
            if let Err(e) = child.kill().await {
                logger::log_warning(&format!(
                    "Failed to kill timed out script {}: {e}",
                    script.display()
                ));
            }
            logger::log_script_timeout(script, timeout);
            Err(ScriptError::Timeout(timeout))
        }
    }
}

async fn spawn(script: &Path, args: &[&str]) -> Result<Child, ScriptError> {
    let mut command = Command::new(script);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut attempt = 0;
    loop {
        match command.spawn() {
            Ok(child) => return Ok(child),
            // ETXTBSY: a writer (or a process forked while it was writing) still holds the file
            Err(e) if e.kind() == std::io::ErrorKind::ExecutableFileBusy && attempt < BUSY_RETRIES => {
                attempt += 1;
                tokio::time::sleep(BUSY_BACKOFF).await;
            }
            Err(e) => return Err(ScriptError::from_spawn(e)),
        }
    }
}

async fn read_stream<R: AsyncRead + Unpin>(stream: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut s) = stream {
        s.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}
