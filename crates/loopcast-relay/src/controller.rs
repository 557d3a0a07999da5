//! Relay session lifecycle: spawn, supervise, and kill the ffmpeg process.
//!
//! The controller owns at most one session at a time. The child handle is
//! never shared; liveness is observed by polling `try_wait` on every status
//! or stop call, so a process that died on its own is reported as stopped on
//! the next query rather than lingering as stale `running`.

use crate::command::{build_args, redacted_command_line, stream_url, EncoderConfig};
use crate::logbuf::LogBuffer;
use crate::{RelayError, RelayResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use utoipa::ToSchema;

/// Lifecycle state of the relay session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RelayState {
    Idle,
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl std::fmt::Display for RelayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RelayState::Idle => "idle",
            RelayState::Starting => "starting",
            RelayState::Running => "running",
            RelayState::Stopping => "stopping",
            RelayState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Snapshot of the current session for status queries.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RelayStatus {
    pub state: RelayState,
    /// Source filename of the current or most recent session
    pub source: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    /// Most recent output lines, oldest first
    pub log: Vec<String>,
}

/// Outcome of a stop request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// The process was killed (or had already exited and was reaped here).
    Stopped,
    /// Nothing was running; the call was a no-op.
    NotRunning,
}

struct Inner {
    state: RelayState,
    child: Option<Child>,
    source: Option<String>,
    started_at: Option<DateTime<Utc>>,
}

/// Supervisor for the external relay process.
pub struct RelayController {
    encoder: EncoderConfig,
    logs: LogBuffer,
    inner: Mutex<Inner>,
}

impl RelayController {
    pub fn new(encoder: EncoderConfig) -> Self {
        let logs = LogBuffer::new(encoder.log_capacity);
        RelayController {
            encoder,
            logs,
            inner: Mutex::new(Inner {
                state: RelayState::Idle,
                child: None,
                source: None,
                started_at: None,
            }),
        }
    }

    /// Start relaying `source` to the ingest endpoint under `stream_key`.
    ///
    /// Preconditions: no session in `starting`/`running`, the source exists,
    /// and the key is non-empty. Returns as soon as the process is launched;
    /// the session then runs asynchronously. A launch failure lands the
    /// session in `stopped` with the cause in the log, and the controller
    /// stays usable for a retry.
    pub async fn start(
        &self,
        source: &Path,
        stream_key: &str,
        vertical: bool,
    ) -> RelayResult<()> {
        let mut inner = self.inner.lock().await;
        self.reap_if_exited(&mut inner);

        if matches!(inner.state, RelayState::Starting | RelayState::Running) {
            return Err(RelayError::AlreadyRunning);
        }
        if stream_key.trim().is_empty() {
            return Err(RelayError::EmptyStreamKey);
        }
        if !source.is_file() {
            return Err(RelayError::SourceNotFound(source.display().to_string()));
        }

        inner.state = RelayState::Starting;

        let url = stream_url(&self.encoder.ingest_url, stream_key.trim());
        let args = build_args(source, &url, vertical, &self.encoder);
        self.logs.push(format!(
            "Launching: {}",
            redacted_command_line(&self.encoder.ffmpeg_path, &args, stream_key.trim())
        ));

        let spawned = Command::new(&self.encoder.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                self.logs
                    .push(format!("Failed to launch relay process: {}", e));
                inner.state = RelayState::Stopped;
                return Err(RelayError::SpawnFailed(e.to_string()));
            }
        };

        // One drain task per pipe; each ends when its pipe closes.
        if let Some(stdout) = child.stdout.take() {
            spawn_drain(stdout, self.logs.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_drain(stderr, self.logs.clone());
        }

        let source_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| source.display().to_string());

        tracing::info!(
            source = %source_name,
            vertical,
            pid = child.id(),
            "Relay session started"
        );

        inner.child = Some(child);
        inner.source = Some(source_name);
        inner.started_at = Some(Utc::now());
        inner.state = RelayState::Running;

        Ok(())
    }

    /// Forcibly terminate the current session.
    ///
    /// A hard kill is the documented behavior; no graceful shutdown is
    /// negotiated. With no live process this is a no-op.
    pub async fn stop(&self) -> StopOutcome {
        let mut inner = self.inner.lock().await;
        self.reap_if_exited(&mut inner);

        let Some(mut child) = inner.child.take() else {
            tracing::debug!("Stop requested with no active relay session");
            return StopOutcome::NotRunning;
        };

        inner.state = RelayState::Stopping;

        if let Err(e) = child.start_kill() {
            self.logs.push(format!("Failed to kill relay process: {}", e));
            tracing::warn!(error = %e, "Failed to signal relay process");
        }
        match child.wait().await {
            Ok(status) => {
                self.logs
                    .push(format!("Relay process terminated by operator ({})", status));
            }
            Err(e) => {
                self.logs
                    .push(format!("Failed to reap relay process: {}", e));
            }
        }

        inner.state = RelayState::Stopped;
        tracing::info!("Relay session stopped");
        StopOutcome::Stopped
    }

    /// Current state plus the last `tail` log lines.
    ///
    /// Polls the child first so a process that exited on its own is reported
    /// as stopped here, never as stale `running`.
    pub async fn status(&self, tail: usize) -> RelayStatus {
        let mut inner = self.inner.lock().await;
        self.reap_if_exited(&mut inner);

        RelayStatus {
            state: inner.state,
            source: inner.source.clone(),
            started_at: inner.started_at,
            log: self.logs.tail(tail),
        }
    }

    /// Most recent `n` output lines without the rest of the status snapshot.
    pub async fn tail_logs(&self, n: usize) -> Vec<String> {
        let mut inner = self.inner.lock().await;
        self.reap_if_exited(&mut inner);
        self.logs.tail(n)
    }

    fn reap_if_exited(&self, inner: &mut Inner) {
        if let Some(child) = inner.child.as_mut() {
            match child.try_wait() {
                Ok(Some(status)) => {
                    self.logs.push(format!("Relay process exited: {}", status));
                    tracing::warn!(%status, "Relay process exited on its own");
                    inner.child = None;
                    inner.state = RelayState::Stopped;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to poll relay process");
                }
            }
        }
    }
}

/// Drain one process pipe line-by-line into the shared log buffer.
fn spawn_drain(pipe: impl AsyncRead + Unpin + Send + 'static, logs: LogBuffer) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(pipe).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => logs.push(line),
                Ok(None) => break,
                Err(e) => {
                    logs.push(format!("relay output read error: {}", e));
                    break;
                }
            }
        }
    });
}
