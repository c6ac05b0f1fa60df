//! Client side of the worker process.
//!
//! Every request is one NDJSON line tagged with a fresh UUID. A reader task
//! owns the worker's stdout and hands each response line to the caller
//! waiting on that id, so catalog reads and document counts issued by
//! concurrent analysis jobs share a single pipe.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::error::{WorkerError, WorkerResult};
use super::protocol::{codes, ErrorInfo, RequestEnvelope, ResponseEnvelope};
use crate::config::WorkerSettings;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Callers waiting on a response, keyed by request id.
type Waiters = Arc<Mutex<HashMap<String, oneshot::Sender<ResponseEnvelope>>>>;

/// Handle to a running worker process.
///
/// Shared behind an `Arc` by the catalog reader and the document store;
/// the process is killed when the last handle drops.
pub struct WorkerClient {
    stdin: Mutex<BufWriter<ChildStdin>>,
    waiters: Waiters,
    _child: Child,
    _router: JoinHandle<()>,
    timeout: Duration,
}

impl WorkerClient {
    /// Spawn the worker configured in `[worker]`, forwarding pool settings
    /// as command-line flags.
    pub async fn spawn_with_settings(settings: &WorkerSettings) -> WorkerResult<Self> {
        let path = resolve_worker_path(settings)?;
        let args = settings.pool.to_worker_args();
        Self::spawn(&path, &args, Duration::from_secs(settings.timeout_seconds)).await
    }

    /// Spawn the worker at `path`.
    pub async fn spawn(path: &Path, args: &[String], timeout: Duration) -> WorkerResult<Self> {
        let mut child = Command::new(path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(WorkerError::SpawnFailed)?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| WorkerError::SpawnFailed(io::Error::other("worker stdin not captured")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| WorkerError::SpawnFailed(io::Error::other("worker stdout not captured")))?;
        debug!(path = %path.display(), ?args, "spawned worker");

        let waiters = Waiters::default();
        let router = tokio::spawn(route_responses(stdout, waiters.clone()));

        Ok(Self {
            stdin: Mutex::new(BufWriter::new(stdin)),
            waiters,
            _child: child,
            _router: router,
            timeout,
        })
    }

    /// Send `params` to `method` and decode the result.
    pub async fn request<P, R>(&self, method: &str, params: P) -> WorkerResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let request = RequestEnvelope {
            id: uuid::Uuid::new_v4().to_string(),
            method: method.to_string(),
            params: serde_json::to_value(params).map_err(WorkerError::SerializeFailed)?,
        };
        let mut line = serde_json::to_string(&request).map_err(WorkerError::SerializeFailed)?;
        line.push('\n');

        let (tx, rx) = oneshot::channel();
        self.waiters.lock().await.insert(request.id.clone(), tx);

        if let Err(err) = self.write_line(&line).await {
            self.waiters.lock().await.remove(&request.id);
            return Err(err);
        }

        let response = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(WorkerError::ChannelClosed),
            Err(_) => {
                self.waiters.lock().await.remove(&request.id);
                warn!(method, timeout = self.timeout.as_secs(), "worker request timed out");
                return Err(WorkerError::Timeout(self.timeout.as_secs()));
            }
        };

        decode(response)
    }

    async fn write_line(&self, line: &str) -> WorkerResult<()> {
        let mut stdin = self.stdin.lock().await;
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(WorkerError::WriteFailed)?;
        stdin.flush().await.map_err(WorkerError::WriteFailed)
    }
}

fn resolve_worker_path(settings: &WorkerSettings) -> WorkerResult<PathBuf> {
    settings.resolve_path().ok_or_else(|| {
        WorkerError::SpawnFailed(io::Error::new(
            io::ErrorKind::NotFound,
            "worker binary not found, set worker.path in the config file",
        ))
    })
}

/// Deliver response lines to their waiters until the stream ends, then
/// fail whoever is still waiting.
async fn route_responses<R>(stdout: R, waiters: Waiters)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => {}
            Ok(Some(line)) => match serde_json::from_str::<ResponseEnvelope>(&line) {
                Ok(response) => {
                    if let Some(tx) = waiters.lock().await.remove(&response.id) {
                        let _ = tx.send(response);
                    } else {
                        debug!(id = %response.id, "response for abandoned request");
                    }
                }
                Err(err) => warn!(error = %err, "unparseable worker response"),
            },
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "worker stdout closed");
                break;
            }
        }
    }

    for (id, tx) in waiters.lock().await.drain() {
        let _ = tx.send(ResponseEnvelope {
            id,
            success: false,
            result: None,
            error: Some(ErrorInfo {
                code: codes::WORKER_EXITED.to_string(),
                message: "worker exited before responding".to_string(),
            }),
        });
    }
}

fn decode<R: DeserializeOwned>(response: ResponseEnvelope) -> WorkerResult<R> {
    if response.success {
        let result = response.result.unwrap_or(Value::Null);
        return serde_json::from_value(result).map_err(WorkerError::DeserializeFailed);
    }

    Err(match response.error {
        Some(info) => classify_error(&info),
        None => WorkerError::remote("UNKNOWN", "error response without details"),
    })
}

/// Map a worker error code onto the variants the analyzers branch on.
fn classify_error(info: &ErrorInfo) -> WorkerError {
    let message = info.message.clone();
    match info.code.as_str() {
        codes::DRIVER_NOT_FOUND => WorkerError::DriverNotFound(message),
        codes::CONNECTION_FAILED | codes::AUTH_FAILED => WorkerError::ConnectionFailed(message),
        codes::PERMISSION_DENIED => WorkerError::PermissionDenied(message),
        codes::NOT_FOUND => WorkerError::NotFound(message),
        codes::INVALID_REQUEST => WorkerError::InvalidRequest(message),
        codes::METHOD_NOT_FOUND => WorkerError::MethodNotFound(message),
        codes::WORKER_EXITED => WorkerError::WorkerExited,
        code => WorkerError::remote(code, message),
    }
}
