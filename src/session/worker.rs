//! Background worker context.
//!
//! The worker runs in an isolated thread with no file-decoding capability;
//! callers submit raw pixel buffers plus a configuration and receive an
//! encoded blob (or an error message) keyed by request id. Requests are
//! processed sequentially in submission order inside the one worker, but
//! callers must match responses by id, never by position. The worker sends
//! exactly one response per request and never sends unsolicited messages.

use std::collections::HashSet;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::FrameConfig;
use crate::encode::RenderResult;
use crate::foundation::error::{FrameError, FrameResult};
use crate::render::cpu::CpuBackend;
use crate::render::render_blob;
use crate::source::RawImage;

/// A message submitted to the worker context.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkRequest {
    /// Render one image under one configuration.
    Process {
        /// Caller-chosen request id echoed in the response.
        id: u64,
        /// Straight-alpha pixel buffer; the worker premultiplies it itself.
        image: RawImage,
        /// Frame configuration for this render.
        config: FrameConfig,
    },
}

/// A message answered by the worker context, exactly one per request id.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkResponse {
    /// The render succeeded.
    Result {
        /// Echoed request id.
        id: u64,
        /// Encoded output blob.
        blob: RenderResult,
    },
    /// The render failed; other requests are unaffected.
    Error {
        /// Echoed request id.
        id: u64,
        /// Human-readable failure description.
        message: String,
    },
}

impl WorkResponse {
    /// The request id this response answers.
    pub fn id(&self) -> u64 {
        match self {
            WorkResponse::Result { id, .. } | WorkResponse::Error { id, .. } => *id,
        }
    }
}

/// Completion bookkeeping for the submitting side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerProgress {
    /// Responses received so far (successes and failures both count).
    pub completed: u64,
    /// Requests submitted so far.
    pub total: u64,
}

/// Handle to one background render worker.
///
/// Dropping the handle closes the request channel; the worker drains what it
/// already received and exits, and the drop joins it.
pub struct FrameWorker {
    tx: Option<mpsc::Sender<WorkRequest>>,
    rx: mpsc::Receiver<WorkResponse>,
    handle: Option<JoinHandle<()>>,
    next_id: u64,
    pending: HashSet<u64>,
    completed: u64,
    submitted: u64,
}

impl FrameWorker {
    /// Spawn the worker thread with its own private rendering backend.
    pub fn spawn() -> FrameResult<Self> {
        let (req_tx, req_rx) = mpsc::channel::<WorkRequest>();
        let (resp_tx, resp_rx) = mpsc::channel::<WorkResponse>();

        let handle = std::thread::Builder::new()
            .name("enframe-worker".to_owned())
            .spawn(move || worker_loop(req_rx, resp_tx))
            .map_err(|e| {
                FrameError::surface_unavailable(format!("failed to spawn worker thread: {e}"))
            })?;

        Ok(Self {
            tx: Some(req_tx),
            rx: resp_rx,
            handle: Some(handle),
            next_id: 0,
            pending: HashSet::new(),
            completed: 0,
            submitted: 0,
        })
    }

    /// Submit one render task; returns the id its response will carry.
    pub fn submit(&mut self, image: RawImage, config: FrameConfig) -> FrameResult<u64> {
        let id = self.next_id;
        self.next_id += 1;

        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| FrameError::surface_unavailable("worker already shut down"))?;
        tx.send(WorkRequest::Process { id, image, config })
            .map_err(|_| FrameError::surface_unavailable("worker is not accepting requests"))?;

        self.pending.insert(id);
        self.submitted += 1;
        Ok(id)
    }

    /// Wait up to `timeout` for the next response.
    ///
    /// Returns `Ok(None)` on timeout. Completion order is not guaranteed to
    /// match submission order; match responses by [`WorkResponse::id`].
    pub fn recv_timeout(&mut self, timeout: Duration) -> FrameResult<Option<WorkResponse>> {
        match self.rx.recv_timeout(timeout) {
            Ok(resp) => {
                self.pending.remove(&resp.id());
                self.completed += 1;
                Ok(Some(resp))
            }
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(FrameError::surface_unavailable(
                "worker terminated with responses outstanding",
            )),
        }
    }

    /// Number of requests still awaiting a response.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Snapshot of completed-vs-submitted counts.
    pub fn progress(&self) -> WorkerProgress {
        WorkerProgress {
            completed: self.completed,
            total: self.submitted,
        }
    }
}

impl Drop for FrameWorker {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(rx: mpsc::Receiver<WorkRequest>, tx: mpsc::Sender<WorkResponse>) {
    let mut backend = CpuBackend::new();
    while let Ok(WorkRequest::Process { id, image, config }) = rx.recv() {
        let response = match process_one(&mut backend, image, &config) {
            Ok(blob) => WorkResponse::Result { id, blob },
            Err(e) => WorkResponse::Error {
                id,
                message: e.to_string(),
            },
        };
        if tx.send(response).is_err() {
            // Submitting side went away; nothing left to answer.
            break;
        }
    }
}

fn process_one(
    backend: &mut CpuBackend,
    image: RawImage,
    config: &FrameConfig,
) -> FrameResult<RenderResult> {
    let prepared = image.prepare()?;
    render_blob(&prepared, config, backend)
}
