//! Single-writer background queue for file writes and removals.
//!
//! # Responsibility
//! - Move file I/O off the calling thread.
//! - Apply jobs strictly in enqueue order.
//!
//! # Invariants
//! - Each write carries bytes captured at enqueue time; later mutations cannot
//!   change an in-flight write.
//! - Writes replace the target through a `.tmp` sibling and rename.
//! - A failed job is logged once and never retried.

use crossbeam_channel as chan;
use log::{debug, error, warn};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const SAVE_WORKER_NAME: &str = "dayplan-save";
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);
const TEMP_SUFFIX: &str = ".tmp";

enum SaveJob {
    Write { path: PathBuf, bytes: Vec<u8> },
    Remove { path: PathBuf },
    Flush(chan::Sender<()>),
    Shutdown,
}

/// Cloneable sender side handed to components that persist state.
#[derive(Debug, Clone)]
pub struct SaveHandle {
    tx: chan::Sender<SaveJob>,
}

impl std::fmt::Debug for SaveJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Write { path, bytes } => f
                .debug_struct("Write")
                .field("path", path)
                .field("bytes", &bytes.len())
                .finish(),
            Self::Remove { path } => f.debug_struct("Remove").field("path", path).finish(),
            Self::Flush(_) => f.write_str("Flush"),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

impl SaveHandle {
    /// Enqueues a full replacement of `path` with `bytes`.
    pub fn write(&self, path: PathBuf, bytes: Vec<u8>) {
        self.send(SaveJob::Write { path, bytes });
    }

    /// Enqueues removal of `path`. A missing file is not an error.
    pub fn remove(&self, path: PathBuf) {
        self.send(SaveJob::Remove { path });
    }

    /// Blocks until every job enqueued before this call has been applied.
    ///
    /// Returns `false` when the worker is gone or did not answer within the
    /// flush timeout.
    pub fn flush(&self) -> bool {
        let (ack_tx, ack_rx) = chan::bounded(1);
        if self.tx.send(SaveJob::Flush(ack_tx)).is_err() {
            warn!("event=save_flush module=storage status=error error_code=queue_closed");
            return false;
        }
        match ack_rx.recv_timeout(FLUSH_TIMEOUT) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "event=save_flush module=storage status=error error_code=flush_unacknowledged error={}",
                    err
                );
                false
            }
        }
    }

    fn send(&self, job: SaveJob) {
        if let Err(err) = self.tx.send(job) {
            error!(
                "event=save_enqueue module=storage status=error error_code=queue_closed job={:?}",
                err.into_inner()
            );
        }
    }
}

/// Owner of the save worker thread.
pub struct SaveQueue {
    handle: SaveHandle,
    worker: Option<JoinHandle<()>>,
}

impl SaveQueue {
    /// Spawns the save worker.
    ///
    /// # Errors
    /// - Returns the OS error when the worker thread cannot be spawned.
    pub fn start() -> io::Result<Self> {
        let (tx, rx) = chan::unbounded::<SaveJob>();
        let worker = thread::Builder::new()
            .name(SAVE_WORKER_NAME.to_string())
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    match job {
                        SaveJob::Write { path, bytes } => write_replacing(&path, &bytes),
                        SaveJob::Remove { path } => remove_if_present(&path),
                        SaveJob::Flush(ack) => {
                            let _ = ack.send(());
                        }
                        SaveJob::Shutdown => break,
                    }
                }
                debug!("event=save_worker_stop module=storage status=ok");
            })?;

        Ok(Self {
            handle: SaveHandle { tx },
            worker: Some(worker),
        })
    }

    pub fn handle(&self) -> SaveHandle {
        self.handle.clone()
    }

    /// Applies all queued jobs, then stops and joins the worker.
    ///
    /// Idempotent; later enqueues are logged as `queue_closed`.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = self.handle.tx.send(SaveJob::Shutdown);
        if worker.join().is_err() {
            error!("event=save_worker_stop module=storage status=error error_code=worker_panicked");
        }
    }
}

impl Drop for SaveQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn write_replacing(path: &Path, bytes: &[u8]) {
    let started_at = Instant::now();
    let mut temp_name = OsString::from(path.as_os_str());
    temp_name.push(TEMP_SUFFIX);
    let temp = PathBuf::from(temp_name);

    let result = ensure_parent(path)
        .and_then(|()| std::fs::write(&temp, bytes))
        .and_then(|()| std::fs::rename(&temp, path));

    match result {
        Ok(()) => debug!(
            "event=file_write module=storage status=ok path={} bytes={} duration_ms={}",
            path.display(),
            bytes.len(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => {
            error!(
                "event=file_write module=storage status=error path={} duration_ms={} error={}",
                path.display(),
                started_at.elapsed().as_millis(),
                err
            );
            let _ = std::fs::remove_file(&temp);
        }
    }
}

fn remove_if_present(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(
            "event=file_remove module=storage status=ok path={}",
            path.display()
        ),
        Err(err) if err.kind() == io::ErrorKind::NotFound => debug!(
            "event=file_remove module=storage status=skipped path={} reason=missing",
            path.display()
        ),
        Err(err) => error!(
            "event=file_remove module=storage status=error path={} error={}",
            path.display(),
            err
        ),
    }
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
