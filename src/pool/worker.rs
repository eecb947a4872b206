//! Worker processes: spawning, readiness probing and supervision.
//!
//! A spawned worker's [`Child`] is owned by its supervisor task. The pool only
//! holds the shared [`WorkerHandle`], so a crashed worker is noticed by the
//! supervisor without any dispatch path touching the process.

use super::protocol;
use crate::config::{DATA_DIR_ENV, PORT_ENV, PORT_PLACEHOLDER, PoolConfig};
use crate::error::{Error, Result};
use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Shared state of one worker.
#[derive(Debug)]
pub(crate) struct WorkerHandle {
    pub(crate) ordinal: usize,
    pub(crate) endpoint: String,
    pub(crate) health_url: String,
    pub(crate) parse_url: String,
    pub(crate) pid: Option<u32>,
    ready: AtomicBool,
    retired: AtomicBool,
}

fn join_url(endpoint: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{endpoint}{path}")
    } else {
        format!("{endpoint}/{path}")
    }
}

impl WorkerHandle {
    pub(crate) fn new(ordinal: usize, endpoint: String, config: &PoolConfig, pid: Option<u32>) -> Self {
        Self {
            ordinal,
            health_url: join_url(&endpoint, &config.health_path),
            parse_url: join_url(&endpoint, &config.parse_path),
            endpoint,
            pid,
            ready: AtomicBool::new(false),
            retired: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub(crate) fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    /// Ready and still in rotation.
    pub(crate) fn is_available(&self) -> bool {
        self.is_ready() && !self.is_retired()
    }

    fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Take the worker out of rotation. Returns false if it already was.
    pub(crate) fn retire(&self) -> bool {
        !self.retired.swap(true, Ordering::AcqRel)
    }
}

/// Start worker `ordinal` listening on `port`.
pub(crate) fn spawn(config: &PoolConfig, binary: &Path, ordinal: usize, port: u16) -> Result<Child> {
    let port_str = port.to_string();
    let mut cmd = Command::new(binary);

    for arg in &config.args {
        cmd.arg(arg.replace(PORT_PLACEHOLDER, &port_str));
    }

    cmd.env(PORT_ENV, &port_str);
    if let Some(dir) = &config.data_dir {
        cmd.env(DATA_DIR_ENV, dir);
    }
    cmd.envs(&config.env);

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::inherit());
    cmd.kill_on_drop(true);

    let child = cmd.spawn().map_err(|e| {
        Error::startup(format!(
            "failed to spawn worker {ordinal} ({}): {e}",
            binary.display()
        ))
    })?;
    debug!(worker = ordinal, port, pid = ?child.id(), "spawned address parser worker");
    Ok(child)
}

/// Probe the worker until it answers its health check, it exits, or the
/// startup deadline passes.
pub(crate) async fn await_ready(
    handle: std::sync::Arc<WorkerHandle>,
    client: reqwest::Client,
    interval: Duration,
    deadline: Instant,
) -> Result<()> {
    loop {
        if handle.is_retired() {
            return Err(Error::startup(format!(
                "worker {} exited during startup",
                handle.ordinal
            )));
        }

        match tokio::time::timeout_at(deadline, protocol::probe(&client, &handle.health_url)).await {
            Ok(true) => {
                handle.mark_ready();
                debug!(worker = handle.ordinal, endpoint = %handle.endpoint, "worker ready");
                return Ok(());
            }
            Ok(false) if Instant::now() + interval < deadline => {
                tokio::time::sleep(interval).await;
            }
            _ => {
                return Err(Error::startup(format!(
                    "worker {} at {} did not become ready in time",
                    handle.ordinal, handle.endpoint
                )));
            }
        }
    }
}

/// Own the worker process until it exits or the pool starts closing.
///
/// An exit before closing retires the worker for good. On closing the worker
/// gets SIGTERM, then SIGKILL after `grace`.
pub(crate) async fn supervise(
    handle: std::sync::Arc<WorkerHandle>,
    mut child: Child,
    mut closing: watch::Receiver<bool>,
    grace: Duration,
) {
    let exited = tokio::select! {
        status = child.wait() => Some(status),
        _ = closing.wait_for(|closing| *closing) => None,
    };

    let closed = *closing.borrow();
    match exited {
        Some(status) if closed => {
            debug!(worker = handle.ordinal, ?status, "worker exited during shutdown");
        }
        Some(status) => {
            handle.retire();
            match status {
                Ok(status) => warn!(
                    worker = handle.ordinal,
                    %status,
                    "address parser worker exited unexpectedly, removed from rotation"
                ),
                Err(e) => warn!(
                    worker = handle.ordinal,
                    error = %e,
                    "lost track of address parser worker, removed from rotation"
                ),
            }
        }
        None => terminate(&handle, &mut child, grace).await,
    }
}

async fn terminate(handle: &WorkerHandle, child: &mut Child, grace: Duration) {
    if !send_sigterm(child) {
        let _ = child.start_kill();
    }

    match tokio::time::timeout(grace, child.wait()).await {
        Ok(Ok(status)) => debug!(worker = handle.ordinal, %status, "worker stopped"),
        Ok(Err(e)) => warn!(worker = handle.ordinal, error = %e, "failed to wait for worker"),
        Err(_) => {
            warn!(
                worker = handle.ordinal,
                grace_ms = grace.as_millis() as u64,
                "worker ignored SIGTERM, killing"
            );
            if let Err(e) = child.kill().await {
                warn!(worker = handle.ordinal, error = %e, "failed to kill worker");
            }
        }
    }
}

#[cfg(unix)]
fn send_sigterm(child: &Child) -> bool {
    let Some(pid) = child.id().and_then(|pid| libc::pid_t::try_from(pid).ok()) else {
        return false;
    };
    // SAFETY: `pid` belongs to a child we have not reaped yet.
    unsafe { libc::kill(pid, libc::SIGTERM) == 0 }
}

#[cfg(not(unix))]
fn send_sigterm(_child: &Child) -> bool {
    false
}
