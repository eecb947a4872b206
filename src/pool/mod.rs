//! Supervised pool of address-parsing worker processes.
//!
//! [`ParsingWorkerPool::new`] spawns one worker per configured instance, each
//! on its own port, and returns only once every worker answers its health
//! check. Any startup failure tears down whatever was started. Parse calls are
//! spread round-robin over the workers still in rotation and can be cut short
//! by the caller's [`CallContext`] or by [`ParsingWorkerPool::shutdown`].

pub mod context;
pub mod protocol;
mod worker;

use crate::config::PoolConfig;
use crate::error::{Error, Result};
use crate::parser::ParsedAddress;
use crate::types::Address;
use context::CallContext;
use futures::StreamExt;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use worker::WorkerHandle;

/// Point-in-time counters for a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Configured worker count (0 when disabled)
    pub instances: usize,
    /// Workers ready and in rotation
    pub ready: usize,
    /// Workers removed after exiting or refusing connections
    pub retired: usize,
    /// Parse calls handed to a worker
    pub dispatched: u64,
    /// Dispatched calls that failed (cancellations excluded)
    pub failed: u64,
}

/// Pool of external address-parsing workers.
///
/// Share it behind an [`Arc`]; every method takes `&self`.
///
/// # Examples
///
/// ```rust,no_run
/// use postal_screen::{CallContext, ParsingWorkerPool, PoolConfig};
/// use std::time::Duration;
///
/// # async fn run() -> postal_screen::Result<()> {
/// let config = PoolConfig::builder()
///     .instances(4)
///     .starting_port(10000)
///     .binary("libpostal-server")
///     .build();
///
/// let pool = ParsingWorkerPool::new(config).await?;
/// let ctx = CallContext::with_timeout(Duration::from_secs(2));
/// let address = pool.parse_address(&ctx, "1600 Pennsylvania Ave NW, Washington DC").await?;
/// println!("{:?}", address.city());
///
/// pool.shutdown().await;
/// # Ok(())
/// # }
/// ```
pub struct ParsingWorkerPool {
    config: PoolConfig,
    workers: Vec<Arc<WorkerHandle>>,
    client: reqwest::Client,
    next: AtomicUsize,
    closing: watch::Sender<bool>,
    supervisors: Mutex<JoinSet<()>>,
    dispatched: AtomicU64,
    failed: AtomicU64,
}

impl fmt::Debug for ParsingWorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsingWorkerPool")
            .field("enabled", &self.config.enabled)
            .field("instances", &self.workers.len())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl ParsingWorkerPool {
    /// Start the pool and wait for every worker to become ready.
    ///
    /// A disabled configuration returns immediately with a pool that has no
    /// workers.
    ///
    /// # Errors
    ///
    /// * [`Error::Config`] for an invalid configuration; nothing is started.
    /// * [`Error::Startup`] when a worker cannot be spawned, exits, or misses
    ///   the startup deadline. Every started worker is stopped first.
    pub async fn new(config: PoolConfig) -> Result<Self> {
        let (closing, _) = watch::channel(false);

        if !config.enabled {
            info!("address parsing disabled");
            return Ok(Self::assemble(config, Vec::new(), reqwest::Client::new(), closing, JoinSet::new()));
        }

        let binary = config.validate()?;
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        let mut supervisors = JoinSet::new();
        let mut workers = Vec::with_capacity(config.instances);

        for ordinal in 0..config.instances {
            let (Some(port), Some(endpoint)) = (config.port(ordinal), config.endpoint(ordinal)) else {
                halt(&closing, &mut supervisors).await;
                return Err(Error::config(format!("no port for worker {ordinal}")));
            };

            let handle = match &binary {
                Some(binary) => match worker::spawn(&config, binary, ordinal, port) {
                    Ok(child) => {
                        let handle = Arc::new(WorkerHandle::new(ordinal, endpoint, &config, child.id()));
                        supervisors.spawn(worker::supervise(
                            handle.clone(),
                            child,
                            closing.subscribe(),
                            config.shutdown_grace,
                        ));
                        handle
                    }
                    Err(err) => {
                        halt(&closing, &mut supervisors).await;
                        return Err(err);
                    }
                },
                None => Arc::new(WorkerHandle::new(ordinal, endpoint, &config, None)),
            };
            workers.push(handle);
        }

        info!(
            instances = config.instances,
            starting_port = config.starting_port,
            "waiting for address parser workers"
        );

        let deadline = Instant::now() + config.startup_timeout;
        let mut probes = JoinSet::new();
        for handle in &workers {
            probes.spawn(worker::await_ready(
                handle.clone(),
                client.clone(),
                config.probe_interval,
                deadline,
            ));
        }

        while let Some(joined) = probes.join_next().await {
            let outcome = joined
                .map_err(|e| Error::startup(format!("startup probe failed: {e}")))
                .and_then(|ready| ready);
            if let Err(err) = outcome {
                warn!(error = %err, "address parser startup failed, stopping workers");
                probes.shutdown().await;
                halt(&closing, &mut supervisors).await;
                return Err(err);
            }
        }

        info!(instances = config.instances, "address parser workers ready");
        Ok(Self::assemble(config, workers, client, closing, supervisors))
    }

    fn assemble(
        config: PoolConfig,
        workers: Vec<Arc<WorkerHandle>>,
        client: reqwest::Client,
        closing: watch::Sender<bool>,
        supervisors: JoinSet<()>,
    ) -> Self {
        Self {
            config,
            workers,
            client,
            next: AtomicUsize::new(0),
            closing,
            supervisors: Mutex::new(supervisors),
            dispatched: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Parse free text into an [`Address`] on the next available worker.
    ///
    /// # Errors
    ///
    /// * [`Error::Disabled`] for a disabled pool
    /// * [`Error::PoolClosed`] once shutdown has begun, including for calls
    ///   already in flight
    /// * [`Error::Cancelled`] when `ctx` is cancelled or its deadline passes
    /// * [`Error::Unavailable`] when every worker has been retired
    /// * [`Error::Parse`] when the worker rejects the text or answers garbage
    /// * [`Error::Transport`] when the worker cannot be reached. A worker
    ///   that refuses the connection is taken out of rotation.
    #[instrument(level = "debug", skip_all, fields(len = text.len(), worker = tracing::field::Empty))]
    pub async fn parse_address(&self, ctx: &CallContext, text: &str) -> Result<Address> {
        if !self.config.enabled {
            return Err(Error::Disabled);
        }
        if self.is_closed() {
            return Err(Error::PoolClosed);
        }
        ctx.check()?;

        let worker = self.select()?;
        tracing::Span::current().record("worker", worker.ordinal);
        self.dispatched.fetch_add(1, Ordering::Relaxed);

        let mut closing = self.closing.subscribe();
        let result = tokio::select! {
            biased;
            _ = closing.wait_for(|closing| *closing) => Err(Error::PoolClosed),
            reason = ctx.done() => Err(Error::Cancelled { reason }),
            parsed = protocol::parse(&self.client, worker.ordinal, &worker.parse_url, text) => {
                parsed.map(|components| ParsedAddress::from_components(components).to_address())
            }
        };

        if let Err(err) = &result {
            if !err.is_cancellation() {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
            if err.is_refused() && worker.retire() {
                warn!(
                    worker = worker.ordinal,
                    endpoint = %worker.endpoint,
                    error = %err,
                    "address parser worker unreachable, removed from rotation"
                );
            }
            debug!(error = %err, "parse call failed");
        }
        result
    }

    /// Parse several texts, keeping input order, with at most one call in
    /// flight per worker.
    pub async fn parse_addresses(&self, ctx: &CallContext, texts: &[&str]) -> Vec<Result<Address>> {
        let width = self.workers.len().max(1);
        futures::stream::iter(texts.iter().map(|text| self.parse_address(ctx, text)))
            .buffered(width)
            .collect()
            .await
    }

    fn select(&self) -> Result<&Arc<WorkerHandle>> {
        let count = self.workers.len();
        let start = self.next.fetch_add(1, Ordering::Relaxed);
        (0..count)
            .map(|offset| &self.workers[start.wrapping_add(offset) % count])
            .find(|worker| worker.is_available())
            .ok_or(Error::Unavailable { instances: count })
    }

    /// Stop every worker and wait for them to exit.
    ///
    /// Calls in flight resolve to [`Error::PoolClosed`]. Workers get SIGTERM
    /// and are killed after the configured grace period. Calling this again
    /// waits for the first shutdown to finish and does nothing else.
    pub async fn shutdown(&self) {
        let already_closed = self.closing.send_replace(true);
        let mut supervisors = self.supervisors.lock().await;

        if !already_closed && self.config.enabled {
            info!(instances = self.workers.len(), "stopping address parser workers");
        }
        while let Some(joined) = supervisors.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "worker supervisor failed");
            }
        }
        if !already_closed && self.config.enabled {
            info!("address parser workers stopped");
        }
    }

    /// Check if the pool was built enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Check if shutdown has begun.
    pub fn is_closed(&self) -> bool {
        *self.closing.borrow()
    }

    /// Number of workers ready and in rotation.
    pub fn ready_workers(&self) -> usize {
        self.workers.iter().filter(|w| w.is_available()).count()
    }

    /// Process ids of spawned workers, in ordinal order.
    pub fn worker_pids(&self) -> Vec<u32> {
        self.workers.iter().filter_map(|w| w.pid).collect()
    }

    /// Current counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            instances: self.workers.len(),
            ready: self.ready_workers(),
            retired: self.workers.iter().filter(|w| w.is_retired()).count(),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// The configuration the pool was built with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}

/// Signal every supervisor to stop its worker and wait for all of them.
async fn halt(closing: &watch::Sender<bool>, supervisors: &mut JoinSet<()>) {
    closing.send_replace(true);
    while supervisors.join_next().await.is_some() {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_disabled_pool() {
        let config = PoolConfig::builder().enabled(false).instances(0).build();
        let pool = ParsingWorkerPool::new(config).await.unwrap();

        assert!(!pool.is_enabled());
        assert_eq!(pool.stats(), PoolStats::default());
        assert_matches!(
            pool.parse_address(&CallContext::background(), "123 Main St").await,
            Err(Error::Disabled)
        );

        pool.shutdown().await;
        pool.shutdown().await;
        assert_matches!(
            pool.parse_address(&CallContext::background(), "123 Main St").await,
            Err(Error::Disabled)
        );
    }

    #[tokio::test]
    async fn test_invalid_config_starts_nothing() {
        let config = PoolConfig::builder()
            .instances(0)
            .binary("/nonexistent/libpostal-server")
            .build();
        assert_matches!(ParsingWorkerPool::new(config).await, Err(Error::Config { .. }));

        let config = PoolConfig::builder()
            .binary("/nonexistent/libpostal-server")
            .build();
        assert_matches!(ParsingWorkerPool::new(config).await, Err(Error::Config { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_remote_fails_startup() {
        let config = PoolConfig::builder()
            .remote("127.0.0.1")
            .starting_port(9)
            .instances(2)
            .startup_timeout(Duration::from_millis(300))
            .probe_interval(Duration::from_millis(20))
            .build();

        let started = std::time::Instant::now();
        assert_matches!(ParsingWorkerPool::new(config).await, Err(Error::Startup { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
