//! Worker pool configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable carrying a worker's listen port.
pub const PORT_ENV: &str = "POSTAL_SERVER_PORT";

/// Environment variable carrying the libpostal data directory.
pub const DATA_DIR_ENV: &str = "LIBPOSTAL_DATA_DIR";

/// Placeholder in worker arguments replaced by the worker's port.
pub const PORT_PLACEHOLDER: &str = "{port}";

/// Where the parsing workers come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerLocator {
    /// Spawn this executable once per worker. A bare name is searched on `PATH`.
    Binary(PathBuf),
    /// Workers already run on `host`; nothing is spawned.
    Remote {
        /// Host name or address of the running workers
        host: String,
    },
}

impl Default for WorkerLocator {
    fn default() -> Self {
        WorkerLocator::Binary(PathBuf::from("libpostal-server"))
    }
}

impl WorkerLocator {
    /// Check if this locator spawns processes.
    pub fn spawns(&self) -> bool {
        matches!(self, WorkerLocator::Binary(_))
    }
}

/// Configuration for [`ParsingWorkerPool`](crate::ParsingWorkerPool).
///
/// Validated once when the pool is built and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// When false the pool starts no workers and every parse call fails with
    /// [`Error::Disabled`]
    pub enabled: bool,

    /// Number of workers
    pub instances: usize,

    /// Port of worker 0; worker `n` listens on `starting_port + n`
    pub starting_port: u16,

    /// How long every worker has to pass its health check
    #[serde(with = "crate::serde_millis")]
    pub startup_timeout: Duration,

    /// Worker executable or remote host
    pub locator: WorkerLocator,

    /// Extra arguments for spawned workers; `{port}` is substituted
    pub args: Vec<String>,

    /// Extra environment for spawned workers
    pub env: BTreeMap<String, String>,

    /// libpostal data directory handed to spawned workers
    pub data_dir: Option<PathBuf>,

    /// Host spawned workers are reached on
    pub host: String,

    /// Path probed during startup
    pub health_path: String,

    /// Path parse requests are posted to
    pub parse_path: String,

    /// Delay between health probes
    #[serde(with = "crate::serde_millis")]
    pub probe_interval: Duration,

    /// How long a worker may take to exit after SIGTERM before it is killed
    #[serde(with = "crate::serde_millis")]
    pub shutdown_grace: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            instances: 1,
            starting_port: 10000,
            startup_timeout: Duration::from_secs(60),
            locator: WorkerLocator::default(),
            args: Vec::new(),
            env: BTreeMap::new(),
            data_dir: None,
            host: "127.0.0.1".to_string(),
            health_path: "/health".to_string(),
            parse_path: "/parse".to_string(),
            probe_interval: Duration::from_millis(100),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

impl PoolConfig {
    /// Create a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use postal_screen::PoolConfig;
    /// use std::time::Duration;
    ///
    /// let config = PoolConfig::builder()
    ///     .instances(4)
    ///     .starting_port(18000)
    ///     .startup_timeout(Duration::from_secs(30))
    ///     .binary("/usr/local/bin/libpostal-server")
    ///     .build();
    ///
    /// assert_eq!(config.port(3), Some(18003));
    /// ```
    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::new()
    }

    /// Port of worker `ordinal`, `None` if it does not fit in a `u16`.
    pub fn port(&self, ordinal: usize) -> Option<u16> {
        let port = usize::from(self.starting_port).checked_add(ordinal)?;
        u16::try_from(port).ok()
    }

    /// Base URL of worker `ordinal`.
    pub fn endpoint(&self, ordinal: usize) -> Option<String> {
        let host = match &self.locator {
            WorkerLocator::Remote { host } => host.as_str(),
            WorkerLocator::Binary(_) => self.host.as_str(),
        };
        Some(format!("http://{host}:{}", self.port(ordinal)?))
    }

    /// Check the configuration, resolving the worker binary.
    ///
    /// Returns the resolved executable, or `None` for a remote locator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero instance count, port or startup
    /// timeout, a port range past 65535, a missing data directory, or a binary
    /// that cannot be found.
    pub fn validate(&self) -> Result<Option<PathBuf>> {
        if self.instances < 1 {
            return Err(Error::config("instances must be at least 1"));
        }
        if self.starting_port == 0 {
            return Err(Error::config("starting_port must be non-zero"));
        }
        if self.port(self.instances - 1).is_none() {
            return Err(Error::config(format!(
                "{} instances starting at port {} exceed port 65535",
                self.instances, self.starting_port
            )));
        }
        if self.startup_timeout.is_zero() {
            return Err(Error::config("startup_timeout must be non-zero"));
        }
        if self.probe_interval.is_zero() {
            return Err(Error::config("probe_interval must be non-zero"));
        }
        if let Some(dir) = &self.data_dir {
            if !dir.is_dir() {
                return Err(Error::config(format!(
                    "data directory {} does not exist",
                    dir.display()
                )));
            }
        }

        match &self.locator {
            WorkerLocator::Binary(binary) => resolve_binary(binary).map(Some),
            WorkerLocator::Remote { host } if host.trim().is_empty() => {
                Err(Error::config("remote host must not be empty"))
            }
            WorkerLocator::Remote { .. } => Ok(None),
        }
    }
}

/// Resolve a worker executable: a path with separators must exist as given,
/// a bare name is searched on `PATH`.
pub fn resolve_binary(binary: &Path) -> Result<PathBuf> {
    if binary.as_os_str().is_empty() {
        return Err(Error::config("worker binary path is empty"));
    }

    if binary.components().count() > 1 || binary.is_absolute() {
        return if binary.is_file() {
            Ok(binary.to_path_buf())
        } else {
            Err(Error::config(format!(
                "worker binary {} not found",
                binary.display()
            )))
        };
    }

    std::env::var_os("PATH")
        .iter()
        .flat_map(std::env::split_paths)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            Error::config(format!(
                "worker binary {} not found on PATH",
                binary.display()
            ))
        })
}

/// Builder for PoolConfig.
#[derive(Debug, Clone, Default)]
pub struct PoolConfigBuilder {
    config: PoolConfig,
}

impl PoolConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the pool.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Set the number of workers.
    pub fn instances(mut self, instances: usize) -> Self {
        self.config.instances = instances;
        self
    }

    /// Set the port of the first worker.
    pub fn starting_port(mut self, port: u16) -> Self {
        self.config.starting_port = port;
        self
    }

    /// Set the startup deadline.
    pub fn startup_timeout(mut self, timeout: Duration) -> Self {
        self.config.startup_timeout = timeout;
        self
    }

    /// Spawn workers from this executable.
    pub fn binary<P: Into<PathBuf>>(mut self, binary: P) -> Self {
        self.config.locator = WorkerLocator::Binary(binary.into());
        self
    }

    /// Use workers already running on `host`.
    pub fn remote(mut self, host: impl Into<String>) -> Self {
        self.config.locator = WorkerLocator::Remote { host: host.into() };
        self
    }

    /// Append an argument for spawned workers.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.config.args.push(arg.into());
        self
    }

    /// Set an environment variable for spawned workers.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.env.insert(key.into(), value.into());
        self
    }

    /// Set the libpostal data directory.
    pub fn data_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.data_dir = Some(dir.into());
        self
    }

    /// Set the host spawned workers are reached on.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the health check path.
    pub fn health_path(mut self, path: impl Into<String>) -> Self {
        self.config.health_path = path.into();
        self
    }

    /// Set the parse request path.
    pub fn parse_path(mut self, path: impl Into<String>) -> Self {
        self.config.parse_path = path.into();
        self
    }

    /// Set the delay between health probes.
    pub fn probe_interval(mut self, interval: Duration) -> Self {
        self.config.probe_interval = interval;
        self
    }

    /// Set the SIGTERM grace period.
    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.config.shutdown_grace = grace;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> PoolConfig {
        self.config
    }
}
