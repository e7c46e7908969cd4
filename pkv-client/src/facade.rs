//! # Store Facade
//!
//! Purpose: One access point owning the connection pool and exposing the six
//! typed operation groups.
//!
//! ## Design Principles
//! 1. **Facade Pattern**: `KvFacade` hides pooling, configuration, and the
//!    wire protocol behind typed calls.
//! 2. **Lazy, Single Construction**: The pool is built on first use inside a
//!    one-time initialization cell. Concurrent first callers block until the
//!    single build finishes; later callers never take a lock.
//! 3. **One Execution Path**: Every operation goes through `execute`, which
//!    acquires, runs one command, and releases before mapping the reply.
//! 4. **Explicit Lifecycle**: Facades are ordinary values that can be built,
//!    injected, and shut down; `global()` is a convenience on top.

use std::env;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::config::{ConfigSource, PoolConfig, Properties};
use crate::error::{ClientError, ClientResult};
use crate::ops::{Hash, Keys, Lists, Sets, SortedSet, Strings};
use crate::pool::{ConnectionPool, EvictionHandle, PoolStats};
use crate::resp::{Command, RespValue};
use crate::transport::{Connector, TcpConnector};

/// Environment variable naming a properties file for the global facade.
pub const CONFIG_ENV: &str = "PKV_CONFIG";

type ConfigLoader = Box<dyn Fn() -> ClientResult<PoolConfig> + Send + Sync>;

static GLOBAL: OnceCell<KvFacade> = OnceCell::new();

struct PoolSlot {
    pool: ConnectionPool,
    evictor: Mutex<Option<EvictionHandle>>,
}

impl PoolSlot {
    fn stop_evictor(&self) {
        if let Some(handle) = self.evictor.lock().take() {
            handle.stop();
        }
    }
}

impl Drop for PoolSlot {
    fn drop(&mut self) {
        self.stop_evictor();
    }
}

/// Pooled access to a remote key-value store.
pub struct KvFacade {
    loader: ConfigLoader,
    connector: Arc<dyn Connector>,
    slot: OnceCell<PoolSlot>,
}

impl KvFacade {
    /// Facade over TCP using a fixed configuration.
    pub fn new(config: PoolConfig) -> Self {
        Self::with_loader(move || Ok(config.clone()))
    }

    /// Facade over TCP reading its configuration from `source` on first use.
    pub fn from_source<S>(source: S) -> Self
    where
        S: ConfigSource + 'static,
    {
        Self::with_loader(move || PoolConfig::from_source(&source))
    }

    /// Facade over TCP using the properties file named by `PKV_CONFIG`, or
    /// the fallback configuration when the variable is unset.
    pub fn from_env() -> Self {
        Self::with_loader(|| match env::var_os(CONFIG_ENV) {
            Some(path) => {
                let properties = Properties::from_file(path)?;
                PoolConfig::resolve(Some(&properties))
            }
            None => PoolConfig::resolve(None),
        })
    }

    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn() -> ClientResult<PoolConfig> + Send + Sync + 'static,
    {
        Self::with_connector(loader, Arc::new(TcpConnector))
    }

    /// Fully injected construction. `loader` runs at most once per
    /// successful pool build.
    pub fn with_connector<F>(loader: F, connector: Arc<dyn Connector>) -> Self
    where
        F: Fn() -> ClientResult<PoolConfig> + Send + Sync + 'static,
    {
        KvFacade {
            loader: Box::new(loader),
            connector,
            slot: OnceCell::new(),
        }
    }

    /// The process-wide facade, built from the environment on first access
    /// unless one was installed earlier.
    pub fn global() -> &'static KvFacade {
        GLOBAL.get_or_init(KvFacade::from_env)
    }

    /// Installs `facade` as the process-wide instance.
    ///
    /// Fails (handing the facade back) if the global was already set.
    pub fn install_global(facade: KvFacade) -> Result<(), KvFacade> {
        GLOBAL.set(facade)
    }

    /// Returns the pool, building it on first call.
    ///
    /// A failed build (bad configuration) leaves the facade uninitialized,
    /// so the next call tries again.
    pub fn pool(&self) -> ClientResult<&ConnectionPool> {
        self.slot
            .get_or_try_init(|| self.build_pool())
            .map(|slot| &slot.pool)
    }

    fn build_pool(&self) -> ClientResult<PoolSlot> {
        let config = (self.loader)()?;
        let pool = ConnectionPool::new(config, Arc::clone(&self.connector))?;

        let config = pool.config();
        let evictor = if config.test_while_idle {
            Some(pool.start_evictor(config.eviction_interval)?)
        } else {
            None
        };
        tracing::info!(
            host = %config.host,
            port = config.port,
            database = config.database,
            max_total = config.max_total,
            max_idle = config.max_idle,
            "connection pool initialized"
        );

        Ok(PoolSlot {
            pool,
            evictor: Mutex::new(evictor),
        })
    }

    /// Runs one command on one pooled connection.
    ///
    /// The connection is released before the reply is mapped, on every path.
    /// Store error replies become `ClientError::RemoteCommand`.
    pub(crate) fn execute<T, F>(&self, command: Command, map: F) -> ClientResult<T>
    where
        F: FnOnce(RespValue) -> ClientResult<T>,
    {
        let mut conn = self.pool()?.acquire()?;
        let reply = conn.exec(&command);
        drop(conn);
        match reply? {
            RespValue::Error(message) => Err(ClientError::remote(&message)),
            reply => map(reply),
        }
    }

    pub fn keys(&self) -> Keys<'_> {
        Keys::new(self)
    }

    pub fn strings(&self) -> Strings<'_> {
        Strings::new(self)
    }

    pub fn lists(&self) -> Lists<'_> {
        Lists::new(self)
    }

    pub fn sets(&self) -> Sets<'_> {
        Sets::new(self)
    }

    pub fn sorted_set(&self) -> SortedSet<'_> {
        SortedSet::new(self)
    }

    pub fn hash(&self) -> Hash<'_> {
        Hash::new(self)
    }

    /// Pool counters, or `None` if no operation has run yet.
    pub fn stats(&self) -> Option<PoolStats> {
        self.slot.get().map(|slot| slot.pool.stats())
    }

    /// Stops idle eviction and closes the pool. Later operations fail with
    /// `PoolClosed`.
    pub fn shutdown(&self) {
        if let Some(slot) = self.slot.get() {
            slot.stop_evictor();
            slot.pool.close();
            tracing::info!("store facade shut down");
        }
    }
}

impl fmt::Debug for KvFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KvFacade")
            .field("initialized", &self.slot.get().is_some())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
