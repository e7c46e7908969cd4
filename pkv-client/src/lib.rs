//! # PoolKV Sync Client
//!
//! Purpose: Provide a process-wide, thread-safe facade over a Redis-compatible
//! store, with typed command groups backed by one shared connection pool.
//!
//! ## Design Principles
//! 1. **Object Pool Pattern**: Reuse TCP connections to avoid repeated connects.
//! 2. **Acquire, Execute, Release**: Every operation holds one connection for
//!    exactly one command and returns it on every exit path.
//! 3. **Lazy Singleton**: The pool is built once, on first use, without a
//!    lock on the steady-state path.
//! 4. **Protocol Clarity**: Encode/parse RESP2 explicitly for correctness.
//!
//! ## Usage
//!
//! ```no_run
//! use pkv_client::{KvFacade, PoolConfig};
//!
//! let kv = KvFacade::new(PoolConfig::default());
//! kv.strings().set("greeting", "hello")?;
//! assert_eq!(kv.strings().get("greeting")?.as_deref(), Some("hello"));
//! # Ok::<(), pkv_client::ClientError>(())
//! ```

mod config;
mod error;
mod facade;
mod ops;
mod pool;
mod reply;
mod resp;
mod transport;

#[cfg(test)]
mod testing;

pub use config::{ConfigSource, JsonSource, PoolConfig, Properties};
pub use error::{ClientError, ClientResult};
pub use facade::{KvFacade, CONFIG_ENV};
pub use ops::{Hash, Keys, Lists, Sets, SortParams, SortedSet, Strings, DEFAULT_CACHE_SECONDS};
pub use pool::{ConnectionPool, EvictionHandle, PoolStats, PooledConnection};
pub use resp::{Command, RespValue};
pub use transport::{Connector, TcpConnector, Transport};
