//! # Connection Pool
//!
//! Purpose: Share a bounded set of store connections between any number of
//! threads, handing each one out for exactly one command at a time.
//!
//! ## Design Principles
//! 1. **Object Pool Pattern**: Keep a bounded set of reusable connections.
//! 2. **Minimal Locking**: Hold the mutex only for bookkeeping; connecting
//!    and pinging happen outside it.
//! 3. **Bounded Waiting**: A full pool parks callers on a condition variable
//!    for at most `max_wait`, then fails with `PoolExhausted`.
//! 4. **RAII Release**: `PooledConnection` returns itself on drop, so every
//!    exit path (success, store error, panic unwinding) releases exactly once.
//!
//! ## Accounting
//!
//! ```text
//! total  = connections that exist (idle + checked out + being validated)
//! active = connections checked out right now, always <= max_total
//! idle   = connections parked for reuse, always <= max_idle
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use serde::Serialize;

use crate::config::PoolConfig;
use crate::error::{ClientError, ClientResult};
use crate::resp::{Command, RespValue};
use crate::transport::{Connector, Transport};

/// Point-in-time pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub active: usize,
    pub idle: usize,
    pub total: usize,
    pub max_total: usize,
}

struct PoolState {
    idle: VecDeque<Box<dyn Transport>>,
    total: usize,
    active: usize,
    closed: bool,
}

struct PoolInner {
    config: PoolConfig,
    connector: Arc<dyn Connector>,
    state: Mutex<PoolState>,
    available: Condvar,
}

/// Connection pool handle. Clones share the same pool.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    /// Creates an empty pool; connections are opened on demand.
    pub fn new(config: PoolConfig, connector: Arc<dyn Connector>) -> ClientResult<Self> {
        config.validate()?;
        let state = PoolState {
            idle: VecDeque::with_capacity(config.max_idle),
            total: 0,
            active: 0,
            closed: false,
        };
        Ok(ConnectionPool {
            inner: Arc::new(PoolInner {
                config,
                connector,
                state: Mutex::new(state),
                available: Condvar::new(),
            }),
        })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Checks out a connection, blocking up to `max_wait` when the pool is full.
    pub fn acquire(&self) -> ClientResult<PooledConnection> {
        let max_total = self.inner.config.max_total;
        let started = Instant::now();
        let deadline = started + self.inner.config.max_wait;

        let mut state = self.inner.state.lock();
        loop {
            if state.closed {
                return Err(ClientError::PoolClosed);
            }
            if let Some(transport) = state.idle.pop_front() {
                state.active += 1;
                return Ok(PooledConnection::new(self.inner.clone(), transport));
            }
            if state.total < max_total {
                // Reserve the slot, then connect without holding the lock.
                state.total += 1;
                state.active += 1;
                drop(state);
                return self.open();
            }

            let timed_out = self.inner.available.wait_until(&mut state, deadline).timed_out();
            if timed_out && !state.closed && state.idle.is_empty() && state.total >= max_total {
                let waited = started.elapsed();
                tracing::warn!(max_total, ?waited, "connection pool exhausted");
                return Err(ClientError::PoolExhausted { max_total, waited });
            }
        }
    }

    fn open(&self) -> ClientResult<PooledConnection> {
        match self.inner.connector.connect(&self.inner.config) {
            Ok(transport) => Ok(PooledConnection::new(self.inner.clone(), transport)),
            Err(err) => {
                tracing::warn!(
                    host = %self.inner.config.host,
                    port = self.inner.config.port,
                    error = %err,
                    "failed to open store connection"
                );
                let mut state = self.inner.state.lock();
                state.total = state.total.saturating_sub(1);
                state.active = state.active.saturating_sub(1);
                drop(state);
                self.inner.available.notify_one();
                Err(err)
            }
        }
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.inner.state.lock();
        PoolStats {
            active: state.active,
            idle: state.idle.len(),
            total: state.total,
            max_total: self.inner.config.max_total,
        }
    }

    /// Pings each idle connection once and discards those that fail.
    ///
    /// Returns the number of connections discarded.
    pub fn evict_idle(&self) -> usize {
        self.inner.evict_idle()
    }

    /// Starts a background thread running `evict_idle` every `interval`.
    ///
    /// The thread exits when the handle is stopped or the pool is dropped.
    pub fn start_evictor(&self, interval: Duration) -> ClientResult<EvictionHandle> {
        let interval = interval.max(Duration::from_millis(1));
        let stop = Arc::new(AtomicBool::new(false));
        let stop_thread = Arc::clone(&stop);
        let pool: Weak<PoolInner> = Arc::downgrade(&self.inner);

        let join = thread::Builder::new()
            .name("pkv-evictor".to_string())
            .spawn(move || {
                let mut next_run = Instant::now() + interval;
                while !stop_thread.load(Ordering::Acquire) {
                    let now = Instant::now();
                    if now < next_run {
                        thread::park_timeout(next_run - now);
                        continue;
                    }
                    next_run = now + interval;
                    match pool.upgrade() {
                        Some(inner) => {
                            inner.evict_idle();
                        }
                        None => break,
                    }
                }
            })?;

        Ok(EvictionHandle {
            stop,
            join: Some(join),
        })
    }

    /// Closes the pool: idle connections are dropped, waiters fail with
    /// `PoolClosed`, and checked-out connections are dropped on release.
    pub fn close(&self) {
        let drained: Vec<Box<dyn Transport>> = {
            let mut state = self.inner.state.lock();
            state.closed = true;
            let drained: Vec<_> = state.idle.drain(..).collect();
            state.total = state.total.saturating_sub(drained.len());
            drained
        };
        self.inner.available.notify_all();
        tracing::debug!(dropped = drained.len(), "connection pool closed");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }
}

impl PoolInner {
    fn release(&self, transport: Box<dyn Transport>, reusable: bool) {
        let mut state = self.state.lock();
        state.active = state.active.saturating_sub(1);
        let discarded = if reusable && !state.closed && state.idle.len() < self.config.max_idle {
            state.idle.push_back(transport);
            None
        } else {
            state.total = state.total.saturating_sub(1);
            Some(transport)
        };
        drop(state);
        self.available.notify_one();
        // Close the socket outside the lock.
        drop(discarded);
    }

    /// Validates idle connections one at a time; only the connection being
    /// pinged is missing from the idle list.
    fn evict_idle(&self) -> usize {
        let checked = {
            let state = self.state.lock();
            if state.closed {
                return 0;
            }
            state.idle.len()
        };

        let mut discarded = 0;
        for _ in 0..checked {
            let mut transport = {
                let mut state = self.state.lock();
                if state.closed {
                    break;
                }
                match state.idle.pop_front() {
                    Some(transport) => transport,
                    None => break,
                }
            };

            let alive = transport.ping();

            let dropped = {
                let mut state = self.state.lock();
                if alive && !state.closed && state.idle.len() < self.config.max_idle {
                    state.idle.push_back(transport);
                    None
                } else {
                    state.total = state.total.saturating_sub(1);
                    Some(transport)
                }
            };
            self.available.notify_one();
            if !alive {
                discarded += 1;
            }
            // Close the socket outside the lock.
            drop(dropped);
        }

        tracing::debug!(checked, discarded, "idle connection sweep finished");
        discarded
    }
}

/// RAII wrapper returning a connection to the pool on drop.
pub struct PooledConnection {
    pool: Arc<PoolInner>,
    transport: Option<Box<dyn Transport>>,
    valid: bool,
}

impl PooledConnection {
    fn new(pool: Arc<PoolInner>, transport: Box<dyn Transport>) -> Self {
        PooledConnection {
            pool,
            transport: Some(transport),
            valid: true,
        }
    }

    /// Executes one command and returns the raw reply.
    pub fn exec(&mut self, command: &Command) -> ClientResult<RespValue> {
        let transport = self.transport.as_mut().ok_or(ClientError::PoolClosed)?;
        let response = transport.exec(command);
        if response.is_err() {
            // If IO/protocol fails, do not return this connection to the pool.
            self.valid = false;
        }
        response
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(transport) = self.transport.take() {
            self.pool.release(transport, self.valid);
        }
    }
}

/// Handle for the background eviction thread.
///
/// Call `stop` to signal shutdown and join the thread.
pub struct EvictionHandle {
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl EvictionHandle {
    /// Stops the sweeper and waits for the thread to finish.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            join.thread().unpark();
            let _ = join.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeStore;

    fn pool_with(store: &Arc<FakeStore>, max_total: usize, max_idle: usize, max_wait_ms: u64) -> ConnectionPool {
        let config = PoolConfig {
            max_total,
            max_idle,
            max_wait: Duration::from_millis(max_wait_ms),
            ..PoolConfig::default()
        };
        ConnectionPool::new(config, store.connector()).unwrap()
    }

    #[test]
    fn released_connection_is_reused() {
        let store = FakeStore::new();
        let pool = pool_with(&store, 2, 2, 100);
        {
            let mut conn = pool.acquire().unwrap();
            assert_eq!(conn.exec(&Command::new("PING")).unwrap(), RespValue::simple("PONG"));
            assert_eq!(pool.stats().active, 1);
        }
        let _again = pool.acquire().unwrap();
        assert_eq!(store.connects(), 1);
        assert_eq!(pool.stats(), PoolStats { active: 1, idle: 0, total: 1, max_total: 2 });
    }

    #[test]
    fn store_error_keeps_connection() {
        let store = FakeStore::new();
        let pool = pool_with(&store, 1, 1, 100);
        {
            let mut conn = pool.acquire().unwrap();
            let reply = conn.exec(&Command::new("NOPE")).unwrap();
            assert!(matches!(reply, RespValue::Error(_)));
        }
        assert_eq!(pool.stats(), PoolStats { active: 0, idle: 1, total: 1, max_total: 1 });
    }

    #[test]
    fn transport_failure_discards_connection() {
        let store = FakeStore::new();
        let pool = pool_with(&store, 1, 1, 100);
        {
            let mut conn = pool.acquire().unwrap();
            assert!(conn.exec(&Command::new("BROKEN")).is_err());
        }
        assert_eq!(pool.stats(), PoolStats { active: 0, idle: 0, total: 0, max_total: 1 });
        let _conn = pool.acquire().unwrap();
        assert_eq!(store.connects(), 2);
    }

    #[test]
    fn idle_list_is_capped() {
        let store = FakeStore::new();
        let pool = pool_with(&store, 3, 1, 100);
        let first = pool.acquire().unwrap();
        let second = pool.acquire().unwrap();
        drop(first);
        drop(second);
        assert_eq!(pool.stats(), PoolStats { active: 0, idle: 1, total: 1, max_total: 3 });
    }

    #[test]
    fn exhausted_pool_times_out() {
        let store = FakeStore::new();
        let pool = pool_with(&store, 1, 1, 50);
        let _held = pool.acquire().unwrap();

        let started = Instant::now();
        match pool.acquire() {
            Err(ClientError::PoolExhausted { max_total, waited }) => {
                assert_eq!(max_total, 1);
                assert!(waited >= Duration::from_millis(50));
            }
            other => panic!("expected exhaustion, got {:?}", other.map(|_| ())),
        }
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(pool.stats().active, 1);
    }

    #[test]
    fn waiter_receives_released_connection() {
        let store = FakeStore::new();
        let pool = pool_with(&store, 1, 1, 2_000);
        let held = pool.acquire().unwrap();

        let waiter_pool = pool.clone();
        let waiter = thread::spawn(move || {
            let mut conn = waiter_pool.acquire()?;
            conn.exec(&Command::new("PING"))
        });

        thread::sleep(Duration::from_millis(50));
        drop(held);
        assert!(waiter.join().unwrap().is_ok());
        assert_eq!(store.connects(), 1);
        assert_eq!(pool.stats().active, 0);
    }

    #[test]
    fn excess_acquirers_fail_while_others_complete() {
        let store = FakeStore::new();
        let pool = pool_with(&store, 2, 2, 100);
        let held: Vec<_> = (0..2).map(|_| pool.acquire().unwrap()).collect();

        let excess: Vec<_> = (0..3)
            .map(|_| {
                let pool = pool.clone();
                thread::spawn(move || pool.acquire().map(|_| ()))
            })
            .collect();
        for handle in excess {
            assert!(matches!(
                handle.join().unwrap(),
                Err(ClientError::PoolExhausted { .. })
            ));
        }

        drop(held);
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                thread::spawn(move || {
                    let mut conn = pool.acquire()?;
                    conn.exec(&Command::new("PING"))
                })
            })
            .collect();
        for handle in workers {
            assert!(handle.join().unwrap().is_ok());
        }
        assert_eq!(pool.stats().active, 0);
        assert!(store.connects() <= 2);
    }

    #[test]
    fn connect_failure_frees_slot() {
        let store = FakeStore::new();
        let pool = pool_with(&store, 1, 1, 100);
        store.refuse_connections(true);
        assert!(matches!(pool.acquire(), Err(ClientError::Connection(_))));
        assert_eq!(pool.stats().total, 0);

        store.refuse_connections(false);
        assert!(pool.acquire().is_ok());
    }

    #[test]
    fn eviction_discards_dead_idle_connections() {
        let store = FakeStore::new();
        let pool = pool_with(&store, 3, 3, 100);
        let conns: Vec<_> = (0..2).map(|_| pool.acquire().unwrap()).collect();
        drop(conns);
        assert_eq!(pool.evict_idle(), 0);
        assert_eq!(pool.stats().idle, 2);

        store.set_alive(false);
        assert_eq!(pool.evict_idle(), 2);
        assert_eq!(pool.stats(), PoolStats { active: 0, idle: 0, total: 0, max_total: 3 });
    }

    #[test]
    fn acquire_succeeds_during_slow_sweep() {
        let store = FakeStore::new();
        let pool = pool_with(&store, 2, 2, 100);
        let conns: Vec<_> = (0..2).map(|_| pool.acquire().unwrap()).collect();
        drop(conns);
        store.set_ping_delay(Duration::from_millis(400));

        let sweeper_pool = pool.clone();
        let sweeper = thread::spawn(move || sweeper_pool.evict_idle());
        thread::sleep(Duration::from_millis(20));

        let started = Instant::now();
        let mut conn = pool.acquire().unwrap();
        assert!(started.elapsed() < Duration::from_millis(100));
        assert_eq!(conn.exec(&Command::new("PING")).unwrap(), RespValue::simple("PONG"));
        drop(conn);

        assert_eq!(sweeper.join().unwrap(), 0);
        assert_eq!(pool.stats(), PoolStats { active: 0, idle: 2, total: 2, max_total: 2 });
        assert_eq!(store.connects(), 2);
    }

    #[test]
    fn evictor_thread_sweeps_in_background() {
        let store = FakeStore::new();
        let pool = pool_with(&store, 2, 2, 100);
        drop(pool.acquire().unwrap());
        store.set_alive(false);

        let handle = pool.start_evictor(Duration::from_millis(5)).unwrap();
        thread::sleep(Duration::from_millis(100));
        handle.stop();
        assert_eq!(pool.stats().total, 0);
    }

    #[test]
    fn close_wakes_waiters() {
        let store = FakeStore::new();
        let pool = pool_with(&store, 1, 1, 5_000);
        let held = pool.acquire().unwrap();

        let waiter_pool = pool.clone();
        let waiter = thread::spawn(move || waiter_pool.acquire().map(|_| ()));
        thread::sleep(Duration::from_millis(50));
        assert!(!pool.is_closed());
        pool.close();
        assert!(pool.is_closed());

        assert!(matches!(waiter.join().unwrap(), Err(ClientError::PoolClosed)));
        drop(held);
        assert_eq!(pool.stats(), PoolStats { active: 0, idle: 0, total: 0, max_total: 1 });
    }
}
