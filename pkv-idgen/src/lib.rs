//! # PoolKV ID Generation
//!
//! Purpose: Issue monotonically increasing, collision-free integer IDs per
//! namespace by incrementing a counter key in the store.
//!
//! ## Design Principles
//! 1. **Store-Side Atomicity**: Uniqueness comes from `INCRBY` being atomic
//!    per key; no in-process locking.
//! 2. **Namespace Keys**: Each `(table, shard)` pair owns its own counter key,
//!    `<prefix>:<table>:<shard>`.

use pkv_client::{ClientResult, KvFacade};

/// Default key prefix for counter keys.
pub const DEFAULT_PREFIX: &str = "id";

const ORDER_NAMESPACE: &str = "order";
const RECORD_NAMESPACE: &str = "record";

/// Source of unique integer IDs.
pub trait IdGenerator {
    /// Next ID for `table`, scoped by a shard such as a user number.
    fn get_id(&self, table: &str, shard_id: i64) -> ClientResult<i64>;

    fn order_id(&self) -> ClientResult<i64>;

    fn record_id(&self) -> ClientResult<i64>;
}

/// `IdGenerator` backed by the facade's string counters.
pub struct CounterIdGenerator<'a> {
    kv: &'a KvFacade,
    prefix: String,
}

impl<'a> CounterIdGenerator<'a> {
    pub fn new(kv: &'a KvFacade) -> Self {
        Self::with_prefix(kv, DEFAULT_PREFIX)
    }

    pub fn with_prefix(kv: &'a KvFacade, prefix: impl Into<String>) -> Self {
        CounterIdGenerator {
            kv,
            prefix: prefix.into(),
        }
    }

    /// Counter key for a namespace.
    pub fn counter_key(&self, table: &str, shard_id: i64) -> String {
        format!("{}:{}:{}", self.prefix, table, shard_id)
    }
}

impl CounterIdGenerator<'static> {
    /// Generator over the process-wide facade.
    pub fn global() -> Self {
        Self::new(KvFacade::global())
    }
}

impl IdGenerator for CounterIdGenerator<'_> {
    fn get_id(&self, table: &str, shard_id: i64) -> ClientResult<i64> {
        let key = self.counter_key(table, shard_id);
        let id = self.kv.strings().incr_by(&key, 1)?;
        tracing::trace!(%key, id, "issued id");
        Ok(id)
    }

    fn order_id(&self) -> ClientResult<i64> {
        self.get_id(ORDER_NAMESPACE, 0)
    }

    fn record_id(&self) -> ClientResult<i64> {
        self.get_id(RECORD_NAMESPACE, 0)
    }
}
