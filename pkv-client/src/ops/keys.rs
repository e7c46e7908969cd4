//! Key-level commands: expiry, existence, renaming, deletion, sorting.

use std::collections::HashSet;

use crate::error::ClientResult;
use crate::facade::KvFacade;
use crate::reply;
use crate::resp::Command;

/// TTL applied by `expire_default`, in seconds.
pub const DEFAULT_CACHE_SECONDS: i64 = 60_000;

/// Generic key operations.
#[derive(Clone, Copy)]
pub struct Keys<'a> {
    facade: &'a KvFacade,
}

impl<'a> Keys<'a> {
    pub(crate) fn new(facade: &'a KvFacade) -> Self {
        Keys { facade }
    }

    /// Sets a time-to-live in seconds.
    ///
    /// Returns the number of keys updated (0 or 1). `seconds <= 0` returns
    /// `-1` without contacting the store, so a TTL is never cleared by mistake.
    pub fn expire(&self, key: &str, seconds: i64) -> ClientResult<i64> {
        if seconds <= 0 {
            return Ok(-1);
        }
        self.facade.execute(
            Command::new("EXPIRE").arg(key).arg_i64(seconds),
            reply::integer,
        )
    }

    /// `expire` with `DEFAULT_CACHE_SECONDS`.
    pub fn expire_default(&self, key: &str) -> ClientResult<i64> {
        self.expire(key, DEFAULT_CACHE_SECONDS)
    }

    /// Expires the key at a Unix timestamp in seconds.
    pub fn expire_at(&self, key: &str, unix_seconds: i64) -> ClientResult<i64> {
        self.facade.execute(
            Command::new("EXPIREAT").arg(key).arg_i64(unix_seconds),
            reply::integer,
        )
    }

    /// Remaining TTL in seconds: `-2` when the key is missing, `-1` when it
    /// has no expiry.
    pub fn ttl(&self, key: &str) -> ClientResult<i64> {
        self.facade
            .execute(Command::new("TTL").arg(key), reply::integer)
    }

    /// Removes the TTL. Returns 1 when one was removed.
    pub fn persist(&self, key: &str) -> ClientResult<i64> {
        self.facade
            .execute(Command::new("PERSIST").arg(key), reply::integer)
    }

    /// Deletes every key in every database.
    pub fn flush_all(&self) -> ClientResult<String> {
        self.facade.execute(Command::new("FLUSHALL"), reply::status)
    }

    pub fn exists(&self, key: &str) -> ClientResult<bool> {
        self.facade
            .execute(Command::new("EXISTS").arg(key), reply::flag)
    }

    pub fn rename(&self, old_key: &str, new_key: &str) -> ClientResult<String> {
        self.facade.execute(
            Command::new("RENAME").arg(old_key).arg(new_key),
            reply::status,
        )
    }

    /// Renames only if `new_key` does not exist. Returns 1 on rename.
    pub fn renamenx(&self, old_key: &str, new_key: &str) -> ClientResult<i64> {
        self.facade.execute(
            Command::new("RENAMENX").arg(old_key).arg(new_key),
            reply::integer,
        )
    }

    /// Deletes keys. Returns how many existed.
    pub fn del(&self, keys: &[&str]) -> ClientResult<i64> {
        self.facade
            .execute(Command::new("DEL").args(keys), reply::integer)
    }

    /// Numeric ascending sort of a list, set, or sorted set.
    pub fn sort(&self, key: &str) -> ClientResult<Vec<String>> {
        self.facade
            .execute(Command::new("SORT").arg(key), reply::string_list)
    }

    pub fn sort_by(&self, key: &str, params: &SortParams) -> ClientResult<Vec<String>> {
        self.facade
            .execute(params.apply(Command::new("SORT").arg(key)), reply::string_list)
    }

    /// Stored type name: `string`, `list`, `set`, `zset`, `hash`, or `none`.
    pub fn key_type(&self, key: &str) -> ClientResult<String> {
        self.facade
            .execute(Command::new("TYPE").arg(key), reply::status)
    }

    /// Keys matching a glob pattern.
    pub fn keys(&self, pattern: &str) -> ClientResult<HashSet<String>> {
        self.facade
            .execute(Command::new("KEYS").arg(pattern), reply::string_set)
    }
}

/// Options for `SORT`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortParams {
    by: Option<String>,
    limit: Option<(i64, i64)>,
    get: Vec<String>,
    descending: bool,
    alpha: bool,
}

impl SortParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort by external keys (`weight_*`), or `nosort` to skip sorting.
    pub fn by(mut self, pattern: impl Into<String>) -> Self {
        self.by = Some(pattern.into());
        self
    }

    pub fn limit(mut self, offset: i64, count: i64) -> Self {
        self.limit = Some((offset, count));
        self
    }

    /// Adds a `GET` pattern; may be repeated.
    pub fn get(mut self, pattern: impl Into<String>) -> Self {
        self.get.push(pattern.into());
        self
    }

    pub fn desc(mut self) -> Self {
        self.descending = true;
        self
    }

    pub fn asc(mut self) -> Self {
        self.descending = false;
        self
    }

    /// Sort lexicographically instead of numerically.
    pub fn alpha(mut self) -> Self {
        self.alpha = true;
        self
    }

    fn apply(&self, mut command: Command) -> Command {
        if let Some(pattern) = &self.by {
            command = command.arg("BY").arg(pattern);
        }
        if let Some((offset, count)) = self.limit {
            command = command.arg("LIMIT").arg_i64(offset).arg_i64(count);
        }
        for pattern in &self.get {
            command = command.arg("GET").arg(pattern);
        }
        if self.descending {
            command = command.arg("DESC");
        }
        if self.alpha {
            command = command.arg("ALPHA");
        }
        command
    }
}
