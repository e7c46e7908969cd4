//! List commands. Indexes are zero-based; negative indexes count from the tail.

use crate::error::ClientResult;
use crate::facade::KvFacade;
use crate::reply;
use crate::resp::Command;

/// List operations.
#[derive(Clone, Copy)]
pub struct Lists<'a> {
    facade: &'a KvFacade,
}

impl<'a> Lists<'a> {
    pub(crate) fn new(facade: &'a KvFacade) -> Self {
        Lists { facade }
    }

    /// Length of the list, 0 when missing.
    pub fn llen(&self, key: &str) -> ClientResult<i64> {
        self.facade
            .execute(Command::new("LLEN").arg(key), reply::integer)
    }

    /// Overwrites the element at `index`.
    pub fn lset(&self, key: &str, index: i64, value: impl AsRef<[u8]>) -> ClientResult<String> {
        self.facade.execute(
            Command::new("LSET").arg(key).arg_i64(index).arg(value),
            reply::status,
        )
    }

    pub fn lindex(&self, key: &str, index: i64) -> ClientResult<Option<String>> {
        self.facade.execute(
            Command::new("LINDEX").arg(key).arg_i64(index),
            reply::optional_string,
        )
    }

    pub fn lindex_bytes(&self, key: &str, index: i64) -> ClientResult<Option<Vec<u8>>> {
        self.facade.execute(
            Command::new("LINDEX").arg(key).arg_i64(index),
            reply::optional_bytes,
        )
    }

    /// Removes and returns the head, `None` when empty.
    pub fn lpop(&self, key: &str) -> ClientResult<Option<String>> {
        self.facade
            .execute(Command::new("LPOP").arg(key), reply::optional_string)
    }

    /// Removes and returns the tail, `None` when empty.
    pub fn rpop(&self, key: &str) -> ClientResult<Option<String>> {
        self.facade
            .execute(Command::new("RPOP").arg(key), reply::optional_string)
    }

    /// Prepends a value. Returns the new length.
    pub fn lpush(&self, key: &str, value: impl AsRef<[u8]>) -> ClientResult<i64> {
        self.facade
            .execute(Command::new("LPUSH").arg(key).arg(value), reply::integer)
    }

    /// Appends a value. Returns the new length.
    pub fn rpush(&self, key: &str, value: impl AsRef<[u8]>) -> ClientResult<i64> {
        self.facade
            .execute(Command::new("RPUSH").arg(key).arg(value), reply::integer)
    }

    /// Elements in `start..=end`; `lrange(key, 0, -1)` is the whole list.
    pub fn lrange(&self, key: &str, start: i64, end: i64) -> ClientResult<Vec<String>> {
        self.facade.execute(
            Command::new("LRANGE").arg(key).arg_i64(start).arg_i64(end),
            reply::string_list,
        )
    }

    pub fn lrange_bytes(&self, key: &str, start: i64, end: i64) -> ClientResult<Vec<Vec<u8>>> {
        self.facade.execute(
            Command::new("LRANGE").arg(key).arg_i64(start).arg_i64(end),
            reply::bytes_list,
        )
    }

    /// Removes up to `count` occurrences of `value` (all when 0, from the
    /// tail when negative). Returns how many were removed.
    pub fn lrem(&self, key: &str, count: i64, value: impl AsRef<[u8]>) -> ClientResult<i64> {
        self.facade.execute(
            Command::new("LREM").arg(key).arg_i64(count).arg(value),
            reply::integer,
        )
    }

    /// Keeps only `start..=end`.
    pub fn ltrim(&self, key: &str, start: i64, end: i64) -> ClientResult<String> {
        self.facade.execute(
            Command::new("LTRIM").arg(key).arg_i64(start).arg_i64(end),
            reply::status,
        )
    }
}
