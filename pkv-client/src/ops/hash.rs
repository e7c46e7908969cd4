//! Hash (field map) commands.

use std::collections::{HashMap, HashSet};

use crate::error::ClientResult;
use crate::facade::KvFacade;
use crate::reply;
use crate::resp::Command;

/// Hash operations.
#[derive(Clone, Copy)]
pub struct Hash<'a> {
    facade: &'a KvFacade,
}

impl<'a> Hash<'a> {
    pub(crate) fn new(facade: &'a KvFacade) -> Self {
        Hash { facade }
    }

    /// Removes a field. Returns 1 if it existed.
    pub fn hdel(&self, key: &str, field: &str) -> ClientResult<i64> {
        self.facade
            .execute(Command::new("HDEL").arg(key).arg(field), reply::integer)
    }

    /// Deletes the whole hash.
    pub fn hdel_key(&self, key: &str) -> ClientResult<i64> {
        self.facade
            .execute(Command::new("DEL").arg(key), reply::integer)
    }

    pub fn hexists(&self, key: &str, field: &str) -> ClientResult<bool> {
        self.facade
            .execute(Command::new("HEXISTS").arg(key).arg(field), reply::flag)
    }

    /// Field value, `None` when the field or hash is missing.
    pub fn hget(&self, key: &str, field: &str) -> ClientResult<Option<String>> {
        self.facade.execute(
            Command::new("HGET").arg(key).arg(field),
            reply::optional_string,
        )
    }

    pub fn hget_bytes(&self, key: &str, field: &str) -> ClientResult<Option<Vec<u8>>> {
        self.facade.execute(
            Command::new("HGET").arg(key).arg(field),
            reply::optional_bytes,
        )
    }

    pub fn hgetall(&self, key: &str) -> ClientResult<HashMap<String, String>> {
        self.facade
            .execute(Command::new("HGETALL").arg(key), reply::string_map)
    }

    /// Sets a field. Returns 1 if the field was new, 0 if it was updated.
    pub fn hset(&self, key: &str, field: &str, value: impl AsRef<[u8]>) -> ClientResult<i64> {
        self.facade.execute(
            Command::new("HSET").arg(key).arg(field).arg(value),
            reply::integer,
        )
    }

    /// Sets a field only if missing. Returns 1 when set.
    pub fn hsetnx(&self, key: &str, field: &str, value: impl AsRef<[u8]>) -> ClientResult<i64> {
        self.facade.execute(
            Command::new("HSETNX").arg(key).arg(field).arg(value),
            reply::integer,
        )
    }

    pub fn hvals(&self, key: &str) -> ClientResult<Vec<String>> {
        self.facade
            .execute(Command::new("HVALS").arg(key), reply::string_list)
    }

    /// Atomically adds `delta` to an integer field. Returns the new value.
    pub fn hincrby(&self, key: &str, field: &str, delta: i64) -> ClientResult<i64> {
        self.facade.execute(
            Command::new("HINCRBY").arg(key).arg(field).arg_i64(delta),
            reply::integer,
        )
    }

    pub fn hkeys(&self, key: &str) -> ClientResult<HashSet<String>> {
        self.facade
            .execute(Command::new("HKEYS").arg(key), reply::string_set)
    }

    pub fn hlen(&self, key: &str) -> ClientResult<i64> {
        self.facade
            .execute(Command::new("HLEN").arg(key), reply::integer)
    }

    /// Values in field order, `None` for missing fields.
    pub fn hmget(&self, key: &str, fields: &[&str]) -> ClientResult<Vec<Option<String>>> {
        self.facade.execute(
            Command::new("HMGET").arg(key).args(fields),
            reply::optional_string_list,
        )
    }

    pub fn hmset(&self, key: &str, pairs: &[(&str, &str)]) -> ClientResult<String> {
        let command = pairs
            .iter()
            .fold(Command::new("HMSET").arg(key), |command, (field, value)| {
                command.arg(field).arg(value)
            });
        self.facade.execute(command, reply::status)
    }
}
