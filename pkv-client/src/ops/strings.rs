//! String-valued keys, including the atomic counters behind ID generation.

use crate::error::ClientResult;
use crate::facade::KvFacade;
use crate::reply;
use crate::resp::Command;

/// String operations.
#[derive(Clone, Copy)]
pub struct Strings<'a> {
    facade: &'a KvFacade,
}

impl<'a> Strings<'a> {
    pub(crate) fn new(facade: &'a KvFacade) -> Self {
        Strings { facade }
    }

    /// Returns `None` when the key is missing.
    pub fn get(&self, key: &str) -> ClientResult<Option<String>> {
        self.facade
            .execute(Command::new("GET").arg(key), reply::optional_string)
    }

    /// Binary-safe `get`.
    pub fn get_bytes(&self, key: &str) -> ClientResult<Option<Vec<u8>>> {
        self.facade
            .execute(Command::new("GET").arg(key), reply::optional_bytes)
    }

    /// Sets a value without expiration. Returns the status reply (`OK`).
    pub fn set(&self, key: &str, value: impl AsRef<[u8]>) -> ClientResult<String> {
        self.facade
            .execute(Command::new("SET").arg(key).arg(value), reply::status)
    }

    /// Sets a value that expires after `seconds`.
    pub fn set_ex(&self, key: &str, seconds: i64, value: impl AsRef<[u8]>) -> ClientResult<String> {
        self.facade.execute(
            Command::new("SETEX").arg(key).arg_i64(seconds).arg(value),
            reply::status,
        )
    }

    /// Sets only if missing. Returns 1 when set, 0 when the key existed.
    pub fn setnx(&self, key: &str, value: impl AsRef<[u8]>) -> ClientResult<i64> {
        self.facade
            .execute(Command::new("SETNX").arg(key).arg(value), reply::integer)
    }

    /// Overwrites part of the value from `offset`. Returns the new length.
    pub fn setrange(&self, key: &str, offset: i64, value: impl AsRef<[u8]>) -> ClientResult<i64> {
        self.facade.execute(
            Command::new("SETRANGE").arg(key).arg_i64(offset).arg(value),
            reply::integer,
        )
    }

    /// Appends to the value. Returns the new length.
    pub fn append(&self, key: &str, value: impl AsRef<[u8]>) -> ClientResult<i64> {
        self.facade
            .execute(Command::new("APPEND").arg(key).arg(value), reply::integer)
    }

    /// Atomically adds `delta`. A missing key counts from 0.
    pub fn incr_by(&self, key: &str, delta: i64) -> ClientResult<i64> {
        self.facade.execute(
            Command::new("INCRBY").arg(key).arg_i64(delta),
            reply::integer,
        )
    }

    /// Atomically subtracts `delta`. A missing key counts from 0.
    pub fn decr_by(&self, key: &str, delta: i64) -> ClientResult<i64> {
        self.facade.execute(
            Command::new("DECRBY").arg(key).arg_i64(delta),
            reply::integer,
        )
    }

    /// Substring by inclusive offsets; negative offsets count from the end.
    pub fn getrange(&self, key: &str, start: i64, end: i64) -> ClientResult<String> {
        self.facade.execute(
            Command::new("GETRANGE").arg(key).arg_i64(start).arg_i64(end),
            reply::string,
        )
    }

    /// Sets a new value and returns the old one.
    pub fn getset(&self, key: &str, value: impl AsRef<[u8]>) -> ClientResult<Option<String>> {
        self.facade.execute(
            Command::new("GETSET").arg(key).arg(value),
            reply::optional_string,
        )
    }

    /// Values in key order, `None` for missing keys.
    pub fn mget(&self, keys: &[&str]) -> ClientResult<Vec<Option<String>>> {
        self.facade
            .execute(Command::new("MGET").args(keys), reply::optional_string_list)
    }

    pub fn mset(&self, pairs: &[(&str, &str)]) -> ClientResult<String> {
        let command = pairs
            .iter()
            .fold(Command::new("MSET"), |command, (key, value)| {
                command.arg(key).arg(value)
            });
        self.facade.execute(command, reply::status)
    }

    pub fn strlen(&self, key: &str) -> ClientResult<i64> {
        self.facade
            .execute(Command::new("STRLEN").arg(key), reply::integer)
    }
}
