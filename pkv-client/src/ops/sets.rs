//! Unordered set commands.

use std::collections::HashSet;

use crate::error::ClientResult;
use crate::facade::KvFacade;
use crate::reply;
use crate::resp::Command;

/// Set operations.
#[derive(Clone, Copy)]
pub struct Sets<'a> {
    facade: &'a KvFacade,
}

impl<'a> Sets<'a> {
    pub(crate) fn new(facade: &'a KvFacade) -> Self {
        Sets { facade }
    }

    /// Adds a member. Returns 1 if it was new.
    pub fn sadd(&self, key: &str, member: impl AsRef<[u8]>) -> ClientResult<i64> {
        self.facade
            .execute(Command::new("SADD").arg(key).arg(member), reply::integer)
    }

    pub fn scard(&self, key: &str) -> ClientResult<i64> {
        self.facade
            .execute(Command::new("SCARD").arg(key), reply::integer)
    }

    /// Members of the first set absent from all others.
    pub fn sdiff(&self, keys: &[&str]) -> ClientResult<HashSet<String>> {
        self.facade
            .execute(Command::new("SDIFF").args(keys), reply::string_set)
    }

    /// Stores `sdiff(keys)` at `destination`. Returns its size.
    pub fn sdiffstore(&self, destination: &str, keys: &[&str]) -> ClientResult<i64> {
        self.facade.execute(
            Command::new("SDIFFSTORE").arg(destination).args(keys),
            reply::integer,
        )
    }

    pub fn sinter(&self, keys: &[&str]) -> ClientResult<HashSet<String>> {
        self.facade
            .execute(Command::new("SINTER").args(keys), reply::string_set)
    }

    pub fn sinterstore(&self, destination: &str, keys: &[&str]) -> ClientResult<i64> {
        self.facade.execute(
            Command::new("SINTERSTORE").arg(destination).args(keys),
            reply::integer,
        )
    }

    pub fn sismember(&self, key: &str, member: impl AsRef<[u8]>) -> ClientResult<bool> {
        self.facade
            .execute(Command::new("SISMEMBER").arg(key).arg(member), reply::flag)
    }

    pub fn smembers(&self, key: &str) -> ClientResult<HashSet<String>> {
        self.facade
            .execute(Command::new("SMEMBERS").arg(key), reply::string_set)
    }

    pub fn smembers_bytes(&self, key: &str) -> ClientResult<Vec<Vec<u8>>> {
        self.facade
            .execute(Command::new("SMEMBERS").arg(key), reply::bytes_list)
    }

    /// Moves a member between sets. Returns 1 if it was moved.
    pub fn smove(&self, source: &str, destination: &str, member: impl AsRef<[u8]>) -> ClientResult<i64> {
        self.facade.execute(
            Command::new("SMOVE").arg(source).arg(destination).arg(member),
            reply::integer,
        )
    }

    /// Removes and returns a random member, `None` when empty.
    pub fn spop(&self, key: &str) -> ClientResult<Option<String>> {
        self.facade
            .execute(Command::new("SPOP").arg(key), reply::optional_string)
    }

    pub fn srem(&self, key: &str, member: impl AsRef<[u8]>) -> ClientResult<i64> {
        self.facade
            .execute(Command::new("SREM").arg(key).arg(member), reply::integer)
    }

    pub fn sunion(&self, keys: &[&str]) -> ClientResult<HashSet<String>> {
        self.facade
            .execute(Command::new("SUNION").args(keys), reply::string_set)
    }

    pub fn sunionstore(&self, destination: &str, keys: &[&str]) -> ClientResult<i64> {
        self.facade.execute(
            Command::new("SUNIONSTORE").arg(destination).args(keys),
            reply::integer,
        )
    }
}
