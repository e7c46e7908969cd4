//! Sorted-set commands. Ranges come back in store order (ascending score
//! unless the command says otherwise), so they are returned as `Vec`.

use crate::error::ClientResult;
use crate::facade::KvFacade;
use crate::reply;
use crate::resp::Command;

/// Sorted-set operations.
#[derive(Clone, Copy)]
pub struct SortedSet<'a> {
    facade: &'a KvFacade,
}

impl<'a> SortedSet<'a> {
    pub(crate) fn new(facade: &'a KvFacade) -> Self {
        SortedSet { facade }
    }

    /// Adds or rescores a member. Returns 1 if it was new.
    pub fn zadd(&self, key: &str, score: f64, member: impl AsRef<[u8]>) -> ClientResult<i64> {
        self.facade.execute(
            Command::new("ZADD").arg(key).arg_f64(score).arg(member),
            reply::integer,
        )
    }

    pub fn zcard(&self, key: &str) -> ClientResult<i64> {
        self.facade
            .execute(Command::new("ZCARD").arg(key), reply::integer)
    }

    /// Members with `min <= score <= max`.
    pub fn zcount(&self, key: &str, min: f64, max: f64) -> ClientResult<i64> {
        self.facade.execute(
            Command::new("ZCOUNT").arg(key).arg_f64(min).arg_f64(max),
            reply::integer,
        )
    }

    /// Size of the full `0..-1` range, fetched in a single command.
    pub fn zlength(&self, key: &str) -> ClientResult<i64> {
        self.facade.execute(
            Command::new("ZRANGE").arg(key).arg_i64(0).arg_i64(-1),
            |value| Ok(reply::bytes_list(value)?.len() as i64),
        )
    }

    /// Adds `increment` to a member's score. Returns the new score.
    pub fn zincrby(&self, key: &str, increment: f64, member: impl AsRef<[u8]>) -> ClientResult<f64> {
        self.facade.execute(
            Command::new("ZINCRBY").arg(key).arg_f64(increment).arg(member),
            reply::score,
        )
    }

    /// Members by rank, lowest score first.
    pub fn zrange(&self, key: &str, start: i64, end: i64) -> ClientResult<Vec<String>> {
        self.facade.execute(
            Command::new("ZRANGE").arg(key).arg_i64(start).arg_i64(end),
            reply::string_list,
        )
    }

    /// Members by rank, highest score first.
    pub fn zrevrange(&self, key: &str, start: i64, end: i64) -> ClientResult<Vec<String>> {
        self.facade.execute(
            Command::new("ZREVRANGE").arg(key).arg_i64(start).arg_i64(end),
            reply::string_list,
        )
    }

    pub fn zrange_by_score(&self, key: &str, min: f64, max: f64) -> ClientResult<Vec<String>> {
        self.facade.execute(
            Command::new("ZRANGEBYSCORE").arg(key).arg_f64(min).arg_f64(max),
            reply::string_list,
        )
    }

    /// Rank from lowest score, `None` when the member is absent.
    pub fn zrank(&self, key: &str, member: impl AsRef<[u8]>) -> ClientResult<Option<i64>> {
        self.facade.execute(
            Command::new("ZRANK").arg(key).arg(member),
            reply::optional_integer,
        )
    }

    /// Rank from highest score, `None` when the member is absent.
    pub fn zrevrank(&self, key: &str, member: impl AsRef<[u8]>) -> ClientResult<Option<i64>> {
        self.facade.execute(
            Command::new("ZREVRANK").arg(key).arg(member),
            reply::optional_integer,
        )
    }

    pub fn zrem(&self, key: &str, member: impl AsRef<[u8]>) -> ClientResult<i64> {
        self.facade
            .execute(Command::new("ZREM").arg(key).arg(member), reply::integer)
    }

    /// Deletes the whole sorted set.
    pub fn zrem_key(&self, key: &str) -> ClientResult<i64> {
        self.facade
            .execute(Command::new("DEL").arg(key), reply::integer)
    }

    pub fn zremrange_by_rank(&self, key: &str, start: i64, end: i64) -> ClientResult<i64> {
        self.facade.execute(
            Command::new("ZREMRANGEBYRANK").arg(key).arg_i64(start).arg_i64(end),
            reply::integer,
        )
    }

    pub fn zremrange_by_score(&self, key: &str, min: f64, max: f64) -> ClientResult<i64> {
        self.facade.execute(
            Command::new("ZREMRANGEBYSCORE").arg(key).arg_f64(min).arg_f64(max),
            reply::integer,
        )
    }

    /// Score of a member; `0.0` when the member or key is absent.
    pub fn zscore(&self, key: &str, member: impl AsRef<[u8]>) -> ClientResult<f64> {
        self.facade.execute(
            Command::new("ZSCORE").arg(key).arg(member),
            |value| Ok(reply::optional_score(value)?.unwrap_or(0.0)),
        )
    }
}
