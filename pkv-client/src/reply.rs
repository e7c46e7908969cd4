//! Reply mappers shared by the operation groups.
//!
//! Each mapper turns a raw `RespValue` into the natural Rust type for a
//! command. Error replies never reach these functions; the facade converts
//! them to `ClientError::RemoteCommand` first.

use std::collections::{HashMap, HashSet};

use crate::error::{ClientError, ClientResult};
use crate::resp::RespValue;

pub(crate) fn integer(reply: RespValue) -> ClientResult<i64> {
    match reply {
        RespValue::Integer(value) => Ok(value),
        _ => Err(ClientError::UnexpectedResponse),
    }
}

/// `:1` means yes, anything else no.
pub(crate) fn flag(reply: RespValue) -> ClientResult<bool> {
    integer(reply).map(|value| value == 1)
}

/// Integer reply, or `None` for a null bulk (e.g. `ZRANK` on a missing member).
pub(crate) fn optional_integer(reply: RespValue) -> ClientResult<Option<i64>> {
    match reply {
        RespValue::Integer(value) => Ok(Some(value)),
        RespValue::Bulk(None) => Ok(None),
        _ => Err(ClientError::UnexpectedResponse),
    }
}

/// Status replies such as `+OK`, returned as text.
pub(crate) fn status(reply: RespValue) -> ClientResult<String> {
    match reply {
        RespValue::Simple(text) => Ok(String::from_utf8(text)?),
        RespValue::Bulk(Some(data)) => Ok(String::from_utf8(data)?),
        _ => Err(ClientError::UnexpectedResponse),
    }
}

pub(crate) fn optional_bytes(reply: RespValue) -> ClientResult<Option<Vec<u8>>> {
    match reply {
        RespValue::Bulk(data) => Ok(data),
        _ => Err(ClientError::UnexpectedResponse),
    }
}

pub(crate) fn optional_string(reply: RespValue) -> ClientResult<Option<String>> {
    optional_bytes(reply)?
        .map(String::from_utf8)
        .transpose()
        .map_err(ClientError::from)
}

/// Bulk reply that is never null for the command, e.g. `GETRANGE`.
pub(crate) fn string(reply: RespValue) -> ClientResult<String> {
    optional_string(reply)?.ok_or(ClientError::UnexpectedResponse)
}

pub(crate) fn optional_score(reply: RespValue) -> ClientResult<Option<f64>> {
    match optional_string(reply)? {
        Some(text) => parse_score(&text).map(Some),
        None => Ok(None),
    }
}

pub(crate) fn score(reply: RespValue) -> ClientResult<f64> {
    optional_score(reply)?.ok_or(ClientError::UnexpectedResponse)
}

fn items(reply: RespValue) -> ClientResult<Vec<RespValue>> {
    match reply {
        RespValue::Array(Some(items)) => Ok(items),
        RespValue::Array(None) => Ok(Vec::new()),
        _ => Err(ClientError::UnexpectedResponse),
    }
}

pub(crate) fn bytes_list(reply: RespValue) -> ClientResult<Vec<Vec<u8>>> {
    items(reply)?
        .into_iter()
        .map(|item| optional_bytes(item)?.ok_or(ClientError::UnexpectedResponse))
        .collect()
}

pub(crate) fn string_list(reply: RespValue) -> ClientResult<Vec<String>> {
    bytes_list(reply)?
        .into_iter()
        .map(|data| String::from_utf8(data).map_err(ClientError::from))
        .collect()
}

/// Array where individual entries may be null, e.g. `MGET`.
pub(crate) fn optional_string_list(reply: RespValue) -> ClientResult<Vec<Option<String>>> {
    items(reply)?.into_iter().map(optional_string).collect()
}

pub(crate) fn string_set(reply: RespValue) -> ClientResult<HashSet<String>> {
    Ok(string_list(reply)?.into_iter().collect())
}

/// Flat `field, value, field, value ...` array, e.g. `HGETALL`.
pub(crate) fn string_map(reply: RespValue) -> ClientResult<HashMap<String, String>> {
    let flat = string_list(reply)?;
    if flat.len() % 2 != 0 {
        return Err(ClientError::UnexpectedResponse);
    }
    let mut map = HashMap::with_capacity(flat.len() / 2);
    let mut iter = flat.into_iter();
    while let (Some(field), Some(value)) = (iter.next(), iter.next()) {
        map.insert(field, value);
    }
    Ok(map)
}

fn parse_score(text: &str) -> ClientResult<f64> {
    text.trim().parse().map_err(|_| ClientError::UnexpectedResponse)
}
