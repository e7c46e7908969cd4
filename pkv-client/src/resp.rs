//! # RESP2 Encoding and Parsing
//!
//! Purpose: Build store commands and parse replies for the TCP transport,
//! keeping allocations under control.
//!
//! ## Design Principles
//! 1. **Builder Commands**: `Command` collects arguments; operation groups
//!    never touch framing.
//! 2. **Buffer Reuse**: Callers provide buffers to avoid per-call allocations.
//! 3. **Binary-Safe**: Bulk strings are treated as raw bytes.
//! 4. **Fail Fast**: Invalid framing returns protocol errors immediately.

use std::io::BufRead;

use crate::error::{ClientError, ClientResult};

/// RESP reply value.
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    /// +OK style replies.
    Simple(Vec<u8>),
    /// -ERR ... replies.
    Error(Vec<u8>),
    /// :123 replies.
    Integer(i64),
    /// $... bulk strings, with None for null.
    Bulk(Option<Vec<u8>>),
    /// *... arrays, with None for a null array.
    Array(Option<Vec<RespValue>>),
}

impl RespValue {
    /// Convenience constructor for a non-null bulk reply.
    pub fn bulk(data: impl Into<Vec<u8>>) -> Self {
        RespValue::Bulk(Some(data.into()))
    }

    /// Convenience constructor for a simple status reply.
    pub fn simple(text: &str) -> Self {
        RespValue::Simple(text.as_bytes().to_vec())
    }
}

/// One store command: a name followed by binary-safe arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    argv: Vec<Vec<u8>>,
}

impl Command {
    pub fn new(name: &str) -> Self {
        Command {
            argv: vec![name.as_bytes().to_vec()],
        }
    }

    pub fn arg(mut self, arg: impl AsRef<[u8]>) -> Self {
        self.argv.push(arg.as_ref().to_vec());
        self
    }

    pub fn arg_i64(self, value: i64) -> Self {
        self.arg(value.to_string())
    }

    /// Scores use the store's `+inf`/`-inf` spelling for infinities.
    pub fn arg_f64(self, value: f64) -> Self {
        if value == f64::INFINITY {
            self.arg("+inf")
        } else if value == f64::NEG_INFINITY {
            self.arg("-inf")
        } else {
            self.arg(value.to_string())
        }
    }

    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        self.argv
            .extend(args.into_iter().map(|arg| arg.as_ref().to_vec()));
        self
    }

    /// Command name as sent, e.g. `b"GET"`.
    pub fn name(&self) -> &[u8] {
        &self.argv[0]
    }

    /// All parts including the name.
    pub fn argv(&self) -> &[Vec<u8>] {
        &self.argv
    }

    /// Encodes the command as a RESP2 array into `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        push_header(out, b'*', self.argv.len());
        for arg in &self.argv {
            push_header(out, b'$', arg.len());
            out.extend_from_slice(arg);
            out.extend_from_slice(b"\r\n");
        }
    }
}

/// Largest bulk string or array length accepted from the store.
const MAX_REPLY_LEN: i64 = 512 * 1024 * 1024;

/// Array slots reserved up front; longer arrays grow as elements arrive.
const PREALLOC_ITEMS: usize = 1024;

/// Reads one RESP value from the buffered reader.
pub fn read_response<R: BufRead>(reader: &mut R, line_buf: &mut Vec<u8>) -> ClientResult<RespValue> {
    read_line(reader, line_buf)?;
    let (&tag, rest) = line_buf.split_first().ok_or(ClientError::Protocol)?;

    match tag {
        b'+' => Ok(RespValue::Simple(rest.to_vec())),
        b'-' => Ok(RespValue::Error(rest.to_vec())),
        b':' => Ok(RespValue::Integer(parse_i64(rest)?)),
        b'$' => {
            let len = parse_i64(rest)?;
            read_bulk(reader, len)
        }
        b'*' => {
            let len = parse_i64(rest)?;
            read_array(reader, len, line_buf)
        }
        _ => Err(ClientError::Protocol),
    }
}

fn read_bulk<R: BufRead>(reader: &mut R, len: i64) -> ClientResult<RespValue> {
    if len < 0 {
        return Ok(RespValue::Bulk(None));
    }
    if len > MAX_REPLY_LEN {
        return Err(ClientError::Protocol);
    }
    let mut data = vec![0u8; len as usize];
    reader.read_exact(&mut data)?;

    let mut crlf = [0u8; 2];
    reader.read_exact(&mut crlf)?;
    if crlf != *b"\r\n" {
        return Err(ClientError::Protocol);
    }
    Ok(RespValue::Bulk(Some(data)))
}

fn read_array<R: BufRead>(
    reader: &mut R,
    len: i64,
    line_buf: &mut Vec<u8>,
) -> ClientResult<RespValue> {
    if len < 0 {
        return Ok(RespValue::Array(None));
    }
    if len > MAX_REPLY_LEN {
        return Err(ClientError::Protocol);
    }

    let mut items = Vec::with_capacity((len as usize).min(PREALLOC_ITEMS));
    for _ in 0..len {
        items.push(read_response(reader, line_buf)?);
    }
    Ok(RespValue::Array(Some(items)))
}

fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> ClientResult<()> {
    buf.clear();
    let bytes = reader.read_until(b'\n', buf)?;
    if bytes == 0 {
        return Err(ClientError::Protocol);
    }
    if !buf.ends_with(b"\r\n") {
        return Err(ClientError::Protocol);
    }
    buf.truncate(buf.len() - 2);
    Ok(())
}

fn parse_i64(data: &[u8]) -> ClientResult<i64> {
    std::str::from_utf8(data)
        .ok()
        .and_then(|text| text.parse().ok())
        .ok_or(ClientError::Protocol)
}

fn push_header(out: &mut Vec<u8>, tag: u8, len: usize) {
    out.push(tag);
    out.extend_from_slice(len.to_string().as_bytes());
    out.extend_from_slice(b"\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(input: &[u8]) -> ClientResult<RespValue> {
        let mut reader = Cursor::new(input.to_vec());
        let mut line = Vec::new();
        read_response(&mut reader, &mut line)
    }

    #[test]
    fn encodes_command() {
        let mut buf = Vec::new();
        Command::new("GET").arg("key").encode(&mut buf);
        assert_eq!(&buf, b"*2\r\n$3\r\nGET\r\n$3\r\nkey\r\n");
    }

    #[test]
    fn encodes_numeric_arguments() {
        let cmd = Command::new("ZADD")
            .arg("z")
            .arg_f64(1.5)
            .arg_f64(f64::NEG_INFINITY)
            .arg_i64(-3);
        let argv: Vec<&[u8]> = cmd.argv().iter().map(Vec::as_slice).collect();
        assert_eq!(argv, vec![&b"ZADD"[..], b"z", b"1.5", b"-inf", b"-3"]);
    }

    #[test]
    fn parses_simple_string() {
        assert_eq!(parse(b"+OK\r\n").unwrap(), RespValue::simple("OK"));
    }

    #[test]
    fn parses_bulk_and_null_bulk() {
        assert_eq!(parse(b"$5\r\nhello\r\n").unwrap(), RespValue::bulk("hello"));
        assert_eq!(parse(b"$-1\r\n").unwrap(), RespValue::Bulk(None));
    }

    #[test]
    fn parses_integer_and_error() {
        assert_eq!(parse(b":-2\r\n").unwrap(), RespValue::Integer(-2));
        assert_eq!(
            parse(b"-WRONGTYPE bad\r\n").unwrap(),
            RespValue::Error(b"WRONGTYPE bad".to_vec())
        );
    }

    #[test]
    fn parses_nested_array() {
        let resp = parse(b"*3\r\n$1\r\na\r\n$-1\r\n:7\r\n").unwrap();
        assert_eq!(
            resp,
            RespValue::Array(Some(vec![
                RespValue::bulk("a"),
                RespValue::Bulk(None),
                RespValue::Integer(7),
            ]))
        );
        assert_eq!(parse(b"*-1\r\n").unwrap(), RespValue::Array(None));
    }

    #[test]
    fn rejects_bad_framing() {
        assert!(matches!(parse(b"+OK\n"), Err(ClientError::Protocol)));
        assert!(matches!(parse(b"?x\r\n"), Err(ClientError::Protocol)));
        assert!(matches!(parse(b""), Err(ClientError::Protocol)));
    }

    #[test]
    fn rejects_oversized_lengths() {
        assert!(matches!(parse(b"$99999999999999\r\n"), Err(ClientError::Protocol)));
        assert!(matches!(parse(b"*99999999999999\r\n"), Err(ClientError::Protocol)));
        // Within the limit but truncated: fails on the missing elements.
        assert!(matches!(parse(b"*100000000\r\n:1\r\n"), Err(ClientError::Protocol)));
    }

    #[test]
    fn command_name_is_first_part() {
        let cmd = Command::new("HSET").arg("h").arg("f").arg("v");
        assert_eq!(cmd.name(), b"HSET");
        assert_eq!(cmd.argv().len(), 4);
    }
}
