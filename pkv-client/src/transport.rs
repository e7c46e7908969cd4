//! # Transport Seam
//!
//! Purpose: Separate "how a connection talks to the store" from the pool.
//! The pool only needs to open a connection, run one command on it, and ping
//! it; the TCP implementation below speaks RESP2.
//!
//! ## Design Principles
//! 1. **Strategy Pattern**: `Connector` builds `Transport`s; the pool holds a
//!    `dyn Connector` so tests and alternate stores plug in without changes.
//! 2. **Handshake On Connect**: Authentication and database selection happen
//!    once, before a connection ever reaches the idle list.
//! 3. **Buffer Reuse**: Each TCP connection keeps its own read/write buffers.

use std::io::{self, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};

use crate::config::PoolConfig;
use crate::error::{ClientError, ClientResult};
use crate::resp::{read_response, Command, RespValue};

/// A live, exclusively owned connection to the store.
pub trait Transport: Send {
    /// Sends one command and reads its reply.
    ///
    /// Store-side errors come back as `Ok(RespValue::Error(..))`; an `Err`
    /// means the connection itself is no longer trustworthy.
    fn exec(&mut self, command: &Command) -> ClientResult<RespValue>;

    /// Liveness check used by the idle eviction sweep.
    fn ping(&mut self) -> bool {
        matches!(self.exec(&Command::new("PING")), Ok(RespValue::Simple(_)))
    }
}

/// Opens new transports for the pool.
pub trait Connector: Send + Sync {
    fn connect(&self, config: &PoolConfig) -> ClientResult<Box<dyn Transport>>;
}

/// Default connector: RESP2 over TCP.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    fn connect(&self, config: &PoolConfig) -> ClientResult<Box<dyn Transport>> {
        let mut transport = TcpTransport::connect(config)?;
        transport.handshake(config)?;
        Ok(Box::new(transport))
    }
}

/// Single TCP connection with reusable buffers.
pub struct TcpTransport {
    // Buffered reader reduces syscalls while still allowing direct writes.
    reader: BufReader<TcpStream>,
    line_buf: Vec<u8>,
    write_buf: Vec<u8>,
}

impl TcpTransport {
    fn connect(config: &PoolConfig) -> ClientResult<Self> {
        let addr = config
            .address()
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no address for {}:{}", config.host, config.port),
                )
            })?;
        let stream = TcpStream::connect_timeout(&addr, config.timeout)?;
        stream.set_read_timeout(Some(config.timeout))?;
        stream.set_write_timeout(Some(config.timeout))?;
        // Disable Nagle to keep request latency low for small payloads.
        stream.set_nodelay(true)?;

        Ok(TcpTransport {
            reader: BufReader::new(stream),
            line_buf: Vec::with_capacity(128),
            write_buf: Vec::with_capacity(256),
        })
    }

    fn handshake(&mut self, config: &PoolConfig) -> ClientResult<()> {
        if let Some(password) = &config.password {
            self.expect_ok(&Command::new("AUTH").arg(password))?;
        }
        if config.database != 0 {
            self.expect_ok(&Command::new("SELECT").arg(config.database.to_string()))?;
        }
        Ok(())
    }

    fn expect_ok(&mut self, command: &Command) -> ClientResult<()> {
        match self.exec(command)? {
            RespValue::Simple(_) => Ok(()),
            RespValue::Error(message) => Err(ClientError::remote(&message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

impl Transport for TcpTransport {
    fn exec(&mut self, command: &Command) -> ClientResult<RespValue> {
        self.write_buf.clear();
        command.encode(&mut self.write_buf);

        let stream = self.reader.get_mut();
        stream.write_all(&self.write_buf)?;
        stream.flush()?;

        read_response(&mut self.reader, &mut self.line_buf)
    }
}
