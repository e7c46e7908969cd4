//! In-process store used by unit tests in place of a TCP server.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::PoolConfig;
use crate::error::{ClientError, ClientResult};
use crate::resp::{Command, RespValue};
use crate::transport::{Connector, Transport};

pub(crate) struct FakeStore {
    strings: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
    connects: AtomicUsize,
    commands: AtomicUsize,
    alive: AtomicBool,
    refuse: AtomicBool,
    ping_delay_ms: AtomicU64,
}

impl FakeStore {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(FakeStore {
            strings: Mutex::new(HashMap::new()),
            connects: AtomicUsize::new(0),
            commands: AtomicUsize::new(0),
            alive: AtomicBool::new(true),
            refuse: AtomicBool::new(false),
            ping_delay_ms: AtomicU64::new(0),
        })
    }

    pub(crate) fn connector(self: &Arc<Self>) -> Arc<dyn Connector> {
        Arc::new(FakeConnector(Arc::clone(self)))
    }

    pub(crate) fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn commands(&self) -> usize {
        self.commands.load(Ordering::SeqCst)
    }

    pub(crate) fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::SeqCst);
    }

    pub(crate) fn refuse_connections(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Makes every liveness ping stall for `delay` before answering.
    pub(crate) fn set_ping_delay(&self, delay: Duration) {
        self.ping_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    fn handle(&self, command: &Command) -> ClientResult<RespValue> {
        let (name, argv) = (command.name(), command.argv());
        if !self.alive.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "store gone").into());
        }
        let mut strings = self.strings.lock();
        let reply = match (name, &argv[1..]) {
            (b"PING", []) => RespValue::simple("PONG"),
            (b"SET", [key, value]) => {
                strings.insert(key.clone(), value.clone());
                RespValue::simple("OK")
            }
            (b"GET", [key]) => RespValue::Bulk(strings.get(key).cloned()),
            (b"INCRBY", [key, delta]) => {
                let delta: i64 = String::from_utf8_lossy(delta).parse().unwrap_or(0);
                let current: i64 = strings
                    .get(key)
                    .map(|raw| String::from_utf8_lossy(raw).parse().unwrap_or(0))
                    .unwrap_or(0);
                let next = current + delta;
                strings.insert(key.clone(), next.to_string().into_bytes());
                RespValue::Integer(next)
            }
            (b"EXPIRE", [key, _seconds]) => RespValue::Integer(strings.contains_key(key) as i64),
            (b"BROKEN", _) => {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe").into())
            }
            _ => RespValue::Error(b"ERR unknown command".to_vec()),
        };
        Ok(reply)
    }
}

struct FakeConnector(Arc<FakeStore>);

impl Connector for FakeConnector {
    fn connect(&self, _config: &PoolConfig) -> ClientResult<Box<dyn Transport>> {
        if self.0.refuse.load(Ordering::SeqCst) {
            return Err(ClientError::Connection(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "refused",
            )));
        }
        self.0.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeTransport(Arc::clone(&self.0))))
    }
}

struct FakeTransport(Arc<FakeStore>);

impl Transport for FakeTransport {
    fn exec(&mut self, command: &Command) -> ClientResult<RespValue> {
        self.0.commands.fetch_add(1, Ordering::SeqCst);
        self.0.handle(command)
    }

    fn ping(&mut self) -> bool {
        let delay = self.0.ping_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            thread::sleep(Duration::from_millis(delay));
        }
        matches!(self.exec(&Command::new("PING")), Ok(RespValue::Simple(_)))
    }
}
