//! # Pool Configuration
//!
//! Purpose: Resolve the pool tunables once, either from an external property
//! source or from the built-in fallback used when no source exists.
//!
//! ## Design Principles
//! 1. **Immutable After Resolve**: `PoolConfig` is a plain value; nothing
//!    mutates it once the pool is built.
//! 2. **Strict When Present**: A source that exists must supply every
//!    required property; silent defaults only apply when there is no source.
//! 3. **Pluggable Sources**: Anything that can answer `property(name)` works.
//!
//! Property names are looked up as `redis.<name>` first, then `<name>`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde_json::Value;

use crate::error::{ClientError, ClientResult};

const PROPERTY_PREFIX: &str = "redis.";

/// Pool and connection tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolConfig {
    /// Maximum connections checked out or idle at once.
    pub max_total: usize,
    /// Maximum idle connections kept for reuse.
    pub max_idle: usize,
    /// How long `acquire` blocks before giving up.
    pub max_wait: Duration,
    /// Period of the idle-connection liveness sweep.
    pub eviction_interval: Duration,
    /// Whether idle connections are pinged by the eviction sweep.
    pub test_while_idle: bool,
    /// Store host name or address.
    pub host: String,
    /// Store port.
    pub port: u16,
    /// Connect, read, and write timeout for each connection.
    pub timeout: Duration,
    /// Optional `AUTH` password.
    pub password: Option<String>,
    /// Logical database selected on connect.
    pub database: u32,
}

impl Default for PoolConfig {
    /// Fallback used when no configuration source is available.
    fn default() -> Self {
        PoolConfig {
            max_total: 10,
            max_idle: 8,
            max_wait: Duration::from_millis(2_000),
            eviction_interval: Duration::from_millis(30_000),
            test_while_idle: true,
            host: "127.0.0.1".to_string(),
            port: 6379,
            timeout: Duration::from_millis(60_000),
            password: None,
            database: 2,
        }
    }
}

impl PoolConfig {
    /// Resolves a config from `source`, or the fallback when there is none.
    pub fn resolve(source: Option<&dyn ConfigSource>) -> ClientResult<Self> {
        match source {
            Some(source) => Self::from_source(source),
            None => {
                tracing::info!("no configuration source, using fallback pool config");
                Ok(Self::default())
            }
        }
    }

    /// Reads every pool property from `source`.
    ///
    /// All properties except `password` are required.
    pub fn from_source(source: &dyn ConfigSource) -> ClientResult<Self> {
        let config = PoolConfig {
            max_total: required(source, "maxActive")?,
            max_idle: required(source, "maxIdle")?,
            max_wait: Duration::from_millis(required(source, "maxWait")?),
            eviction_interval: Duration::from_millis(required(
                source,
                "timeBetweenEvictionRunsMillis",
            )?),
            test_while_idle: required_bool(source, "testWhileIdle")?,
            host: required_string(source, "host")?,
            port: required(source, "port")?,
            timeout: Duration::from_millis(required(source, "timeout")?),
            password: lookup(source, "password").filter(|value| !value.is_empty()),
            database: required(source, "database")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks numeric bounds. `database` may be zero; everything else may not.
    pub fn validate(&self) -> ClientResult<()> {
        let checks = [
            ("maxActive", self.max_total == 0),
            ("maxIdle", self.max_idle == 0),
            ("maxWait", self.max_wait.is_zero()),
            ("timeBetweenEvictionRunsMillis", self.eviction_interval.is_zero()),
            ("port", self.port == 0),
            ("timeout", self.timeout.is_zero()),
        ];
        for (name, invalid) in checks {
            if invalid {
                return Err(ClientError::config(format!("{name} must be greater than zero")));
            }
        }
        if self.host.is_empty() {
            return Err(ClientError::config("host must not be empty"));
        }
        Ok(())
    }

    /// `host:port` pair used by the TCP connector.
    pub fn address(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

/// A named-property lookup, e.g. a properties file or a settings service.
pub trait ConfigSource: Send + Sync {
    /// Returns the raw value for `name`, if present.
    fn property(&self, name: &str) -> Option<String>;
}

impl ConfigSource for HashMap<String, String> {
    fn property(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Java-style `.properties` content: `key=value` or `key: value` per line.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    /// Parses properties text. Blank lines and `#`/`!` comments are skipped.
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let split = line.find(['=', ':']);
            let (key, value) = match split {
                Some(idx) => (&line[..idx], &line[idx + 1..]),
                None => (line, ""),
            };
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }
        Properties { entries }
    }

    /// Loads and parses a properties file.
    pub fn from_file(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            ClientError::config(format!("cannot read {}: {err}", path.display()))
        })?;
        Ok(Self::parse(&text))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ConfigSource for Properties {
    fn property(&self, name: &str) -> Option<String> {
        self.entries.get(name).cloned()
    }
}

/// A flat JSON object used as a property source.
///
/// Strings, numbers, and booleans are all accepted as property values.
#[derive(Debug, Clone)]
pub struct JsonSource {
    object: serde_json::Map<String, Value>,
}

impl JsonSource {
    pub fn parse(text: &str) -> ClientResult<Self> {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(object)) => Ok(JsonSource { object }),
            Ok(_) => Err(ClientError::config("json config must be an object")),
            Err(err) => Err(ClientError::config(format!("invalid json config: {err}"))),
        }
    }
}

impl ConfigSource for JsonSource {
    fn property(&self, name: &str) -> Option<String> {
        match self.object.get(name)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }
}

fn lookup(source: &dyn ConfigSource, name: &str) -> Option<String> {
    source
        .property(&format!("{PROPERTY_PREFIX}{name}"))
        .or_else(|| source.property(name))
}

fn required_string(source: &dyn ConfigSource, name: &str) -> ClientResult<String> {
    lookup(source, name)
        .map(|value| value.trim().to_string())
        .ok_or_else(|| ClientError::config(format!("missing property {name}")))
}

fn required<T: FromStr>(source: &dyn ConfigSource, name: &str) -> ClientResult<T> {
    let raw = required_string(source, name)?;
    raw.parse()
        .map_err(|_| ClientError::config(format!("invalid value for {name}: {raw:?}")))
}

fn required_bool(source: &dyn ConfigSource, name: &str) -> ClientResult<bool> {
    let raw = required_string(source, name)?;
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ClientError::config(format!("invalid value for {name}: {raw:?}")))
    }
}
