//! # Facade Load Driver
//!
//! Purpose: Drive the pooled facade from many threads against a live store so
//! pool sizing and per-command latency can be compared over time.
//!
//! Usage: `pkv-bench [threads] [ops_per_thread] [value_size]`
//!
//! Configuration comes from `PKV_CONFIG` (a properties file) or the fallback
//! pool settings. `RUST_LOG` controls log output.

use std::env;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use pkv_client::KvFacade;
use pkv_idgen::{CounterIdGenerator, IdGenerator};
use tracing_subscriber::EnvFilter;

const DEFAULT_THREADS: usize = 16;
const DEFAULT_OPS_PER_THREAD: usize = 10_000;
const DEFAULT_VALUE_SIZE: usize = 128;

struct BenchConfig {
    threads: usize,
    ops_per_thread: usize,
    value_size: usize,
}

impl BenchConfig {
    fn from_args() -> Self {
        let mut args = env::args().skip(1);
        BenchConfig {
            threads: parse_usize(args.next(), DEFAULT_THREADS).max(1),
            ops_per_thread: parse_usize(args.next(), DEFAULT_OPS_PER_THREAD),
            value_size: parse_usize(args.next(), DEFAULT_VALUE_SIZE),
        }
    }
}

fn parse_usize(value: Option<String>, fallback: usize) -> usize {
    value.and_then(|raw| raw.parse().ok()).unwrap_or(fallback)
}

fn report(label: &str, ops: usize, elapsed: Duration) {
    let secs = elapsed.as_secs_f64();
    let ops_per_sec = (ops as f64) / secs;
    let micros_per_op = (secs * 1e6) / (ops as f64);
    println!("{label}: {ops} ops in {secs:.3}s ({ops_per_sec:.0} ops/s, {micros_per_op:.1} us/op)");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = BenchConfig::from_args();
    let kv = KvFacade::from_env();
    let pool = kv.pool().context("building connection pool")?;
    println!(
        "threads={}, ops_per_thread={}, value_size={}, max_total={}",
        config.threads,
        config.ops_per_thread,
        config.value_size,
        pool.config().max_total
    );

    let value = vec![b'x'; config.value_size];
    run_phase(&kv, &config, "SET", |kv, worker, op| {
        kv.strings().set(&format!("bench:{worker}:{op}"), &value)?;
        Ok(())
    })?;
    run_phase(&kv, &config, "GET", |kv, worker, op| {
        kv.strings().get_bytes(&format!("bench:{worker}:{op}"))?;
        Ok(())
    })?;
    run_phase(&kv, &config, "INCR", |kv, _, _| {
        CounterIdGenerator::new(kv).get_id("bench", 0)?;
        Ok(())
    })?;

    let stats = kv.stats().context("pool was never initialized")?;
    println!("pool: {}", serde_json::to_string(&stats)?);
    kv.shutdown();
    Ok(())
}

fn run_phase<F>(kv: &KvFacade, config: &BenchConfig, label: &str, op: F) -> Result<()>
where
    F: Fn(&KvFacade, usize, usize) -> pkv_client::ClientResult<()> + Sync,
{
    tracing::debug!(phase = label, threads = config.threads, "starting phase");
    let start = Instant::now();
    thread::scope(|scope| -> Result<()> {
        let handles: Vec<_> = (0..config.threads)
            .map(|worker| {
                let op = &op;
                scope.spawn(move || -> pkv_client::ClientResult<()> {
                    for idx in 0..config.ops_per_thread {
                        op(kv, worker, idx)?;
                    }
                    Ok(())
                })
            })
            .collect();
        for handle in handles {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("{label} worker panicked"))?
                .with_context(|| format!("{label} phase failed"))?;
        }
        Ok(())
    })?;
    report(label, config.threads * config.ops_per_thread, start.elapsed());
    Ok(())
}
