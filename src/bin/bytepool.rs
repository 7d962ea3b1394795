//! bytepool demonstration harness
//!
//! Drives the public queue operations through the classic demonstration
//! workloads and reports pool state. Fatal pool errors are logged and the
//! process exits nonzero; the pool never continues past them.
//!
//! # Examples
//!
//! ```bash
//! # Interleaved enqueue/dequeue across two queues
//! bytepool scs
//!
//! # Fill every slot, then print occupancy as JSON
//! bytepool fill
//!
//! # Watch placement decisions
//! bytepool --log-level debug reallocation
//! ```

use bytepool::error::{Error, Result};
use bytepool::{BytePool, PoolConfig, PoolStats};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Compacting byte-queue pool demo
#[derive(Parser, Debug)]
#[command(name = "bytepool")]
#[command(version = bytepool::VERSION)]
#[command(about = "Fixed-capacity compacting byte-queue pool", long_about = None)]
struct Cli {
    /// Scenario to execute
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interleaved enqueue/dequeue across two queues
    Scs,

    /// Fill every slot with a full default-size queue
    Fill,

    /// Grow a queue into a freed neighbour gap, shrink it, refill the gap
    Reallocation,

    /// Destroy scattered queues and compact the survivors
    Organization,

    /// Print the default configuration and empty-pool stats
    Stats,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run(&cli.command) {
        error!(%err, "pool operation failed");
        std::process::exit(1);
    }
}

fn run(command: &Commands) -> Result<()> {
    match command {
        Commands::Scs => scs(),
        Commands::Fill => fill(),
        Commands::Reallocation => reallocation(),
        Commands::Organization => organization(),
        Commands::Stats => stats(),
    }
}

fn print_stats(stats: &PoolStats) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)
        .map_err(|e| Error::Serialization(e.to_string()))?;
    println!("{json}");
    Ok(())
}

/// Two queues sharing the pool: expected output `0 1`, `2 5`, `3 4 6`
fn scs() -> Result<()> {
    let mut pool = BytePool::new();

    let q0 = pool.create_queue()?;
    pool.enqueue(q0, 0)?;
    pool.enqueue(q0, 1)?;
    let q1 = pool.create_queue()?;
    pool.enqueue(q1, 3)?;
    pool.enqueue(q0, 2)?;
    pool.enqueue(q1, 4)?;
    println!("{} {}", pool.dequeue(q0)?, pool.dequeue(q0)?);

    pool.enqueue(q0, 5)?;
    pool.enqueue(q1, 6)?;
    println!("{} {}", pool.dequeue(q0)?, pool.dequeue(q0)?);
    pool.destroy_queue(q0, false)?;

    println!(
        "{} {} {}",
        pool.dequeue(q1)?,
        pool.dequeue(q1)?,
        pool.dequeue(q1)?
    );
    pool.destroy_queue(q1, false)?;
    Ok(())
}

/// Occupy every slot and every byte of the pool
fn fill() -> Result<()> {
    let mut pool = BytePool::new();
    let max_queues = pool.config().max_queues;
    let increment = pool.config().growth_increment;

    for _ in 0..max_queues {
        let id = pool.create_queue()?;
        for byte in 1..=increment as u8 {
            pool.enqueue(id, byte)?;
        }
    }

    info!(queues = max_queues, "pool filled to capacity");
    print_stats(&pool.stats())
}

/// Destroy the middle of three full queues, grow the first into the gap,
/// drain it back down, and refill the gap with a fresh queue
fn reallocation() -> Result<()> {
    let mut pool = BytePool::new();
    let increment = pool.config().growth_increment as u8;

    let q1 = pool.create_queue()?;
    let q2 = pool.create_queue()?;
    let q3 = pool.create_queue()?;
    for byte in 1..=increment {
        pool.enqueue(q1, byte)?;
        pool.enqueue(q2, byte)?;
        pool.enqueue(q3, byte)?;
    }

    pool.destroy_queue(q2, false)?;
    for byte in increment + 1..=increment * 2 {
        pool.enqueue(q1, byte)?;
    }
    info!(capacity = pool.capacity(q1)?, "first queue grew in place");

    for _ in 0..48 {
        println!("byte removed from first queue: {}", pool.dequeue(q1)?);
    }
    info!(
        len = pool.len(q1)?,
        capacity = pool.capacity(q1)?,
        "first queue shrank back"
    );

    let q2 = pool.create_queue()?;
    for byte in 1..=increment {
        pool.enqueue(q2, byte)?;
    }
    print_stats(&pool.stats())
}

/// Six full queues, three destroyed, then one compaction pass
fn organization() -> Result<()> {
    let mut pool = BytePool::new();
    let increment = pool.config().growth_increment as u8;

    let mut ids = Vec::new();
    for _ in 0..6 {
        ids.push(pool.create_queue()?);
    }
    for byte in 1..=increment {
        for &id in &ids {
            pool.enqueue(id, byte)?;
        }
    }

    pool.destroy_queue(ids[0], true)?;
    pool.destroy_queue(ids[4], true)?;
    pool.destroy_queue(ids[3], true)?;
    info!(gaps = pool.stats().gap_count, "before compaction");

    let moved = pool.compact();
    info!(moved, gaps = pool.stats().gap_count, "after compaction");
    print_stats(&pool.stats())
}

fn stats() -> Result<()> {
    let config = PoolConfig::default();
    let json = serde_json::to_string_pretty(&config)
        .map_err(|e| Error::Serialization(e.to_string()))?;
    println!("{json}");

    let pool = BytePool::new();
    print_stats(&pool.stats())
}
