//! Helper binary that acquires lock, writes marker, holds, releases
//!
//! Usage: lock_holder <lock_path> <marker_path> <process_id>
//!
//! Multiple processes running this against one lock path must execute their
//! critical sections one after another.

use anyhow::{bail, Context};
use flock::Flock;
use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        bail!("Usage: lock_holder <lock_path> <marker_path> <process_id>");
    }

    let lock = Flock::new(&args[1]);
    let marker_path = &args[2];
    let process_id = &args[3];

    lock.lock()
        .with_context(|| format!("process {} failed to lock {}", process_id, lock))?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(marker_path)
        .context("Failed to open marker file")?;

    writeln!(file, "process_{} acquired lock", process_id)?;
    std::thread::sleep(Duration::from_millis(100));
    writeln!(file, "process_{} releasing lock", process_id)?;

    lock.unlock()?;
    println!("Process {} completed", process_id);
    Ok(())
}
