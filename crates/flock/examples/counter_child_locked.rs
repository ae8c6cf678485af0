//! Counter helper WITH file locking
//!
//! Usage: counter_child_locked <counter_path> <iterations>
//!
//! Performs read-modify-write operations on a counter file, each under an
//! exclusive lock on `<counter_path>.lock`.

use anyhow::{bail, Context};
use flock::Flock;
use std::env;
use std::fs;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        bail!("Usage: counter_child_locked <counter_path> <iterations>");
    }

    let counter_path = PathBuf::from(&args[1]);
    let iterations: usize = args[2].parse().context("iterations must be a number")?;

    let lock = Flock::new(counter_path.with_extension("lock"));

    for _ in 0..iterations {
        let _guard = lock.acquire()?;

        let content = fs::read_to_string(&counter_path).context("Failed to read counter file")?;
        let value: u32 = content
            .trim()
            .parse()
            .context("Counter file should contain a number")?;

        // Widen the race window
        std::thread::sleep(std::time::Duration::from_micros(10));

        fs::write(&counter_path, (value + 1).to_string()).context("Failed to write counter file")?;
    }

    println!("Counter child completed {} iterations", iterations);
    Ok(())
}
