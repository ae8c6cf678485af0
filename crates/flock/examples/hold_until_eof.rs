//! Helper binary that holds a lock until its stdin is closed
//!
//! Usage: hold_until_eof <lock_path> [exclusive|shared]
//!
//! Prints `locked` once the lock is held and `unlocked` after releasing it.

use anyhow::{bail, Context};
use flock::Flock;
use std::env;
use std::io::{self, Read, Write};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let (path, shared) = match args.as_slice() {
        [_, path] => (path, false),
        [_, path, mode] if mode == "exclusive" => (path, false),
        [_, path, mode] if mode == "shared" => (path, true),
        _ => bail!("Usage: hold_until_eof <lock_path> [exclusive|shared]"),
    };

    let lock = Flock::new(path);
    let locked = if shared { lock.rlock() } else { lock.lock() };
    locked.with_context(|| format!("failed to lock {}", lock))?;

    let mut stdout = io::stdout();
    writeln!(stdout, "locked")?;
    stdout.flush()?;

    let mut sink = Vec::new();
    io::stdin().read_to_end(&mut sink)?;

    lock.unlock()?;
    writeln!(stdout, "unlocked")?;
    Ok(())
}
