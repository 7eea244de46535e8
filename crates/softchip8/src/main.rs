use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use softchip8::RunInfo;

/// Headless CHIP-8 interpreter
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Program image to run
    #[clap(index = 1)]
    rom: PathBuf,

    /// Instructions per second
    #[clap(short, long, default_value_t = 700)]
    ips: u32,

    /// Stop after this many instructions
    #[clap(short = 'n', long)]
    cycles: Option<u64>,

    /// Do not print the screen
    #[clap(long)]
    no_render: bool,

    /// Read keys from stdin: one line of keys presses them, "-keys" releases them
    #[clap(short, long)]
    keys: bool,

    /// Give up waiting for a key press after this many milliseconds and wait again
    #[clap(long)]
    key_timeout_ms: Option<u64>,

    /// PRNG seed
    #[clap(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    log::info!("Loading image '{}'", args.rom.display());
    let rom = std::fs::read(&args.rom)
        .with_context(|| format!("Failed to read image '{}'", args.rom.display()))?;

    let info = RunInfo::builder()
        .ips(args.ips)
        .max_cycles(args.cycles)
        .render(!args.no_render)
        .stdin_keys(args.keys)
        .key_wait_timeout(args.key_timeout_ms.map(Duration::from_millis))
        .rng_seed(args.seed)
        .build();

    softchip8::run(info, &rom)?;
    Ok(())
}
