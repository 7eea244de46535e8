pub mod input;
pub mod keymap;
pub mod render;

use std::io::{self, Write};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use softchip8_core::{Chip8Error, Keypad, Machine, MachineConfig, INSTRUCTION_WIDTH};
use typed_builder::TypedBuilder;

/// How a program is run.
#[derive(Clone, Debug, TypedBuilder)]
pub struct RunInfo {
    /// Instructions executed per second.
    #[builder(default = 700)]
    pub ips: u32,
    /// Stop after this many executed instructions.
    #[builder(default)]
    pub max_cycles: Option<u64>,
    /// Print the screen whenever it changes.
    #[builder(default = true)]
    pub render: bool,
    /// Read key presses from stdin.
    #[builder(default = false)]
    pub stdin_keys: bool,
    #[builder(default)]
    pub key_wait_timeout: Option<Duration>,
    #[builder(default)]
    pub rng_seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Instructions that completed.
    pub cycles: u64,
    /// Frames handed to the renderer.
    pub frames: u64,
}

pub fn run(info: RunInfo, rom_data: &[u8]) -> Result<RunSummary> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with_output(info, rom_data, &mut out)
}

/// Start the input source for `keypad`. Without one, nobody can press a key,
/// so key waits are cancelled instead of blocking forever.
fn connect_input<F>(keypad: &Keypad, stdin_keys: bool, spawn: F) -> Option<JoinHandle<()>>
where
    F: FnOnce(Keypad) -> Option<JoinHandle<()>>,
{
    let input = if stdin_keys { spawn(keypad.clone()) } else { None };
    if input.is_none() {
        keypad.cancel_wait();
    }
    input
}

/// Run `rom_data` until it fails, the cycle limit is hit, or a key wait is
/// cancelled. Frames go to `out`.
pub fn run_with_output<W: Write>(info: RunInfo, rom_data: &[u8], out: &mut W) -> Result<RunSummary> {
    if info.ips == 0 {
        anyhow::bail!("instructions per second must be at least 1");
    }

    let config = MachineConfig::builder()
        .key_wait_timeout(info.key_wait_timeout)
        .rng_seed(info.rng_seed)
        .build();
    let mut machine = Machine::with_config(config);
    machine
        .load_image(rom_data)
        .context("Failed to load program image")?;

    // Detached: the input thread ends with stdin or with the process.
    let _input = connect_input(&machine.keypad(), info.stdin_keys, input::spawn_stdin_input);

    log::info!(
        "Running {} byte image at {} instructions per second",
        rom_data.len(),
        info.ips
    );

    let delta_update = Duration::from_secs(1) / info.ips;
    let mut next_update = Instant::now();
    let mut summary = RunSummary::default();

    loop {
        if info.max_cycles.is_some_and(|max| summary.cycles >= max) {
            log::info!("Reached cycle limit of {}", summary.cycles);
            break;
        }

        // Wait until next update
        let now = Instant::now();
        if let Some(delay) = next_update.checked_duration_since(now) {
            thread::sleep(delay);
        }
        next_update += delta_update;

        match machine.tick() {
            Ok(()) => summary.cycles += 1,
            Err(Chip8Error::KeyWaitTimedOut) => {
                log::debug!("Still waiting for a key at {:#05X}", machine.pc());
                next_update = Instant::now();
                continue;
            }
            Err(Chip8Error::KeyWaitCancelled) => {
                log::info!("Key wait cancelled at {:#05X}, stopping", machine.pc());
                break;
            }
            Err(err) => {
                let addr = machine.pc().wrapping_sub(INSTRUCTION_WIDTH);
                let opcode = machine.opcode_at(addr).unwrap_or_default();
                log::error!(
                    "Execution exception at {:#05X} ({:#06X}): {}",
                    addr,
                    opcode,
                    err
                );
                return Err(err).with_context(|| {
                    format!("Execution exception at {:#05X} ({:#06X})", addr, opcode)
                });
            }
        }

        if machine.take_display_dirty() {
            summary.frames += 1;
            if info.render {
                render::render_frame(out, machine.get_display())
                    .context("Failed to render frame")?;
                writeln!(out).context("Failed to render frame")?;
            }
        }
    }

    log::info!(
        "Stopped after {} instructions, {} frames",
        summary.cycles,
        summary.frames
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> RunInfo {
        RunInfo::builder().ips(1_000_000).rng_seed(Some(7)).build()
    }

    #[test]
    fn test_run_until_cycle_limit() {
        // Draw glyph "0" at (0, 0), then spin on a jump to self.
        let rom = [0xA0, 0x00, 0xD0, 0x05, 0x12, 0x04];
        let info = RunInfo {
            max_cycles: Some(10),
            ..fast()
        };
        let mut out = Vec::new();
        let summary = run_with_output(info, &rom, &mut out).unwrap();

        assert_eq!(summary, RunSummary { cycles: 10, frames: 1 });
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("████\n█  █\n"));
    }

    #[test]
    fn test_run_without_render() {
        let rom = [0x00, 0xE0, 0x12, 0x00];
        let info = RunInfo {
            max_cycles: Some(4),
            render: false,
            ..fast()
        };
        let mut out = Vec::new();
        let summary = run_with_output(info, &rom, &mut out).unwrap();

        assert_eq!(summary, RunSummary { cycles: 4, frames: 2 });
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_stops_on_invalid_opcode() {
        let rom = [0x60, 0x01, 0xFF, 0xFF];
        let err = run_with_output(fast(), &rom, &mut Vec::new()).unwrap_err();

        assert_eq!(
            err.downcast_ref::<Chip8Error>(),
            Some(&Chip8Error::InvalidOpcode { opcode: 0xFFFF })
        );
        assert!(format!("{:#}", err).contains("0x202"));
    }

    #[test]
    fn test_run_stops_on_key_wait_without_input() {
        let rom = [0x60, 0x01, 0xF1, 0x0A];
        let summary = run_with_output(fast(), &rom, &mut Vec::new()).unwrap();
        assert_eq!(summary, RunSummary { cycles: 1, frames: 0 });
    }

    #[test]
    fn test_failed_input_thread_cancels_key_wait() {
        let mut machine = Machine::new();
        machine.load_image(&[0xF0, 0x0A]).unwrap();

        let input = connect_input(&machine.keypad(), true, |_| None);
        assert!(input.is_none());
        assert_eq!(machine.tick(), Err(Chip8Error::KeyWaitCancelled));
    }

    #[test]
    fn test_input_thread_leaves_key_wait_alone() {
        let config = MachineConfig::builder()
            .key_wait_timeout(Some(Duration::from_millis(20)))
            .build();
        let mut machine = Machine::with_config(config);
        machine.load_image(&[0xF0, 0x0A]).unwrap();

        let input = connect_input(&machine.keypad(), true, |_| Some(thread::spawn(|| ())));
        input.unwrap().join().unwrap();
        assert_eq!(machine.tick(), Err(Chip8Error::KeyWaitTimedOut));
    }

    #[test]
    fn test_run_rejects_large_image() {
        let rom = vec![0u8; softchip8_core::MAX_IMAGE_SIZE + 1];
        let err = run_with_output(fast(), &rom, &mut Vec::new()).unwrap_err();
        assert!(err.downcast_ref::<Chip8Error>().is_some());
    }
}
