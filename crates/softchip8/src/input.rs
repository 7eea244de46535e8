use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

use log::{error, warn};
use softchip8_core::Keypad;

use crate::keymap::key2btn;

/// Apply one line of key input.
///
/// Every mapped character in the line presses its key; with a leading `-`
/// the keys are released instead.
pub fn apply_line(line: &str, keypad: &Keypad) {
    let line = line.trim();
    let (keys, pressed) = match line.strip_prefix('-') {
        Some(rest) => (rest, false),
        None => (line, true),
    };

    for c in keys.chars().filter(|c| !c.is_whitespace()) {
        let Some(key) = key2btn(c) else {
            warn!("Ignoring unmapped key '{}'", c);
            continue;
        };
        if let Err(e) = keypad.set_key(key, pressed) {
            warn!("Failed to set key {:X}: {e}", key);
        }
    }
}

/// Feed key lines from `reader` until it runs dry, then cancel any pending
/// key wait since no more input is coming.
pub fn feed_keys<R: BufRead>(reader: R, keypad: &Keypad) {
    for line in reader.lines() {
        match line {
            Ok(line) => apply_line(&line, keypad),
            Err(e) => {
                warn!("Input stream failed: {e}");
                break;
            }
        }
    }
    keypad.cancel_wait();
}

/// Start a thread that reads key lines from stdin.
pub fn spawn_stdin_input(keypad: Keypad) -> Option<JoinHandle<()>> {
    match thread::Builder::new()
        .name("softchip8_input".into())
        .spawn(move || feed_keys(io::stdin().lock(), &keypad))
    {
        Ok(handle) => Some(handle),
        Err(e) => {
            error!("Failed to spawn input thread: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use softchip8_core::{Chip8Error, Keys, Machine};
    use std::io::Cursor;

    #[test]
    fn test_apply_line() {
        let keypad = Keypad::default();
        apply_line("1 q v", &keypad);
        assert_eq!(keypad.held(), Keys::KEY_0 | Keys::KEY_4 | Keys::KEY_F);

        apply_line("-q", &keypad);
        assert_eq!(keypad.held(), Keys::KEY_0 | Keys::KEY_F);

        // Unknown characters are skipped.
        apply_line("p2", &keypad);
        assert_eq!(keypad.held(), Keys::KEY_0 | Keys::KEY_1 | Keys::KEY_F);
    }

    #[test]
    fn test_feed_keys_cancels_on_eof() {
        let mut machine = Machine::new();
        machine.load_image(&[0xF0, 0x0A]).unwrap();

        feed_keys(Cursor::new("w\n-w\nx\n"), &machine.keypad());
        assert_eq!(machine.keypad().held(), Keys::KEY_D);
        assert_eq!(machine.tick(), Err(Chip8Error::KeyWaitCancelled));
    }
}
