use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use bitflags::bitflags;

use crate::error::{Chip8Error, Result};
use crate::NUM_KEYS;

bitflags! {
    /// One bit per key of the hexadecimal keypad, bit N = key N.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Keys: u16 {
        const KEY_0 = 1 << 0x0;
        const KEY_1 = 1 << 0x1;
        const KEY_2 = 1 << 0x2;
        const KEY_3 = 1 << 0x3;
        const KEY_4 = 1 << 0x4;
        const KEY_5 = 1 << 0x5;
        const KEY_6 = 1 << 0x6;
        const KEY_7 = 1 << 0x7;
        const KEY_8 = 1 << 0x8;
        const KEY_9 = 1 << 0x9;
        const KEY_A = 1 << 0xA;
        const KEY_B = 1 << 0xB;
        const KEY_C = 1 << 0xC;
        const KEY_D = 1 << 0xD;
        const KEY_E = 1 << 0xE;
        const KEY_F = 1 << 0xF;
    }
}

impl Keys {
    /// The flag for key `index`, `None` past the last key.
    pub fn key(index: u8) -> Option<Keys> {
        if (index as usize) < NUM_KEYS {
            Some(Keys::from_bits_retain(1 << index))
        } else {
            None
        }
    }

    /// Index of the lowest key in the set.
    pub fn lowest(self) -> Option<u8> {
        if self.is_empty() {
            None
        } else {
            Some(self.bits().trailing_zeros() as u8)
        }
    }
}

#[derive(Debug)]
struct KeypadState {
    held: Keys,
    /// Keys that went from released to held since the current wait started.
    pressed: Keys,
    /// A wait has started and no key or cancel has ended it yet. Stays set
    /// across timeouts so presses between them are kept.
    waiting: bool,
    cancel_requested: bool,
}

/// Input state shared between the machine and whoever feeds it key events.
///
/// Cloning gives another handle to the same keypad, so an input thread can
/// keep one while the machine keeps running on another thread.
#[derive(Clone, Debug)]
pub struct Keypad {
    shared: Arc<(Mutex<KeypadState>, Condvar)>,
}

impl Default for Keypad {
    fn default() -> Self {
        let state = KeypadState {
            held: Keys::empty(),
            pressed: Keys::empty(),
            waiting: false,
            cancel_requested: false,
        };
        Self {
            shared: Arc::new((Mutex::new(state), Condvar::new())),
        }
    }
}

impl Keypad {
    fn lock(&self) -> MutexGuard<'_, KeypadState> {
        // The state is plain bits, a panicking holder cannot leave it torn.
        self.shared.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_key(&self, key: u8, pressed: bool) -> Result<()> {
        let flag = Keys::key(key).ok_or(Chip8Error::InvalidKey(key))?;
        let mut state = self.lock();
        if pressed && !state.held.contains(flag) {
            state.pressed.insert(flag);
        }
        state.held.set(flag, pressed);
        drop(state);
        self.shared.1.notify_all();
        Ok(())
    }

    pub fn is_held(&self, key: u8) -> bool {
        Keys::key(key).is_some_and(|flag| self.held().contains(flag))
    }

    pub fn held(&self) -> Keys {
        self.lock().held
    }

    /// Abort the key wait in progress. With no wait in progress the next
    /// one is aborted as soon as it starts.
    pub fn cancel_wait(&self) {
        self.lock().cancel_requested = true;
        self.shared.1.notify_all();
    }

    /// Block until some key goes from released to held and return the
    /// lowest such key.
    ///
    /// A wait that timed out is resumed by the next call: presses made in
    /// between still count.
    pub(crate) fn wait_for_press(&self, timeout: Option<Duration>) -> Result<u8> {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let mut state = self.lock();
        if !state.waiting {
            state.pressed = Keys::empty();
            state.waiting = true;
        }

        loop {
            if state.cancel_requested {
                state.cancel_requested = false;
                state.waiting = false;
                return Err(Chip8Error::KeyWaitCancelled);
            }
            if let Some(key) = state.pressed.lowest() {
                state.pressed = Keys::empty();
                state.waiting = false;
                return Ok(key);
            }

            state = match deadline {
                None => self
                    .shared
                    .1
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(Chip8Error::KeyWaitTimedOut);
                    }
                    self.shared
                        .1
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_keys_lowest() {
        assert_eq!(Keys::empty().lowest(), None);
        assert_eq!((Keys::KEY_3 | Keys::KEY_A).lowest(), Some(3));
        assert_eq!(Keys::key(0xF), Some(Keys::KEY_F));
        assert_eq!(Keys::key(16), None);
    }

    #[test]
    fn test_set_key() {
        let keypad = Keypad::default();
        keypad.set_key(0xA, true).unwrap();
        assert!(keypad.is_held(0xA));
        assert_eq!(keypad.held(), Keys::KEY_A);

        keypad.set_key(0xA, false).unwrap();
        assert!(!keypad.is_held(0xA));
        assert_eq!(keypad.set_key(16, true), Err(Chip8Error::InvalidKey(16)));
    }

    #[test]
    fn test_wait_ignores_keys_already_held() {
        let keypad = Keypad::default();
        keypad.set_key(1, true).unwrap();
        assert_eq!(
            keypad.wait_for_press(Some(Duration::from_millis(20))),
            Err(Chip8Error::KeyWaitTimedOut)
        );
    }

    #[test]
    fn test_wait_catches_short_tap() {
        let keypad = Keypad::default();
        let input = keypad.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            // Released again before the waiter gets to look.
            input.set_key(9, true).unwrap();
            input.set_key(9, false).unwrap();
        });

        assert_eq!(keypad.wait_for_press(Some(Duration::from_secs(5))), Ok(9));
        handle.join().unwrap();
        assert!(!keypad.is_held(9));
    }

    #[test]
    fn test_press_between_timeouts_resumes_wait() {
        let keypad = Keypad::default();
        assert_eq!(
            keypad.wait_for_press(Some(Duration::from_millis(10))),
            Err(Chip8Error::KeyWaitTimedOut)
        );

        keypad.set_key(3, true).unwrap();
        assert_eq!(keypad.wait_for_press(Some(Duration::from_millis(10))), Ok(3));

        // Resolved, so the next wait starts fresh and key 3 is still held.
        assert_eq!(
            keypad.wait_for_press(Some(Duration::from_millis(10))),
            Err(Chip8Error::KeyWaitTimedOut)
        );
    }

    #[test]
    fn test_cancel_wait() {
        let keypad = Keypad::default();
        let input = keypad.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            input.cancel_wait();
        });

        assert_eq!(keypad.wait_for_press(None), Err(Chip8Error::KeyWaitCancelled));
        handle.join().unwrap();

        // The request is consumed by the wait it aborted.
        assert_eq!(
            keypad.wait_for_press(Some(Duration::from_millis(10))),
            Err(Chip8Error::KeyWaitTimedOut)
        );
    }

    #[test]
    fn test_cancel_before_wait() {
        let keypad = Keypad::default();
        keypad.cancel_wait();
        assert_eq!(keypad.wait_for_press(None), Err(Chip8Error::KeyWaitCancelled));
    }
}
