use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::MachineConfig;
use crate::display::Framebuffer;
use crate::error::{Chip8Error, Result};
use crate::keypad::Keypad;
use crate::{
    FONTSET, FONTSET_ADDRESS, MAX_IMAGE_SIZE, NUM_REGS, RAM_SIZE, STACK_SIZE, START_ADDRESS,
};

/// Complete state of one running program.
///
/// A machine runs a single image for its whole life; build a fresh one to
/// run something else.
#[derive(Clone, Debug)]
pub struct Machine {
    /// program counter
    pub(crate) pc: u16,
    /// 4KB memory, font at the bottom, program from 0x200
    pub(crate) ram: [u8; RAM_SIZE],
    /// display
    pub(crate) screen: Framebuffer,
    /// set whenever `screen` changes, cleared by the renderer
    pub(crate) display_dirty: bool,
    /// V Registers
    pub(crate) v_reg: [u8; NUM_REGS],
    /// I Register
    pub(crate) i_reg: u16,
    /// number of used `stack` slots
    pub(crate) stack_pointer: u8,
    /// return addresses
    pub(crate) stack: [u16; STACK_SIZE],
    /// shared with input threads
    pub(crate) keypad: Keypad,
    /// delay timer
    pub(crate) delay_timer: u8,
    /// sound timer
    pub(crate) sound_timer: u8,
    /// source for `CXNN`
    pub(crate) rng: StdRng,
    /// key wait timeout and PRNG seed
    pub(crate) config: MachineConfig,
}

impl Default for Machine {
    fn default() -> Self {
        Self::with_config(MachineConfig::default())
    }
}

impl Machine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MachineConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut machine = Self {
            pc: START_ADDRESS,
            ram: [0; RAM_SIZE],
            screen: Framebuffer::default(),
            display_dirty: false,
            v_reg: [0; NUM_REGS],
            i_reg: 0,
            stack_pointer: 0,
            stack: [0; STACK_SIZE],
            keypad: Keypad::default(),
            delay_timer: 0,
            sound_timer: 0,
            rng,
            config,
        };
        let font = FONTSET_ADDRESS as usize;
        machine.ram[font..font + FONTSET.len()].copy_from_slice(&FONTSET);
        machine
    }

    /// Copy a program image to `START_ADDRESS`. Images that do not fit are
    /// rejected without touching memory.
    pub fn load_image(&mut self, image: &[u8]) -> Result<()> {
        if image.len() > MAX_IMAGE_SIZE {
            return Err(Chip8Error::ImageTooLarge {
                size: image.len(),
                max: MAX_IMAGE_SIZE,
            });
        }
        let start = START_ADDRESS as usize;
        let end = start + image.len();
        self.ram[start..end].copy_from_slice(image);
        log::debug!("Loaded {} byte image at {:#05X}", image.len(), start);
        Ok(())
    }

    /// Handle for the input source. Clones share state with the machine.
    pub fn keypad(&self) -> Keypad {
        self.keypad.clone()
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) -> Result<()> {
        self.keypad.set_key(key, pressed)
    }

    pub fn get_display(&self) -> &Framebuffer {
        &self.screen
    }

    pub fn is_display_dirty(&self) -> bool {
        self.display_dirty
    }

    /// Read and clear the display-changed flag.
    pub fn take_display_dirty(&mut self) -> bool {
        std::mem::take(&mut self.display_dirty)
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn index(&self) -> u16 {
        self.i_reg
    }

    pub fn registers(&self) -> &[u8; NUM_REGS] {
        &self.v_reg
    }

    /// Return addresses currently on the call stack, oldest first.
    pub fn call_stack(&self) -> &[u16] {
        &self.stack[..self.stack_pointer as usize]
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn memory(&self) -> &[u8] {
        &self.ram
    }

    /// Big-endian instruction word at `addr`, `None` if it runs off the end
    /// of memory.
    pub fn opcode_at(&self, addr: u16) -> Option<u16> {
        let addr = addr as usize;
        let bytes = self.ram.get(addr..addr + 2)?;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Bounds-checked view of `len` bytes starting at `addr`.
    pub(crate) fn ram_range(&self, addr: u16, len: usize) -> Result<std::ops::Range<usize>> {
        let start = addr as usize;
        let end = start + len;
        if end > RAM_SIZE {
            return Err(Chip8Error::MemoryOutOfBounds { addr, len });
        }
        Ok(start..end)
    }

    pub(crate) fn push(&mut self, val: u16) -> Result<()> {
        let slot = self
            .stack
            .get_mut(self.stack_pointer as usize)
            .ok_or(Chip8Error::StackOverflow)?;
        *slot = val;
        self.stack_pointer += 1;
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<u16> {
        if self.stack_pointer == 0 {
            return Err(Chip8Error::StackUnderflow);
        }
        self.stack_pointer -= 1;
        Ok(self.stack[self.stack_pointer as usize])
    }

    pub(crate) fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FONTSET_SIZE, Keys};

    #[test]
    fn test_init() {
        let machine = Machine::new();

        assert_eq!(machine.pc(), START_ADDRESS);
        assert_eq!(machine.index(), 0);
        assert!(machine.call_stack().is_empty());
        assert_eq!(machine.registers(), &[0; NUM_REGS]);
        assert_eq!(machine.delay_timer(), 0);
        assert_eq!(machine.sound_timer(), 0);
        assert!(!machine.is_display_dirty());
        assert_eq!(machine.keypad().held(), Keys::empty());
        assert_eq!(&machine.memory()[..FONTSET_SIZE], &FONTSET[..]);
        assert!(machine.memory()[FONTSET_SIZE..].iter().all(|b| *b == 0));
        assert!(machine.get_display().as_slice().iter().all(|p| !p));
    }

    #[test]
    fn test_load_image() {
        let mut machine = Machine::new();
        machine.load_image(&[0x12, 0x34, 0x56]).unwrap();

        assert_eq!(machine.opcode_at(START_ADDRESS), Some(0x1234));
        assert_eq!(machine.memory()[START_ADDRESS as usize + 2], 0x56);
    }

    #[test]
    fn test_load_image_fills_memory() {
        let mut machine = Machine::new();
        machine.load_image(&[0xAB; MAX_IMAGE_SIZE]).unwrap();
        assert_eq!(machine.memory()[RAM_SIZE - 1], 0xAB);
    }

    #[test]
    fn test_load_image_too_large() {
        let mut machine = Machine::new();
        let err = machine.load_image(&[0xAB; MAX_IMAGE_SIZE + 1]).unwrap_err();

        assert_eq!(
            err,
            Chip8Error::ImageTooLarge {
                size: MAX_IMAGE_SIZE + 1,
                max: MAX_IMAGE_SIZE
            }
        );
        assert!(machine.memory()[START_ADDRESS as usize..]
            .iter()
            .all(|b| *b == 0));
    }

    #[test]
    fn test_opcode_at_end_of_memory() {
        let machine = Machine::new();
        assert_eq!(machine.opcode_at((RAM_SIZE - 2) as u16), Some(0));
        assert_eq!(machine.opcode_at((RAM_SIZE - 1) as u16), None);
    }

    #[test]
    fn test_stack_capacity() {
        let mut machine = Machine::new();
        for i in 0..STACK_SIZE as u16 {
            machine.push(0x200 + i * 2).unwrap();
        }
        assert_eq!(machine.push(0xFFF), Err(Chip8Error::StackOverflow));
        assert_eq!(machine.call_stack().len(), STACK_SIZE);

        for _ in 0..STACK_SIZE {
            machine.pop().unwrap();
        }
        assert_eq!(machine.pop(), Err(Chip8Error::StackUnderflow));
    }

    #[test]
    fn test_take_display_dirty() {
        let mut machine = Machine::new();
        machine.display_dirty = true;
        assert!(machine.take_display_dirty());
        assert!(!machine.is_display_dirty());
        assert!(!machine.take_display_dirty());
    }
}
