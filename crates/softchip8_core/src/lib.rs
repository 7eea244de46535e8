mod config;
mod cpu;
mod display;
mod error;
mod keypad;
mod machine;

pub use config::MachineConfig;
pub use cpu::{Instruction, Opcode};
pub use display::Framebuffer;
pub use error::{Chip8Error, Result};
pub use keypad::{Keypad, Keys};
pub use machine::Machine;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

pub const RAM_SIZE: usize = 4096;
pub const NUM_REGS: usize = 16;
pub const NUM_KEYS: usize = 16;
pub const STACK_SIZE: usize = 16;

/// Register doubling as carry, borrow and collision flag.
pub const FLAG_REG: usize = 0xF;

/// Size of one instruction word in bytes.
pub const INSTRUCTION_WIDTH: u16 = 2;

/// Where programs are loaded and where the program counter starts.
pub const START_ADDRESS: u16 = 0x200;
/// Largest image that fits between `START_ADDRESS` and the end of memory.
pub const MAX_IMAGE_SIZE: usize = RAM_SIZE - START_ADDRESS as usize;

/// Font glyphs live at the very bottom of memory, so `FX29` is a plain multiply.
pub const FONTSET_ADDRESS: u16 = 0x000;
/// Each glyph is 4 pixels wide and 5 rows tall, one byte per row.
pub const FONT_GLYPH_SIZE: usize = 5;
pub const FONTSET_SIZE: usize = FONT_GLYPH_SIZE * 16;

pub const FONTSET: [u8; FONTSET_SIZE] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
