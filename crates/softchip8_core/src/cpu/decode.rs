use crate::error::{Chip8Error, Result};

/// Raw instruction word with its operand fields.
///
/// Fields sit at fixed bit positions whatever the instruction, handlers just
/// ignore the ones they do not use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Opcode(pub u16);

impl Opcode {
    /// Bits 12-15.
    #[inline]
    pub fn family(self) -> u8 {
        (self.0 >> 12) as u8
    }

    /// Bits 8-11.
    #[inline]
    pub fn x(self) -> usize {
        ((self.0 & 0x0F00) >> 8) as usize
    }

    /// Bits 4-7.
    #[inline]
    pub fn y(self) -> usize {
        ((self.0 & 0x00F0) >> 4) as usize
    }

    #[inline]
    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }

    #[inline]
    pub fn nn(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    #[inline]
    pub fn n(self) -> u8 {
        (self.0 & 0x000F) as u8
    }
}

/// A decoded instruction. `x`/`y` are register indices, `nn`/`n` immediates
/// and `addr` a 12-bit address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0 - CLS
    ClearScreen,
    /// 00EE - RET
    Return,
    /// 0NNN - SYS addr, machine code routine
    Sys { addr: u16 },
    /// 1NNN - JP addr
    Jump { addr: u16 },
    /// 2NNN - CALL addr
    Call { addr: u16 },
    /// 3XNN - SE Vx, NN
    SkipEqImm { x: usize, nn: u8 },
    /// 4XNN - SNE Vx, NN
    SkipNeImm { x: usize, nn: u8 },
    /// 5XY0 - SE Vx, Vy
    SkipEqReg { x: usize, y: usize },
    /// 6XNN - LD Vx, NN
    LoadImm { x: usize, nn: u8 },
    /// 7XNN - ADD Vx, NN
    AddImm { x: usize, nn: u8 },
    /// 8XY0 - LD Vx, Vy
    Move { x: usize, y: usize },
    /// 8XY1 - OR Vx, Vy
    Or { x: usize, y: usize },
    /// 8XY2 - AND Vx, Vy
    And { x: usize, y: usize },
    /// 8XY3 - XOR Vx, Vy
    Xor { x: usize, y: usize },
    /// 8XY4 - ADD Vx, Vy
    Add { x: usize, y: usize },
    /// 8XY5 - SUB Vx, Vy
    Sub { x: usize, y: usize },
    /// 8XY6 - SHR Vx
    ShiftRight { x: usize },
    /// 8XY7 - SUBN Vx, Vy
    SubReverse { x: usize, y: usize },
    /// 8XYE - SHL Vx
    ShiftLeft { x: usize },
    /// 9XY0 - SNE Vx, Vy
    SkipNeReg { x: usize, y: usize },
    /// ANNN - LD I, addr
    LoadIndex { addr: u16 },
    /// BNNN - JP V0, addr
    JumpOffset { addr: u16 },
    /// CXNN - RND Vx, NN
    Random { x: usize, nn: u8 },
    /// DXYN - DRW Vx, Vy, N
    Draw { x: usize, y: usize, n: u8 },
    /// EX9E - SKP Vx
    SkipKeyPressed { x: usize },
    /// EXA1 - SKNP Vx
    SkipKeyNotPressed { x: usize },
    /// FX07 - LD Vx, DT
    LoadDelay { x: usize },
    /// FX0A - LD Vx, K
    WaitKey { x: usize },
    /// FX15 - LD DT, Vx
    SetDelay { x: usize },
    /// FX18 - LD ST, Vx
    SetSound { x: usize },
    /// FX1E - ADD I, Vx
    AddIndex { x: usize },
    /// FX29 - LD F, Vx
    LoadFont { x: usize },
    /// FX33 - LD B, Vx
    StoreBcd { x: usize },
    /// FX55 - LD [I], Vx
    StoreRegs { x: usize },
    /// FX65 - LD Vx, [I]
    LoadRegs { x: usize },
}

impl Instruction {
    pub fn decode(word: u16) -> Result<Instruction> {
        use Instruction::*;

        let op = Opcode(word);
        let (x, y, nn, nnn) = (op.x(), op.y(), op.nn(), op.nnn());
        let instruction = match (op.family(), op.n()) {
            (0x0, _) => match nnn {
                0x0E0 => ClearScreen,
                0x0EE => Return,
                addr => Sys { addr },
            },
            (0x1, _) => Jump { addr: nnn },
            (0x2, _) => Call { addr: nnn },
            (0x3, _) => SkipEqImm { x, nn },
            (0x4, _) => SkipNeImm { x, nn },
            (0x5, 0x0) => SkipEqReg { x, y },
            (0x6, _) => LoadImm { x, nn },
            (0x7, _) => AddImm { x, nn },
            (0x8, 0x0) => Move { x, y },
            (0x8, 0x1) => Or { x, y },
            (0x8, 0x2) => And { x, y },
            (0x8, 0x3) => Xor { x, y },
            (0x8, 0x4) => Add { x, y },
            (0x8, 0x5) => Sub { x, y },
            (0x8, 0x6) => ShiftRight { x },
            (0x8, 0x7) => SubReverse { x, y },
            (0x8, 0xE) => ShiftLeft { x },
            (0x9, 0x0) => SkipNeReg { x, y },
            (0xA, _) => LoadIndex { addr: nnn },
            (0xB, _) => JumpOffset { addr: nnn },
            (0xC, _) => Random { x, nn },
            (0xD, n) => Draw { x, y, n },
            (0xE, _) => match nn {
                0x9E => SkipKeyPressed { x },
                0xA1 => SkipKeyNotPressed { x },
                _ => return Err(Chip8Error::InvalidOpcode { opcode: word }),
            },
            (0xF, _) => match nn {
                0x07 => LoadDelay { x },
                0x0A => WaitKey { x },
                0x15 => SetDelay { x },
                0x18 => SetSound { x },
                0x1E => AddIndex { x },
                0x29 => LoadFont { x },
                0x33 => StoreBcd { x },
                0x55 => StoreRegs { x },
                0x65 => LoadRegs { x },
                _ => return Err(Chip8Error::InvalidOpcode { opcode: word }),
            },
            _ => return Err(Chip8Error::InvalidOpcode { opcode: word }),
        };
        Ok(instruction)
    }
}
