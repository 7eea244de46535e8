use rand::Rng;

use super::decode::Instruction;
use crate::error::{Chip8Error, Result};
use crate::machine::Machine;
use crate::{FLAG_REG, FONTSET_ADDRESS, FONT_GLYPH_SIZE, INSTRUCTION_WIDTH};

impl Machine {
    /// Decode and execute a single instruction word without fetching it.
    ///
    /// Every check that can fail runs before the first write, so on error the
    /// machine is exactly as it was.
    pub fn execute(&mut self, opcode: u16) -> Result<()> {
        let instruction = Instruction::decode(opcode)?;
        self.execute_instruction(instruction)
    }

    pub fn execute_instruction(&mut self, instruction: Instruction) -> Result<()> {
        use Instruction::*;

        match instruction {
            ClearScreen => {
                self.screen.clear();
                self.display_dirty = true;
            }
            Return => self.pc = self.pop()?,
            // Family 0, so the address is also the whole instruction word.
            Sys { addr } => return Err(Chip8Error::UnsupportedOpcode { opcode: addr }),
            Jump { addr } => self.pc = addr,
            Call { addr } => {
                self.push(self.pc)?;
                log::debug!("Calling {:#05X}, return address {:#05X}", addr, self.pc);
                self.pc = addr;
            }
            SkipEqImm { x, nn } => self.skip_if(self.v_reg[x] == nn),
            SkipNeImm { x, nn } => self.skip_if(self.v_reg[x] != nn),
            SkipEqReg { x, y } => self.skip_if(self.v_reg[x] == self.v_reg[y]),
            SkipNeReg { x, y } => self.skip_if(self.v_reg[x] != self.v_reg[y]),
            LoadImm { x, nn } => self.v_reg[x] = nn,
            AddImm { x, nn } => self.v_reg[x] = self.v_reg[x].wrapping_add(nn),
            Move { x, y } => self.v_reg[x] = self.v_reg[y],
            Or { x, y } => self.v_reg[x] |= self.v_reg[y],
            And { x, y } => self.v_reg[x] &= self.v_reg[y],
            Xor { x, y } => self.v_reg[x] ^= self.v_reg[y],
            // VF is always derived from the operands as they were before the
            // instruction, and written ahead of Vx.
            Add { x, y } => {
                let (val, carry) = self.v_reg[x].overflowing_add(self.v_reg[y]);
                self.set_flag_then(x, carry, val);
            }
            Sub { x, y } => {
                let (val, borrow) = self.v_reg[x].overflowing_sub(self.v_reg[y]);
                self.set_flag_then(x, !borrow, val);
            }
            ShiftRight { x } => {
                let vx = self.v_reg[x];
                self.set_flag_then(x, vx & 0x1 == 1, vx >> 1);
            }
            SubReverse { x, y } => {
                let (val, borrow) = self.v_reg[y].overflowing_sub(self.v_reg[x]);
                self.set_flag_then(x, !borrow, val);
            }
            ShiftLeft { x } => {
                let vx = self.v_reg[x];
                self.set_flag_then(x, vx & 0x80 != 0, vx << 1);
            }
            LoadIndex { addr } => self.i_reg = addr,
            JumpOffset { addr } => self.pc = addr + self.v_reg[0] as u16,
            Random { x, nn } => self.v_reg[x] = self.rng.gen_range(0..=nn),
            Draw { x, y, n } => {
                let rows = self.ram_range(self.i_reg, n as usize)?;
                // VX and VY are read before VF is written, so drawing with VF
                // as a coordinate uses its old value.
                let collision =
                    self.screen
                        .draw_sprite(self.v_reg[x], self.v_reg[y], &self.ram[rows]);
                self.v_reg[FLAG_REG] = collision as u8;
                self.display_dirty = true;
            }
            SkipKeyPressed { x } => self.skip_if(self.keypad.is_held(self.v_reg[x])),
            SkipKeyNotPressed { x } => self.skip_if(!self.keypad.is_held(self.v_reg[x])),
            LoadDelay { x } => self.v_reg[x] = self.delay_timer,
            WaitKey { x } => {
                let key = self
                    .keypad
                    .wait_for_press(self.config.key_wait_timeout)
                    .map_err(|err| {
                        log::warn!("Key wait for V{:X} ended without a key: {}", x, err);
                        err
                    })?;
                log::debug!("Key {:X} pressed, stored in V{:X}", key, x);
                self.v_reg[x] = key;
            }
            SetDelay { x } => self.delay_timer = self.v_reg[x],
            SetSound { x } => self.sound_timer = self.v_reg[x],
            AddIndex { x } => {
                let vx = self.v_reg[x] as u16;
                let overflow = self.i_reg as u32 + vx as u32 > 0xFFF;
                self.v_reg[FLAG_REG] = overflow as u8;
                self.i_reg = self.i_reg.wrapping_add(vx);
            }
            LoadFont { x } => {
                self.i_reg = FONTSET_ADDRESS + self.v_reg[x] as u16 * FONT_GLYPH_SIZE as u16;
            }
            StoreBcd { x } => {
                let digits = self.ram_range(self.i_reg, 3)?;
                let val = self.v_reg[x];
                self.ram[digits].copy_from_slice(&[val / 100, (val / 10) % 10, val % 10]);
            }
            StoreRegs { x } => {
                let dest = self.ram_range(self.i_reg, x + 1)?;
                self.ram[dest].copy_from_slice(&self.v_reg[..=x]);
            }
            LoadRegs { x } => {
                let src = self.ram_range(self.i_reg, x + 1)?;
                self.v_reg[..=x].copy_from_slice(&self.ram[src]);
            }
        }
        Ok(())
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc = self.pc.wrapping_add(INSTRUCTION_WIDTH);
        }
    }

    fn set_flag_then(&mut self, x: usize, flag: bool, val: u8) {
        self.v_reg[FLAG_REG] = flag as u8;
        self.v_reg[x] = val;
    }
}
