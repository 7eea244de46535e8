mod decode;
mod exec;

pub use decode::{Instruction, Opcode};

use crate::error::{Chip8Error, Result};
use crate::machine::Machine;
use crate::INSTRUCTION_WIDTH;

impl Machine {
    /// Run one fetch/decode/execute cycle.
    ///
    /// The program counter moves past the fetched word before the
    /// instruction runs. Both timers count down once per instruction that
    /// completes; a failed instruction leaves them alone. When an `FX0A` wait
    /// times out or is cancelled the program counter is put back on it, so
    /// the next tick waits again.
    pub fn tick(&mut self) -> Result<()> {
        let addr = self.pc;
        let opcode = self
            .opcode_at(addr)
            .ok_or(Chip8Error::MemoryOutOfBounds { addr, len: 2 })?;
        self.pc = addr.wrapping_add(INSTRUCTION_WIDTH);
        log::trace!("Executing {:#05X}: {:#06X}", addr, opcode);

        match self.execute(opcode) {
            Ok(()) => {
                self.tick_timers();
                Ok(())
            }
            Err(err) => {
                if err.is_interrupted() {
                    self.pc = addr;
                }
                Err(err)
            }
        }
    }
}
