use thiserror::Error;

pub type Result<T> = std::result::Result<T, Chip8Error>;

/// Everything that can stop an instruction from completing.
///
/// The machine is never mutated by an instruction that fails, apart from the
/// program counter advance done by the fetch in [`crate::Machine::tick`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Chip8Error {
    #[error("invalid opcode {opcode:#06X}")]
    InvalidOpcode { opcode: u16 },

    /// `0NNN` machine code routines of the original interpreter.
    #[error("unsupported opcode {opcode:#06X}")]
    UnsupportedOpcode { opcode: u16 },

    #[error("call stack overflow")]
    StackOverflow,

    #[error("return with an empty call stack")]
    StackUnderflow,

    #[error("memory access out of bounds: {len} byte(s) at {addr:#06X}")]
    MemoryOutOfBounds { addr: u16, len: usize },

    #[error("image is too large ({size} bytes), max size is {max} bytes")]
    ImageTooLarge { size: usize, max: usize },

    #[error("invalid key index {0}")]
    InvalidKey(u8),

    #[error("timed out waiting for a key press")]
    KeyWaitTimedOut,

    #[error("key wait cancelled")]
    KeyWaitCancelled,
}

impl Chip8Error {
    /// True when a blocking key wait ended without a key. Ticking again
    /// resumes the wait.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Chip8Error::KeyWaitTimedOut | Chip8Error::KeyWaitCancelled)
    }
}
