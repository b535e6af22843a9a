// Virtual CPU for the classic 8-bit hex-keypad machine:
//
// 16 8-bit data registers named V0 to VF, VF doubles as a flag
// I -> address register (12 bits), PC -> program counter
// 16 entry return stack
//
// Delay timer & Sound timer: Count down at 60 times / s until 0
//
// Display res: 64 width, 32 height
//
// 35 opcodes, each are 2 bytes (big-endian)
//      NNN: address
//      NN: 8-bit constant
//      N: 4-bit constant
//      X and Y: 4-bit register identifier
//
// Loading programs from disk, windows, audio and physical keys are left to
// the host; see the `desktop` feature for one.

pub mod clock;
pub mod decode;
pub mod display;
pub mod emulator;
pub mod error;
pub mod keyboard;
pub mod memory;
pub mod quirks;
pub mod registers;
pub mod timer;

pub use clock::{Clock, SharedEmulator, TimerThread};
pub use decode::Instruction;
pub use display::{HEIGHT, PIXELS, WIDTH};
pub use emulator::Emulator;
pub use error::{CpuFault, LoadError, MemoryError};
pub use memory::{FONT_START, MEMORY_SIZE, PROGRAM_START};
pub use quirks::Quirks;
pub use timer::TIMER_DEC_PER_SECOND;
