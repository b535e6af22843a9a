use log::debug;

use crate::error::{CpuFault, LoadError, MemoryError};

pub type TypeAddr = u16; // in reality u12
type FontBytes = [u8; GLYPH_HEIGHT * 16];

pub const MEMORY_SIZE: usize = 4096;
pub const FONT_START: usize = 0x50;
pub const GLYPH_HEIGHT: usize = 5;
pub const PROGRAM_START: usize = 0x200;
pub const STACK_DEPTH: usize = 16;

const DEFAULT_FONT: FontBytes = [
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

/// Address of the built-in glyph for the hex digit in the low nibble of `digit`.
pub fn glyph_addr(digit: u8) -> TypeAddr {
    (FONT_START + (digit & 0xF) as usize * GLYPH_HEIGHT) as TypeAddr
}

pub struct Memory {
    // 4k bytes
    // font data stored from 050 -> 09F (000 -> 04F is empty by convention)
    // programs are loaded from 200 onwards
    bytes: [u8; MEMORY_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        let mut mem = Self {
            bytes: [0; MEMORY_SIZE],
        };
        mem.reset();
        mem
    }

    /// Zero everything and put the glyph set back in place.
    pub fn reset(&mut self) {
        self.bytes = [0; MEMORY_SIZE];
        self.bytes[FONT_START..FONT_START + DEFAULT_FONT.len()].copy_from_slice(&DEFAULT_FONT);
    }

    pub fn set(&mut self, addr: usize, val: u8) -> Result<(), MemoryError> {
        let slot = self
            .bytes
            .get_mut(addr)
            .ok_or(MemoryError::AddressOutOfRange { addr })?;
        *slot = val;
        Ok(())
    }

    pub fn get(&self, addr: usize) -> Result<u8, MemoryError> {
        self.bytes
            .get(addr)
            .copied()
            .ok_or(MemoryError::AddressOutOfRange { addr })
    }

    /// Fails on the first address of `addr..addr + len` that is out of range.
    pub fn check_span(&self, addr: usize, len: usize) -> Result<(), MemoryError> {
        if addr + len > MEMORY_SIZE {
            return Err(MemoryError::AddressOutOfRange {
                addr: addr.max(MEMORY_SIZE),
            });
        }
        Ok(())
    }

    /// Big-endian 16 bit instruction at `addr`.
    pub fn instruction_at(&self, addr: TypeAddr) -> Result<u16, MemoryError> {
        let addr = addr as usize;
        let (l, r) = (self.get(addr)?, self.get(addr + 1)?);
        Ok(((l as u16) << 8) | r as u16)
    }

    // loads program instructions starting at address 0x200
    // a rejected program leaves memory untouched
    pub fn load_program(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        let capacity = MEMORY_SIZE - PROGRAM_START;
        if bytes.len() > capacity {
            return Err(LoadError::ProgramTooLarge {
                len: bytes.len(),
                capacity,
            });
        }
        self.bytes[PROGRAM_START..PROGRAM_START + bytes.len()].copy_from_slice(bytes);
        debug!(
            "loaded {} program bytes at {:#05x}",
            bytes.len(),
            PROGRAM_START
        );
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Hex dump, 16 bytes per line, each line prefixed with its address.
    pub fn dump(&self) -> String {
        let mut out = String::with_capacity(MEMORY_SIZE * 3 + MEMORY_SIZE / 16 * 6);
        for (line, chunk) in self.bytes.chunks(16).enumerate() {
            out.push_str(&format!("{:03x}:", line * 16));
            for byte in chunk {
                out.push_str(&format!(" {byte:02x}"));
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

/// Return address stack. Depth 0 is empty, slot `depth - 1` is the top.
pub struct Stack {
    addresses: [TypeAddr; STACK_DEPTH],
    depth: usize,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            addresses: [0; STACK_DEPTH],
            depth: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // `pc` is only used to report where the fault happened
    pub fn push(&mut self, addr: TypeAddr, pc: TypeAddr) -> Result<(), CpuFault> {
        if self.depth == STACK_DEPTH {
            return Err(CpuFault::StackOverflow { pc });
        }
        self.addresses[self.depth] = addr;
        self.depth += 1;
        Ok(())
    }

    pub fn pop(&mut self, pc: TypeAddr) -> Result<TypeAddr, CpuFault> {
        if self.depth == 0 {
            return Err(CpuFault::StackUnderflow { pc });
        }
        self.depth -= 1;
        Ok(self.addresses[self.depth])
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_places_font_and_zeroes_the_rest() {
        let mut mem = Memory::new();
        mem.set(0x300, 0xAB).unwrap();
        mem.reset();
        assert_eq!(mem.get(0x300), Ok(0));
        assert_eq!(&mem.as_slice()[FONT_START..FONT_START + 80], &DEFAULT_FONT[..]);
        assert!(mem.as_slice()[..FONT_START].iter().all(|b| *b == 0));
        assert!(mem.as_slice()[FONT_START + 80..].iter().all(|b| *b == 0));
    }

    #[test]
    fn glyph_addresses() {
        assert_eq!(glyph_addr(0x0), 0x50);
        assert_eq!(glyph_addr(0xA), 0x50 + 50);
        // only the low nibble selects the glyph
        assert_eq!(glyph_addr(0x1F), glyph_addr(0xF));
    }

    #[test]
    fn out_of_range_access_is_rejected() {
        let mut mem = Memory::new();
        assert_eq!(mem.get(0xFFF), Ok(0));
        assert_eq!(
            mem.get(0x1000),
            Err(MemoryError::AddressOutOfRange { addr: 0x1000 })
        );
        assert_eq!(
            mem.set(0x1000, 1),
            Err(MemoryError::AddressOutOfRange { addr: 0x1000 })
        );
        assert_eq!(
            mem.instruction_at(0xFFF),
            Err(MemoryError::AddressOutOfRange { addr: 0x1000 })
        );
    }

    #[test]
    fn spans_are_checked_as_a_whole() {
        let mem = Memory::new();
        assert_eq!(mem.check_span(0xFFC, 4), Ok(()));
        assert_eq!(
            mem.check_span(0xFFE, 4),
            Err(MemoryError::AddressOutOfRange { addr: 0x1000 })
        );
        assert_eq!(
            mem.check_span(0x1002, 1),
            Err(MemoryError::AddressOutOfRange { addr: 0x1002 })
        );
    }

    #[test]
    fn instructions_are_big_endian() {
        let mut mem = Memory::new();
        mem.load_program(&[0x4C, 0xEE]).unwrap();
        assert_eq!(mem.instruction_at(0x200), Ok(0x4CEE));
    }

    #[test]
    fn program_fills_memory_exactly() {
        let mut mem = Memory::new();
        let program = vec![0x11; MEMORY_SIZE - PROGRAM_START];
        assert!(mem.load_program(&program).is_ok());
        assert_eq!(mem.get(0xFFF), Ok(0x11));
    }

    #[test]
    fn oversized_program_leaves_memory_untouched() {
        let mut mem = Memory::new();
        mem.load_program(&[0x60, 0x05]).unwrap();
        let program = vec![0xFF; MEMORY_SIZE - PROGRAM_START + 1];
        assert_eq!(
            mem.load_program(&program),
            Err(LoadError::ProgramTooLarge {
                len: 3585,
                capacity: 3584
            })
        );
        assert_eq!(mem.instruction_at(0x200), Ok(0x6005));
        assert_eq!(mem.get(0x202), Ok(0));
    }

    #[test]
    fn dump_lists_every_line() {
        let mut mem = Memory::new();
        mem.load_program(&[0xDE, 0xAD]).unwrap();
        let dump = mem.dump();
        assert_eq!(dump.lines().count(), MEMORY_SIZE / 16);
        assert!(dump
            .lines()
            .any(|line| line.starts_with("200: de ad 00")));
        assert!(dump.lines().any(|line| line.starts_with("050: f0 90 90 90 f0")));
    }

    #[test]
    fn stack_is_lifo_and_bounded() {
        let mut stack = Stack::new();
        for addr in 0..STACK_DEPTH as TypeAddr {
            stack.push(0x200 + addr * 2, 0x300).unwrap();
        }
        assert_eq!(stack.depth(), 16);
        assert_eq!(
            stack.push(0x400, 0x300),
            Err(CpuFault::StackOverflow { pc: 0x300 })
        );
        assert_eq!(stack.pop(0x300), Ok(0x21E));
        assert_eq!(stack.depth(), 15);
    }

    #[test]
    fn empty_stack_underflows() {
        let mut stack = Stack::new();
        assert_eq!(stack.pop(0x250), Err(CpuFault::StackUnderflow { pc: 0x250 }));
        stack.push(0x202, 0x200).unwrap();
        assert_eq!(stack.pop(0x300), Ok(0x202));
        assert_eq!(stack.pop(0x300), Err(CpuFault::StackUnderflow { pc: 0x300 }));
    }
}
