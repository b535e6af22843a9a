use crate::memory::{TypeAddr, PROGRAM_START};

pub const FLAG_REGISTER: u8 = 0xF;

/// V0 - VF. VF doubles as the carry/borrow/collision flag.
pub struct Registers {
    registers: [u8; 16],
}

impl Registers {
    pub fn new() -> Self {
        Self { registers: [0; 16] }
    }

    pub fn reset(&mut self) {
        self.registers = [0; 16];
    }

    pub fn set_register(&mut self, reg_num: u8, value: u8) {
        self.registers[reg_num as usize] = value;
    }

    // 7XNN never touches the flag
    pub fn add_to_register(&mut self, reg_num: u8, value: u8) {
        let slot = &mut self.registers[reg_num as usize];
        *slot = slot.wrapping_add(value);
    }

    pub fn set_flag(&mut self, flag: bool) {
        self.set_register(FLAG_REGISTER, flag as u8);
    }

    pub fn get(&self, reg_num: u8) -> u8 {
        self.registers[reg_num as usize]
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

// Special registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramCounter(pub TypeAddr);

impl ProgramCounter {
    pub fn new() -> Self {
        ProgramCounter(PROGRAM_START as TypeAddr)
    }

    // pc may run past 0xFFF, the next fetch reports it
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(2);
    }

    pub fn decrement(&mut self) {
        self.0 = self.0.wrapping_sub(2);
    }

    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr;
    }
}

impl Default for ProgramCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexRegister(pub TypeAddr);

impl IndexRegister {
    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr;
    }

    pub fn advance(&mut self, by: TypeAddr) {
        self.0 = self.0.wrapping_add(by);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_wraps_without_flag() {
        let mut regs = Registers::new();
        regs.set_register(0x3, 0xFE);
        regs.add_to_register(0x3, 0x05);
        assert_eq!(regs.get(0x3), 0x03);
        assert_eq!(regs.get(FLAG_REGISTER), 0);
    }

    #[test]
    fn flag_is_vf() {
        let mut regs = Registers::new();
        regs.set_flag(true);
        assert_eq!(regs.get(0xF), 1);
        regs.set_flag(false);
        assert_eq!(regs.get(0xF), 0);
    }

    #[test]
    #[should_panic]
    fn register_index_is_four_bits() {
        let regs = Registers::new();
        regs.get(16);
    }

    #[test]
    fn pc_starts_at_program_and_steps_by_two() {
        let mut pc = ProgramCounter::new();
        assert_eq!(pc.0, 0x200);
        pc.increment();
        assert_eq!(pc.0, 0x202);
        pc.decrement();
        assert_eq!(pc.0, 0x200);
    }

    #[test]
    fn index_advances() {
        let mut index = IndexRegister::default();
        index.set_addr(0x300);
        index.advance(4);
        assert_eq!(index.0, 0x304);
    }
}
