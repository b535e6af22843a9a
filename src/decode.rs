use crate::memory::TypeAddr;

/// Fields of a fetched 16 bit instruction.
///
/// ```text
///  top   x     y     n
/// [1101][0001][0010][0101]   D125
///       [     addr       ]
///                   [byte]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInstruction(pub u16);

impl RawInstruction {
    pub fn top_nibble(self) -> u8 {
        (self.0 >> 12) as u8
    }

    pub fn x(self) -> u8 {
        ((self.0 >> 8) & 0xF) as u8
    }

    pub fn y(self) -> u8 {
        ((self.0 >> 4) & 0xF) as u8
    }

    pub fn nibble(self) -> u8 {
        (self.0 & 0xF) as u8
    }

    pub fn byte(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub fn addr(self) -> TypeAddr {
        self.0 & 0x0FFF
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    // 00E0
    // turn all pixels to 0
    ClearScreen,
    // 00EE
    PopSubroutine,
    // 1NNN
    // set PC to address NNN, "jump" to memory location
    Jump(TypeAddr),
    // 2NNN
    PushSubroutine(TypeAddr),

    // 3XNN
    SkipEqualConstant(u8, u8),
    // 4XNN
    SkipNotEqualConstant(u8, u8),
    // 5XY0
    SkipEqualRegister(u8, u8),
    // 9XY0
    SkipNotEqualRegister(u8, u8),

    // 6XNN
    SetRegister(u8, u8),
    // 7XNN
    // add NN to VX, no carry
    AddToRegister(u8, u8),

    // 8XY0
    CopyRegister(u8, u8),
    // 8XY1
    Or(u8, u8),
    // 8XY2
    And(u8, u8),
    // 8XY3
    XOr(u8, u8),
    // 8XY4
    Add(u8, u8),
    // 8XY5
    SubtractForward(u8, u8),
    // 8XY6
    RightShift(u8, u8),
    // 8XY7
    SubtractBackward(u8, u8),
    // 8XYE
    LeftShift(u8, u8),

    // ANNN
    SetIndexRegister(TypeAddr),
    // BNNN
    JumpWithOffset(TypeAddr),
    // CXNN
    Random(u8, u8),
    // DXYN
    // draw an N pixel tall sprite starting at I
    // at Coordinates (VX, VY)
    // XOR pixels on screen using sprite data
    // if pixels on screen were switched OFF: VF set to 1
    Display(u8, u8, u8),

    // EX9E
    SkipIfPressed(u8),
    // EXA1
    SkipIfNotPressed(u8),

    // FX07
    CopyDelayToRegister(u8),
    // FX0A
    GetKey(u8),
    // FX15
    CopyRegisterToDelay(u8),
    // FX18
    CopyRegisterToSound(u8),
    // FX1E
    AddToIndex(u8),
    // FX29
    PointChar(u8),
    // FX33
    ToDecimal(u8),
    // FX55
    StoreRegisterToMemory(u8),
    // FX65
    LoadRegisterFromMemory(u8),

    Unknown(u16),
}

impl Instruction {
    pub fn decode(ins: u16) -> Self {
        let raw = RawInstruction(ins);
        let (x, y) = (raw.x(), raw.y());

        match raw.top_nibble() {
            0x0 => match ins {
                0x00E0 => Self::ClearScreen,
                0x00EE => Self::PopSubroutine,
                // 0NNN machine code routines are not emulated
                _ => Self::Unknown(ins),
            },
            0x1 => Self::Jump(raw.addr()),
            0x2 => Self::PushSubroutine(raw.addr()),
            0x3 => Self::SkipEqualConstant(x, raw.byte()),
            0x4 => Self::SkipNotEqualConstant(x, raw.byte()),
            // the low nibble of 5XYN and 9XYN is ignored
            0x5 => Self::SkipEqualRegister(x, y),
            0x6 => Self::SetRegister(x, raw.byte()),
            0x7 => Self::AddToRegister(x, raw.byte()),
            0x8 => match raw.nibble() {
                0x0 => Self::CopyRegister(x, y),
                0x1 => Self::Or(x, y),
                0x2 => Self::And(x, y),
                0x3 => Self::XOr(x, y),
                0x4 => Self::Add(x, y),
                0x5 => Self::SubtractForward(x, y),
                0x6 => Self::RightShift(x, y),
                0x7 => Self::SubtractBackward(x, y),
                0xE => Self::LeftShift(x, y),
                _ => Self::Unknown(ins),
            },
            0x9 => Self::SkipNotEqualRegister(x, y),
            0xA => Self::SetIndexRegister(raw.addr()),
            0xB => Self::JumpWithOffset(raw.addr()),
            0xC => Self::Random(x, raw.byte()),
            0xD => Self::Display(x, y, raw.nibble()),
            0xE => match raw.byte() {
                0x9E => Self::SkipIfPressed(x),
                0xA1 => Self::SkipIfNotPressed(x),
                _ => Self::Unknown(ins),
            },
            0xF => match raw.byte() {
                0x07 => Self::CopyDelayToRegister(x),
                0x0A => Self::GetKey(x),
                0x15 => Self::CopyRegisterToDelay(x),
                0x18 => Self::CopyRegisterToSound(x),
                0x1E => Self::AddToIndex(x),
                0x29 => Self::PointChar(x),
                0x33 => Self::ToDecimal(x),
                0x55 => Self::StoreRegisterToMemory(x),
                0x65 => Self::LoadRegisterFromMemory(x),
                _ => Self::Unknown(ins),
            },
            _ => Self::Unknown(ins),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_manip() {
        let raw = RawInstruction(0x4CEE);
        assert_eq!(raw.top_nibble(), 0x4);
        assert_eq!(raw.x(), 0xC);
        assert_eq!(raw.y(), 0xE);
        assert_eq!(raw.nibble(), 0xE);
        assert_eq!(raw.byte(), 0xEE);
        assert_eq!(raw.addr(), 0xCEE);
    }

    #[test]
    fn decodes_each_family() {
        use Instruction::*;

        let cases = [
            (0x00E0, ClearScreen),
            (0x00EE, PopSubroutine),
            (0x1ABC, Jump(0xABC)),
            (0x2ABC, PushSubroutine(0xABC)),
            (0x3A12, SkipEqualConstant(0xA, 0x12)),
            (0x4A12, SkipNotEqualConstant(0xA, 0x12)),
            (0x5AB0, SkipEqualRegister(0xA, 0xB)),
            (0x6A12, SetRegister(0xA, 0x12)),
            (0x7A12, AddToRegister(0xA, 0x12)),
            (0x8AB0, CopyRegister(0xA, 0xB)),
            (0x8AB1, Or(0xA, 0xB)),
            (0x8AB2, And(0xA, 0xB)),
            (0x8AB3, XOr(0xA, 0xB)),
            (0x8AB4, Add(0xA, 0xB)),
            (0x8AB5, SubtractForward(0xA, 0xB)),
            (0x8AB6, RightShift(0xA, 0xB)),
            (0x8AB7, SubtractBackward(0xA, 0xB)),
            (0x8ABE, LeftShift(0xA, 0xB)),
            (0x9AB0, SkipNotEqualRegister(0xA, 0xB)),
            (0x5AB3, SkipEqualRegister(0xA, 0xB)),
            (0x9AB3, SkipNotEqualRegister(0xA, 0xB)),
            (0xA123, SetIndexRegister(0x123)),
            (0xB123, JumpWithOffset(0x123)),
            (0xCA7F, Random(0xA, 0x7F)),
            (0xD125, Display(0x1, 0x2, 0x5)),
            (0xE39E, SkipIfPressed(0x3)),
            (0xE3A1, SkipIfNotPressed(0x3)),
            (0xF307, CopyDelayToRegister(0x3)),
            (0xF30A, GetKey(0x3)),
            (0xF315, CopyRegisterToDelay(0x3)),
            (0xF318, CopyRegisterToSound(0x3)),
            (0xF31E, AddToIndex(0x3)),
            (0xF329, PointChar(0x3)),
            (0xF333, ToDecimal(0x3)),
            (0xF355, StoreRegisterToMemory(0x3)),
            (0xF365, LoadRegisterFromMemory(0x3)),
        ];
        for (code, expected) in cases {
            assert_eq!(Instruction::decode(code), expected, "{code:04x}");
        }
    }

    #[test]
    fn unrecognised_patterns_are_unknown() {
        for code in [0x0000, 0x0123, 0x00E1, 0x8AB8, 0x8ABF, 0xE3FF, 0xF3FF] {
            assert_eq!(Instruction::decode(code), Instruction::Unknown(code), "{code:04x}");
        }
    }
}
