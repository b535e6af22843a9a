use std::collections::HashSet;

use log::{debug, trace, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    decode::Instruction,
    display::{FrameBuffer, PIXELS},
    error::{CpuFault, LoadError},
    keyboard::Keyboard,
    memory::{glyph_addr, Memory, Stack, TypeAddr},
    quirks::Quirks,
    registers::{IndexRegister, ProgramCounter, Registers, FLAG_REGISTER},
    timer::Timers,
};

/// The whole virtual machine. One value owns every piece of state; the host
/// drives it through `run_cycle`, `tick_timers` and `set_key`.
pub struct Emulator {
    fb: FrameBuffer,
    regs: Registers,
    mem: Memory,
    stack: Stack,
    pc: ProgramCounter,
    index: IndexRegister,
    timers: Timers,
    keys: Keyboard,
    quirks: Quirks,
    rng: StdRng,
    seen: HashSet<u16>,
    history: Vec<u16>,
}

impl Emulator {
    pub fn new(quirks: Quirks) -> Self {
        Self::with_rng(quirks, StdRng::from_entropy())
    }

    /// Same as [`Emulator::new`] but CXNN draws from a seeded generator.
    pub fn with_seed(quirks: Quirks, seed: u64) -> Self {
        Self::with_rng(quirks, StdRng::seed_from_u64(seed))
    }

    fn with_rng(quirks: Quirks, rng: StdRng) -> Self {
        let mut emu = Self {
            fb: FrameBuffer::new(),
            regs: Registers::new(),
            mem: Memory::new(),
            stack: Stack::new(),
            pc: ProgramCounter::new(),
            index: IndexRegister::default(),
            timers: Timers::new(),
            keys: Keyboard::new(),
            quirks,
            rng,
            seen: HashSet::new(),
            history: vec![],
        };
        emu.reset();
        emu
    }

    /// Zero all state, reinstall the glyph set, point PC at the program area
    /// and clear the screen.
    pub fn reset(&mut self) {
        self.mem.reset();
        self.regs.reset();
        self.stack.reset();
        self.pc = ProgramCounter::new();
        self.index = IndexRegister::default();
        self.timers.reset();
        self.keys.reset();
        self.fb.reset();
        self.seen.clear();
        self.history.clear();
        self.fb.clear_buffer();
        debug!("machine reset, pc at {:#05x}", self.pc.0);
    }

    pub fn load_program(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        self.mem.load_program(bytes)
    }

    pub fn fetch_decode(&mut self) -> Result<(TypeAddr, Instruction), CpuFault> {
        let addr = self.pc.0;
        let ins = self.mem.instruction_at(addr)?;
        self.pc.increment();
        if self.seen.insert(ins) {
            self.history.push(ins);
        }
        let operation = Instruction::decode(ins);
        trace!("{addr:03x}: {ins:04x} {operation:?}");
        Ok((addr, operation))
    }

    /// One fetch/decode/execute step.
    pub fn run_cycle(&mut self) -> Result<(), CpuFault> {
        let result = self
            .fetch_decode()
            .and_then(|(addr, operation)| self.execute_ins(operation, addr));
        if let Err(fault) = &result {
            if !fault.is_recoverable() {
                warn!("cycle faulted: {fault}");
            }
        }
        result
    }

    /// Run up to `n` cycles. Unknown instructions are logged and skipped, any
    /// other fault stops the run and is returned.
    pub fn run_cycles(&mut self, n: usize) -> Result<(), CpuFault> {
        for _ in 0..n {
            match self.run_cycle() {
                Err(fault) if !fault.is_recoverable() => return Err(fault),
                _ => {}
            }
        }
        Ok(())
    }

    // `addr` is where `ins` was fetched from, PC already points past it
    pub fn execute_ins(&mut self, ins: Instruction, addr: TypeAddr) -> Result<(), CpuFault> {
        match ins {
            Instruction::ClearScreen => self.fb.clear_buffer(),
            Instruction::PopSubroutine => {
                let ret = self.stack.pop(addr)?;
                self.pc.set_addr(ret);
            }
            Instruction::Jump(target) => self.pc.set_addr(target),
            Instruction::PushSubroutine(target) => {
                // store the following instruction to return back to
                self.stack.push(self.pc.0, addr)?;
                self.pc.set_addr(target);
            }
            Instruction::SkipEqualConstant(vx, nn) => self.skip_if(self.regs.get(vx) == nn),
            Instruction::SkipNotEqualConstant(vx, nn) => self.skip_if(self.regs.get(vx) != nn),
            Instruction::SkipEqualRegister(vx, vy) => {
                self.skip_if(self.regs.get(vx) == self.regs.get(vy))
            }
            Instruction::SkipNotEqualRegister(vx, vy) => {
                self.skip_if(self.regs.get(vx) != self.regs.get(vy))
            }
            Instruction::SetRegister(vx, nn) => self.regs.set_register(vx, nn),
            Instruction::AddToRegister(vx, nn) => self.regs.add_to_register(vx, nn),
            Instruction::CopyRegister(vx, vy) => self.regs.set_register(vx, self.regs.get(vy)),
            Instruction::Or(vx, vy) => self.logic(vx, vy, |x, y| x | y),
            Instruction::And(vx, vy) => self.logic(vx, vy, |x, y| x & y),
            Instruction::XOr(vx, vy) => self.logic(vx, vy, |x, y| x ^ y),
            Instruction::Add(vx, vy) => {
                let sum = self.regs.get(vx) as u16 + self.regs.get(vy) as u16;
                self.regs.set_register(vx, sum as u8);
                self.regs.set_flag(sum > 0xFF);
            }
            Instruction::SubtractForward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set_register(vx, x.wrapping_sub(y));
                self.regs.set_flag(x >= y); // no borrow
            }
            Instruction::SubtractBackward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set_register(vx, y.wrapping_sub(x));
                self.regs.set_flag(y >= x); // no borrow
            }
            Instruction::RightShift(vx, vy) => {
                let value = self.shift_source(vx, vy);
                self.regs.set_register(vx, value >> 1);
                self.regs.set_register(FLAG_REGISTER, value & 1);
            }
            Instruction::LeftShift(vx, vy) => {
                let value = self.shift_source(vx, vy);
                let vf = if self.quirks.shift_left_flag_low_bit {
                    value & 1
                } else {
                    (value >> 7) & 1
                };
                self.regs.set_register(vx, value << 1);
                self.regs.set_register(FLAG_REGISTER, vf);
            }
            Instruction::SetIndexRegister(target) => self.index.set_addr(target),
            Instruction::JumpWithOffset(target) => {
                let offset_reg = if self.quirks.jump_offset_uses_vx {
                    (target >> 8) as u8
                } else {
                    0
                };
                self.pc
                    .set_addr(target + self.regs.get(offset_reg) as TypeAddr);
            }
            Instruction::Random(vx, nn) => {
                let ransuu: u8 = self.rng.gen();
                self.regs.set_register(vx, nn & ransuu);
            }
            Instruction::Display(reg_x, reg_y, height) => {
                let (x, y) = (self.regs.get(reg_x), self.regs.get(reg_y));
                // From I to I + N, each byte is one 8 pixel row
                let mut sprite = [0u8; 15];
                for (row, slot) in sprite.iter_mut().enumerate().take(height as usize) {
                    *slot = self.mem.get(self.index.0 as usize + row)?;
                }
                let vf = self.fb.paint(x, y, &sprite[..height as usize]);
                self.regs.set_flag(vf);
            }
            Instruction::SkipIfPressed(vx) => {
                self.skip_if(self.keys.get_key_status_from_num(self.regs.get(vx)))
            }
            Instruction::SkipIfNotPressed(vx) => {
                self.skip_if(!self.keys.get_key_status_from_num(self.regs.get(vx)))
            }
            Instruction::CopyDelayToRegister(vx) => {
                self.regs.set_register(vx, self.timers.delay.count)
            }
            Instruction::GetKey(vx) => match self.keys.first_pressed() {
                Some(key) => self.regs.set_register(vx, key),
                // run this instruction again next cycle
                None => self.pc.decrement(),
            },
            Instruction::CopyRegisterToDelay(vx) => self.timers.delay.set(self.regs.get(vx)),
            Instruction::CopyRegisterToSound(vx) => self.timers.sound.set(self.regs.get(vx)),
            Instruction::AddToIndex(vx) => self.index.advance(self.regs.get(vx) as TypeAddr),
            Instruction::PointChar(vx) => self.index.set_addr(glyph_addr(self.regs.get(vx))),
            Instruction::ToDecimal(vx) => {
                let value = self.regs.get(vx);
                let base = self.index.0 as usize;
                self.mem.check_span(base, 3)?;
                self.mem.set(base, value / 100)?;
                self.mem.set(base + 1, (value / 10) % 10)?;
                self.mem.set(base + 2, value % 10)?;
            }
            Instruction::StoreRegisterToMemory(vx) => {
                self.mem.check_span(self.index.0 as usize, vx as usize + 1)?;
                for reg in 0..=vx {
                    self.mem
                        .set(self.index.0 as usize + reg as usize, self.regs.get(reg))?;
                }
                self.advance_index_after_transfer(vx);
            }
            Instruction::LoadRegisterFromMemory(vx) => {
                self.mem.check_span(self.index.0 as usize, vx as usize + 1)?;
                for reg in 0..=vx {
                    let reg_val = self.mem.get(self.index.0 as usize + reg as usize)?;
                    self.regs.set_register(reg, reg_val);
                }
                self.advance_index_after_transfer(vx);
            }
            Instruction::Unknown(opcode) => {
                warn!("skipping unknown instruction {opcode:04x} at {addr:#05x}");
                return Err(CpuFault::UnknownInstruction { opcode, addr });
            }
        }
        Ok(())
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.pc.increment();
        }
    }

    fn logic(&mut self, vx: u8, vy: u8, op: impl Fn(u8, u8) -> u8) {
        self.regs
            .set_register(vx, op(self.regs.get(vx), self.regs.get(vy)));
        if self.quirks.logic_resets_flag {
            self.regs.set_flag(false);
        }
    }

    fn shift_source(&self, vx: u8, vy: u8) -> u8 {
        if self.quirks.shift_reads_vy {
            self.regs.get(vy)
        } else {
            self.regs.get(vx)
        }
    }

    fn advance_index_after_transfer(&mut self, vx: u8) {
        if self.quirks.load_store_increments_index {
            self.index.advance(vx as TypeAddr + 1);
        }
    }

    /// Count both timers down by one. Call at [`crate::timer::TIMER_DEC_PER_SECOND`].
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.keys.update_key(key, pressed);
    }

    pub fn set_register(&mut self, reg: u8, value: u8) {
        self.regs.set_register(reg, value);
    }

    pub fn framebuffer_snapshot(&self) -> [u8; PIXELS] {
        self.fb.snapshot()
    }

    pub fn consume_dirty_flag(&mut self) -> bool {
        self.fb.consume_dirty()
    }

    /// True once for every time the sound timer ran out.
    pub fn beep_pending(&mut self) -> bool {
        self.timers.take_beep()
    }

    pub fn sound_active(&self) -> bool {
        self.timers.sound_active()
    }

    pub fn register(&self, reg: u8) -> u8 {
        self.regs.get(reg)
    }

    pub fn index(&self) -> TypeAddr {
        self.index.0
    }

    pub fn pc(&self) -> TypeAddr {
        self.pc.0
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn delay_timer(&self) -> u8 {
        self.timers.delay.count
    }

    pub fn sound_timer(&self) -> u8 {
        self.timers.sound.count
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.fb.pixel(x, y)
    }

    pub fn memory(&self) -> &[u8] {
        self.mem.as_slice()
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    /// Every distinct opcode executed since the last reset, in first seen order.
    pub fn opcode_history(&self) -> &[u16] {
        &self.history
    }

    pub fn memory_dump(&self) -> String {
        self.mem.dump()
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new(Quirks::default())
    }
}
