use common::constants::{ENTRY_POINT, MAX_INS_SIZE, MEM_SIZE, NUM_REGS, STACK_TOP};
use common::Reg;

use derive_more::IsVariant;
use log::trace;

// Every u8 is a valid address.
const _: () = assert!(MEM_SIZE == u8::MAX as usize + 1);

/// Outcome of the last CMP. Only the conditional jumps read it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum Flag {
    #[default]
    Unset,
    Equal,
    LessThan,
    GreaterThan,
}

// This is separate from Machine so the handlers can borrow it alongside the output.
pub struct MachineState {
    num_ins: usize,
    mem: [u8; MEM_SIZE],
    regs: [u8; NUM_REGS],
    pc: u8,
    flag: Flag,
}

impl MachineState {
    pub fn new() -> Self {
        let mut regs = [0; NUM_REGS];
        regs[Reg::SP.index()] = STACK_TOP;
        MachineState {
            num_ins: 0usize,
            mem: [0; MEM_SIZE],
            regs,
            pc: ENTRY_POINT,
            flag: Flag::Unset,
        }
    }

    pub fn inc_ins(&mut self) {
        self.num_ins += 1;
    }

    pub fn num_ins(&self) -> usize {
        self.num_ins
    }

    pub fn mem_read(&self, addr: u8) -> u8 {
        self.mem[addr as usize]
    }

    pub fn mem_write(&mut self, addr: u8, val: u8) {
        trace!("Mem: writing {val:#04x} to {addr:#04x}");
        self.mem[addr as usize] = val;
    }

    pub fn mem(&self) -> &[u8] {
        &self.mem
    }

    pub fn reg_read(&self, reg: Reg) -> u8 {
        self.regs[reg.index()]
    }

    pub fn reg_write(&mut self, reg: Reg, val: u8) {
        trace!("Reg: writing {val:#04x} to {reg}");
        self.regs[reg.index()] = val;
    }

    pub fn sp(&self) -> u8 {
        self.reg_read(Reg::SP)
    }

    pub fn set_sp(&mut self, val: u8) {
        self.reg_write(Reg::SP, val);
    }

    pub fn pc(&self) -> u8 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u8) {
        self.pc = pc;
    }

    pub fn flag(&self) -> Flag {
        self.flag
    }

    pub fn set_flag(&mut self, flag: Flag) {
        trace!("Flag: {flag:?}");
        self.flag = flag;
    }

    // The instruction at PC plus whatever follows it, cut short at the end of memory.
    pub fn next_ins(&self) -> &[u8] {
        let pc = self.pc as usize;
        &self.mem[pc..usize::min(pc + MAX_INS_SIZE, MEM_SIZE)]
    }
}

impl Default for MachineState {
    fn default() -> Self {
        Self::new()
    }
}
