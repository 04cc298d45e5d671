use common::constants::{ENTRY_POINT, MEM_SIZE};
use common::{Ins, Reg};
use program::{LoadError, Program};

use crate::alu::{self, AluOp, AluOut};
use crate::io::{Output, StdoutOutput};
use crate::{Fault, Flag, MachineState};

use std::sync::Arc;

use delegate::delegate;
use log::{debug, trace};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecRet {
    Ok,
    Halt,
}


pub struct Machine {
    state: MachineState,
    output: Arc<dyn Output>,
}

impl Machine {
    pub fn new() -> Machine {
        Self::with_output(Arc::new(StdoutOutput))
    }

    pub fn with_output(output: Arc<dyn Output>) -> Machine {
        Machine {
            state: MachineState::new(),
            output,
        }
    }

    // Run until a halt.
    pub fn run(&mut self) -> Result<(), Fault> {
        while self.step()? != ExecRet::Halt {}
        Ok(())
    }

    pub fn run_at(&mut self, pc: u8) -> Result<(), Fault> {
        self.state.set_pc(pc);
        self.run()
    }

    // Run a single instruction.
    pub fn step(&mut self) -> Result<ExecRet, Fault> {
        let pc = self.state.pc();
        let ins = self.decode()?;
        debug!("PC: {pc:#04x}: {ins}");
        self.state.inc_ins();
        self.exec(pc, ins)
    }

    fn decode(&self) -> Result<Ins, Fault> {
        let pc = self.state.pc();
        Ins::decode(self.state.next_ins()).map_err(|e| Fault::from_decode(pc, e))
    }

    pub fn load_image(&mut self, data: &[u8], start: u8) -> Result<(), LoadError> {
        let end = start as usize + data.len();
        if end > MEM_SIZE {
            return Err(LoadError::TooLarge { len: end });
        }
        for (byte, ptr) in data.iter().zip(start..=u8::MAX) {
            self.state.mem_write(ptr, *byte);
        }
        Ok(())
    }

    pub fn load_program(&mut self, prog: &Program) -> Result<(), LoadError> {
        self.load_image(prog.image(), ENTRY_POINT)
    }

    delegate! {
        to self.state {
            pub fn pc(&self) -> u8;
            pub fn sp(&self) -> u8;
            pub fn flag(&self) -> Flag;
            pub fn num_ins(&self) -> usize;
            pub fn reg_read(&self, reg: Reg) -> u8;
            pub fn reg_write(&mut self, reg: Reg, val: u8);
            pub fn mem_read(&self, addr: u8) -> u8;
            pub fn mem_write(&mut self, addr: u8, val: u8);
        }
    }

    pub fn get_state(&self) -> &MachineState {
        &self.state
    }

    pub fn get_state_mut(&mut self) -> &mut MachineState {
        &mut self.state
    }

    /// Apply a raw ALU selector to two registers, as an ALU opcode at PC would.
    pub fn alu(&mut self, selector: u8, a: Reg, b: Reg) -> Result<(), Fault> {
        let pc = self.state.pc();
        let op = AluOp::from_selector(selector).map_err(|e| Fault::from_alu(pc, e))?;
        self.alu_at(pc, op, a, b)
    }

    /// One line dump of PC, the bytes at PC and all the registers, in hex.
    pub fn trace(&self) -> String {
        let pc = self.state.pc();
        let bytes = [pc, pc.wrapping_add(1), pc.wrapping_add(2)].map(|a| self.state.mem_read(a));
        let regs: String = Reg::ALL
            .iter()
            .map(|r| format!(" {:02X}", self.state.reg_read(*r)))
            .collect();
        format!("TRACE: {pc:02X} | {:02X} {:02X} {:02X} |{regs}", bytes[0], bytes[1], bytes[2])
    }


    ///////////////////////////////////////////////////////////////////////////
    // Execute
    ///////////////////////////////////////////////////////////////////////////

    // Address of the instruction after `ins`, for everything that doesn't jump.
    fn fall_through(pc: u8, ins: &Ins) -> Result<u8, Fault> {
        let next = pc as usize + ins.size();
        u8::try_from(next).map_err(|_| Fault::AddressOutOfRange { pc, addr: next })
    }

    fn alu_at(&mut self, pc: u8, op: AluOp, a: Reg, b: Reg) -> Result<(), Fault> {
        let out = alu::execute(op, self.state.reg_read(a), self.state.reg_read(b))
            .map_err(|e| Fault::from_alu(pc, e))?;

        match out {
            AluOut::Value(val) => self.state.reg_write(a, val),
            AluOut::Flag(flag) => self.state.set_flag(flag),
        }
        Ok(())
    }

    fn push_byte(&mut self, pc: u8, reg: Reg) -> Result<(), Fault> {
        let sp = self.state.sp().checked_sub(1).ok_or(Fault::StackOverflow { pc })?;
        self.state.set_sp(sp);
        // Read after the decrement, so PUSH sp stores the new value.
        let val = self.state.reg_read(reg);
        self.state.mem_write(sp, val);
        Ok(())
    }

    fn pop_byte(&mut self, pc: u8, reg: Reg) -> Result<(), Fault> {
        let val = self.state.mem_read(self.state.sp());
        // The increment applies to whatever SP holds after the load.
        let base = if reg == Reg::SP { val } else { self.state.sp() };
        let sp = base.checked_add(1).ok_or(Fault::StackUnderflow { pc })?;
        self.state.reg_write(reg, val);
        self.state.set_sp(sp);
        Ok(())
    }

    fn exec_call(&mut self, pc: u8, reg: Reg) -> Result<(), Fault> {
        let ret_addr = pc as usize + Ins::Call { reg }.size();
        let ret_addr = u8::try_from(ret_addr)
            .map_err(|_| Fault::AddressOutOfRange { pc, addr: ret_addr })?;
        let sp = self.state.sp().checked_sub(1).ok_or(Fault::StackOverflow { pc })?;

        self.state.set_sp(sp);
        self.state.mem_write(sp, ret_addr);
        let target = self.state.reg_read(reg);
        trace!("PC: {pc:#04x}: CALL to {target:#04x}, returning to {ret_addr:#04x}");
        self.state.set_pc(target);
        Ok(())
    }

    fn exec_ret(&mut self, pc: u8) -> Result<(), Fault> {
        let sp = self.state.sp();
        let target = self.state.mem_read(sp);
        let sp = sp.checked_add(1).ok_or(Fault::StackUnderflow { pc })?;

        self.state.set_sp(sp);
        trace!("PC: {pc:#04x}: RET to {target:#04x}");
        self.state.set_pc(target);
        Ok(())
    }

    fn exec_double(&mut self, pc: u8, ins: &Ins, op: AluOp, a: Reg, b: Reg) -> Result<(), Fault> {
        let next = Self::fall_through(pc, ins)?;
        self.alu_at(pc, op, a, b)?;
        self.state.set_pc(next);
        Ok(())
    }

    fn exec_cond_jmp(&mut self, pc: u8, ins: &Ins, reg: Reg, on_equal: bool) -> Result<(), Fault> {
        let taken = self.state.flag().is_equal() == on_equal;
        let next = if taken {
            self.state.reg_read(reg)
        } else {
            Self::fall_through(pc, ins)?
        };
        trace!("PC: {pc:#04x}: branch {}taken", if taken { "" } else { "not " });
        self.state.set_pc(next);
        Ok(())
    }

    fn exec(&mut self, pc: u8, ins: Ins) -> Result<ExecRet, Fault> {
        match ins {
            Ins::Hlt => return Ok(ExecRet::Halt),

            Ins::Ldi { reg, imm } => {
                let next = Self::fall_through(pc, &ins)?;
                self.state.reg_write(reg, imm);
                self.state.set_pc(next);
            }
            Ins::Prn { reg } => {
                let next = Self::fall_through(pc, &ins)?;
                self.output
                    .emit(self.state.reg_read(reg))
                    .map_err(|e| Fault::Output { pc, kind: e.kind() })?;
                self.state.set_pc(next);
            }
            Ins::Add { a, b } => self.exec_double(pc, &ins, AluOp::Add, a, b)?,
            Ins::Mul { a, b } => self.exec_double(pc, &ins, AluOp::Mul, a, b)?,
            Ins::Cmp { a, b } => self.exec_double(pc, &ins, AluOp::Cmp, a, b)?,
            Ins::Push { reg } => {
                let next = Self::fall_through(pc, &ins)?;
                self.push_byte(pc, reg)?;
                self.state.set_pc(next);
            }
            Ins::Pop { reg } => {
                let next = Self::fall_through(pc, &ins)?;
                self.pop_byte(pc, reg)?;
                self.state.set_pc(next);
            }

            // Control flow: PC is assigned, never incremented.
            Ins::Call { reg } => self.exec_call(pc, reg)?,
            Ins::Ret => self.exec_ret(pc)?,
            Ins::Jmp { reg } => {
                let target = self.state.reg_read(reg);
                self.state.set_pc(target);
            }
            Ins::Jeq { reg } => self.exec_cond_jmp(pc, &ins, reg, true)?,
            Ins::Jne { reg } => self.exec_cond_jmp(pc, &ins, reg, false)?,
        }

        Ok(ExecRet::Ok)
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}
