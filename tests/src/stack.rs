use common::constants::STACK_TOP;
use common::{Ins, Opcode, Reg};
use emu_lib::Fault;

use crate::util::{addr_of, assemble, machine, run};

#[test]
fn push_pop_round_trip() {
    let (m, _) = run(&[
        Ins::Ldi { reg: Reg::R4, imm: 0x5a },
        Ins::Push { reg: Reg::R4 },
        Ins::Ldi { reg: Reg::R4, imm: 0 },
        Ins::Pop { reg: Reg::R4 },
        Ins::Hlt,
    ]);
    assert_eq!(m.reg_read(Reg::R4), 0x5a);
    assert_eq!(m.sp(), STACK_TOP);
}

#[test]
fn three_pushes() {
    let (m, _) = run(&[
        Ins::Ldi { reg: Reg::R0, imm: 10 },
        Ins::Ldi { reg: Reg::R1, imm: 20 },
        Ins::Ldi { reg: Reg::R2, imm: 30 },
        Ins::Push { reg: Reg::R0 },
        Ins::Push { reg: Reg::R1 },
        Ins::Push { reg: Reg::R2 },
        Ins::Hlt,
    ]);
    assert_eq!(m.sp(), STACK_TOP - 3);
    assert_eq!(m.mem_read(STACK_TOP - 1), 10);
    assert_eq!(m.mem_read(STACK_TOP - 2), 20);
    assert_eq!(m.mem_read(STACK_TOP - 3), 30);

    let pops = assemble(&[
        Ins::Pop { reg: Reg::R3 },
        Ins::Prn { reg: Reg::R3 },
        Ins::Pop { reg: Reg::R3 },
        Ins::Prn { reg: Reg::R3 },
        Ins::Pop { reg: Reg::R3 },
        Ins::Prn { reg: Reg::R3 },
        Ins::Hlt,
    ]);
    let (mut popper, out) = machine(&pops);
    popper.get_state_mut().set_sp(m.sp());
    for addr in STACK_TOP - 3..STACK_TOP {
        popper.mem_write(addr, m.mem_read(addr));
    }
    popper.run().unwrap();
    assert_eq!(out.take(), vec![30, 20, 10]);
    assert_eq!(popper.sp(), STACK_TOP);

    // The stack is untouched above its top.
    assert_eq!(m.get_state().mem()[STACK_TOP as usize..], [0; 12]);
}

#[test]
fn pop_empty_stack() {
    // Reads whatever sits above the top, like any other pop.
    let (mut m, _) = machine(&assemble(&[Ins::Pop { reg: Reg::R0 }, Ins::Hlt]));
    m.mem_write(STACK_TOP, 0x77);
    m.run().unwrap();
    assert_eq!(m.reg_read(Reg::R0), 0x77);
    assert_eq!(m.sp(), STACK_TOP + 1);
}

#[test]
fn push_sp() {
    let (m, _) = run(&[Ins::Push { reg: Reg::SP }, Ins::Hlt]);
    assert_eq!(m.mem_read(STACK_TOP - 1), STACK_TOP - 1);
}

#[test]
fn pop_sp() {
    let (mut m, _) = machine(&assemble(&[Ins::Pop { reg: Reg::SP }, Ins::Hlt]));
    m.mem_write(STACK_TOP, 0x40);
    m.run().unwrap();
    assert_eq!(m.sp(), 0x41);
}

#[test]
fn call_and_push_share_stack() {
    // The subroutine pops the value pushed before the call out from under its
    // return address, then restores the return address.
    let mut prog = vec![
        Ins::Ldi { reg: Reg::R0, imm: 9 },
        Ins::Ldi { reg: Reg::R1, imm: 0 }, // patched to `fun`
        Ins::Push { reg: Reg::R0 },
        Ins::Call { reg: Reg::R1 },
        Ins::Hlt,

    // fun:
        Ins::Pop { reg: Reg::R2 },  // return address
        Ins::Pop { reg: Reg::R3 },  // 9
        Ins::Push { reg: Reg::R2 },
        Ins::Prn { reg: Reg::R3 },
        Ins::Ret,
    ];
    prog[1] = Ins::Ldi { reg: Reg::R1, imm: addr_of(&prog, 5) };

    let (m, out) = run(&prog);
    assert_eq!(out, vec![9]);
    assert_eq!(m.reg_read(Reg::R2), addr_of(&prog, 4));
    assert_eq!(m.pc(), addr_of(&prog, 4));
    assert_eq!(m.sp(), STACK_TOP);
}

#[test]
fn overflow() {
    // The first push lands on address 0, so push the PUSH opcode itself and
    // the instruction is still there to run again.
    let (mut m, _) = machine(&assemble(&[Ins::Push { reg: Reg::R0 }, Ins::Hlt]));
    m.reg_write(Reg::R0, Opcode::Push.encode());
    m.get_state_mut().set_sp(1);
    assert_eq!(m.step(), Ok(emu_lib::ExecRet::Ok));
    assert_eq!(m.sp(), 0);
    assert_eq!(m.mem_read(0), Opcode::Push.encode());
    m.get_state_mut().set_pc(0);
    assert_eq!(m.step(), Err(Fault::StackOverflow { pc: 0 }));
    assert_eq!(m.sp(), 0);
    assert_eq!(m.pc(), 0);

    let (mut m, _) = machine(&assemble(&[Ins::Call { reg: Reg::R0 }]));
    m.get_state_mut().set_sp(0);
    assert_eq!(m.run(), Err(Fault::StackOverflow { pc: 0 }));
    assert_eq!(m.pc(), 0);
}

#[test]
fn underflow() {
    let (mut m, _) = machine(&assemble(&[Ins::Pop { reg: Reg::R0 }, Ins::Hlt]));
    m.get_state_mut().set_sp(0xff);
    m.mem_write(0xff, 3);
    assert_eq!(m.run(), Err(Fault::StackUnderflow { pc: 0 }));
    assert_eq!(m.reg_read(Reg::R0), 0);
}
