use common::{Ins, Reg};
use emu_lib::Flag;

use crate::util::{addr_of, assemble, machine};

fn jeq(reg: Reg) -> Ins {
    Ins::Jeq { reg }
}

fn jne(reg: Reg) -> Ins {
    Ins::Jne { reg }
}

fn run(ins: fn(Reg) -> Ins, flag: Flag, should_take: bool) {
    let mut prog = vec![
        Ins::Ldi { reg: Reg::R3, imm: 0 }, // patched to `taken`
        ins(Reg::R3),

        Ins::Ldi { reg: Reg::R0, imm: 1 },
        Ins::Hlt,

    // taken:
        Ins::Ldi { reg: Reg::R0, imm: 2 },
        Ins::Hlt,
    ];
    prog[0] = Ins::Ldi { reg: Reg::R3, imm: addr_of(&prog, 4) };

    let (mut m, _) = machine(&assemble(&prog));
    m.get_state_mut().set_flag(flag);
    m.run().unwrap();
    let taken = match m.reg_read(Reg::R0) {
        1 => false,
        2 => true,
        r0 => panic!("Invalid r0: {r0}"),
    };
    assert_eq!(taken, should_take, "branch on {flag:?}");
    assert_eq!(m.flag(), flag, "flag changed by branch");
}

#[test]
fn jeq_flags() {
    run(jeq, Flag::Unset, false);
    run(jeq, Flag::Equal, true);
    run(jeq, Flag::LessThan, false);
    run(jeq, Flag::GreaterThan, false);
}

#[test]
fn jne_flags() {
    run(jne, Flag::Unset, true);
    run(jne, Flag::Equal, false);
    run(jne, Flag::LessThan, true);
    run(jne, Flag::GreaterThan, true);
}

#[test]
fn not_taken_advances_two() {
    let bin = assemble(&[Ins::Jeq { reg: Reg::R0 }, Ins::Hlt]);
    let (mut m, _) = machine(&bin);
    m.step().unwrap();
    assert_eq!(m.pc(), 2);
}

#[test]
fn taken_ignores_width() {
    // Jumping to the instruction itself must not add the width on top.
    let bin = assemble(&[Ins::Ldi { reg: Reg::R1, imm: 3 }, Ins::Jne { reg: Reg::R1 }]);
    let (mut m, _) = machine(&bin);
    m.step().unwrap();
    for _ in 0..10 {
        m.step().unwrap();
        assert_eq!(m.pc(), 3);
    }
}

#[test]
fn compare_then_branch() {
    // Counts r0 up until it equals r1.
    let mut prog = vec![
        Ins::Ldi { reg: Reg::R0, imm: 0 },
        Ins::Ldi { reg: Reg::R1, imm: 5 },
        Ins::Ldi { reg: Reg::R2, imm: 1 },
        Ins::Ldi { reg: Reg::R3, imm: 0 }, // patched to `loop`
    // loop:
        Ins::Add { a: Reg::R0, b: Reg::R2 },
        Ins::Cmp { a: Reg::R0, b: Reg::R1 },
        Ins::Jne { reg: Reg::R3 },
        Ins::Hlt,
    ];
    prog[3] = Ins::Ldi { reg: Reg::R3, imm: addr_of(&prog, 4) };
    let (mut m, _) = machine(&assemble(&prog));
    m.run().unwrap();
    assert_eq!(m.reg_read(Reg::R0), 5);
    assert_eq!(m.flag(), Flag::Equal);
    assert_eq!(m.pc(), addr_of(&prog, 7));
}
