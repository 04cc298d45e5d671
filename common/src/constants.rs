pub const MEM_SIZE: usize = 256;
pub const NUM_REGS: usize = 8;

pub const ENTRY_POINT: u8 = 0x00;

// The stack grows down from here. The bytes above it are left free.
pub const STACK_TOP: u8 = 0xf4;

// Longest instruction: opcode plus two operands.
pub const MAX_INS_SIZE: usize = 3;
