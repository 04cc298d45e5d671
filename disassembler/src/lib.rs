use common::constants::{MAX_INS_SIZE, MEM_SIZE};
use common::Ins;

use std::fmt;

use log::trace;

pub struct Disassembled {
    pub addr: u8,
    pub repr: Vec<u8>,
    pub ins: Option<Ins>,
}

impl Disassembled {
    pub fn is_zero(&self) -> bool {
        self.ins.is_none() && self.repr == [0]
    }

    pub fn end(&self) -> usize {
        self.addr as usize + self.repr.len()
    }
}

// Prints as program file text, so a listing can be loaded again.
impl fmt::Display for Disassembled {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Some((first, rest)) = self.repr.split_first() else {
            return Ok(());
        };
        write!(f, "{first:08b} # {:02X}: ", self.addr)?;
        match &self.ins {
            Some(ins) => write!(f, "{ins}")?,
            None => write!(f, ".byte")?,
        }
        for byte in rest {
            write!(f, "\n{byte:08b}")?;
        }
        Ok(())
    }
}

pub fn disassemble(bin: &[u8]) -> Vec<Disassembled> {
    assert!(bin.len() <= MEM_SIZE);
    let mut out = vec![];
    let mut addr: usize = 0;
    while addr < bin.len() {
        let upper = usize::min(addr + MAX_INS_SIZE, bin.len());
        match Ins::decode(&bin[addr..upper]) {
            Ok(ins) => {
                out.push(Disassembled {
                    addr: addr as u8,
                    repr: bin[addr..addr + ins.size()].into(),
                    ins: Some(ins),
                });
                addr += ins.size();
            }
            Err(e) => {
                trace!("{addr:#04x}: {e}");
                out.push(Disassembled {
                    addr: addr as u8,
                    repr: vec![bin[addr]],
                    ins: None,
                });
                addr += 1;
            }
        }
    }

    out
}
