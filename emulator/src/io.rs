use std::collections::VecDeque;
use std::io::{self, stdout, Write};
use std::sync::Mutex;

/// Where PRN sends register values. A failed write stops the machine.
pub trait Output: Send + Sync {
    fn emit(&self, val: u8) -> io::Result<()>;
}

/// Prints each value in decimal on its own line.
#[derive(Default, Clone, Copy)]
pub struct StdoutOutput;

impl Output for StdoutOutput {
    fn emit(&self, val: u8) -> io::Result<()> {
        let mut out = stdout().lock();
        writeln!(out, "{val}")?;
        out.flush()
    }
}


#[derive(Default)]
pub struct PipeOutput {
    buf: Mutex<VecDeque<u8>>,
}

impl Output for PipeOutput {
    fn emit(&self, val: u8) -> io::Result<()> {
        self.buf.lock().unwrap().push_back(val);
        Ok(())
    }
}

impl PipeOutput {
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.buf.lock().unwrap()).into()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.lock().unwrap().is_empty()
    }

    pub fn pop_front(&self) -> Option<u8> {
        self.buf.lock().unwrap().pop_front()
    }
}
