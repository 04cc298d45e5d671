use disassembler::{Disassembled, disassemble};
use program::Program;

use std::ops::Range;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// LS-8 Disassembler
#[derive(Parser)]
struct Args {
    /// Program file to disassemble
    program: PathBuf,

    /// Elide long runs of zero bytes
    #[arg(long)]
    collapse_zeros: bool,
}

fn remove_long_zeros(disassembly: &mut Vec<Disassembled>) {
    const THRESH: usize = 8;

    let mut ranges = vec![];
    let mut range_start = None;
    for (i, dis) in disassembly.iter().enumerate() {
        if dis.is_zero() {
            if range_start.is_none() {
                range_start = Some(i);
            }
        } else if let Some(start) = range_start {
            ranges.push(Range{start, end: i});
            range_start = None;
        }
    }
    if let Some(start) = range_start {
        ranges.push(Range{start, end: disassembly.len()});
    }

    for range in ranges.iter().rev() {
        if range.len() > THRESH {
            // Leave the first and last, an ellipses will be added between.
            disassembly.drain(range.start + 1..range.end - 1);
        }
    }
}


fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    let prog = match Program::read_from(&args.program) {
        Ok(prog) => prog,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let mut disassembly = disassemble(prog.image());

    if args.collapse_zeros {
        remove_long_zeros(&mut disassembly);
    }

    let mut prev: Option<Disassembled> = None;
    for dis in disassembly {
        if let Some(p) = &prev {
            if p.end() != dis.addr as usize {
                println!("# ...");
            }
        }
        println!("{}", dis);
        prev = Some(dis);
    }
    ExitCode::SUCCESS
}
