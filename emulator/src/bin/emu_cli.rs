use emu_lib::{ExecRet, Fault, Machine};
use program::Program;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;


/// LS-8 Emulator
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Program to run, one binary literal per line
    program: PathBuf,

    /// Dump PC, the bytes at PC and the registers before each instruction
    #[arg(long)]
    trace: bool,
}

const EXIT_USAGE: u8 = 1;
const EXIT_LOAD: u8 = 2;
const EXIT_FAULT: u8 = 3;


fn run_traced(machine: &mut Machine) -> Result<(), Fault> {
    loop {
        eprintln!("{}", machine.trace());
        if machine.step()? == ExecRet::Halt {
            return Ok(());
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            return ExitCode::from(EXIT_USAGE);
        }
        // --help and --version
        Err(e) => e.exit(),
    };

    let mut machine = Machine::new();
    let loaded = Program::read_from(&args.program).and_then(|prog| machine.load_program(&prog));
    if let Err(e) = loaded {
        eprintln!("{e}");
        return ExitCode::from(EXIT_LOAD);
    }

    let res = if args.trace {
        run_traced(&mut machine)
    } else {
        machine.run()
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(fault) => {
            error!("Halted by fault after {} instructions", machine.num_ins());
            eprintln!("fault: {fault}");
            ExitCode::from(EXIT_FAULT)
        }
    }
}
