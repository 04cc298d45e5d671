pub mod alu;
pub mod fault;
pub mod io;
pub mod machine;
pub mod machine_state;

pub use fault::Fault;
pub use machine::{ExecRet, Machine};
pub use machine_state::{Flag, MachineState};
pub use io::Output;
