use super::args::{Cli, Command};
use crate::exit_codes::OK;

pub mod code;
pub mod sample;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Code(args) => code::run(args),
        Command::Sample(args) => sample::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(OK)
        }
    }
}
