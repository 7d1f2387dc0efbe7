use std::process::ExitCode;

use annal_cli::Cli;
use clap::Parser;

fn main() -> ExitCode {
    annal_cli::run(Cli::parse())
}
