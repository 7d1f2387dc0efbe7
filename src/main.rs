//! Annalist
//!
//! Launcher for the Annalist management tool.

use std::process::ExitCode;

use annal_cli::{Cli, commands};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::FmtSubscriber;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::from(annal_cli::exit_code(&e));
        }
    };

    FmtSubscriber::builder()
        .with_env_filter(cli.env_filter(&settings))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    debug!(version = annal_cli::VERSION, base_dir = %settings.base_dir.display(), "starting");

    match commands::execute(&cli.command, &settings) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(annal_cli::exit_code(&e))
        }
    }
}
