use std::process::ExitCode;

use clap::Parser;

use faultline::cmd::Cli;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
