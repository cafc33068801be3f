mod cli;

use crate::cli::CliCommand;

fn main() {
    // Parse CLI, load config, initialize logging and dispatch.
    std::process::exit(CliCommand::run_from_args());
}
