use clap::Parser;

mod cli;
mod commands;
mod error;

use cli::{CliArgs, Commands};
pub use error::{CliError, CliResult};

fn main() {
    env_logger::init();

    let args = CliArgs::parse();
    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(args: CliArgs) -> CliResult<()> {
    match args.command {
        Commands::Embed(cmd) => cmd.run(),
        Commands::Extract(cmd) => cmd.run(),
        Commands::Capacity(cmd) => cmd.run(),
    }
}
