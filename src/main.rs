mod aws;
mod cli;
mod config;
mod constants;
mod entity;
mod errors;
mod linux;
mod run;
mod sanity;
mod snap;
mod utils;

use clap::Parser;

fn main() -> Result<(), errors::SnapError> {
    let cli_args = cli::Cli::parse();
    run::run(cli_args)
}
