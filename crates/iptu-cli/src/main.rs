//! IPTU Checker - Property tax declaration verification via satellite imagery
//!
//! A CLI tool that compares owner-declared property areas against areas
//! measured from satellite imagery.

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = commands::execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
