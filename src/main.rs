#![forbid(unsafe_code)]

//! snifftop — live traffic-analysis dashboard CLI entry point.

use clap::Parser;

mod cli_app;

fn main() {
    let args = cli_app::Cli::parse();
    if let Err(e) = cli_app::run(&args) {
        eprintln!("snifftop: {e}");
        std::process::exit(1);
    }
}
