//! ferrite-kernels CLI
//!
//! Thin front end over the `ferrite_kernels` library. Every operator is a
//! subcommand; flat ones read named flags, JSON ones read stdin.
//!
//! Run with:
//!   ferrite-kernels tensor --mode matmul --a01 2
//!   echo '{"x": [[[1, 2], [3, 4]]], "kernel": [[[[1]]]]}' | ferrite-kernels conv2d forward
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

mod commands;
mod error;
mod flat;
mod format;
mod payload;

use std::process::ExitCode;

use clap::Parser;
use commands::Cli;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    match commands::run(cli.command) {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}
