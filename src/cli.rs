//! `ldpc-codec` CLI application
//!
//! The CLI application is organized in several subcommands. The
//! supported subcommands can be seen by running `ldpc-codec`.
//! See the modules below for examples and more information about
//! how to use each subcommand.
//!
//! Logging is configured with the `RUST_LOG` environment variable.

use clap::Parser;
use std::error::Error;

pub mod decode;
pub mod encode;
pub mod implementations;
pub mod systematic;

/// Trait to run a CLI subcommand
pub trait Run {
    /// Run the CLI subcommand
    fn run(&self) -> Result<(), Box<dyn Error>>;
}

/// CLI arguments.
#[derive(Debug, Parser)]
#[command(author, version, name = "ldpc-codec", about = "LDPC codec")]
pub enum Args {
    /// decode subcommand
    Decode(decode::Args),
    /// encode subcommand
    Encode(encode::Args),
    /// implementations subcommand
    Implementations(implementations::Args),
    /// systematic subcommand
    Systematic(systematic::Args),
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        match self {
            Args::Decode(x) => x.run(),
            Args::Encode(x) => x.run(),
            Args::Implementations(x) => x.run(),
            Args::Systematic(x) => x.run(),
        }
    }
}
