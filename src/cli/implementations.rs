//! Implementations CLI subcommand.
//!
//! This command lists the identifiers of all the decoder implementations
//! that can be passed to `ldpc-codec decode --decoder`.

use crate::{cli::Run, decoder::factory::DecoderImplementation};
use clap::Parser;
use std::error::Error;

/// Implementations CLI arguments.
#[derive(Debug, Parser)]
#[command(about = "Lists the decoder implementations")]
pub struct Args {}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        for implementation in DecoderImplementation::all() {
            println!("{implementation}");
        }
        Ok(())
    }
}
