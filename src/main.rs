use clap::Parser;
use ldpc_codec::cli::{Args, Run};
use std::error::Error;

#[termination::display]
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .init();
    Args::parse().run()
}
