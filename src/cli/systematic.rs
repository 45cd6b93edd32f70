//! Systematic CLI subcommand.
//!
//! This command can be used to convert an m x n parity check matrix into one
//! that supports systematic encoding using its first n - m columns. The columns
//! are permuted so that the information positions chosen by the encoder come
//! first, keeping their relative order, followed by the parity positions.

use crate::{cli::Run, sparse::SparseMatrix, systematic::SystematicLayout};
use clap::Parser;
use std::{error::Error, path::PathBuf};

/// Systematic CLI arguments.
#[derive(Debug, Parser)]
#[command(about = "Converts a parity check matrix into systematic form")]
pub struct Args {
    /// alist file for the code
    pub alist: PathBuf,
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        let h = SparseMatrix::from_alist(&std::fs::read_to_string(&self.alist)?)?;
        let layout = SystematicLayout::from_h(&h)?;
        log::debug!("parity positions: {:?}", layout.parity());
        print!("{}", layout.permuted_matrix(&h).alist());
        Ok(())
    }
}
