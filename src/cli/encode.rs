//! Encode CLI subcommand.
//!
//! This command can be used to encode using a systematic LDPC code. The input
//! file contains messages as unpacked bits (one byte per bit), and the output
//! file receives the punctured codewords, also as unpacked bits. A trailing
//! partial message in the input is ignored.
//!
//! # Examples
//!
//! ```shell
//! $ ldpc-codec encode --puncturing blocks:1,1,1,1,0 code.alist messages.u8 codewords.u8
//! ```

use crate::{cli::Run, codec::Encoder, puncturing::PuncturingPattern, sparse::SparseMatrix};
use clap::Parser;
use std::{
    error::Error,
    fs::File,
    io::{BufReader, BufWriter, ErrorKind, Read, Write},
    path::PathBuf,
};

/// Encode CLI arguments.
#[derive(Debug, Parser)]
#[command(about = "Performs LDPC encoding")]
pub struct Args {
    /// alist file for the code
    pub alist: PathBuf,
    /// input file (messages as unpacked bits)
    pub input: PathBuf,
    /// output file (punctured codewords as unpacked bits)
    pub output: PathBuf,
    /// Puncturing pattern (formats "3,5,10-19" or "blocks:1,1,1,0")
    #[arg(long)]
    pub puncturing: Option<PuncturingPattern>,
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        let h = SparseMatrix::from_alist(&std::fs::read_to_string(&self.alist)?)?;
        let encoder = Encoder::from_parts(&h, &self.puncturing.clone().unwrap_or_default())?;
        if encoder.message_len() == 0 {
            return Err("the code has no message bits".into());
        }
        let mut input = BufReader::new(File::open(&self.input)?);
        let mut output = BufWriter::new(File::create(&self.output)?);
        let mut message = vec![0; encoder.message_len()];
        let mut codeword = vec![0; encoder.output_len()];
        let mut frames = 0;
        loop {
            match input.read_exact(&mut message[..]) {
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
                ret => ret?,
            };
            encoder.encode_into(&mut codeword, &message)?;
            output.write_all(&codeword)?;
            frames += 1;
        }
        output.flush()?;
        log::info!("encoded {frames} frames");
        Ok(())
    }
}
