//! Decode CLI subcommand.
//!
//! This command decodes frames of LLRs. The input file contains the LLRs of
//! the transmitted bits of each frame as little-endian `f32` or `f64` values,
//! with positive LLRs corresponding to zeros. The output file receives the
//! message bits of each frame, unpacked (one byte per bit). Frames are decoded
//! in parallel. A summary line is printed at the end.
//!
//! # Examples
//!
//! ```shell
//! $ ldpc-codec decode --decoder HLMinSumf32 --max-iter 50 --format f32 \
//!       --puncturing blocks:1,1,1,1,0 code.alist llrs.f32 messages.u8
//! ```

use crate::{
    cli::Run,
    codec::{Decoded, Decoder},
    decoder::{factory::DecoderImplementation, DecodeStatus},
    puncturing::PuncturingPattern,
    sparse::SparseMatrix,
};
use clap::{Parser, ValueEnum};
use rayon::prelude::*;
use std::{error::Error, path::PathBuf};

/// LLR sample format.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, ValueEnum)]
pub enum LlrFormat {
    /// Little-endian `f32`.
    F32,
    /// Little-endian `f64`.
    F64,
}

impl LlrFormat {
    fn sample_size(&self) -> usize {
        match self {
            LlrFormat::F32 => std::mem::size_of::<f32>(),
            LlrFormat::F64 => std::mem::size_of::<f64>(),
        }
    }
}

/// Decode CLI arguments.
#[derive(Debug, Parser)]
#[command(about = "Performs LDPC decoding")]
pub struct Args {
    /// alist file for the code
    pub alist: PathBuf,
    /// input file (LLRs of the transmitted bits)
    pub input: PathBuf,
    /// output file (messages as unpacked bits)
    pub output: PathBuf,
    /// Decoder implementation
    #[arg(long, default_value = "Phif64")]
    pub decoder: DecoderImplementation,
    /// Puncturing pattern (formats "3,5,10-19" or "blocks:1,1,1,0")
    #[arg(long)]
    pub puncturing: Option<PuncturingPattern>,
    /// Maximum number of iterations
    #[arg(long, default_value = "100")]
    pub max_iter: usize,
    /// LLR sample format
    #[arg(long, value_enum, default_value_t = LlrFormat::F32)]
    pub format: LlrFormat,
}

impl Run for Args {
    fn run(&self) -> Result<(), Box<dyn Error>> {
        let h = SparseMatrix::from_alist(&std::fs::read_to_string(&self.alist)?)?;
        let decoder = Decoder::from_parts(
            &h,
            self.decoder,
            &self.puncturing.clone().unwrap_or_default(),
        )?;
        let input = std::fs::read(&self.input)?;
        let frame_size = decoder.input_len() * self.format.sample_size();
        if frame_size == 0 || input.len() % frame_size != 0 {
            return Err(format!(
                "input size {} is not a multiple of the frame size {}",
                input.len(),
                frame_size
            )
            .into());
        }
        let decoded = input
            .par_chunks(frame_size)
            .map(|frame| self.decode_frame(&decoder, frame))
            .collect::<Result<Vec<Decoded>, _>>()?;
        let mut output = Vec::with_capacity(decoded.len() * decoder.message_len());
        for frame in decoded.iter() {
            output.extend_from_slice(&frame.bits);
        }
        std::fs::write(&self.output, output)?;

        let converged = decoded.iter().filter(|d| d.status == DecodeStatus::Converged);
        let num_converged = converged.clone().count();
        let iterations: usize = converged.map(|d| d.iterations).sum();
        println!(
            "frames: {}, converged: {}, failed: {}, average iterations: {:.2}",
            decoded.len(),
            num_converged,
            decoded.len() - num_converged,
            if num_converged > 0 {
                iterations as f64 / num_converged as f64
            } else {
                0.0
            }
        );
        Ok(())
    }
}

impl Args {
    fn decode_frame(&self, decoder: &Decoder, frame: &[u8]) -> Result<Decoded, crate::codec::Error> {
        match self.format {
            LlrFormat::F32 => {
                let llrs = frame
                    .chunks_exact(4)
                    .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                    .collect::<Vec<f32>>();
                decoder.decode_f32(&llrs, self.max_iter)
            }
            LlrFormat::F64 => {
                let llrs = frame
                    .chunks_exact(8)
                    .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
                    .collect::<Vec<f64>>();
                decoder.decode(&llrs, self.max_iter)
            }
        }
    }
}
