//! Code puncturing.
//!
//! Puncturing removes some of the codeword bits before transmission, raising
//! the rate of the code. The receiver "depunctures" the demodulated LLRs by
//! inserting neutral LLRs (zeros, which indicate erasures) at the punctured
//! positions before decoding.
//!
//! A [`PuncturingPattern`] describes which positions are punctured, and a
//! [`Puncturer`] is a pattern that has been validated against a codeword
//! length.

use ndarray::{Array1, ArrayBase, Data, Ix1};
use num_traits::Zero;
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Puncturer error.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// A punctured position is outside the codeword.
    #[error("punctured position {position} is out of range for codeword length {codeword_len}")]
    PositionOutOfRange {
        /// Punctured position.
        position: usize,
        /// Codeword length.
        codeword_len: usize,
    },
    /// A position appears more than once in the pattern.
    #[error("punctured position {0} appears more than once")]
    DuplicatePosition(usize),
    /// The pattern punctures more positions than the codeword has.
    #[error("puncturing pattern has {punctured} positions but the codeword length is {codeword_len}")]
    PatternTooLong {
        /// Number of punctured positions.
        punctured: usize,
        /// Codeword length.
        codeword_len: usize,
    },
    /// The codeword size is not divisible by the block mask length.
    #[error("codeword size {codeword_len} not divisible by puncturing pattern length {pattern_len}")]
    CodewordSizeNotDivisible {
        /// Codeword length.
        codeword_len: usize,
        /// Block mask length.
        pattern_len: usize,
    },
    /// The block mask is empty.
    #[error("the puncturing block mask is empty")]
    EmptyBlockMask,
    /// The input has the wrong length.
    #[error("input length {got} does not match the expected length {expected}")]
    LengthMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },
    /// The textual pattern contains an invalid token.
    #[error("invalid token in puncturing pattern: {0:?}")]
    InvalidToken(String),
}

/// Puncturing pattern.
///
/// The textual form of the pattern, accepted by [`FromStr`] and produced by
/// [`Display`](std::fmt::Display), is one of the following:
///
/// - an empty string (or `none`) for no puncturing;
/// - a comma separated list of punctured positions, in which inclusive ranges
///   can be used, such as `3,5,10-19`;
/// - `blocks:` followed by a comma separated block mask, such as
///   `blocks:1,1,1,0`. The codeword is divided into as many blocks of equal
///   size as entries the mask has, and the blocks marked with `0` are
///   punctured. In this example, the last 1/4 of the codeword is punctured.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum PuncturingPattern {
    /// No puncturing.
    #[default]
    None,
    /// List of punctured positions.
    Positions(Vec<usize>),
    /// Block mask. `true` blocks are transmitted and `false` blocks are
    /// punctured.
    Blocks(Box<[bool]>),
}

impl FromStr for PuncturingPattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<PuncturingPattern, Error> {
        let s = s.trim();
        if s.is_empty() || s == "none" {
            return Ok(PuncturingPattern::None);
        }
        if let Some(mask) = s.strip_prefix("blocks:") {
            let mask = mask
                .split(',')
                .map(|token| match token.trim() {
                    "1" => Ok(true),
                    "0" => Ok(false),
                    "" if mask.trim().is_empty() => Err(Error::EmptyBlockMask),
                    token => Err(Error::InvalidToken(token.to_string())),
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(PuncturingPattern::Blocks(mask.into_boxed_slice()));
        }
        let mut positions = Vec::new();
        for token in s.split(',').map(str::trim) {
            let invalid = || Error::InvalidToken(token.to_string());
            match token.split_once('-') {
                Some((start, end)) => {
                    let start = start.trim().parse::<usize>().map_err(|_| invalid())?;
                    let end = end.trim().parse::<usize>().map_err(|_| invalid())?;
                    if start > end {
                        return Err(invalid());
                    }
                    positions.extend(start..=end);
                }
                None => positions.push(token.parse().map_err(|_| invalid())?),
            }
        }
        Ok(PuncturingPattern::Positions(positions))
    }
}

impl fmt::Display for PuncturingPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PuncturingPattern::None => Ok(()),
            PuncturingPattern::Positions(positions) => {
                for (j, p) in positions.iter().enumerate() {
                    if j != 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{p}")?;
                }
                Ok(())
            }
            PuncturingPattern::Blocks(mask) => {
                write!(f, "blocks:")?;
                for (j, &b) in mask.iter().enumerate() {
                    if j != 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", u8::from(b))?;
                }
                Ok(())
            }
        }
    }
}

/// Puncturer.
///
/// This struct is used to perform puncturing on codewords to be transmitted,
/// and "depuncturing" on demodulated LLRs.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Puncturer {
    // positions of the codeword that are transmitted, in increasing order
    transmitted: Box<[usize]>,
    punctured: Box<[bool]>,
}

impl Puncturer {
    /// Creates a new puncturer for codewords of length `codeword_len`.
    ///
    /// An error is returned if the pattern is not valid for this length.
    pub fn new(pattern: &PuncturingPattern, codeword_len: usize) -> Result<Puncturer, Error> {
        let mut punctured = vec![false; codeword_len];
        match pattern {
            PuncturingPattern::None => (),
            PuncturingPattern::Positions(positions) => {
                if positions.len() > codeword_len {
                    return Err(Error::PatternTooLong {
                        punctured: positions.len(),
                        codeword_len,
                    });
                }
                for &position in positions {
                    let Some(p) = punctured.get_mut(position) else {
                        return Err(Error::PositionOutOfRange {
                            position,
                            codeword_len,
                        });
                    };
                    if *p {
                        return Err(Error::DuplicatePosition(position));
                    }
                    *p = true;
                }
            }
            PuncturingPattern::Blocks(mask) => {
                if mask.is_empty() {
                    return Err(Error::EmptyBlockMask);
                }
                if codeword_len % mask.len() != 0 {
                    return Err(Error::CodewordSizeNotDivisible {
                        codeword_len,
                        pattern_len: mask.len(),
                    });
                }
                let block_size = codeword_len / mask.len();
                if block_size > 0 {
                    for (block, &keep) in punctured.chunks_mut(block_size).zip(mask.iter()) {
                        block.fill(!keep);
                    }
                }
            }
        }
        let transmitted = punctured
            .iter()
            .enumerate()
            .filter_map(|(j, &p)| if p { None } else { Some(j) })
            .collect::<Vec<_>>();
        Ok(Puncturer {
            transmitted: transmitted.into_boxed_slice(),
            punctured: punctured.into_boxed_slice(),
        })
    }

    /// Returns the length of the codeword before puncturing.
    pub fn codeword_len(&self) -> usize {
        self.punctured.len()
    }

    /// Returns the length of the codeword after puncturing.
    pub fn punctured_len(&self) -> usize {
        self.transmitted.len()
    }

    /// Returns `true` if a codeword position is punctured.
    ///
    /// # Panics
    ///
    /// This function panics if the position is not smaller than the codeword
    /// length.
    pub fn is_punctured(&self, position: usize) -> bool {
        self.punctured[position]
    }

    fn check_len(&self, expected: usize, got: usize) -> Result<(), Error> {
        if expected != got {
            return Err(Error::LengthMismatch { expected, got });
        }
        Ok(())
    }

    /// Puncture a codeword.
    ///
    /// Given a codeword, returns the punctured codeword, which keeps the
    /// order of the transmitted bits. An error is returned if the length of
    /// the codeword is wrong.
    pub fn puncture<S, A>(&self, codeword: &ArrayBase<S, Ix1>) -> Result<Array1<A>, Error>
    where
        S: Data<Elem = A>,
        A: Clone,
    {
        self.check_len(self.codeword_len(), codeword.len())?;
        Ok(self
            .transmitted
            .iter()
            .map(|&j| codeword[j].clone())
            .collect())
    }

    /// Puncture a codeword given as a slice.
    ///
    /// This behaves as [`Puncturer::puncture`].
    pub fn puncture_slice<T: Copy>(&self, codeword: &[T]) -> Result<Vec<T>, Error> {
        self.check_len(self.codeword_len(), codeword.len())?;
        Ok(self.transmitted.iter().map(|&j| codeword[j]).collect())
    }

    /// Depuncture LLRs.
    ///
    /// This function depunctures demodulated LLRs by inserting zeros (which
    /// indicate erasures) in the positions of the codeword that were
    /// punctured. The input length must correspond to the punctured codeword,
    /// while the output length is equal to the codeword length.
    pub fn depuncture<T: Zero + Copy>(&self, llrs: &[T]) -> Result<Vec<T>, Error> {
        let mut output = vec![T::zero(); self.codeword_len()];
        self.depuncture_into(&mut output, llrs)?;
        Ok(output)
    }

    /// Depuncture LLRs into an output buffer.
    ///
    /// The output must have the codeword length. All of its elements are
    /// written.
    pub fn depuncture_into<T: Zero + Copy>(&self, output: &mut [T], llrs: &[T]) -> Result<(), Error> {
        self.check_len(self.punctured_len(), llrs.len())?;
        self.check_len(self.codeword_len(), output.len())?;
        output.fill(T::zero());
        for (&j, &llr) in self.transmitted.iter().zip(llrs.iter()) {
            output[j] = llr;
        }
        Ok(())
    }

    /// Returns the rate of the puncturer.
    ///
    /// The rate is defined as the length of the original codeword divided by
    /// the length of the punctured codeword, and so it is always greater or
    /// equal to one.
    pub fn rate(&self) -> f64 {
        self.codeword_len() as f64 / self.punctured_len() as f64
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::array;

    #[test]
    fn block_puncturing() {
        let pattern = "blocks:1,1,0,1,0".parse().unwrap();
        let puncturer = Puncturer::new(&pattern, 10).unwrap();
        let codeword = array![0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        let punctured = puncturer.puncture(&codeword).unwrap();
        let expected = array![0, 1, 2, 3, 6, 7];
        assert_eq!(&punctured, &expected);
        let llrs = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let llrs_out = puncturer.depuncture(&llrs).unwrap();
        let expected = [1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 5.0, 6.0, 0.0, 0.0];
        assert_eq!(&llrs_out, &expected);
        assert!((puncturer.rate() - 10.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn position_puncturing() {
        let pattern: PuncturingPattern = "1, 4-6".parse().unwrap();
        assert_eq!(pattern, PuncturingPattern::Positions(vec![1, 4, 5, 6]));
        let puncturer = Puncturer::new(&pattern, 8).unwrap();
        assert_eq!(puncturer.codeword_len(), 8);
        assert_eq!(puncturer.punctured_len(), 4);
        assert!(puncturer.is_punctured(5));
        assert!(!puncturer.is_punctured(7));
        let punctured = puncturer.puncture_slice(&[10u8, 11, 12, 13, 14, 15, 16, 17]);
        assert_eq!(punctured, Ok(vec![10, 12, 13, 17]));
        let llrs = puncturer.depuncture(&[1.5f32, -2.0, 3.0, -4.0]).unwrap();
        assert_eq!(llrs, vec![1.5, 0.0, -2.0, 3.0, 0.0, 0.0, 0.0, -4.0]);
    }

    #[test]
    fn no_puncturing() {
        let pattern: PuncturingPattern = "".parse().unwrap();
        assert_eq!(pattern, PuncturingPattern::None);
        let puncturer = Puncturer::new(&pattern, 3).unwrap();
        assert_eq!(puncturer.puncture_slice(&[1, 2, 3]), Ok(vec![1, 2, 3]));
        assert_eq!(puncturer.rate(), 1.0);
    }

    #[test]
    fn invalid_patterns() {
        let positions = |p: &[usize]| PuncturingPattern::Positions(p.to_vec());
        assert_eq!(
            Puncturer::new(&positions(&[1, 8]), 8),
            Err(Error::PositionOutOfRange {
                position: 8,
                codeword_len: 8
            })
        );
        assert_eq!(
            Puncturer::new(&positions(&[2, 3, 2]), 8),
            Err(Error::DuplicatePosition(2))
        );
        assert_eq!(
            Puncturer::new(&positions(&[0, 1, 2]), 2),
            Err(Error::PatternTooLong {
                punctured: 3,
                codeword_len: 2
            })
        );
        assert_eq!(
            Puncturer::new(&"blocks:1,0,1".parse().unwrap(), 8),
            Err(Error::CodewordSizeNotDivisible {
                codeword_len: 8,
                pattern_len: 3
            })
        );
        assert_eq!(
            Puncturer::new(&PuncturingPattern::Blocks(Box::new([])), 8),
            Err(Error::EmptyBlockMask)
        );
        assert_eq!(
            "blocks:".parse::<PuncturingPattern>(),
            Err(Error::EmptyBlockMask)
        );
        assert_eq!(
            "blocks:1,2".parse::<PuncturingPattern>(),
            Err(Error::InvalidToken("2".to_string()))
        );
        assert_eq!(
            "5-3".parse::<PuncturingPattern>(),
            Err(Error::InvalidToken("5-3".to_string()))
        );
        assert_eq!(
            "1,x".parse::<PuncturingPattern>(),
            Err(Error::InvalidToken("x".to_string()))
        );
    }

    #[test]
    fn length_mismatch() {
        let puncturer = Puncturer::new(&"0".parse().unwrap(), 4).unwrap();
        assert_eq!(
            puncturer.puncture_slice(&[1, 2, 3]),
            Err(Error::LengthMismatch {
                expected: 4,
                got: 3
            })
        );
        assert_eq!(
            puncturer.depuncture(&[1.0, 2.0]),
            Err(Error::LengthMismatch {
                expected: 3,
                got: 2
            })
        );
    }

    #[test]
    fn display() {
        for s in ["", "3,5,10,11", "blocks:1,1,1,0"] {
            let pattern: PuncturingPattern = s.parse().unwrap();
            assert_eq!(pattern.to_string(), s);
        }
    }
}
