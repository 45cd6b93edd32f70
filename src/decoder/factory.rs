//! LDPC decoder factory.
//!
//! This module contains routines to build an LDPC decoder generically over
//! different internal implementations. Such decoders are represented by
//! `Box<dyn LdpcDecoder>`, using the trait [`LdpcDecoder`].
//!
//! A [`DecoderImplementation`] is described by an identifier of the form
//! `[HL]<rule><f32|f64>[:<parameter>]`, such as `Phif64`, `HLMinSumf32` or
//! `NormalizedMinSumf64:0.8`. The optional `HL` prefix selects the horizontal
//! layered schedule instead of the flooding schedule, `<rule>` is the
//! [`CheckNodeRule::stem`] of the check node rule, and the suffix selects the
//! floating point precision. The parameter can only be given for the rules
//! that have one.

use super::{arithmetic::CheckNodeRule, flooding, horizontal_layered, LdpcDecoder};
use crate::graph::TannerGraph;
use enum_iterator::Sequence;
use std::{fmt, str::FromStr, sync::Arc};
use thiserror::Error;

/// Decoder factory error.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// The identifier does not name a decoder implementation.
    #[error("invalid decoder implementation: {0:?}")]
    UnknownImplementation(String),
    /// The parameter of the check node rule is not valid.
    #[error("invalid parameter {parameter:?} for decoder implementation {implementation:?}")]
    InvalidParameter {
        /// Decoder implementation.
        implementation: String,
        /// Parameter.
        parameter: String,
    },
    /// A parameter was given for a check node rule without parameters.
    #[error("decoder implementation {0:?} does not take a parameter")]
    UnexpectedParameter(String),
}

/// Message passing schedule.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Sequence)]
pub enum Schedule {
    /// Flooding schedule (see [`flooding`]).
    Flooding,
    /// Horizontal layered schedule (see [`horizontal_layered`]).
    HorizontalLayered,
}

/// Floating point precision of the decoder arithmetic.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Sequence)]
pub enum Precision {
    /// `f64` arithmetic.
    F64,
    /// `f32` arithmetic.
    F32,
}

impl Schedule {
    fn prefix(&self) -> &'static str {
        match self {
            Schedule::Flooding => "",
            Schedule::HorizontalLayered => "HL",
        }
    }
}

impl Precision {
    fn suffix(&self) -> &'static str {
        match self {
            Precision::F64 => "f64",
            Precision::F32 => "f32",
        }
    }
}

/// LDPC decoder implementation.
///
/// This struct lists the choices that define an LDPC decoder implementation:
/// the message passing schedule, the check node rule and the floating point
/// precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecoderImplementation {
    schedule: Schedule,
    rule: CheckNodeRule,
    precision: Precision,
}

impl DecoderImplementation {
    /// Creates a decoder implementation.
    ///
    /// An error is returned if the parameter of the check node rule is not
    /// valid.
    pub fn new(
        schedule: Schedule,
        rule: CheckNodeRule,
        precision: Precision,
    ) -> Result<DecoderImplementation, Error> {
        let implementation = DecoderImplementation {
            schedule,
            rule,
            precision,
        };
        if rule.validate().is_err() {
            return Err(Error::InvalidParameter {
                implementation: implementation.to_string(),
                parameter: rule.parameter().unwrap_or_default().to_string(),
            });
        }
        Ok(implementation)
    }

    /// Returns all the decoder implementations, with default parameters.
    pub fn all() -> impl Iterator<Item = DecoderImplementation> {
        enum_iterator::all::<Schedule>().flat_map(|schedule| {
            CheckNodeRule::all().into_iter().flat_map(move |rule| {
                enum_iterator::all::<Precision>().map(move |precision| DecoderImplementation {
                    schedule,
                    rule,
                    precision,
                })
            })
        })
    }

    /// Returns the message passing schedule.
    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Returns the check node rule.
    pub fn rule(&self) -> CheckNodeRule {
        self.rule
    }

    /// Returns the floating point precision.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Builds an LDPC decoder.
    ///
    /// Given the Tanner graph of a code, this function builds an LDPC decoder
    /// corresponding to this decoder implementation.
    pub fn build_decoder(&self, graph: Arc<TannerGraph>) -> Box<dyn LdpcDecoder> {
        log::debug!("building {} decoder", self);
        let rule = self.rule;
        match (self.schedule, self.precision) {
            (Schedule::Flooding, Precision::F64) => {
                Box::new(flooding::Decoder::<f64>::new(graph, rule))
            }
            (Schedule::Flooding, Precision::F32) => {
                Box::new(flooding::Decoder::<f32>::new(graph, rule))
            }
            (Schedule::HorizontalLayered, Precision::F64) => {
                Box::new(horizontal_layered::Decoder::<f64>::new(graph, rule))
            }
            (Schedule::HorizontalLayered, Precision::F32) => {
                Box::new(horizontal_layered::Decoder::<f32>::new(graph, rule))
            }
        }
    }
}

impl Default for DecoderImplementation {
    fn default() -> DecoderImplementation {
        DecoderImplementation {
            schedule: Schedule::Flooding,
            rule: CheckNodeRule::Phi,
            precision: Precision::F64,
        }
    }
}

impl FromStr for DecoderImplementation {
    type Err = Error;

    fn from_str(s: &str) -> Result<DecoderImplementation, Error> {
        let s = s.trim();
        let unknown = || Error::UnknownImplementation(s.to_string());
        let (name, parameter) = match s.split_once(':') {
            Some((name, parameter)) => (name, Some(parameter)),
            None => (s, None),
        };
        let (schedule, name) = match name.strip_prefix("HL") {
            Some(name) => (Schedule::HorizontalLayered, name),
            None => (Schedule::Flooding, name),
        };
        let (precision, stem) = if let Some(stem) = name.strip_suffix("f64") {
            (Precision::F64, stem)
        } else if let Some(stem) = name.strip_suffix("f32") {
            (Precision::F32, stem)
        } else {
            return Err(unknown());
        };
        let mut rule = CheckNodeRule::from_stem(stem).ok_or_else(unknown)?;
        if let Some(parameter) = parameter {
            if rule.parameter().is_none() {
                return Err(Error::UnexpectedParameter(s.to_string()));
            }
            let invalid = || Error::InvalidParameter {
                implementation: s.to_string(),
                parameter: parameter.to_string(),
            };
            let value = parameter.trim().parse::<f64>().map_err(|_| invalid())?;
            rule = rule.with_parameter(value).map_err(|_| invalid())?;
        }
        Ok(DecoderImplementation {
            schedule,
            rule,
            precision,
        })
    }
}

impl fmt::Display for DecoderImplementation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.schedule.prefix(),
            self.rule.stem(),
            self.precision.suffix()
        )?;
        match self.rule.parameter() {
            Some(parameter) if !self.rule.has_default_parameter() => write!(f, ":{parameter}"),
            _ => Ok(()),
        }
    }
}
