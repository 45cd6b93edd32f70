//! LDPC decoder arithmetic.
//!
//! This module contains the check node update rules used by the belief
//! propagation decoders. The rules form the closed set [`CheckNodeRule`], and
//! [`Arithmetic`] applies one of them with a given floating point type. The
//! decoders are generic over the trait [`LlrFloat`], which is implemented for
//! `f32` and `f64`, so they can be monomorphized for each precision.
//!
//! # References
//!
//! Most of the arithmetic rules implemented here are taken from:
//!
//! [1] Jon Hamkins, [Performance of Low-Density Parity-Check Coded Modulation](https://ipnpr.jpl.nasa.gov/progress_report/42-184/184D.pdf),
//! IPN Progress Report 42-184, February 15, 2011.
//!
//! Another good resource is this book:
//!
//! [2] Sarah J. Johnson, Iterative Error Correction: Turbo, Low-Density
//! Parity-Check and Repeat-Accumulate Codes. Cambridge University Press. June
//! 2012.
//!
//! Other references:
//!
//! [3] C. Jones, et al. “Approximate-MIN* Constraint Node Updating for LDPC
//! Code Decoding.” In Proceedings of MILCOM 2003 (Boston, Massachusetts),
//! 1-157-1-162. Piscataway, NJ: IEEE, October 2003.
//!
//! [4] J. Chen, et al. “Reduced-Complexity Decoding of LDPC Codes.” IEEE
//! Transactions on Communications, vol. 53, no. 8, pp. 1288-1299, August 2005.

use num_traits::Float;
use std::{
    cmp::Ordering,
    fmt::Debug,
    iter::{Product, Sum},
};

/// Floating point type used by the decoders.
pub trait LlrFloat: Float + Sum + Product + Debug + Default + Send + Sync + 'static {
    /// Smallest argument of `phi(x)`.
    ///
    /// For `x = 0` the output would be `+inf`, which gives problems when
    /// computing `(+inf) - (+inf)`.
    const PHI_MIN_X: Self;
    /// Clamp applied to `x/2` before computing `tanh(x/2)`, so that the
    /// result is smaller than one and its `atanh` is finite.
    const TANH_CLAMP: Self;
    /// Largest magnitude of the LLRs and messages handled by the decoder.
    ///
    /// Input LLRs (including infinities) and variable node messages are
    /// saturated to this value, and degree-one check nodes send it.
    const MAX_LLR: Self;

    /// Converts an `f64` into this type.
    fn from_f64(x: f64) -> Self;
}

impl LlrFloat for f64 {
    const PHI_MIN_X: f64 = 1e-30;
    // tanh(19) already gives 1.0
    const TANH_CLAMP: f64 = 18.0;
    const MAX_LLR: f64 = 1e100;

    fn from_f64(x: f64) -> f64 {
        x
    }
}

impl LlrFloat for f32 {
    const PHI_MIN_X: f32 = 1e-30;
    // tanh(10) already gives 1.0
    const TANH_CLAMP: f32 = 9.0;
    const MAX_LLR: f32 = 1e20;

    fn from_f64(x: f64) -> f32 {
        x as f32
    }
}

/// Check node update rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CheckNodeRule {
    /// Sum-product using the involution `phi(x) = -log(tanh(x/2))`.
    ///
    /// See (2.33) in page 68 in [2].
    Phi,
    /// Sum-product using the `2 * atanh(\Prod tanh(x/2))` rule.
    ///
    /// See (33) in [1].
    Tanh,
    /// The following approximation to the min* function:
    ///
    /// min*(x,y) approx = sign(xy) * [min(|x|,|y|) - log(1 + exp(-||x|-|y||))].
    ///
    /// See (35) in [1].
    Minstarapprox,
    /// The A-Min*-BP described in [3].
    Aminstar,
    /// Min-sum: the magnitude of each message is the minimum of the other
    /// incoming magnitudes.
    MinSum,
    /// Min-sum with the magnitudes scaled by `alpha`, where `0 < alpha <= 1`.
    ///
    /// See [4].
    NormalizedMinSum {
        /// Scale factor.
        alpha: f64,
    },
    /// Min-sum with the magnitudes reduced by `beta >= 0` and clamped at zero.
    ///
    /// See [4].
    OffsetMinSum {
        /// Offset.
        beta: f64,
    },
}

/// Error returned for an invalid check node rule parameter.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InvalidParameter;

impl CheckNodeRule {
    /// Default scale factor of [`CheckNodeRule::NormalizedMinSum`].
    pub const DEFAULT_ALPHA: f64 = 0.75;
    /// Default offset of [`CheckNodeRule::OffsetMinSum`].
    pub const DEFAULT_BETA: f64 = 0.5;

    /// Returns all the rules, with default parameters.
    pub fn all() -> [CheckNodeRule; 7] {
        [
            CheckNodeRule::Phi,
            CheckNodeRule::Tanh,
            CheckNodeRule::Minstarapprox,
            CheckNodeRule::Aminstar,
            CheckNodeRule::MinSum,
            CheckNodeRule::NormalizedMinSum {
                alpha: Self::DEFAULT_ALPHA,
            },
            CheckNodeRule::OffsetMinSum {
                beta: Self::DEFAULT_BETA,
            },
        ]
    }

    /// Returns the name of the rule used in decoder identifiers.
    pub fn stem(&self) -> &'static str {
        match self {
            CheckNodeRule::Phi => "Phi",
            CheckNodeRule::Tanh => "Tanh",
            CheckNodeRule::Minstarapprox => "Minstarapprox",
            CheckNodeRule::Aminstar => "Aminstar",
            CheckNodeRule::MinSum => "MinSum",
            CheckNodeRule::NormalizedMinSum { .. } => "NormalizedMinSum",
            CheckNodeRule::OffsetMinSum { .. } => "OffsetMinSum",
        }
    }

    /// Returns the rule with a given stem and default parameters.
    pub fn from_stem(stem: &str) -> Option<CheckNodeRule> {
        CheckNodeRule::all().into_iter().find(|r| r.stem() == stem)
    }

    /// Returns the parameter of the rule, if it has one.
    pub fn parameter(&self) -> Option<f64> {
        match *self {
            CheckNodeRule::NormalizedMinSum { alpha } => Some(alpha),
            CheckNodeRule::OffsetMinSum { beta } => Some(beta),
            _ => None,
        }
    }

    /// Returns `true` if the parameter of the rule has its default value.
    pub fn has_default_parameter(&self) -> bool {
        self.parameter() == CheckNodeRule::from_stem(self.stem()).and_then(|r| r.parameter())
    }

    /// Replaces the parameter of the rule.
    ///
    /// Returns an error if the rule does not have a parameter or if the value
    /// is outside the valid range.
    pub fn with_parameter(self, value: f64) -> Result<CheckNodeRule, InvalidParameter> {
        let rule = match self {
            CheckNodeRule::NormalizedMinSum { .. } => CheckNodeRule::NormalizedMinSum { alpha: value },
            CheckNodeRule::OffsetMinSum { .. } => CheckNodeRule::OffsetMinSum { beta: value },
            _ => return Err(InvalidParameter),
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Checks that the parameter of the rule is in its valid range.
    pub fn validate(&self) -> Result<(), InvalidParameter> {
        let valid = match *self {
            CheckNodeRule::NormalizedMinSum { alpha } => alpha > 0.0 && alpha <= 1.0,
            CheckNodeRule::OffsetMinSum { beta } => beta.is_finite() && beta >= 0.0,
            _ => true,
        };
        if valid {
            Ok(())
        } else {
            Err(InvalidParameter)
        }
    }
}

/// LDPC decoder arithmetic.
///
/// Applies a [`CheckNodeRule`] using the floating point type `F`, and
/// implements the rest of the arithmetic of the decoder (input quantization,
/// variable node saturation and hard decisions).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arithmetic<F> {
    rule: CheckNodeRule,
    parameter: F,
}

fn signed<F: LlrFloat>(magnitude: F, negative: bool) -> F {
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

fn phi<F: LlrFloat>(x: F) -> F {
    let x = x.max(F::PHI_MIN_X);
    -((F::from_f64(0.5) * x).tanh().ln())
}

// Exact min* of two non-negative magnitudes.
fn minstar<F: LlrFloat>(x: F, y: F) -> F {
    x.min(y) - (-(x - y).abs()).exp().ln_1p() + (-(x + y)).exp().ln_1p()
}

impl<F: LlrFloat> Arithmetic<F> {
    /// Creates the arithmetic for a check node rule.
    ///
    /// # Panics
    ///
    /// This function panics if the parameter of the rule is not valid (see
    /// [`CheckNodeRule::validate`]).
    pub fn new(rule: CheckNodeRule) -> Arithmetic<F> {
        assert!(rule.validate().is_ok(), "invalid check node rule parameter");
        Arithmetic {
            rule,
            parameter: F::from_f64(rule.parameter().unwrap_or(0.0)),
        }
    }

    /// Returns the check node rule.
    pub fn rule(&self) -> CheckNodeRule {
        self.rule
    }

    /// Quantization function for input LLRs.
    ///
    /// NaNs are replaced by zero (an erasure), and the result is saturated to
    /// `±MAX_LLR`.
    pub fn input_llr_quantize(&self, llr: f64) -> F {
        if llr.is_nan() {
            return F::zero();
        }
        Self::saturate(F::from_f64(llr))
    }

    /// Saturates a value to `±MAX_LLR`.
    pub fn saturate(x: F) -> F {
        x.max(-F::MAX_LLR).min(F::MAX_LLR)
    }

    /// Hard decision on LLRs.
    ///
    /// Returns `true` (a one) for non-positive LLRs.
    pub fn llr_hard_decision(llr: F) -> bool {
        llr <= F::zero()
    }

    /// Computes the messages sent by a check node.
    ///
    /// `var_messages` are the messages arriving to the check node, and the
    /// message for the variable of the `j`-th incoming message is written to
    /// `check_messages[j]`. The `scratch` buffer must be at least as long as
    /// `var_messages`.
    pub fn check_messages(&self, var_messages: &[F], check_messages: &mut [F], scratch: &mut [F]) {
        debug_assert_eq!(var_messages.len(), check_messages.len());
        match var_messages.len() {
            0 => return,
            1 => {
                // A check node connected to a single variable forces it to zero
                check_messages[0] = F::MAX_LLR;
                return;
            }
            _ => (),
        }
        match self.rule {
            CheckNodeRule::Phi => Self::phi_rule(var_messages, check_messages, scratch),
            CheckNodeRule::Tanh => Self::tanh_rule(var_messages, check_messages, scratch),
            CheckNodeRule::Minstarapprox => Self::minstarapprox_rule(var_messages, check_messages),
            CheckNodeRule::Aminstar => Self::aminstar_rule(var_messages, check_messages),
            CheckNodeRule::MinSum => self.min_sum_rule(var_messages, check_messages, |m, _| m),
            CheckNodeRule::NormalizedMinSum { .. } => {
                self.min_sum_rule(var_messages, check_messages, |m, alpha| m * alpha)
            }
            CheckNodeRule::OffsetMinSum { .. } => {
                self.min_sum_rule(var_messages, check_messages, |m, beta| {
                    (m - beta).max(F::zero())
                })
            }
        }
    }

    fn phi_rule(var_messages: &[F], check_messages: &mut [F], phis: &mut [F]) {
        // Compute combination of all variable messages
        let mut negative = false;
        let mut sum = F::zero();
        for (&x, phi_x) in var_messages.iter().zip(phis.iter_mut()) {
            *phi_x = phi(x.abs());
            sum = sum + *phi_x;
            negative ^= x < F::zero();
        }
        // Exclude the contribution of each variable to generate message for
        // that variable
        for ((&x, &phi_x), out) in var_messages.iter().zip(phis.iter()).zip(check_messages) {
            *out = signed(phi(sum - phi_x), negative ^ (x < F::zero()));
        }
    }

    fn tanh_rule(var_messages: &[F], check_messages: &mut [F], tanhs: &mut [F]) {
        let half = F::from_f64(0.5);
        let two = F::from_f64(2.0);
        let tanhs = &mut tanhs[..var_messages.len()];
        for (&x, t) in var_messages.iter().zip(tanhs.iter_mut()) {
            *t = (half * x).max(-F::TANH_CLAMP).min(F::TANH_CLAMP).tanh();
        }
        for (j, out) in check_messages.iter_mut().enumerate() {
            // product of all the tanh's except the j-th
            let product = tanhs
                .iter()
                .enumerate()
                .filter_map(|(k, &t)| if k != j { Some(t) } else { None })
                .product::<F>();
            *out = two * product.atanh();
        }
    }

    fn minstarapprox_rule(var_messages: &[F], check_messages: &mut [F]) {
        for (j, out) in check_messages.iter_mut().enumerate() {
            let mut negative = false;
            let mut minstar = None;
            for (_, &x) in var_messages.iter().enumerate().filter(|&(k, _)| k != j) {
                negative ^= x < F::zero();
                let x = x.abs();
                minstar = Some(match minstar {
                    None => x,
                    // We clamp the output to 0 from below because we are
                    // doing min* of positive numbers, but since we've thrown
                    // away a positive term in the approximation to min*, the
                    // approximation could come out negative.
                    Some(y) => (x.min(y) - (-(x - y).abs()).exp().ln_1p()).max(F::zero()),
                });
            }
            *out = signed(minstar.unwrap_or(F::MAX_LLR), negative);
        }
    }

    fn aminstar_rule(var_messages: &[F], check_messages: &mut [F]) {
        let Some((argmin, &xmin)) = var_messages
            .iter()
            .enumerate()
            .min_by(|(_, x), (_, y)| x.abs().partial_cmp(&y.abs()).unwrap_or(Ordering::Equal))
        else {
            return;
        };
        let mut negative = false;
        let mut delta = None;
        for (j, &x) in var_messages.iter().enumerate() {
            negative ^= x < F::zero();
            if j != argmin {
                let x = x.abs();
                delta = Some(match delta {
                    None => x,
                    Some(y) => minstar(x, y),
                });
            }
        }
        let delta = delta.unwrap_or(F::MAX_LLR);
        // The least reliable variable gets the exact min* of the others, and
        // all the others share the min* of all the inputs.
        check_messages[argmin] = signed(delta, negative ^ (xmin < F::zero()));
        let delta = minstar(delta, xmin.abs());
        for ((j, &x), out) in var_messages.iter().enumerate().zip(check_messages.iter_mut()) {
            if j != argmin {
                *out = signed(delta, negative ^ (x < F::zero()));
            }
        }
    }

    fn min_sum_rule<G>(&self, var_messages: &[F], check_messages: &mut [F], correction: G)
    where
        G: Fn(F, F) -> F,
    {
        let mut min1 = F::infinity();
        let mut min2 = F::infinity();
        let mut argmin = 0;
        let mut negative = false;
        for (j, &x) in var_messages.iter().enumerate() {
            negative ^= x < F::zero();
            let x = x.abs();
            if x < min1 {
                min2 = min1;
                min1 = x;
                argmin = j;
            } else if x < min2 {
                min2 = x;
            }
        }
        let min1 = correction(min1, self.parameter);
        let min2 = correction(min2, self.parameter);
        for ((j, &x), out) in var_messages.iter().enumerate().zip(check_messages.iter_mut()) {
            let magnitude = if j == argmin { min2 } else { min1 };
            *out = signed(magnitude, negative ^ (x < F::zero()));
        }
    }
}
