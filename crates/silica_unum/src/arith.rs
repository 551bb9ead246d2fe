//! Exact unum addition and subtraction with re-normalization.

use crate::environment::UnumEnvironment;
use crate::unum::{exponent_value_to_exponent_size, pack_unum_bits, Unum};
use silica_bits::BitMask;
use std::ops::{Add, Neg, Sub};

impl Unum {
    /// Adds two exact-or-inexact unums of the same environment.
    ///
    /// The result is re-normalized to the minimal exponent and fraction
    /// field widths. Precision lost while aligning the smaller operand
    /// sets the uncertainty bit, and an inexact input makes the result
    /// inexact even when this particular addition loses nothing — a
    /// deliberate approximation of native floating-point rounding-flag
    /// behavior rather than textbook unum semantics.
    ///
    /// # Panics
    ///
    /// Panics if the operands belong to different environments.
    pub fn add_exact(&self, other: &Unum) -> Unum {
        let environment = self.environment();
        assert_eq!(
            environment,
            other.environment(),
            "Unum environment mismatch in addition"
        );

        if let Some(special) = add_special_values(environment, self, other) {
            return special;
        }
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }

        let mut uncertainty = !self.is_exact() || !other.is_exact();

        // Alignment reference: the larger operand's hidden bit lands one
        // position above the widest possible fraction.
        let hidden_position = environment.fraction_size_max() + 1;

        let (bigger, smaller) = if self.exponent_value_with_bias() >= other.exponent_value_with_bias()
        {
            (self, other)
        } else {
            (other, self)
        };
        let exponent_difference =
            bigger.exponent_value_with_bias() - smaller.exponent_value_with_bias();

        let bigger_shift = hidden_position as i32 - bigger.fraction_size() as i32;
        let smaller_shift =
            hidden_position as i32 - smaller.fraction_size() as i32 - exponent_difference;
        if smaller_shift < 0 {
            // Low bits of the smaller operand fall off the right edge.
            uncertainty = true;
        }

        let bigger_aligned = &bigger.fraction_with_hidden_bit() << bigger_shift;
        let smaller_aligned = &smaller.fraction_with_hidden_bit() << smaller_shift;

        let signs_match = bigger.is_positive() == smaller.is_positive();
        let (scratch, result_negative) = if signs_match {
            (&bigger_aligned + &smaller_aligned, !bigger.is_positive())
        } else if bigger_aligned >= smaller_aligned {
            (&bigger_aligned - &smaller_aligned, !bigger.is_positive())
        } else {
            (&smaller_aligned - &bigger_aligned, !smaller.is_positive())
        };

        let leading = scratch.find_leading_one();
        if leading == 0 {
            // Exact cancellation.
            let zero = Unum::zero(environment.clone());
            return if uncertainty {
                zero.with_uncertainty_bit(true)
            } else {
                zero
            };
        }

        let exponent_change = leading as i32 - (hidden_position as i32 + 1);
        let result_exponent_value = bigger.exponent_value_with_bias() + exponent_change;

        encode_normalizing(
            environment,
            result_negative,
            result_exponent_value,
            &scratch,
            leading,
            uncertainty,
        )
    }

    /// Subtracts by negating the right operand and adding.
    pub fn sub_exact(&self, other: &Unum) -> Unum {
        self.add_exact(&other.negate())
    }
}

/// Handles NaN and infinity propagation; `None` means both operands are
/// ordinary numbers.
fn add_special_values(
    environment: &UnumEnvironment,
    left: &Unum,
    right: &Unum,
) -> Option<Unum> {
    let nan = || Unum::from_bits(environment.clone(), environment.quiet_nan());
    if left.is_nan() || right.is_nan() {
        return Some(nan());
    }
    if left.is_positive_infinity() {
        return Some(if right.is_negative_infinity() {
            nan()
        } else {
            left.clone()
        });
    }
    if left.is_negative_infinity() {
        return Some(if right.is_positive_infinity() {
            nan()
        } else {
            left.clone()
        });
    }
    if right.is_positive_infinity() || right.is_negative_infinity() {
        return Some(right.clone());
    }
    None
}

/// Packs a scratch-pad significand into the minimal normalized encoding,
/// falling back to infinity saturation or a subnormal encoding when the
/// exponent leaves the environment's range.
fn encode_normalizing(
    environment: &UnumEnvironment,
    negative: bool,
    exponent_value: i32,
    scratch: &BitMask,
    leading: u32,
    mut uncertainty: bool,
) -> Unum {
    let exponent_size = exponent_value_to_exponent_size(exponent_value);
    if exponent_size > environment.exponent_size_max() {
        if exponent_value > 0 {
            // Overflow: saturate, mirroring the conversion policy.
            let bits = if negative {
                environment.negative_infinity()
            } else {
                environment.positive_infinity()
            };
            return Unum::from_bits(environment.clone(), bits);
        }
        return encode_subnormal(environment, negative, exponent_value, scratch, uncertainty);
    }

    let fraction_size_max = environment.fraction_size_max();
    // Re-elide the hidden bit: the exponent field below is always nonzero
    // on this path.
    let mut fraction = scratch.set_zero(leading - 1);
    let mut fraction_size = leading - 1;
    if fraction_size == 0 {
        fraction_size = 1;
    } else {
        if fraction_size > fraction_size_max {
            let excess = (fraction_size - fraction_size_max) as i32;
            let truncated = &fraction >> excess;
            if &truncated << excess != fraction {
                uncertainty = true;
            }
            fraction = truncated;
            fraction_size = fraction_size_max;
        }
        if fraction.is_all_zero() {
            fraction_size = 1;
        } else {
            let shifted = fraction.shift_to_right_end();
            let trailing_zeros = fraction.find_leading_one() - shifted.find_leading_one();
            fraction = shifted;
            fraction_size -= trailing_zeros;
        }
    }

    let bias = (1 << (exponent_size - 1)) - 1;
    let exponent = BitMask::with_size(&[(exponent_value + bias) as u32], environment.size());
    let bits = pack_unum_bits(
        environment,
        negative,
        &exponent,
        &fraction,
        uncertainty,
        exponent_size,
        fraction_size,
    );
    Unum::from_bits(environment.clone(), bits)
}

/// Encodes a result whose exponent lies below the normalized range: the
/// exponent field is zero, the hidden bit stays in the fraction, and bits
/// shifted out by the deficit set the uncertainty bit.
fn encode_subnormal(
    environment: &UnumEnvironment,
    negative: bool,
    exponent_value: i32,
    scratch: &BitMask,
    mut uncertainty: bool,
) -> Unum {
    let exponent_size = environment.exponent_size_max();
    let fraction_size_max = environment.fraction_size_max();
    let hidden_position = fraction_size_max + 1;
    let bias = (1 << (exponent_size - 1)) - 1;
    let subnormal_exponent = 1 - bias;
    let deficit = subnormal_exponent - exponent_value;

    let shift = hidden_position as i32 - fraction_size_max as i32 + deficit;
    let truncated = scratch >> shift;
    if &truncated << shift != *scratch {
        uncertainty = true;
    }
    if truncated.is_all_zero() {
        // Underflowed entirely: an uncertain zero.
        return Unum::zero(environment.clone()).with_uncertainty_bit(true);
    }

    let mut fraction = truncated;
    let mut fraction_size = fraction_size_max;
    let shifted = fraction.shift_to_right_end();
    let trailing_zeros = fraction.find_leading_one() - shifted.find_leading_one();
    fraction = shifted;
    fraction_size -= trailing_zeros;

    let bits = pack_unum_bits(
        environment,
        negative,
        &BitMask::zeros(environment.size()),
        &fraction,
        uncertainty,
        exponent_size,
        fraction_size,
    );
    Unum::from_bits(environment.clone(), bits)
}

impl Add for &Unum {
    type Output = Unum;

    fn add(self, rhs: Self) -> Unum {
        self.add_exact(rhs)
    }
}

impl Sub for &Unum {
    type Output = Unum;

    fn sub(self, rhs: Self) -> Unum {
        self.sub_exact(rhs)
    }
}

impl Neg for &Unum {
    type Output = Unum;

    fn neg(self) -> Unum {
        self.negate()
    }
}
