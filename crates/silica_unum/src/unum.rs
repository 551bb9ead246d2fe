//! The packed unum value type: construction, field access, conversions.

use crate::environment::UnumEnvironment;
use serde::{Deserialize, Serialize};
use silica_bits::BitMask;

/// A self-describing tagged floating-point-like value.
///
/// The bit layout, low to high, is: fraction-size field, exponent-size
/// field, uncertainty bit, fraction, exponent, sign bit. The two size
/// fields store `field width - 1`, so both recovered widths are always at
/// least one. The exponent and fraction fields are variable width, which
/// makes the sign bit position value dependent.
///
/// `Unum` is an immutable value type: field updates and arithmetic return
/// new values. Numeric edge cases never panic — they saturate or set the
/// uncertainty bit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unum {
    environment: UnumEnvironment,
    bits: BitMask,
}

/// Returns the smallest exponent field width whose biased encoding can
/// represent `value` as a normalized (nonzero-field) exponent.
pub(crate) fn exponent_value_to_exponent_size(value: i32) -> u32 {
    let value = i64::from(value);
    let mut size = 1u32;
    if value > 0 {
        while value > 1i64 << (size - 1) {
            size += 1;
        }
    } else {
        while -value > (1i64 << (size - 1)) - 2 {
            size += 1;
        }
    }
    size
}

/// Packs the unum fields into a zero-initialized environment-sized mask.
///
/// This is the single canonical packer; the layout it produces is the wire
/// format. `exponent` and `fraction` must fit their declared field widths.
pub(crate) fn pack_unum_bits(
    environment: &UnumEnvironment,
    sign: bool,
    exponent: &BitMask,
    fraction: &BitMask,
    uncertainty: bool,
    exponent_size: u32,
    fraction_size: u32,
) -> BitMask {
    assert!(
        (1..=environment.exponent_size_max()).contains(&exponent_size),
        "exponent size {exponent_size} outside the environment range"
    );
    assert!(
        (1..=environment.fraction_size_max()).contains(&fraction_size),
        "fraction size {fraction_size} outside the environment range"
    );
    assert!(
        exponent.find_leading_one() <= exponent_size,
        "exponent does not fit its declared field width"
    );
    assert!(
        fraction.find_leading_one() <= fraction_size,
        "fraction does not fit its declared field width"
    );

    let size = environment.size();
    let tag = environment.tag_size();
    let exponent = BitMask::with_size(exponent.segments(), size);
    let fraction = BitMask::with_size(fraction.segments(), size);

    let mut bits = BitMask::with_size(&[fraction_size - 1], size);
    bits = &bits
        | &(&BitMask::with_size(&[exponent_size - 1], size)
            << environment.fraction_size_size() as i32);
    if uncertainty {
        bits = bits.set_one(tag - 1);
    }
    bits = &bits | &(&fraction << tag as i32);
    bits = &bits | &(&exponent << (tag + fraction_size) as i32);
    if sign {
        bits = bits.set_one(tag + fraction_size + exponent_size);
    }
    bits
}

impl Unum {
    /// The exact zero of the given environment (all bits clear).
    pub fn zero(environment: UnumEnvironment) -> Self {
        let bits = environment.empty_bits();
        Self { environment, bits }
    }

    /// Wraps an existing environment-sized bit pattern.
    ///
    /// # Panics
    ///
    /// Panics if the mask width does not match the environment width.
    pub fn from_bits(environment: UnumEnvironment, bits: BitMask) -> Self {
        assert_eq!(
            bits.size(),
            environment.size(),
            "bit pattern width does not match the environment width"
        );
        Self { environment, bits }
    }

    /// Packs explicit field values into a unum.
    ///
    /// This is the canonical packer: the field order it produces (fraction
    /// size, exponent size, uncertainty bit, fraction, exponent, sign) is
    /// the wire format.
    ///
    /// # Panics
    ///
    /// Panics if a field does not fit its declared width or a declared
    /// width leaves the environment's range.
    pub fn from_fields(
        environment: UnumEnvironment,
        sign: bool,
        exponent: &BitMask,
        fraction: &BitMask,
        uncertainty: bool,
        exponent_size: u32,
        fraction_size: u32,
    ) -> Self {
        let bits = pack_unum_bits(
            &environment,
            sign,
            exponent,
            fraction,
            uncertainty,
            exponent_size,
            fraction_size,
        );
        Self { environment, bits }
    }

    /// Constructs the exact unum of an unsigned integer.
    pub fn from_u32(environment: UnumEnvironment, value: u32) -> Self {
        Self::from_words(environment, &[value])
    }

    /// Constructs the exact unum of a signed integer by encoding its
    /// absolute value and negating.
    pub fn from_i32(environment: UnumEnvironment, value: i32) -> Self {
        let magnitude = Self::from_words(environment, &[value.unsigned_abs()]);
        if value < 0 {
            magnitude.negate()
        } else {
            magnitude
        }
    }

    /// Constructs the exact unum of a multi-word unsigned integer, least
    /// significant word first.
    ///
    /// A value whose integer width exceeds the environment's largest
    /// normalized magnitude saturates to positive infinity; a fraction
    /// wider than the environment's maximum loses its low bits and sets
    /// the uncertainty bit.
    pub fn from_words(environment: UnumEnvironment, words: &[u32]) -> Self {
        let value = BitMask::from_segments(words);
        let leading = value.find_leading_one();
        if leading == 0 {
            return Self::zero(environment);
        }

        let exponent_value = leading as i32 - 1;
        let exponent_size = exponent_value_to_exponent_size(exponent_value);
        if exponent_size > environment.exponent_size_max() {
            let bits = environment.positive_infinity();
            return Self { environment, bits };
        }

        let mut uncertainty = false;
        let mut fraction = value.set_zero(leading - 1);
        let mut fraction_size = leading - 1;
        let fraction_size_max = environment.fraction_size_max();
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
            &environment,
            false,
            &exponent,
            &fraction,
            uncertainty,
            exponent_size,
            fraction_size,
        );
        Self { environment, bits }
    }

    /// The environment this value belongs to.
    pub fn environment(&self) -> &UnumEnvironment {
        &self.environment
    }

    /// The packed bit pattern.
    pub fn bits(&self) -> &BitMask {
        &self.bits
    }

    /// The fraction field width recovered from the tag; always at least 1.
    pub fn fraction_size(&self) -> u32 {
        (&self.bits & &self.environment.fraction_size_mask()).get_lowest_32_bits() + 1
    }

    /// The exponent field width recovered from the tag; always at least 1.
    pub fn exponent_size(&self) -> u32 {
        (&(&self.bits & &self.environment.exponent_size_mask())
            >> self.environment.fraction_size_size() as i32)
            .get_lowest_32_bits()
            + 1
    }

    /// Whether the uncertainty bit is set.
    pub fn uncertainty_bit(&self) -> bool {
        !(&self.bits & &self.environment.uncertainty_bit_mask()).is_all_zero()
    }

    /// An exact unum has its uncertainty bit clear.
    pub fn is_exact(&self) -> bool {
        !self.uncertainty_bit()
    }

    /// The fraction field, right aligned, environment sized.
    pub fn fraction(&self) -> BitMask {
        let mask = self
            .environment
            .field_mask(self.fraction_size(), self.environment.tag_size());
        &(&self.bits & &mask) >> self.environment.tag_size() as i32
    }

    /// The biased exponent field, right aligned, environment sized.
    pub fn exponent(&self) -> BitMask {
        let offset = self.environment.tag_size() + self.fraction_size();
        let mask = self.environment.field_mask(self.exponent_size(), offset);
        &(&self.bits & &mask) >> offset as i32
    }

    /// The bit index of the sign bit, which depends on the field widths.
    pub fn sign_bit_index(&self) -> u32 {
        self.environment.tag_size() + self.fraction_size() + self.exponent_size()
    }

    /// Whether the sign bit is clear.
    pub fn is_positive(&self) -> bool {
        !self.bits.bit(self.sign_bit_index())
    }

    /// The hidden bit is 1 exactly when the exponent field is nonzero
    /// (normalized); a zero exponent field marks a subnormal with no
    /// hidden bit, mirroring IEEE denormal handling.
    pub fn hidden_bit_is_one(&self) -> bool {
        !self.exponent().is_all_zero()
    }

    /// The fraction with the hidden bit restored above it when normalized.
    pub fn fraction_with_hidden_bit(&self) -> BitMask {
        let fraction = self.fraction();
        if self.hidden_bit_is_one() {
            fraction.set_one(self.fraction_size())
        } else {
            fraction
        }
    }

    /// The exponent bias for the current exponent field width.
    pub fn bias(&self) -> i32 {
        (1 << (self.exponent_size() - 1)) - 1
    }

    /// The unbiased exponent value, adjusted by one for subnormals.
    pub fn exponent_value_with_bias(&self) -> i32 {
        let adjustment = if self.hidden_bit_is_one() { 0 } else { 1 };
        self.exponent().get_lowest_32_bits() as i32 - self.bias() + adjustment
    }

    /// Zero has the uncertainty bit, fraction field, and exponent field
    /// all clear, whatever the sign bit says.
    pub fn is_zero(&self) -> bool {
        !self.uncertainty_bit() && self.fraction().is_all_zero() && self.exponent().is_all_zero()
    }

    /// Whether this is either NaN pattern.
    pub fn is_nan(&self) -> bool {
        self.bits == self.environment.quiet_nan() || self.bits == self.environment.signaling_nan()
    }

    /// Whether this is the positive infinity pattern.
    pub fn is_positive_infinity(&self) -> bool {
        self.bits == self.environment.positive_infinity()
    }

    /// Whether this is the negative infinity pattern.
    pub fn is_negative_infinity(&self) -> bool {
        self.bits == self.environment.negative_infinity()
    }

    /// Returns a copy with the sign bit set to the given value.
    pub fn with_sign_bit(&self, sign: bool) -> Self {
        let index = self.sign_bit_index();
        let bits = if sign {
            self.bits.set_one(index)
        } else {
            self.bits.set_zero(index)
        };
        Self {
            environment: self.environment.clone(),
            bits,
        }
    }

    /// Returns a copy with the uncertainty bit set to the given value.
    pub fn with_uncertainty_bit(&self, uncertainty: bool) -> Self {
        let index = self.environment.tag_size() - 1;
        let bits = if uncertainty {
            self.bits.set_one(index)
        } else {
            self.bits.set_zero(index)
        };
        Self {
            environment: self.environment.clone(),
            bits,
        }
    }

    /// Returns the value with the sign bit flipped.
    pub fn negate(&self) -> Self {
        self.with_sign_bit(self.is_positive())
    }

    /// The significand widened enough to shift without clipping.
    fn wide_significand(&self) -> BitMask {
        let width = self.environment.size().max(64);
        BitMask::with_size(self.fraction_with_hidden_bit().segments(), width)
    }

    /// Converts to a signed integer, truncating toward zero and saturating
    /// to `i32::MAX`/`i32::MIN` when out of range.
    pub fn to_i32(&self) -> i32 {
        if self.is_nan() {
            return 0;
        }
        if self.is_positive_infinity() {
            return i32::MAX;
        }
        if self.is_negative_infinity() {
            return i32::MIN;
        }
        let significand = self.wide_significand();
        let shift = self.exponent_value_with_bias() - self.fraction_size() as i32;
        let leading = significand.find_leading_one() as i32 + shift;
        if leading >= 32 {
            return if self.is_positive() { i32::MAX } else { i32::MIN };
        }
        let magnitude = (&significand << shift).get_lowest_32_bits();
        if self.is_positive() {
            magnitude as i32
        } else {
            -(magnitude as i32)
        }
    }

    /// Converts to an unsigned integer, truncating toward zero; negative
    /// values saturate to 0 and overlarge values to `u32::MAX`.
    pub fn to_u32(&self) -> u32 {
        if self.is_nan() || self.is_negative_infinity() {
            return 0;
        }
        if self.is_positive_infinity() {
            return u32::MAX;
        }
        if !self.is_positive() && !self.is_zero() {
            return 0;
        }
        let significand = self.wide_significand();
        let shift = self.exponent_value_with_bias() - self.fraction_size() as i32;
        let leading = significand.find_leading_one() as i32 + shift;
        if leading > 32 {
            return u32::MAX;
        }
        (&significand << shift).get_lowest_32_bits()
    }

    /// Converts to an IEEE-754 single by assembling the bit layout
    /// directly: saturates to ±infinity beyond single range and flushes to
    /// signed zero below it.
    pub fn to_f32(&self) -> f32 {
        if self.is_nan() {
            return f32::NAN;
        }
        if self.is_positive_infinity() {
            return f32::INFINITY;
        }
        if self.is_negative_infinity() {
            return f32::NEG_INFINITY;
        }
        let sign_bit = if self.is_positive() { 0u32 } else { 1u32 << 31 };
        let significand = self.wide_significand();
        let leading = significand.find_leading_one();
        if leading == 0 {
            return f32::from_bits(sign_bit);
        }
        let exponent =
            self.exponent_value_with_bias() - self.fraction_size() as i32 + leading as i32 - 1;
        let biased = exponent + 127;
        if biased >= 255 {
            return if self.is_positive() {
                f32::INFINITY
            } else {
                f32::NEG_INFINITY
            };
        }
        if biased <= 0 {
            return f32::from_bits(sign_bit);
        }
        let mantissa_bits = significand.set_zero(leading - 1);
        let mantissa = (&mantissa_bits << (24 - leading as i32)).get_lowest_32_bits() & 0x7F_FFFF;
        f32::from_bits(sign_bit | (biased as u32) << 23 | mantissa)
    }
}

impl PartialEq for Unum {
    /// All zero representations compare equal regardless of sign; any
    /// other pair compares by raw bit pattern within one environment.
    fn eq(&self, other: &Self) -> bool {
        if self.environment != other.environment {
            return false;
        }
        if self.is_zero() && other.is_zero() {
            return true;
        }
        self.bits == other.bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> UnumEnvironment {
        UnumEnvironment::new(3, 4)
    }

    #[test]
    fn zero_is_all_clear() {
        let zero = Unum::zero(env());
        assert!(zero.is_zero());
        assert!(zero.is_exact());
        assert!(zero.is_positive());
        assert!(zero.bits().is_all_zero());
    }

    #[test]
    fn integer_roundtrips() {
        for value in [0, 1, 30, 1000, -30, -1000, 5000, 6000] {
            let unum = Unum::from_i32(env(), value);
            assert!(unum.is_exact());
            assert_eq!(unum.to_i32(), value, "roundtrip failed for {value}");
        }
    }

    #[test]
    fn unsigned_roundtrips() {
        for value in [0u32, 1, 2, 3, 255, 256, 65535, 1 << 20] {
            let unum = Unum::from_u32(env(), value);
            assert_eq!(unum.to_u32(), value, "roundtrip failed for {value}");
        }
    }

    #[test]
    fn thirty_matches_book_operand() {
        // 30 in environment (3, 4) is the 0x3F22 pattern from "The End
        // of Error": exponent 111 (es = 3), fraction 111 (fs = 3).
        let unum = Unum::from_u32(env(), 30);
        assert_eq!(unum.bits(), &BitMask::with_size(&[0x3F22], 33));
    }

    #[test]
    fn small_fraction_operand_field_decode() {
        let unum = Unum::from_bits(env(), BitMask::with_size(&[0xE40], 33));
        assert_eq!(unum.fraction_size(), 1);
        assert_eq!(unum.exponent_size(), 5);
        assert!(unum.is_exact());
        assert!(unum.is_positive());
        assert_eq!(unum.exponent().get_lowest_32_bits(), 7);
        assert_eq!(unum.exponent_value_with_bias(), -8);
        assert!(unum.fraction().is_all_zero());
        assert!(unum.hidden_bit_is_one());
    }

    #[test]
    fn one_encodes_normalized() {
        let one = Unum::from_u32(env(), 1);
        assert_eq!(one.exponent_size(), 2);
        assert_eq!(one.fraction_size(), 1);
        assert_eq!(one.exponent_value_with_bias(), 0);
        assert!(one.fraction().is_all_zero());
    }

    #[test]
    fn hidden_bit_cleared_for_subnormal() {
        // A hand-built subnormal: zero exponent field, nonzero fraction.
        let unum = Unum::from_fields(
            env(),
            false,
            &BitMask::zeros(33),
            &BitMask::with_size(&[1], 33),
            false,
            1,
            1,
        );
        assert!(!unum.hidden_bit_is_one());
        assert_eq!(unum.exponent_value_with_bias(), 1);
        // Subnormal 1/2^1 at exponent 1: value is 1.
        assert_eq!(unum.to_i32(), 1);
    }

    #[test]
    fn uncertainty_bit_tracks_tag_bit() {
        // Tag is 8 bits in environment (3, 4); the ubit is bit 7.
        let inexact = Unum::from_bits(env(), BitMask::with_size(&[0x80], 33));
        assert!(!inexact.is_exact());
        let exact = Unum::from_bits(env(), BitMask::with_size(&[0x40], 33));
        assert!(exact.is_exact());
    }

    #[test]
    fn with_uncertainty_bit_is_functional() {
        let exact = Unum::from_u32(env(), 30);
        let inexact = exact.with_uncertainty_bit(true);
        assert!(exact.is_exact());
        assert!(!inexact.is_exact());
        assert_eq!(inexact.with_uncertainty_bit(false).bits(), exact.bits());
    }

    #[test]
    fn negate_flips_only_the_sign() {
        let value = Unum::from_u32(env(), 1000);
        let negated = value.negate();
        assert!(!negated.is_positive());
        assert_eq!(negated.to_i32(), -1000);
        assert_eq!(negated.negate().bits(), value.bits());
    }

    #[test]
    fn signed_zeros_compare_equal() {
        let zero = Unum::zero(env());
        let negative_zero = zero.negate();
        assert!(negative_zero.is_zero());
        assert_eq!(zero, negative_zero);
        assert_ne!(zero.bits(), negative_zero.bits());
    }

    #[test]
    fn fraction_overflow_sets_uncertainty() {
        // 2^17 + 1 needs 17 fraction bits; environment (3, 4) stores 16.
        let unum = Unum::from_u32(env(), (1 << 17) + 1);
        assert!(!unum.is_exact());
        assert_eq!(unum.to_u32(), 1 << 17);
    }

    #[test]
    fn oversized_value_saturates_to_infinity() {
        let tiny = UnumEnvironment::new(1, 2);
        // Exponent 31 does not fit an exponent field of at most 2 bits.
        let unum = Unum::from_u32(tiny, 1 << 31);
        assert!(unum.is_positive_infinity());
    }

    #[test]
    fn infinity_and_nan_classification() {
        let e = env();
        assert!(Unum::from_bits(e.clone(), e.positive_infinity()).is_positive_infinity());
        assert!(Unum::from_bits(e.clone(), e.negative_infinity()).is_negative_infinity());
        assert!(Unum::from_bits(e.clone(), e.quiet_nan()).is_nan());
        assert!(Unum::from_bits(e.clone(), e.signaling_nan()).is_nan());
        assert!(!Unum::from_u32(e, 42).is_nan());
    }

    #[test]
    fn saturating_integer_conversions() {
        let e = env();
        assert_eq!(Unum::from_bits(e.clone(), e.positive_infinity()).to_i32(), i32::MAX);
        assert_eq!(Unum::from_bits(e.clone(), e.negative_infinity()).to_i32(), i32::MIN);
        assert_eq!(Unum::from_bits(e.clone(), e.positive_infinity()).to_u32(), u32::MAX);
        assert_eq!(Unum::from_i32(e.clone(), -5).to_u32(), 0);
        assert_eq!(Unum::from_u32(e.clone(), 1 << 30).to_i32(), 1 << 30);
        // The absolute value of i32::MIN is representable exactly.
        assert_eq!(Unum::from_i32(e, i32::MIN).to_i32(), i32::MIN);
    }

    #[test]
    fn float_conversion_exact_values() {
        let e = env();
        assert_eq!(Unum::from_u32(e.clone(), 30).to_f32(), 30.0);
        assert_eq!(Unum::from_u32(e.clone(), 1000).to_f32(), 1000.0);
        assert_eq!(Unum::from_i32(e.clone(), -6000).to_f32(), -6000.0);
        assert_eq!(Unum::zero(e.clone()).to_f32(), 0.0);
        // 1/256, the small operand of the p. 117 worked example.
        let small = Unum::from_bits(e, BitMask::with_size(&[0xE40], 33));
        assert_eq!(small.to_f32(), 1.0 / 256.0);
    }

    #[test]
    fn float_conversion_special_values() {
        let e = env();
        assert!(Unum::from_bits(e.clone(), e.quiet_nan()).to_f32().is_nan());
        assert_eq!(
            Unum::from_bits(e.clone(), e.positive_infinity()).to_f32(),
            f32::INFINITY
        );
        assert_eq!(
            Unum::from_bits(e.clone(), e.negative_infinity()).to_f32(),
            f32::NEG_INFINITY
        );
    }

    #[test]
    fn minimal_exponent_sizes() {
        assert_eq!(exponent_value_to_exponent_size(1), 1);
        assert_eq!(exponent_value_to_exponent_size(0), 2);
        assert_eq!(exponent_value_to_exponent_size(2), 2);
        assert_eq!(exponent_value_to_exponent_size(4), 3);
        assert_eq!(exponent_value_to_exponent_size(-8), 5);
    }

    #[test]
    fn serde_roundtrip() {
        let unum = Unum::from_i32(env(), -5000);
        let json = serde_json::to_string(&unum).unwrap();
        let back: Unum = serde_json::from_str(&json).unwrap();
        assert_eq!(unum, back);
        assert_eq!(unum.bits(), back.bits());
    }
}
