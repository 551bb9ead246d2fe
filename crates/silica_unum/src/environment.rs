//! Unum environments: field geometry and special-value bit patterns.

use serde::{Deserialize, Serialize};
use silica_bits::BitMask;

/// The field geometry shared by all unums of one environment.
///
/// An environment is described by two small integers: `exponent_size_size`
/// (the number of bits reserved to encode the exponent field width) and
/// `fraction_size_size` (likewise for the fraction field width). Everything
/// else — total width, tag width, field masks, and the special values — is
/// derived from those two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnumEnvironment {
    exponent_size_size: u32,
    fraction_size_size: u32,
}

impl UnumEnvironment {
    /// Creates an environment from the exponent-size and fraction-size
    /// field widths.
    ///
    /// # Panics
    ///
    /// Panics if `exponent_size_size > 4` or `fraction_size_size > 8`;
    /// wider environments have no use in synthesis and would overflow the
    /// native exponent bookkeeping.
    pub fn new(exponent_size_size: u32, fraction_size_size: u32) -> Self {
        assert!(
            exponent_size_size <= 4,
            "exponent size size {exponent_size_size} exceeds the supported maximum of 4"
        );
        assert!(
            fraction_size_size <= 8,
            "fraction size size {fraction_size_size} exceeds the supported maximum of 8"
        );
        Self {
            exponent_size_size,
            fraction_size_size,
        }
    }

    /// The number of bits encoding the exponent field width.
    pub fn exponent_size_size(&self) -> u32 {
        self.exponent_size_size
    }

    /// The number of bits encoding the fraction field width.
    pub fn fraction_size_size(&self) -> u32 {
        self.fraction_size_size
    }

    /// The widest exponent field this environment can describe.
    pub fn exponent_size_max(&self) -> u32 {
        1 << self.exponent_size_size
    }

    /// The widest fraction field this environment can describe.
    pub fn fraction_size_max(&self) -> u32 {
        1 << self.fraction_size_size
    }

    /// The width of the tag: uncertainty bit plus both size fields.
    pub fn tag_size(&self) -> u32 {
        1 + self.exponent_size_size + self.fraction_size_size
    }

    /// The total bit width of a unum in this environment.
    pub fn size(&self) -> u32 {
        1 + self.exponent_size_max() + self.fraction_size_max() + self.tag_size()
    }

    /// An all-zero bit pattern of the environment width (the exact zero).
    pub fn empty_bits(&self) -> BitMask {
        BitMask::zeros(self.size())
    }

    /// A mask of `width` one bits starting at `offset`, environment sized.
    pub(crate) fn field_mask(&self, width: u32, offset: u32) -> BitMask {
        let one = BitMask::with_size(&[1], self.size());
        &(&(&one << width as i32) - 1) << offset as i32
    }

    /// The mask selecting the uncertainty bit.
    pub fn uncertainty_bit_mask(&self) -> BitMask {
        self.empty_bits().set_one(self.tag_size() - 1)
    }

    /// The mask selecting the exponent-size field.
    pub fn exponent_size_mask(&self) -> BitMask {
        self.field_mask(self.exponent_size_size, self.fraction_size_size)
    }

    /// The mask selecting the fraction-size field.
    pub fn fraction_size_mask(&self) -> BitMask {
        self.field_mask(self.fraction_size_size, 0)
    }

    /// The bit pattern of positive infinity: maximum-width exponent and
    /// fraction fields, all ones, with the uncertainty bit clear.
    pub fn positive_infinity(&self) -> BitMask {
        self.infinity_bits(false)
    }

    /// The bit pattern of negative infinity.
    pub fn negative_infinity(&self) -> BitMask {
        self.infinity_bits(true)
    }

    /// The quiet NaN pattern: positive infinity with the uncertainty bit set.
    pub fn quiet_nan(&self) -> BitMask {
        &self.positive_infinity() | &self.uncertainty_bit_mask()
    }

    /// The signaling NaN pattern: negative infinity with the uncertainty bit set.
    pub fn signaling_nan(&self) -> BitMask {
        &self.negative_infinity() | &self.uncertainty_bit_mask()
    }

    fn infinity_bits(&self, sign: bool) -> BitMask {
        let exponent_size = self.exponent_size_max();
        let fraction_size = self.fraction_size_max();
        let tag = self.tag_size();
        let mut bits = self.empty_bits();
        bits = &bits | &BitMask::with_size(&[fraction_size - 1], self.size());
        bits = &bits
            | &(&BitMask::with_size(&[exponent_size - 1], self.size())
                << self.fraction_size_size as i32);
        bits = &bits | &self.field_mask(fraction_size, tag);
        bits = &bits | &self.field_mask(exponent_size, tag + fraction_size);
        if sign {
            bits = bits.set_one(tag + fraction_size + exponent_size);
        }
        bits
    }
}
