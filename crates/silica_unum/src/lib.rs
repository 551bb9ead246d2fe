//! Universal-number arithmetic for synthesis-time numeric decisions.
//!
//! A [`Unum`] is a self-describing floating-point-like value: sign,
//! exponent, fraction, and the field-size metadata describing them are all
//! packed into a single [`BitMask`](silica_bits::BitMask), together with an
//! uncertainty bit ("ubit") that marks inexact results. Because the type is
//! destined for hardware synthesis, no numeric edge case ever panics:
//! overflow saturates, underflow goes subnormal, and precision loss sets
//! the ubit.

#![warn(missing_docs)]

pub mod arith;
pub mod environment;
pub mod unum;

pub use environment::UnumEnvironment;
pub use unum::Unum;
