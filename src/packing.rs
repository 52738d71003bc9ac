//! Lane packing for wide testbench words
//!
//! A packed word concatenates fixed-width lanes little-endian: lane `i`
//! occupies bits `[i * lane_width, (i + 1) * lane_width)`, so lane 0 is the
//! least significant. Each value is masked to its lane in two's complement,
//! which is how a hardware register of that width would truncate it.

use num_bigint::{BigInt, BigUint};
use num_traits::One;

/// `2^lane_width - 1`
pub fn lane_mask(lane_width: usize) -> BigUint {
    (BigUint::one() << lane_width) - BigUint::one()
}

/// Two's-complement truncation of `value` to `lane_width` bits
pub fn mask_to_width(value: &BigInt, lane_width: usize) -> BigUint {
    let mask = BigInt::from(lane_mask(lane_width));
    // BigInt `&` uses infinite two's-complement semantics, so the result is
    // the non-negative bit pattern of the low `lane_width` bits.
    let (_, magnitude) = (value & &mask).into_parts();
    magnitude
}

/// Reinterpret a `lane_width`-bit pattern as a signed value
pub fn sign_extend(lane: &BigUint, lane_width: usize) -> BigInt {
    let half = BigUint::one() << (lane_width - 1);
    if lane >= &half {
        BigInt::from(lane.clone()) - (BigInt::one() << lane_width)
    } else {
        BigInt::from(lane.clone())
    }
}

/// Pack `values` into one word, value `i` landing in lane `i`.
///
/// Out-of-range values are truncated by the lane mask, never rejected.
pub fn pack<I>(values: I, lane_width: usize) -> BigUint
where
    I: IntoIterator,
    I::Item: Into<BigInt>,
{
    let mut word = BigUint::default();
    for (lane, value) in values.into_iter().enumerate() {
        let bits = mask_to_width(&value.into(), lane_width);
        word |= bits << (lane * lane_width);
    }
    word
}

/// Split `word` into `lanes` signed values of `lane_width` bits, lane 0 first
pub fn unpack(word: &BigUint, lanes: usize, lane_width: usize) -> Vec<BigInt> {
    let mask = lane_mask(lane_width);
    (0..lanes)
        .map(|lane| {
            let bits = (word >> (lane * lane_width)) & &mask;
            sign_extend(&bits, lane_width)
        })
        .collect()
}

/// `unpack` narrowed to i64; `None` if any lane does not fit
pub fn unpack_i64(word: &BigUint, lanes: usize, lane_width: usize) -> Option<Vec<i64>> {
    unpack(word, lanes, lane_width)
        .into_iter()
        .map(|v| i64::try_from(v).ok())
        .collect()
}
