//! Hex line rendering for packed words
//!
//! One line per simulation time-step, lowercase, left-padded with zeros to
//! `ceil(total_bits / 4)` digits so every line of a file has the same width
//! as the `$readmemh` target register.

use num_bigint::BigUint;
use num_traits::Num;

use crate::error::{GenError, GenResult};

/// Hex digits needed to hold `total_bits` bits
pub fn hex_digits(total_bits: usize) -> usize {
    total_bits.div_ceil(4)
}

/// Render `word` as a zero-padded lowercase hex line of `total_bits` bits.
///
/// A word wider than the line is an upstream masking defect and is
/// reported as `HexOverflow` rather than silently widening the line.
pub fn format_hex(word: &BigUint, total_bits: usize) -> GenResult<String> {
    let width = hex_digits(total_bits);
    let needed = hex_digits(word.bits() as usize);
    if needed > width {
        return Err(GenError::HexOverflow { needed, width });
    }
    Ok(format!("{:0>width$}", word.to_str_radix(16), width = width))
}

/// Parse one hex line back into a packed word
pub fn parse_hex_line(line: &str) -> GenResult<BigUint> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(GenError::HexParse { line: line.to_string() });
    }
    BigUint::from_str_radix(trimmed, 16).map_err(|_| GenError::HexParse {
        line: line.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hex_digits_rounds_up() {
        assert_eq!(hex_digits(0), 0);
        assert_eq!(hex_digits(1), 1);
        assert_eq!(hex_digits(4), 1);
        assert_eq!(hex_digits(5), 2);
        assert_eq!(hex_digits(128), 32);
        assert_eq!(hex_digits(usize::MAX), usize::MAX / 4 + 1);
    }

    #[test]
    fn test_format_pads_to_width() {
        let word = BigUint::from(0xffu32);
        assert_eq!(format_hex(&word, 32).unwrap(), "000000ff");
        assert_eq!(format_hex(&BigUint::from(0u32), 8).unwrap(), "00");
        assert_eq!(format_hex(&BigUint::from(0xabcu32), 10).unwrap(), "abc");
    }

    #[test]
    fn test_format_rejects_wide_word() {
        let word = BigUint::from(0x1ffu32);
        let err = format_hex(&word, 8).unwrap_err();
        assert!(matches!(err, GenError::HexOverflow { needed: 3, width: 2 }));
    }

    #[test]
    fn test_format_is_lowercase() {
        let word = BigUint::from(0xdead_beefu32);
        assert_eq!(format_hex(&word, 32).unwrap(), "deadbeef");
    }

    #[test]
    fn test_parse_hex_line() {
        assert_eq!(parse_hex_line("00ff\n").unwrap(), BigUint::from(255u32));
        assert!(parse_hex_line("").is_err());
        assert!(parse_hex_line("xyz").is_err());
    }
}
