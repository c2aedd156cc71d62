//! Fixed-Point Amount Module
//!
//! Unified conversion between the internal fixed-point representation and
//! client-facing decimal strings. All monetary conversions MUST go through
//! this module.
//!
//! ## Design Principles
//! 1. Arbitrary precision: balances at 18 decimals exceed `u64`, so the
//!    integer part is a `BigUint`, never a float. Values above 2^53 smallest
//!    units survive every conversion bit-for-bit.
//! 2. Explicit Error Handling: no silent truncation, no silent rounding.
//! 3. Scale discipline: an amount carries the decimal count of the token
//!    that owns it. Combining two amounts of different scale is a
//!    programming error and panics; it is never coerced.
//!
//! ## Internal Representation
//! - `units`: the amount in smallest units (e.g. wei), unsigned.
//! - `scale`: the owning token's decimal count (e.g. 18 for the native
//!   currency). The scale factor is `10^scale`.
//!
//! ## Usage
//! ```rust
//! use sendflow::amount::FixedAmount;
//!
//! // Client sends "1.5" of an 8-decimals token
//! let internal = FixedAmount::parse("1.5", 8)?;
//! assert_eq!(internal, FixedAmount::from_units(150_000_000u64, 8));
//!
//! // Display back to the client, trailing fractional zeros trimmed
//! assert_eq!(internal.to_decimal_string(), "1.5");
//! # Ok::<(), sendflow::amount::AmountError>(())
//! ```

use std::fmt;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{Zero, pow};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Fixed-point conversion and arithmetic errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("malformed amount: {0}")]
    Malformed(String),

    #[error("subtraction result would be negative")]
    Underflow,
}

// ============================================================================
// FixedAmount
// ============================================================================

/// An unsigned amount in smallest units, paired with its decimal scale.
///
/// Equality compares both units and scale. Arithmetic and ordering helpers
/// panic if the scales differ; callers must only combine amounts of the
/// same token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedAmount {
    #[serde(with = "biguint_dec")]
    units: BigUint,
    scale: u8,
}

impl FixedAmount {
    /// Zero at the given scale.
    pub fn zero(scale: u8) -> Self {
        Self {
            units: BigUint::zero(),
            scale,
        }
    }

    /// Build directly from smallest units.
    pub fn from_units(units: impl Into<BigUint>, scale: u8) -> Self {
        Self {
            units: units.into(),
            scale,
        }
    }

    /// Convert a client decimal string to the internal representation.
    ///
    /// Accepted syntax is strict: one or more ASCII digits, optionally
    /// followed by a single `.` and one or more ASCII digits. Anything else
    /// (signs, whitespace inside the number, `.5`, `5.`, exponents, hex) is
    /// rejected rather than guessed at.
    ///
    /// # Errors
    /// * `PrecisionOverflow` - more fractional digits than `scale` allows
    /// * `Malformed` - any other syntactic defect
    pub fn parse(text: &str, scale: u8) -> Result<Self, AmountError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AmountError::Malformed("empty string".into()));
        }

        let (whole, frac) = match text.split_once('.') {
            None => (text, ""),
            Some((whole, frac)) => {
                // Require both sides of the dot to be non-empty. This
                // prevents ambiguous formats like ".5" or "5.".
                if whole.is_empty() {
                    return Err(AmountError::Malformed(
                        "missing leading zero (e.g. use 0.5 instead of .5)".into(),
                    ));
                }
                if frac.is_empty() {
                    return Err(AmountError::Malformed(
                        "missing fractional part (e.g. use 5.0 instead of 5.)".into(),
                    ));
                }
                if frac.contains('.') {
                    return Err(AmountError::Malformed("multiple decimal points".into()));
                }
                if scale == 0 {
                    return Err(AmountError::Malformed(
                        "fractional digits on a zero-decimals token".into(),
                    ));
                }
                (whole, frac)
            }
        };

        if !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::Malformed(format!(
                "invalid character in whole part: {whole}"
            )));
        }
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::Malformed(format!(
                "invalid character in fractional part: {frac}"
            )));
        }

        // Reject rather than truncate when the input is finer than the token.
        if frac.len() > scale as usize {
            return Err(AmountError::PrecisionOverflow {
                provided: frac.len() as u32,
                max: scale as u32,
            });
        }

        // Digits are verified above, so these parses cannot fail; keep the
        // error path anyway instead of unwrapping.
        let whole_units = whole
            .parse::<BigUint>()
            .map_err(|e| AmountError::Malformed(e.to_string()))?;

        let frac_units = if frac.is_empty() {
            BigUint::zero()
        } else {
            // Pad the fraction out to the full scale: "5" at scale 3 is 500.
            let padded = format!("{frac:0<width$}", width = scale as usize);
            padded
                .parse::<BigUint>()
                .map_err(|e| AmountError::Malformed(e.to_string()))?
        };

        let units = whole_units * Self::base(scale) + frac_units;
        Ok(Self { units, scale })
    }

    /// Smallest units, e.g. wei for an 18-decimals asset.
    pub fn units(&self) -> &BigUint {
        &self.units
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.units.is_zero()
    }

    /// Sum of two amounts of the same scale.
    ///
    /// # Panics
    /// Panics if the scales differ; that is a caller bug, not an outcome.
    pub fn add(&self, rhs: &Self) -> Self {
        self.assert_same_scale(rhs);
        Self {
            units: &self.units + &rhs.units,
            scale: self.scale,
        }
    }

    /// Difference of two amounts of the same scale.
    ///
    /// Fails with [`AmountError::Underflow`] when the result would be
    /// negative; the caller decides whether that means "insufficient funds"
    /// or a genuine defect.
    ///
    /// # Panics
    /// Panics if the scales differ.
    pub fn sub(&self, rhs: &Self) -> Result<Self, AmountError> {
        self.assert_same_scale(rhs);
        if rhs.units > self.units {
            return Err(AmountError::Underflow);
        }
        Ok(Self {
            units: &self.units - &rhs.units,
            scale: self.scale,
        })
    }

    /// Strictly-greater comparison in smallest units.
    ///
    /// # Panics
    /// Panics if the scales differ.
    pub fn exceeds(&self, rhs: &Self) -> bool {
        self.assert_same_scale(rhs);
        self.units > rhs.units
    }

    /// Render as a decimal string, trimming trailing zero fractional digits
    /// but never the integer part: `1.990000` becomes `1.99`, `3.000`
    /// becomes `3`, and `0` stays `0`.
    pub fn to_decimal_string(&self) -> String {
        let (whole, frac) = self.units.div_rem(&Self::base(self.scale));
        if frac.is_zero() {
            return whole.to_string();
        }
        // The fraction loses leading zeros as an integer; restore the width
        // before trimming from the right.
        let frac = format!("{frac:0>width$}", width = self.scale as usize);
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }

    fn base(scale: u8) -> BigUint {
        pow(BigUint::from(10u32), scale as usize)
    }

    fn assert_same_scale(&self, rhs: &Self) {
        assert_eq!(
            self.scale, rhs.scale,
            "amount scale mismatch: {} vs {}",
            self.scale, rhs.scale
        );
    }
}

impl fmt::Display for FixedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

/// Serde bridge carrying `BigUint` as a decimal string so JSON consumers
/// never see an integer above 2^53.
mod biguint_dec {
    use num_bigint::BigUint;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse::<BigUint>().map_err(D::Error::custom)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn units(v: u128, scale: u8) -> FixedAmount {
        FixedAmount::from_units(v, scale)
    }

    #[test]
    fn qa_parse_variations() {
        assert_eq!(FixedAmount::parse("1.23", 2).unwrap(), units(123, 2));
        assert_eq!(
            FixedAmount::parse("1.23", 8).unwrap(),
            units(123_000_000, 8)
        );

        // Leading/trailing zeros
        assert_eq!(FixedAmount::parse("001.23", 2).unwrap(), units(123, 2));
        assert_eq!(
            FixedAmount::parse("1.2300", 8).unwrap(),
            units(123_000_000, 8)
        );
        assert_eq!(FixedAmount::parse("0.0001", 4).unwrap(), units(1, 4));

        // Zero parses; positivity is the validator's concern, not the parser's
        assert_eq!(FixedAmount::parse("0", 2).unwrap(), units(0, 2));
        assert_eq!(FixedAmount::parse("0.00", 2).unwrap(), units(0, 2));

        // Outer whitespace tolerated
        assert_eq!(FixedAmount::parse(" 1.5 ", 2).unwrap(), units(150, 2));
    }

    #[test]
    fn qa_parse_invalid_formats() {
        let cases = [
            "1,000.00", // commas
            "1.2.3",    // multiple dots
            "1. 23",    // inner space
            "+1.23",    // explicit plus
            "-1.23",    // negative
            "1e2",      // scientific notation
            "0x12",     // hex
            ".",        // bare dot
            "1..",      // trailing dots
            ".5",       // missing leading zero (STRICT)
            "5.",       // missing fractional part (STRICT)
            "",         // empty
        ];
        for case in cases {
            assert!(
                matches!(FixedAmount::parse(case, 8), Err(AmountError::Malformed(_))),
                "should reject invalid format: {case:?}"
            );
        }

        // Dot provided but the token has no fractional digits at all
        assert!(matches!(
            FixedAmount::parse("100.0", 0),
            Err(AmountError::Malformed(_))
        ));
    }

    #[test]
    fn qa_parse_precision_limits() {
        assert!(FixedAmount::parse("1.234", 3).is_ok());

        let res = FixedAmount::parse("1.2345", 3);
        assert_eq!(
            res,
            Err(AmountError::PrecisionOverflow {
                provided: 4,
                max: 3
            })
        );

        assert_eq!(FixedAmount::parse("100", 0).unwrap(), units(100, 0));
    }

    #[test]
    fn qa_values_beyond_u64() {
        // 10^21 smallest units: 1000 tokens at 18 decimals, > u64::MAX
        let amount = FixedAmount::parse("1000", 18).unwrap();
        assert_eq!(
            amount.units(),
            &pow(BigUint::from(10u32), 21),
            "1000 @ 18 decimals is 10^21 wei"
        );
        assert_eq!(amount.to_decimal_string(), "1000");

        let huge = FixedAmount::parse("999999999999999999999.000000000000000001", 18).unwrap();
        assert_eq!(
            huge.to_decimal_string(),
            "999999999999999999999.000000000000000001"
        );
    }

    #[test]
    fn qa_format_trims_fraction_only() {
        assert_eq!(units(199_900_000, 8).to_decimal_string(), "1.999");
        assert_eq!(units(300_000_000, 8).to_decimal_string(), "3");
        assert_eq!(units(0, 8).to_decimal_string(), "0");
        assert_eq!(units(1, 8).to_decimal_string(), "0.00000001");
        assert_eq!(units(10, 0).to_decimal_string(), "10");
        // Integer zeros are never trimmed
        assert_eq!(units(1_000, 0).to_decimal_string(), "1000");
    }

    #[test]
    fn qa_roundtrip_consistency() {
        let scales = [0u8, 2, 6, 8, 12, 18];
        let values = [
            "1",
            "1.5",
            "0.00000001",
            "1234.5678",
            "999999.999999",
            "184467440737095516150.9",
        ];

        for scale in scales {
            for val in values {
                let frac_len = val.split_once('.').map(|(_, f)| f.len()).unwrap_or(0);
                if frac_len > scale as usize {
                    continue;
                }
                let parsed = FixedAmount::parse(val, scale).unwrap();
                let formatted = parsed.to_decimal_string();
                let back = FixedAmount::parse(&formatted, scale).unwrap();
                assert_eq!(parsed, back, "roundtrip failed for {val} at scale {scale}");
            }
        }
    }

    #[test]
    fn qa_add_sub_semantics() {
        let a = units(150, 2);
        let b = units(50, 2);

        assert_eq!(a.add(&b), units(200, 2));
        assert_eq!(a.sub(&b).unwrap(), units(100, 2));
        assert_eq!(b.sub(&b).unwrap(), units(0, 2));
        assert_eq!(b.sub(&a), Err(AmountError::Underflow));

        assert!(a.exceeds(&b));
        assert!(!b.exceeds(&a));
        assert!(!a.exceeds(&a));
    }

    #[test]
    #[should_panic(expected = "scale mismatch")]
    fn qa_cross_scale_add_panics() {
        let _ = units(100, 2).add(&units(100, 3));
    }

    #[test]
    #[should_panic(expected = "scale mismatch")]
    fn qa_cross_scale_compare_panics() {
        let _ = units(100, 2).exceeds(&units(100, 3));
    }

    #[test]
    fn qa_equality_is_exact_integer_equality() {
        // "1" and "1.000000000000000000" are the same smallest-unit value
        let typed = FixedAmount::parse("1", 18).unwrap();
        let balance = FixedAmount::parse("1.000000000000000000", 18).unwrap();
        assert_eq!(typed, balance);

        // One wei off is not send-max
        let off = balance.sub(&units(1, 18)).unwrap();
        assert_ne!(typed, off);
    }

    #[test]
    fn qa_serde_units_as_string() {
        let amount = FixedAmount::parse("1000.5", 18).unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, r#"{"units":"1000500000000000000000","scale":18}"#);
        let back: FixedAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }
}
