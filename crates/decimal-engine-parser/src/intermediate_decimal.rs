//! A parser for exact decimal literals of the form `[sign] digits ['.' digits]`.
//!
//! Unlike a general purpose decimal parser, the scale of a literal is the number of
//! fractional digits actually written. Trailing zeros are significant: `"0.10"` has
//! scale 2. Exponents, whitespace and a bare decimal point are rejected.
use crate::intermediate_decimal::IntermediateDecimalError::{
    InvalidLiteral, LossyCast, NonFiniteFloat, OutOfRange, ParseError,
};
use bigdecimal::{BigDecimal, ParseBigDecimalError, RoundingMode, ToPrimitive};
use core::{fmt, hash::Hash, str::FromStr};
use serde::{Deserialize, Serialize};
use snafu::Snafu;

/// Errors related to the processing of decimal literals
#[allow(clippy::module_name_repetitions)]
#[derive(Snafu, Debug, PartialEq)]
pub enum IntermediateDecimalError {
    /// The text does not follow the `[sign] digits ['.' digits]` grammar.
    #[snafu(display("invalid decimal literal: {literal:?}"))]
    InvalidLiteral {
        /// The rejected text
        literal: String,
    },
    /// Represents an error encountered during the parsing of a decimal string.
    #[snafu(display("{error}"))]
    ParseError {
        /// The underlying error
        error: ParseBigDecimalError,
    },
    /// Error occurs when this decimal cannot fit in a primitive.
    #[snafu(display("Value out of range for target type"))]
    OutOfRange,
    /// Error occurs when this decimal cannot be losslessly cast into a primitive.
    #[snafu(display("Fractional part of decimal is non-zero"))]
    LossyCast,
    /// NaN and infinities have no decimal representation.
    #[snafu(display("non-finite float {value} has no decimal representation"))]
    NonFiniteFloat {
        /// The rejected float
        value: f64,
    },
}
impl From<ParseBigDecimalError> for IntermediateDecimalError {
    fn from(value: ParseBigDecimalError) -> Self {
        IntermediateDecimalError::ParseError { error: value }
    }
}

impl Eq for IntermediateDecimalError {}

/// Returns true if `literal` matches `[sign] digits ['.' digits]`.
fn is_decimal_literal(literal: &str) -> bool {
    let unsigned = literal
        .strip_prefix(['+', '-'])
        .unwrap_or(literal);
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    all_digits(integer) && fraction.map_or(true, all_digits)
}

/// An intermediate placeholder for an exact decimal literal
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Hash)]
pub struct IntermediateDecimal {
    value: BigDecimal,
}

impl IntermediateDecimal {
    /// Get the arbitrary precision value of this literal.
    #[must_use]
    pub fn value(&self) -> BigDecimal {
        self.value.clone()
    }

    /// Get the number of significant digits of this literal, saturating at `u8::MAX`.
    #[must_use]
    pub fn precision(&self) -> u8 {
        u8::try_from(self.value.digits()).unwrap_or(u8::MAX)
    }

    /// Get the number of fractional digits written in this literal.
    ///
    /// Integers and literals with a negative exponent report a scale of zero.
    #[must_use]
    pub fn scale(&self) -> u8 {
        let fractional_digits = self.value.fractional_digit_count().max(0);
        u8::try_from(fractional_digits).unwrap_or(u8::MAX)
    }

    /// Builds a literal from the shortest text that round-trips `value`.
    ///
    /// `0.1_f64` becomes the literal `0.1` with scale 1 rather than the exact binary
    /// expansion of the float.
    ///
    /// # Errors
    /// Returns `NonFiniteFloat` for NaN and infinities.
    pub fn try_from_f64_shortest(value: f64) -> Result<Self, IntermediateDecimalError> {
        if !value.is_finite() {
            return Err(NonFiniteFloat { value });
        }
        // `Display` for `f64` never uses an exponent and prints the shortest round-trip digits.
        Self::from_str(&value.to_string())
    }

    /// Returns the mantissa of this literal at `scale`.
    ///
    /// When the literal has more fractional digits than `scale` it is rounded half-to-even
    /// if `round` is set and rejected with `LossyCast` otherwise.
    ///
    /// # Errors
    /// `LossyCast` as described above and `OutOfRange` if the mantissa does not fit an `i128`.
    pub fn try_into_i128_with_scale(
        &self,
        scale: u8,
        round: bool,
    ) -> Result<i128, IntermediateDecimalError> {
        let scaled_decimal = if self.scale() > scale {
            if !round {
                return Err(LossyCast);
            }
            self.value
                .with_scale_round(scale.into(), RoundingMode::HalfEven)
        } else {
            self.value.with_scale(scale.into())
        };
        let (mantissa, _) = scaled_decimal.into_bigint_and_exponent();
        mantissa.to_i128().ok_or(OutOfRange)
    }
}

impl fmt::Display for IntermediateDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl FromStr for IntermediateDecimal {
    type Err = IntermediateDecimalError;

    fn from_str(decimal_string: &str) -> Result<Self, Self::Err> {
        if !is_decimal_literal(decimal_string) {
            return Err(InvalidLiteral {
                literal: decimal_string.to_string(),
            });
        }
        BigDecimal::from_str(decimal_string)
            .map(|value| IntermediateDecimal { value })
            .map_err(|err| ParseError { error: err })
    }
}

impl From<i128> for IntermediateDecimal {
    fn from(value: i128) -> Self {
        IntermediateDecimal {
            value: BigDecimal::from(value),
        }
    }
}

impl From<i64> for IntermediateDecimal {
    fn from(value: i64) -> Self {
        IntermediateDecimal {
            value: BigDecimal::from(value),
        }
    }
}

impl TryFrom<&str> for IntermediateDecimal {
    type Error = IntermediateDecimalError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        IntermediateDecimal::from_str(s)
    }
}

impl TryFrom<String> for IntermediateDecimal {
    type Error = IntermediateDecimalError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        IntermediateDecimal::from_str(&s)
    }
}

impl TryFrom<IntermediateDecimal> for i128 {
    type Error = IntermediateDecimalError;

    fn try_from(decimal: IntermediateDecimal) -> Result<Self, Self::Error> {
        if !decimal.value.is_integer() {
            return Err(LossyCast);
        }
        decimal.value.to_i128().ok_or(OutOfRange)
    }
}

impl TryFrom<IntermediateDecimal> for i64 {
    type Error = IntermediateDecimalError;

    fn try_from(decimal: IntermediateDecimal) -> Result<Self, Self::Error> {
        if !decimal.value.is_integer() {
            return Err(LossyCast);
        }
        decimal.value.to_i64().ok_or(OutOfRange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn we_can_parse_a_simple_decimal() {
        let decimal: IntermediateDecimal = "123.45".parse().unwrap();
        assert_eq!(decimal.to_string(), "123.45");
        assert_eq!(decimal.precision(), 5);
        assert_eq!(decimal.scale(), 2);
    }

    #[test]
    fn we_keep_trailing_zeros_in_the_scale() {
        let decimal: IntermediateDecimal = "0.10".parse().unwrap();
        assert_eq!(decimal.scale(), 2);
        assert_eq!(decimal.try_into_i128_with_scale(2, false), Ok(10));

        let decimal: IntermediateDecimal = "-1.000000000000000000000000000".parse().unwrap();
        assert_eq!(decimal.scale(), 27);
    }

    #[test]
    fn we_can_parse_signed_integers_with_zero_scale() {
        let decimal: IntermediateDecimal = "-500".parse().unwrap();
        assert_eq!(decimal.scale(), 0);
        assert_eq!(decimal.try_into_i128_with_scale(3, false), Ok(-500_000));
        let decimal: IntermediateDecimal = "+7".parse().unwrap();
        assert_eq!(decimal.try_into_i128_with_scale(0, false), Ok(7));
    }

    #[test]
    fn we_cannot_parse_text_outside_the_literal_grammar() {
        for literal in [
            "", "-", ".", "1.", ".5", "1e5", "1.2.3", " 1.2", "1.2 ", "abc", "--1", "1,5", "0x10",
        ] {
            assert_eq!(
                literal.parse::<IntermediateDecimal>(),
                Err(InvalidLiteral {
                    literal: literal.to_string()
                }),
                "{literal:?} should be rejected"
            );
        }
    }

    #[test]
    fn we_can_round_half_to_even_when_reducing_scale() {
        let decimal: IntermediateDecimal = "0.125".parse().unwrap();
        assert_eq!(decimal.try_into_i128_with_scale(2, true), Ok(12));
        assert_eq!(decimal.try_into_i128_with_scale(2, false), Err(LossyCast));
        let decimal: IntermediateDecimal = "0.135".parse().unwrap();
        assert_eq!(decimal.try_into_i128_with_scale(2, true), Ok(14));
        let decimal: IntermediateDecimal = "-2.5".parse().unwrap();
        assert_eq!(decimal.try_into_i128_with_scale(0, true), Ok(-2));
    }

    #[test]
    fn we_cannot_convert_mantissas_beyond_i128() {
        let decimal: IntermediateDecimal = "170141183460469231731687303715884105728".parse().unwrap();
        assert_eq!(decimal.try_into_i128_with_scale(0, false), Err(OutOfRange));
        let decimal: IntermediateDecimal = "1".parse().unwrap();
        assert_eq!(decimal.try_into_i128_with_scale(39, false), Err(OutOfRange));
    }

    #[test]
    fn we_can_build_literals_from_floats_using_the_shortest_representation() {
        let decimal = IntermediateDecimal::try_from_f64_shortest(0.1).unwrap();
        assert_eq!(decimal.scale(), 1);
        assert_eq!(decimal.try_into_i128_with_scale(1, false), Ok(1));
        let decimal = IntermediateDecimal::try_from_f64_shortest(-2.55).unwrap();
        assert_eq!(decimal.try_into_i128_with_scale(2, false), Ok(-255));
        let decimal = IntermediateDecimal::try_from_f64_shortest(45.0).unwrap();
        assert_eq!(decimal.scale(), 0);
        assert!(matches!(
            IntermediateDecimal::try_from_f64_shortest(f64::NAN),
            Err(NonFiniteFloat { .. })
        ));
        assert!(matches!(
            IntermediateDecimal::try_from_f64_shortest(f64::INFINITY),
            Err(NonFiniteFloat { .. })
        ));
    }

    #[test]
    fn test_conversion_to_i128() {
        let valid_decimal: IntermediateDecimal =
            "170141183460469231731687303715884105727".parse().unwrap();
        assert_eq!(
            i128::try_from(valid_decimal),
            Ok(170_141_183_460_469_231_731_687_303_715_884_105_727_i128)
        );

        let valid_decimal: IntermediateDecimal = "123.000".parse().unwrap();
        assert_eq!(i128::try_from(valid_decimal), Ok(123));

        let overflow_decimal: IntermediateDecimal =
            "170141183460469231731687303715884105728".parse().unwrap();
        assert_eq!(i128::try_from(overflow_decimal), Err(OutOfRange));

        let non_integer: IntermediateDecimal = "100.5".parse().unwrap();
        assert_eq!(i128::try_from(non_integer), Err(LossyCast));
    }

    #[test]
    fn test_conversion_to_i64() {
        let valid_decimal: IntermediateDecimal = "9223372036854775807".parse().unwrap();
        assert_eq!(i64::try_from(valid_decimal), Ok(i64::MAX));

        let overflow_decimal: IntermediateDecimal = "9223372036854775808".parse().unwrap();
        assert_eq!(i64::try_from(overflow_decimal), Err(OutOfRange));

        let valid_decimal_negative: IntermediateDecimal = "-9223372036854775808".parse().unwrap();
        assert_eq!(i64::try_from(valid_decimal_negative), Ok(i64::MIN));

        let non_integer: IntermediateDecimal = "100.5".parse().unwrap();
        assert_eq!(i64::try_from(non_integer), Err(LossyCast));
    }

    #[test]
    fn we_can_serialize_and_deserialize_a_literal() {
        let decimal: IntermediateDecimal = "12.50".parse().unwrap();
        let json = serde_json::to_string(&decimal).unwrap();
        let back: IntermediateDecimal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, decimal);
        assert_eq!(back.scale(), 2);
    }
}
