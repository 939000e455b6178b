//! Errors raised while building, rescaling or validating decimal values.
use super::{InvalidPrecisionError, Precision};
use decimal_engine_parser::intermediate_decimal::{IntermediateDecimal, IntermediateDecimalError};
use snafu::Snafu;

/// Errors related to decimal operations.
#[derive(Snafu, Debug, Eq, PartialEq)]
pub enum DecimalError {
    #[snafu(display("Invalid decimal format or value: {error}"))]
    /// The input has no decimal value, e.g. a NaN or infinite float
    InvalidDecimal {
        /// The underlying error
        error: String,
    },

    #[snafu(transparent)]
    /// Decimal precision is zero or above the supported maximum
    InvalidPrecision {
        /// The underlying error
        source: InvalidPrecisionError,
    },

    #[snafu(display("Value {value} does not fit in a decimal of precision {precision}"))]
    /// A value needs more significant digits than its type allows
    PrecisionOverflow {
        /// The offending value
        value: String,
        /// The precision that was exceeded
        precision: u8,
    },

    #[snafu(display("Decimal scale is not valid: {scale}"))]
    /// The scale is above the supported maximum or does not match the expected scale
    InvalidScale {
        /// The invalid scale value
        scale: String,
    },

    #[snafu(display("Unsupported operation: cannot round decimal: {error}"))]
    /// Rescaling would discard digits where exactness is required
    RoundingError {
        /// The underlying error
        error: String,
    },

    #[snafu(display("Value {value} is out of range for {target}"))]
    /// A decimal does not fit the integer type it is cast to
    OutOfRange {
        /// The offending value
        value: String,
        /// The target type
        target: String,
    },

    /// Text or literal input that is not a decimal
    #[snafu(transparent)]
    ParseError {
        /// The underlying source error
        source: IntermediateDecimalError,
    },
}

/// Result type for decimal operations.
pub type DecimalResult<T> = Result<T, DecimalError>;

impl From<DecimalError> for String {
    fn from(error: DecimalError) -> Self {
        error.to_string()
    }
}

/// Converts a literal into a mantissa at `scale`.
///
/// Extra fractional digits are rounded half-to-even when `round` is set and are a
/// `RoundingError` otherwise. Mantissas beyond `i128` are a `PrecisionOverflow`.
pub(crate) fn try_convert_intermediate_decimal_to_mantissa(
    literal: &IntermediateDecimal,
    scale: u8,
    round: bool,
) -> DecimalResult<i128> {
    literal
        .try_into_i128_with_scale(scale, round)
        .map_err(|error| match error {
            IntermediateDecimalError::LossyCast => DecimalError::RoundingError {
                error: format!("{literal} has more than {scale} fractional digits"),
            },
            IntermediateDecimalError::OutOfRange => DecimalError::PrecisionOverflow {
                value: literal.to_string(),
                precision: Precision::max().value(),
            },
            error => error.into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn we_can_convert_literals_to_mantissas() {
        let literal: IntermediateDecimal = "1.25".parse().unwrap();
        assert_eq!(
            try_convert_intermediate_decimal_to_mantissa(&literal, 4, false),
            Ok(12_500)
        );
        assert_eq!(
            try_convert_intermediate_decimal_to_mantissa(&literal, 1, true),
            Ok(12)
        );
        assert!(matches!(
            try_convert_intermediate_decimal_to_mantissa(&literal, 1, false),
            Err(DecimalError::RoundingError { .. })
        ));
    }

    #[test]
    fn we_cannot_convert_literals_beyond_i128() {
        let literal: IntermediateDecimal = "12345678901234567890".parse().unwrap();
        assert_eq!(
            try_convert_intermediate_decimal_to_mantissa(&literal, 20, false),
            Err(DecimalError::PrecisionOverflow {
                value: "12345678901234567890".to_string(),
                precision: 38
            })
        );
    }
}
