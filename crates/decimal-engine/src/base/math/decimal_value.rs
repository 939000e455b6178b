use super::{
    decimal::{try_convert_intermediate_decimal_to_mantissa, DecimalError, DecimalResult},
    decimal_format::{format_decimal, DecimalFormatOptions},
    rescale::{
        checked_upscale, cmp_rescaled, digit_count, downscale, to_f64, RoundingMode,
        MAX_SUPPORTED_SCALE,
    },
    Precision,
};
use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};
use decimal_engine_parser::intermediate_decimal::IntermediateDecimal;
use serde::{Deserialize, Deserializer, Serialize};

/// An exact decimal: `mantissa * 10^-scale`.
///
/// Equality, ordering and hashing follow the numeric value, so `0.1` and `0.10` are the
/// same value even though they carry different scales.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DecimalValue {
    mantissa: i128,
    scale: u8,
}

impl DecimalValue {
    /// Creates a decimal from a mantissa and a scale of at most 38.
    pub fn new(mantissa: i128, scale: u8) -> DecimalResult<Self> {
        if scale > MAX_SUPPORTED_SCALE {
            return Err(DecimalError::InvalidScale {
                scale: scale.to_string(),
            });
        }
        Ok(Self { mantissa, scale })
    }

    /// The scaled integer.
    #[must_use]
    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    /// The number of fractional digits.
    #[must_use]
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// The number of significant digits of the mantissa.
    #[must_use]
    pub fn digit_count(&self) -> u8 {
        digit_count(self.mantissa)
    }

    /// Moves the value to `scale`.
    ///
    /// Raising the scale is exact and fails on overflow; lowering it rounds with `mode`.
    pub fn rescale(&self, scale: u8, mode: RoundingMode) -> DecimalResult<Self> {
        if scale > MAX_SUPPORTED_SCALE {
            return Err(DecimalError::InvalidScale {
                scale: scale.to_string(),
            });
        }
        let mantissa = match scale.cmp(&self.scale) {
            Ordering::Equal => self.mantissa,
            Ordering::Greater => checked_upscale(self.mantissa, scale - self.scale).ok_or_else(
                || DecimalError::PrecisionOverflow {
                    value: self.to_string(),
                    precision: Precision::max().value(),
                },
            )?,
            Ordering::Less => downscale(self.mantissa, self.scale - scale, mode),
        };
        Self::new(mantissa, scale)
    }

    /// Like [`DecimalValue::rescale`], but fails instead of dropping nonzero digits.
    pub fn rescale_exact(&self, scale: u8) -> DecimalResult<Self> {
        let rescaled = self.rescale(scale, RoundingMode::TowardZero)?;
        if rescaled.cmp(self) == Ordering::Equal {
            Ok(rescaled)
        } else {
            Err(DecimalError::RoundingError {
                error: format!("{self} has more than {scale} fractional digits"),
            })
        }
    }

    /// Fails with `PrecisionOverflow` when the mantissa needs more than `precision` digits.
    pub fn validate_precision(&self, precision: Precision) -> DecimalResult<()> {
        if self.digit_count() > precision.value() {
            Err(DecimalError::PrecisionOverflow {
                value: self.to_string(),
                precision: precision.value(),
            })
        } else {
            Ok(())
        }
    }

    /// The nearest `f64`.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        to_f64(self.mantissa, self.scale)
    }

    /// Renders the value with explicit formatting options.
    #[must_use]
    pub fn format(&self, options: &DecimalFormatOptions) -> String {
        format_decimal(self.mantissa, self.scale, options)
    }

    /// The same value with trailing fractional zeros removed from the mantissa.
    fn normalized(&self) -> (i128, u8) {
        let (mut mantissa, mut scale) = (self.mantissa, self.scale);
        while scale > 0 && mantissa % 10 == 0 {
            mantissa /= 10;
            scale -= 1;
        }
        (mantissa, scale)
    }
}

impl PartialEq for DecimalValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DecimalValue {}

impl PartialOrd for DecimalValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DecimalValue {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_rescaled(self.mantissa, self.scale, other.mantissa, other.scale)
    }
}

impl Hash for DecimalValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl From<i64> for DecimalValue {
    fn from(value: i64) -> Self {
        Self {
            mantissa: value.into(),
            scale: 0,
        }
    }
}

impl TryFrom<&IntermediateDecimal> for DecimalValue {
    type Error = DecimalError;

    /// Keeps the scale the literal was written with.
    fn try_from(literal: &IntermediateDecimal) -> Result<Self, Self::Error> {
        let scale = literal.scale();
        if scale > MAX_SUPPORTED_SCALE {
            return Err(DecimalError::InvalidScale {
                scale: scale.to_string(),
            });
        }
        let mantissa = try_convert_intermediate_decimal_to_mantissa(literal, scale, false)?;
        Self::new(mantissa, scale)
    }
}

impl FromStr for DecimalValue {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(&IntermediateDecimal::from_str(s)?)
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(&DecimalFormatOptions::default()))
    }
}

#[derive(Deserialize)]
struct RawDecimalValue {
    mantissa: i128,
    scale: u8,
}

// Deserialization goes through `DecimalValue::new` so that the scale bound holds
impl<'de> Deserialize<'de> for DecimalValue {
    fn deserialize<D>(deserializer: D) -> Result<DecimalValue, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawDecimalValue::deserialize(deserializer)?;
        DecimalValue::new(raw.mantissa, raw.scale).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::hash::{BuildHasher, BuildHasherDefault};

    fn decimal(s: &str) -> DecimalValue {
        s.parse().unwrap()
    }

    #[test]
    fn we_can_parse_and_display_decimal_values() {
        let value = decimal("-123.450");
        assert_eq!(value.mantissa(), -123_450);
        assert_eq!(value.scale(), 3);
        assert_eq!(value.to_string(), "-123.450");
        assert_eq!(decimal("7").scale(), 0);
    }

    #[test]
    fn we_cannot_parse_malformed_decimal_values() {
        assert!(matches!(
            "1.2e3".parse::<DecimalValue>(),
            Err(DecimalError::ParseError { .. })
        ));
        assert!(matches!(
            "170141183460469231731687303715884105728".parse::<DecimalValue>(),
            Err(DecimalError::PrecisionOverflow { .. })
        ));
        assert!(matches!(
            "0.000000000000000000000000000000000000001".parse::<DecimalValue>(),
            Err(DecimalError::InvalidScale { .. })
        ));
    }

    #[test]
    fn we_cannot_create_values_with_scale_above_38() {
        assert!(DecimalValue::new(1, 38).is_ok());
        assert_eq!(
            DecimalValue::new(1, 39),
            Err(DecimalError::InvalidScale {
                scale: "39".to_string()
            })
        );
    }

    #[test]
    fn we_can_compare_values_regardless_of_scale() {
        assert_eq!(decimal("0.1"), decimal("0.10"));
        assert!(decimal("1.111") < decimal("2.22"));
        assert!(decimal("-0.5") < decimal("0"));
        assert_eq!(decimal("3.3").max(decimal("3.29")), decimal("3.30"));
    }

    #[test]
    fn equal_values_hash_equally() {
        let state = BuildHasherDefault::<ahash::AHasher>::default();
        assert_eq!(
            state.hash_one(decimal("0.1")),
            state.hash_one(decimal("0.100"))
        );
        assert_eq!(state.hash_one(decimal("0")), state.hash_one(decimal("0.00")));
    }

    #[test]
    fn we_can_rescale_values() {
        let value = decimal("0.125");
        assert_eq!(
            value.rescale(2, RoundingMode::HalfEven).unwrap().mantissa(),
            12
        );
        assert_eq!(
            decimal("0.135")
                .rescale(2, RoundingMode::HalfEven)
                .unwrap()
                .mantissa(),
            14
        );
        assert_eq!(value.rescale(5, RoundingMode::HalfEven).unwrap().mantissa(), 12_500);
        assert!(matches!(
            decimal("1").rescale(39, RoundingMode::HalfEven),
            Err(DecimalError::InvalidScale { .. })
        ));
        assert!(matches!(
            decimal("100").rescale(37, RoundingMode::HalfEven),
            Err(DecimalError::PrecisionOverflow { .. })
        ));
    }

    #[test]
    fn we_cannot_rescale_exactly_when_digits_would_be_lost() {
        assert_eq!(decimal("1.50").rescale_exact(1).unwrap().mantissa(), 15);
        assert!(matches!(
            decimal("1.55").rescale_exact(1),
            Err(DecimalError::RoundingError { .. })
        ));
    }

    #[test]
    fn we_can_validate_precision() {
        let precision = Precision::new(5).unwrap();
        assert!(decimal("123.45").validate_precision(precision).is_ok());
        assert_eq!(
            decimal("1234.56").validate_precision(precision),
            Err(DecimalError::PrecisionOverflow {
                value: "1234.56".to_string(),
                precision: 5
            })
        );
    }

    #[test]
    fn we_can_convert_values_to_f64() {
        assert!((decimal("2277.5825").to_f64() - 2277.5825).abs() < 1e-9);
        assert!((decimal("-0.01").to_f64() + 0.01).abs() < 1e-12);
    }

    #[test]
    fn we_cannot_deserialize_values_with_an_invalid_scale() {
        let value: DecimalValue = serde_json::from_str(r#"{"mantissa":15,"scale":1}"#).unwrap();
        assert_eq!(value, decimal("1.5"));
        assert!(serde_json::from_str::<DecimalValue>(r#"{"mantissa":15,"scale":40}"#).is_err());
        let json = serde_json::to_string(&decimal("-2.50")).unwrap();
        assert_eq!(json, r#"{"mantissa":-250,"scale":2}"#);
    }
}
