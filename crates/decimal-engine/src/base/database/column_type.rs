use crate::base::math::{
    decimal::{DecimalError, DecimalResult},
    rescale::MAX_SUPPORTED_SCALE,
    DecimalValue, Precision, MAX_SUPPORTED_PRECISION,
};
use core::fmt::{self, Display, Formatter};
use serde::{Deserialize, Deserializer, Serialize};

/// The fixed-point type shared by every value of a decimal column.
///
/// `precision = None` leaves the number of digits unconstrained up to the supported
/// maximum. Only the scale takes part in arithmetic promotion; the precision is a
/// validation bound. The default is an unconstrained type with scale zero.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Default)]
pub struct DecimalType {
    precision: Option<Precision>,
    scale: u8,
}

impl DecimalType {
    /// Creates a decimal type with an optional precision and a scale of at most 38.
    ///
    /// A constrained type must not have more fractional digits than total digits.
    pub fn new(precision: Option<Precision>, scale: u8) -> DecimalResult<Self> {
        if scale > MAX_SUPPORTED_SCALE {
            return Err(DecimalError::InvalidScale {
                scale: scale.to_string(),
            });
        }
        if let Some(precision) = precision.filter(|precision| scale > precision.value()) {
            return Err(DecimalError::InvalidScale {
                scale: format!("{scale} exceeds precision {}", precision.value()),
            });
        }
        Ok(Self { precision, scale })
    }

    /// Creates a decimal type from a raw precision, e.g. `DecimalType::try_with_precision(20, 10)`.
    ///
    /// A precision above 38 digits is a `PrecisionOverflow`; a zero precision is an
    /// `InvalidPrecision`.
    pub fn try_with_precision(precision: u8, scale: u8) -> DecimalResult<Self> {
        if precision > MAX_SUPPORTED_PRECISION {
            return Err(DecimalError::PrecisionOverflow {
                value: format!("DECIMAL({precision}, {scale})"),
                precision: MAX_SUPPORTED_PRECISION,
            });
        }
        Self::new(Some(Precision::new(precision)?), scale)
    }

    /// A decimal type without a precision bound.
    pub fn unconstrained(scale: u8) -> DecimalResult<Self> {
        Self::new(None, scale)
    }

    /// The declared precision, if any.
    #[must_use]
    pub fn precision(&self) -> Option<Precision> {
        self.precision
    }

    /// The declared precision, or the maximum when unconstrained.
    #[must_use]
    pub fn effective_precision(&self) -> Precision {
        self.precision.unwrap_or_else(Precision::max)
    }

    /// The number of fractional digits.
    #[must_use]
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Checks that the mantissa `value` fits this type's precision.
    pub fn validate_mantissa(&self, value: i128) -> DecimalResult<()> {
        DecimalValue::new(value, self.scale)?.validate_precision(self.effective_precision())
    }
}

#[derive(Deserialize)]
struct RawDecimalType {
    precision: Option<Precision>,
    scale: u8,
}

impl<'de> Deserialize<'de> for DecimalType {
    fn deserialize<D>(deserializer: D) -> Result<DecimalType, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawDecimalType::deserialize(deserializer)?;
        DecimalType::new(raw.precision, raw.scale).map_err(serde::de::Error::custom)
    }
}

impl Display for DecimalType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.precision {
            Some(precision) => write!(f, "DECIMAL({}, {})", precision.value(), self.scale),
            None => write!(f, "DECIMAL(*, {})", self.scale),
        }
    }
}

/// Represents the supported data types of a column in the decimal engine.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize, Copy)]
pub enum ColumnType {
    /// Mapped to bool
    #[serde(alias = "BOOLEAN", alias = "boolean")]
    Boolean,
    /// Mapped to i64
    #[serde(alias = "BIGINT", alias = "bigint")]
    BigInt,
    /// Mapped to f64
    #[serde(alias = "FLOAT64", alias = "float64")]
    Float64,
    /// Mapped to String
    #[serde(alias = "VARCHAR", alias = "varchar")]
    VarChar,
    /// Mapped to i128 mantissas sharing one [`DecimalType`]
    #[serde(alias = "DECIMAL", alias = "decimal")]
    Decimal(DecimalType),
}

impl ColumnType {
    /// Returns true if this column is numeric and false otherwise
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::BigInt | ColumnType::Float64 | ColumnType::Decimal(_)
        )
    }

    /// Returns true if this column holds exact numbers, i.e. integers or decimals
    #[must_use]
    pub fn is_exact_numeric(&self) -> bool {
        matches!(self, ColumnType::BigInt | ColumnType::Decimal(_))
    }

    /// The scale exact numeric columns take part in promotion with. Integers count as scale 0.
    #[must_use]
    pub fn scale(&self) -> Option<u8> {
        match self {
            ColumnType::BigInt => Some(0),
            ColumnType::Decimal(decimal_type) => Some(decimal_type.scale()),
            ColumnType::Boolean | ColumnType::Float64 | ColumnType::VarChar => None,
        }
    }

    /// The decimal type, for decimal columns only
    #[must_use]
    pub fn decimal_type(&self) -> Option<DecimalType> {
        match self {
            ColumnType::Decimal(decimal_type) => Some(*decimal_type),
            _ => None,
        }
    }
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Boolean => write!(f, "BOOLEAN"),
            ColumnType::BigInt => write!(f, "BIGINT"),
            ColumnType::Float64 => write!(f, "FLOAT64"),
            ColumnType::VarChar => write!(f, "VARCHAR"),
            ColumnType::Decimal(decimal_type) => write!(f, "{decimal_type}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn we_can_create_decimal_types() {
        let decimal_type = DecimalType::try_with_precision(20, 10).unwrap();
        assert_eq!(decimal_type.precision().unwrap().value(), 20);
        assert_eq!(decimal_type.scale(), 10);
        assert_eq!(decimal_type.to_string(), "DECIMAL(20, 10)");
        let unconstrained = DecimalType::unconstrained(4).unwrap();
        assert_eq!(unconstrained.effective_precision(), Precision::max());
        assert_eq!(unconstrained.to_string(), "DECIMAL(*, 4)");
    }

    #[test]
    fn we_cannot_create_decimal_types_beyond_the_limits() {
        assert_eq!(
            DecimalType::try_with_precision(76, 38),
            Err(DecimalError::PrecisionOverflow {
                value: "DECIMAL(76, 38)".to_string(),
                precision: 38
            })
        );
        assert!(matches!(
            DecimalType::try_with_precision(39, 2),
            Err(DecimalError::PrecisionOverflow { precision: 38, .. })
        ));
        assert!(matches!(
            DecimalType::try_with_precision(0, 0),
            Err(DecimalError::InvalidPrecision { .. })
        ));
        assert!(DecimalType::try_with_precision(38, 38).is_ok());
        assert!(matches!(
            DecimalType::unconstrained(39),
            Err(DecimalError::InvalidScale { .. })
        ));
    }

    #[test]
    fn we_cannot_create_decimal_types_with_a_scale_above_the_precision() {
        assert_eq!(
            DecimalType::try_with_precision(2, 5),
            Err(DecimalError::InvalidScale {
                scale: "5 exceeds precision 2".to_string()
            })
        );
        assert!(DecimalType::try_with_precision(5, 5).is_ok());
        assert!(DecimalType::unconstrained(5).is_ok());
        assert!(serde_json::from_str::<DecimalType>(r#"{"precision":2,"scale":5}"#).is_err());
    }

    #[test]
    fn we_can_validate_mantissas_against_a_precision() {
        let decimal_type = DecimalType::try_with_precision(4, 2).unwrap();
        assert!(decimal_type.validate_mantissa(9999).is_ok());
        assert!(decimal_type.validate_mantissa(-9999).is_ok());
        assert!(matches!(
            decimal_type.validate_mantissa(10_000),
            Err(DecimalError::PrecisionOverflow { precision: 4, .. })
        ));
    }

    #[test]
    fn we_can_get_the_promotion_scale_of_column_types() {
        assert_eq!(ColumnType::BigInt.scale(), Some(0));
        assert_eq!(
            ColumnType::Decimal(DecimalType::unconstrained(3).unwrap()).scale(),
            Some(3)
        );
        assert_eq!(ColumnType::Float64.scale(), None);
        assert!(ColumnType::Float64.is_numeric());
        assert!(!ColumnType::Float64.is_exact_numeric());
        assert!(!ColumnType::VarChar.is_numeric());
    }

    #[test]
    fn we_can_deserialize_decimal_types() {
        let decimal_type: DecimalType =
            serde_json::from_str(r#"{"precision":10,"scale":2}"#).unwrap();
        assert_eq!(decimal_type, DecimalType::try_with_precision(10, 2).unwrap());
        let column_type: ColumnType =
            serde_json::from_str(r#"{"Decimal":{"precision":null,"scale":3}}"#).unwrap();
        assert_eq!(
            column_type,
            ColumnType::Decimal(DecimalType::unconstrained(3).unwrap())
        );
        assert!(serde_json::from_str::<DecimalType>(r#"{"precision":76,"scale":2}"#).is_err());
        assert!(serde_json::from_str::<DecimalType>(r#"{"precision":10,"scale":40}"#).is_err());
        let column_type: ColumnType = serde_json::from_str(r#""bigint""#).unwrap();
        assert_eq!(column_type, ColumnType::BigInt);
    }
}
