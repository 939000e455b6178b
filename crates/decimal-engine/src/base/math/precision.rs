use serde::{Deserialize, Deserializer, Serialize};
use snafu::Snafu;

#[derive(Snafu, Debug, Eq, PartialEq)]
#[snafu(display("Decimal precision is not valid: {precision}"))]
/// Decimal precision is zero or exceeds the 38 digits an `i128` mantissa can hold
pub struct InvalidPrecisionError {
    precision: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Copy, PartialOrd, Ord)]
/// limit-enforced precision
pub struct Precision(u8);

/// The largest number of significant digits a decimal can carry.
pub const MAX_SUPPORTED_PRECISION: u8 = 38;

impl Precision {
    /// Constructor for creating a Precision instance
    pub fn new(value: u8) -> Result<Self, InvalidPrecisionError> {
        if value > MAX_SUPPORTED_PRECISION || value == 0 {
            Err(InvalidPrecisionError {
                precision: value.to_string(),
            })
        } else {
            Ok(Precision(value))
        }
    }

    /// The widest precision, used when a type leaves its precision unconstrained
    #[must_use]
    pub fn max() -> Self {
        Precision(MAX_SUPPORTED_PRECISION)
    }

    /// Gets the precision as a u8 for this decimal
    #[must_use]
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i16> for Precision {
    type Error = InvalidPrecisionError;
    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Precision::new(value.try_into().map_err(|_| InvalidPrecisionError {
            precision: value.to_string(),
        })?)
    }
}

impl TryFrom<u64> for Precision {
    type Error = InvalidPrecisionError;
    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Precision::new(value.try_into().map_err(|_| InvalidPrecisionError {
            precision: value.to_string(),
        })?)
    }
}

// Deserialization goes through `Precision::new` so that out of range precisions are rejected
impl<'de> Deserialize<'de> for Precision {
    fn deserialize<D>(deserializer: D) -> Result<Precision, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Precision::new(value).map_err(serde::de::Error::custom)
    }
}
