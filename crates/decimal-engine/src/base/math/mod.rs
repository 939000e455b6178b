/// Errors of decimal construction and rescaling.
pub mod decimal;

mod precision;
pub use precision::{InvalidPrecisionError, Precision, MAX_SUPPORTED_PRECISION};

/// Power-of-ten rescaling and rounding of mantissas.
pub mod rescale;

mod decimal_value;
pub use decimal_value::DecimalValue;

/// Text rendering of decimals.
pub mod decimal_format;
