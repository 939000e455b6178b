//! Fixed-width physical decimal buffers, as exchanged with storage formats.
//!
//! Inside the engine every decimal is an `i128` mantissa. Narrower physical widths are
//! only used at this boundary: a type is written at the smallest width that can hold its
//! precision and any width is read back into `i128`.
use super::{
    ColumnOperationError, ColumnOperationResult, ColumnType, DecimalType, OwnedColumn,
    OwnedNullableColumn,
};
use crate::base::math::{decimal::DecimalError, DecimalValue, Precision};
use serde::{Deserialize, Serialize};

/// The physical width of stored decimal mantissas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalDecimalWidth {
    /// `i32` mantissas, up to 9 digits
    Decimal32,
    /// `i64` mantissas, up to 18 digits
    Decimal64,
    /// `i128` mantissas, up to 38 digits
    Decimal128,
}

impl PhysicalDecimalWidth {
    /// The number of digits every mantissa of this width can hold.
    #[must_use]
    pub fn digit_capacity(self) -> u8 {
        match self {
            PhysicalDecimalWidth::Decimal32 => 9,
            PhysicalDecimalWidth::Decimal64 => 18,
            PhysicalDecimalWidth::Decimal128 => 38,
        }
    }

    /// The size of one mantissa in bytes.
    #[must_use]
    pub fn byte_width(self) -> usize {
        match self {
            PhysicalDecimalWidth::Decimal32 => 4,
            PhysicalDecimalWidth::Decimal64 => 8,
            PhysicalDecimalWidth::Decimal128 => 16,
        }
    }

    /// The smallest width that covers `precision`. Unconstrained types need 128 bits.
    #[must_use]
    pub fn for_precision(precision: Option<Precision>) -> Self {
        match precision.map(|precision| precision.value()) {
            Some(digits) if digits <= 9 => PhysicalDecimalWidth::Decimal32,
            Some(digits) if digits <= 18 => PhysicalDecimalWidth::Decimal64,
            _ => PhysicalDecimalWidth::Decimal128,
        }
    }
}

/// Mantissas stored at one physical width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhysicalDecimalValues {
    /// 32-bit mantissas
    Decimal32(Vec<i32>),
    /// 64-bit mantissas
    Decimal64(Vec<i64>),
    /// 128-bit mantissas
    Decimal128(Vec<i128>),
}

fn decode_le<const N: usize, T>(
    bytes: &[u8],
    from_le_bytes: fn([u8; N]) -> T,
) -> ColumnOperationResult<Vec<T>> {
    if bytes.len() % N != 0 {
        return Err(ColumnOperationError::InvalidBufferLength {
            buffer_len: bytes.len(),
            width: N,
        });
    }
    bytes
        .chunks_exact(N)
        .map(|chunk| {
            <[u8; N]>::try_from(chunk).map(from_le_bytes).map_err(|_| {
                ColumnOperationError::InvalidBufferLength {
                    buffer_len: bytes.len(),
                    width: N,
                }
            })
        })
        .collect()
}

impl PhysicalDecimalValues {
    /// Decodes a little-endian buffer of mantissas of the given width.
    pub fn from_le_bytes(width: PhysicalDecimalWidth, bytes: &[u8]) -> ColumnOperationResult<Self> {
        Ok(match width {
            PhysicalDecimalWidth::Decimal32 => Self::Decimal32(decode_le(bytes, i32::from_le_bytes)?),
            PhysicalDecimalWidth::Decimal64 => Self::Decimal64(decode_le(bytes, i64::from_le_bytes)?),
            PhysicalDecimalWidth::Decimal128 => {
                Self::Decimal128(decode_le(bytes, i128::from_le_bytes)?)
            }
        })
    }

    /// Encodes the mantissas as a little-endian buffer.
    #[must_use]
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            Self::Decimal32(values) => values.iter().flat_map(|v| v.to_le_bytes()).collect(),
            Self::Decimal64(values) => values.iter().flat_map(|v| v.to_le_bytes()).collect(),
            Self::Decimal128(values) => values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    /// The width of the stored mantissas.
    #[must_use]
    pub fn width(&self) -> PhysicalDecimalWidth {
        match self {
            Self::Decimal32(_) => PhysicalDecimalWidth::Decimal32,
            Self::Decimal64(_) => PhysicalDecimalWidth::Decimal64,
            Self::Decimal128(_) => PhysicalDecimalWidth::Decimal128,
        }
    }

    /// The number of mantissas.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Decimal32(values) => values.len(),
            Self::Decimal64(values) => values.len(),
            Self::Decimal128(values) => values.len(),
        }
    }

    /// Returns true if there are no mantissas.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The mantissas widened to `i128`.
    #[must_use]
    pub fn to_i128_values(&self) -> Vec<i128> {
        match self {
            Self::Decimal32(values) => values.iter().map(|v| i128::from(*v)).collect(),
            Self::Decimal64(values) => values.iter().map(|v| i128::from(*v)).collect(),
            Self::Decimal128(values) => values.clone(),
        }
    }
}

/// A decimal column in its physical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalDecimalColumn {
    /// The declared precision, `None` when unconstrained
    pub precision: Option<Precision>,
    /// The number of fractional digits
    pub scale: u8,
    /// The mantissas
    pub values: PhysicalDecimalValues,
    /// `false` for null rows, `None` when every row is present
    pub validity: Option<Vec<bool>>,
}

impl PhysicalDecimalColumn {
    /// Reads the column into an `i128` decimal column, validating every present row against
    /// the declared precision.
    pub fn try_to_nullable_column(&self) -> ColumnOperationResult<OwnedNullableColumn> {
        let decimal_type = DecimalType::new(self.precision, self.scale)?;
        let values = self.values.to_i128_values();
        let column = OwnedNullableColumn::with_presence(
            OwnedColumn::Decimal(decimal_type, values),
            self.validity.clone(),
        )?;
        if let OwnedColumn::Decimal(_, values) = &column.values {
            for (row, value) in values.iter().enumerate() {
                if column.is_present(row) {
                    decimal_type
                        .validate_mantissa(*value)
                        .map_err(|source| ColumnOperationError::RowConversionError { row, source })?;
                }
            }
        }
        Ok(column)
    }

    /// Writes a decimal column at the smallest width its precision allows. Null rows are
    /// written as zero.
    pub fn try_from_nullable_column(column: &OwnedNullableColumn) -> ColumnOperationResult<Self> {
        let OwnedColumn::Decimal(decimal_type, values) = &column.values else {
            return Err(ColumnOperationError::CastingError {
                from_type: column.column_type(),
                to_type: ColumnType::Decimal(DecimalType::default()),
            });
        };
        let width = PhysicalDecimalWidth::for_precision(decimal_type.precision());
        let present_values = values
            .iter()
            .enumerate()
            .map(|(row, value)| if column.is_present(row) { *value } else { 0 });
        let narrow_error = |row: usize, value: i128| ColumnOperationError::RowConversionError {
            row,
            source: DecimalValue::new(value, decimal_type.scale())
                .map_or_else(|error| error, |value| DecimalError::PrecisionOverflow {
                    value: value.to_string(),
                    precision: width.digit_capacity(),
                }),
        };
        let values = match width {
            PhysicalDecimalWidth::Decimal32 => PhysicalDecimalValues::Decimal32(
                present_values
                    .enumerate()
                    .map(|(row, value)| i32::try_from(value).map_err(|_| narrow_error(row, value)))
                    .collect::<ColumnOperationResult<_>>()?,
            ),
            PhysicalDecimalWidth::Decimal64 => PhysicalDecimalValues::Decimal64(
                present_values
                    .enumerate()
                    .map(|(row, value)| i64::try_from(value).map_err(|_| narrow_error(row, value)))
                    .collect::<ColumnOperationResult<_>>()?,
            ),
            PhysicalDecimalWidth::Decimal128 => {
                PhysicalDecimalValues::Decimal128(present_values.collect())
            }
        };
        Ok(Self {
            precision: decimal_type.precision(),
            scale: decimal_type.scale(),
            values,
            validity: column.presence.clone(),
        })
    }
}
