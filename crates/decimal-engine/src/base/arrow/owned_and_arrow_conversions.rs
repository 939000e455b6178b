//! This module provides `TryFrom` implementations to go between arrow arrays and nullable columns.
//! The mapping is as follows:
//! Boolean <-> Boolean
//! BigInt <-> Int64
//! Float64 <-> Float64
//! VarChar <-> Utf8
//! Decimal(p, s) <-> Decimal128(p, s)
//! Decimal(p, s) <- Decimal256(p, s) when p <= 38
//!
//! Unconstrained decimal columns are written with precision 38. Nulls map to the
//! arrow validity bitmap in both directions.
use crate::base::{
    database::{ColumnOperationError, DecimalType, OwnedColumn, OwnedNullableColumn},
    math::decimal::DecimalError,
};
use arrow::{
    array::{
        Array, ArrayRef, BooleanArray, Decimal128Array, Decimal256Array, Float64Array,
        Int64Array, StringArray,
    },
    datatypes::DataType,
    error::ArrowError,
};
use snafu::Snafu;
use std::sync::Arc;

#[derive(Snafu, Debug)]
#[non_exhaustive]
/// Errors caused by conversions between Arrow arrays and nullable columns.
pub enum OwnedArrowConversionError {
    /// This error occurs when trying to convert from an unsupported arrow type.
    #[snafu(display(
        "unsupported type: attempted conversion from ArrayRef of type {data_type} to OwnedNullableColumn"
    ))]
    UnsupportedType {
        /// The arrow type of the array
        data_type: DataType,
    },
    /// This error occurs when arrow rejects the array being built.
    #[snafu(transparent)]
    Arrow {
        /// The underlying arrow error
        source: ArrowError,
    },
    /// This error occurs when the decimal type of the array is not representable.
    #[snafu(transparent)]
    InvalidDecimal {
        /// The underlying decimal error
        source: DecimalError,
    },
    /// This error occurs when a value does not fit the decimal type of the array.
    #[snafu(transparent)]
    InvalidColumn {
        /// The underlying column error
        source: ColumnOperationError,
    },
}

fn to_options<T: Clone>(values: &[T], column: &OwnedNullableColumn) -> Vec<Option<T>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| column.is_present(index).then(|| value.clone()))
        .collect()
}

fn from_options<T: Default>(values: impl Iterator<Item = Option<T>>) -> (Vec<T>, Vec<bool>) {
    values
        .map(|value| {
            let present = value.is_some();
            (value.unwrap_or_default(), present)
        })
        .unzip()
}

fn downcast<T: Array + 'static>(array: &ArrayRef) -> Result<&T, OwnedArrowConversionError> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| OwnedArrowConversionError::UnsupportedType {
            data_type: array.data_type().clone(),
        })
}

/// Negative arrow scales have no decimal column counterpart.
fn try_decimal_type(
    data_type: &DataType,
    precision: u8,
    scale: i8,
) -> Result<DecimalType, OwnedArrowConversionError> {
    let scale = u8::try_from(scale).map_err(|_| OwnedArrowConversionError::UnsupportedType {
        data_type: data_type.clone(),
    })?;
    Ok(DecimalType::try_with_precision(precision, scale)?)
}

impl TryFrom<&OwnedNullableColumn> for ArrayRef {
    type Error = OwnedArrowConversionError;
    fn try_from(value: &OwnedNullableColumn) -> Result<Self, Self::Error> {
        Ok(match &value.values {
            OwnedColumn::Boolean(col) => Arc::new(BooleanArray::from(to_options(col, value))),
            OwnedColumn::BigInt(col) => Arc::new(Int64Array::from(to_options(col, value))),
            OwnedColumn::Float64(col) => Arc::new(Float64Array::from(to_options(col, value))),
            OwnedColumn::VarChar(col) => Arc::new(StringArray::from(to_options(col, value))),
            OwnedColumn::Decimal(decimal_type, col) => {
                let scale = i8::try_from(decimal_type.scale()).map_err(|_| {
                    DecimalError::InvalidScale {
                        scale: decimal_type.scale().to_string(),
                    }
                })?;
                Arc::new(
                    Decimal128Array::from(to_options(col, value))
                        .with_precision_and_scale(decimal_type.effective_precision().value(), scale)?,
                )
            }
        })
    }
}

impl TryFrom<OwnedNullableColumn> for ArrayRef {
    type Error = OwnedArrowConversionError;
    fn try_from(value: OwnedNullableColumn) -> Result<Self, Self::Error> {
        Self::try_from(&value)
    }
}

impl TryFrom<ArrayRef> for OwnedNullableColumn {
    type Error = OwnedArrowConversionError;
    fn try_from(value: ArrayRef) -> Result<Self, Self::Error> {
        Self::try_from(&value)
    }
}

impl TryFrom<&ArrayRef> for OwnedNullableColumn {
    type Error = OwnedArrowConversionError;
    #[tracing::instrument(name = "OwnedNullableColumn::try_from_arrow", level = "debug", skip_all)]
    fn try_from(value: &ArrayRef) -> Result<Self, Self::Error> {
        match value.data_type() {
            DataType::Boolean => {
                let (values, presence) = from_options(downcast::<BooleanArray>(value)?.iter());
                Ok(Self::from_parts(OwnedColumn::Boolean(values), presence))
            }
            DataType::Int64 => {
                let (values, presence) = from_options(downcast::<Int64Array>(value)?.iter());
                Ok(Self::from_parts(OwnedColumn::BigInt(values), presence))
            }
            DataType::Float64 => {
                let (values, presence) = from_options(downcast::<Float64Array>(value)?.iter());
                Ok(Self::from_parts(OwnedColumn::Float64(values), presence))
            }
            DataType::Utf8 => {
                let (values, presence) = from_options(
                    downcast::<StringArray>(value)?
                        .iter()
                        .map(|value| value.map(String::from)),
                );
                Ok(Self::from_parts(OwnedColumn::VarChar(values), presence))
            }
            DataType::Decimal128(precision, scale) => {
                let decimal_type = try_decimal_type(value.data_type(), *precision, *scale)?;
                Ok(Self::try_from_decimal_options(
                    decimal_type,
                    downcast::<Decimal128Array>(value)?.iter().collect(),
                )?)
            }
            DataType::Decimal256(precision, scale) => {
                let decimal_type = try_decimal_type(value.data_type(), *precision, *scale)?;
                let values = downcast::<Decimal256Array>(value)?
                    .iter()
                    .map(|value| {
                        value
                            .map(|value| {
                                value
                                    .to_i128()
                                    .ok_or_else(|| DecimalError::PrecisionOverflow {
                                        value: value.to_string(),
                                        precision: *precision,
                                    })
                            })
                            .transpose()
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::try_from_decimal_options(decimal_type, values)?)
            }
            data_type => Err(OwnedArrowConversionError::UnsupportedType {
                data_type: data_type.clone(),
            }),
        }
    }
}
