//! Casts between decimal columns and the other column types.
use super::{
    decimal_inference::infer_cast_decimal_type, ColumnOperationError, ColumnOperationResult,
    ColumnType, DecimalType, OwnedColumn, OwnedNullableColumn,
};
use crate::base::math::{
    decimal::{try_convert_intermediate_decimal_to_mantissa, DecimalError, DecimalResult},
    decimal_format::{format_decimal, DecimalFormatOptions},
    rescale::{checked_upscale, downscale, to_f64, RoundingMode},
    DecimalValue,
};
use decimal_engine_parser::intermediate_decimal::IntermediateDecimal;
use serde::{Deserialize, Serialize};

/// Options for [`OwnedNullableColumn::try_cast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastOptions {
    /// Fail the whole cast on the first row that cannot be converted. When unset such
    /// rows become null instead.
    pub strict: bool,
}

impl Default for CastOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl CastOptions {
    /// Options that turn unconvertible rows into nulls.
    #[must_use]
    pub fn non_strict() -> Self {
        Self { strict: false }
    }
}

/// Converts the present rows of `values` one at a time.
fn cast_rows<S, T, F>(
    values: &[S],
    presence: &[bool],
    to_type: ColumnType,
    options: CastOptions,
    convert: F,
) -> ColumnOperationResult<(Vec<T>, Vec<bool>)>
where
    T: Default,
    F: Fn(&S) -> DecimalResult<T>,
{
    let mut result = Vec::with_capacity(values.len());
    let mut result_presence = presence.to_vec();
    for (row, (value, present)) in values.iter().zip(presence).enumerate() {
        if !present {
            result.push(T::default());
            continue;
        }
        match convert(value) {
            Ok(value) => result.push(value),
            Err(source) if options.strict => {
                return Err(ColumnOperationError::RowConversionError { row, source })
            }
            Err(source) => {
                tracing::warn!(row, %to_type, %source, "cast failed, row set to null");
                result.push(T::default());
                result_presence[row] = false;
            }
        }
    }
    Ok((result, result_presence))
}

fn upscale_integer(value: i128, decimal_type: DecimalType) -> DecimalResult<i128> {
    let mantissa = checked_upscale(value, decimal_type.scale()).ok_or_else(|| {
        DecimalError::PrecisionOverflow {
            value: value.to_string(),
            precision: decimal_type.effective_precision().value(),
        }
    })?;
    decimal_type.validate_mantissa(mantissa)?;
    Ok(mantissa)
}

fn convert_literal(
    literal: &IntermediateDecimal,
    decimal_type: DecimalType,
    round: bool,
) -> DecimalResult<i128> {
    let mantissa = try_convert_intermediate_decimal_to_mantissa(literal, decimal_type.scale(), round)?;
    decimal_type.validate_mantissa(mantissa)?;
    Ok(mantissa)
}

impl OwnedNullableColumn {
    /// Casts the column to `to_type`.
    ///
    /// Every cast into or out of a decimal type is supported except decimal to boolean.
    /// Casting a column to its own type returns a copy. Other pairs are a `CastingError`.
    #[tracing::instrument(name = "OwnedNullableColumn::try_cast", level = "debug", skip(self))]
    pub fn try_cast(&self, to_type: ColumnType, options: CastOptions) -> ColumnOperationResult<Self> {
        if self.column_type() == to_type {
            return Ok(self.clone());
        }
        let presence = self.presence_or_all_present();
        let values = match (&self.values, to_type) {
            (_, ColumnType::Decimal(decimal_type)) => {
                return self.try_cast_to_decimal(Some(decimal_type), options)
            }
            (OwnedColumn::Decimal(decimal_type, values), ColumnType::Float64) => {
                let scale = decimal_type.scale();
                OwnedColumn::Float64(values.iter().map(|value| to_f64(*value, scale)).collect())
            }
            (OwnedColumn::Decimal(decimal_type, values), ColumnType::BigInt) => {
                let scale = decimal_type.scale();
                let (values, presence) = cast_rows(values, &presence, to_type, options, |value| {
                    i64::try_from(downscale(*value, scale, RoundingMode::HalfEven)).map_err(|_| {
                        DecimalError::OutOfRange {
                            value: format_decimal(*value, scale, &DecimalFormatOptions::default()),
                            target: to_type.to_string(),
                        }
                    })
                })?;
                return Ok(Self::from_parts(OwnedColumn::BigInt(values), presence));
            }
            (OwnedColumn::Decimal(decimal_type, values), ColumnType::VarChar) => {
                let scale = decimal_type.scale();
                let options = DecimalFormatOptions::default();
                OwnedColumn::VarChar(
                    values
                        .iter()
                        .map(|value| format_decimal(*value, scale, &options))
                        .collect(),
                )
            }
            _ => {
                return Err(ColumnOperationError::CastingError {
                    from_type: self.column_type(),
                    to_type,
                })
            }
        };
        Ok(Self {
            values,
            presence: self.presence.clone(),
        })
    }

    /// Casts the column to a decimal type.
    ///
    /// Without a target the type is inferred: integers, floats and booleans use scale 0,
    /// decimals keep their type and text uses its widest fractional part. Floats and
    /// decimals are rounded half-to-even to the target scale. Text must not carry more
    /// fractional digits than the target scale.
    pub fn try_cast_to_decimal(
        &self,
        target: Option<DecimalType>,
        options: CastOptions,
    ) -> ColumnOperationResult<Self> {
        let decimal_type = target.unwrap_or_else(|| infer_cast_decimal_type(self));
        let to_type = ColumnType::Decimal(decimal_type);
        let presence = self.presence_or_all_present();
        let (values, presence) = match &self.values {
            OwnedColumn::Boolean(values) => cast_rows(values, &presence, to_type, options, |value| {
                upscale_integer(i128::from(*value), decimal_type)
            })?,
            OwnedColumn::BigInt(values) => cast_rows(values, &presence, to_type, options, |value| {
                upscale_integer(i128::from(*value), decimal_type)
            })?,
            OwnedColumn::Float64(values) => {
                cast_rows(values, &presence, to_type, options, |value| {
                    convert_literal(
                        &IntermediateDecimal::try_from_f64_shortest(*value)?,
                        decimal_type,
                        true,
                    )
                })?
            }
            OwnedColumn::VarChar(values) => {
                cast_rows(values, &presence, to_type, options, |value| {
                    convert_literal(&value.parse::<IntermediateDecimal>()?, decimal_type, false)
                })?
            }
            OwnedColumn::Decimal(source_type, values) => {
                cast_rows(values, &presence, to_type, options, |value| {
                    let mantissa = DecimalValue::new(*value, source_type.scale())?
                        .rescale(decimal_type.scale(), RoundingMode::HalfEven)?
                        .mantissa();
                    decimal_type.validate_mantissa(mantissa)?;
                    Ok(mantissa)
                })?
            }
        };
        Ok(Self::from_parts(
            OwnedColumn::Decimal(decimal_type, values),
            presence,
        ))
    }
}
