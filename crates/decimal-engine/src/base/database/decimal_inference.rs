//! Inference of a common fixed-point type for heterogeneous scalar input.
use super::{
    ColumnOperationError, ColumnOperationResult, ColumnType, DecimalType, LiteralValue,
    OwnedColumn, OwnedNullableColumn,
};
use crate::base::math::{
    decimal::{try_convert_intermediate_decimal_to_mantissa, DecimalError},
    rescale::MAX_SUPPORTED_SCALE,
    DecimalValue,
};
use decimal_engine_parser::intermediate_decimal::IntermediateDecimal;
use serde::{Deserialize, Serialize};

/// How permissive decimal inference is with its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InferenceMode {
    /// Floats and numeric text are accepted; digits beyond the target scale are rounded
    /// half-to-even.
    #[default]
    Lenient,
    /// Only integers and decimals are accepted and every value must be represented exactly.
    Strict,
}

/// Turns one input into an exact literal, or `None` for nulls.
fn to_intermediate_decimal(
    row: usize,
    value: &LiteralValue,
    mode: InferenceMode,
) -> ColumnOperationResult<Option<IntermediateDecimal>> {
    let parsed = match (value, mode) {
        (LiteralValue::Null, _) => return Ok(None),
        (LiteralValue::Integer(value), _) => Ok(IntermediateDecimal::from(*value)),
        (LiteralValue::Decimal(value), _) => value.to_string().parse(),
        (LiteralValue::Float(value), InferenceMode::Lenient) => {
            IntermediateDecimal::try_from_f64_shortest(*value)
        }
        (LiteralValue::VarChar(value), InferenceMode::Lenient) => value.parse(),
        (LiteralValue::Boolean(_), _)
        | (LiteralValue::Float(_) | LiteralValue::VarChar(_), InferenceMode::Strict) => {
            return Err(ColumnOperationError::CastingError {
                from_type: value.column_type().unwrap_or(ColumnType::Boolean),
                to_type: ColumnType::Decimal(DecimalType::default()),
            })
        }
    };
    parsed.map(Some).map_err(|error| ColumnOperationError::RowConversionError {
        row,
        source: DecimalError::from(error),
    })
}

fn to_intermediate_decimals(
    values: &[LiteralValue],
    mode: InferenceMode,
) -> ColumnOperationResult<Vec<Option<IntermediateDecimal>>> {
    values
        .iter()
        .enumerate()
        .map(|(row, value)| to_intermediate_decimal(row, value, mode))
        .collect()
}

/// The type every literal is stored with: the target when given, otherwise the widest
/// natural scale.
fn infer_from_literals(
    literals: &[Option<IntermediateDecimal>],
    target: Option<DecimalType>,
    mode: InferenceMode,
) -> ColumnOperationResult<DecimalType> {
    if let Some(target) = target {
        return Ok(target);
    }
    let mut scale = 0;
    for (row, literal) in literals.iter().enumerate() {
        let Some(literal) = literal else { continue };
        if literal.scale() > MAX_SUPPORTED_SCALE && mode == InferenceMode::Strict {
            return Err(ColumnOperationError::RowConversionError {
                row,
                source: DecimalError::InvalidScale {
                    scale: literal.scale().to_string(),
                },
            });
        }
        scale = scale.max(literal.scale().min(MAX_SUPPORTED_SCALE));
    }
    Ok(DecimalType::unconstrained(scale)?)
}

/// Infers the [`DecimalType`] that represents every non-null value.
///
/// The scale is the largest number of fractional digits among the inputs, integers
/// counting as zero, unless `target` fixes the type. All-null or empty input yields an
/// unconstrained type with scale zero.
pub fn infer_decimal_type(
    values: &[LiteralValue],
    target: Option<DecimalType>,
    mode: InferenceMode,
) -> ColumnOperationResult<DecimalType> {
    infer_from_literals(&to_intermediate_decimals(values, mode)?, target, mode)
}

/// Builds a nullable decimal column from scalar input, inferring its type.
///
/// With a target type every value is validated against its precision. In
/// [`InferenceMode::Strict`] a value that would lose digits at the target scale is a
/// `RoundingError`; in [`InferenceMode::Lenient`] it is rounded half-to-even.
#[tracing::instrument(
    name = "decimal_inference::try_decimal_column_from_literals",
    level = "debug",
    skip_all
)]
pub fn try_decimal_column_from_literals(
    values: &[LiteralValue],
    target: Option<DecimalType>,
    mode: InferenceMode,
) -> ColumnOperationResult<OwnedNullableColumn> {
    let literals = to_intermediate_decimals(values, mode)?;
    let decimal_type = infer_from_literals(&literals, target, mode)?;
    tracing::debug!(
        scale = decimal_type.scale(),
        precision = ?decimal_type.precision(),
        rows = values.len(),
        "inferred decimal type"
    );
    let precision = decimal_type.effective_precision();
    let mantissas = literals
        .iter()
        .enumerate()
        .map(|(row, literal)| {
            literal
                .as_ref()
                .map(|literal| {
                    try_convert_intermediate_decimal_to_mantissa(
                        literal,
                        decimal_type.scale(),
                        mode == InferenceMode::Lenient,
                    )
                    .and_then(|mantissa| {
                        DecimalValue::new(mantissa, decimal_type.scale())?
                            .validate_precision(precision)?;
                        Ok(mantissa)
                    })
                    .map_err(|source| ColumnOperationError::RowConversionError { row, source })
                })
                .transpose()
        })
        .collect::<ColumnOperationResult<Vec<_>>>()?;
    OwnedNullableColumn::try_from_decimal_options(decimal_type, mantissas)
}

/// The decimal type a column is cast to when no type is requested.
///
/// Integer, float and boolean columns use scale 0, decimal columns keep their type and
/// text columns use the largest number of fractional digits among their parseable rows.
#[must_use]
pub fn infer_cast_decimal_type(column: &OwnedNullableColumn) -> DecimalType {
    match &column.values {
        OwnedColumn::Decimal(decimal_type, _) => *decimal_type,
        OwnedColumn::VarChar(values) => {
            let scale = values
                .iter()
                .enumerate()
                .filter(|(row, _)| column.is_present(*row))
                .filter_map(|(_, value)| value.parse::<IntermediateDecimal>().ok())
                .map(|literal| literal.scale().min(MAX_SUPPORTED_SCALE))
                .max()
                .unwrap_or(0);
            DecimalType::unconstrained(scale).unwrap_or_default()
        }
        OwnedColumn::Boolean(_) | OwnedColumn::BigInt(_) | OwnedColumn::Float64(_) => {
            DecimalType::default()
        }
    }
}
