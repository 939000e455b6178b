use super::{
    ColumnOperationError, ColumnOperationResult, ColumnType, DecimalType, OwnedColumn,
    OwnedNullableColumn,
};
use crate::base::math::{
    decimal::{try_convert_intermediate_decimal_to_mantissa, DecimalError},
    rescale::checked_upscale,
    DecimalValue,
};
use decimal_engine_parser::intermediate_decimal::IntermediateDecimal;
use serde::{Deserialize, Serialize};

/// A single scalar value, as supplied by a user or produced by a reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    /// Null
    Null,
    /// Boolean literals
    Boolean(bool),
    /// Integer literals, bound to the scale of the operand they meet
    Integer(i128),
    /// Decimal literals, which keep their own scale
    Decimal(DecimalValue),
    /// Float literals, bound to the scale of the operand they meet
    Float(f64),
    /// String literals
    VarChar(String),
}

impl LiteralValue {
    /// The type of the literal on its own, `None` for nulls.
    #[must_use]
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            LiteralValue::Null => None,
            LiteralValue::Boolean(_) => Some(ColumnType::Boolean),
            LiteralValue::Integer(value) => Some(if i64::try_from(*value).is_ok() {
                ColumnType::BigInt
            } else {
                ColumnType::Decimal(DecimalType::unconstrained(0).ok()?)
            }),
            LiteralValue::Decimal(value) => Some(ColumnType::Decimal(
                DecimalType::unconstrained(value.scale()).ok()?,
            )),
            LiteralValue::Float(_) => Some(ColumnType::Float64),
            LiteralValue::VarChar(_) => Some(ColumnType::VarChar),
        }
    }

    /// Returns true for [`LiteralValue::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, LiteralValue::Null)
    }

    /// Materializes the literal as a one-row column that can meet an operand of type `other`.
    ///
    /// Integer and float literals next to a decimal operand become decimals at that operand's
    /// scale, floats rounded half-to-even. Decimal literals keep their scale. Nulls take the
    /// type of the other operand.
    #[allow(clippy::cast_precision_loss)]
    pub fn to_operand_column(
        &self,
        other: Option<ColumnType>,
    ) -> ColumnOperationResult<OwnedNullableColumn> {
        let other_decimal = other.and_then(|column_type| column_type.decimal_type());
        let values = match (self, other_decimal) {
            (LiteralValue::Null, _) => {
                return Ok(OwnedNullableColumn::nulls(
                    other.unwrap_or(ColumnType::BigInt),
                    1,
                ))
            }
            (LiteralValue::Integer(value), Some(decimal_type)) => {
                let mantissa = checked_upscale(*value, decimal_type.scale()).ok_or_else(|| {
                    ColumnOperationError::IntegerOverflow {
                        error: format!("{value} does not fit at scale {}", decimal_type.scale()),
                    }
                })?;
                OwnedColumn::Decimal(DecimalType::unconstrained(decimal_type.scale())?, vec![mantissa])
            }
            (LiteralValue::Integer(value), None) if other == Some(ColumnType::Float64) => {
                OwnedColumn::Float64(vec![*value as f64])
            }
            (LiteralValue::Integer(value), None) => match i64::try_from(*value) {
                Ok(value) => OwnedColumn::BigInt(vec![value]),
                Err(_) => OwnedColumn::Decimal(DecimalType::unconstrained(0)?, vec![*value]),
            },
            (LiteralValue::Float(value), Some(decimal_type)) => {
                let literal = IntermediateDecimal::try_from_f64_shortest(*value)
                    .map_err(DecimalError::from)?;
                let mantissa =
                    try_convert_intermediate_decimal_to_mantissa(&literal, decimal_type.scale(), true)?;
                OwnedColumn::Decimal(DecimalType::unconstrained(decimal_type.scale())?, vec![mantissa])
            }
            (LiteralValue::Float(value), None) => OwnedColumn::Float64(vec![*value]),
            (LiteralValue::Decimal(value), _) => OwnedColumn::Decimal(
                DecimalType::unconstrained(value.scale())?,
                vec![value.mantissa()],
            ),
            (LiteralValue::Boolean(value), _) => OwnedColumn::Boolean(vec![*value]),
            (LiteralValue::VarChar(value), _) => OwnedColumn::VarChar(vec![value.clone()]),
        };
        Ok(OwnedNullableColumn::new(values))
    }

    /// Reads one row of a column back as a literal.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn from_column_row(column: &OwnedNullableColumn, index: usize) -> Self {
        if column.is_null(index) {
            return LiteralValue::Null;
        }
        match &column.values {
            OwnedColumn::Boolean(col) => LiteralValue::Boolean(col[index]),
            OwnedColumn::BigInt(col) => LiteralValue::Integer(col[index].into()),
            OwnedColumn::Float64(col) => LiteralValue::Float(col[index]),
            OwnedColumn::VarChar(col) => LiteralValue::VarChar(col[index].clone()),
            OwnedColumn::Decimal(decimal_type, col) => {
                DecimalValue::new(col[index], decimal_type.scale())
                    .map_or(LiteralValue::Null, LiteralValue::Decimal)
            }
        }
    }
}

impl From<DecimalValue> for LiteralValue {
    fn from(value: DecimalValue) -> Self {
        LiteralValue::Decimal(value)
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        LiteralValue::Integer(value.into())
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        LiteralValue::Float(value)
    }
}
