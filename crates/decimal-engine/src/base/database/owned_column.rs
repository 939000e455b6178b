/// A column of data, with type included. This is simply a wrapper around `Vec<T>` for enumerated `T`.
/// Decimal columns hold `i128` mantissas that share one [`DecimalType`].
use super::{ColumnOperationError, ColumnOperationResult, ColumnType, DecimalType};
use crate::base::math::{
    decimal_format::{format_decimal, DecimalFormatOptions},
    rescale::to_f64,
    DecimalValue,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
/// Supported types for [`OwnedColumn`]
pub enum OwnedColumn {
    /// Boolean columns
    Boolean(Vec<bool>),
    /// i64 columns
    BigInt(Vec<i64>),
    /// f64 columns
    Float64(Vec<f64>),
    /// String columns
    VarChar(Vec<String>),
    /// Decimal columns
    Decimal(DecimalType, Vec<i128>),
}

impl OwnedColumn {
    /// Creates a decimal column, checking every mantissa against the type's precision.
    pub fn try_new_decimal(
        decimal_type: DecimalType,
        values: Vec<i128>,
    ) -> ColumnOperationResult<Self> {
        if decimal_type.precision().is_some() {
            values
                .iter()
                .enumerate()
                .try_for_each(|(row, value)| {
                    decimal_type
                        .validate_mantissa(*value)
                        .map_err(|source| ColumnOperationError::RowConversionError { row, source })
                })?;
        }
        Ok(OwnedColumn::Decimal(decimal_type, values))
    }

    /// A column of `len` default values (false, zero or empty) of the given type.
    #[must_use]
    pub fn zeros(column_type: ColumnType, len: usize) -> Self {
        match column_type {
            ColumnType::Boolean => OwnedColumn::Boolean(vec![false; len]),
            ColumnType::BigInt => OwnedColumn::BigInt(vec![0; len]),
            ColumnType::Float64 => OwnedColumn::Float64(vec![0.0; len]),
            ColumnType::VarChar => OwnedColumn::VarChar(vec![String::new(); len]),
            ColumnType::Decimal(decimal_type) => OwnedColumn::Decimal(decimal_type, vec![0; len]),
        }
    }

    /// Returns the length of the column.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            OwnedColumn::Boolean(col) => col.len(),
            OwnedColumn::BigInt(col) => col.len(),
            OwnedColumn::Float64(col) => col.len(),
            OwnedColumn::VarChar(col) => col.len(),
            OwnedColumn::Decimal(_, col) => col.len(),
        }
    }

    /// Returns true if the column is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the type of the column.
    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        match self {
            OwnedColumn::Boolean(_) => ColumnType::Boolean,
            OwnedColumn::BigInt(_) => ColumnType::BigInt,
            OwnedColumn::Float64(_) => ColumnType::Float64,
            OwnedColumn::VarChar(_) => ColumnType::VarChar,
            OwnedColumn::Decimal(decimal_type, _) => ColumnType::Decimal(*decimal_type),
        }
    }

    /// Returns the sliced column.
    ///
    /// # Panics
    /// Panics if `start..end` is out of bounds.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> Self {
        match self {
            OwnedColumn::Boolean(col) => OwnedColumn::Boolean(col[start..end].to_vec()),
            OwnedColumn::BigInt(col) => OwnedColumn::BigInt(col[start..end].to_vec()),
            OwnedColumn::Float64(col) => OwnedColumn::Float64(col[start..end].to_vec()),
            OwnedColumn::VarChar(col) => OwnedColumn::VarChar(col[start..end].to_vec()),
            OwnedColumn::Decimal(decimal_type, col) => {
                OwnedColumn::Decimal(*decimal_type, col[start..end].to_vec())
            }
        }
    }

    /// Gathers the rows at `indices`, in that order.
    ///
    /// # Panics
    /// Panics if an index is out of bounds.
    #[must_use]
    pub fn take(&self, indices: &[usize]) -> Self {
        match self {
            OwnedColumn::Boolean(col) => {
                OwnedColumn::Boolean(indices.iter().map(|&i| col[i]).collect())
            }
            OwnedColumn::BigInt(col) => {
                OwnedColumn::BigInt(indices.iter().map(|&i| col[i]).collect())
            }
            OwnedColumn::Float64(col) => {
                OwnedColumn::Float64(indices.iter().map(|&i| col[i]).collect())
            }
            OwnedColumn::VarChar(col) => {
                OwnedColumn::VarChar(indices.iter().map(|&i| col[i].clone()).collect())
            }
            OwnedColumn::Decimal(decimal_type, col) => {
                OwnedColumn::Decimal(*decimal_type, indices.iter().map(|&i| col[i]).collect())
            }
        }
    }

    /// Concatenates two columns of the same type.
    pub fn try_append(&self, other: &Self) -> ColumnOperationResult<Self> {
        match (self, other) {
            (OwnedColumn::Boolean(lhs), OwnedColumn::Boolean(rhs)) => {
                Ok(OwnedColumn::Boolean([lhs.as_slice(), rhs.as_slice()].concat()))
            }
            (OwnedColumn::BigInt(lhs), OwnedColumn::BigInt(rhs)) => {
                Ok(OwnedColumn::BigInt([lhs.as_slice(), rhs.as_slice()].concat()))
            }
            (OwnedColumn::Float64(lhs), OwnedColumn::Float64(rhs)) => {
                Ok(OwnedColumn::Float64([lhs.as_slice(), rhs.as_slice()].concat()))
            }
            (OwnedColumn::VarChar(lhs), OwnedColumn::VarChar(rhs)) => {
                Ok(OwnedColumn::VarChar([lhs.as_slice(), rhs.as_slice()].concat()))
            }
            (OwnedColumn::Decimal(lhs_type, lhs), OwnedColumn::Decimal(rhs_type, rhs))
                if lhs_type == rhs_type =>
            {
                Ok(OwnedColumn::Decimal(*lhs_type, [lhs.as_slice(), rhs.as_slice()].concat()))
            }
            _ => Err(ColumnOperationError::CastingError {
                from_type: other.column_type(),
                to_type: self.column_type(),
            }),
        }
    }

    /// The value at `index` as a decimal, for exact numeric columns.
    #[must_use]
    pub fn decimal_value(&self, index: usize) -> Option<DecimalValue> {
        match self {
            OwnedColumn::BigInt(col) => col.get(index).map(|value| DecimalValue::from(*value)),
            OwnedColumn::Decimal(decimal_type, col) => col
                .get(index)
                .and_then(|value| DecimalValue::new(*value, decimal_type.scale()).ok()),
            OwnedColumn::Boolean(_) | OwnedColumn::Float64(_) | OwnedColumn::VarChar(_) => None,
        }
    }

    /// The mantissas and scale of exact numeric columns. Integers have scale 0.
    #[must_use]
    pub fn to_mantissas(&self) -> Option<(u8, Vec<i128>)> {
        match self {
            OwnedColumn::BigInt(col) => Some((0, col.iter().map(|&v| i128::from(v)).collect())),
            OwnedColumn::Decimal(decimal_type, col) => Some((decimal_type.scale(), col.clone())),
            OwnedColumn::Boolean(_) | OwnedColumn::Float64(_) | OwnedColumn::VarChar(_) => None,
        }
    }

    /// The values of numeric columns as `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64_values(&self) -> Option<Vec<f64>> {
        match self {
            OwnedColumn::BigInt(col) => Some(col.iter().map(|&v| v as f64).collect()),
            OwnedColumn::Float64(col) => Some(col.clone()),
            OwnedColumn::Decimal(decimal_type, col) => Some(
                col.iter()
                    .map(|&v| to_f64(v, decimal_type.scale()))
                    .collect(),
            ),
            OwnedColumn::Boolean(_) | OwnedColumn::VarChar(_) => None,
        }
    }

    /// Renders the value at `index` as text.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn format_value(&self, index: usize, options: &DecimalFormatOptions) -> String {
        match self {
            OwnedColumn::Boolean(col) => col[index].to_string(),
            OwnedColumn::BigInt(col) => col[index].to_string(),
            OwnedColumn::Float64(col) => col[index].to_string(),
            OwnedColumn::VarChar(col) => col[index].clone(),
            OwnedColumn::Decimal(decimal_type, col) => {
                format_decimal(col[index], decimal_type.scale(), options)
            }
        }
    }
}
