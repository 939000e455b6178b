use super::{ColumnOperationError, ColumnOperationResult, ColumnType, LiteralValue, OwnedNullableColumn};
use serde::{Deserialize, Serialize};

/// An operand of a binary operation: either a column or a literal with indeterminate size.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum ColumnarValue {
    /// A [ `ColumnarValue::Column` ] is a list of values.
    Column(OwnedNullableColumn),
    /// A [ `ColumnarValue::Literal` ] is a single value with indeterminate size.
    Literal(LiteralValue),
}

impl ColumnarValue {
    /// Provides the column type associated with the value, `None` for a null literal
    #[must_use]
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Self::Column(column) => Some(column.column_type()),
            Self::Literal(literal) => literal.column_type(),
        }
    }

    /// Converts the [`ColumnarValue`] to a column with `num_rows` rows
    pub fn into_column(&self, num_rows: usize) -> ColumnOperationResult<OwnedNullableColumn> {
        match self {
            Self::Column(column) => {
                if column.len() == num_rows {
                    Ok(column.clone())
                } else {
                    Err(ColumnOperationError::DifferentColumnLength {
                        len_a: column.len(),
                        len_b: num_rows,
                    })
                }
            }
            Self::Literal(literal) => literal.to_operand_column(None)?.broadcast_to(num_rows),
        }
    }
}

impl From<OwnedNullableColumn> for ColumnarValue {
    fn from(column: OwnedNullableColumn) -> Self {
        Self::Column(column)
    }
}

impl From<LiteralValue> for ColumnarValue {
    fn from(literal: LiteralValue) -> Self {
        Self::Literal(literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::database::{DecimalType, OwnedColumn};

    #[test]
    fn we_can_convert_columnar_values_to_columns() {
        let column = OwnedNullableColumn::new(OwnedColumn::BigInt(vec![1, 2, 3]));
        let columnar_value = ColumnarValue::from(column.clone());
        assert_eq!(columnar_value.column_type(), Some(ColumnType::BigInt));
        assert_eq!(columnar_value.into_column(3).unwrap(), column);
        assert_eq!(
            columnar_value.into_column(2),
            Err(ColumnOperationError::DifferentColumnLength { len_a: 3, len_b: 2 })
        );

        let literal = ColumnarValue::from(LiteralValue::Decimal("1.50".parse().unwrap()));
        assert_eq!(
            literal.into_column(2).unwrap(),
            OwnedNullableColumn::new(OwnedColumn::Decimal(
                DecimalType::unconstrained(2).unwrap(),
                vec![150, 150]
            ))
        );
        assert_eq!(ColumnarValue::Literal(LiteralValue::Null).column_type(), None);
    }
}
