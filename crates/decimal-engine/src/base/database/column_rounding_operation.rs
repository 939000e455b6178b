//! Rounding of numeric columns. Every operation keeps the type of its input.
use super::{
    slice_operation::try_slice_unary_op, ColumnOperationError, ColumnOperationResult,
    OwnedColumn, OwnedNullableColumn,
};
use crate::base::math::{
    decimal::DecimalError,
    rescale::{checked_upscale, downscale, RoundingMode},
};
use decimal_engine_parser::operator::UnaryOperator;

fn round_f64(value: f64, decimals: u8, mode: RoundingMode) -> f64 {
    let factor = 10_f64.powi(i32::from(decimals));
    let scaled = value * factor;
    let rounded = match mode {
        RoundingMode::HalfEven => scaled.round_ties_even(),
        RoundingMode::Floor => scaled.floor(),
        RoundingMode::Ceil => scaled.ceil(),
        RoundingMode::TowardZero => scaled.trunc(),
    };
    rounded / factor
}

impl OwnedNullableColumn {
    fn try_round_with<F>(
        &self,
        decimals: F,
        mode: RoundingMode,
        operator: UnaryOperator,
    ) -> ColumnOperationResult<Self>
    where
        F: Fn(usize) -> u8,
    {
        let presence = self.presence.as_deref();
        let values = match &self.values {
            OwnedColumn::BigInt(values) => OwnedColumn::BigInt(values.clone()),
            OwnedColumn::Float64(values) => OwnedColumn::Float64(
                values
                    .iter()
                    .enumerate()
                    .map(|(row, value)| round_f64(*value, decimals(row), mode))
                    .collect(),
            ),
            OwnedColumn::Decimal(decimal_type, values) => {
                let scale = decimal_type.scale();
                let rounded = try_slice_unary_op(values, presence, |row, value| {
                    let dropped = scale.saturating_sub(decimals(row));
                    let mantissa = checked_upscale(downscale(*value, dropped, mode), dropped)
                        .ok_or_else(|| DecimalError::PrecisionOverflow {
                            value: value.to_string(),
                            precision: decimal_type.effective_precision().value(),
                        })?;
                    decimal_type
                        .validate_mantissa(mantissa)
                        .map_err(|source| ColumnOperationError::RowConversionError { row, source })?;
                    Ok(mantissa)
                })?;
                OwnedColumn::Decimal(*decimal_type, rounded)
            }
            OwnedColumn::Boolean(_) | OwnedColumn::VarChar(_) => {
                return Err(ColumnOperationError::UnaryOperationInvalidColumnType {
                    operator,
                    operand_type: self.column_type(),
                })
            }
        };
        Ok(Self {
            values,
            presence: self.presence.clone(),
        })
    }

    /// Rounds half-to-even at the `decimals`-th fractional digit. Decimals with no more
    /// than `decimals` fractional digits are returned unchanged.
    #[tracing::instrument(name = "OwnedNullableColumn::round", level = "debug", skip(self))]
    pub fn round(&self, decimals: u8) -> ColumnOperationResult<Self> {
        self.try_round_with(|_| decimals, RoundingMode::HalfEven, UnaryOperator::Round)
    }

    /// Rounds toward negative infinity to an integral value.
    pub fn floor(&self) -> ColumnOperationResult<Self> {
        self.try_round_with(|_| 0, RoundingMode::Floor, UnaryOperator::Floor)
    }

    /// Rounds toward positive infinity to an integral value.
    pub fn ceil(&self) -> ColumnOperationResult<Self> {
        self.try_round_with(|_| 0, RoundingMode::Ceil, UnaryOperator::Ceil)
    }

    /// Rounds each row half-to-even at its own number of fractional digits.
    ///
    /// `decimals` has either one entry, which applies to every row, or one entry per row.
    #[tracing::instrument(name = "OwnedNullableColumn::round_per_row", level = "debug", skip_all)]
    pub fn round_per_row(&self, decimals: &[u8]) -> ColumnOperationResult<Self> {
        match decimals {
            [decimals] => self.round(*decimals),
            decimals if decimals.len() == self.len() => self.try_round_with(
                |row| decimals[row],
                RoundingMode::HalfEven,
                UnaryOperator::Round,
            ),
            decimals => Err(ColumnOperationError::ParameterLengthMismatch {
                parameter_len: decimals.len(),
                column_len: self.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::database::DecimalType;

    fn decimals(precision: Option<u8>, scale: u8, values: Vec<i128>) -> OwnedNullableColumn {
        let decimal_type = match precision {
            Some(precision) => DecimalType::try_with_precision(precision, scale).unwrap(),
            None => DecimalType::unconstrained(scale).unwrap(),
        };
        OwnedNullableColumn::new(OwnedColumn::Decimal(decimal_type, values))
    }

    #[test]
    fn we_can_round_half_to_even() {
        // 0.125, 0.135, -0.125, 1.999
        let column = decimals(None, 3, vec![125, 135, -125, 1_999]);
        assert_eq!(
            column.round(2).unwrap(),
            decimals(None, 3, vec![120, 140, -120, 2_000])
        );
        assert_eq!(column.round(3).unwrap(), column);
        assert_eq!(column.round(10).unwrap(), column);
        assert_eq!(
            column.round(0).unwrap(),
            decimals(None, 3, vec![0, 0, 0, 2_000])
        );
    }

    #[test]
    fn we_can_floor_and_ceil() {
        // 1.5, -1.5, 2.0
        let column = decimals(None, 1, vec![15, -15, 20]);
        assert_eq!(column.floor().unwrap(), decimals(None, 1, vec![10, -20, 20]));
        assert_eq!(column.ceil().unwrap(), decimals(None, 1, vec![20, -10, 20]));
    }

    #[test]
    fn we_can_round_each_row_at_its_own_digit() {
        // 1.255, 1.255, 1.255
        let column = decimals(None, 3, vec![1_255, 1_255, 1_255]);
        assert_eq!(
            column.round_per_row(&[0, 1, 2]).unwrap(),
            decimals(None, 3, vec![1_000, 1_300, 1_260])
        );
        assert_eq!(
            column.round_per_row(&[1]).unwrap(),
            decimals(None, 3, vec![1_300, 1_300, 1_300])
        );
        assert_eq!(
            column.round_per_row(&[1, 2]),
            Err(ColumnOperationError::ParameterLengthMismatch {
                parameter_len: 2,
                column_len: 3
            })
        );
    }

    #[test]
    fn rounding_keeps_nulls_and_skips_them() {
        let column = OwnedNullableColumn::with_presence(
            OwnedColumn::Decimal(DecimalType::unconstrained(2).unwrap(), vec![155, 0]),
            Some(vec![true, false]),
        )
        .unwrap();
        let rounded = column.round(1).unwrap();
        assert_eq!(rounded.presence, Some(vec![true, false]));
        assert_eq!(
            rounded.values,
            OwnedColumn::Decimal(DecimalType::unconstrained(2).unwrap(), vec![160, 0])
        );
    }

    #[test]
    fn we_cannot_round_past_the_declared_precision() {
        // 9.99 rounds to 10.00, which needs four digits
        let column = decimals(Some(3), 2, vec![999]);
        assert!(matches!(
            column.round(1),
            Err(ColumnOperationError::RowConversionError {
                row: 0,
                source: DecimalError::PrecisionOverflow { .. }
            })
        ));
    }

    #[test]
    fn we_cannot_round_up_past_the_largest_mantissa() {
        let column = decimals(None, 38, vec![i128::MAX]);
        assert_eq!(
            column.ceil(),
            Err(ColumnOperationError::DecimalConversionError {
                source: DecimalError::PrecisionOverflow {
                    value: i128::MAX.to_string(),
                    precision: 38
                }
            })
        );
        assert!(matches!(
            column.round(0),
            Err(ColumnOperationError::DecimalConversionError {
                source: DecimalError::PrecisionOverflow { .. }
            })
        ));
    }

    #[test]
    fn we_can_round_integer_and_float_columns() {
        let integers = OwnedNullableColumn::new(OwnedColumn::BigInt(vec![1, -2]));
        assert_eq!(integers.round(1).unwrap(), integers);
        assert_eq!(integers.floor().unwrap(), integers);
        let floats = OwnedNullableColumn::new(OwnedColumn::Float64(vec![2.5, -1.5, 0.25]));
        assert_eq!(
            floats.round(0).unwrap().values,
            OwnedColumn::Float64(vec![2.0, -2.0, 0.0])
        );
        assert_eq!(
            floats.floor().unwrap().values,
            OwnedColumn::Float64(vec![2.0, -2.0, 0.0])
        );
        assert_eq!(
            floats.ceil().unwrap().values,
            OwnedColumn::Float64(vec![3.0, -1.0, 1.0])
        );
    }

    #[test]
    fn we_cannot_round_non_numeric_columns() {
        let strings = OwnedNullableColumn::new(OwnedColumn::VarChar(vec!["1.5".into()]));
        assert_eq!(
            strings.ceil(),
            Err(ColumnOperationError::UnaryOperationInvalidColumnType {
                operator: UnaryOperator::Ceil,
                operand_type: strings.column_type(),
            })
        );
    }
}
