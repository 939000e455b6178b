//! Replacing nulls in decimal columns.
use super::{ColumnOperationError, ColumnOperationResult, OwnedColumn, OwnedNullableColumn};
use crate::base::math::{
    rescale::{pow10, RoundingMode},
    DecimalValue,
};
use core::cmp::Ordering;
use decimal_engine_parser::operator::UnaryOperator;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

/// What a null row is replaced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillNullStrategy {
    /// A fixed value, rounded half-to-even to the column's scale
    Value(DecimalValue),
    /// Zero
    Zero,
    /// One
    One,
    /// The smallest present value
    Min,
    /// The largest present value
    Max,
    /// The mean of the present values, rounded half-to-even to the column's scale
    Mean,
    /// The closest present value above the row
    Forward,
    /// The closest present value below the row
    Backward,
}

/// The exact mean of `values`, rounded half-to-even to an integer.
fn half_even_mean(values: &[i128]) -> ColumnOperationResult<Option<i128>> {
    if values.is_empty() {
        return Ok(None);
    }
    let sum: BigInt = values.iter().map(|value| BigInt::from(*value)).sum();
    let count = BigInt::from(values.len());
    let quotient = &sum / &count;
    let remainder = &sum % &count;
    let away_from_zero = match (remainder.abs() * 2u8).cmp(&count) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => (&quotient % 2u8) != BigInt::zero(),
    };
    let mean = if away_from_zero && sum.is_negative() {
        quotient - 1u8
    } else if away_from_zero {
        quotient + 1u8
    } else {
        quotient
    };
    mean.to_i128()
        .map(Some)
        .ok_or_else(|| ColumnOperationError::IntegerOverflow {
            error: format!("Overflow in mean {mean}"),
        })
}

/// Carries the last present value over the null rows that follow it.
fn carry(values: &[i128], presence: &[bool], order: impl Iterator<Item = usize>) -> Vec<Option<i128>> {
    let mut result = vec![None; values.len()];
    let mut last = None;
    for row in order {
        if presence[row] {
            last = Some(values[row]);
        }
        result[row] = last;
    }
    result
}

impl OwnedNullableColumn {
    /// Replaces the nulls of a decimal column. Rows for which the strategy has no value,
    /// e.g. leading nulls under [`FillNullStrategy::Forward`], stay null.
    #[tracing::instrument(name = "OwnedNullableColumn::fill_null", level = "debug", skip(self))]
    pub fn fill_null(&self, strategy: FillNullStrategy) -> ColumnOperationResult<Self> {
        let OwnedColumn::Decimal(decimal_type, values) = &self.values else {
            return Err(ColumnOperationError::UnaryOperationInvalidColumnType {
                operator: UnaryOperator::FillNull,
                operand_type: self.column_type(),
            });
        };
        let scale = decimal_type.scale();
        let presence = self.presence_or_all_present();
        let fill = match strategy {
            FillNullStrategy::Value(value) => {
                let mantissa = value.rescale(scale, RoundingMode::HalfEven)?.mantissa();
                decimal_type.validate_mantissa(mantissa)?;
                Some(mantissa)
            }
            FillNullStrategy::Zero => Some(0),
            FillNullStrategy::One => {
                let one = pow10(scale).ok_or_else(|| ColumnOperationError::IntegerOverflow {
                    error: format!("1 does not fit at scale {scale}"),
                })?;
                decimal_type.validate_mantissa(one)?;
                Some(one)
            }
            FillNullStrategy::Min => self.min()?.map(|value| value.mantissa()),
            FillNullStrategy::Max => self.max()?.map(|value| value.mantissa()),
            FillNullStrategy::Mean => {
                let present: Vec<i128> = values
                    .iter()
                    .zip(&presence)
                    .filter_map(|(value, present)| present.then_some(*value))
                    .collect();
                let mean = half_even_mean(&present)?;
                if let Some(mean) = mean {
                    decimal_type.validate_mantissa(mean)?;
                }
                mean
            }
            FillNullStrategy::Forward | FillNullStrategy::Backward => None,
        };
        let filled: Vec<Option<i128>> = match strategy {
            FillNullStrategy::Forward => carry(values, &presence, 0..values.len()),
            FillNullStrategy::Backward => carry(values, &presence, (0..values.len()).rev()),
            _ => values
                .iter()
                .zip(&presence)
                .map(|(value, present)| if *present { Some(*value) } else { fill })
                .collect(),
        };
        Ok(Self::from_parts(
            OwnedColumn::Decimal(
                *decimal_type,
                filled.iter().map(|value| value.unwrap_or_default()).collect(),
            ),
            filled.iter().map(Option::is_some).collect(),
        ))
    }
}
