//! Reductions over decimal columns.
//!
//! Exact reductions (`sum`, `min`, `max` and the cumulative variants) stay at the scale of
//! their input. Statistical reductions leave the decimal domain and return `f64`.
use super::{
    column_type_operation::try_horizontal_decimal_type, ColumnOperationError,
    ColumnOperationResult, ColumnType, DecimalType, OwnedColumn, OwnedNullableColumn,
};
use crate::base::{
    if_rayon,
    math::{
        decimal::DecimalError,
        rescale::{checked_upscale, to_f64},
        DecimalValue,
    },
};
use decimal_engine_parser::operator::UnaryOperator;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
#[cfg(feature = "rayon")]
use rayon::prelude::{ParallelIterator, ParallelSlice};
use serde::{Deserialize, Serialize};

/// A partial decimal sum.
///
/// Partial sums of disjoint parts of a column merge into the sum of the whole column, in
/// any grouping and any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalSum {
    scale: u8,
    sum: i128,
    count: usize,
}

impl DecimalSum {
    /// An empty sum at `scale`.
    #[must_use]
    pub fn new(scale: u8) -> Self {
        Self {
            scale,
            sum: 0,
            count: 0,
        }
    }

    /// Adds one mantissa carried at this sum's scale.
    pub fn try_push(&mut self, mantissa: i128) -> ColumnOperationResult<()> {
        self.sum = self
            .sum
            .checked_add(mantissa)
            .ok_or_else(|| ColumnOperationError::IntegerOverflow {
                error: format!("Overflow in decimal sum {} + {mantissa}", self.sum),
            })?;
        self.count += 1;
        Ok(())
    }

    /// Combines two partial sums of the same scale.
    pub fn try_merge(self, other: Self) -> ColumnOperationResult<Self> {
        if self.scale != other.scale {
            return Err(DecimalError::InvalidScale {
                scale: format!("{} does not match {}", other.scale, self.scale),
            }
            .into());
        }
        let sum = self.sum.checked_add(other.sum).ok_or_else(|| {
            ColumnOperationError::IntegerOverflow {
                error: format!("Overflow in decimal sum {} + {}", self.sum, other.sum),
            }
        })?;
        Ok(Self {
            scale: self.scale,
            sum,
            count: self.count + other.count,
        })
    }

    /// The number of values added so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// The scale the sum is carried at.
    #[must_use]
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// The sum so far. An empty sum is zero.
    pub fn value(&self) -> ColumnOperationResult<DecimalValue> {
        Ok(DecimalValue::new(self.sum, self.scale)?)
    }
}

fn try_sum_slice(scale: u8, values: &[i128]) -> ColumnOperationResult<DecimalSum> {
    values.iter().try_fold(DecimalSum::new(scale), |mut sum, value| {
        sum.try_push(*value)?;
        Ok(sum)
    })
}

/// How [`OwnedNullableColumn::quantile`] picks a value between two neighbouring rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuantileMethod {
    /// The closer neighbour, the lower one on ties
    #[default]
    Nearest,
    /// The lower neighbour
    Lower,
    /// The higher neighbour
    Higher,
    /// The average of both neighbours
    Midpoint,
    /// Linear interpolation between both neighbours
    Linear,
}

/// `n * sum(x^2) - sum(x)^2` is accumulated exactly, so large mantissas keep every digit
/// until the final division.
fn variance(values: &[i128], scale: u8, ddof: u8) -> Option<f64> {
    let denominator = values.len().checked_sub(usize::from(ddof)).filter(|n| *n > 0)?;
    let count = BigInt::from(values.len());
    let (sum, sum_of_squares) = values.iter().fold(
        (BigInt::zero(), BigInt::zero()),
        |(sum, sum_of_squares), value| {
            let value = BigInt::from(*value);
            (sum + &value, sum_of_squares + &value * &value)
        },
    );
    let numerator = &count * sum_of_squares - &sum * &sum;
    let divisor = count * BigInt::from(denominator) * BigInt::from(10).pow(2 * u32::from(scale));
    Some(numerator.to_f64()? / divisor.to_f64()?)
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn quantile_of_sorted(values: &[i128], scale: u8, q: f64, method: QuantileMethod) -> Option<f64> {
    let last = values.len().checked_sub(1)?;
    let position = q * last as f64;
    let (lower, upper) = (position.floor() as usize, position.ceil() as usize);
    let (low, high) = (to_f64(values[lower], scale), to_f64(values[upper], scale));
    Some(match method {
        QuantileMethod::Nearest if position - position.floor() > 0.5 => high,
        QuantileMethod::Nearest | QuantileMethod::Lower => low,
        QuantileMethod::Higher => high,
        QuantileMethod::Midpoint => (low + high) / 2.0,
        QuantileMethod::Linear => low + (high - low) * (position - position.floor()),
    })
}

impl OwnedNullableColumn {
    /// The decimal type of the column and the mantissas of its present rows.
    fn present_decimals(
        &self,
        operator: UnaryOperator,
    ) -> ColumnOperationResult<(DecimalType, Vec<i128>)> {
        match &self.values {
            OwnedColumn::Decimal(decimal_type, values) => Ok((
                *decimal_type,
                values
                    .iter()
                    .enumerate()
                    .filter(|(row, _)| self.is_present(*row))
                    .map(|(_, value)| *value)
                    .collect(),
            )),
            _ => Err(ColumnOperationError::UnaryOperationInvalidColumnType {
                operator,
                operand_type: self.column_type(),
            }),
        }
    }

    fn sorted_present_decimals(
        &self,
        operator: UnaryOperator,
    ) -> ColumnOperationResult<(DecimalType, Vec<i128>)> {
        let (decimal_type, mut values) = self.present_decimals(operator)?;
        values.sort_unstable();
        Ok((decimal_type, values))
    }

    /// The partial sum of the present rows.
    pub fn try_partial_sum(&self) -> ColumnOperationResult<DecimalSum> {
        let (decimal_type, values) = self.present_decimals(UnaryOperator::Sum)?;
        try_sum_slice(decimal_type.scale(), &values)
    }

    /// The sum of the present rows at the column's scale. Empty and all-null columns sum
    /// to zero.
    #[tracing::instrument(name = "OwnedNullableColumn::sum", level = "debug", skip_all)]
    pub fn sum(&self) -> ColumnOperationResult<DecimalValue> {
        self.try_partial_sum()?.value()
    }

    /// Sums chunks of `chunk_len` present rows independently, in parallel when the `rayon`
    /// feature is enabled, and merges the partial sums.
    #[tracing::instrument(name = "OwnedNullableColumn::sum_chunked", level = "debug", skip(self))]
    pub fn sum_chunked(&self, chunk_len: usize) -> ColumnOperationResult<DecimalValue> {
        if chunk_len == 0 {
            return Err(ColumnOperationError::InvalidParameter {
                error: "chunk length must be positive".to_string(),
            });
        }
        let (decimal_type, values) = self.present_decimals(UnaryOperator::Sum)?;
        let scale = decimal_type.scale();
        let sum = if_rayon!(
            values
                .par_chunks(chunk_len)
                .map(|chunk| try_sum_slice(scale, chunk))
                .try_reduce(|| DecimalSum::new(scale), DecimalSum::try_merge),
            values
                .chunks(chunk_len)
                .map(|chunk| try_sum_slice(scale, chunk))
                .try_fold(DecimalSum::new(scale), |sum, chunk| sum.try_merge(chunk?))
        )?;
        sum.value()
    }

    /// The smallest present value, `None` without present rows.
    pub fn min(&self) -> ColumnOperationResult<Option<DecimalValue>> {
        let (decimal_type, values) = self.present_decimals(UnaryOperator::Min)?;
        values
            .into_iter()
            .min()
            .map(|value| DecimalValue::new(value, decimal_type.scale()))
            .transpose()
            .map_err(Into::into)
    }

    /// The largest present value, `None` without present rows.
    pub fn max(&self) -> ColumnOperationResult<Option<DecimalValue>> {
        let (decimal_type, values) = self.present_decimals(UnaryOperator::Max)?;
        values
            .into_iter()
            .max()
            .map(|value| DecimalValue::new(value, decimal_type.scale()))
            .transpose()
            .map_err(Into::into)
    }

    /// The arithmetic mean of the present rows.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> ColumnOperationResult<Option<f64>> {
        let sum = self.try_partial_sum()?;
        Ok((sum.count() > 0).then(|| to_f64(sum.sum, sum.scale()) / sum.count() as f64))
    }

    /// The median of the present rows. With an even count it is the mean of the two middle
    /// values.
    pub fn median(&self) -> ColumnOperationResult<Option<f64>> {
        let (decimal_type, values) = self.sorted_present_decimals(UnaryOperator::Median)?;
        Ok(quantile_of_sorted(
            &values,
            decimal_type.scale(),
            0.5,
            QuantileMethod::Midpoint,
        ))
    }

    /// The variance of the present rows with `ddof` delta degrees of freedom. `None` when
    /// there are no more than `ddof` present rows.
    pub fn var(&self, ddof: u8) -> ColumnOperationResult<Option<f64>> {
        let (decimal_type, values) = self.present_decimals(UnaryOperator::Var)?;
        Ok(variance(&values, decimal_type.scale(), ddof))
    }

    /// The standard deviation of the present rows with `ddof` delta degrees of freedom.
    pub fn std(&self, ddof: u8) -> ColumnOperationResult<Option<f64>> {
        let (decimal_type, values) = self.present_decimals(UnaryOperator::Std)?;
        Ok(variance(&values, decimal_type.scale(), ddof).map(f64::sqrt))
    }

    /// The `q`-quantile of the present rows, `q` in `[0, 1]`.
    pub fn quantile(&self, q: f64, method: QuantileMethod) -> ColumnOperationResult<Option<f64>> {
        if !(0.0..=1.0).contains(&q) {
            return Err(ColumnOperationError::InvalidParameter {
                error: format!("quantile {q} is outside [0, 1]"),
            });
        }
        let (decimal_type, values) = self.sorted_present_decimals(UnaryOperator::Quantile)?;
        Ok(quantile_of_sorted(&values, decimal_type.scale(), q, method))
    }

    fn try_cumulative<F>(
        &self,
        operator: UnaryOperator,
        result_type: impl Fn(DecimalType) -> ColumnOperationResult<DecimalType>,
        step: F,
    ) -> ColumnOperationResult<Self>
    where
        F: Fn(i128, i128) -> ColumnOperationResult<i128>,
    {
        let OwnedColumn::Decimal(decimal_type, values) = &self.values else {
            return Err(ColumnOperationError::UnaryOperationInvalidColumnType {
                operator,
                operand_type: self.column_type(),
            });
        };
        let mut state = None;
        let values = values
            .iter()
            .enumerate()
            .map(|(row, value)| {
                if self.is_null(row) {
                    return Ok(0);
                }
                let next = match state {
                    Some(state) => step(state, *value)?,
                    None => *value,
                };
                state = Some(next);
                Ok(next)
            })
            .collect::<ColumnOperationResult<Vec<_>>>()?;
        Ok(Self {
            values: OwnedColumn::Decimal(result_type(*decimal_type)?, values),
            presence: self.presence.clone(),
        })
    }

    /// Running sums. Null rows stay null and do not reset the sum.
    pub fn cum_sum(&self) -> ColumnOperationResult<Self> {
        self.try_cumulative(
            UnaryOperator::CumSum,
            |decimal_type| Ok(DecimalType::unconstrained(decimal_type.scale())?),
            |sum, value| {
                sum.checked_add(value)
                    .ok_or_else(|| ColumnOperationError::IntegerOverflow {
                        error: format!("Overflow in cumulative sum {sum} + {value}"),
                    })
            },
        )
    }

    /// Running minima. Null rows stay null.
    pub fn cum_min(&self) -> ColumnOperationResult<Self> {
        self.try_cumulative(UnaryOperator::CumMin, Ok, |min, value| Ok(min.min(value)))
    }

    /// Running maxima. Null rows stay null.
    pub fn cum_max(&self) -> ColumnOperationResult<Self> {
        self.try_cumulative(UnaryOperator::CumMax, Ok, |max, value| Ok(max.max(value)))
    }
}

/// Raises every column to the largest scale among them and folds each row over the present
/// values. A row is null only when it is null in every column.
fn try_fold_horizontal<F>(
    columns: &[OwnedNullableColumn],
    fold: F,
) -> ColumnOperationResult<OwnedNullableColumn>
where
    F: Fn(i128, i128) -> ColumnOperationResult<i128>,
{
    let Some(first) = columns.first() else {
        return Err(ColumnOperationError::InvalidParameter {
            error: "horizontal reductions need at least one column".to_string(),
        });
    };
    let len = first.len();
    if let Some(column) = columns.iter().find(|column| column.len() != len) {
        return Err(ColumnOperationError::DifferentColumnLength {
            len_a: len,
            len_b: column.len(),
        });
    }
    let types: Vec<ColumnType> = columns.iter().map(OwnedNullableColumn::column_type).collect();
    let decimal_type = try_horizontal_decimal_type(&types)?;
    let scale = decimal_type.scale();
    let mut rows: Vec<Option<i128>> = vec![None; len];
    for column in columns {
        let Some((column_scale, values)) = column.values.to_mantissas() else {
            continue;
        };
        for (row, value) in values.into_iter().enumerate() {
            if column.is_null(row) {
                continue;
            }
            let value = checked_upscale(value, scale - column_scale).ok_or_else(|| {
                ColumnOperationError::IntegerOverflow {
                    error: format!("Overflow raising {value} to scale {scale}"),
                }
            })?;
            rows[row] = Some(match rows[row] {
                Some(acc) => fold(acc, value)?,
                None => value,
            });
        }
    }
    Ok(OwnedNullableColumn::from_parts(
        OwnedColumn::Decimal(
            decimal_type,
            rows.iter().map(|row| row.unwrap_or_default()).collect(),
        ),
        rows.iter().map(Option::is_some).collect(),
    ))
}

/// Row-wise sum across decimal and integer columns, ignoring nulls.
#[tracing::instrument(name = "aggregate_util::sum_horizontal", level = "debug", skip_all)]
pub fn sum_horizontal(columns: &[OwnedNullableColumn]) -> ColumnOperationResult<OwnedNullableColumn> {
    try_fold_horizontal(columns, |acc, value| {
        acc.checked_add(value)
            .ok_or_else(|| ColumnOperationError::IntegerOverflow {
                error: format!("Overflow in horizontal sum {acc} + {value}"),
            })
    })
}

/// Row-wise minimum across decimal and integer columns, ignoring nulls.
pub fn min_horizontal(columns: &[OwnedNullableColumn]) -> ColumnOperationResult<OwnedNullableColumn> {
    try_fold_horizontal(columns, |acc, value| Ok(acc.min(value)))
}

/// Row-wise maximum across decimal and integer columns, ignoring nulls.
pub fn max_horizontal(columns: &[OwnedNullableColumn]) -> ColumnOperationResult<OwnedNullableColumn> {
    try_fold_horizontal(columns, |acc, value| Ok(acc.max(value)))
}
