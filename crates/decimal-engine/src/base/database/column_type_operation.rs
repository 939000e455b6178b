use super::{ColumnOperationError, ColumnOperationResult};
use crate::base::{
    database::{ColumnType, DecimalType},
    math::{decimal::DecimalError, rescale::MAX_SUPPORTED_SCALE},
};
use decimal_engine_parser::operator::BinaryOperator;
use serde::{Deserialize, Serialize};

/// Fractional digits a quotient carries beyond the scale of its dividend.
pub const DIVISION_SCALE_PAD: u8 = 4;

/// The result type of a decimal operation together with how far each operand's mantissa
/// has to be raised before the kernel runs.
///
/// For division `left_upscale` is the full power of ten the dividend is multiplied by
/// ahead of the integer division, `result_scale - lhs_scale + rhs_scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescalePlan {
    /// The type of the result. Its precision is always unconstrained.
    pub result: DecimalType,
    /// Power of ten applied to the left mantissas
    pub left_upscale: u8,
    /// Power of ten applied to the right mantissas
    pub right_upscale: u8,
}

fn invalid_scale(scale: u16) -> ColumnOperationError {
    ColumnOperationError::DecimalConversionError {
        source: DecimalError::InvalidScale {
            scale: scale.to_string(),
        },
    }
}

/// Plans a decimal operation between operands carried at `lhs_scale` and `rhs_scale`.
///
/// | operator | result scale |
/// |----------|--------------|
/// | `+`, `-`, comparisons | `max(sa, sb)`, the smaller side raised |
/// | `*` | `sa + sb` |
/// | `/` | `sa + DIVISION_SCALE_PAD` |
///
/// A result scale above 38 is an `InvalidScale` error.
pub fn try_rescale_plan(
    lhs_scale: u8,
    rhs_scale: u8,
    operator: BinaryOperator,
) -> ColumnOperationResult<RescalePlan> {
    let (scale, left_upscale, right_upscale) = match operator {
        BinaryOperator::Multiply => (u16::from(lhs_scale) + u16::from(rhs_scale), 0, 0),
        BinaryOperator::Division => {
            let scale = u16::from(lhs_scale) + u16::from(DIVISION_SCALE_PAD);
            (scale, DIVISION_SCALE_PAD + rhs_scale, 0)
        }
        BinaryOperator::Add
        | BinaryOperator::Subtract
        | BinaryOperator::Equal
        | BinaryOperator::NotEqual
        | BinaryOperator::LessThan
        | BinaryOperator::LessThanOrEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterThanOrEqual => {
            let scale = lhs_scale.max(rhs_scale);
            (u16::from(scale), scale - lhs_scale, scale - rhs_scale)
        }
    };
    let scale = u8::try_from(scale)
        .ok()
        .filter(|scale| *scale <= MAX_SUPPORTED_SCALE)
        .ok_or_else(|| invalid_scale(scale))?;
    Ok(RescalePlan {
        result: DecimalType::unconstrained(scale)?,
        left_upscale,
        right_upscale,
    })
}

/// Shared promotion of the arithmetic operators.
///
/// Integers stay integers, a float operand makes the result a float and otherwise the
/// result is a decimal planned by [`try_rescale_plan`].
fn try_arithmetic_column_types(
    lhs: ColumnType,
    rhs: ColumnType,
    operator: BinaryOperator,
) -> ColumnOperationResult<ColumnType> {
    match (lhs.scale(), rhs.scale()) {
        _ if !lhs.is_numeric() || !rhs.is_numeric() => {
            Err(ColumnOperationError::BinaryOperationInvalidColumnType {
                operator,
                left_type: lhs,
                right_type: rhs,
            })
        }
        _ if lhs == ColumnType::BigInt && rhs == ColumnType::BigInt => Ok(ColumnType::BigInt),
        (Some(lhs_scale), Some(rhs_scale)) => Ok(ColumnType::Decimal(
            try_rescale_plan(lhs_scale, rhs_scale, operator)?.result,
        )),
        _ => Ok(ColumnType::Float64),
    }
}

/// Determine the output type of an add or subtract operation if it is possible
/// to add or subtract the two input types. If the types are not compatible, return
/// an error.
pub fn try_add_subtract_column_types(
    lhs: ColumnType,
    rhs: ColumnType,
    operator: BinaryOperator,
) -> ColumnOperationResult<ColumnType> {
    try_arithmetic_column_types(lhs, rhs, operator)
}

/// Determine the output type of a multiplication operation if it is possible
/// to multiply the two input types. If the types are not compatible, return
/// an error.
pub fn try_multiply_column_types(
    lhs: ColumnType,
    rhs: ColumnType,
) -> ColumnOperationResult<ColumnType> {
    try_arithmetic_column_types(lhs, rhs, BinaryOperator::Multiply)
}

/// Determine the output type of a division operation if it is possible
/// to divide the two input types. If the types are not compatible, return
/// an error.
pub fn try_divide_column_types(
    lhs: ColumnType,
    rhs: ColumnType,
) -> ColumnOperationResult<ColumnType> {
    try_arithmetic_column_types(lhs, rhs, BinaryOperator::Division)
}

/// Determine whether two types can be compared. Numeric types compare with each other,
/// booleans and strings only with their own type.
pub fn try_comparison_column_types(
    lhs: ColumnType,
    rhs: ColumnType,
    operator: BinaryOperator,
) -> ColumnOperationResult<ColumnType> {
    let comparable = (lhs.is_numeric() && rhs.is_numeric())
        || matches!(
            (lhs, rhs),
            (ColumnType::Boolean, ColumnType::Boolean) | (ColumnType::VarChar, ColumnType::VarChar)
        );
    if comparable {
        Ok(ColumnType::Boolean)
    } else {
        Err(ColumnOperationError::BinaryOperationInvalidColumnType {
            operator,
            left_type: lhs,
            right_type: rhs,
        })
    }
}

/// Determine the output type of any binary operator.
pub fn try_binary_operation_column_type(
    lhs: ColumnType,
    rhs: ColumnType,
    operator: BinaryOperator,
) -> ColumnOperationResult<ColumnType> {
    match operator {
        BinaryOperator::Add | BinaryOperator::Subtract => {
            try_add_subtract_column_types(lhs, rhs, operator)
        }
        BinaryOperator::Multiply => try_multiply_column_types(lhs, rhs),
        BinaryOperator::Division => try_divide_column_types(lhs, rhs),
        BinaryOperator::Equal
        | BinaryOperator::NotEqual
        | BinaryOperator::LessThan
        | BinaryOperator::LessThanOrEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterThanOrEqual => try_comparison_column_types(lhs, rhs, operator),
    }
}

/// The common type of the operands of a horizontal reduction: every operand is raised to
/// the largest scale among them.
pub fn try_horizontal_decimal_type(types: &[ColumnType]) -> ColumnOperationResult<DecimalType> {
    let scale = types.iter().try_fold(0_u8, |scale, column_type| {
        column_type
            .scale()
            .map(|column_scale| scale.max(column_scale))
            .ok_or(ColumnOperationError::CastingError {
                from_type: *column_type,
                to_type: ColumnType::Decimal(DecimalType::default()),
            })
    })?;
    Ok(DecimalType::unconstrained(scale)?)
}
