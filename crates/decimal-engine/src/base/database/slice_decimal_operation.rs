use super::{
    column_type_operation::RescalePlan,
    slice_operation::{try_add, try_mul, try_slice_binary_op, try_sub},
    ColumnOperationError, ColumnOperationResult,
};
use crate::base::math::rescale::{checked_upscale, cmp_rescaled};
use core::cmp::Ordering;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

fn try_upscale(value: i128, by: u8) -> ColumnOperationResult<i128> {
    checked_upscale(value, by).ok_or_else(|| ColumnOperationError::IntegerOverflow {
        error: format!("Overflow in decimal rescale {value:?} * 10^{by}"),
    })
}

/// Compare the mantissas of two decimal columns row by row.
///
/// The smaller scale is raised to the larger one; rows whose raised mantissa leaves
/// the `i128` range are compared exactly through `BigInt`.
pub(crate) fn compare_decimal_columns(
    lhs: &[i128],
    rhs: &[i128],
    lhs_scale: u8,
    rhs_scale: u8,
) -> Vec<Ordering> {
    lhs.iter()
        .zip(rhs)
        .map(|(l, r)| cmp_rescaled(*l, lhs_scale, *r, rhs_scale))
        .collect()
}

/// Add two decimal columns whose mantissas are raised according to `plan`.
pub(crate) fn try_add_decimal_columns(
    lhs: &[i128],
    rhs: &[i128],
    plan: &RescalePlan,
    presence: Option<&[bool]>,
) -> ColumnOperationResult<Vec<i128>> {
    try_slice_binary_op(lhs, rhs, presence, |l, r| {
        try_add(
            &try_upscale(*l, plan.left_upscale)?,
            &try_upscale(*r, plan.right_upscale)?,
        )
    })
}

/// Subtract two decimal columns whose mantissas are raised according to `plan`.
pub(crate) fn try_subtract_decimal_columns(
    lhs: &[i128],
    rhs: &[i128],
    plan: &RescalePlan,
    presence: Option<&[bool]>,
) -> ColumnOperationResult<Vec<i128>> {
    try_slice_binary_op(lhs, rhs, presence, |l, r| {
        try_sub(
            &try_upscale(*l, plan.left_upscale)?,
            &try_upscale(*r, plan.right_upscale)?,
        )
    })
}

/// Multiply two decimal columns. The scales add up, so no mantissa is raised.
pub(crate) fn try_multiply_decimal_columns(
    lhs: &[i128],
    rhs: &[i128],
    plan: &RescalePlan,
    presence: Option<&[bool]>,
) -> ColumnOperationResult<Vec<i128>> {
    try_slice_binary_op(lhs, rhs, presence, |l, r| {
        try_mul(
            &try_upscale(*l, plan.left_upscale)?,
            &try_upscale(*r, plan.right_upscale)?,
        )
    })
}

/// Divide two decimal columns, truncating the quotient toward zero.
///
/// The dividend is multiplied by `10^plan.left_upscale` in `BigInt` so that the raised
/// value never overflows; only the quotient has to fit an `i128`.
pub(crate) fn try_divide_decimal_columns(
    lhs: &[i128],
    rhs: &[i128],
    plan: &RescalePlan,
    presence: Option<&[bool]>,
) -> ColumnOperationResult<Vec<i128>> {
    let applied_scale_factor = BigInt::from(10).pow(u32::from(plan.left_upscale));
    try_slice_binary_op(lhs, rhs, presence, |l, r| -> ColumnOperationResult<i128> {
        let rhs_bigint = BigInt::from(*r);
        if rhs_bigint.is_zero() {
            return Err(ColumnOperationError::DivisionByZero);
        }
        let new_bigint = BigInt::from(*l) * &applied_scale_factor / rhs_bigint;
        new_bigint
            .to_i128()
            .ok_or_else(|| ColumnOperationError::IntegerOverflow {
                error: format!("Overflow in decimal division {l:?} / {r:?}"),
            })
    })
}
