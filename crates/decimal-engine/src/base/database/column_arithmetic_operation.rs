use super::{
    column_type_operation::{
        try_add_subtract_column_types, try_divide_column_types, try_multiply_column_types,
        try_rescale_plan, RescalePlan,
    },
    owned_nullable_column::combine_presence,
    slice_decimal_operation::{
        try_add_decimal_columns, try_divide_decimal_columns, try_multiply_decimal_columns,
        try_subtract_decimal_columns,
    },
    slice_operation::{slice_binary_op, try_add, try_div, try_mul, try_slice_binary_op, try_sub},
    ColumnOperationError, ColumnOperationResult, ColumnType, OwnedColumn, OwnedNullableColumn,
};
use core::fmt::Debug;
use decimal_engine_parser::operator::BinaryOperator;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, Zero};

/// The length two operands combine to: equal lengths pair row-wise and a single row
/// broadcasts against the other operand.
pub(crate) fn broadcast_len(lhs: usize, rhs: usize) -> ColumnOperationResult<usize> {
    match (lhs, rhs) {
        (lhs, rhs) if lhs == rhs => Ok(lhs),
        (1, len) | (len, 1) => Ok(len),
        (len_a, len_b) => Err(ColumnOperationError::DifferentColumnLength { len_a, len_b }),
    }
}

pub trait ArithmeticOp {
    fn operator() -> BinaryOperator;
    fn op<T>(l: &T, r: &T) -> ColumnOperationResult<T>
    where
        T: Debug + CheckedDiv + CheckedMul + CheckedAdd + CheckedSub + Zero;
    fn float_op(l: f64, r: f64) -> f64;
    fn result_type(lhs: ColumnType, rhs: ColumnType) -> ColumnOperationResult<ColumnType>;
    fn decimal_op(
        lhs: &[i128],
        rhs: &[i128],
        plan: &RescalePlan,
        presence: Option<&[bool]>,
    ) -> ColumnOperationResult<Vec<i128>>;

    fn owned_column_element_wise_arithmetic(
        lhs: &OwnedNullableColumn,
        rhs: &OwnedNullableColumn,
    ) -> ColumnOperationResult<OwnedNullableColumn> {
        let result_type = Self::result_type(lhs.column_type(), rhs.column_type())?;
        let len = broadcast_len(lhs.len(), rhs.len())?;
        let (lhs, rhs) = (lhs.broadcast_to(len)?, rhs.broadcast_to(len)?);
        let presence = combine_presence(&lhs, &rhs);
        let values = match (&lhs.values, &rhs.values, result_type) {
            (OwnedColumn::BigInt(lhs), OwnedColumn::BigInt(rhs), _) => OwnedColumn::BigInt(
                try_slice_binary_op(lhs, rhs, presence.as_deref(), Self::op)?,
            ),
            (_, _, ColumnType::Decimal(_)) => {
                match (lhs.values.to_mantissas(), rhs.values.to_mantissas()) {
                    (Some((lhs_scale, lhs_values)), Some((rhs_scale, rhs_values))) => {
                        let plan = try_rescale_plan(lhs_scale, rhs_scale, Self::operator())?;
                        OwnedColumn::Decimal(
                            plan.result,
                            Self::decimal_op(&lhs_values, &rhs_values, &plan, presence.as_deref())?,
                        )
                    }
                    _ => return Err(Self::invalid_types(&lhs, &rhs)),
                }
            }
            _ => match (lhs.values.to_f64_values(), rhs.values.to_f64_values()) {
                (Some(lhs_values), Some(rhs_values)) => OwnedColumn::Float64(slice_binary_op(
                    &lhs_values,
                    &rhs_values,
                    |l, r| Self::float_op(*l, *r),
                )),
                _ => return Err(Self::invalid_types(&lhs, &rhs)),
            },
        };
        Ok(OwnedNullableColumn { values, presence })
    }

    fn invalid_types(lhs: &OwnedNullableColumn, rhs: &OwnedNullableColumn) -> ColumnOperationError {
        ColumnOperationError::BinaryOperationInvalidColumnType {
            operator: Self::operator(),
            left_type: lhs.column_type(),
            right_type: rhs.column_type(),
        }
    }
}

pub struct AddOp {}
impl ArithmeticOp for AddOp {
    fn operator() -> BinaryOperator {
        BinaryOperator::Add
    }

    fn op<T>(l: &T, r: &T) -> ColumnOperationResult<T>
    where
        T: Debug + CheckedDiv + CheckedMul + CheckedAdd + CheckedSub + Zero,
    {
        try_add(l, r)
    }

    fn float_op(l: f64, r: f64) -> f64 {
        l + r
    }

    fn result_type(lhs: ColumnType, rhs: ColumnType) -> ColumnOperationResult<ColumnType> {
        try_add_subtract_column_types(lhs, rhs, BinaryOperator::Add)
    }

    fn decimal_op(
        lhs: &[i128],
        rhs: &[i128],
        plan: &RescalePlan,
        presence: Option<&[bool]>,
    ) -> ColumnOperationResult<Vec<i128>> {
        try_add_decimal_columns(lhs, rhs, plan, presence)
    }
}

pub struct SubOp {}
impl ArithmeticOp for SubOp {
    fn operator() -> BinaryOperator {
        BinaryOperator::Subtract
    }

    fn op<T>(l: &T, r: &T) -> ColumnOperationResult<T>
    where
        T: Debug + CheckedDiv + CheckedMul + CheckedAdd + CheckedSub + Zero,
    {
        try_sub(l, r)
    }

    fn float_op(l: f64, r: f64) -> f64 {
        l - r
    }

    fn result_type(lhs: ColumnType, rhs: ColumnType) -> ColumnOperationResult<ColumnType> {
        try_add_subtract_column_types(lhs, rhs, BinaryOperator::Subtract)
    }

    fn decimal_op(
        lhs: &[i128],
        rhs: &[i128],
        plan: &RescalePlan,
        presence: Option<&[bool]>,
    ) -> ColumnOperationResult<Vec<i128>> {
        try_subtract_decimal_columns(lhs, rhs, plan, presence)
    }
}

pub struct MulOp {}
impl ArithmeticOp for MulOp {
    fn operator() -> BinaryOperator {
        BinaryOperator::Multiply
    }

    fn op<T>(l: &T, r: &T) -> ColumnOperationResult<T>
    where
        T: Debug + CheckedDiv + CheckedMul + CheckedAdd + CheckedSub + Zero,
    {
        try_mul(l, r)
    }

    fn float_op(l: f64, r: f64) -> f64 {
        l * r
    }

    fn result_type(lhs: ColumnType, rhs: ColumnType) -> ColumnOperationResult<ColumnType> {
        try_multiply_column_types(lhs, rhs)
    }

    fn decimal_op(
        lhs: &[i128],
        rhs: &[i128],
        plan: &RescalePlan,
        presence: Option<&[bool]>,
    ) -> ColumnOperationResult<Vec<i128>> {
        try_multiply_decimal_columns(lhs, rhs, plan, presence)
    }
}

pub struct DivOp {}
impl ArithmeticOp for DivOp {
    fn operator() -> BinaryOperator {
        BinaryOperator::Division
    }

    fn op<T>(l: &T, r: &T) -> ColumnOperationResult<T>
    where
        T: Debug + CheckedDiv + CheckedMul + CheckedAdd + CheckedSub + Zero,
    {
        try_div(l, r)
    }

    fn float_op(l: f64, r: f64) -> f64 {
        l / r
    }

    fn result_type(lhs: ColumnType, rhs: ColumnType) -> ColumnOperationResult<ColumnType> {
        try_divide_column_types(lhs, rhs)
    }

    fn decimal_op(
        lhs: &[i128],
        rhs: &[i128],
        plan: &RescalePlan,
        presence: Option<&[bool]>,
    ) -> ColumnOperationResult<Vec<i128>> {
        try_divide_decimal_columns(lhs, rhs, plan, presence)
    }
}
