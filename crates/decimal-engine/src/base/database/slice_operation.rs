use super::{ColumnOperationError, ColumnOperationResult};
use core::fmt::Debug;
use num_traits::{
    ops::checked::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub},
    Zero,
};

/// Function for checked addition with overflow error handling
pub(super) fn try_add<T>(l: &T, r: &T) -> ColumnOperationResult<T>
where
    T: CheckedAdd<Output = T> + Debug,
{
    l.checked_add(r)
        .ok_or(ColumnOperationError::IntegerOverflow {
            error: format!("Overflow in integer addition {l:?} + {r:?}"),
        })
}

/// Function for checked subtraction with overflow error handling
pub(super) fn try_sub<T>(l: &T, r: &T) -> ColumnOperationResult<T>
where
    T: CheckedSub<Output = T> + Debug,
{
    l.checked_sub(r)
        .ok_or(ColumnOperationError::IntegerOverflow {
            error: format!("Overflow in integer subtraction {l:?} - {r:?}"),
        })
}

/// Function for checked multiplication with overflow error handling
pub(super) fn try_mul<T>(l: &T, r: &T) -> ColumnOperationResult<T>
where
    T: CheckedMul<Output = T> + Debug,
{
    l.checked_mul(r)
        .ok_or(ColumnOperationError::IntegerOverflow {
            error: format!("Overflow in integer multiplication {l:?} * {r:?}"),
        })
}

/// Function for checked division with division by zero and overflow error handling
pub(super) fn try_div<T>(l: &T, r: &T) -> ColumnOperationResult<T>
where
    T: CheckedDiv<Output = T> + Zero + Debug,
{
    if r.is_zero() {
        return Err(ColumnOperationError::DivisionByZero);
    }
    l.checked_div(r)
        .ok_or(ColumnOperationError::IntegerOverflow {
            error: format!("Overflow in integer division {l:?} / {r:?}"),
        })
}

// Generic binary operations on slices
/// Apply a binary operator to two slices of the same length.
pub(crate) fn slice_binary_op<S, T, U, F>(lhs: &[S], rhs: &[T], op: F) -> Vec<U>
where
    F: Fn(&S, &T) -> U,
{
    lhs.iter()
        .zip(rhs.iter())
        .map(|(l, r)| -> U { op(l, r) })
        .collect::<Vec<_>>()
}

/// Apply a fallible binary operator to the present rows of two slices of the same length.
///
/// Rows that are null in `presence` are not evaluated, so they can never raise an error,
/// and receive `U::default()`.
pub(crate) fn try_slice_binary_op<S, T, U, F>(
    lhs: &[S],
    rhs: &[T],
    presence: Option<&[bool]>,
    op: F,
) -> ColumnOperationResult<Vec<U>>
where
    U: Default,
    F: Fn(&S, &T) -> ColumnOperationResult<U>,
{
    lhs.iter()
        .zip(rhs.iter())
        .enumerate()
        .map(|(row, (l, r))| -> ColumnOperationResult<U> {
            if presence.map_or(true, |presence| presence[row]) {
                op(l, r)
            } else {
                Ok(U::default())
            }
        })
        .collect::<ColumnOperationResult<Vec<U>>>()
}

/// Apply a fallible unary operator to the present rows of a slice.
pub(crate) fn try_slice_unary_op<S, U, F>(
    values: &[S],
    presence: Option<&[bool]>,
    op: F,
) -> ColumnOperationResult<Vec<U>>
where
    U: Default,
    F: Fn(usize, &S) -> ColumnOperationResult<U>,
{
    values
        .iter()
        .enumerate()
        .map(|(row, value)| {
            if presence.map_or(true, |presence| presence[row]) {
                op(row, value)
            } else {
                Ok(U::default())
            }
        })
        .collect()
}
