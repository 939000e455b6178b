use super::{
    column_arithmetic_operation::broadcast_len, column_type_operation::try_comparison_column_types,
    owned_nullable_column::combine_presence, slice_decimal_operation::compare_decimal_columns,
    slice_operation::slice_binary_op, ColumnOperationError, ColumnOperationResult, OwnedColumn,
    OwnedNullableColumn,
};
use core::cmp::Ordering;
use decimal_engine_parser::operator::BinaryOperator;

pub trait ComparisonOp {
    fn operator() -> BinaryOperator;

    /// Whether an ordering between the operands satisfies the comparison
    fn matches(ordering: Ordering) -> bool;

    /// Compares two columns row by row. Numeric columns of any kind compare with each other
    /// by value, decimals at the larger of the two scales. A comparison involving `NaN` is
    /// false.
    fn owned_column_element_wise_comparison(
        lhs: &OwnedNullableColumn,
        rhs: &OwnedNullableColumn,
    ) -> ColumnOperationResult<OwnedNullableColumn> {
        try_comparison_column_types(lhs.column_type(), rhs.column_type(), Self::operator())?;
        let len = broadcast_len(lhs.len(), rhs.len())?;
        let (lhs, rhs) = (lhs.broadcast_to(len)?, rhs.broadcast_to(len)?);
        let presence = combine_presence(&lhs, &rhs);
        let result = match (&lhs.values, &rhs.values) {
            (OwnedColumn::Boolean(lhs), OwnedColumn::Boolean(rhs)) => {
                slice_binary_op(lhs, rhs, |l, r| Self::matches(l.cmp(r)))
            }
            (OwnedColumn::VarChar(lhs), OwnedColumn::VarChar(rhs)) => {
                slice_binary_op(lhs, rhs, |l, r| Self::matches(l.cmp(r)))
            }
            (lhs_values, rhs_values) => {
                match (lhs_values.to_mantissas(), rhs_values.to_mantissas()) {
                    (Some((lhs_scale, lhs_values)), Some((rhs_scale, rhs_values))) => {
                        compare_decimal_columns(&lhs_values, &rhs_values, lhs_scale, rhs_scale)
                            .into_iter()
                            .map(Self::matches)
                            .collect()
                    }
                    _ => match (lhs_values.to_f64_values(), rhs_values.to_f64_values()) {
                        (Some(lhs_values), Some(rhs_values)) => {
                            slice_binary_op(&lhs_values, &rhs_values, |l, r| {
                                l.partial_cmp(r).is_some_and(Self::matches)
                            })
                        }
                        _ => {
                            return Err(ColumnOperationError::BinaryOperationInvalidColumnType {
                                operator: Self::operator(),
                                left_type: lhs.column_type(),
                                right_type: rhs.column_type(),
                            })
                        }
                    },
                }
            }
        };
        let result = match &presence {
            Some(presence) => result
                .into_iter()
                .zip(presence)
                .map(|(value, present)| value && *present)
                .collect(),
            None => result,
        };
        Ok(OwnedNullableColumn {
            values: OwnedColumn::Boolean(result),
            presence,
        })
    }
}

pub struct EqualOp {}
impl ComparisonOp for EqualOp {
    fn operator() -> BinaryOperator {
        BinaryOperator::Equal
    }

    fn matches(ordering: Ordering) -> bool {
        ordering == Ordering::Equal
    }
}

pub struct NotEqualOp {}
impl ComparisonOp for NotEqualOp {
    fn operator() -> BinaryOperator {
        BinaryOperator::NotEqual
    }

    fn matches(ordering: Ordering) -> bool {
        ordering != Ordering::Equal
    }
}

pub struct LessThanOp {}
impl ComparisonOp for LessThanOp {
    fn operator() -> BinaryOperator {
        BinaryOperator::LessThan
    }

    fn matches(ordering: Ordering) -> bool {
        ordering == Ordering::Less
    }
}

pub struct LessThanOrEqualOp {}
impl ComparisonOp for LessThanOrEqualOp {
    fn operator() -> BinaryOperator {
        BinaryOperator::LessThanOrEqual
    }

    fn matches(ordering: Ordering) -> bool {
        ordering != Ordering::Greater
    }
}

pub struct GreaterThanOp {}
impl ComparisonOp for GreaterThanOp {
    fn operator() -> BinaryOperator {
        BinaryOperator::GreaterThan
    }

    fn matches(ordering: Ordering) -> bool {
        ordering == Ordering::Greater
    }
}

pub struct GreaterThanOrEqualOp {}
impl ComparisonOp for GreaterThanOrEqualOp {
    fn operator() -> BinaryOperator {
        BinaryOperator::GreaterThanOrEqual
    }

    fn matches(ordering: Ordering) -> bool {
        ordering != Ordering::Less
    }
}
