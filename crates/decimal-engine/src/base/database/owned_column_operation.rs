use super::{
    AddOp, ArithmeticOp, ColumnOperationResult, ColumnarValue, ComparisonOp, DivOp, EqualOp,
    GreaterThanOp, GreaterThanOrEqualOp, LessThanOp, LessThanOrEqualOp, LiteralValue, MulOp,
    NotEqualOp, OwnedNullableColumn, SubOp,
};
use decimal_engine_parser::operator::BinaryOperator;

impl OwnedNullableColumn {
    /// Element-wise addition for two columns
    #[tracing::instrument(name = "OwnedNullableColumn::element_wise_add", level = "debug", skip_all)]
    pub fn element_wise_add(&self, rhs: &Self) -> ColumnOperationResult<Self> {
        AddOp::owned_column_element_wise_arithmetic(self, rhs)
    }

    /// Element-wise subtraction for two columns
    #[tracing::instrument(name = "OwnedNullableColumn::element_wise_sub", level = "debug", skip_all)]
    pub fn element_wise_sub(&self, rhs: &Self) -> ColumnOperationResult<Self> {
        SubOp::owned_column_element_wise_arithmetic(self, rhs)
    }

    /// Element-wise multiplication for two columns
    #[tracing::instrument(name = "OwnedNullableColumn::element_wise_mul", level = "debug", skip_all)]
    pub fn element_wise_mul(&self, rhs: &Self) -> ColumnOperationResult<Self> {
        MulOp::owned_column_element_wise_arithmetic(self, rhs)
    }

    /// Element-wise division for two columns
    #[tracing::instrument(name = "OwnedNullableColumn::element_wise_div", level = "debug", skip_all)]
    pub fn element_wise_div(&self, rhs: &Self) -> ColumnOperationResult<Self> {
        DivOp::owned_column_element_wise_arithmetic(self, rhs)
    }

    /// Element-wise equality check for two columns
    pub fn element_wise_eq(&self, rhs: &Self) -> ColumnOperationResult<Self> {
        EqualOp::owned_column_element_wise_comparison(self, rhs)
    }

    /// Element-wise inequality check for two columns
    pub fn element_wise_ne(&self, rhs: &Self) -> ColumnOperationResult<Self> {
        NotEqualOp::owned_column_element_wise_comparison(self, rhs)
    }

    /// Element-wise less than check for two columns
    pub fn element_wise_lt(&self, rhs: &Self) -> ColumnOperationResult<Self> {
        LessThanOp::owned_column_element_wise_comparison(self, rhs)
    }

    /// Element-wise less than or equal check for two columns
    pub fn element_wise_le(&self, rhs: &Self) -> ColumnOperationResult<Self> {
        LessThanOrEqualOp::owned_column_element_wise_comparison(self, rhs)
    }

    /// Element-wise greater than check for two columns
    pub fn element_wise_gt(&self, rhs: &Self) -> ColumnOperationResult<Self> {
        GreaterThanOp::owned_column_element_wise_comparison(self, rhs)
    }

    /// Element-wise greater than or equal check for two columns
    pub fn element_wise_ge(&self, rhs: &Self) -> ColumnOperationResult<Self> {
        GreaterThanOrEqualOp::owned_column_element_wise_comparison(self, rhs)
    }

    /// Applies any binary operator to two columns.
    pub fn element_wise_binary_op(
        &self,
        rhs: &Self,
        operator: BinaryOperator,
    ) -> ColumnOperationResult<Self> {
        match operator {
            BinaryOperator::Add => self.element_wise_add(rhs),
            BinaryOperator::Subtract => self.element_wise_sub(rhs),
            BinaryOperator::Multiply => self.element_wise_mul(rhs),
            BinaryOperator::Division => self.element_wise_div(rhs),
            BinaryOperator::Equal => self.element_wise_eq(rhs),
            BinaryOperator::NotEqual => self.element_wise_ne(rhs),
            BinaryOperator::LessThan => self.element_wise_lt(rhs),
            BinaryOperator::LessThanOrEqual => self.element_wise_le(rhs),
            BinaryOperator::GreaterThan => self.element_wise_gt(rhs),
            BinaryOperator::GreaterThanOrEqual => self.element_wise_ge(rhs),
        }
    }
}

/// Applies a binary operator to columns and literals in any mix.
///
/// An integer or float literal next to a decimal operand is bound as a decimal at that
/// operand's scale before the operator runs, so `price * 2` keeps the scale arithmetic of
/// `price * 2.00`. Two literals produce a literal.
#[tracing::instrument(name = "try_binary_operation", level = "debug", skip(lhs, rhs))]
pub fn try_binary_operation(
    lhs: &ColumnarValue,
    rhs: &ColumnarValue,
    operator: BinaryOperator,
) -> ColumnOperationResult<ColumnarValue> {
    let lhs_column = operand_column(lhs, rhs)?;
    let rhs_column = operand_column(rhs, lhs)?;
    let result = lhs_column.element_wise_binary_op(&rhs_column, operator)?;
    Ok(match (lhs, rhs) {
        (ColumnarValue::Literal(_), ColumnarValue::Literal(_)) => {
            ColumnarValue::Literal(LiteralValue::from_column_row(&result, 0))
        }
        _ => ColumnarValue::Column(result),
    })
}

fn operand_column(
    operand: &ColumnarValue,
    other: &ColumnarValue,
) -> ColumnOperationResult<OwnedNullableColumn> {
    match operand {
        ColumnarValue::Column(column) => Ok(column.clone()),
        ColumnarValue::Literal(literal) => literal.to_operand_column(other.column_type()),
    }
}
