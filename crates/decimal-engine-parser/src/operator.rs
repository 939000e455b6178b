//! Operators that can be applied to decimal expressions.
use serde::{Deserialize, Serialize};

/// Possible binary operators for simple expressions
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum BinaryOperator {
    /// Numeric addition
    Add,

    /// Numeric subtraction
    Subtract,

    /// Numeric multiplication
    Multiply,

    /// Numeric division
    Division,

    /// Comparison =
    Equal,

    /// Comparison !=
    NotEqual,

    /// Comparison <
    LessThan,

    /// Comparison <=
    LessThanOrEqual,

    /// Comparison >
    GreaterThan,

    /// Comparison >=
    GreaterThanOrEqual,
}

impl BinaryOperator {
    /// Returns true for the operators that produce a boolean.
    #[must_use]
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::LessThan
                | Self::LessThanOrEqual
                | Self::GreaterThan
                | Self::GreaterThanOrEqual
        )
    }
}

/// Possible unary operators, including the reductions over a single column
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum UnaryOperator {
    /// Round half to even at a number of fractional digits
    Round,
    /// Round toward negative infinity
    Floor,
    /// Round toward positive infinity
    Ceil,
    /// Sum
    Sum,
    /// Minimum
    Min,
    /// Maximum
    Max,
    /// Arithmetic mean
    Mean,
    /// Median
    Median,
    /// Standard deviation
    Std,
    /// Variance
    Var,
    /// Quantile
    Quantile,
    /// Running sum
    CumSum,
    /// Running minimum
    CumMin,
    /// Running maximum
    CumMax,
    /// Null replacement
    FillNull,
}
