//! Module with column related functionality. In particular, this module contains the
//! column types, the owned and nullable column types and every operation on decimal
//! columns: inference, promotion, arithmetic, casts, aggregation and physical interop.
mod column_type;
pub use column_type::{ColumnType, DecimalType};

mod column_operation_error;
pub use column_operation_error::{ColumnOperationError, ColumnOperationResult};

mod column_type_operation;
pub use column_type_operation::{
    try_add_subtract_column_types, try_binary_operation_column_type, try_comparison_column_types,
    try_divide_column_types, try_horizontal_decimal_type, try_multiply_column_types,
    try_rescale_plan, RescalePlan, DIVISION_SCALE_PAD,
};

mod owned_column;
pub use owned_column::OwnedColumn;

mod owned_nullable_column;
pub use owned_nullable_column::OwnedNullableColumn;

mod literal_value;
pub use literal_value::LiteralValue;

mod columnar_value;
pub use columnar_value::ColumnarValue;

/// Inference of a common decimal type for scalar input.
pub mod decimal_inference;

mod slice_operation;
mod slice_decimal_operation;

mod column_arithmetic_operation;
pub(crate) use column_arithmetic_operation::{AddOp, ArithmeticOp, DivOp, MulOp, SubOp};

mod column_comparison_operation;
pub(crate) use column_comparison_operation::{
    ComparisonOp, EqualOp, GreaterThanOp, GreaterThanOrEqualOp, LessThanOp, LessThanOrEqualOp,
    NotEqualOp,
};

mod owned_column_operation;
pub use owned_column_operation::try_binary_operation;

mod column_rounding_operation;

mod column_cast_operation;
pub use column_cast_operation::CastOptions;

pub mod aggregate_util;

pub mod group_by_util;
#[cfg(test)]
mod group_by_util_test;

mod order_by_util;

pub mod fill_null_util;

pub mod physical_decimal;
