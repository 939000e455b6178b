use crate::base::{database::ColumnType, math::decimal::DecimalError};
use core::result::Result;
use decimal_engine_parser::operator::{BinaryOperator, UnaryOperator};
use snafu::Snafu;

/// Errors from operations on columns.
#[derive(Snafu, Debug, PartialEq, Eq)]
pub enum ColumnOperationError {
    /// Two columns do not have the same length and neither can be broadcast
    #[snafu(display("Columns have different lengths: {len_a} != {len_b}"))]
    DifferentColumnLength {
        /// The length of the first column
        len_a: usize,
        /// The length of the second column
        len_b: usize,
    },

    /// A per-row parameter has neither one entry nor one entry per row
    #[snafu(display("Parameter has length {parameter_len} but the column has {column_len} rows"))]
    ParameterLengthMismatch {
        /// The length of the parameter
        parameter_len: usize,
        /// The length of the column
        column_len: usize,
    },

    /// A byte buffer does not hold a whole number of fixed-width values
    #[snafu(display("Buffer of {buffer_len} bytes is not a multiple of the {width}-byte width"))]
    InvalidBufferLength {
        /// The length of the buffer in bytes
        buffer_len: usize,
        /// The width of one value in bytes
        width: usize,
    },

    /// The presence vector of a nullable column does not match its values
    #[snafu(display("Presence has length {presence_len} but the column has {column_len} rows"))]
    PresenceLengthMismatch {
        /// The length of the presence vector
        presence_len: usize,
        /// The length of the column
        column_len: usize,
    },

    /// Incorrect `ColumnType` in binary operations
    #[snafu(display("{operator:?}(lhs: {left_type}, rhs: {right_type}) is not supported"))]
    BinaryOperationInvalidColumnType {
        /// `BinaryOperator` that caused the error
        operator: BinaryOperator,
        /// `ColumnType` of left operand
        left_type: ColumnType,
        /// `ColumnType` of right operand
        right_type: ColumnType,
    },

    /// Incorrect `ColumnType` in unary operations
    #[snafu(display("{operator:?}(operand: {operand_type}) is not supported"))]
    UnaryOperationInvalidColumnType {
        /// `UnaryOperator` that caused the error
        operator: UnaryOperator,
        /// `ColumnType` of the operand
        operand_type: ColumnType,
    },

    /// An operation parameter is outside its domain
    #[snafu(display("Invalid parameter: {error}"))]
    InvalidParameter {
        /// Description of the problem
        error: String,
    },

    /// Overflow in integer operations
    #[snafu(display("Overflow in integer operation: {error}"))]
    IntegerOverflow {
        /// The underlying overflow error
        error: String,
    },

    /// Division by zero
    #[snafu(display("Division by zero"))]
    DivisionByZero,

    /// There is no cast between the two types
    #[snafu(display("Cannot cast {from_type} to {to_type}"))]
    CastingError {
        /// The type of the input column
        from_type: ColumnType,
        /// The requested type
        to_type: ColumnType,
    },

    /// A single row could not be converted
    #[snafu(display("Cannot convert row {row}: {source}"))]
    RowConversionError {
        /// Index of the failing row
        row: usize,
        /// Why the row failed
        source: DecimalError,
    },

    /// Errors related to decimal operations
    #[snafu(transparent)]
    DecimalConversionError {
        /// The underlying source error
        source: DecimalError,
    },
}

/// Result type for column operations
pub type ColumnOperationResult<T> = Result<T, ColumnOperationError>;
