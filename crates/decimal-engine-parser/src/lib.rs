#![doc = include_str!("../README.md")]

/// Module for handling exact decimal literals before they are bound to a column type.
pub mod intermediate_decimal;

/// Operators understood by the decimal engine.
pub mod operator;
