//! This module provides conversions between nullable columns and Arrow arrays.

/// Module for converting between owned and Arrow data structures.
pub mod owned_and_arrow_conversions;
