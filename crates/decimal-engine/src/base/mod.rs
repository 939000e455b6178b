//! This module contains basic shared functionalities of the library.
/// Conversions between decimal columns and Arrow arrays.
#[cfg(feature = "arrow")]
pub mod arrow;

pub mod database;
pub mod math;

pub(crate) mod map;

mod rayon_cfg;
pub(crate) use rayon_cfg::if_rayon;
