//! Power-of-ten rescaling of `i128` mantissas.
//!
//! A mantissa `m` at scale `s` denotes `m * 10^-s`. Raising the scale multiplies the
//! mantissa and is exact or overflows; lowering it divides and needs a [`RoundingMode`].
use core::cmp::Ordering;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// The largest number of fractional digits a decimal can carry.
pub const MAX_SUPPORTED_SCALE: u8 = 38;

/// How digits are discarded when a mantissa is moved to a smaller scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RoundingMode {
    /// Round to the nearest value, ties to the even neighbour
    #[default]
    HalfEven,
    /// Round toward negative infinity
    Floor,
    /// Round toward positive infinity
    Ceil,
    /// Drop the discarded digits
    TowardZero,
}

/// `10^exponent`, or `None` when it does not fit an `i128`.
#[must_use]
pub fn pow10(exponent: u8) -> Option<i128> {
    10_i128.checked_pow(u32::from(exponent))
}

/// Number of decimal digits of `value`, ignoring the sign. Zero has one digit.
#[must_use]
pub fn digit_count(value: i128) -> u8 {
    let mut magnitude = value.unsigned_abs();
    let mut digits = 1;
    while magnitude >= 10 {
        magnitude /= 10;
        digits += 1;
    }
    digits
}

/// Multiplies `value` by `10^by`, returning `None` on overflow.
#[must_use]
pub fn checked_upscale(value: i128, by: u8) -> Option<i128> {
    if value == 0 {
        return Some(0);
    }
    pow10(by).and_then(|factor| value.checked_mul(factor))
}

/// `value * 10^by` without any overflow.
#[must_use]
pub fn upscale_to_bigint(value: i128, by: u8) -> BigInt {
    BigInt::from(value) * BigInt::from(10).pow(u32::from(by))
}

/// Divides `value` by `10^by`, rounding the discarded digits with `mode`.
#[must_use]
pub fn downscale(value: i128, by: u8, mode: RoundingMode) -> i128 {
    if by == 0 {
        return value;
    }
    let Some(divisor) = pow10(by) else {
        // |value| < 10^39, so only the sign of the value survives the division
        return match mode {
            RoundingMode::Floor if value < 0 => -1,
            RoundingMode::Ceil if value > 0 => 1,
            _ => 0,
        };
    };
    let quotient = value / divisor;
    let remainder = value % divisor;
    if remainder == 0 {
        return quotient;
    }
    let away_from_zero = match mode {
        RoundingMode::TowardZero => false,
        RoundingMode::Floor => value < 0,
        RoundingMode::Ceil => value > 0,
        RoundingMode::HalfEven => {
            match (remainder.unsigned_abs() * 2).cmp(&divisor.unsigned_abs()) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => quotient % 2 != 0,
            }
        }
    };
    if away_from_zero {
        quotient + value.signum()
    } else {
        quotient
    }
}

/// Compares two mantissas carried at different scales by numeric value.
#[must_use]
pub fn cmp_rescaled(lhs: i128, lhs_scale: u8, rhs: i128, rhs_scale: u8) -> Ordering {
    let scale = lhs_scale.max(rhs_scale);
    let (lhs_by, rhs_by) = (scale - lhs_scale, scale - rhs_scale);
    match (checked_upscale(lhs, lhs_by), checked_upscale(rhs, rhs_by)) {
        (Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
        _ => upscale_to_bigint(lhs, lhs_by).cmp(&upscale_to_bigint(rhs, rhs_by)),
    }
}

/// Converts a mantissa to the nearest `f64`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn to_f64(mantissa: i128, scale: u8) -> f64 {
    mantissa as f64 / 10_f64.powi(i32::from(scale))
}
