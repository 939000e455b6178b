//! Text rendering of decimal mantissas.
use serde::{Deserialize, Serialize};

/// Options for rendering decimals as text.
///
/// These are always passed explicitly; there is no process-wide display setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DecimalFormatOptions {
    /// Remove trailing zeros of the fractional part. The decimal point goes too when
    /// every fractional digit is zero.
    pub trim_zeros: bool,
}

impl DecimalFormatOptions {
    /// Options that trim trailing fractional zeros.
    #[must_use]
    pub fn trimmed() -> Self {
        Self { trim_zeros: true }
    }
}

/// Renders `mantissa * 10^-scale`, placing the point `scale` digits from the right.
#[must_use]
pub fn format_decimal(mantissa: i128, scale: u8, options: &DecimalFormatOptions) -> String {
    let sign = if mantissa < 0 { "-" } else { "" };
    let digits = mantissa.unsigned_abs().to_string();
    let scale = usize::from(scale);
    if scale == 0 {
        return format!("{sign}{digits}");
    }
    let digits = format!("{digits:0>width$}", width = scale + 1);
    let (integer, fraction) = digits.split_at(digits.len() - scale);
    let fraction = if options.trim_zeros {
        fraction.trim_end_matches('0')
    } else {
        fraction
    };
    if fraction.is_empty() {
        format!("{sign}{integer}")
    } else {
        format!("{sign}{integer}.{fraction}")
    }
}
