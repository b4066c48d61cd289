//! Display-token amounts and fixed-point base units.
//!
//! Amounts are parsed from their decimal string so `0.1` is exactly
//! `100_000` base units and never passes through a float.

use crate::error::ProgramError;

/// zSnipe mint decimals.
pub const TOKEN_DECIMALS: u8 = 6;

/// Parse a decimal display amount ("12", "0.5", "1000.000001") into base units.
///
/// Zero, negative, malformed and over-precise values are `InvalidInput`.
pub fn parse_display_amount(input: &str, decimals: u8) -> Result<u64, ProgramError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ProgramError::InvalidInput("amount is empty".into()));
    }
    if s.starts_with('-') {
        return Err(ProgramError::InvalidInput(format!(
            "amount must be positive, got {s}"
        )));
    }

    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
        return Err(ProgramError::InvalidInput(format!("invalid amount {s:?}")));
    }
    if frac.len() > decimals as usize {
        return Err(ProgramError::InvalidInput(format!(
            "amount {s} has more than {decimals} decimal places"
        )));
    }

    let scale = 10u64.pow(decimals as u32);
    let overflow = || ProgramError::InvalidInput(format!("amount {s} is too large"));

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };
    let mut frac_units: u64 = 0;
    if !frac.is_empty() {
        let padded = format!("{frac:0<width$}", width = decimals as usize);
        frac_units = padded.parse().map_err(|_| overflow())?;
    }

    let units = whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or_else(overflow)?;
    if units == 0 {
        return Err(ProgramError::InvalidInput("amount must be > 0".into()));
    }
    Ok(units)
}

/// Format base units as a display amount with trailing zeros trimmed.
pub fn format_base_units(units: u64, decimals: u8) -> String {
    let scale = 10u64.pow(decimals as u32);
    let whole = units / scale;
    let frac = units % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:0>width$}", width = decimals as usize);
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Base units as a float for JSON display.
pub fn to_display(units: u64, decimals: u8) -> f64 {
    units as f64 / 10f64.powi(decimals as i32)
}
