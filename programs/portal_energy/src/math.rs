//! Checked fixed-point helpers shared by the ledger, exchange and funding math.
//!
//! All intermediate products are computed in `u128` and narrowed back to
//! `u64` only at the end, so a single overflow aborts the instruction.

use anchor_lang::prelude::*;

use crate::error::PortalError;

/// `a * b / denominator`, floored.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128> {
    require!(denominator > 0, PortalError::DivisionByZero);
    let product = a.checked_mul(b).ok_or(PortalError::MathOverflow)?;
    Ok(product / denominator)
}

/// Narrow a `u128` intermediate back to token precision.
pub fn to_u64(value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| error!(PortalError::ConversionOverflow))
}

/// Seconds as an unsigned duration, rejecting negative spans.
pub fn duration(from: i64, to: i64) -> Result<u128> {
    let span = to.checked_sub(from).ok_or(PortalError::MathOverflow)?;
    require!(span >= 0, PortalError::InvalidTimestamp);
    Ok(span as u128)
}

/// Apply a basis-point share to an amount.
pub fn apply_bps(amount: u64, bps: u16) -> Result<u64> {
    to_u64(mul_div(
        amount as u128,
        bps as u128,
        crate::constants::BASIS_POINTS_DENOMINATOR as u128,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_div_floors() {
        assert_eq!(mul_div(10, 3, 4).unwrap(), 7);
        assert_eq!(mul_div(0, u128::MAX, 1).unwrap(), 0);
    }

    #[test]
    fn mul_div_rejects_zero_denominator() {
        assert_eq!(
            mul_div(1, 1, 0).unwrap_err(),
            PortalError::DivisionByZero.into()
        );
    }

    #[test]
    fn mul_div_rejects_overflow() {
        assert_eq!(
            mul_div(u128::MAX, 2, 1).unwrap_err(),
            PortalError::MathOverflow.into()
        );
    }

    #[test]
    fn to_u64_rejects_wide_values() {
        assert_eq!(to_u64(u64::MAX as u128).unwrap(), u64::MAX);
        assert_eq!(
            to_u64(u64::MAX as u128 + 1).unwrap_err(),
            PortalError::ConversionOverflow.into()
        );
    }

    #[test]
    fn duration_rejects_clock_going_backwards() {
        assert_eq!(duration(100, 160).unwrap(), 60);
        assert_eq!(
            duration(160, 100).unwrap_err(),
            PortalError::InvalidTimestamp.into()
        );
    }

    #[test]
    fn apply_bps_takes_share() {
        assert_eq!(apply_bps(1_000, 1_000).unwrap(), 100);
        assert_eq!(apply_bps(1_000, 10_000).unwrap(), 1_000);
        assert_eq!(apply_bps(99, 100).unwrap(), 0);
    }
}
