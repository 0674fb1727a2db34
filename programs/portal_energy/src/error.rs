//! Error types for the Portal Energy program.
//!
//! This module defines all custom error codes that can be returned by the program.
//! Every error aborts the whole transaction; no state is committed on failure.
//!
//! ## Error Groups
//! - Input validation (zero amounts, expired deadlines, bad parameters)
//! - Accounting shortfalls (balance, stake, credit, reward pool)
//! - Price/slippage
//! - Lifecycle/state (funding vs. active phase, lock duration)
//! - Yield-source adapter
//! - Math/overflow
//! - Account validation

use anchor_lang::prelude::*;

/// Custom error codes for the Portal Energy program.
///
/// Error codes start at 6000 (Anchor's custom error offset).
#[error_code]
pub enum PortalError {
    // ========== Input Validation Errors ==========

    /// Amount arguments must be non-zero.
    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    /// The caller supplied deadline has passed.
    #[msg("Transaction deadline has expired")]
    DeadlineExpired,

    /// Recipient or authority is the zero address.
    #[msg("Address must not be the default pubkey")]
    InvalidAddress,

    /// A deployment parameter is out of bounds.
    #[msg("Invalid deployment parameter")]
    InvalidParameter,

    /// The converter cannot sweep the settlement or principal token.
    #[msg("Token cannot be swept by the converter")]
    ForbiddenConvertToken,

    // ========== Accounting Shortfall Errors ==========

    /// Caller's token balance is too low for the operation.
    #[msg("Insufficient token balance for this operation")]
    InsufficientBalance,

    /// Unstake amount exceeds the staked balance.
    #[msg("Insufficient staked balance for this operation")]
    InsufficientStake,

    /// Not enough Portal Energy to cover the debit.
    #[msg("Insufficient Portal Energy for this operation")]
    InsufficientCredit,

    /// The funding reward pool cannot cover the redemption.
    #[msg("Funding reward pool cannot cover this redemption")]
    InsufficientRewards,

    /// Account has neither stake nor Portal Energy.
    #[msg("Account is empty")]
    EmptyAccount,

    // ========== Price/Slippage Errors ==========

    /// Output or swept balance is below the caller minimum.
    #[msg("Received amount is below the requested minimum")]
    SlippageExceeded,

    // ========== Lifecycle/State Errors ==========

    /// Operation requires an active portal.
    #[msg("Portal is not active yet")]
    PortalNotActive,

    /// Operation is only allowed during the funding phase.
    #[msg("Portal is already active")]
    PortalAlreadyActive,

    /// Activation attempted before the funding phase ended.
    #[msg("Funding phase is still ongoing")]
    FundingPhaseOngoing,

    /// Activation attempted with less than the minimum raise.
    #[msg("Funding balance is below the minimum amount")]
    FundingBelowMinimum,

    /// The max lock duration has reached its terminal value.
    #[msg("Max lock duration can no longer be updated")]
    LockDurationNotUpdatable,

    /// The new max lock duration would not increase the current one.
    #[msg("New max lock duration is not greater than the current one")]
    LockDurationTooLow,

    /// Clock went backwards relative to stored timestamps.
    #[msg("Invalid timestamp detected")]
    InvalidTimestamp,

    // ========== Yield-Source Adapter Errors ==========

    /// The adapter moved a different amount than requested.
    #[msg("Yield source returned an unexpected balance change")]
    AdapterBalanceMismatch,

    /// The adapter holds no surplus over staked principal.
    #[msg("No profit available to collect")]
    NoProfitAvailable,

    // ========== Math/Overflow Errors ==========

    /// Arithmetic overflow occurred during calculation.
    #[msg("Arithmetic overflow occurred during calculation")]
    MathOverflow,

    /// Arithmetic underflow occurred during calculation.
    #[msg("Arithmetic underflow occurred during calculation")]
    MathUnderflow,

    /// Division by zero attempted.
    #[msg("Division by zero attempted")]
    DivisionByZero,

    /// Integer conversion failed (value out of range).
    #[msg("Integer conversion failed - value out of range")]
    ConversionOverflow,

    // ========== Account Validation Errors ==========

    /// Signer is not allowed to act on this account.
    #[msg("Unauthorized: signer does not own this account")]
    Unauthorized,

    /// Token account or mint does not match the portal wiring.
    #[msg("Token mint mismatch - wrong token for this portal")]
    MintMismatch,

    /// Vault address does not match the portal's vault.
    #[msg("Vault address mismatch")]
    VaultMismatch,

    /// Token account is not owned by the expected authority.
    #[msg("Token account owner mismatch")]
    InvalidTokenAccountOwner,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(u32::from(PortalError::ZeroAmount), 6000);
        assert_eq!(u32::from(PortalError::ForbiddenConvertToken), 6004);
        assert_eq!(u32::from(PortalError::InsufficientBalance), 6005);
        assert_eq!(u32::from(PortalError::EmptyAccount), 6009);
        assert_eq!(u32::from(PortalError::SlippageExceeded), 6010);
        assert_eq!(u32::from(PortalError::PortalNotActive), 6011);
        assert_eq!(u32::from(PortalError::InvalidTimestamp), 6017);
        assert_eq!(u32::from(PortalError::AdapterBalanceMismatch), 6018);
        assert_eq!(u32::from(PortalError::NoProfitAvailable), 6019);
        assert_eq!(u32::from(PortalError::MathOverflow), 6020);
        assert_eq!(u32::from(PortalError::ConversionOverflow), 6023);
        assert_eq!(u32::from(PortalError::Unauthorized), 6024);
        assert_eq!(u32::from(PortalError::InvalidTokenAccountOwner), 6027);
    }
}
