//! Program constants for the Portal Energy program.
//!
//! This module defines all constant values used throughout the program,
//! including PDA seeds, time periods, default deployment parameters and
//! the bounds that `InitializeParams::validate` enforces.

/// Seed for deriving the portal PDA
pub const PORTAL_SEED: &[u8] = b"portal";

/// Seed for deriving user account PDAs
pub const USER_ACCOUNT_SEED: &[u8] = b"user_account";

/// Seed for deriving position PDAs
pub const POSITION_SEED: &[u8] = b"position";

/// Seed for deriving the principal vault PDA (yield-source adapter)
pub const PRINCIPAL_VAULT_SEED: &[u8] = b"principal_vault";

/// Seed for deriving the settlement vault PDA (exchange reserve + reward pool)
pub const SETTLEMENT_VAULT_SEED: &[u8] = b"settlement_vault";

/// Seed for deriving the Portal Energy token mint PDA
pub const ENERGY_MINT_SEED: &[u8] = b"energy_mint";

/// Seed for deriving the receipt token mint PDA
pub const RECEIPT_MINT_SEED: &[u8] = b"receipt_mint";

/// Number of seconds in a day
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Number of seconds in a year (365 days)
pub const SECONDS_PER_YEAR: u64 = 365 * 86_400;

/// Basis points denominator (100% = 10000 basis points)
pub const BASIS_POINTS_DENOMINATOR: u64 = 10_000;

/// Default starting value of the max lock duration (90 days)
pub const DEFAULT_MAX_LOCK_DURATION: i64 = 90 * SECONDS_PER_DAY;

/// Default final value of the max lock duration (5 years)
pub const DEFAULT_TERMINAL_MAX_LOCK_DURATION: i64 = 5 * 365 * SECONDS_PER_DAY;

/// Default length of the funding phase (7 days)
pub const DEFAULT_FUNDING_PHASE_DURATION: i64 = 7 * SECONDS_PER_DAY;

/// Receipt tokens minted per settlement unit contributed (10x ceiling)
pub const DEFAULT_FUNDING_MAX_RETURN_MULTIPLIER: u64 = 10;

/// Redemption floor as a share of receipt face value (10%)
pub const DEFAULT_FUNDING_MIN_RETURN_BPS: u16 = 1_000;

/// Redemption ceiling as a share of receipt face value (100%)
pub const DEFAULT_FUNDING_MAX_RETURN_BPS: u16 = 10_000;

/// Yearly linear accrual of receipt value (36% of face value)
pub const DEFAULT_FUNDING_APR_BPS: u16 = 3_600;

/// Share of every converter payment routed to the reward pool (10%)
pub const DEFAULT_FUNDING_REWARD_SHARE_BPS: u16 = 1_000;

/// Haircut applied to buy inputs before pricing (1%)
pub const DEFAULT_TRADE_PROTECTION_BPS: u16 = 100;

/// Upper bound for the buy haircut (10%)
pub const MAX_TRADE_PROTECTION_BPS: u16 = 1_000;

/// Upper bound for the receipt multiplier
pub const MAX_FUNDING_MAX_RETURN_MULTIPLIER: u64 = 1_000;
