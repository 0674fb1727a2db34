use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::PortalError;
use crate::math;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortalPhase {
    Funding,
    Active,
}

impl Default for PortalPhase {
    fn default() -> Self {
        PortalPhase::Funding
    }
}

/// Global state of one portal: wiring, the max-lock parameter, the
/// internal exchange and the bootstrap funding counters. Everything that
/// has to stay consistent across a transaction lives here.
#[account]
#[derive(Default, Debug)]
pub struct Portal {
    pub principal_mint: Pubkey,
    pub principal_vault: Pubkey,
    pub settlement_mint: Pubkey,
    pub settlement_vault: Pubkey,
    pub energy_mint: Pubkey,
    pub receipt_mint: Pubkey,
    pub profit_recipient: Pubkey,

    pub max_lock_duration: i64,
    pub terminal_max_lock_duration: i64,
    pub lock_duration_updatable: bool,

    pub total_principal_staked: u64,
    pub constant_product: u128,
    pub trade_protection_bps: u16,

    pub phase: PortalPhase,
    pub created_at: i64,
    pub activated_at: i64,
    pub funding_phase_duration: i64,

    pub funding_min_amount: u64,
    pub funding_exchange_ratio: u64,
    pub funding_max_return_multiplier: u64,

    pub funding_min_return_bps: u16,
    pub funding_max_return_bps: u16,
    pub funding_apr_bps: u16,
    pub funding_reward_share_bps: u16,

    pub funding_balance: u64,
    pub funding_reward_pool: u64,
    pub funding_max_rewards: u64,

    pub amount_to_convert: u64,
    pub position_count: u64,

    pub bump: u8,
    pub principal_vault_bump: u8,
    pub settlement_vault_bump: u8,
    pub energy_mint_bump: u8,
    pub receipt_mint_bump: u8,
}

impl Portal {
    pub const LEN: usize = 8
        + (32 * 7)
        + (8 * 2) + 1
        + 8 + 16 + 2
        + 1 + (8 * 3)
        + (8 * 3)
        + (2 * 4)
        + (8 * 3)
        + (8 * 2)
        + 5;

    /// PDA signer seeds for CPIs where the portal is the authority.
    pub fn signer_seeds(&self) -> [&[u8]; 3] {
        [
            PORTAL_SEED,
            self.principal_mint.as_ref(),
            std::slice::from_ref(&self.bump),
        ]
    }

    pub fn is_active(&self) -> bool {
        self.phase == PortalPhase::Active
    }

    pub fn require_active(&self) -> Result<()> {
        require!(self.is_active(), PortalError::PortalNotActive);
        Ok(())
    }

    pub fn require_funding(&self) -> Result<()> {
        require!(!self.is_active(), PortalError::PortalAlreadyActive);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Internal exchange
    // ---------------------------------------------------------------------

    /// Tradable settlement balance: the vault minus the funding reward pool.
    pub fn settlement_reserve(&self, vault_balance: u64) -> Result<u64> {
        Ok(vault_balance
            .checked_sub(self.funding_reward_pool)
            .ok_or(PortalError::MathUnderflow)?)
    }

    /// Virtual energy reserve implied by the curve.
    pub fn energy_reserve(&self, settlement_reserve: u64) -> Result<u128> {
        require!(settlement_reserve > 0, PortalError::DivisionByZero);
        Ok(self.constant_product / settlement_reserve as u128)
    }

    /// Energy received for `amount_in` settlement tokens. The input is cut by
    /// `trade_protection_bps` before pricing.
    pub fn quote_buy(&self, amount_in: u64, settlement_reserve: u64) -> Result<u64> {
        let energy_reserve = self.energy_reserve(settlement_reserve)?;
        let protected_bps = BASIS_POINTS_DENOMINATOR
            .checked_sub(self.trade_protection_bps as u64)
            .ok_or(PortalError::MathUnderflow)?;
        let amount_in = math::mul_div(
            amount_in as u128,
            protected_bps as u128,
            BASIS_POINTS_DENOMINATOR as u128,
        )?;
        let denominator = amount_in
            .checked_add(settlement_reserve as u128)
            .ok_or(PortalError::MathOverflow)?;
        math::to_u64(math::mul_div(amount_in, energy_reserve, denominator)?)
    }

    /// Settlement tokens received for `amount_in` energy.
    pub fn quote_sell(&self, amount_in: u64, settlement_reserve: u64) -> Result<u64> {
        // a reserve above K would make the energy side zero and hand out the
        // whole settlement reserve for any input
        let energy_reserve = self.energy_reserve(settlement_reserve)?.max(1);
        let denominator = (amount_in as u128)
            .checked_add(energy_reserve)
            .ok_or(PortalError::MathOverflow)?;
        math::to_u64(math::mul_div(
            amount_in as u128,
            settlement_reserve as u128,
            denominator,
        )?)
    }

    // ---------------------------------------------------------------------
    // Bootstrap funding
    // ---------------------------------------------------------------------

    pub fn receipts_for_contribution(&self, amount: u64) -> Result<u64> {
        Ok(amount
            .checked_mul(self.funding_max_return_multiplier)
            .ok_or(PortalError::MathOverflow)?)
    }

    pub fn contribution_for_receipts(&self, receipts: u64) -> Result<u64> {
        require!(
            self.funding_max_return_multiplier > 0,
            PortalError::DivisionByZero
        );
        Ok(receipts / self.funding_max_return_multiplier)
    }

    /// Closes the funding phase. `receipt_supply` is the receipt mint's
    /// supply at activation and bounds the reward pool.
    pub fn activate(&mut self, now: i64, receipt_supply: u64) -> Result<()> {
        self.require_funding()?;
        let funding_end = self
            .created_at
            .checked_add(self.funding_phase_duration)
            .ok_or(PortalError::MathOverflow)?;
        require!(now >= funding_end, PortalError::FundingPhaseOngoing);
        require!(
            self.funding_balance >= self.funding_min_amount,
            PortalError::FundingBelowMinimum
        );

        let balance = self.funding_balance as u128;
        let energy_side = balance
            .checked_mul(self.funding_exchange_ratio as u128)
            .ok_or(PortalError::MathOverflow)?;
        self.constant_product = balance
            .checked_mul(energy_side)
            .ok_or(PortalError::MathOverflow)?;
        require!(self.constant_product > 0, PortalError::InvalidParameter);

        self.funding_max_rewards = math::apply_bps(receipt_supply, self.funding_max_return_bps)?;
        self.activated_at = now;
        self.phase = PortalPhase::Active;
        Ok(())
    }

    /// Redemption value per receipt as `numerator / denominator`: the
    /// minimum return plus linear APR accrual since activation, capped at
    /// the maximum return.
    fn redemption_rate(&self, now: i64) -> Result<(u128, u128)> {
        self.require_active()?;
        let year = SECONDS_PER_YEAR as u128;
        let elapsed = math::duration(self.activated_at, now)?;

        let floor = (self.funding_min_return_bps as u128)
            .checked_mul(year)
            .ok_or(PortalError::MathOverflow)?;
        let accrued = elapsed
            .checked_mul(self.funding_apr_bps as u128)
            .ok_or(PortalError::MathOverflow)?;
        let cap = (self.funding_max_return_bps as u128)
            .checked_mul(year)
            .ok_or(PortalError::MathOverflow)?;
        let numerator = floor
            .checked_add(accrued)
            .ok_or(PortalError::MathOverflow)?
            .min(cap);

        Ok((numerator, BASIS_POINTS_DENOMINATOR as u128 * year))
    }

    pub fn redemption_value(&self, receipts: u64, now: i64) -> Result<u64> {
        let (numerator, denominator) = self.redemption_rate(now)?;
        math::to_u64(math::mul_div(receipts as u128, numerator, denominator)?)
    }

    /// Largest receipt amount the reward pool can pay out at `now`.
    pub fn burnable_receipt_amount(&self, now: i64) -> Result<u64> {
        let (numerator, denominator) = self.redemption_rate(now)?;
        let burnable = math::mul_div(self.funding_reward_pool as u128, denominator, numerator)?;
        Ok(u64::try_from(burnable).unwrap_or(u64::MAX))
    }

    pub fn record_receipt_burn(&mut self, receipts: u64, value: u64) -> Result<()> {
        self.funding_reward_pool = self
            .funding_reward_pool
            .checked_sub(value)
            .ok_or(PortalError::InsufficientRewards)?;
        let retired = math::apply_bps(receipts, self.funding_max_return_bps)?;
        self.funding_max_rewards = self.funding_max_rewards.saturating_sub(retired);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Arbitrage converter
    // ---------------------------------------------------------------------

    /// Rejects sweeping the portal's own settlement or principal token.
    pub fn check_convertible(&self, mint: &Pubkey) -> Result<()> {
        require!(
            *mint != self.settlement_mint && *mint != self.principal_mint,
            PortalError::ForbiddenConvertToken
        );
        Ok(())
    }

    /// Routes the reward share of one converter payment into the pool,
    /// never past `funding_max_rewards`. Returns the amount added.
    pub fn credit_conversion_reward(&mut self) -> Result<u64> {
        if self.funding_reward_pool >= self.funding_max_rewards {
            return Ok(0);
        }
        let share = math::apply_bps(self.amount_to_convert, self.funding_reward_share_bps)?;
        let new_pool = self
            .funding_reward_pool
            .checked_add(share)
            .ok_or(PortalError::MathOverflow)?
            .min(self.funding_max_rewards);
        let added = new_pool - self.funding_reward_pool;
        self.funding_reward_pool = new_pool;
        Ok(added)
    }

    // ---------------------------------------------------------------------
    // Max lock duration
    // ---------------------------------------------------------------------

    /// Grows the max lock duration to twice the portal's age until it
    /// reaches the terminal value, after which it is frozen.
    pub fn update_max_lock_duration(&mut self, now: i64) -> Result<i64> {
        require!(
            self.lock_duration_updatable,
            PortalError::LockDurationNotUpdatable
        );
        let age = now
            .checked_sub(self.created_at)
            .ok_or(PortalError::MathOverflow)?;
        let new_value = age.checked_mul(2).ok_or(PortalError::MathOverflow)?;
        require!(
            new_value > self.max_lock_duration,
            PortalError::LockDurationTooLow
        );

        if new_value >= self.terminal_max_lock_duration {
            self.max_lock_duration = self.terminal_max_lock_duration;
            self.lock_duration_updatable = false;
        } else {
            self.max_lock_duration = new_value;
        }
        Ok(self.max_lock_duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000;
    const FUNDING_MIN: u64 = 10_000_000;

    fn funding_portal() -> Portal {
        Portal {
            max_lock_duration: DEFAULT_MAX_LOCK_DURATION,
            terminal_max_lock_duration: DEFAULT_TERMINAL_MAX_LOCK_DURATION,
            lock_duration_updatable: true,
            trade_protection_bps: DEFAULT_TRADE_PROTECTION_BPS,
            created_at: T0,
            funding_phase_duration: DEFAULT_FUNDING_PHASE_DURATION,
            funding_min_amount: FUNDING_MIN,
            funding_exchange_ratio: 10,
            funding_max_return_multiplier: DEFAULT_FUNDING_MAX_RETURN_MULTIPLIER,
            funding_min_return_bps: DEFAULT_FUNDING_MIN_RETURN_BPS,
            funding_max_return_bps: DEFAULT_FUNDING_MAX_RETURN_BPS,
            funding_apr_bps: DEFAULT_FUNDING_APR_BPS,
            funding_reward_share_bps: DEFAULT_FUNDING_REWARD_SHARE_BPS,
            amount_to_convert: 1_000_000,
            ..Portal::default()
        }
    }

    fn activation_time() -> i64 {
        T0 + DEFAULT_FUNDING_PHASE_DURATION
    }

    fn active_portal() -> Portal {
        let mut portal = funding_portal();
        let receipts = portal.receipts_for_contribution(FUNDING_MIN).unwrap();
        portal.funding_balance = FUNDING_MIN;
        portal.activate(activation_time(), receipts).unwrap();
        portal
    }

    #[test]
    fn contribution_mints_ten_times_receipts() {
        let portal = funding_portal();
        assert_eq!(portal.receipts_for_contribution(FUNDING_MIN).unwrap(), 100_000_000);
    }

    #[test]
    fn contribute_then_withdraw_returns_contribution() {
        let portal = funding_portal();
        for amount in [1, 7, 10_000_000, 123_456_789] {
            let receipts = portal.receipts_for_contribution(amount).unwrap();
            assert_eq!(portal.contribution_for_receipts(receipts).unwrap(), amount);
        }
    }

    #[test]
    fn activation_sets_constant_product() {
        let portal = active_portal();

        assert_eq!(portal.phase, PortalPhase::Active);
        assert_eq!(portal.activated_at, activation_time());
        assert_eq!(
            portal.constant_product,
            FUNDING_MIN as u128 * (FUNDING_MIN as u128 * 10)
        );
        assert_eq!(portal.funding_max_rewards, 100_000_000);
    }

    #[test]
    fn activation_requires_elapsed_funding_phase() {
        let mut portal = funding_portal();
        portal.funding_balance = FUNDING_MIN;

        assert_eq!(
            portal.activate(activation_time() - 1, 0).unwrap_err(),
            PortalError::FundingPhaseOngoing.into()
        );
    }

    #[test]
    fn activation_requires_minimum_raise() {
        let mut portal = funding_portal();
        portal.funding_balance = FUNDING_MIN - 1;

        assert_eq!(
            portal.activate(activation_time(), 0).unwrap_err(),
            PortalError::FundingBelowMinimum.into()
        );
    }

    #[test]
    fn activation_is_one_way() {
        let mut portal = active_portal();
        let k = portal.constant_product;

        assert_eq!(
            portal.activate(activation_time() + 1, 0).unwrap_err(),
            PortalError::PortalAlreadyActive.into()
        );
        assert_eq!(portal.constant_product, k);
    }

    #[test]
    fn quote_buy_applies_protection_haircut() {
        let portal = active_portal();

        // R0 = 1e7, R1 = 1e8, input cut to 990_000
        let out = portal.quote_buy(1_000_000, FUNDING_MIN).unwrap();
        assert_eq!(out, (990_000u128 * 100_000_000 / 10_990_000) as u64);
    }

    #[test]
    fn quote_sell_prices_against_virtual_reserve() {
        let portal = active_portal();

        let out = portal.quote_sell(10_000_000, FUNDING_MIN).unwrap();
        assert_eq!(out, 909_090);
    }

    #[test]
    fn quote_sell_floors_energy_reserve() {
        let mut portal = active_portal();
        portal.constant_product = 5;

        // R0 > K: the energy side would be zero without the floor
        let out = portal.quote_sell(1, 10).unwrap();
        assert_eq!(out, 5);
    }

    #[test]
    fn quotes_reject_empty_reserve() {
        let portal = active_portal();

        assert_eq!(
            portal.quote_buy(1_000, 0).unwrap_err(),
            PortalError::DivisionByZero.into()
        );
        assert_eq!(
            portal.quote_sell(1_000, 0).unwrap_err(),
            PortalError::DivisionByZero.into()
        );
    }

    #[test]
    fn buy_then_sell_never_profits() {
        let portal = active_portal();
        let reserve = FUNDING_MIN;

        for amount_in in [1_000u64, 250_000, 1_000_000, 9_999_999, 50_000_000] {
            let energy = portal.quote_buy(amount_in, reserve).unwrap();

            // against the same reserves
            let back = portal.quote_sell(energy, reserve).unwrap();
            assert!(back <= amount_in);

            // against the reserves after the buy settled
            let back = portal.quote_sell(energy, reserve + amount_in).unwrap();
            assert!(back <= amount_in);
        }
    }

    #[test]
    fn settlement_reserve_excludes_reward_pool() {
        let mut portal = active_portal();
        portal.funding_reward_pool = 400;

        assert_eq!(portal.settlement_reserve(1_000).unwrap(), 600);
        assert_eq!(
            portal.settlement_reserve(399).unwrap_err(),
            PortalError::MathUnderflow.into()
        );
    }

    #[test]
    fn redemption_value_accrues_between_floor_and_cap() {
        let portal = active_portal();
        let start = activation_time();
        let year = SECONDS_PER_YEAR as i64;

        assert_eq!(portal.redemption_value(100_000_000, start).unwrap(), 10_000_000);
        assert_eq!(
            portal.redemption_value(100_000_000, start + year).unwrap(),
            46_000_000
        );
        assert_eq!(
            portal.redemption_value(100_000_000, start + 3 * year).unwrap(),
            100_000_000
        );
    }

    #[test]
    fn redemption_requires_active_portal() {
        let portal = funding_portal();

        assert_eq!(
            portal.redemption_value(1, T0).unwrap_err(),
            PortalError::PortalNotActive.into()
        );
    }

    #[test]
    fn burnable_amount_is_covered_by_pool() {
        let mut portal = active_portal();
        portal.funding_reward_pool = 1_000_000;
        let now = activation_time() + 100 * 86_400;

        let burnable = portal.burnable_receipt_amount(now).unwrap();
        let value = portal.redemption_value(burnable, now).unwrap();
        assert!(value <= portal.funding_reward_pool);
        assert!(portal.redemption_value(burnable + 100, now).unwrap() > value);

        portal.record_receipt_burn(burnable, value).unwrap();
        assert_eq!(portal.funding_reward_pool, 1_000_000 - value);
        assert_eq!(portal.funding_max_rewards, 100_000_000 - burnable);
    }

    #[test]
    fn burnable_amount_at_activation() {
        let mut portal = active_portal();
        portal.funding_reward_pool = 1_000_000;

        assert_eq!(
            portal.burnable_receipt_amount(activation_time()).unwrap(),
            10_000_000
        );
    }

    #[test]
    fn burn_beyond_pool_fails() {
        let mut portal = active_portal();
        portal.funding_reward_pool = 10;

        assert_eq!(
            portal.record_receipt_burn(1_000, 11).unwrap_err(),
            PortalError::InsufficientRewards.into()
        );
        assert_eq!(portal.funding_reward_pool, 10);
    }

    #[test]
    fn conversion_reward_is_capped() {
        let mut portal = active_portal();
        portal.funding_max_rewards = 250_000;

        assert_eq!(portal.credit_conversion_reward().unwrap(), 100_000);
        assert_eq!(portal.credit_conversion_reward().unwrap(), 100_000);
        assert_eq!(portal.credit_conversion_reward().unwrap(), 50_000);
        assert_eq!(portal.credit_conversion_reward().unwrap(), 0);
        assert_eq!(portal.funding_reward_pool, 250_000);
    }

    #[test]
    fn max_lock_duration_grows_then_freezes() {
        let mut portal = funding_portal();
        let half_year = (SECONDS_PER_YEAR / 2) as i64;

        assert_eq!(
            portal.update_max_lock_duration(T0 + 10 * 86_400).unwrap_err(),
            PortalError::LockDurationTooLow.into()
        );

        assert_eq!(
            portal.update_max_lock_duration(T0 + half_year).unwrap(),
            2 * half_year
        );
        assert!(portal.lock_duration_updatable);

        let terminal = portal.terminal_max_lock_duration;
        assert_eq!(
            portal.update_max_lock_duration(T0 + terminal).unwrap(),
            terminal
        );
        assert!(!portal.lock_duration_updatable);
        assert_eq!(
            portal.update_max_lock_duration(T0 + 2 * terminal).unwrap_err(),
            PortalError::LockDurationNotUpdatable.into()
        );
    }

    #[test]
    fn own_tokens_cannot_be_converted() {
        let portal = Portal {
            settlement_mint: Pubkey::new_unique(),
            principal_mint: Pubkey::new_unique(),
            ..active_portal()
        };

        assert_eq!(
            portal.check_convertible(&portal.settlement_mint).unwrap_err(),
            PortalError::ForbiddenConvertToken.into()
        );
        assert_eq!(
            portal.check_convertible(&portal.principal_mint).unwrap_err(),
            PortalError::ForbiddenConvertToken.into()
        );
        portal.check_convertible(&Pubkey::new_unique()).unwrap();
    }

    #[test]
    fn serialized_size_matches_len() {
        let portal = Portal {
            constant_product: u128::MAX,
            ..active_portal()
        };
        let mut data = Vec::new();
        portal.try_serialize(&mut data).unwrap();
        assert_eq!(data.len(), Portal::LEN);
    }
}
