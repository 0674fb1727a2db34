use anchor_lang::prelude::*;

use crate::constants::SECONDS_PER_YEAR;
use crate::error::PortalError;
use crate::math;

#[account]
#[derive(Default, Debug)]
pub struct UserAccount {
    pub owner: Pubkey,
    pub portal: Pubkey,

    pub last_update_time: i64,
    // max lock duration this account's stake was last credited under
    pub last_max_lock_duration: i64,

    pub staked_balance: u64,
    pub max_stake_debt: u64,
    pub portal_energy: u64,

    pub bump: u8,
}

/// Account values after replaying accrual up to `now` and applying a
/// stake change. Produced by [`UserAccount::compute_update`], which is the
/// only place accrual is calculated; commits and the simulate view both
/// go through it.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccountUpdate {
    pub last_update_time: i64,
    pub last_max_lock_duration: i64,
    pub staked_balance: u64,
    pub max_stake_debt: u64,
    pub portal_energy: u64,
    pub available_to_withdraw: u64,
    /// Portal Energy the caller must bring in from outside (token burn)
    /// for a withdrawal to go through.
    pub portal_energy_tokens_required: u64,
}

impl AccountUpdate {
    /// Spends `amount` of the updated Portal Energy.
    pub fn debit_energy(&mut self, amount: u64) -> Result<()> {
        self.portal_energy = self
            .portal_energy
            .checked_sub(amount)
            .ok_or(PortalError::InsufficientCredit)?;
        Ok(())
    }
}

impl UserAccount {
    pub const LEN: usize = 8 + 32 + 32 + 8 + 8 + 8 + 8 + 8 + 1;

    /// Fills identity fields on an account created by `init_if_needed`.
    pub fn bind(&mut self, owner: Pubkey, portal: Pubkey, bump: u8) {
        if self.owner == Pubkey::default() {
            self.owner = owner;
            self.portal = portal;
            self.bump = bump;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max_stake_debt == 0 && self.portal_energy == 0
    }

    /// Replays time and max-lock accrual since the last commit, then
    /// applies a deposit or withdrawal of `amount`.
    ///
    /// A withdrawal whose energy adjustment exceeds the accrued balance
    /// does not go negative: the gap is reported in
    /// `portal_energy_tokens_required` and the caller decides whether to
    /// cover it or fail.
    pub fn compute_update(
        &self,
        now: i64,
        max_lock_duration: i64,
        amount: u64,
        is_deposit: bool,
    ) -> Result<AccountUpdate> {
        let net_change = accrued_energy(
            self.staked_balance,
            self.last_update_time,
            now,
            self.last_max_lock_duration,
            max_lock_duration,
        )?;
        let accrued = self
            .portal_energy
            .checked_add(net_change)
            .ok_or(PortalError::MathOverflow)?;
        let adjustment = energy_for_duration(amount, max_lock_duration)?;

        let (staked_balance, portal_energy, tokens_required) = if is_deposit {
            let staked = self
                .staked_balance
                .checked_add(amount)
                .ok_or(PortalError::MathOverflow)?;
            let energy = accrued
                .checked_add(adjustment)
                .ok_or(PortalError::MathOverflow)?;
            (staked, energy, 0)
        } else {
            require!(
                amount <= self.staked_balance,
                PortalError::InsufficientStake
            );
            let required = adjustment.saturating_sub(accrued);
            let energy = accrued
                .checked_add(required)
                .ok_or(PortalError::MathOverflow)?
                .checked_sub(adjustment)
                .ok_or(PortalError::MathUnderflow)?;
            (self.staked_balance - amount, energy, required)
        };

        let max_stake_debt = energy_for_duration(staked_balance, max_lock_duration)?;

        Ok(AccountUpdate {
            last_update_time: now,
            last_max_lock_duration: max_lock_duration,
            staked_balance,
            max_stake_debt,
            portal_energy,
            available_to_withdraw: available_to_withdraw(
                staked_balance,
                portal_energy,
                max_stake_debt,
            )?,
            portal_energy_tokens_required: tokens_required,
        })
    }

    pub fn apply(&mut self, update: &AccountUpdate) {
        self.last_update_time = update.last_update_time;
        self.last_max_lock_duration = update.last_max_lock_duration;
        self.staked_balance = update.staked_balance;
        self.max_stake_debt = update.max_stake_debt;
        self.portal_energy = update.portal_energy;
    }

    pub fn available_to_withdraw(&self) -> Result<u64> {
        available_to_withdraw(self.staked_balance, self.portal_energy, self.max_stake_debt)
    }
}

/// Energy a stake of `amount` is worth over `duration` seconds.
pub fn energy_for_duration(amount: u64, duration: i64) -> Result<u64> {
    let duration = u64::try_from(duration).map_err(|_| error!(PortalError::InvalidTimestamp))?;
    math::to_u64(math::mul_div(
        amount as u128,
        duration as u128,
        SECONDS_PER_YEAR as u128,
    )?)
}

/// Energy earned by `staked_balance` from elapsed time plus growth of the
/// max lock duration. Both spans are summed before the single division so
/// committing often does not lose more to rounding than committing rarely
/// on the same span.
pub fn accrued_energy(
    staked_balance: u64,
    last_update_time: i64,
    now: i64,
    last_max_lock_duration: i64,
    max_lock_duration: i64,
) -> Result<u64> {
    if staked_balance == 0 {
        return Ok(0);
    }
    let elapsed = math::duration(last_update_time, now)?;
    let lock_increase = math::duration(last_max_lock_duration, max_lock_duration)?;
    let span = elapsed
        .checked_add(lock_increase)
        .ok_or(PortalError::MathOverflow)?;
    math::to_u64(math::mul_div(
        staked_balance as u128,
        span,
        SECONDS_PER_YEAR as u128,
    )?)
}

/// Principal that can leave without an energy top-up: all of it when the
/// debt is covered, otherwise rationed by `energy / debt`.
pub fn available_to_withdraw(
    staked_balance: u64,
    portal_energy: u64,
    max_stake_debt: u64,
) -> Result<u64> {
    if portal_energy >= max_stake_debt {
        return Ok(staked_balance);
    }
    math::to_u64(math::mul_div(
        staked_balance as u128,
        portal_energy as u128,
        max_stake_debt as u128,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SECONDS_PER_DAY;

    const T0: i64 = 1_700_000_000;
    const LOCK: i64 = 90 * SECONDS_PER_DAY;

    fn staked(amount: u64, now: i64, lock: i64) -> UserAccount {
        let mut account = UserAccount::default();
        let update = account.compute_update(now, lock, amount, true).unwrap();
        account.apply(&update);
        account
    }

    #[test]
    fn first_stake_credits_full_debt() {
        let account = staked(1_000, T0, LOCK);

        assert_eq!(account.staked_balance, 1_000);
        assert_eq!(account.max_stake_debt, 246);
        assert_eq!(account.portal_energy, 246);
        assert_eq!(account.last_update_time, T0);
        assert_eq!(account.last_max_lock_duration, LOCK);
        assert_eq!(account.available_to_withdraw().unwrap(), 1_000);
    }

    #[test]
    fn accrual_after_45_days_matches_commit() {
        let mut account = staked(1_000, T0, LOCK);
        let later = T0 + 45 * SECONDS_PER_DAY;

        let simulated = account.compute_update(later, LOCK, 0, true).unwrap();
        assert_eq!(simulated.portal_energy, 246 + 123);
        assert_eq!(simulated.staked_balance, 1_000);
        assert_eq!(simulated.max_stake_debt, 246);

        account.apply(&simulated);
        assert_eq!(account.portal_energy, simulated.portal_energy);
        assert_eq!(account.last_update_time, later);
    }

    #[test]
    fn lock_increase_credits_existing_stake() {
        let account = staked(1_000, T0, LOCK);

        let update = account.compute_update(T0, 2 * LOCK, 0, true).unwrap();

        assert_eq!(update.portal_energy, 246 + 246);
        assert_eq!(update.max_stake_debt, 493);
        assert_eq!(update.last_max_lock_duration, 2 * LOCK);
    }

    #[test]
    fn new_deposit_uses_current_lock_only() {
        let account = staked(1_000, T0, LOCK);

        let update = account.compute_update(T0, 2 * LOCK, 1_000, true).unwrap();

        // 246 from the lock increase on the old stake, 493 for the new stake
        assert_eq!(update.portal_energy, 246 + 246 + 493);
        assert_eq!(update.staked_balance, 2_000);
    }

    #[test]
    fn immediate_round_trip_zeroes_account() {
        let mut account = staked(100_000_000, T0, LOCK);

        let update = account.compute_update(T0, LOCK, 100_000_000, false).unwrap();
        assert_eq!(update.portal_energy_tokens_required, 0);
        account.apply(&update);

        assert_eq!(account.staked_balance, 0);
        assert_eq!(account.max_stake_debt, 0);
        assert_eq!(account.portal_energy, 0);
    }

    #[test]
    fn withdrawal_reports_shortfall_instead_of_going_negative() {
        let mut account = staked(1_000, T0, LOCK);
        account.portal_energy = 0;

        let update = account.compute_update(T0, LOCK, 500, false).unwrap();

        assert_eq!(update.portal_energy_tokens_required, 123);
        assert_eq!(update.portal_energy, 0);
        assert_eq!(update.staked_balance, 500);
        assert_eq!(update.max_stake_debt, 123);
    }

    #[test]
    fn withdrawal_above_stake_fails() {
        let account = staked(1_000, T0, LOCK);

        assert_eq!(
            account.compute_update(T0, LOCK, 1_001, false).unwrap_err(),
            PortalError::InsufficientStake.into()
        );
    }

    #[test]
    fn clock_going_backwards_fails() {
        let account = staked(1_000, T0, LOCK);

        assert_eq!(
            account.compute_update(T0 - 1, LOCK, 0, true).unwrap_err(),
            PortalError::InvalidTimestamp.into()
        );
    }

    #[test]
    fn available_to_withdraw_is_rationed() {
        assert_eq!(available_to_withdraw(1_000, 123, 246).unwrap(), 500);
        assert_eq!(available_to_withdraw(1_000, 0, 246).unwrap(), 0);
        assert_eq!(available_to_withdraw(1_000, 500, 246).unwrap(), 1_000);
        assert_eq!(available_to_withdraw(0, 0, 0).unwrap(), 0);
    }

    #[test]
    fn available_never_exceeds_stake() {
        let mut account = staked(7_777_777, T0, LOCK);
        let mut now = T0;
        for (i, energy) in [0u64, 1, 1_000, 1_917_808, 5_000_000].iter().enumerate() {
            now += (i as i64 + 1) * SECONDS_PER_DAY;
            account.portal_energy = *energy;
            let update = account.compute_update(now, LOCK, 0, true).unwrap();
            assert!(update.available_to_withdraw <= update.staked_balance);
            if update.portal_energy >= update.max_stake_debt {
                assert_eq!(update.available_to_withdraw, update.staked_balance);
            }
            account.apply(&update);
        }
    }

    #[test]
    fn total_stake_tracks_sum_of_accounts() {
        let mut accounts = vec![UserAccount::default(); 3];
        let mut total: u64 = 0;
        let mut now = T0;
        let ops: [(usize, u64, bool); 8] = [
            (0, 500, true),
            (1, 1_000, true),
            (2, 250, true),
            (0, 200, false),
            (1, 1_000, false),
            (2, 50, true),
            (0, 300, false),
            (1, 75, true),
        ];

        for (index, amount, is_deposit) in ops {
            now += SECONDS_PER_DAY;
            let update = accounts[index]
                .compute_update(now, LOCK, amount, is_deposit)
                .unwrap();
            accounts[index].apply(&update);
            total = if is_deposit { total + amount } else { total - amount };

            let sum: u64 = accounts.iter().map(|a| a.staked_balance).sum();
            assert_eq!(sum, total);
        }
    }

    #[test]
    fn first_deposit_preview_matches_committed_stake() {
        let preview = UserAccount::default()
            .compute_update(T0, LOCK, 1_000, true)
            .unwrap();
        let account = staked(1_000, T0, LOCK);

        assert_eq!(preview.staked_balance, account.staked_balance);
        assert_eq!(preview.max_stake_debt, account.max_stake_debt);
        assert_eq!(preview.portal_energy, account.portal_energy);
        assert_eq!(preview.last_update_time, account.last_update_time);
        assert_eq!(preview.last_max_lock_duration, account.last_max_lock_duration);
        assert_eq!(preview.available_to_withdraw, 1_000);
        assert_eq!(preview.portal_energy_tokens_required, 0);
    }

    #[test]
    fn debit_beyond_energy_fails() {
        let account = staked(1_000, T0, LOCK);
        let mut update = account
            .compute_update(T0 + 45 * SECONDS_PER_DAY, LOCK, 0, true)
            .unwrap();
        assert_eq!(update.portal_energy, 369);

        assert_eq!(
            update.debit_energy(370).unwrap_err(),
            PortalError::InsufficientCredit.into()
        );
        assert_eq!(update.portal_energy, 369);

        update.debit_energy(369).unwrap();
        assert_eq!(update.portal_energy, 0);
    }

    #[test]
    fn serialized_size_matches_len() {
        let account = UserAccount {
            owner: Pubkey::new_unique(),
            portal: Pubkey::new_unique(),
            ..staked(1_000, T0, LOCK)
        };
        let mut data = Vec::new();
        account.try_serialize(&mut data).unwrap();
        assert_eq!(data.len(), UserAccount::LEN);
    }
}
