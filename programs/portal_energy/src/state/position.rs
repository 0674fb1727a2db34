use anchor_lang::prelude::*;

use crate::error::PortalError;
use crate::state::user_account::{accrued_energy, available_to_withdraw, energy_for_duration};
use crate::state::{AccountUpdate, UserAccount};

/// A user account frozen into a transferable record. Energy keeps accruing
/// while tokenized exactly as it would in the account it came from.
#[account]
#[derive(Default, Debug)]
pub struct Position {
    pub portal: Pubkey,
    pub owner: Pubkey,
    pub id: u64,

    pub minted_at: i64,
    pub last_max_lock_duration: i64,
    pub staked_balance: u64,
    pub portal_energy: u64,

    pub bump: u8,
}

impl Position {
    pub const LEN: usize = 8 + 32 + 32 + 8 + 8 + 8 + 8 + 8 + 1;

    /// Captures an already committed account.
    pub fn freeze(&mut self, account: &UserAccount, owner: Pubkey, id: u64, bump: u8) {
        self.portal = account.portal;
        self.owner = owner;
        self.id = id;
        self.minted_at = account.last_update_time;
        self.last_max_lock_duration = account.last_max_lock_duration;
        self.staked_balance = account.staked_balance;
        self.portal_energy = account.portal_energy;
        self.bump = bump;
    }

    /// Stake and energy the position is worth at `now`.
    pub fn accrued(&self, now: i64, max_lock_duration: i64) -> Result<(u64, u64)> {
        let earned = accrued_energy(
            self.staked_balance,
            self.minted_at,
            now,
            self.last_max_lock_duration,
            max_lock_duration,
        )?;
        let energy = self
            .portal_energy
            .checked_add(earned)
            .ok_or(PortalError::MathOverflow)?;
        Ok((self.staked_balance, energy))
    }

    /// Commits `account` to `now` and folds the position into it.
    ///
    /// Debt is recomputed on the merged stake, the same as a deposit does.
    /// Floor rounding can leave the result one unit short of its debt
    /// (two 1000 stakes hold 246 + 246 energy against a debt of 493), so
    /// redeeming a position lands where staking the same principal twice
    /// would.
    pub fn merge_into(
        &self,
        account: &UserAccount,
        now: i64,
        max_lock_duration: i64,
    ) -> Result<AccountUpdate> {
        let mut update = account.compute_update(now, max_lock_duration, 0, true)?;
        let (staked, energy) = self.accrued(now, max_lock_duration)?;

        update.staked_balance = update
            .staked_balance
            .checked_add(staked)
            .ok_or(PortalError::MathOverflow)?;
        update.portal_energy = update
            .portal_energy
            .checked_add(energy)
            .ok_or(PortalError::MathOverflow)?;
        update.max_stake_debt = energy_for_duration(update.staked_balance, max_lock_duration)?;
        update.available_to_withdraw = available_to_withdraw(
            update.staked_balance,
            update.portal_energy,
            update.max_stake_debt,
        )?;
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SECONDS_PER_DAY;

    const T0: i64 = 1_700_000_000;
    const LOCK: i64 = 90 * SECONDS_PER_DAY;

    fn staked(amount: u64) -> UserAccount {
        let mut account = UserAccount::default();
        let update = account.compute_update(T0, LOCK, amount, true).unwrap();
        account.apply(&update);
        account
    }

    #[test]
    fn tokenized_stake_keeps_accruing() {
        let kept = staked(5_000_000);
        let mut position = Position::default();
        position.freeze(&staked(5_000_000), Pubkey::new_unique(), 0, 255);

        let later = T0 + 30 * SECONDS_PER_DAY;
        let lock = LOCK + 10 * SECONDS_PER_DAY;
        let expected = kept.compute_update(later, lock, 0, true).unwrap();

        let (stake, energy) = position.accrued(later, lock).unwrap();
        assert_eq!(stake, expected.staked_balance);
        assert_eq!(energy, expected.portal_energy);

        let merged = position
            .merge_into(&UserAccount::default(), later, lock)
            .unwrap();
        assert_eq!(merged, expected);
    }

    #[test]
    fn merge_adds_to_existing_account() {
        let mut position = Position::default();
        position.freeze(&staked(1_000), Pubkey::new_unique(), 3, 255);
        let receiver = staked(1_000);

        let merged = position.merge_into(&receiver, T0, LOCK).unwrap();

        assert_eq!(merged.staked_balance, 2_000);
        assert_eq!(merged.portal_energy, 492);
        assert_eq!(merged.max_stake_debt, 493);
        assert_eq!(merged.available_to_withdraw, 1_995);
    }

    #[test]
    fn merge_matches_a_second_deposit() {
        let mut position = Position::default();
        position.freeze(&staked(1_000), Pubkey::new_unique(), 0, 255);
        let receiver = staked(1_000);

        let merged = position.merge_into(&receiver, T0, LOCK).unwrap();
        let deposited = receiver.compute_update(T0, LOCK, 1_000, true).unwrap();

        assert_eq!(merged, deposited);
        assert_eq!(merged.max_stake_debt - merged.portal_energy, 1);
    }

    #[test]
    fn serialized_size_matches_len() {
        let mut position = Position::default();
        position.freeze(&staked(1_000), Pubkey::new_unique(), u64::MAX, 255);
        position.portal = Pubkey::new_unique();
        let mut data = Vec::new();
        position.try_serialize(&mut data).unwrap();
        assert_eq!(data.len(), Position::LEN);
    }

    #[test]
    fn accrual_before_mint_time_fails() {
        let mut position = Position::default();
        position.freeze(&staked(1_000), Pubkey::new_unique(), 0, 255);

        assert_eq!(
            position.accrued(T0 - 1, LOCK).unwrap_err(),
            PortalError::InvalidTimestamp.into()
        );
    }
}
