//! Read-only views.
//!
//! Each view runs the same pure state methods as the mutating handlers and
//! returns the result as instruction return data. Nothing is written.

use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;

use crate::constants::*;
use crate::error::PortalError;
use crate::state::{AccountUpdate, Portal, UserAccount};

/// Accounts required for pricing a trade.
#[derive(Accounts)]
pub struct QuoteTrade<'info> {
    /// The portal.
    #[account(has_one = settlement_vault @ PortalError::VaultMismatch)]
    pub portal: Box<Account<'info, Portal>>,

    /// Portal's settlement vault.
    pub settlement_vault: Box<Account<'info, TokenAccount>>,
}

/// Accounts required for simulating an account update.
#[derive(Accounts)]
#[instruction(user: Pubkey)]
pub struct SimulateAccountUpdate<'info> {
    /// The portal.
    pub portal: Box<Account<'info, Portal>>,

    /// CHECK: `user`'s ledger PDA. It may not exist yet; when it does its
    /// owner and discriminator are checked before it is read.
    #[account(
        seeds = [USER_ACCOUNT_SEED, portal.key().as_ref(), user.as_ref()],
        bump
    )]
    pub user_account: UncheckedAccount<'info>,
}

/// Accounts required for funding views.
#[derive(Accounts)]
pub struct FundingView<'info> {
    /// The portal.
    pub portal: Box<Account<'info, Portal>>,
}

/// Energy `amount_in` settlement tokens would buy now.
pub fn quote_buy_handler(ctx: Context<QuoteTrade>, amount_in: u64) -> Result<u64> {
    let portal = &ctx.accounts.portal;
    portal.require_active()?;
    let reserve = portal.settlement_reserve(ctx.accounts.settlement_vault.amount)?;
    portal.quote_buy(amount_in, reserve)
}

/// Settlement tokens `amount_in` energy would sell for now.
pub fn quote_sell_handler(ctx: Context<QuoteTrade>, amount_in: u64) -> Result<u64> {
    let portal = &ctx.accounts.portal;
    portal.require_active()?;
    let reserve = portal.settlement_reserve(ctx.accounts.settlement_vault.amount)?;
    portal.quote_sell(amount_in, reserve)
}

/// The account as a stake or unstake of `amount` would leave it now.
/// A user without a ledger account is simulated from the empty account.
pub fn simulate_handler(
    ctx: Context<SimulateAccountUpdate>,
    _user: Pubkey,
    amount: u64,
    is_deposit: bool,
) -> Result<AccountUpdate> {
    let now = Clock::get()?.unix_timestamp;
    let account = load_user_account(&ctx.accounts.user_account.to_account_info())?;
    account.compute_update(
        now,
        ctx.accounts.portal.max_lock_duration,
        amount,
        is_deposit,
    )
}

fn load_user_account(info: &AccountInfo) -> Result<UserAccount> {
    if info.data_is_empty() {
        return Ok(UserAccount::default());
    }
    require_keys_eq!(*info.owner, crate::ID, PortalError::Unauthorized);
    let data = info.try_borrow_data()?;
    UserAccount::try_deserialize(&mut &data[..])
}

/// Receipts the reward pool can currently pay for.
pub fn burnable_receipts_handler(ctx: Context<FundingView>) -> Result<u64> {
    let now = Clock::get()?.unix_timestamp;
    ctx.accounts.portal.burnable_receipt_amount(now)
}

/// Settlement value of `receipts` at the current time.
pub fn redemption_value_handler(ctx: Context<FundingView>, receipts: u64) -> Result<u64> {
    let now = Clock::get()?.unix_timestamp;
    ctx.accounts.portal.redemption_value(receipts, now)
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000;
    const LOCK: i64 = 90 * SECONDS_PER_DAY;

    #[test]
    fn missing_account_simulates_from_empty() {
        let key = Pubkey::new_unique();
        let owner = Pubkey::default();
        let mut lamports = 0u64;
        let mut data: Vec<u8> = Vec::new();
        let info = AccountInfo::new(&key, false, false, &mut lamports, &mut data[..], &owner, false, 0);

        let account = load_user_account(&info).unwrap();
        assert_eq!(account.staked_balance, 0);
        assert_eq!(account.last_update_time, 0);

        let preview = account.compute_update(T0, LOCK, 1_000, true).unwrap();
        assert_eq!(preview.staked_balance, 1_000);
        assert_eq!(preview.max_stake_debt, 246);
        assert_eq!(preview.portal_energy, 246);
        assert_eq!(preview.portal_energy_tokens_required, 0);
    }

    #[test]
    fn existing_account_is_loaded() {
        let mut stored = UserAccount::default();
        let update = stored.compute_update(T0, LOCK, 1_000, true).unwrap();
        stored.apply(&update);

        let mut data = Vec::new();
        stored.try_serialize(&mut data).unwrap();
        let key = Pubkey::new_unique();
        let mut lamports = 1_000_000u64;
        let info = AccountInfo::new(&key, false, false, &mut lamports, &mut data[..], &crate::ID, false, 0);

        let account = load_user_account(&info).unwrap();
        assert_eq!(account.staked_balance, 1_000);
        assert_eq!(account.portal_energy, 246);

        let later = T0 + 45 * SECONDS_PER_DAY;
        assert_eq!(
            account.compute_update(later, LOCK, 0, true).unwrap(),
            stored.compute_update(later, LOCK, 0, true).unwrap()
        );
    }

    #[test]
    fn foreign_account_is_rejected() {
        let mut stored = UserAccount::default();
        let mut data = Vec::new();
        stored.bump = 1;
        stored.try_serialize(&mut data).unwrap();
        let key = Pubkey::new_unique();
        let other_program = Pubkey::new_unique();
        let mut lamports = 1_000_000u64;
        let info = AccountInfo::new(&key, false, false, &mut lamports, &mut data[..], &other_program, false, 0);

        assert_eq!(
            load_user_account(&info).unwrap_err(),
            PortalError::Unauthorized.into()
        );
    }
}
