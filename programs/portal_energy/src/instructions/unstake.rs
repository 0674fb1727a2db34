//! Unstake instruction handlers.
//!
//! Handles withdrawing principal from the portal. A plain unstake needs the
//! account's own Portal Energy to cover the released stake; a force unstake
//! tops up the difference by burning Portal Energy tokens.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::adapter;
use crate::constants::*;
use crate::error::PortalError;
use crate::events::Unstaked;
use crate::state::{AccountUpdate, Portal, UserAccount};
use crate::token_ops;

/// Accounts required for unstaking.
#[derive(Accounts)]
pub struct Unstake<'info> {
    /// The user unstaking principal.
    #[account(mut)]
    pub user: Signer<'info>,

    /// The portal.
    #[account(
        mut,
        seeds = [PORTAL_SEED, portal.principal_mint.as_ref()],
        bump = portal.bump,
        has_one = principal_vault @ PortalError::VaultMismatch
    )]
    pub portal: Box<Account<'info, Portal>>,

    /// User's ledger account.
    #[account(
        mut,
        seeds = [USER_ACCOUNT_SEED, portal.key().as_ref(), user.key().as_ref()],
        bump = user_account.bump,
        constraint = user_account.owner == user.key() @ PortalError::Unauthorized
    )]
    pub user_account: Box<Account<'info, UserAccount>>,

    /// User's token account receiving the principal.
    #[account(
        mut,
        constraint = user_token_account.mint == portal.principal_mint @ PortalError::MintMismatch,
        constraint = user_token_account.owner == user.key() @ PortalError::InvalidTokenAccountOwner
    )]
    pub user_token_account: Box<Account<'info, TokenAccount>>,

    /// Portal's principal vault.
    #[account(mut)]
    pub principal_vault: Box<Account<'info, TokenAccount>>,

    /// Token program.
    pub token_program: Program<'info, Token>,
}

/// Accounts required for a force unstake.
#[derive(Accounts)]
pub struct ForceUnstakeAll<'info> {
    /// The user unstaking principal.
    #[account(mut)]
    pub user: Signer<'info>,

    /// The portal.
    #[account(
        mut,
        seeds = [PORTAL_SEED, portal.principal_mint.as_ref()],
        bump = portal.bump,
        has_one = principal_vault @ PortalError::VaultMismatch,
        has_one = energy_mint @ PortalError::MintMismatch
    )]
    pub portal: Box<Account<'info, Portal>>,

    /// User's ledger account.
    #[account(
        mut,
        seeds = [USER_ACCOUNT_SEED, portal.key().as_ref(), user.key().as_ref()],
        bump = user_account.bump,
        constraint = user_account.owner == user.key() @ PortalError::Unauthorized
    )]
    pub user_account: Box<Account<'info, UserAccount>>,

    /// User's token account receiving the principal.
    #[account(
        mut,
        constraint = user_token_account.mint == portal.principal_mint @ PortalError::MintMismatch,
        constraint = user_token_account.owner == user.key() @ PortalError::InvalidTokenAccountOwner
    )]
    pub user_token_account: Box<Account<'info, TokenAccount>>,

    /// User's Portal Energy token account, burned to cover the shortfall.
    #[account(
        mut,
        constraint = user_energy_account.mint == portal.energy_mint @ PortalError::MintMismatch,
        constraint = user_energy_account.owner == user.key() @ PortalError::InvalidTokenAccountOwner
    )]
    pub user_energy_account: Box<Account<'info, TokenAccount>>,

    /// Portal Energy token mint.
    #[account(mut)]
    pub energy_mint: Box<Account<'info, Mint>>,

    /// Portal's principal vault.
    #[account(mut)]
    pub principal_vault: Box<Account<'info, TokenAccount>>,

    /// Token program.
    pub token_program: Program<'info, Token>,
}

/// Unstake principal from the portal.
///
/// Fails with `InsufficientCredit` when the account's Portal Energy does
/// not cover the debt of the released stake.
///
/// # Arguments
/// * `ctx` - Unstake accounts context
/// * `amount` - Amount of principal to unstake
///
/// # Returns
/// Result indicating success or error
pub fn handler(ctx: Context<Unstake>, amount: u64) -> Result<()> {
    require!(amount > 0, PortalError::ZeroAmount);
    ctx.accounts.portal.require_active()?;

    let clock = Clock::get()?;
    let update = ctx.accounts.user_account.compute_update(
        clock.unix_timestamp,
        ctx.accounts.portal.max_lock_duration,
        amount,
        false,
    )?;
    require!(
        update.portal_energy_tokens_required == 0,
        PortalError::InsufficientCredit
    );

    let seeds = ctx.accounts.portal.signer_seeds();
    let received = adapter::withdraw_principal(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.principal_vault.to_account_info(),
        &mut ctx.accounts.user_token_account,
        &ctx.accounts.portal.to_account_info(),
        &[&seeds[..]],
        amount,
    )?;

    commit_unstake(
        &mut ctx.accounts.portal,
        &mut ctx.accounts.user_account,
        &update,
        amount,
    )?;

    msg!("Unstaked {} principal, received {}", amount, received);
    msg!("Remaining staked: {}", update.staked_balance);
    msg!("Portal Energy: {}", update.portal_energy);

    emit!(Unstaked {
        user: ctx.accounts.user.key(),
        amount,
        received,
        energy_tokens_burned: 0,
        staked_balance: update.staked_balance,
        portal_energy: update.portal_energy,
    });

    Ok(())
}

/// Unstake the whole balance, burning Portal Energy tokens for whatever
/// the account's own energy does not cover. Tokens are taken 1:1 with
/// internal energy.
///
/// # Arguments
/// * `ctx` - ForceUnstakeAll accounts context
///
/// # Returns
/// Result indicating success or error
pub fn force_handler(ctx: Context<ForceUnstakeAll>) -> Result<()> {
    ctx.accounts.portal.require_active()?;
    let amount = ctx.accounts.user_account.staked_balance;
    require!(amount > 0, PortalError::InsufficientStake);

    let clock = Clock::get()?;
    let update = ctx.accounts.user_account.compute_update(
        clock.unix_timestamp,
        ctx.accounts.portal.max_lock_duration,
        amount,
        false,
    )?;

    let burned = force_unstake_burn(
        update.portal_energy_tokens_required,
        ctx.accounts.user_energy_account.amount,
    )?;
    if burned > 0 {
        token_ops::burn(
            &ctx.accounts.token_program.to_account_info(),
            &ctx.accounts.energy_mint.to_account_info(),
            &ctx.accounts.user_energy_account.to_account_info(),
            &ctx.accounts.user.to_account_info(),
            burned,
        )?;
    }

    let seeds = ctx.accounts.portal.signer_seeds();
    let received = adapter::withdraw_principal(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.principal_vault.to_account_info(),
        &mut ctx.accounts.user_token_account,
        &ctx.accounts.portal.to_account_info(),
        &[&seeds[..]],
        amount,
    )?;

    commit_unstake(
        &mut ctx.accounts.portal,
        &mut ctx.accounts.user_account,
        &update,
        amount,
    )?;

    msg!("Force unstaked {} principal, received {}", amount, received);
    msg!("Portal Energy tokens burned: {}", burned);

    emit!(Unstaked {
        user: ctx.accounts.user.key(),
        amount,
        received,
        energy_tokens_burned: burned,
        staked_balance: update.staked_balance,
        portal_energy: update.portal_energy,
    });

    Ok(())
}

/// Portal Energy tokens a force unstake burns, given the shortfall and the
/// caller's token balance.
pub fn force_unstake_burn(required: u64, token_balance: u64) -> Result<u64> {
    require!(token_balance >= required, PortalError::InsufficientBalance);
    Ok(required)
}

fn commit_unstake(
    portal: &mut Portal,
    user_account: &mut UserAccount,
    update: &AccountUpdate,
    amount: u64,
) -> Result<()> {
    user_account.apply(update);
    portal.total_principal_staked = portal
        .total_principal_staked
        .checked_sub(amount)
        .ok_or(PortalError::MathUnderflow)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000;
    const LOCK: i64 = 90 * SECONDS_PER_DAY;

    fn staked(amount: u64) -> UserAccount {
        let mut account = UserAccount::default();
        let update = account.compute_update(T0, LOCK, amount, true).unwrap();
        account.apply(&update);
        account
    }

    #[test]
    fn burn_needs_enough_tokens() {
        assert_eq!(
            force_unstake_burn(123, 122).unwrap_err(),
            PortalError::InsufficientBalance.into()
        );
        assert_eq!(force_unstake_burn(123, 123).unwrap(), 123);
        assert_eq!(force_unstake_burn(0, 0).unwrap(), 0);
    }

    #[test]
    fn drained_account_burns_full_debt() {
        let mut account = staked(1_000);
        account.portal_energy = 0;
        let update = account
            .compute_update(T0, LOCK, account.staked_balance, false)
            .unwrap();
        assert_eq!(update.portal_energy_tokens_required, 246);

        assert_eq!(
            force_unstake_burn(update.portal_energy_tokens_required, 245).unwrap_err(),
            PortalError::InsufficientBalance.into()
        );
        assert_eq!(
            force_unstake_burn(update.portal_energy_tokens_required, 1_000).unwrap(),
            246
        );
    }

    #[test]
    fn commit_moves_stake_out_of_total() {
        let mut account = staked(1_000);
        let mut portal = Portal {
            total_principal_staked: 1_000,
            ..Portal::default()
        };
        let update = account.compute_update(T0, LOCK, 400, false).unwrap();

        commit_unstake(&mut portal, &mut account, &update, 400).unwrap();

        assert_eq!(portal.total_principal_staked, 600);
        assert_eq!(account.staked_balance, 600);
        assert_eq!(account.max_stake_debt, 147);
    }
}
