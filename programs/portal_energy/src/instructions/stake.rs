//! Stake instruction handler.
//!
//! Handles depositing principal into the portal and crediting the upfront
//! Portal Energy for it.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::adapter;
use crate::constants::*;
use crate::error::PortalError;
use crate::events::Staked;
use crate::state::{Portal, UserAccount};

/// Accounts required for staking.
#[derive(Accounts)]
pub struct Stake<'info> {
    /// The user staking principal.
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

    /// User's ledger account (created if first time staking).
    #[account(
        init_if_needed,
        payer = user,
        space = UserAccount::LEN,
        seeds = [USER_ACCOUNT_SEED, portal.key().as_ref(), user.key().as_ref()],
        bump
    )]
    pub user_account: Box<Account<'info, UserAccount>>,

    /// User's token account for the principal.
    #[account(
        mut,
        constraint = user_token_account.mint == portal.principal_mint @ PortalError::MintMismatch,
        constraint = user_token_account.owner == user.key() @ PortalError::InvalidTokenAccountOwner
    )]
    pub user_token_account: Box<Account<'info, TokenAccount>>,

    /// Portal's principal vault.
    #[account(mut)]
    pub principal_vault: Box<Account<'info, TokenAccount>>,

    /// System program.
    pub system_program: Program<'info, System>,

    /// Token program.
    pub token_program: Program<'info, Token>,
}

/// Stake principal into the portal.
///
/// # Arguments
/// * `ctx` - Stake accounts context
/// * `amount` - Amount of principal to stake
///
/// # Returns
/// Result indicating success or error
pub fn handler(ctx: Context<Stake>, amount: u64) -> Result<()> {
    require!(amount > 0, PortalError::ZeroAmount);
    ctx.accounts.portal.require_active()?;

    let clock = Clock::get()?;
    let update = ctx.accounts.user_account.compute_update(
        clock.unix_timestamp,
        ctx.accounts.portal.max_lock_duration,
        amount,
        true,
    )?;

    adapter::deposit_principal(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.user_token_account.to_account_info(),
        &ctx.accounts.user.to_account_info(),
        &mut ctx.accounts.principal_vault,
        amount,
    )?;

    let user_key = ctx.accounts.user.key();
    let portal_key = ctx.accounts.portal.key();
    let user_account = &mut ctx.accounts.user_account;
    user_account.bind(user_key, portal_key, ctx.bumps.user_account);
    user_account.apply(&update);

    let portal = &mut ctx.accounts.portal;
    portal.total_principal_staked = portal
        .total_principal_staked
        .checked_add(amount)
        .ok_or(PortalError::MathOverflow)?;

    msg!("Staked {} principal", amount);
    msg!("Total staked by user: {}", update.staked_balance);
    msg!("Portal Energy: {}", update.portal_energy);

    emit!(Staked {
        user: user_key,
        amount,
        staked_balance: update.staked_balance,
        max_stake_debt: update.max_stake_debt,
        portal_energy: update.portal_energy,
    });

    Ok(())
}
