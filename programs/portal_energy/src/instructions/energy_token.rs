//! Portal Energy token instruction handlers.
//!
//! Moves energy between the internal ledger and its transferable SPL
//! representation at a fixed 1:1 rate.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::PortalError;
use crate::events::{EnergyTokenBurned, EnergyTokenMinted};
use crate::state::{Portal, UserAccount};
use crate::token_ops;

/// Accounts required for minting Portal Energy tokens.
#[derive(Accounts)]
#[instruction(recipient: Pubkey)]
pub struct MintPortalEnergyToken<'info> {
    /// Account holder converting energy into tokens.
    pub caller: Signer<'info>,

    /// The portal (mint authority).
    #[account(
        seeds = [PORTAL_SEED, portal.principal_mint.as_ref()],
        bump = portal.bump,
        has_one = energy_mint @ PortalError::MintMismatch
    )]
    pub portal: Box<Account<'info, Portal>>,

    /// Caller's ledger account.
    #[account(
        mut,
        seeds = [USER_ACCOUNT_SEED, portal.key().as_ref(), caller.key().as_ref()],
        bump = caller_account.bump,
        constraint = caller_account.owner == caller.key() @ PortalError::Unauthorized
    )]
    pub caller_account: Box<Account<'info, UserAccount>>,

    /// Portal Energy token mint.
    #[account(mut)]
    pub energy_mint: Box<Account<'info, Mint>>,

    /// Recipient's Portal Energy token account.
    #[account(
        mut,
        constraint = recipient_token_account.mint == energy_mint.key() @ PortalError::MintMismatch,
        constraint = recipient_token_account.owner == recipient @ PortalError::InvalidTokenAccountOwner
    )]
    pub recipient_token_account: Box<Account<'info, TokenAccount>>,

    /// Token program.
    pub token_program: Program<'info, Token>,
}

/// Accounts required for burning Portal Energy tokens.
#[derive(Accounts)]
#[instruction(recipient: Pubkey)]
pub struct BurnPortalEnergyToken<'info> {
    /// Token holder burning energy tokens.
    #[account(mut)]
    pub caller: Signer<'info>,

    /// The portal.
    #[account(
        seeds = [PORTAL_SEED, portal.principal_mint.as_ref()],
        bump = portal.bump,
        has_one = energy_mint @ PortalError::MintMismatch
    )]
    pub portal: Box<Account<'info, Portal>>,

    /// Ledger account credited with the energy (created if needed).
    #[account(
        init_if_needed,
        payer = caller,
        space = UserAccount::LEN,
        seeds = [USER_ACCOUNT_SEED, portal.key().as_ref(), recipient.as_ref()],
        bump
    )]
    pub recipient_account: Box<Account<'info, UserAccount>>,

    /// Portal Energy token mint.
    #[account(mut)]
    pub energy_mint: Box<Account<'info, Mint>>,

    /// Caller's Portal Energy token account.
    #[account(
        mut,
        constraint = caller_token_account.mint == energy_mint.key() @ PortalError::MintMismatch,
        constraint = caller_token_account.owner == caller.key() @ PortalError::InvalidTokenAccountOwner
    )]
    pub caller_token_account: Box<Account<'info, TokenAccount>>,

    /// System program.
    pub system_program: Program<'info, System>,

    /// Token program.
    pub token_program: Program<'info, Token>,
}

/// Convert internal Portal Energy into tokens sent to `recipient`.
///
/// # Arguments
/// * `ctx` - MintPortalEnergyToken accounts context
/// * `recipient` - Owner of the receiving token account
/// * `amount` - Energy to convert
///
/// # Returns
/// Result indicating success or error
pub fn mint_handler(
    ctx: Context<MintPortalEnergyToken>,
    recipient: Pubkey,
    amount: u64,
) -> Result<()> {
    require!(amount > 0, PortalError::ZeroAmount);
    require!(recipient != Pubkey::default(), PortalError::InvalidAddress);
    let portal = &ctx.accounts.portal;
    portal.require_active()?;

    let clock = Clock::get()?;
    let mut update = ctx.accounts.caller_account.compute_update(
        clock.unix_timestamp,
        portal.max_lock_duration,
        0,
        true,
    )?;
    update.debit_energy(amount)?;

    let seeds = portal.signer_seeds();
    token_ops::mint_to(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.energy_mint.to_account_info(),
        &ctx.accounts.recipient_token_account.to_account_info(),
        &ctx.accounts.portal.to_account_info(),
        &[&seeds[..]],
        amount,
    )?;

    ctx.accounts.caller_account.apply(&update);

    msg!("Minted {} Portal Energy tokens to {}", amount, recipient);

    emit!(EnergyTokenMinted {
        caller: ctx.accounts.caller.key(),
        recipient,
        amount,
    });

    Ok(())
}

/// Burn Portal Energy tokens and credit the energy to `recipient`'s
/// ledger account.
///
/// # Arguments
/// * `ctx` - BurnPortalEnergyToken accounts context
/// * `recipient` - Owner of the ledger account credited
/// * `amount` - Tokens to burn
///
/// # Returns
/// Result indicating success or error
pub fn burn_handler(
    ctx: Context<BurnPortalEnergyToken>,
    recipient: Pubkey,
    amount: u64,
) -> Result<()> {
    require!(amount > 0, PortalError::ZeroAmount);
    require!(recipient != Pubkey::default(), PortalError::InvalidAddress);
    ctx.accounts.portal.require_active()?;
    require!(
        ctx.accounts.caller_token_account.amount >= amount,
        PortalError::InsufficientBalance
    );

    token_ops::burn(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.energy_mint.to_account_info(),
        &ctx.accounts.caller_token_account.to_account_info(),
        &ctx.accounts.caller.to_account_info(),
        amount,
    )?;

    let portal_key = ctx.accounts.portal.key();
    let recipient_account = &mut ctx.accounts.recipient_account;
    recipient_account.bind(recipient, portal_key, ctx.bumps.recipient_account);
    recipient_account.portal_energy = recipient_account
        .portal_energy
        .checked_add(amount)
        .ok_or(PortalError::MathOverflow)?;

    msg!("Burned {} Portal Energy tokens for {}", amount, recipient);

    emit!(EnergyTokenBurned {
        caller: ctx.accounts.caller.key(),
        recipient,
        amount,
    });

    Ok(())
}
