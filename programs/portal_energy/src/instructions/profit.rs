//! Yield-source profit collection.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::adapter;
use crate::constants::*;
use crate::error::PortalError;
use crate::events::ProfitCollected;
use crate::state::Portal;
use crate::token_ops;

/// Accounts required for collecting profit.
#[derive(Accounts)]
pub struct CollectProfit<'info> {
    /// Permissionless caller.
    pub caller: Signer<'info>,

    /// The portal.
    #[account(
        seeds = [PORTAL_SEED, portal.principal_mint.as_ref()],
        bump = portal.bump,
        has_one = principal_vault @ PortalError::VaultMismatch,
        has_one = profit_recipient @ PortalError::InvalidAddress
    )]
    pub portal: Box<Account<'info, Portal>>,

    /// Portal's principal vault.
    #[account(mut)]
    pub principal_vault: Box<Account<'info, TokenAccount>>,

    /// Token account configured to receive profit.
    #[account(mut)]
    pub profit_recipient: Box<Account<'info, TokenAccount>>,

    /// Token program.
    pub token_program: Program<'info, Token>,
}

/// Accounts required for reading pending profit.
#[derive(Accounts)]
pub struct GetPendingProfit<'info> {
    /// The portal.
    #[account(has_one = principal_vault @ PortalError::VaultMismatch)]
    pub portal: Box<Account<'info, Portal>>,

    /// Portal's principal vault.
    pub principal_vault: Box<Account<'info, TokenAccount>>,
}

/// Send principal held beyond total stake to the profit recipient.
///
/// # Arguments
/// * `ctx` - CollectProfit accounts context
///
/// # Returns
/// Result indicating success or error
pub fn handler(ctx: Context<CollectProfit>) -> Result<()> {
    let portal = &ctx.accounts.portal;
    let profit = adapter::pending_profit(
        ctx.accounts.principal_vault.amount,
        portal.total_principal_staked,
    );
    require!(profit > 0, PortalError::NoProfitAvailable);

    let seeds = portal.signer_seeds();
    token_ops::transfer_out(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.principal_vault.to_account_info(),
        &ctx.accounts.profit_recipient.to_account_info(),
        &ctx.accounts.portal.to_account_info(),
        &[&seeds[..]],
        profit,
    )?;

    msg!("Collected {} profit", profit);

    emit!(ProfitCollected {
        recipient: ctx.accounts.profit_recipient.key(),
        amount: profit,
    });

    Ok(())
}

/// Principal currently collectable as profit.
pub fn pending_handler(ctx: Context<GetPendingProfit>) -> Result<u64> {
    Ok(adapter::pending_profit(
        ctx.accounts.principal_vault.amount,
        ctx.accounts.portal.total_principal_staked,
    ))
}
