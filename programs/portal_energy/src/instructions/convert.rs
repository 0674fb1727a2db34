//! Arbitrage converter.
//!
//! Any token the portal PDA ends up holding, other than its own settlement
//! and principal tokens, can be bought in full for a fixed settlement
//! payment. Part of that payment feeds the funding reward pool.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::error::PortalError;
use crate::events::Converted;
use crate::instructions::exchange::check_trade;
use crate::state::Portal;
use crate::token_ops;

/// Accounts required for a conversion.
#[derive(Accounts)]
#[instruction(recipient: Pubkey)]
pub struct Convert<'info> {
    /// Arbitrageur paying the fixed settlement amount.
    pub caller: Signer<'info>,

    /// The portal.
    #[account(
        mut,
        seeds = [PORTAL_SEED, portal.principal_mint.as_ref()],
        bump = portal.bump,
        has_one = settlement_vault @ PortalError::VaultMismatch
    )]
    pub portal: Box<Account<'info, Portal>>,

    /// Portal-owned account holding the token being swept.
    #[account(
        mut,
        constraint = source_token_account.owner == portal.key() @ PortalError::InvalidTokenAccountOwner
    )]
    pub source_token_account: Box<Account<'info, TokenAccount>>,

    /// Recipient's account for the swept token.
    #[account(
        mut,
        constraint = recipient_token_account.mint == source_token_account.mint @ PortalError::MintMismatch,
        constraint = recipient_token_account.owner == recipient @ PortalError::InvalidTokenAccountOwner
    )]
    pub recipient_token_account: Box<Account<'info, TokenAccount>>,

    /// Caller's settlement token account.
    #[account(
        mut,
        constraint = caller_token_account.mint == portal.settlement_mint @ PortalError::MintMismatch,
        constraint = caller_token_account.owner == caller.key() @ PortalError::InvalidTokenAccountOwner
    )]
    pub caller_token_account: Box<Account<'info, TokenAccount>>,

    /// Portal's settlement vault.
    #[account(mut)]
    pub settlement_vault: Box<Account<'info, TokenAccount>>,

    /// Token program.
    pub token_program: Program<'info, Token>,
}

/// Sweep the portal's whole balance of one foreign token to `recipient`.
///
/// # Arguments
/// * `ctx` - Convert accounts context
/// * `recipient` - Owner of the account receiving the swept token
/// * `min_received` - Minimum balance the caller accepts
/// * `deadline` - Unix timestamp after which the conversion is rejected
///
/// # Returns
/// Result indicating success or error
pub fn handler(
    ctx: Context<Convert>,
    recipient: Pubkey,
    min_received: u64,
    deadline: i64,
) -> Result<()> {
    let clock = Clock::get()?;
    ctx.accounts
        .portal
        .check_convertible(&ctx.accounts.source_token_account.mint)?;
    let amount = ctx.accounts.source_token_account.amount;
    check_trade(clock.unix_timestamp, deadline, amount, &recipient)?;
    check_sweep(amount, min_received)?;
    ctx.accounts.portal.require_active()?;

    token_ops::transfer_in(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.caller_token_account.to_account_info(),
        &ctx.accounts.settlement_vault.to_account_info(),
        &ctx.accounts.caller.to_account_info(),
        ctx.accounts.portal.amount_to_convert,
    )?;

    let seeds = ctx.accounts.portal.signer_seeds();
    token_ops::transfer_out(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.source_token_account.to_account_info(),
        &ctx.accounts.recipient_token_account.to_account_info(),
        &ctx.accounts.portal.to_account_info(),
        &[&seeds[..]],
        amount,
    )?;

    let reward_added = ctx.accounts.portal.credit_conversion_reward()?;

    msg!("Converted {} of {}", amount, ctx.accounts.source_token_account.mint);
    msg!("Reward pool increased by {}", reward_added);

    emit!(Converted {
        caller: ctx.accounts.caller.key(),
        token: ctx.accounts.source_token_account.mint,
        recipient,
        amount_swept: amount,
        reward_added,
    });

    Ok(())
}

/// The portal's balance must be non-zero and at least what the caller
/// asked for.
pub fn check_sweep(amount: u64, min_received: u64) -> Result<()> {
    require!(amount > 0, PortalError::ZeroAmount);
    require!(amount >= min_received, PortalError::SlippageExceeded);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_balance_is_rejected() {
        assert_eq!(
            check_sweep(0, 0).unwrap_err(),
            PortalError::ZeroAmount.into()
        );
    }

    #[test]
    fn balance_below_minimum_is_rejected() {
        assert_eq!(
            check_sweep(999, 1_000).unwrap_err(),
            PortalError::SlippageExceeded.into()
        );
        check_sweep(1_000, 1_000).unwrap();
        check_sweep(5_000, 0).unwrap();
    }
}
