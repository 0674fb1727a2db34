//! Internal exchange instruction handlers.
//!
//! Buys and sells Portal Energy against the settlement token on the
//! constant-product curve fixed at activation. Energy is never held in a
//! reserve: buys credit the recipient's ledger account and sells debit the
//! caller's.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::error::PortalError;
use crate::events::{PortalEnergyBought, PortalEnergySold};
use crate::state::{Portal, UserAccount};
use crate::token_ops;

/// Accounts required for buying Portal Energy.
#[derive(Accounts)]
#[instruction(recipient: Pubkey)]
pub struct BuyPortalEnergy<'info> {
    /// The trader paying settlement tokens.
    #[account(mut)]
    pub caller: Signer<'info>,

    /// The portal.
    #[account(
        seeds = [PORTAL_SEED, portal.principal_mint.as_ref()],
        bump = portal.bump,
        has_one = settlement_vault @ PortalError::VaultMismatch
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

    /// System program.
    pub system_program: Program<'info, System>,

    /// Token program.
    pub token_program: Program<'info, Token>,
}

/// Accounts required for selling Portal Energy.
#[derive(Accounts)]
#[instruction(recipient: Pubkey)]
pub struct SellPortalEnergy<'info> {
    /// The trader giving up energy.
    pub caller: Signer<'info>,

    /// The portal.
    #[account(
        seeds = [PORTAL_SEED, portal.principal_mint.as_ref()],
        bump = portal.bump,
        has_one = settlement_vault @ PortalError::VaultMismatch
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

    /// Recipient's settlement token account.
    #[account(
        mut,
        constraint = recipient_token_account.mint == portal.settlement_mint @ PortalError::MintMismatch,
        constraint = recipient_token_account.owner == recipient @ PortalError::InvalidTokenAccountOwner
    )]
    pub recipient_token_account: Box<Account<'info, TokenAccount>>,

    /// Portal's settlement vault.
    #[account(mut)]
    pub settlement_vault: Box<Account<'info, TokenAccount>>,

    /// Token program.
    pub token_program: Program<'info, Token>,
}

/// Guards shared by every priced entry point.
pub fn check_trade(now: i64, deadline: i64, amount: u64, recipient: &Pubkey) -> Result<()> {
    require!(now <= deadline, PortalError::DeadlineExpired);
    require!(amount > 0, PortalError::ZeroAmount);
    require!(*recipient != Pubkey::default(), PortalError::InvalidAddress);
    Ok(())
}

/// Buy Portal Energy with settlement tokens.
///
/// # Arguments
/// * `ctx` - BuyPortalEnergy accounts context
/// * `recipient` - Owner of the ledger account credited
/// * `amount_in` - Settlement tokens paid
/// * `min_out` - Minimum energy accepted
/// * `deadline` - Unix timestamp after which the trade is rejected
///
/// # Returns
/// Result indicating success or error
pub fn buy_handler(
    ctx: Context<BuyPortalEnergy>,
    recipient: Pubkey,
    amount_in: u64,
    min_out: u64,
    deadline: i64,
) -> Result<()> {
    let clock = Clock::get()?;
    check_trade(clock.unix_timestamp, deadline, amount_in, &recipient)?;
    let portal = &ctx.accounts.portal;
    portal.require_active()?;

    let reserve = portal.settlement_reserve(ctx.accounts.settlement_vault.amount)?;
    let amount_out = portal.quote_buy(amount_in, reserve)?;
    require!(amount_out > 0, PortalError::ZeroAmount);
    require!(amount_out >= min_out, PortalError::SlippageExceeded);

    token_ops::transfer_in(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.caller_token_account.to_account_info(),
        &ctx.accounts.settlement_vault.to_account_info(),
        &ctx.accounts.caller.to_account_info(),
        amount_in,
    )?;

    let portal_key = ctx.accounts.portal.key();
    let recipient_account = &mut ctx.accounts.recipient_account;
    recipient_account.bind(recipient, portal_key, ctx.bumps.recipient_account);
    recipient_account.portal_energy = recipient_account
        .portal_energy
        .checked_add(amount_out)
        .ok_or(PortalError::MathOverflow)?;

    msg!("Bought {} Portal Energy for {} settlement", amount_out, amount_in);
    msg!("Recipient: {}", recipient);

    emit!(PortalEnergyBought {
        caller: ctx.accounts.caller.key(),
        recipient,
        amount_in,
        amount_out,
    });

    Ok(())
}

/// Sell Portal Energy for settlement tokens.
///
/// The caller's accrual is committed first, so freshly earned energy can be
/// sold in the same transaction.
///
/// # Arguments
/// * `ctx` - SellPortalEnergy accounts context
/// * `recipient` - Owner of the settlement token account paid
/// * `amount_in` - Energy sold
/// * `min_out` - Minimum settlement tokens accepted
/// * `deadline` - Unix timestamp after which the trade is rejected
///
/// # Returns
/// Result indicating success or error
pub fn sell_handler(
    ctx: Context<SellPortalEnergy>,
    recipient: Pubkey,
    amount_in: u64,
    min_out: u64,
    deadline: i64,
) -> Result<()> {
    let clock = Clock::get()?;
    check_trade(clock.unix_timestamp, deadline, amount_in, &recipient)?;
    let portal = &ctx.accounts.portal;
    portal.require_active()?;

    let mut update = ctx.accounts.caller_account.compute_update(
        clock.unix_timestamp,
        portal.max_lock_duration,
        0,
        true,
    )?;
    update.debit_energy(amount_in)?;

    let reserve = portal.settlement_reserve(ctx.accounts.settlement_vault.amount)?;
    let amount_out = portal.quote_sell(amount_in, reserve)?;
    require!(amount_out > 0, PortalError::ZeroAmount);
    require!(amount_out >= min_out, PortalError::SlippageExceeded);

    let seeds = portal.signer_seeds();
    token_ops::transfer_out(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.settlement_vault.to_account_info(),
        &ctx.accounts.recipient_token_account.to_account_info(),
        &ctx.accounts.portal.to_account_info(),
        &[&seeds[..]],
        amount_out,
    )?;

    ctx.accounts.caller_account.apply(&update);

    msg!("Sold {} Portal Energy for {} settlement", amount_in, amount_out);
    msg!("Remaining Portal Energy: {}", update.portal_energy);

    emit!(PortalEnergySold {
        caller: ctx.accounts.caller.key(),
        recipient,
        amount_in,
        amount_out,
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_guards() {
        let recipient = Pubkey::new_unique();

        assert!(check_trade(100, 100, 1, &recipient).is_ok());
        assert_eq!(
            check_trade(101, 100, 1, &recipient).unwrap_err(),
            PortalError::DeadlineExpired.into()
        );
        assert_eq!(
            check_trade(100, 100, 0, &recipient).unwrap_err(),
            PortalError::ZeroAmount.into()
        );
        assert_eq!(
            check_trade(100, 100, 1, &Pubkey::default()).unwrap_err(),
            PortalError::InvalidAddress.into()
        );
    }
}
