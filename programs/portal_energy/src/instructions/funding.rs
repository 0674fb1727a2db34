//! Bootstrap funding instruction handlers.
//!
//! During the funding phase settlement contributions are pooled and paid
//! for with receipt tokens. Activation turns the pool into the seed
//! liquidity of the internal exchange. Afterwards receipts are redeemed
//! against the funding reward pool filled by the converter.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::PortalError;
use crate::events::{FundingContributed, FundingWithdrawn, PortalActivated, ReceiptsRedeemed};
use crate::state::Portal;
use crate::token_ops;

/// Accounts shared by contribute, withdraw and redeem: a holder moving
/// settlement tokens against receipt tokens.
#[derive(Accounts)]
pub struct FundingTransfer<'info> {
    /// The funder or receipt holder.
    pub holder: Signer<'info>,

    /// The portal.
    #[account(
        mut,
        seeds = [PORTAL_SEED, portal.principal_mint.as_ref()],
        bump = portal.bump,
        has_one = settlement_vault @ PortalError::VaultMismatch,
        has_one = receipt_mint @ PortalError::MintMismatch
    )]
    pub portal: Box<Account<'info, Portal>>,

    /// Receipt token mint.
    #[account(mut)]
    pub receipt_mint: Box<Account<'info, Mint>>,

    /// Holder's receipt token account.
    #[account(
        mut,
        constraint = holder_receipt_account.mint == receipt_mint.key() @ PortalError::MintMismatch,
        constraint = holder_receipt_account.owner == holder.key() @ PortalError::InvalidTokenAccountOwner
    )]
    pub holder_receipt_account: Box<Account<'info, TokenAccount>>,

    /// Holder's settlement token account.
    #[account(
        mut,
        constraint = holder_token_account.mint == portal.settlement_mint @ PortalError::MintMismatch,
        constraint = holder_token_account.owner == holder.key() @ PortalError::InvalidTokenAccountOwner
    )]
    pub holder_token_account: Box<Account<'info, TokenAccount>>,

    /// Portal's settlement vault.
    #[account(mut)]
    pub settlement_vault: Box<Account<'info, TokenAccount>>,

    /// Token program.
    pub token_program: Program<'info, Token>,
}

/// Accounts required for activating the portal.
#[derive(Accounts)]
pub struct ActivatePortal<'info> {
    /// Anyone may activate once the conditions hold.
    pub caller: Signer<'info>,

    /// The portal.
    #[account(
        mut,
        seeds = [PORTAL_SEED, portal.principal_mint.as_ref()],
        bump = portal.bump,
        has_one = receipt_mint @ PortalError::MintMismatch
    )]
    pub portal: Box<Account<'info, Portal>>,

    /// Receipt token mint, read for its supply.
    pub receipt_mint: Box<Account<'info, Mint>>,
}

impl<'info> FundingTransfer<'info> {
    fn burn_receipts(&self, amount: u64) -> Result<()> {
        require!(
            self.holder_receipt_account.amount >= amount,
            PortalError::InsufficientBalance
        );
        token_ops::burn(
            &self.token_program.to_account_info(),
            &self.receipt_mint.to_account_info(),
            &self.holder_receipt_account.to_account_info(),
            &self.holder.to_account_info(),
            amount,
        )
    }

    fn pay_out(&self, amount: u64) -> Result<()> {
        let seeds = self.portal.signer_seeds();
        token_ops::transfer_out(
            &self.token_program.to_account_info(),
            &self.settlement_vault.to_account_info(),
            &self.holder_token_account.to_account_info(),
            &self.portal.to_account_info(),
            &[&seeds[..]],
            amount,
        )
    }
}

/// Contribute settlement tokens during the funding phase.
///
/// # Arguments
/// * `ctx` - FundingTransfer accounts context
/// * `amount` - Settlement tokens contributed
///
/// # Returns
/// Result indicating success or error
pub fn contribute_handler(ctx: Context<FundingTransfer>, amount: u64) -> Result<()> {
    require!(amount > 0, PortalError::ZeroAmount);
    ctx.accounts.portal.require_funding()?;

    let receipts = ctx.accounts.portal.receipts_for_contribution(amount)?;

    token_ops::transfer_in(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.holder_token_account.to_account_info(),
        &ctx.accounts.settlement_vault.to_account_info(),
        &ctx.accounts.holder.to_account_info(),
        amount,
    )?;

    let seeds = ctx.accounts.portal.signer_seeds();
    token_ops::mint_to(
        &ctx.accounts.token_program.to_account_info(),
        &ctx.accounts.receipt_mint.to_account_info(),
        &ctx.accounts.holder_receipt_account.to_account_info(),
        &ctx.accounts.portal.to_account_info(),
        &[&seeds[..]],
        receipts,
    )?;

    let portal = &mut ctx.accounts.portal;
    portal.funding_balance = portal
        .funding_balance
        .checked_add(amount)
        .ok_or(PortalError::MathOverflow)?;

    msg!("Contributed {} settlement, minted {} receipts", amount, receipts);
    msg!("Funding balance: {}", portal.funding_balance);

    emit!(FundingContributed {
        funder: ctx.accounts.holder.key(),
        amount,
        receipts_minted: receipts,
    });

    Ok(())
}

/// Take a contribution back before activation.
///
/// Only whole multiples of the return multiplier are burned, so the
/// remainder of `receipt_amount` stays with the holder.
///
/// # Arguments
/// * `ctx` - FundingTransfer accounts context
/// * `receipt_amount` - Receipt tokens offered
///
/// # Returns
/// Result indicating success or error
pub fn withdraw_handler(ctx: Context<FundingTransfer>, receipt_amount: u64) -> Result<()> {
    ctx.accounts.portal.require_funding()?;

    let amount = ctx.accounts.portal.contribution_for_receipts(receipt_amount)?;
    require!(amount > 0, PortalError::ZeroAmount);
    let receipts = ctx.accounts.portal.receipts_for_contribution(amount)?;
    require!(
        ctx.accounts.portal.funding_balance >= amount,
        PortalError::InsufficientBalance
    );

    ctx.accounts.burn_receipts(receipts)?;
    ctx.accounts.pay_out(amount)?;

    let portal = &mut ctx.accounts.portal;
    portal.funding_balance -= amount;

    msg!("Withdrew {} settlement, burned {} receipts", amount, receipts);
    msg!("Funding balance: {}", portal.funding_balance);

    emit!(FundingWithdrawn {
        funder: ctx.accounts.holder.key(),
        receipts_burned: receipts,
        amount,
    });

    Ok(())
}

/// Close the funding phase and seed the exchange curve.
///
/// # Arguments
/// * `ctx` - ActivatePortal accounts context
///
/// # Returns
/// Result indicating success or error
pub fn activate_handler(ctx: Context<ActivatePortal>) -> Result<()> {
    let clock = Clock::get()?;
    let receipt_supply = ctx.accounts.receipt_mint.supply;

    let portal = &mut ctx.accounts.portal;
    portal.activate(clock.unix_timestamp, receipt_supply)?;

    msg!("Portal activated at {}", portal.activated_at);
    msg!("Constant product: {}", portal.constant_product);
    msg!("Max funding rewards: {}", portal.funding_max_rewards);

    emit!(PortalActivated {
        funding_balance: portal.funding_balance,
        constant_product: portal.constant_product,
        funding_max_rewards: portal.funding_max_rewards,
        activated_at: portal.activated_at,
    });

    Ok(())
}

/// Redeem receipt tokens against the funding reward pool.
///
/// # Arguments
/// * `ctx` - FundingTransfer accounts context
/// * `amount` - Receipt tokens to burn
///
/// # Returns
/// Result indicating success or error
pub fn burn_receipts_handler(ctx: Context<FundingTransfer>, amount: u64) -> Result<()> {
    require!(amount > 0, PortalError::ZeroAmount);
    ctx.accounts.portal.require_active()?;

    let now = Clock::get()?.unix_timestamp;
    let burnable = ctx.accounts.portal.burnable_receipt_amount(now)?;
    require!(amount <= burnable, PortalError::InsufficientRewards);

    let value = ctx.accounts.portal.redemption_value(amount, now)?;
    require!(value > 0, PortalError::ZeroAmount);

    ctx.accounts.burn_receipts(amount)?;
    ctx.accounts.pay_out(value)?;

    let portal = &mut ctx.accounts.portal;
    portal.record_receipt_burn(amount, value)?;

    msg!("Burned {} receipts for {} settlement", amount, value);
    msg!("Funding reward pool: {}", portal.funding_reward_pool);

    emit!(ReceiptsRedeemed {
        holder: ctx.accounts.holder.key(),
        receipts_burned: amount,
        value,
        funding_reward_pool: portal.funding_reward_pool,
    });

    Ok(())
}
