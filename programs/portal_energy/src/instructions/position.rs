//! Position tokenization instruction handlers.
//!
//! A user account can be frozen into a `Position` record that keeps
//! accruing energy, changes hands, and is folded back into the holder's
//! account on redemption.

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::PortalError;
use crate::events::{PositionRedeemed, PositionTokenized, PositionTransferred};
use crate::state::{Portal, Position, UserAccount};

/// Accounts required for tokenizing a user account.
#[derive(Accounts)]
pub struct TokenizePosition<'info> {
    /// Account holder.
    #[account(mut)]
    pub owner: Signer<'info>,

    /// The portal.
    #[account(
        mut,
        seeds = [PORTAL_SEED, portal.principal_mint.as_ref()],
        bump = portal.bump
    )]
    pub portal: Box<Account<'info, Portal>>,

    /// Ledger account being frozen; closed once captured.
    #[account(
        mut,
        close = owner,
        seeds = [USER_ACCOUNT_SEED, portal.key().as_ref(), owner.key().as_ref()],
        bump = user_account.bump,
        constraint = user_account.owner == owner.key() @ PortalError::Unauthorized
    )]
    pub user_account: Box<Account<'info, UserAccount>>,

    /// New position record.
    #[account(
        init,
        payer = owner,
        space = Position::LEN,
        seeds = [POSITION_SEED, portal.key().as_ref(), &portal.position_count.to_le_bytes()],
        bump
    )]
    pub position: Box<Account<'info, Position>>,

    /// System program.
    pub system_program: Program<'info, System>,
}

/// Accounts required for handing a position to a new owner.
#[derive(Accounts)]
pub struct TransferPosition<'info> {
    /// Current position owner.
    pub owner: Signer<'info>,

    /// Position being transferred.
    #[account(
        mut,
        seeds = [POSITION_SEED, position.portal.as_ref(), &position.id.to_le_bytes()],
        bump = position.bump,
        has_one = owner @ PortalError::Unauthorized
    )]
    pub position: Box<Account<'info, Position>>,
}

/// Accounts required for redeeming a position.
#[derive(Accounts)]
pub struct RedeemPosition<'info> {
    /// Position owner.
    #[account(mut)]
    pub owner: Signer<'info>,

    /// The portal.
    #[account(
        seeds = [PORTAL_SEED, portal.principal_mint.as_ref()],
        bump = portal.bump
    )]
    pub portal: Box<Account<'info, Portal>>,

    /// Position being redeemed; closed afterwards.
    #[account(
        mut,
        close = owner,
        seeds = [POSITION_SEED, portal.key().as_ref(), &position.id.to_le_bytes()],
        bump = position.bump,
        has_one = owner @ PortalError::Unauthorized
    )]
    pub position: Box<Account<'info, Position>>,

    /// Owner's ledger account receiving the position (created if needed).
    #[account(
        init_if_needed,
        payer = owner,
        space = UserAccount::LEN,
        seeds = [USER_ACCOUNT_SEED, portal.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub user_account: Box<Account<'info, UserAccount>>,

    /// System program.
    pub system_program: Program<'info, System>,
}

/// Freeze the caller's account into a new position.
///
/// # Arguments
/// * `ctx` - TokenizePosition accounts context
///
/// # Returns
/// Result indicating success or error
pub fn tokenize_handler(ctx: Context<TokenizePosition>) -> Result<()> {
    let clock = Clock::get()?;
    let update = ctx.accounts.user_account.compute_update(
        clock.unix_timestamp,
        ctx.accounts.portal.max_lock_duration,
        0,
        true,
    )?;
    ctx.accounts.user_account.apply(&update);
    require!(
        !ctx.accounts.user_account.is_empty(),
        PortalError::EmptyAccount
    );

    let owner = ctx.accounts.owner.key();
    let id = ctx.accounts.portal.position_count;
    ctx.accounts
        .position
        .freeze(&ctx.accounts.user_account, owner, id, ctx.bumps.position);

    let portal = &mut ctx.accounts.portal;
    portal.position_count = portal
        .position_count
        .checked_add(1)
        .ok_or(PortalError::MathOverflow)?;

    msg!("Tokenized position {}", id);
    msg!("Staked: {}, Portal Energy: {}", update.staked_balance, update.portal_energy);

    emit!(PositionTokenized {
        owner,
        position_id: id,
        staked_balance: update.staked_balance,
        portal_energy: update.portal_energy,
    });

    Ok(())
}

/// Hand a position to `new_owner`.
///
/// # Arguments
/// * `ctx` - TransferPosition accounts context
/// * `new_owner` - Wallet that may redeem the position from now on
///
/// # Returns
/// Result indicating success or error
pub fn transfer_handler(ctx: Context<TransferPosition>, new_owner: Pubkey) -> Result<()> {
    require!(new_owner != Pubkey::default(), PortalError::InvalidAddress);

    let position = &mut ctx.accounts.position;
    let from = position.owner;
    position.owner = new_owner;

    msg!("Position {} transferred to {}", position.id, new_owner);

    emit!(PositionTransferred {
        position_id: position.id,
        from,
        to: new_owner,
    });

    Ok(())
}

/// Fold a position back into the owner's ledger account.
///
/// # Arguments
/// * `ctx` - RedeemPosition accounts context
///
/// # Returns
/// Result indicating success or error
pub fn redeem_handler(ctx: Context<RedeemPosition>) -> Result<()> {
    let clock = Clock::get()?;
    let owner = ctx.accounts.owner.key();
    let portal_key = ctx.accounts.portal.key();

    let user_account = &mut ctx.accounts.user_account;
    user_account.bind(owner, portal_key, ctx.bumps.user_account);

    let max_lock_duration = ctx.accounts.portal.max_lock_duration;
    let position = &ctx.accounts.position;
    let (staked, energy) = position.accrued(clock.unix_timestamp, max_lock_duration)?;
    let update = position.merge_into(user_account, clock.unix_timestamp, max_lock_duration)?;
    user_account.apply(&update);

    msg!("Redeemed position {}", position.id);
    msg!("Staked: {}, Portal Energy: {}", update.staked_balance, update.portal_energy);

    emit!(PositionRedeemed {
        owner,
        position_id: position.id,
        staked_balance: staked,
        portal_energy: energy,
    });

    Ok(())
}
