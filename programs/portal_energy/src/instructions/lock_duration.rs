//! Max lock duration update.

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::events::MaxLockDurationUpdated;
use crate::state::Portal;

/// Accounts required for updating the max lock duration.
#[derive(Accounts)]
pub struct UpdateMaxLockDuration<'info> {
    /// Permissionless caller.
    pub caller: Signer<'info>,

    /// The portal.
    #[account(
        mut,
        seeds = [PORTAL_SEED, portal.principal_mint.as_ref()],
        bump = portal.bump
    )]
    pub portal: Box<Account<'info, Portal>>,
}

/// Grow the max lock duration to twice the portal's age.
///
/// Every account picks up the change lazily on its next commit.
///
/// # Arguments
/// * `ctx` - UpdateMaxLockDuration accounts context
///
/// # Returns
/// Result indicating success or error
pub fn handler(ctx: Context<UpdateMaxLockDuration>) -> Result<()> {
    let clock = Clock::get()?;
    let portal = &mut ctx.accounts.portal;
    let max_lock_duration = portal.update_max_lock_duration(clock.unix_timestamp)?;

    msg!("Max lock duration: {}", max_lock_duration);
    if !portal.lock_duration_updatable {
        msg!("Max lock duration reached its terminal value");
    }

    emit!(MaxLockDurationUpdated {
        max_lock_duration,
        updatable: portal.lock_duration_updatable,
    });

    Ok(())
}
