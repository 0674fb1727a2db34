//! Yield-source adapter.
//!
//! Principal is parked in the portal's `principal_vault`. The account engine
//! never trusts the requested amount: every movement is measured as a
//! balance difference on the receiving token account, so fees or rounding
//! on the venue side surface as `AdapterBalanceMismatch` (deposits) or as a
//! smaller `received` amount (withdrawals).

use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;

use crate::error::PortalError;
use crate::token_ops;

/// Pull `amount` principal from the caller into the vault.
pub fn deposit_principal<'info>(
    token_program: &AccountInfo<'info>,
    from: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    vault: &mut Account<'info, TokenAccount>,
    amount: u64,
) -> Result<()> {
    let before = vault.amount;
    token_ops::transfer_in(token_program, from, &vault.to_account_info(), authority, amount)?;
    vault.reload()?;

    let deposited = vault
        .amount
        .checked_sub(before)
        .ok_or(PortalError::AdapterBalanceMismatch)?;
    require!(deposited == amount, PortalError::AdapterBalanceMismatch);
    Ok(())
}

/// Release up to `amount` principal to `recipient`; returns what actually
/// arrived.
pub fn withdraw_principal<'info>(
    token_program: &AccountInfo<'info>,
    vault: &AccountInfo<'info>,
    recipient: &mut Account<'info, TokenAccount>,
    portal: &AccountInfo<'info>,
    signer_seeds: &[&[&[u8]]],
    amount: u64,
) -> Result<u64> {
    let before = recipient.amount;
    token_ops::transfer_out(
        token_program,
        vault,
        &recipient.to_account_info(),
        portal,
        signer_seeds,
        amount,
    )?;
    recipient.reload()?;

    let received = recipient
        .amount
        .checked_sub(before)
        .ok_or(PortalError::AdapterBalanceMismatch)?;
    check_received(amount, received)?;
    Ok(received)
}

/// Principal held beyond what stakers are owed.
pub fn pending_profit(vault_balance: u64, total_principal_staked: u64) -> u64 {
    vault_balance.saturating_sub(total_principal_staked)
}

fn check_received(requested: u64, received: u64) -> Result<()> {
    require!(
        received > 0 && received <= requested,
        PortalError::AdapterBalanceMismatch
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profit_is_surplus_over_stake() {
        assert_eq!(pending_profit(1_050, 1_000), 50);
        assert_eq!(pending_profit(1_000, 1_000), 0);
        assert_eq!(pending_profit(990, 1_000), 0);
    }

    #[test]
    fn received_may_be_short_but_not_over() {
        assert!(check_received(100, 100).is_ok());
        assert!(check_received(100, 97).is_ok());
        assert_eq!(
            check_received(100, 101).unwrap_err(),
            PortalError::AdapterBalanceMismatch.into()
        );
        assert_eq!(
            check_received(100, 0).unwrap_err(),
            PortalError::AdapterBalanceMismatch.into()
        );
    }
}
