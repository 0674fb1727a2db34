/// Initialize instruction handler.
///
/// Creates a portal for one principal mint: the portal state, both vaults
/// and the two portal-controlled mints. The portal starts in the funding
/// phase.
///
/// ## Security Guarantees
/// - Vaults and mints are PDAs whose authority is the portal PDA
/// - Principal and settlement mints are locked into portal state
/// - All parameters validated before storage

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::PortalError;
use crate::events::PortalInitialized;
use crate::state::{Portal, PortalPhase};

/// Deployment configuration of a portal.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct InitializeParams {
    /// Starting max lock duration in seconds.
    pub max_lock_duration: i64,
    /// Value at which the max lock duration stops growing.
    pub terminal_max_lock_duration: i64,
    /// Minimum length of the funding phase in seconds.
    pub funding_phase_duration: i64,
    /// Settlement tokens that must be raised before activation.
    pub funding_min_amount: u64,
    /// Initial energy per settlement unit on the curve.
    pub funding_exchange_ratio: u64,
    /// Receipt tokens minted per contributed settlement unit.
    pub funding_max_return_multiplier: u64,
    /// Receipt redemption floor, basis points of face value.
    pub funding_min_return_bps: u16,
    /// Receipt redemption cap, basis points of face value.
    pub funding_max_return_bps: u16,
    /// Yearly linear growth of receipt value, basis points of face value.
    pub funding_apr_bps: u16,
    /// Share of each converter payment that refills the reward pool.
    pub funding_reward_share_bps: u16,
    /// Haircut applied to buy inputs before pricing.
    pub trade_protection_bps: u16,
    /// Fixed settlement payment charged by the converter.
    pub amount_to_convert: u64,
}

impl InitializeParams {
    pub fn validate(&self) -> Result<()> {
        require!(self.max_lock_duration > 0, PortalError::InvalidParameter);
        require!(
            self.terminal_max_lock_duration >= self.max_lock_duration,
            PortalError::InvalidParameter
        );
        require!(self.funding_phase_duration > 0, PortalError::InvalidParameter);
        require!(self.funding_min_amount > 0, PortalError::InvalidParameter);
        require!(self.funding_exchange_ratio > 0, PortalError::InvalidParameter);
        require!(
            self.funding_max_return_multiplier > 0
                && self.funding_max_return_multiplier <= MAX_FUNDING_MAX_RETURN_MULTIPLIER,
            PortalError::InvalidParameter
        );
        require!(self.funding_min_return_bps > 0, PortalError::InvalidParameter);
        require!(
            self.funding_min_return_bps <= self.funding_max_return_bps,
            PortalError::InvalidParameter
        );
        require!(
            self.funding_max_return_bps as u64 <= BASIS_POINTS_DENOMINATOR,
            PortalError::InvalidParameter
        );
        require!(
            self.funding_reward_share_bps as u64 <= BASIS_POINTS_DENOMINATOR,
            PortalError::InvalidParameter
        );
        require!(
            self.trade_protection_bps <= MAX_TRADE_PROTECTION_BPS,
            PortalError::InvalidParameter
        );
        require!(self.amount_to_convert > 0, PortalError::InvalidParameter);
        Ok(())
    }
}

impl Portal {
    pub fn configure(&mut self, params: &InitializeParams, now: i64) {
        self.max_lock_duration = params.max_lock_duration;
        self.terminal_max_lock_duration = params.terminal_max_lock_duration;
        self.lock_duration_updatable = params.max_lock_duration < params.terminal_max_lock_duration;

        self.total_principal_staked = 0;
        self.constant_product = 0;
        self.trade_protection_bps = params.trade_protection_bps;

        self.phase = PortalPhase::Funding;
        self.created_at = now;
        self.activated_at = 0;
        self.funding_phase_duration = params.funding_phase_duration;
        self.funding_min_amount = params.funding_min_amount;
        self.funding_exchange_ratio = params.funding_exchange_ratio;
        self.funding_max_return_multiplier = params.funding_max_return_multiplier;
        self.funding_min_return_bps = params.funding_min_return_bps;
        self.funding_max_return_bps = params.funding_max_return_bps;
        self.funding_apr_bps = params.funding_apr_bps;
        self.funding_reward_share_bps = params.funding_reward_share_bps;
        self.funding_balance = 0;
        self.funding_reward_pool = 0;
        self.funding_max_rewards = 0;

        self.amount_to_convert = params.amount_to_convert;
        self.position_count = 0;
    }
}

/// Accounts required for portal initialization.
///
/// ## Security Notes
/// - `principal_vault` and `settlement_vault` are PDAs with `portal` as authority
/// - `energy_mint` and `receipt_mint` can only be minted by the portal PDA
/// - Seeds ensure none of these accounts can be swapped or replaced
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// The deployer paying for account creation.
    #[account(mut)]
    pub authority: Signer<'info>,

    /// The portal account to be created.
    /// SECURITY: PDA derived from PORTAL_SEED + principal mint ensures uniqueness per asset.
    #[account(
        init,
        payer = authority,
        space = Portal::LEN,
        seeds = [PORTAL_SEED, principal_mint.key().as_ref()],
        bump
    )]
    pub portal: Box<Account<'info, Portal>>,

    /// The yield-bearing asset users stake.
    pub principal_mint: Box<Account<'info, Mint>>,

    /// The token the internal exchange settles in.
    #[account(
        constraint = settlement_mint.key() != principal_mint.key() @ PortalError::MintMismatch
    )]
    pub settlement_mint: Box<Account<'info, Mint>>,

    /// Vault holding staked principal (yield-source adapter).
    #[account(
        init,
        payer = authority,
        seeds = [PRINCIPAL_VAULT_SEED, portal.key().as_ref()],
        bump,
        token::mint = principal_mint,
        token::authority = portal
    )]
    pub principal_vault: Box<Account<'info, TokenAccount>>,

    /// Vault holding the exchange reserve and the funding reward pool.
    #[account(
        init,
        payer = authority,
        seeds = [SETTLEMENT_VAULT_SEED, portal.key().as_ref()],
        bump,
        token::mint = settlement_mint,
        token::authority = portal
    )]
    pub settlement_vault: Box<Account<'info, TokenAccount>>,

    /// Portal Energy token, same precision as the principal.
    #[account(
        init,
        payer = authority,
        seeds = [ENERGY_MINT_SEED, portal.key().as_ref()],
        bump,
        mint::decimals = principal_mint.decimals,
        mint::authority = portal
    )]
    pub energy_mint: Box<Account<'info, Mint>>,

    /// Funding receipt token, same precision as the settlement token.
    #[account(
        init,
        payer = authority,
        seeds = [RECEIPT_MINT_SEED, portal.key().as_ref()],
        bump,
        mint::decimals = settlement_mint.decimals,
        mint::authority = portal
    )]
    pub receipt_mint: Box<Account<'info, Mint>>,

    /// Destination of principal surplus swept by `collect_profit`.
    #[account(
        constraint = profit_recipient.mint == principal_mint.key() @ PortalError::MintMismatch
    )]
    pub profit_recipient: Box<Account<'info, TokenAccount>>,

    /// System program for account creation.
    pub system_program: Program<'info, System>,

    /// Token program for token account operations.
    pub token_program: Program<'info, Token>,

    /// Rent sysvar for rent-exempt calculations.
    pub rent: Sysvar<'info, Rent>,
}

/// Initialize a new portal.
///
/// # Arguments
/// * `ctx` - Initialize accounts context
/// * `params` - Deployment configuration
///
/// # Returns
/// Result indicating success or error
pub fn handler(ctx: Context<Initialize>, params: InitializeParams) -> Result<()> {
    params.validate()?;

    let clock = Clock::get()?;
    let portal_key = ctx.accounts.portal.key();
    let portal = &mut ctx.accounts.portal;

    portal.principal_mint = ctx.accounts.principal_mint.key();
    portal.principal_vault = ctx.accounts.principal_vault.key();
    portal.settlement_mint = ctx.accounts.settlement_mint.key();
    portal.settlement_vault = ctx.accounts.settlement_vault.key();
    portal.energy_mint = ctx.accounts.energy_mint.key();
    portal.receipt_mint = ctx.accounts.receipt_mint.key();
    portal.profit_recipient = ctx.accounts.profit_recipient.key();
    portal.configure(&params, clock.unix_timestamp);

    portal.bump = ctx.bumps.portal;
    portal.principal_vault_bump = ctx.bumps.principal_vault;
    portal.settlement_vault_bump = ctx.bumps.settlement_vault;
    portal.energy_mint_bump = ctx.bumps.energy_mint;
    portal.receipt_mint_bump = ctx.bumps.receipt_mint;

    msg!("Portal initialized for principal mint {}", portal.principal_mint);
    msg!("Settlement mint: {}", portal.settlement_mint);
    msg!(
        "Max lock: {}s (terminal {}s), funding phase: {}s, funding minimum: {}",
        portal.max_lock_duration,
        portal.terminal_max_lock_duration,
        portal.funding_phase_duration,
        portal.funding_min_amount
    );

    emit!(PortalInitialized {
        portal: portal_key,
        principal_mint: portal.principal_mint,
        settlement_mint: portal.settlement_mint,
        created_at: portal.created_at,
    });

    Ok(())
}
