//! # Portal Energy Program
//!
//! Stakers deposit a principal token and earn Portal Energy, a
//! time-weighted credit, instead of yield. Energy is spent to unlock
//! principal, traded against a settlement token on an internal
//! constant-product exchange, or wrapped into an SPL token.
//!
//! ## Features
//! - Time and max-lock weighted energy ledger per staker
//! - Internal exchange with a virtual energy reserve
//! - Bootstrap funding phase paid with redeemable receipt tokens
//! - Arbitrage converter feeding the funding reward pool
//! - Principal held in a balance-checked vault; surplus collectable as profit
//! - Tokenizable, transferable staking positions
//! - Safe math with overflow protection

use anchor_lang::prelude::*;

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

pub mod adapter;
pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod math;
pub mod state;
pub mod token_ops;

use instructions::*;
use state::AccountUpdate;

#[program]
pub mod portal_energy {
    use super::*;

    /// Creates a portal with its vaults and mints. The portal starts in the
    /// funding phase.
    ///
    /// # Arguments
    /// * `ctx` - The context containing all accounts needed for initialization
    /// * `params` - Lock, funding, exchange and converter configuration
    ///
    /// # Errors
    /// Returns an error if any parameter is out of bounds.
    pub fn initialize(ctx: Context<Initialize>, params: InitializeParams) -> Result<()> {
        instructions::initialize::handler(ctx, params)
    }

    /// Stakes principal and credits the upfront Portal Energy.
    ///
    /// # Arguments
    /// * `ctx` - The context containing all accounts needed for staking
    /// * `amount` - Amount of principal to stake
    ///
    /// # Errors
    /// Returns an error if:
    /// - Portal is not active
    /// - Amount is zero
    /// - The vault did not grow by exactly `amount`
    pub fn stake(ctx: Context<Stake>, amount: u64) -> Result<()> {
        instructions::stake::handler(ctx, amount)
    }

    /// Unstakes principal covered by the account's own Portal Energy.
    ///
    /// # Arguments
    /// * `ctx` - The context containing all accounts needed for unstaking
    /// * `amount` - Amount of principal to unstake
    ///
    /// # Errors
    /// Returns an error if:
    /// - Portal is not active
    /// - Amount is zero or exceeds the staked balance
    /// - Portal Energy does not cover the released stake
    pub fn unstake(ctx: Context<Unstake>, amount: u64) -> Result<()> {
        instructions::unstake::handler(ctx, amount)
    }

    /// Unstakes everything, burning Portal Energy tokens for the shortfall.
    ///
    /// # Arguments
    /// * `ctx` - The context containing all accounts needed for unstaking
    ///
    /// # Errors
    /// Returns an error if:
    /// - Portal is not active
    /// - Nothing is staked
    /// - The caller holds too few Portal Energy tokens
    pub fn force_unstake_all(ctx: Context<ForceUnstakeAll>) -> Result<()> {
        instructions::unstake::force_handler(ctx)
    }

    /// Buys Portal Energy with settlement tokens.
    ///
    /// # Arguments
    /// * `ctx` - The context containing all accounts needed for the trade
    /// * `recipient` - Owner of the ledger account credited
    /// * `amount_in` - Settlement tokens paid
    /// * `min_out` - Minimum energy accepted
    /// * `deadline` - Unix timestamp after which the trade is rejected
    ///
    /// # Errors
    /// Returns an error if:
    /// - Portal is not active
    /// - Deadline has passed
    /// - Amount is zero or recipient is the default key
    /// - Output is below `min_out`
    pub fn buy_portal_energy(
        ctx: Context<BuyPortalEnergy>,
        recipient: Pubkey,
        amount_in: u64,
        min_out: u64,
        deadline: i64,
    ) -> Result<()> {
        instructions::exchange::buy_handler(ctx, recipient, amount_in, min_out, deadline)
    }

    /// Sells Portal Energy for settlement tokens.
    ///
    /// # Arguments
    /// * `ctx` - The context containing all accounts needed for the trade
    /// * `recipient` - Owner of the settlement token account paid
    /// * `amount_in` - Energy sold
    /// * `min_out` - Minimum settlement tokens accepted
    /// * `deadline` - Unix timestamp after which the trade is rejected
    ///
    /// # Errors
    /// Returns an error if:
    /// - Portal is not active
    /// - Deadline has passed
    /// - Caller's Portal Energy is short
    /// - Output is below `min_out`
    pub fn sell_portal_energy(
        ctx: Context<SellPortalEnergy>,
        recipient: Pubkey,
        amount_in: u64,
        min_out: u64,
        deadline: i64,
    ) -> Result<()> {
        instructions::exchange::sell_handler(ctx, recipient, amount_in, min_out, deadline)
    }

    /// Converts internal Portal Energy into Portal Energy tokens.
    ///
    /// # Errors
    /// Returns an error if the caller's Portal Energy is short.
    pub fn mint_portal_energy_token(
        ctx: Context<MintPortalEnergyToken>,
        recipient: Pubkey,
        amount: u64,
    ) -> Result<()> {
        instructions::energy_token::mint_handler(ctx, recipient, amount)
    }

    /// Burns Portal Energy tokens and credits the energy to `recipient`.
    ///
    /// # Errors
    /// Returns an error if the caller holds too few tokens.
    pub fn burn_portal_energy_token(
        ctx: Context<BurnPortalEnergyToken>,
        recipient: Pubkey,
        amount: u64,
    ) -> Result<()> {
        instructions::energy_token::burn_handler(ctx, recipient, amount)
    }

    /// Contributes settlement tokens during the funding phase and mints
    /// receipt tokens for them.
    ///
    /// # Arguments
    /// * `ctx` - The context containing funding accounts
    /// * `amount` - Settlement tokens contributed
    ///
    /// # Errors
    /// Returns an error if the portal is already active or amount is zero.
    pub fn contribute_funding(ctx: Context<FundingTransfer>, amount: u64) -> Result<()> {
        instructions::funding::contribute_handler(ctx, amount)
    }

    /// Burns receipt tokens for their contribution before activation.
    ///
    /// # Errors
    /// Returns an error if the portal is already active or the receipts
    /// are worth less than one settlement unit.
    pub fn withdraw_funding(ctx: Context<FundingTransfer>, receipt_amount: u64) -> Result<()> {
        instructions::funding::withdraw_handler(ctx, receipt_amount)
    }

    /// Ends the funding phase and seeds the internal exchange.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Portal is already active
    /// - Funding phase has not elapsed
    /// - Funding minimum was not reached
    pub fn activate_portal(ctx: Context<ActivatePortal>) -> Result<()> {
        instructions::funding::activate_handler(ctx)
    }

    /// Redeems receipt tokens against the funding reward pool.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Portal is not active
    /// - The reward pool cannot cover `amount`
    pub fn burn_receipt_tokens(ctx: Context<FundingTransfer>, amount: u64) -> Result<()> {
        instructions::funding::burn_receipts_handler(ctx, amount)
    }

    /// Sweeps the portal's balance of a foreign token for a fixed
    /// settlement payment.
    ///
    /// # Arguments
    /// * `ctx` - The context containing conversion accounts
    /// * `recipient` - Owner of the account receiving the swept token
    /// * `min_received` - Minimum balance accepted
    /// * `deadline` - Unix timestamp after which the conversion is rejected
    ///
    /// # Errors
    /// Returns an error if:
    /// - The token is the settlement or principal token
    /// - Deadline has passed
    /// - Balance is zero or below `min_received`
    pub fn convert(
        ctx: Context<Convert>,
        recipient: Pubkey,
        min_received: u64,
        deadline: i64,
    ) -> Result<()> {
        instructions::convert::handler(ctx, recipient, min_received, deadline)
    }

    /// Sends principal held beyond total stake to the profit recipient.
    ///
    /// # Errors
    /// Returns an error if there is no profit.
    pub fn collect_profit(ctx: Context<CollectProfit>) -> Result<()> {
        instructions::profit::handler(ctx)
    }

    /// Freezes the caller's account into a transferable position.
    ///
    /// # Errors
    /// Returns an error if the account holds no stake debt and no energy.
    pub fn tokenize_position(ctx: Context<TokenizePosition>) -> Result<()> {
        instructions::position::tokenize_handler(ctx)
    }

    /// Hands a position to a new owner.
    pub fn transfer_position(ctx: Context<TransferPosition>, new_owner: Pubkey) -> Result<()> {
        instructions::position::transfer_handler(ctx, new_owner)
    }

    /// Folds a position back into the owner's account.
    pub fn redeem_position(ctx: Context<RedeemPosition>) -> Result<()> {
        instructions::position::redeem_handler(ctx)
    }

    /// Grows the max lock duration to twice the portal's age.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The duration already reached its terminal value
    /// - The new value would not exceed the current one
    pub fn update_max_lock_duration(ctx: Context<UpdateMaxLockDuration>) -> Result<()> {
        instructions::lock_duration::handler(ctx)
    }

    /// Returns the energy `amount_in` settlement tokens would buy.
    pub fn quote_buy(ctx: Context<QuoteTrade>, amount_in: u64) -> Result<u64> {
        instructions::views::quote_buy_handler(ctx, amount_in)
    }

    /// Returns the settlement tokens `amount_in` energy would sell for.
    pub fn quote_sell(ctx: Context<QuoteTrade>, amount_in: u64) -> Result<u64> {
        instructions::views::quote_sell_handler(ctx, amount_in)
    }

    /// Returns `user`'s account as a stake or unstake of `amount` would
    /// leave it. Works before the user's first stake.
    pub fn simulate_account_update(
        ctx: Context<SimulateAccountUpdate>,
        user: Pubkey,
        amount: u64,
        is_deposit: bool,
    ) -> Result<AccountUpdate> {
        instructions::views::simulate_handler(ctx, user, amount, is_deposit)
    }

    /// Returns the receipts the funding reward pool can currently pay for.
    pub fn get_burnable_receipt_amount(ctx: Context<FundingView>) -> Result<u64> {
        instructions::views::burnable_receipts_handler(ctx)
    }

    /// Returns the settlement value of `receipts`.
    pub fn get_redemption_value(ctx: Context<FundingView>, receipts: u64) -> Result<u64> {
        instructions::views::redemption_value_handler(ctx, receipts)
    }

    /// Returns the principal currently collectable as profit.
    pub fn get_pending_profit(ctx: Context<GetPendingProfit>) -> Result<u64> {
        instructions::profit::pending_handler(ctx)
    }
}
