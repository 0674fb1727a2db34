//! Events emitted on every ledger, exchange and funding state change.

use anchor_lang::prelude::*;

#[event]
pub struct PortalInitialized {
    pub portal: Pubkey,
    pub principal_mint: Pubkey,
    pub settlement_mint: Pubkey,
    pub created_at: i64,
}

#[event]
pub struct PortalActivated {
    pub funding_balance: u64,
    pub constant_product: u128,
    pub funding_max_rewards: u64,
    pub activated_at: i64,
}

#[event]
pub struct Staked {
    pub user: Pubkey,
    pub amount: u64,
    pub staked_balance: u64,
    pub max_stake_debt: u64,
    pub portal_energy: u64,
}

#[event]
pub struct Unstaked {
    pub user: Pubkey,
    pub amount: u64,
    pub received: u64,
    pub energy_tokens_burned: u64,
    pub staked_balance: u64,
    pub portal_energy: u64,
}

#[event]
pub struct PortalEnergyBought {
    pub caller: Pubkey,
    pub recipient: Pubkey,
    pub amount_in: u64,
    pub amount_out: u64,
}

#[event]
pub struct PortalEnergySold {
    pub caller: Pubkey,
    pub recipient: Pubkey,
    pub amount_in: u64,
    pub amount_out: u64,
}

#[event]
pub struct EnergyTokenMinted {
    pub caller: Pubkey,
    pub recipient: Pubkey,
    pub amount: u64,
}

#[event]
pub struct EnergyTokenBurned {
    pub caller: Pubkey,
    pub recipient: Pubkey,
    pub amount: u64,
}

#[event]
pub struct FundingContributed {
    pub funder: Pubkey,
    pub amount: u64,
    pub receipts_minted: u64,
}

#[event]
pub struct FundingWithdrawn {
    pub funder: Pubkey,
    pub receipts_burned: u64,
    pub amount: u64,
}

#[event]
pub struct ReceiptsRedeemed {
    pub holder: Pubkey,
    pub receipts_burned: u64,
    pub value: u64,
    pub funding_reward_pool: u64,
}

#[event]
pub struct Converted {
    pub caller: Pubkey,
    pub token: Pubkey,
    pub recipient: Pubkey,
    pub amount_swept: u64,
    pub reward_added: u64,
}

#[event]
pub struct ProfitCollected {
    pub recipient: Pubkey,
    pub amount: u64,
}

#[event]
pub struct PositionTokenized {
    pub owner: Pubkey,
    pub position_id: u64,
    pub staked_balance: u64,
    pub portal_energy: u64,
}

#[event]
pub struct PositionTransferred {
    pub position_id: u64,
    pub from: Pubkey,
    pub to: Pubkey,
}

#[event]
pub struct PositionRedeemed {
    pub owner: Pubkey,
    pub position_id: u64,
    pub staked_balance: u64,
    pub portal_energy: u64,
}

#[event]
pub struct MaxLockDurationUpdated {
    pub max_lock_duration: i64,
    pub updatable: bool,
}
