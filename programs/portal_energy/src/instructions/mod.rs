//! Instruction handlers for the Portal Energy program.
//!
//! This module contains all instruction implementations.

pub mod convert;
pub mod energy_token;
pub mod exchange;
pub mod funding;
pub mod initialize;
pub mod lock_duration;
pub mod position;
pub mod profit;
pub mod stake;
pub mod unstake;
pub mod views;

pub use convert::*;
pub use energy_token::*;
pub use exchange::*;
pub use funding::*;
pub use initialize::*;
pub use lock_duration::*;
pub use position::*;
pub use profit::*;
pub use stake::*;
pub use unstake::*;
pub use views::*;
