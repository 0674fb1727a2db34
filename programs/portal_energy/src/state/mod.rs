//! State structures for the Portal Energy program.
//!
//! This module defines all account structures used to store program state.

pub mod portal;
pub mod position;
pub mod user_account;

pub use portal::*;
pub use position::*;
pub use user_account::*;
