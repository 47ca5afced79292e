pub mod commands;
pub mod error;
pub mod hash;
pub mod hex_bytes;
pub mod ledger;
pub mod public_key;
pub mod signature;
pub mod snapshot;
pub mod transaction;
pub mod utxo;
pub mod utxo_pool;
pub mod validation;

pub use self::{
    error::*, hash::*, ledger::*, public_key::*, signature::*, transaction::*, utxo::*,
    utxo_pool::*, validation::*,
};
