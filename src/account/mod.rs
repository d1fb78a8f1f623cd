//! Account Model
//!
//! Polymorphic account kinds, each paired with a signer-verification policy:
//! - `SingleAccount`: one key hash, exactly one matching signer
//! - `MultiSigAccount`: threshold of distinct member keys
//! - committed account/sequence and balance stores

pub mod balance;
pub mod multisig;
pub mod single;
pub mod store;
pub mod types;

pub use balance::BalanceStore;
pub use multisig::MultiSigAccount;
pub use single::SingleAccount;
pub use store::AccountStore;
pub use types::{Account, AccountBase, AccountType};
