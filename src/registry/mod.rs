//! Type registries for account and transaction kinds.
//!
//! Built once during bootstrap and shared behind an `Arc`; there is no
//! process-global table.

pub mod accounter;
pub mod transactor;

pub use accounter::Accounter;
pub use transactor::Transactor;

use crate::account::{multisig, single};
use crate::error::Result;
use crate::transaction::{burn, token_issue, transfer};

#[derive(Default)]
pub struct Registry {
    pub accounts: Accounter,
    pub transactions: Transactor,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every kind this crate ships.
    pub fn standard() -> Result<Self> {
        let mut registry = Registry::new();
        single::register(&mut registry.accounts)?;
        multisig::register(&mut registry.accounts)?;
        burn::register(&mut registry.transactions)?;
        token_issue::register(&mut registry.transactions)?;
        transfer::register(&mut registry.transactions)?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry() {
        let registry = Registry::standard().unwrap();
        assert_eq!(registry.accounts.len(), 2);
        assert_eq!(registry.transactions.len(), 3);
        assert_eq!(
            registry.transactions.name_of(burn::BURN_TYPE).unwrap(),
            burn::BURN
        );
    }
}
