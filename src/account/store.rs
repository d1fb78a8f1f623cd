//! Committed accounts and their sequence counters

use std::collections::HashMap;

use super::types::Account;
use crate::common::Address;
use crate::error::{LedgerError, Result};

/// Account store for managing all accounts
#[derive(Clone, Debug, Default)]
pub struct AccountStore {
    accounts: HashMap<Address, Box<dyn Account>>,
    seqs: HashMap<Address, u64>,
}

impl AccountStore {
    /// Create a new empty account store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account; its address must be unused
    pub fn create_account(&mut self, account: Box<dyn Account>) -> Result<()> {
        let address = account.address();
        if self.accounts.contains_key(&address) {
            return Err(LedgerError::AccountAlreadyExists(address));
        }
        self.accounts.insert(address, account);
        Ok(())
    }

    /// Get account by address
    pub fn get(&self, address: &Address) -> Option<&dyn Account> {
        self.accounts.get(address).map(|acc| acc.as_ref())
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    /// Last committed sequence number; zero for an account that never sent
    pub fn seq(&self, address: &Address) -> u64 {
        self.seqs.get(address).copied().unwrap_or(0)
    }

    pub fn set_seq(&mut self, address: &Address, seq: u64) {
        self.seqs.insert(*address, seq);
    }

    /// Get all accounts
    pub fn all_accounts(&self) -> impl Iterator<Item = &dyn Account> {
        self.accounts.values().map(|acc| acc.as_ref())
    }

    pub fn seqs(&self) -> impl Iterator<Item = (&Address, &u64)> {
        self.seqs.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::single::{SingleAccount, SINGLE_ACCOUNT_TYPE};

    fn account(b: u8) -> Box<dyn Account> {
        let mut acc = SingleAccount::new(SINGLE_ACCOUNT_TYPE);
        acc.base.address = Address::new([b; 20]);
        Box::new(acc)
    }

    #[test]
    fn test_create_account() {
        let mut store = AccountStore::new();
        store.create_account(account(1)).unwrap();
        assert!(store.contains(&Address::new([1; 20])));
        assert!(matches!(
            store.create_account(account(1)),
            Err(LedgerError::AccountAlreadyExists(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_seq_defaults_to_zero() {
        let mut store = AccountStore::new();
        let addr = Address::new([2; 20]);
        assert_eq!(store.seq(&addr), 0);
        store.set_seq(&addr, 4);
        assert_eq!(store.seq(&addr), 4);
    }
}
