//! Committed balances per account and coordinate

use std::collections::HashMap;

use crate::amount::Amount;
use crate::common::{Address, Coordinate};
use crate::error::Result;

/// Balance store for all accounts across all coordinates
#[derive(Clone, Debug, Default)]
pub struct BalanceStore {
    /// Map of (Address, Coordinate) -> Balance
    balances: HashMap<(Address, Coordinate), Amount>,
}

impl BalanceStore {
    /// Create a new empty balance store
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Get balance for an account in a coordinate
    pub fn get_balance(&self, account: &Address, coord: &Coordinate) -> Amount {
        self.balances
            .get(&(*account, *coord))
            .cloned()
            .unwrap_or_default()
    }

    /// Credit (add) balance to an account
    pub fn credit(&mut self, account: &Address, coord: &Coordinate, amount: &Amount) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let new_balance = self.get_balance(account, coord).checked_add(amount)?;
        self.balances.insert((*account, *coord), new_balance);
        Ok(())
    }

    /// Set balance directly (for genesis and committed diffs)
    pub fn set_balance(&mut self, account: &Address, coord: &Coordinate, amount: Amount) {
        let key = (*account, *coord);
        if amount.is_zero() {
            self.balances.remove(&key);
        } else {
            self.balances.insert(key, amount);
        }
    }

    /// Get total supply held in a coordinate
    pub fn total_supply(&self, coord: &Coordinate) -> Result<Amount> {
        self.balances
            .iter()
            .filter(|((_, c), _)| c == coord)
            .try_fold(Amount::zero(), |acc, (_, balance)| acc.checked_add(balance))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(Address, Coordinate), &Amount)> {
        self.balances.iter()
    }
}
