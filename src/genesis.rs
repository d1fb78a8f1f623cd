use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::account::multisig::{MultiSigAccount, MULTISIG_ACCOUNT};
use crate::account::single::{SingleAccount, SINGLE_ACCOUNT};
use crate::account::Account;
use crate::amount::Amount;
use crate::common::{Address, Coordinate, PublicHash};
use crate::error::{LedgerError, Result};
use crate::registry::Registry;
use crate::state::LedgerState;

/// Initial accounts and balances of a ledger.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GenesisConfig {
    pub accounts: Vec<GenesisAccount>,
    #[serde(default)]
    pub balances: Vec<GenesisBalance>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind")]
pub enum GenesisAccount {
    #[serde(rename = "compass.SingleAccount")]
    Single { address: Address, key_hash: PublicHash },
    #[serde(rename = "compass.MultiSigAccount")]
    MultiSig {
        address: Address,
        required: u8,
        key_hashes: Vec<PublicHash>,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GenesisBalance {
    pub address: Address,
    #[serde(default)]
    pub coord: Coordinate,
    pub amount: Amount,
}

impl GenesisAccount {
    fn build(&self, registry: &Registry) -> Result<Box<dyn Account>> {
        match self {
            GenesisAccount::Single { address, key_hash } => {
                let mut acc = SingleAccount::new(registry.accounts.type_by_name(SINGLE_ACCOUNT)?);
                acc.base.address = *address;
                acc.key_hash = *key_hash;
                Ok(Box::new(acc))
            }
            GenesisAccount::MultiSig {
                address,
                required,
                key_hashes,
            } => {
                let mut acc = MultiSigAccount::new(registry.accounts.type_by_name(MULTISIG_ACCOUNT)?);
                acc.base.address = *address;
                acc.required = *required;
                acc.key_hashes = key_hashes.clone();
                Ok(Box::new(acc))
            }
        }
    }
}

impl GenesisConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LedgerError::Config(format!(
                "Genesis file not found: {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Committed state holding exactly the genesis accounts and balances.
    ///
    /// Balances may only be assigned to listed accounts, once per coordinate.
    pub fn build(&self, chain_coord: Coordinate, registry: Arc<Registry>) -> Result<LedgerState> {
        let mut state = LedgerState::new(chain_coord, registry);
        for entry in &self.accounts {
            let account = entry.build(state.registry())?;
            state.create_account(account)?;
        }
        for b in &self.balances {
            if !state.accounts.contains(&b.address) {
                return Err(LedgerError::AccountNotFound(b.address));
            }
            if !state.balances.get_balance(&b.address, &b.coord).is_zero() {
                return Err(LedgerError::Config(format!(
                    "duplicate genesis balance for {} at {}",
                    b.address, b.coord
                )));
            }
            state.balances.credit(&b.address, &b.coord, &b.amount)?;
        }
        info!(
            accounts = self.accounts.len(),
            balances = self.balances.len(),
            "genesis state built"
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Loader;

    const GENESIS: &str = r#"{
        "accounts": [
            { "kind": "compass.SingleAccount",
              "address": "0101010101010101010101010101010101010101",
              "key_hash": "0202020202020202020202020202020202020202020202020202020202020202" },
            { "kind": "compass.MultiSigAccount",
              "address": "0303030303030303030303030303030303030303",
              "required": 1,
              "key_hashes": ["0202020202020202020202020202020202020202020202020202020202020202"] }
        ],
        "balances": [
            { "address": "0101010101010101010101010101010101010101", "amount": "5.0" },
            { "address": "0303030303030303030303030303030303030303",
              "coord": { "height": 2, "index": 0 }, "amount": "0.25" }
        ]
    }"#;

    fn registry() -> Arc<Registry> {
        Arc::new(Registry::standard().unwrap())
    }

    #[test]
    fn test_build_from_json() {
        let genesis: GenesisConfig = serde_json::from_str(GENESIS).unwrap();
        let state = genesis.build(Coordinate::main(), registry()).unwrap();

        let single = Address::new([1; 20]);
        let multi = Address::new([3; 20]);
        assert_eq!(state.accounts.len(), 2);
        assert_eq!(state.balance(&single, &Coordinate::main()), "5".parse().unwrap());
        assert_eq!(state.balance(&multi, &Coordinate::new(2, 0)), "0.25".parse().unwrap());
        let acc = state.account(&multi).unwrap();
        assert!(acc.as_any().downcast_ref::<MultiSigAccount>().is_some());
    }

    #[test]
    fn test_balance_for_unknown_account_is_rejected() {
        let mut genesis: GenesisConfig = serde_json::from_str(GENESIS).unwrap();
        genesis.accounts.remove(0);
        assert!(matches!(
            genesis.build(Coordinate::main(), registry()),
            Err(LedgerError::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_balance_is_rejected() {
        let mut genesis: GenesisConfig = serde_json::from_str(GENESIS).unwrap();
        let first = genesis.balances[0].clone();
        genesis.balances.push(first);
        assert!(matches!(
            genesis.build(Coordinate::main(), registry()),
            Err(LedgerError::Config(_))
        ));
    }
}
