//! Committed ledger state: accounts, sequence counters and balances for one
//! chain coordinate.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::account::{Account, AccountStore, BalanceStore};
use crate::amount::Amount;
use crate::common::{Address, Coordinate};
use crate::context::StateDiff;
use crate::error::{LedgerError, Result};
use crate::loader::Loader;
use crate::registry::{Accounter, Registry};

pub struct LedgerState {
    chain_coord: Coordinate,
    registry: Arc<Registry>,
    pub accounts: AccountStore,
    pub balances: BalanceStore,
}

/// On-disk form. Accounts keep their canonical encoding so that loading
/// goes through the registry like any other decode.
#[derive(Serialize, Deserialize)]
struct StateFile {
    chain_coord: Coordinate,
    accounts: Vec<Vec<u8>>,
    seqs: Vec<(Address, u64)>,
    balances: Vec<(Address, Coordinate, Amount)>,
}

impl LedgerState {
    pub fn new(chain_coord: Coordinate, registry: Arc<Registry>) -> Self {
        LedgerState {
            chain_coord,
            registry,
            accounts: AccountStore::new(),
            balances: BalanceStore::new(),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn create_account(&mut self, account: Box<dyn Account>) -> Result<()> {
        self.accounts.create_account(account)
    }

    /// Writes a batch's net changes into the committed stores.
    pub fn apply(&mut self, diff: StateDiff) {
        debug!(
            seqs = diff.seqs.len(),
            balances = diff.balances.len(),
            "applying state diff"
        );
        for (address, seq) in diff.seqs {
            self.accounts.set_seq(&address, seq);
        }
        for (address, coord, amount) in diff.balances {
            self.balances.set_balance(&address, &coord, amount);
        }
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut accounts: Vec<_> = self.accounts.all_accounts().map(|acc| acc.encode()).collect();
        accounts.sort();
        let mut seqs: Vec<_> = self.accounts.seqs().map(|(addr, seq)| (*addr, *seq)).collect();
        seqs.sort();
        let mut balances: Vec<_> = self
            .balances
            .iter()
            .map(|((addr, coord), amount)| (*addr, *coord, amount.clone()))
            .collect();
        balances.sort();

        let file = StateFile {
            chain_coord: self.chain_coord,
            accounts,
            seqs,
            balances,
        };
        let bytes = bincode::serialize(&file)?;
        fs::write(path.as_ref(), bytes)?;
        info!(path = %path.as_ref().display(), accounts = self.accounts.len(), "state saved");
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>, registry: Arc<Registry>) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        let file: StateFile = bincode::deserialize(&bytes)?;

        let mut state = LedgerState::new(file.chain_coord, registry);
        for encoded in &file.accounts {
            let (account, used) = state.registry.accounts.decode(encoded)?;
            if used != encoded.len() {
                return Err(LedgerError::malformed(used, "trailing bytes after account"));
            }
            state.accounts.create_account(account)?;
        }
        for (address, seq) in file.seqs {
            state.accounts.set_seq(&address, seq);
        }
        for (address, coord, amount) in file.balances {
            state.balances.set_balance(&address, &coord, amount);
        }
        info!(path = %path.as_ref().display(), accounts = state.accounts.len(), "state loaded");
        Ok(state)
    }
}

impl Loader for LedgerState {
    fn chain_coord(&self) -> Coordinate {
        self.chain_coord
    }

    fn seq(&self, address: &Address) -> u64 {
        self.accounts.seq(address)
    }

    fn account(&self, address: &Address) -> Result<Box<dyn Account>> {
        self.accounts
            .get(address)
            .map(|acc| acc.clone_account())
            .ok_or(LedgerError::AccountNotFound(*address))
    }

    fn balance(&self, address: &Address, coord: &Coordinate) -> Amount {
        self.balances.get_balance(address, coord)
    }

    fn accounter(&self) -> &Accounter {
        &self.registry.accounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::SingleAccount;
    use crate::testing::TestLedger;

    #[test]
    fn test_loader_returns_independent_copies() {
        let ledger = TestLedger::new();
        let alice = ledger.alice_address();
        let copy = ledger.state.account(&alice).unwrap();
        assert_eq!(copy.address(), alice);
        assert!(matches!(
            ledger.state.account(&Address::new([0xEE; 20])),
            Err(LedgerError::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_apply_diff() {
        let mut ledger = TestLedger::new();
        let alice = ledger.alice_address();
        let main = Coordinate::main();
        ledger.state.apply(StateDiff {
            seqs: vec![(alice, 3)],
            balances: vec![(alice, main, "4.5".parse().unwrap())],
        });
        assert_eq!(ledger.state.seq(&alice), 3);
        assert_eq!(ledger.state.balance(&alice, &main), "4.5".parse().unwrap());
    }

    #[test]
    fn test_save_and_load() {
        let ledger = TestLedger::new();
        let path = std::env::temp_dir().join(format!("compass-state-{}.bin", std::process::id()));
        ledger.state.save_to_file(&path).unwrap();

        let loaded = LedgerState::load_from_file(&path, ledger.state.registry().clone()).unwrap();
        let _ = fs::remove_file(&path);

        let alice = ledger.alice_address();
        assert_eq!(loaded.chain_coord(), ledger.state.chain_coord());
        assert_eq!(loaded.accounts.len(), 2);
        assert_eq!(
            loaded.balance(&alice, &Coordinate::main()),
            ledger.state.balance(&alice, &Coordinate::main())
        );
        let acc = loaded.account(&alice).unwrap();
        let single = acc.as_any().downcast_ref::<SingleAccount>().unwrap();
        assert_eq!(single.key_hash, ledger.alice.public_hash());
    }
}
