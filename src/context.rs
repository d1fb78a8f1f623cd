//! Staged, revertible view of the ledger used while executing transactions.
//!
//! Every mutation is appended to a journal together with the value it
//! replaced. A [`Snapshot`] is a cursor into that journal: reverting pops
//! entries back to the cursor and restores the replaced values, committing
//! just closes the snapshot. The committed store is untouched until the
//! batch's [`StateDiff`] is applied.

use std::collections::HashMap;

use crate::amount::Amount;
use crate::common::{Address, Coordinate};
use crate::error::{LedgerError, Result};
use crate::loader::Loader;

type BalanceKey = (Address, Coordinate);

#[derive(Debug)]
enum Change {
    Seq { address: Address, prev: Option<u64> },
    Balance { key: BalanceKey, prev: Option<Amount> },
}

/// Cursor into the context's mutation journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    id: u64,
    cursor: usize,
}

/// Net effect of a batch, ready to be applied to committed state.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StateDiff {
    pub seqs: Vec<(Address, u64)>,
    pub balances: Vec<(Address, Coordinate, Amount)>,
}

impl StateDiff {
    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty() && self.balances.is_empty()
    }
}

pub struct Context<'a> {
    loader: &'a dyn Loader,
    seqs: HashMap<Address, u64>,
    balances: HashMap<BalanceKey, Amount>,
    journal: Vec<Change>,
    open: Vec<Snapshot>,
    next_id: u64,
}

impl<'a> Context<'a> {
    pub fn new(loader: &'a dyn Loader) -> Self {
        Context {
            loader,
            seqs: HashMap::new(),
            balances: HashMap::new(),
            journal: Vec::new(),
            open: Vec::new(),
            next_id: 0,
        }
    }

    pub fn chain_coord(&self) -> Coordinate {
        self.loader.chain_coord()
    }

    /// Staged sequence number, falling back to committed state.
    pub fn seq(&self, address: &Address) -> u64 {
        match self.seqs.get(address) {
            Some(seq) => *seq,
            None => self.loader.seq(address),
        }
    }

    /// Advances the staged sequence number; fails once it is exhausted.
    pub fn add_seq(&mut self, address: &Address) -> Result<()> {
        let prev = self.seqs.get(address).copied();
        let current = prev.unwrap_or_else(|| self.loader.seq(address));
        let next = current
            .checked_add(1)
            .ok_or(LedgerError::InvalidSequence { got: current, current })?;
        self.journal.push(Change::Seq { address: *address, prev });
        self.seqs.insert(*address, next);
        Ok(())
    }

    /// Balance handle for an existing account.
    pub fn account_balance(&mut self, address: &Address) -> Result<BalanceView<'_, 'a>> {
        self.loader.account(address)?;
        Ok(BalanceView {
            ctx: self,
            address: *address,
        })
    }

    pub fn balance(&self, address: &Address, coord: &Coordinate) -> Amount {
        match self.balances.get(&(*address, *coord)) {
            Some(amount) => amount.clone(),
            None => self.loader.balance(address, coord),
        }
    }

    fn set_balance(&mut self, key: BalanceKey, amount: Amount) {
        let prev = self.balances.insert(key, amount);
        self.journal.push(Change::Balance { key, prev });
    }

    pub fn snapshot(&mut self) -> Snapshot {
        let sn = Snapshot {
            id: self.next_id,
            cursor: self.journal.len(),
        };
        self.next_id += 1;
        self.open.push(sn);
        sn
    }

    /// Discards every mutation made since `sn`. Closed snapshots are ignored.
    pub fn revert(&mut self, sn: Snapshot) {
        let Some(pos) = self.open.iter().position(|s| *s == sn) else {
            return;
        };
        self.open.truncate(pos);
        while self.journal.len() > sn.cursor {
            match self.journal.pop() {
                Some(Change::Seq { address, prev }) => match prev {
                    Some(v) => {
                        self.seqs.insert(address, v);
                    }
                    None => {
                        self.seqs.remove(&address);
                    }
                },
                Some(Change::Balance { key, prev }) => match prev {
                    Some(v) => {
                        self.balances.insert(key, v);
                    }
                    None => {
                        self.balances.remove(&key);
                    }
                },
                None => break,
            }
        }
    }

    /// Keeps the mutations made since `sn` and closes it along with any
    /// snapshot opened after it.
    pub fn commit(&mut self, sn: Snapshot) {
        if let Some(pos) = self.open.iter().position(|s| *s == sn) {
            self.open.truncate(pos);
        }
    }

    /// Runs `f` inside a snapshot: commit on `Ok`, revert on `Err`.
    pub fn atomic<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let sn = self.snapshot();
        match f(self) {
            Ok(value) => {
                self.commit(sn);
                Ok(value)
            }
            Err(e) => {
                self.revert(sn);
                Err(e)
            }
        }
    }

    pub fn journal_len(&self) -> usize {
        self.journal.len()
    }

    /// Staged values that differ from the committed state.
    pub fn into_diff(self) -> StateDiff {
        let loader = self.loader;
        let mut seqs: Vec<_> = self
            .seqs
            .into_iter()
            .filter(|(addr, seq)| loader.seq(addr) != *seq)
            .collect();
        seqs.sort();
        let mut balances: Vec<_> = self
            .balances
            .into_iter()
            .filter(|((addr, coord), amount)| loader.balance(addr, coord) != *amount)
            .map(|((addr, coord), amount)| (addr, coord, amount))
            .collect();
        balances.sort();
        StateDiff { seqs, balances }
    }
}

/// Staged balances of one account.
pub struct BalanceView<'c, 'a> {
    ctx: &'c mut Context<'a>,
    address: Address,
}

impl BalanceView<'_, '_> {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn balance(&self, coord: &Coordinate) -> Amount {
        self.ctx.balance(&self.address, coord)
    }

    /// Fails without effect if the balance would go negative.
    pub fn sub_balance(&mut self, coord: &Coordinate, amount: &Amount) -> Result<()> {
        let current = self.balance(coord);
        let next = current
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientBalance {
                available: current.clone(),
                required: amount.clone(),
            })?;
        self.ctx.set_balance((self.address, *coord), next);
        Ok(())
    }

    pub fn add_balance(&mut self, coord: &Coordinate, amount: &Amount) -> Result<()> {
        let next = self.balance(coord).checked_add(amount)?;
        self.ctx.set_balance((self.address, *coord), next);
        Ok(())
    }
}
