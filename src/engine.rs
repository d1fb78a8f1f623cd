//! Batch driver: validates signed transactions against committed state,
//! executes them in order against one [`Context`] and applies the net diff.

use std::sync::Arc;
use std::thread;

use tracing::{debug, info, warn};

use crate::amount::Amount;
use crate::common::{Address, Hash256, PublicHash};
use crate::context::Context;
use crate::envelope::SignedTransaction;
use crate::error::Result;
use crate::loader::Loader;
use crate::registry::Registry;
use crate::state::LedgerState;
use crate::transaction::{ExecutionResult, Transaction};

/// Outcome of one transaction in a batch.
#[derive(Debug)]
pub struct Receipt {
    pub tx_hash: Hash256,
    pub from: Address,
    pub seq: u64,
    pub outcome: Result<Option<ExecutionResult>>,
}

impl Receipt {
    pub fn is_committed(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub struct Engine {
    registry: Arc<Registry>,
}

impl Engine {
    pub fn new(registry: Arc<Registry>) -> Self {
        Engine { registry }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Checks signatures, then the kind's read-only rules. Returns the
    /// recovered signer set.
    pub fn validate(&self, loader: &dyn Loader, signed: &SignedTransaction) -> Result<Vec<PublicHash>> {
        let signers = signed.signers()?;
        self.registry
            .transactions
            .validate(loader, signed.tx.as_ref(), &signers)?;
        Ok(signers)
    }

    pub fn execute(
        &self,
        ctx: &mut Context<'_>,
        fee: &Amount,
        tx: &dyn Transaction,
    ) -> Result<Option<ExecutionResult>> {
        let coord = ctx.chain_coord();
        self.registry.transactions.execute(ctx, fee, tx, &coord)
    }

    /// Validates every transaction against the same committed view, spread
    /// over scoped worker threads. Results keep the input order.
    pub fn validate_batch<L>(&self, loader: &L, txs: &[SignedTransaction]) -> Vec<Result<Vec<PublicHash>>>
    where
        L: Loader + Sync,
    {
        if txs.is_empty() {
            return Vec::new();
        }
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(txs.len());
        let chunk = txs.len().div_ceil(workers);
        debug!(txs = txs.len(), workers, "validating batch");

        thread::scope(|s| {
            let handles: Vec<_> = txs
                .chunks(chunk)
                .map(|part| {
                    s.spawn(move || {
                        part.iter()
                            .map(|signed| self.validate(loader, signed))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|h| match h.join() {
                    Ok(results) => results,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }

    /// Runs a batch in order and commits its net effect to `state`.
    ///
    /// A transaction that fails validation or execution leaves no trace;
    /// later transactions in the batch still run.
    pub fn apply_batch(&self, state: &mut LedgerState, txs: &[SignedTransaction], fee: &Amount) -> Vec<Receipt> {
        let validated = self.validate_batch(&*state, txs);

        let mut ctx = Context::new(&*state);
        let mut receipts = Vec::with_capacity(txs.len());
        for (signed, validation) in txs.iter().zip(validated) {
            let tx = signed.tx.as_ref();
            let outcome = validation.and_then(|_| self.execute(&mut ctx, fee, tx));
            match &outcome {
                Ok(_) => debug!(hash = %tx.hash(), from = %tx.from(), seq = tx.seq(), "transaction committed"),
                Err(e) => warn!(hash = %tx.hash(), from = %tx.from(), seq = tx.seq(), error = %e, "transaction rejected"),
            }
            receipts.push(Receipt {
                tx_hash: tx.hash(),
                from: tx.from(),
                seq: tx.seq(),
                outcome,
            });
        }

        let diff = ctx.into_diff();
        let committed = receipts.iter().filter(|r| r.is_committed()).count();
        info!(
            committed,
            rejected = receipts.len() - committed,
            changes = diff.seqs.len() + diff.balances.len(),
            "batch applied"
        );
        state.apply(diff);
        receipts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Coordinate;
    use crate::error::ErrorKind;
    use crate::testing::TestLedger;
    use crate::transaction::burn::{Burn, BURN_TYPE};

    fn burn(ledger: &TestLedger, seq: u64, amount: &str) -> SignedTransaction {
        let mut tx = Burn::new(Coordinate::main(), BURN_TYPE);
        tx.base.seq = seq;
        tx.base.from = ledger.alice_address();
        tx.amount = amount.parse().unwrap();
        SignedTransaction::new(Box::new(tx)).signed_by(&ledger.alice)
    }

    #[test]
    fn test_batch_commits_in_order() {
        let mut ledger = TestLedger::new();
        let engine = Engine::new(ledger.state.registry().clone());
        let txs = vec![burn(&ledger, 1, "1"), burn(&ledger, 2, "1")];
        let fee: Amount = "0.1".parse().unwrap();

        let receipts = engine.apply_batch(&mut ledger.state, &txs, &fee);
        assert!(receipts.iter().all(Receipt::is_committed));

        let alice = ledger.alice_address();
        assert_eq!(ledger.state.seq(&alice), 2);
        assert_eq!(ledger.state.balance(&alice, &Coordinate::main()), "2.8".parse().unwrap());
    }

    #[test]
    fn test_rejected_transaction_leaves_no_trace() {
        let mut ledger = TestLedger::new();
        let engine = Engine::new(ledger.state.registry().clone());
        let txs = vec![burn(&ledger, 1, "1"), burn(&ledger, 1, "1"), burn(&ledger, 2, "9")];
        let fee: Amount = "0.1".parse().unwrap();

        let receipts = engine.apply_batch(&mut ledger.state, &txs, &fee);
        assert!(receipts[0].is_committed());
        assert_eq!(receipts[1].outcome.as_ref().unwrap_err().kind(), ErrorKind::InvalidSequence);
        assert_eq!(receipts[2].outcome.as_ref().unwrap_err().kind(), ErrorKind::InsufficientBalance);

        let alice = ledger.alice_address();
        assert_eq!(ledger.state.seq(&alice), 1);
        assert_eq!(ledger.state.balance(&alice, &Coordinate::main()), "3.9".parse().unwrap());
    }

    #[test]
    fn test_unsigned_transaction_fails_validation() {
        let ledger = TestLedger::new();
        let engine = Engine::new(ledger.state.registry().clone());
        let mut signed = burn(&ledger, 1, "1");
        signed.signatures.clear();

        let results = engine.validate_batch(&ledger.state, &[signed]);
        assert_eq!(results[0].as_ref().unwrap_err().kind(), ErrorKind::InvalidSigner);
    }

    #[test]
    fn test_parallel_validation_keeps_order() {
        let ledger = TestLedger::new();
        let engine = Engine::new(ledger.state.registry().clone());
        let txs: Vec<_> = (0..64)
            .map(|i| burn(&ledger, i, if i % 3 == 0 { "0.01" } else { "1" }))
            .collect();

        let results = engine.validate_batch(&ledger.state, &txs);
        assert_eq!(results.len(), txs.len());
        for (i, r) in results.iter().enumerate() {
            match i {
                0 => assert_eq!(r.as_ref().unwrap_err().kind(), ErrorKind::InvalidSequence),
                _ if i % 3 == 0 => assert_eq!(r.as_ref().unwrap_err().kind(), ErrorKind::StructuralViolation),
                _ => assert!(r.is_ok()),
            }
        }
    }

    #[test]
    fn test_empty_batch() {
        let mut ledger = TestLedger::new();
        let engine = Engine::new(ledger.state.registry().clone());
        assert!(engine.apply_batch(&mut ledger.state, &[], &Amount::zero()).is_empty());
    }
}
