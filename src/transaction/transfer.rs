//! `compass.Transfer`: moves coins between two existing accounts.

use std::any::Any;
use std::io::{self, Write};

use super::{advance_seq, check_dust, ExecutionResult, Transaction, TxBase, TxType};
use crate::amount::Amount;
use crate::common::{Address, Coordinate, PublicHash};
use crate::context::Context;
use crate::encoding::{CanonicalDeserialize, CanonicalSerialize, Reader};
use crate::error::{Result, Violation};
use crate::loader::Loader;
use crate::registry::Transactor;

pub const TRANSFER: &str = "compass.Transfer";
pub const TRANSFER_TYPE: TxType = TxType(3);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub base: TxBase,
    pub to: Address,
    pub token_coord: Coordinate,
    pub amount: Amount,
}

impl Transfer {
    pub fn new(coord: Coordinate, tx_type: TxType) -> Self {
        Transfer {
            base: TxBase::new(coord, tx_type),
            to: Address::default(),
            token_coord: coord,
            amount: Amount::zero(),
        }
    }
}

impl Transaction for Transfer {
    fn base(&self) -> &TxBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TxBase {
        &mut self.base
    }

    fn encode_fields(&self, writer: &mut dyn Write) -> io::Result<()> {
        self.to.canonical_serialize(writer)?;
        self.token_coord.canonical_serialize(writer)?;
        self.amount.canonical_serialize(writer)
    }

    fn decode_fields(&mut self, reader: &mut Reader<'_>) -> Result<()> {
        self.to = Address::canonical_deserialize(reader)?;
        self.token_coord = Coordinate::canonical_deserialize(reader)?;
        self.amount = Amount::canonical_deserialize(reader)?;
        Ok(())
    }

    fn clone_tx(&self) -> Box<dyn Transaction> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn validate(loader: &dyn Loader, tx: &Transfer, signers: &[PublicHash]) -> Result<()> {
    tx.base.check_fresh(loader)?;
    check_dust(&tx.amount)?;
    if tx.to == tx.from() {
        return Err(Violation::SelfTransfer.into());
    }
    loader.account(&tx.to)?;

    let from_acc = loader.account(&tx.from())?;
    loader.accounter().validate(loader, from_acc.as_ref(), signers)
}

pub fn execute(ctx: &mut Context<'_>, fee: &Amount, tx: &Transfer, _coord: &Coordinate) -> Result<Option<ExecutionResult>> {
    ctx.atomic(|ctx| {
        advance_seq(ctx, &tx.base)?;

        let mut from_balance = ctx.account_balance(&tx.from())?;
        from_balance.sub_balance(&tx.token_coord, fee)?;
        from_balance.sub_balance(&tx.token_coord, &tx.amount)?;

        ctx.account_balance(&tx.to)?.add_balance(&tx.token_coord, &tx.amount)?;
        Ok(None)
    })
}

pub fn register(transactor: &mut Transactor) -> Result<()> {
    transactor.register(TRANSFER, TRANSFER_TYPE, Transfer::new, validate, execute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, LedgerError};
    use crate::testing::TestLedger;

    fn transfer(ledger: &TestLedger, to: Address, amount: &str) -> Transfer {
        let mut tx = Transfer::new(Coordinate::main(), TRANSFER_TYPE);
        tx.base.seq = 1;
        tx.base.from = ledger.alice_address();
        tx.to = to;
        tx.amount = amount.parse().unwrap();
        tx
    }

    #[test]
    fn test_transfer_moves_amount() {
        let ledger = TestLedger::new();
        let (alice, bob) = (ledger.alice_address(), ledger.bob_address());
        let tx = transfer(&ledger, bob, "2");
        validate(&ledger.state, &tx, &[ledger.alice.public_hash()]).unwrap();

        let mut ctx = Context::new(&ledger.state);
        let fee: Amount = "0.1".parse().unwrap();
        execute(&mut ctx, &fee, &tx, &Coordinate::main()).unwrap();
        assert_eq!(ctx.balance(&alice, &Coordinate::main()), "2.9".parse().unwrap());
        assert_eq!(ctx.balance(&bob, &Coordinate::main()), "3".parse().unwrap());
    }

    #[test]
    fn test_self_transfer_and_unknown_receiver() {
        let ledger = TestLedger::new();
        let tx = transfer(&ledger, ledger.alice_address(), "1");
        assert_eq!(
            validate(&ledger.state, &tx, &[ledger.alice.public_hash()]).unwrap_err().kind(),
            ErrorKind::StructuralViolation
        );

        let tx = transfer(&ledger, Address::new([0xEE; 20]), "1");
        assert!(matches!(
            validate(&ledger.state, &tx, &[ledger.alice.public_hash()]),
            Err(LedgerError::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_failed_transfer_leaves_no_credit() {
        let ledger = TestLedger::new();
        let bob = ledger.bob_address();
        let tx = transfer(&ledger, bob, "5");

        let mut ctx = Context::new(&ledger.state);
        let fee: Amount = "0.1".parse().unwrap();
        assert!(execute(&mut ctx, &fee, &tx, &Coordinate::main()).is_err());
        assert_eq!(ctx.balance(&bob, &Coordinate::main()), "1".parse().unwrap());
        assert!(ctx.into_diff().is_empty());
    }
}
