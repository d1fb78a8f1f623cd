//! `compass.Burn`: removes coins from circulation.

use std::any::Any;
use std::io::{self, Write};

use super::{advance_seq, check_dust, ExecutionResult, Transaction, TxBase, TxType};
use crate::amount::Amount;
use crate::common::{Coordinate, PublicHash};
use crate::context::Context;
use crate::encoding::{CanonicalDeserialize, CanonicalSerialize, Reader};
use crate::error::Result;
use crate::loader::Loader;
use crate::registry::Transactor;

pub const BURN: &str = "compass.Burn";
pub const BURN_TYPE: TxType = TxType(1);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Burn {
    pub base: TxBase,
    pub token_coord: Coordinate,
    pub amount: Amount,
}

impl Burn {
    pub fn new(coord: Coordinate, tx_type: TxType) -> Self {
        Burn {
            base: TxBase::new(coord, tx_type),
            token_coord: coord,
            amount: Amount::zero(),
        }
    }
}

impl Transaction for Burn {
    fn base(&self) -> &TxBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TxBase {
        &mut self.base
    }

    fn encode_fields(&self, writer: &mut dyn Write) -> io::Result<()> {
        self.token_coord.canonical_serialize(writer)?;
        self.amount.canonical_serialize(writer)
    }

    fn decode_fields(&mut self, reader: &mut Reader<'_>) -> Result<()> {
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

pub fn validate(loader: &dyn Loader, tx: &Burn, signers: &[PublicHash]) -> Result<()> {
    tx.base.check_fresh(loader)?;
    check_dust(&tx.amount)?;

    let from_acc = loader.account(&tx.from())?;
    loader.accounter().validate(loader, from_acc.as_ref(), signers)
}

pub fn execute(ctx: &mut Context<'_>, fee: &Amount, tx: &Burn, _coord: &Coordinate) -> Result<Option<ExecutionResult>> {
    ctx.atomic(|ctx| {
        advance_seq(ctx, &tx.base)?;

        let mut from_balance = ctx.account_balance(&tx.from())?;
        from_balance.sub_balance(&tx.token_coord, fee)?;
        from_balance.sub_balance(&tx.token_coord, &tx.amount)?;
        Ok(None)
    })
}

pub fn register(transactor: &mut Transactor) -> Result<()> {
    transactor.register(BURN, BURN_TYPE, Burn::new, validate, execute)
}
