//! `compass.TokenIssue`: pays for issuing a token on the main chain.

use std::any::Any;
use std::io::{self, Write};

use super::{advance_seq, ExecutionResult, Transaction, TxBase, TxType};
use crate::amount::Amount;
use crate::common::{Address, Coordinate, PublicHash};
use crate::context::Context;
use crate::encoding::{CanonicalDeserialize, CanonicalSerialize, Reader};
use crate::error::{Result, Violation};
use crate::loader::Loader;
use crate::registry::Transactor;

pub const TOKEN_ISSUE: &str = "compass.TokenIssue";
pub const TOKEN_ISSUE_TYPE: TxType = TxType(2);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenIssue {
    pub base: TxBase,
    pub token_address: Address,
    pub height: u32,
    pub amount: Amount,
    pub tag: Vec<u8>,
}

impl TokenIssue {
    pub fn new(coord: Coordinate, tx_type: TxType) -> Self {
        TokenIssue {
            base: TxBase::new(coord, tx_type),
            token_address: Address::default(),
            height: 0,
            amount: Amount::zero(),
            tag: Vec::new(),
        }
    }
}

impl Transaction for TokenIssue {
    fn base(&self) -> &TxBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TxBase {
        &mut self.base
    }

    fn encode_fields(&self, writer: &mut dyn Write) -> io::Result<()> {
        self.token_address.canonical_serialize(writer)?;
        self.height.canonical_serialize(writer)?;
        self.amount.canonical_serialize(writer)?;
        self.tag.canonical_serialize(writer)
    }

    fn decode_fields(&mut self, reader: &mut Reader<'_>) -> Result<()> {
        self.token_address = Address::canonical_deserialize(reader)?;
        self.height = u32::canonical_deserialize(reader)?;
        self.amount = Amount::canonical_deserialize(reader)?;
        self.tag = Vec::<u8>::canonical_deserialize(reader)?;
        Ok(())
    }

    fn clone_tx(&self) -> Box<dyn Transaction> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn validate(loader: &dyn Loader, tx: &TokenIssue, signers: &[PublicHash]) -> Result<()> {
    tx.base.check_fresh(loader)?;
    let chain = loader.chain_coord();
    if !chain.is_main_chain() {
        return Err(Violation::NotMainChain(chain).into());
    }

    let from_acc = loader.account(&tx.from())?;
    loader.accounter().validate(loader, from_acc.as_ref(), signers)
}

pub fn execute(
    ctx: &mut Context<'_>,
    fee: &Amount,
    tx: &TokenIssue,
    _coord: &Coordinate,
) -> Result<Option<ExecutionResult>> {
    ctx.atomic(|ctx| {
        advance_seq(ctx, &tx.base)?;

        let chain_coord = ctx.chain_coord();
        let mut from_balance = ctx.account_balance(&tx.from())?;
        from_balance.sub_balance(&chain_coord, fee)?;
        from_balance.sub_balance(&chain_coord, &tx.amount)?;

        Ok(Some(ExecutionResult::TokenIssued {
            token_address: tx.token_address,
            height: tx.height,
            amount: tx.amount.clone(),
            tag: tx.tag.clone(),
        }))
    })
}

pub fn register(transactor: &mut Transactor) -> Result<()> {
    transactor.register(TOKEN_ISSUE, TOKEN_ISSUE_TYPE, TokenIssue::new, validate, execute)
}
