//! Transaction Model
//!
//! Every transaction kind shares a [`TxBase`] (chain coordinate, type tag,
//! sequence, origin) and adds its own payload. A kind is registered in the
//! [`crate::registry::Transactor`] together with its validator and executor.

pub mod burn;
pub mod token_issue;
pub mod transfer;

pub use burn::Burn;
pub use token_issue::TokenIssue;
pub use transfer::Transfer;

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::io::{self, Write};

use crate::amount::Amount;
use crate::common::{Address, Coordinate, Hash256};
use crate::context::Context;
use crate::crypto::double_hash;
use crate::encoding::{CanonicalDeserialize, CanonicalSerialize, Reader};
use crate::error::{LedgerError, Result, Violation};
use crate::loader::Loader;

/// Compact numeric tag of a transaction kind, stable once deployed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxType(pub u8);

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx#{}", self.0)
    }
}

/// Smallest amount a burn or transfer may move: 0.1 coin.
pub fn dust_threshold() -> Amount {
    Amount::new_coin(0, 100_000_000_000_000_000)
}

/// Fields shared by every transaction kind, encoded in this order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxBase {
    pub chain_coord: Coordinate,
    pub tx_type: TxType,
    pub seq: u64,
    pub from: Address,
}

impl TxBase {
    pub fn new(chain_coord: Coordinate, tx_type: TxType) -> Self {
        TxBase {
            chain_coord,
            tx_type,
            seq: 0,
            from: Address::default(),
        }
    }

    /// Loose freshness check against possibly stale committed state, then
    /// the transaction must target the loader's chain.
    pub fn check_fresh(&self, loader: &dyn Loader) -> Result<()> {
        let current = loader.seq(&self.from);
        if self.seq <= current {
            return Err(LedgerError::InvalidSequence { got: self.seq, current });
        }
        let chain = loader.chain_coord();
        if self.chain_coord != chain {
            return Err(Violation::WrongChain {
                expected: chain,
                got: self.chain_coord,
            }
            .into());
        }
        Ok(())
    }
}

impl CanonicalSerialize for TxBase {
    fn canonical_serialize<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        self.chain_coord.canonical_serialize(writer)?;
        self.tx_type.0.canonical_serialize(writer)?;
        self.seq.canonical_serialize(writer)?;
        self.from.canonical_serialize(writer)
    }
}

/// A ledger transaction. Instances are immutable once validation begins.
pub trait Transaction: fmt::Debug + Send + Sync + 'static {
    fn base(&self) -> &TxBase;

    fn base_mut(&mut self) -> &mut TxBase;

    /// Writes the kind-specific fields that follow the base.
    fn encode_fields(&self, writer: &mut dyn Write) -> io::Result<()>;

    /// Reads the kind-specific fields that follow the base.
    fn decode_fields(&mut self, reader: &mut Reader<'_>) -> Result<()>;

    fn clone_tx(&self) -> Box<dyn Transaction>;

    fn as_any(&self) -> &dyn Any;

    fn chain_coord(&self) -> Coordinate {
        self.base().chain_coord
    }

    fn tx_type(&self) -> TxType {
        self.base().tx_type
    }

    fn seq(&self) -> u64 {
        self.base().seq
    }

    fn from(&self) -> Address {
        self.base().from
    }

    /// Canonical encoding: base fields, then kind fields.
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.base()
            .canonical_serialize(&mut buf)
            .and_then(|_| self.encode_fields(&mut buf))
            .expect("memory write failed");
        buf
    }

    /// Content identity and signing payload.
    fn hash(&self) -> Hash256 {
        double_hash(&self.encode())
    }
}

impl Clone for Box<dyn Transaction> {
    fn clone(&self) -> Self {
        self.clone_tx()
    }
}

/// Reads the base that starts every encoded transaction, stopping after the
/// type tag so the caller can dispatch before reading further.
pub(crate) fn decode_head(reader: &mut Reader<'_>) -> Result<(Coordinate, TxType)> {
    let chain_coord = Coordinate::canonical_deserialize(reader)?;
    let tx_type = TxType(u8::canonical_deserialize(reader)?);
    Ok((chain_coord, tx_type))
}

pub(crate) fn decode_origin(base: &mut TxBase, reader: &mut Reader<'_>) -> Result<()> {
    base.seq = u64::canonical_deserialize(reader)?;
    base.from = Address::canonical_deserialize(reader)?;
    Ok(())
}

/// Kind-specific outcome of a committed transaction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ExecutionResult {
    /// Issuance record of a `compass.TokenIssue`; the issued token's own
    /// supply is tracked by whoever consumes this record.
    TokenIssued {
        token_address: Address,
        height: u32,
        amount: Amount,
        #[serde(with = "hex::serde")]
        tag: Vec<u8>,
    },
}

pub(crate) fn check_dust(amount: &Amount) -> Result<()> {
    if amount.less(&dust_threshold()) {
        return Err(Violation::DustAmount(amount.clone()).into());
    }
    Ok(())
}

/// Strict sequence step of execution: `seq` must be exactly one above the
/// staged counter, which is then advanced.
pub(crate) fn advance_seq(ctx: &mut Context<'_>, base: &TxBase) -> Result<()> {
    let current = ctx.seq(&base.from);
    if current.checked_add(1) != Some(base.seq) {
        return Err(LedgerError::InvalidSequence { got: base.seq, current });
    }
    ctx.add_seq(&base.from)
}
