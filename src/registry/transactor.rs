use std::collections::HashMap;

use crate::amount::Amount;
use crate::common::{Coordinate, PublicHash};
use crate::context::Context;
use crate::encoding::Reader;
use crate::error::{LedgerError, Result};
use crate::loader::Loader;
use crate::transaction::{decode_head, decode_origin, ExecutionResult, Transaction, TxType};

type ExecuteFn<T> = fn(&mut Context<'_>, &Amount, &T, &Coordinate) -> Result<Option<ExecutionResult>>;

trait TxKind: Send + Sync {
    fn name(&self) -> &str;
    fn new_tx(&self, coord: Coordinate, tx_type: TxType) -> Box<dyn Transaction>;
    fn validate(&self, loader: &dyn Loader, tx: &dyn Transaction, signers: &[PublicHash]) -> Result<()>;
    fn execute(
        &self,
        ctx: &mut Context<'_>,
        fee: &Amount,
        tx: &dyn Transaction,
        coord: &Coordinate,
    ) -> Result<Option<ExecutionResult>>;
}

struct TxFns<T> {
    name: String,
    new: fn(Coordinate, TxType) -> T,
    validate: fn(&dyn Loader, &T, &[PublicHash]) -> Result<()>,
    execute: ExecuteFn<T>,
}

impl<T: Transaction> TxFns<T> {
    fn downcast<'t>(&self, tx: &'t dyn Transaction) -> Result<&'t T> {
        tx.as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| LedgerError::KindMismatch(self.name.clone()))
    }
}

impl<T: Transaction> TxKind for TxFns<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn new_tx(&self, coord: Coordinate, tx_type: TxType) -> Box<dyn Transaction> {
        Box::new((self.new)(coord, tx_type))
    }

    fn validate(&self, loader: &dyn Loader, tx: &dyn Transaction, signers: &[PublicHash]) -> Result<()> {
        (self.validate)(loader, self.downcast(tx)?, signers)
    }

    fn execute(
        &self,
        ctx: &mut Context<'_>,
        fee: &Amount,
        tx: &dyn Transaction,
        coord: &Coordinate,
    ) -> Result<Option<ExecutionResult>> {
        (self.execute)(ctx, fee, self.downcast(tx)?, coord)
    }
}

/// Registered transaction kinds, by name and by type tag.
#[derive(Default)]
pub struct Transactor {
    names: HashMap<String, TxType>,
    kinds: HashMap<TxType, Box<dyn TxKind>>,
}

impl Transactor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transaction kind. Names and tags must both be unused.
    pub fn register<T: Transaction>(
        &mut self,
        name: &str,
        tx_type: TxType,
        new: fn(Coordinate, TxType) -> T,
        validate: fn(&dyn Loader, &T, &[PublicHash]) -> Result<()>,
        execute: ExecuteFn<T>,
    ) -> Result<()> {
        if self.names.contains_key(name) {
            return Err(LedgerError::DuplicateKind(name.to_string()));
        }
        if let Some(existing) = self.kinds.get(&tx_type) {
            return Err(LedgerError::DuplicateKind(format!(
                "{} reuses {} of {}",
                name, tx_type, existing.name()
            )));
        }

        self.names.insert(name.to_string(), tx_type);
        self.kinds.insert(
            tx_type,
            Box::new(TxFns {
                name: name.to_string(),
                new,
                validate,
                execute,
            }),
        );
        Ok(())
    }

    pub fn type_by_name(&self, name: &str) -> Result<TxType> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| LedgerError::UnknownKind(name.to_string()))
    }

    pub fn name_of(&self, tx_type: TxType) -> Result<&str> {
        self.kind(tx_type).map(|k| k.name())
    }

    /// Zero-value transaction of the given kind on `coord`.
    pub fn new_by_type(&self, coord: Coordinate, tx_type: TxType) -> Result<Box<dyn Transaction>> {
        self.kind(tx_type).map(|k| k.new_tx(coord, tx_type))
    }

    pub fn new_by_name(&self, coord: Coordinate, name: &str) -> Result<Box<dyn Transaction>> {
        self.new_by_type(coord, self.type_by_name(name)?)
    }

    pub fn validate(&self, loader: &dyn Loader, tx: &dyn Transaction, signers: &[PublicHash]) -> Result<()> {
        self.kind(tx.tx_type())?.validate(loader, tx, signers)
    }

    pub fn execute(
        &self,
        ctx: &mut Context<'_>,
        fee: &Amount,
        tx: &dyn Transaction,
        coord: &Coordinate,
    ) -> Result<Option<ExecutionResult>> {
        self.kind(tx.tx_type())?.execute(ctx, fee, tx, coord)
    }

    /// Decodes one transaction from the front of `bytes`, dispatching on the
    /// type tag before the kind's fields are read.
    pub fn decode(&self, bytes: &[u8]) -> Result<(Box<dyn Transaction>, usize)> {
        let mut reader = Reader::new(bytes);
        let (chain_coord, tx_type) = decode_head(&mut reader)?;
        let mut tx = self.new_by_type(chain_coord, tx_type)?;
        decode_origin(tx.base_mut(), &mut reader)?;
        tx.decode_fields(&mut reader)?;
        Ok((tx, reader.consumed()))
    }

    /// Like [`Transactor::decode`] but rejects trailing bytes.
    pub fn decode_exact(&self, bytes: &[u8]) -> Result<Box<dyn Transaction>> {
        let (tx, used) = self.decode(bytes)?;
        if used != bytes.len() {
            return Err(LedgerError::malformed(
                used,
                format!("{} trailing bytes", bytes.len() - used),
            ));
        }
        Ok(tx)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    fn kind(&self, tx_type: TxType) -> Result<&dyn TxKind> {
        self.kinds
            .get(&tx_type)
            .map(|k| k.as_ref())
            .ok_or_else(|| LedgerError::UnknownKind(tx_type.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Address;
    use crate::error::ErrorKind;
    use crate::transaction::burn::{self, Burn, BURN, BURN_TYPE};
    use crate::transaction::token_issue::{TokenIssue, TOKEN_ISSUE_TYPE};

    fn transactor() -> Transactor {
        let mut t = Transactor::new();
        burn::register(&mut t).unwrap();
        t
    }

    fn sample_burn() -> Burn {
        let mut tx = Burn::new(Coordinate::new(0, 0), BURN_TYPE);
        tx.base.seq = 7;
        tx.base.from = Address::new([9; 20]);
        tx.token_coord = Coordinate::new(2, 1);
        tx.amount = "1.5".parse().unwrap();
        tx
    }

    #[test]
    fn test_decode_round_trip() {
        let t = transactor();
        let tx = sample_burn();
        let bytes = tx.encode();
        let decoded = t.decode_exact(&bytes).unwrap();
        assert_eq!(decoded.encode(), bytes);
        assert_eq!(decoded.hash(), tx.hash());
        assert_eq!(decoded.as_any().downcast_ref::<Burn>(), Some(&tx));
    }

    #[test]
    fn test_base_fields_come_first() {
        let bytes = sample_burn().encode();
        assert_eq!(&bytes[..6], &[0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes[6], BURN_TYPE.0);
        assert_eq!(&bytes[7..15], &7u64.to_le_bytes());
        assert_eq!(&bytes[15..35], &[9u8; 20]);
    }

    #[test]
    fn test_unknown_tag_is_not_defaulted() {
        let t = transactor();
        let mut bytes = sample_burn().encode();
        bytes[6] = 0xEE;
        assert_eq!(t.decode(&bytes).unwrap_err().kind(), ErrorKind::UnknownKind);
    }

    #[test]
    fn test_truncation_reports_progress() {
        let t = transactor();
        let bytes = sample_burn().encode();
        for cut in [3, 10, bytes.len() - 1] {
            match t.decode(&bytes[..cut]) {
                Err(LedgerError::MalformedEncoding { consumed, .. }) => assert!(consumed <= cut),
                other => panic!("cut {} gave {:?}", cut, other),
            }
        }
        assert!(t.decode_exact(&[bytes.clone(), vec![0]].concat()).is_err());
    }

    #[test]
    fn test_registration_rules() {
        let mut t = transactor();
        assert!(matches!(burn::register(&mut t), Err(LedgerError::DuplicateKind(_))));
        assert_eq!(t.type_by_name(BURN).unwrap(), BURN_TYPE);
        assert!(t.type_by_name("compass.Nope").is_err());
        assert!(t.new_by_type(Coordinate::main(), TOKEN_ISSUE_TYPE).is_err());
    }

    #[test]
    fn test_mismatched_instance_is_rejected() {
        let t = transactor();
        // a TokenIssue instance carrying the Burn tag
        let tx = TokenIssue::new(Coordinate::main(), BURN_TYPE);
        let ledger = crate::testing::TestLedger::new();
        assert!(matches!(
            t.validate(&ledger.state, &tx, &[]),
            Err(LedgerError::KindMismatch(_))
        ));
    }
}
