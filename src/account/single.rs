//! `compass.SingleAccount`: the basic account, controlled by one key.

use std::any::Any;
use std::io::{self, Write};

use super::types::{Account, AccountBase, AccountType};
use crate::common::PublicHash;
use crate::encoding::{CanonicalDeserialize, CanonicalSerialize, Reader};
use crate::error::{LedgerError, Result};
use crate::loader::Loader;
use crate::registry::Accounter;

pub const SINGLE_ACCOUNT: &str = "compass.SingleAccount";
pub const SINGLE_ACCOUNT_TYPE: AccountType = AccountType(1);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SingleAccount {
    pub base: AccountBase,
    pub key_hash: PublicHash,
}

impl SingleAccount {
    pub fn new(account_type: AccountType) -> Self {
        SingleAccount {
            base: AccountBase::new(account_type),
            key_hash: PublicHash::default(),
        }
    }
}

impl Account for SingleAccount {
    fn base(&self) -> &AccountBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AccountBase {
        &mut self.base
    }

    fn clone_account(&self) -> Box<dyn Account> {
        Box::new(self.clone())
    }

    fn encode_fields(&self, writer: &mut dyn Write) -> io::Result<()> {
        self.key_hash.canonical_serialize(writer)
    }

    fn decode_fields(&mut self, reader: &mut Reader<'_>) -> Result<()> {
        self.key_hash = PublicHash::canonical_deserialize(reader)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Exactly one signer, and it must be the stored key hash.
pub fn validate_signers(_loader: &dyn Loader, acc: &SingleAccount, signers: &[PublicHash]) -> Result<()> {
    if signers.len() != 1 {
        return Err(LedgerError::InvalidSignerCount {
            expected: 1,
            got: signers.len(),
        });
    }
    if acc.key_hash != signers[0] {
        return Err(LedgerError::InvalidAccountSigner);
    }
    Ok(())
}

pub fn register(accounter: &mut Accounter) -> Result<()> {
    accounter.register(SINGLE_ACCOUNT, SINGLE_ACCOUNT_TYPE, SingleAccount::new, validate_signers)
}
