//! `compass.MultiSigAccount`: an account controlled by `required` of `key_hashes`.

use std::any::Any;
use std::collections::HashSet;
use std::io::{self, Write};

use super::types::{Account, AccountBase, AccountType};
use crate::common::PublicHash;
use crate::encoding::{CanonicalDeserialize, CanonicalSerialize, Reader};
use crate::error::{LedgerError, Result, Violation};
use crate::loader::Loader;
use crate::registry::Accounter;

pub const MULTISIG_ACCOUNT: &str = "compass.MultiSigAccount";
pub const MULTISIG_ACCOUNT_TYPE: AccountType = AccountType(2);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiSigAccount {
    pub base: AccountBase,
    pub required: u8,
    pub key_hashes: Vec<PublicHash>,
}

impl MultiSigAccount {
    pub fn new(account_type: AccountType) -> Self {
        MultiSigAccount {
            base: AccountBase::new(account_type),
            required: 0,
            key_hashes: Vec::new(),
        }
    }
}

impl Account for MultiSigAccount {
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
        self.required.canonical_serialize(writer)?;
        self.key_hashes.canonical_serialize(writer)
    }

    fn decode_fields(&mut self, reader: &mut Reader<'_>) -> Result<()> {
        self.required = u8::canonical_deserialize(reader)?;
        self.key_hashes = Vec::<PublicHash>::canonical_deserialize(reader)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Signers must be distinct members, and at least `required` of them.
pub fn validate_signers(_loader: &dyn Loader, acc: &MultiSigAccount, signers: &[PublicHash]) -> Result<()> {
    let required = acc.required as usize;
    if required == 0 || required > acc.key_hashes.len() {
        return Err(Violation::InvalidThreshold {
            required: acc.required,
            keys: acc.key_hashes.len(),
        }
        .into());
    }
    if signers.len() < required || signers.len() > acc.key_hashes.len() {
        return Err(LedgerError::InvalidSignerCount {
            expected: required,
            got: signers.len(),
        });
    }
    let mut seen = HashSet::with_capacity(signers.len());
    for signer in signers {
        if !seen.insert(signer) || !acc.key_hashes.contains(signer) {
            return Err(LedgerError::InvalidAccountSigner);
        }
    }
    Ok(())
}

pub fn register(accounter: &mut Accounter) -> Result<()> {
    accounter.register(MULTISIG_ACCOUNT, MULTISIG_ACCOUNT_TYPE, MultiSigAccount::new, validate_signers)
}
