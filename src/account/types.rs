//! Account trait and the fields every account kind shares.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::io::{self, Write};

use crate::common::Address;
use crate::encoding::{CanonicalDeserialize, CanonicalSerialize, Reader};
use crate::error::Result;

/// Compact numeric tag of an account kind, stable once deployed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountType(pub u8);

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account#{}", self.0)
    }
}

/// Fields common to every account kind, encoded before the kind's own data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountBase {
    pub address: Address,
    pub account_type: AccountType,
}

impl AccountBase {
    pub fn new(account_type: AccountType) -> Self {
        AccountBase {
            address: Address::default(),
            account_type,
        }
    }
}

impl CanonicalSerialize for AccountBase {
    fn canonical_serialize<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        self.address.canonical_serialize(writer)?;
        self.account_type.0.canonical_serialize(writer)
    }
}

impl CanonicalDeserialize for AccountBase {
    fn canonical_deserialize(reader: &mut Reader<'_>) -> Result<Self> {
        let address = Address::canonical_deserialize(reader)?;
        let account_type = AccountType(u8::canonical_deserialize(reader)?);
        Ok(AccountBase { address, account_type })
    }
}

/// A ledger account. Each kind owns its data and is paired with a
/// signer-verification policy in the [`crate::registry::Accounter`].
pub trait Account: fmt::Debug + Send + Sync + 'static {
    fn base(&self) -> &AccountBase;

    fn base_mut(&mut self) -> &mut AccountBase;

    /// Independent deep copy, taken before any staged mutation.
    fn clone_account(&self) -> Box<dyn Account>;

    /// Writes the kind-specific fields that follow the base.
    fn encode_fields(&self, writer: &mut dyn Write) -> io::Result<()>;

    /// Reads the kind-specific fields that follow the base.
    fn decode_fields(&mut self, reader: &mut Reader<'_>) -> Result<()>;

    fn as_any(&self) -> &dyn Any;

    fn address(&self) -> Address {
        self.base().address
    }

    fn account_type(&self) -> AccountType {
        self.base().account_type
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
}

impl Clone for Box<dyn Account> {
    fn clone(&self) -> Self {
        self.clone_account()
    }
}
