use std::collections::HashMap;

use crate::account::{Account, AccountBase, AccountType};
use crate::common::PublicHash;
use crate::encoding::{CanonicalDeserialize, Reader};
use crate::error::{LedgerError, Result};
use crate::loader::Loader;

trait AccountKind: Send + Sync {
    fn name(&self) -> &str;
    fn new_account(&self, account_type: AccountType) -> Box<dyn Account>;
    fn validate(&self, loader: &dyn Loader, account: &dyn Account, signers: &[PublicHash]) -> Result<()>;
}

struct AccountFns<A> {
    name: String,
    new: fn(AccountType) -> A,
    validate: fn(&dyn Loader, &A, &[PublicHash]) -> Result<()>,
}

impl<A: Account> AccountKind for AccountFns<A> {
    fn name(&self) -> &str {
        &self.name
    }

    fn new_account(&self, account_type: AccountType) -> Box<dyn Account> {
        Box::new((self.new)(account_type))
    }

    fn validate(&self, loader: &dyn Loader, account: &dyn Account, signers: &[PublicHash]) -> Result<()> {
        let account = account
            .as_any()
            .downcast_ref::<A>()
            .ok_or_else(|| LedgerError::KindMismatch(self.name.clone()))?;
        (self.validate)(loader, account, signers)
    }
}

/// Registered account kinds, by name and by type tag.
#[derive(Default)]
pub struct Accounter {
    names: HashMap<String, AccountType>,
    kinds: HashMap<AccountType, Box<dyn AccountKind>>,
}

impl Accounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account kind. Names and tags must both be unused.
    pub fn register<A: Account>(
        &mut self,
        name: &str,
        account_type: AccountType,
        new: fn(AccountType) -> A,
        validate: fn(&dyn Loader, &A, &[PublicHash]) -> Result<()>,
    ) -> Result<()> {
        if self.names.contains_key(name) {
            return Err(LedgerError::DuplicateKind(name.to_string()));
        }
        if let Some(existing) = self.kinds.get(&account_type) {
            return Err(LedgerError::DuplicateKind(format!(
                "{} reuses {} of {}",
                name, account_type, existing.name()
            )));
        }

        self.names.insert(name.to_string(), account_type);
        self.kinds.insert(
            account_type,
            Box::new(AccountFns {
                name: name.to_string(),
                new,
                validate,
            }),
        );
        Ok(())
    }

    pub fn type_by_name(&self, name: &str) -> Result<AccountType> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| LedgerError::UnknownKind(name.to_string()))
    }

    pub fn name_of(&self, account_type: AccountType) -> Result<&str> {
        self.kind(account_type).map(|k| k.name())
    }

    /// Zero-value account of the given kind.
    pub fn new_by_type(&self, account_type: AccountType) -> Result<Box<dyn Account>> {
        self.kind(account_type).map(|k| k.new_account(account_type))
    }

    pub fn new_by_name(&self, name: &str) -> Result<Box<dyn Account>> {
        self.new_by_type(self.type_by_name(name)?)
    }

    /// Runs the signer policy registered for the account's kind.
    pub fn validate(&self, loader: &dyn Loader, account: &dyn Account, signers: &[PublicHash]) -> Result<()> {
        self.kind(account.account_type())?.validate(loader, account, signers)
    }

    /// Decodes one account from the front of `bytes`.
    pub fn decode(&self, bytes: &[u8]) -> Result<(Box<dyn Account>, usize)> {
        let mut reader = Reader::new(bytes);
        let base = AccountBase::canonical_deserialize(&mut reader)?;
        let mut account = self.new_by_type(base.account_type)?;
        *account.base_mut() = base;
        account.decode_fields(&mut reader)?;
        Ok((account, reader.consumed()))
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    fn kind(&self, account_type: AccountType) -> Result<&dyn AccountKind> {
        self.kinds
            .get(&account_type)
            .map(|k| k.as_ref())
            .ok_or_else(|| LedgerError::UnknownKind(account_type.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::single::{self, SingleAccount, SINGLE_ACCOUNT, SINGLE_ACCOUNT_TYPE};
    use crate::common::Address;

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut accounter = Accounter::new();
        single::register(&mut accounter).unwrap();
        assert!(matches!(single::register(&mut accounter), Err(LedgerError::DuplicateKind(_))));
        assert!(matches!(
            accounter.register("other.Name", SINGLE_ACCOUNT_TYPE, SingleAccount::new, single::validate_signers),
            Err(LedgerError::DuplicateKind(_))
        ));
        assert_eq!(accounter.len(), 1);
    }

    #[test]
    fn test_decode_dispatches_on_type_tag() {
        let mut accounter = Accounter::new();
        single::register(&mut accounter).unwrap();

        let mut acc = SingleAccount::new(SINGLE_ACCOUNT_TYPE);
        acc.base.address = Address::new([3; 20]);
        acc.key_hash = PublicHash::new([4; 32]);
        let bytes = acc.encode();

        let (decoded, used) = accounter.decode(&bytes).unwrap();
        assert_eq!(used, bytes.len());
        assert_eq!(decoded.encode(), bytes);
        assert_eq!(accounter.name_of(decoded.account_type()).unwrap(), SINGLE_ACCOUNT);
    }

    #[test]
    fn test_unknown_tag_fails() {
        let accounter = Accounter::new();
        let acc = SingleAccount::new(SINGLE_ACCOUNT_TYPE);
        assert!(matches!(accounter.decode(&acc.encode()), Err(LedgerError::UnknownKind(_))));
        assert!(accounter.new_by_name(SINGLE_ACCOUNT).is_err());
    }
}
