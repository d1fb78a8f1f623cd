//! Signed transactions and the JSON block format accepted by the CLI.
//!
//! Signatures are ed25519 over the transaction hash. Verifying them yields
//! the signer [`PublicHash`] set that account policies are checked against.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::common::{Hash256, PublicHash};
use crate::crypto::{verify_signer, KeyPair};
use crate::error::Result;
use crate::registry::Transactor;
use crate::transaction::Transaction;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TxSignature {
    #[serde(with = "hex::serde")]
    pub public_key: [u8; 32],
    #[serde(with = "hex::serde")]
    pub signature: [u8; 64],
}

#[derive(Clone, Debug)]
pub struct SignedTransaction {
    pub tx: Box<dyn Transaction>,
    pub signatures: Vec<TxSignature>,
}

impl SignedTransaction {
    pub fn new(tx: Box<dyn Transaction>) -> Self {
        SignedTransaction {
            tx,
            signatures: Vec::new(),
        }
    }

    pub fn hash(&self) -> Hash256 {
        self.tx.hash()
    }

    /// Appends a signature by `key` over the transaction hash.
    pub fn sign(&mut self, key: &KeyPair) {
        let signature = key.sign(self.hash().as_bytes());
        self.signatures.push(TxSignature {
            public_key: key.public_key().to_bytes(),
            signature: signature.to_bytes(),
        });
    }

    pub fn signed_by(mut self, key: &KeyPair) -> Self {
        self.sign(key);
        self
    }

    /// Verifies every signature and returns the signer hashes in signature
    /// order. Duplicates are kept; rejecting them is up to the account policy.
    pub fn signers(&self) -> Result<Vec<PublicHash>> {
        let hash = self.hash();
        self.signatures
            .iter()
            .map(|s| verify_signer(hash.as_bytes(), &s.public_key, &s.signature))
            .collect()
    }

    pub fn to_encoded(&self) -> EncodedTransaction {
        EncodedTransaction {
            tx: self.tx.encode(),
            signatures: self.signatures.clone(),
        }
    }
}

/// Wire form of a [`SignedTransaction`]: canonical bytes as hex.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EncodedTransaction {
    #[serde(with = "hex::serde")]
    pub tx: Vec<u8>,
    #[serde(default)]
    pub signatures: Vec<TxSignature>,
}

impl EncodedTransaction {
    pub fn decode(&self, transactor: &Transactor) -> Result<SignedTransaction> {
        Ok(SignedTransaction {
            tx: transactor.decode_exact(&self.tx)?,
            signatures: self.signatures.clone(),
        })
    }
}

/// Ordered batch of transactions sharing one fee.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Block {
    #[serde(default)]
    pub fee: Option<Amount>,
    pub transactions: Vec<EncodedTransaction>,
}

impl Block {
    pub fn decode(&self, transactor: &Transactor) -> Result<Vec<SignedTransaction>> {
        self.transactions.iter().map(|t| t.decode(transactor)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Address, Coordinate};
    use crate::error::LedgerError;
    use crate::registry::Registry;
    use crate::transaction::burn::{Burn, BURN_TYPE};

    fn signed_burn(key: &KeyPair) -> SignedTransaction {
        let mut tx = Burn::new(Coordinate::main(), BURN_TYPE);
        tx.base.seq = 1;
        tx.base.from = Address::new([3; 20]);
        tx.amount = "1".parse().unwrap();
        SignedTransaction::new(Box::new(tx)).signed_by(key)
    }

    #[test]
    fn test_signers_are_recovered() {
        let key = KeyPair::generate();
        let signed = signed_burn(&key);
        assert_eq!(signed.signers().unwrap(), vec![key.public_hash()]);
    }

    #[test]
    fn test_tampered_payload_fails_verification() {
        let key = KeyPair::generate();
        let mut signed = signed_burn(&key);
        signed.tx.base_mut().seq = 2;
        assert!(matches!(signed.signers(), Err(LedgerError::InvalidSignature)));
    }

    #[test]
    fn test_block_json() {
        let registry = Registry::standard().unwrap();
        let key = KeyPair::generate();
        let signed = signed_burn(&key);
        let block = Block {
            fee: Some("0.01".parse().unwrap()),
            transactions: vec![signed.to_encoded()],
        };

        let json = serde_json::to_string(&block).unwrap();
        assert!(json.contains(&hex::encode(signed.tx.encode())));

        let parsed: Block = serde_json::from_str(&json).unwrap();
        let txs = parsed.decode(&registry.transactions).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].hash(), signed.hash());
        assert_eq!(txs[0].signers().unwrap(), vec![key.public_hash()]);
    }
}
