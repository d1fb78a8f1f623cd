use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::common::{Hash256, PublicHash};
use crate::error::{LedgerError, Result};

/// Two rounds of SHA-256: the first round's 32-byte digest is hashed again.
pub fn double_hash(data: &[u8]) -> Hash256 {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    Hash256::new(second.into())
}

/// Derives the signer identity stored in accounts from an ed25519 public key.
pub fn public_hash(public_key: &VerifyingKey) -> PublicHash {
    PublicHash::new(*double_hash(public_key.as_bytes()).as_bytes())
}

pub struct KeyPair {
    pub signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new Ed25519 keypair
    pub fn generate() -> Self {
        let mut csprng = OsRng;
        KeyPair {
            signing_key: SigningKey::generate(&mut csprng),
        }
    }

    pub fn from_secret_hex(secret_hex: &str) -> Result<Self> {
        let bytes = hex::decode(secret_hex.trim())
            .map_err(|e| LedgerError::Serialization(format!("bad secret key hex: {}", e)))?;
        let secret: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| LedgerError::Serialization("secret key must be 32 bytes".to_string()))?;
        Ok(KeyPair {
            signing_key: SigningKey::from_bytes(&secret),
        })
    }

    /// Sign a message with the private key
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }

    pub fn public_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn public_hash(&self) -> PublicHash {
        public_hash(&self.public_key())
    }

    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key().to_bytes())
    }
}

/// Checks `signature` over `message` and returns the signer's public hash.
pub fn verify_signer(message: &[u8], public_key: &[u8; 32], signature: &[u8; 64]) -> Result<PublicHash> {
    let key = VerifyingKey::from_bytes(public_key).map_err(|_| LedgerError::InvalidSignature)?;
    let sig = Signature::from_bytes(signature);
    key.verify(message, &sig)
        .map_err(|_| LedgerError::InvalidSignature)?;
    Ok(public_hash(&key))
}
